/// Scoring and bonus rules, checked against truth tables.
///
/// Pure functions, no side effects. These decide "what happens"
/// without touching the grid or the round.
///
/// ## Guess Table
/// ┌───────────────────────────┬──────────────────────────────┐
/// │ Condition                 │ Outcome                      │
/// ├───────────────────────────┼──────────────────────────────┤
/// │ guess == secret           │ Won                          │
/// │ guess != secret, lives>1  │ lives-1, report likeness     │
/// │ guess != secret, lives=1  │ lives=0, Locked              │
/// └───────────────────────────┴──────────────────────────────┘
///
/// ## Special Table (priority order)
/// ┌───────────────────────────┬──────────────────────────────┐
/// │ Condition                 │ Effect                       │
/// ├───────────────────────────┼──────────────────────────────┤
/// │ roll < dud_chance         │ RemoveDud                    │
/// │ lives == max_lives        │ RemoveDud                    │
/// │ otherwise                 │ ResetTries                   │
/// └───────────────────────────┴──────────────────────────────┘
///
/// The two RemoveDud rows are kept separate: the roll is always drawn,
/// the full-lives override only matters when the roll fails.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpecialEffect {
    RemoveDud,
    ResetTries,
}

/// Number of positions where `guess` and `secret` carry the same char.
/// Extra trailing chars on either side never match.
pub fn likeness(guess: &str, secret: &str) -> usize {
    guess.chars()
        .zip(secret.chars())
        .filter(|(g, s)| g == s)
        .count()
}

/// Resolve a special token's effect. See the table above.
pub fn special_effect(roll: f64, lives: u32, max_lives: u32, dud_chance: f64) -> SpecialEffect {
    if roll < dud_chance {
        return SpecialEffect::RemoveDud;
    }
    if lives == max_lives {
        return SpecialEffect::RemoveDud;
    }
    SpecialEffect::ResetTries
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── likeness ──

    #[test]
    fn likeness_of_secret_is_its_length() {
        assert_eq!(likeness("GARDEN", "GARDEN"), 6);
    }

    #[test]
    fn likeness_counts_positions_not_letters() {
        // DANGER and GARDEN share every letter but only A and E line up
        assert_eq!(likeness("DANGER", "GARDEN"), 2);
        assert_eq!(likeness("BEACON", "SILVER"), 0);
        assert_eq!(likeness("BEACON", "PLANET"), 1);
        assert_eq!(likeness("GARDEN", "GOLDEN"), 4);
        assert_eq!(likeness("SILVER", "SILENT"), 3);
    }

    #[test]
    fn likeness_zero_when_nothing_lines_up() {
        assert_eq!(likeness("ABCDEF", "GHIJKL"), 0);
    }

    // ── special_effect ──

    #[test]
    fn low_roll_removes_dud() {
        assert_eq!(special_effect(0.1, 2, 5, 0.66), SpecialEffect::RemoveDud);
    }

    #[test]
    fn high_roll_resets_when_lives_missing() {
        assert_eq!(special_effect(0.9, 2, 5, 0.66), SpecialEffect::ResetTries);
    }

    #[test]
    fn full_lives_always_remove_dud() {
        assert_eq!(special_effect(0.99, 5, 5, 0.66), SpecialEffect::RemoveDud);
        assert_eq!(special_effect(0.99, 5, 5, 0.0), SpecialEffect::RemoveDud);
    }

    #[test]
    fn roll_at_threshold_is_not_below_it() {
        assert_eq!(special_effect(0.66, 4, 5, 0.66), SpecialEffect::ResetTries);
    }
}
