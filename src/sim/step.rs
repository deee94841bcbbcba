/// Round transitions: guess, special-use, and the lock-out timer.
///
/// Each transition mutates the `Round` in place and returns the events
/// the presenter should show. Outside `Playing` every transition except
/// `tick` is a no-op.
///
/// Processing order for `guess`:
///   1. Phase check
///   2. Target check (word must still have cells)
///   3. Guard check (one action at a time)
///   4. Won, or lives-1 with likeness, Locked at 0
///
/// Processing order for `use_special`:
///   1. Phase / one-shot check
///   2. Guard check
///   3. Roll the effect, resolve it (RemoveDud falls back to ResetTries
///      when no dud is left)
///   4. Consume the token, refocus the cursor

use std::time::{Duration, Instant};

use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::rules::{self, SpecialEffect};
use crate::domain::symbol::Group;
use crate::error::TermlinkError;
use super::event::GameEvent;
use super::round::{RoundPhase, Round};

// ══════════════════════════════════════════════════════════════
// Guess
// ══════════════════════════════════════════════════════════════

pub fn guess(
    round: &mut Round,
    word_id: usize,
    lockout: Duration,
    now: Instant,
) -> Result<Vec<GameEvent>, TermlinkError> {
    if round.state.phase != RoundPhase::Playing { return Ok(vec![]); }

    if round.grid.group_cells(Group::Word(word_id)).is_empty() {
        return Err(TermlinkError::InvalidGuessTarget(word_id));
    }
    let word = match round.state.candidate(word_id) {
        Some(c) => c.text.clone(),
        None => return Err(TermlinkError::InvalidGuessTarget(word_id)),
    };

    if !round.guard.try_begin(now) {
        return Ok(vec![GameEvent::InputIgnored]);
    }

    if word_id == round.state.secret {
        round.state.phase = RoundPhase::Won;
        round.grid.clear();
        info!("password accepted: {word}");
        return Ok(vec![GameEvent::PasswordAccepted { word }]);
    }

    let state = &mut round.state;
    state.lives = state.lives.saturating_sub(1);
    let likeness = rules::likeness(&word, state.secret_word());
    let mut events = vec![GameEvent::GuessDenied { guess: word, likeness, lives: state.lives }];

    if state.lives == 0 {
        state.phase = RoundPhase::Locked;
        let unlock_at = now.checked_add(lockout).unwrap_or_else(|| {
            warn!("lockout of {}s is out of range, unlocking immediately", lockout.as_secs());
            now
        });
        state.unlock_at = Some(unlock_at);
        round.grid.clear();
        info!("terminal locked for {}s", lockout.as_secs());
        events.push(GameEvent::TerminalLocked { unlock_in: lockout });
    }
    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Special tokens
// ══════════════════════════════════════════════════════════════

pub fn use_special<R: Rng + ?Sized>(
    round: &mut Round,
    special_id: usize,
    dud_chance: f64,
    rng: &mut R,
    now: Instant,
) -> Vec<GameEvent> {
    if round.state.phase != RoundPhase::Playing { return vec![]; }

    let group = Group::Special(special_id);
    if round.state.used_specials.contains(&special_id)
        || round.grid.group_cells(group).is_empty()
    {
        return vec![];
    }

    if !round.guard.try_begin(now) {
        return vec![GameEvent::InputIgnored];
    }

    let token = round.grid.group_text(group);
    let roll: f64 = rng.gen();
    let effect = rules::special_effect(roll, round.state.lives, round.state.max_lives, dud_chance);

    let event = match effect {
        SpecialEffect::RemoveDud => match remove_dud(round, rng) {
            Some(word) => GameEvent::DudRemoved { token, word },
            None => reset_tries(round, token),
        },
        SpecialEffect::ResetTries => reset_tries(round, token),
    };

    round.state.used_specials.insert(special_id);
    round.grid.disable_group(group);
    round.selection.refocus(&mut round.grid);
    vec![event]
}

/// Disable a random live dud. The secret is never a candidate.
fn remove_dud<R: Rng + ?Sized>(round: &mut Round, rng: &mut R) -> Option<String> {
    let secret = round.state.secret;
    let duds: Vec<usize> = round.grid.live_words().filter(|&id| id != secret).collect();
    let &dud = duds.choose(rng)?;
    round.grid.disable_group(Group::Word(dud));
    round.state.candidate(dud).map(|c| c.text.clone())
}

fn reset_tries(round: &mut Round, token: String) -> GameEvent {
    round.state.lives = round.state.max_lives;
    GameEvent::TriesReset { token, lives: round.state.lives }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Fire `LockoutExpired` once the lock-out wait has passed.
pub fn tick(round: &mut Round, now: Instant) -> Vec<GameEvent> {
    if round.state.phase != RoundPhase::Locked { return vec![]; }
    match round.state.unlock_at {
        Some(at) if now >= at => {
            round.state.unlock_at = None;
            vec![GameEvent::LockoutExpired]
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::dictionary::Dictionary;
    use crate::domain::symbol::FILLER;
    use crate::sim::round::sample_round;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LOCKOUT: Duration = Duration::from_secs(30);

    /// Far enough apart that the guard never blocks.
    fn at(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_secs(10 * n)
    }

    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    // ── guess ──

    #[test]
    fn secret_wins_and_clears() {
        let mut r = sample_round();
        let ev = guess(&mut r, 1, LOCKOUT, Instant::now()).unwrap();
        assert_eq!(ev, vec![GameEvent::PasswordAccepted { word: "GARDEN".into() }]);
        assert_eq!(r.phase(), RoundPhase::Won);
        assert!(r.grid.live_words().next().is_none());
    }

    #[test]
    fn wrong_guess_costs_a_life_and_reports_likeness() {
        let mut r = sample_round();
        let ev = guess(&mut r, 2, LOCKOUT, Instant::now()).unwrap();
        // PLANET vs GARDEN: only the E at index 4 lines up
        assert_eq!(ev, vec![GameEvent::GuessDenied { guess: "PLANET".into(), likeness: 1, lives: 4 }]);
        assert_eq!(r.phase(), RoundPhase::Playing);
        // wrong guesses don't disable the word
        assert_eq!(r.grid.group_text(Group::Word(2)), "PLANET");
    }

    #[test]
    fn fifth_wrong_guess_locks() {
        let t0 = Instant::now();
        let mut r = sample_round();
        for n in 0..4 {
            let ev = guess(&mut r, 0, LOCKOUT, at(t0, n)).unwrap();
            assert_eq!(ev.len(), 1);
        }
        assert_eq!(r.state.lives, 1);
        let ev = guess(&mut r, 3, LOCKOUT, at(t0, 4)).unwrap();
        assert_eq!(r.state.lives, 0);
        assert_eq!(r.phase(), RoundPhase::Locked);
        assert_eq!(ev.last(), Some(&GameEvent::TerminalLocked { unlock_in: LOCKOUT }));
        assert_eq!(r.state.unlock_at, Some(at(t0, 4) + LOCKOUT));
    }

    #[test]
    fn unrepresentable_lockout_does_not_panic() {
        let t0 = Instant::now();
        let mut r = sample_round();
        for n in 0..5 {
            guess(&mut r, 0, Duration::MAX, at(t0, n)).unwrap();
        }
        assert_eq!(r.phase(), RoundPhase::Locked);
        assert_eq!(r.state.unlock_at, Some(at(t0, 4)));
        assert_eq!(tick(&mut r, at(t0, 4)), vec![GameEvent::LockoutExpired]);
    }

    #[test]
    fn locked_round_ignores_further_guesses() {
        let t0 = Instant::now();
        let mut r = sample_round();
        for n in 0..5 {
            guess(&mut r, 0, LOCKOUT, at(t0, n)).unwrap();
        }
        let ev = guess(&mut r, 1, LOCKOUT, at(t0, 6)).unwrap();
        assert!(ev.is_empty());
        assert_eq!(r.state.lives, 0);
        assert_eq!(r.phase(), RoundPhase::Locked);
    }

    #[test]
    fn guess_inside_window_is_ignored() {
        let t0 = Instant::now();
        let mut r = sample_round();
        guess(&mut r, 0, LOCKOUT, t0).unwrap();
        let ev = guess(&mut r, 2, LOCKOUT, t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(ev, vec![GameEvent::InputIgnored]);
        assert_eq!(r.state.lives, 4);

        r.guard.release();
        guess(&mut r, 2, LOCKOUT, t0 + Duration::from_millis(300)).unwrap();
        assert_eq!(r.state.lives, 3);
    }

    #[test]
    fn removed_word_is_invalid_target() {
        let mut r = sample_round();
        r.grid.disable_group(Group::Word(3));
        let res = guess(&mut r, 3, LOCKOUT, Instant::now());
        assert!(matches!(res, Err(TermlinkError::InvalidGuessTarget(3))));
        assert!(matches!(
            guess(&mut r, 42, LOCKOUT, Instant::now()),
            Err(TermlinkError::InvalidGuessTarget(42)),
        ));
        assert_eq!(r.state.lives, 5);
    }

    // ── use_special ──

    #[test]
    fn special_removes_a_dud_never_the_secret() {
        let t0 = Instant::now();
        let mut r = sample_round();
        let mut rng = zero_rng();
        let ev = use_special(&mut r, 0, 0.66, &mut rng, t0);
        // roll 0.0 -> RemoveDud; first live dud is BEACON
        assert_eq!(ev, vec![GameEvent::DudRemoved { token: "[%]".into(), word: "BEACON".into() }]);
        assert!(r.grid.group_cells(Group::Word(0)).is_empty());
        assert_eq!(r.grid.group_text(Group::Word(1)), "GARDEN");
        assert_eq!(r.state.lives, 5);
    }

    #[test]
    fn dud_removal_spares_secret_over_many_seeds() {
        for seed in 0..50 {
            let t0 = Instant::now();
            let mut r = sample_round();
            let mut rng = StdRng::seed_from_u64(seed);
            use_special(&mut r, 0, 1.0, &mut rng, t0);
            use_special(&mut r, 1, 1.0, &mut rng, at(t0, 1));
            assert_eq!(r.grid.group_text(Group::Word(1)), "GARDEN", "seed {seed}");
            assert_eq!(r.grid.live_words().count(), 2);
        }
    }

    #[test]
    fn special_resets_tries_when_roll_fails() {
        let t0 = Instant::now();
        let mut r = sample_round();
        guess(&mut r, 0, LOCKOUT, t0).unwrap();
        guess(&mut r, 2, LOCKOUT, at(t0, 1)).unwrap();
        assert_eq!(r.state.lives, 3);
        let mut rng = zero_rng();
        let ev = use_special(&mut r, 1, 0.0, &mut rng, at(t0, 2));
        assert_eq!(ev, vec![GameEvent::TriesReset { token: "<#>".into(), lives: 5 }]);
        assert_eq!(r.state.lives, 5);
        assert_eq!(r.grid.live_words().count(), 4);
    }

    #[test]
    fn special_is_one_shot() {
        let t0 = Instant::now();
        let mut r = sample_round();
        let mut rng = zero_rng();
        use_special(&mut r, 0, 0.66, &mut rng, t0);
        let before = r.grid.live_words().count();
        let ev = use_special(&mut r, 0, 0.66, &mut rng, at(t0, 1));
        assert!(ev.is_empty());
        assert_eq!(r.grid.live_words().count(), before);
        assert!(r.state.used_specials.contains(&0));
        // token cells became filler
        let row1: String = r.grid.rows()[1].iter().map(|s| s.text).collect();
        assert_eq!(&row1[3..6], FILLER.to_string().repeat(3));
    }

    #[test]
    fn special_inside_guess_window_is_ignored() {
        let t0 = Instant::now();
        let mut r = sample_round();
        guess(&mut r, 0, LOCKOUT, t0).unwrap();
        let mut rng = zero_rng();
        let ev = use_special(&mut r, 0, 0.66, &mut rng, t0 + Duration::from_millis(100));
        assert_eq!(ev, vec![GameEvent::InputIgnored]);
        assert!(r.state.used_specials.is_empty());
        assert_eq!(r.grid.group_text(Group::Special(0)), "[%]");
        assert_eq!(r.grid.live_words().count(), 4);
        assert_eq!(r.state.lives, 4);

        r.guard.release();
        let ev = use_special(&mut r, 0, 0.66, &mut rng, t0 + Duration::from_millis(200));
        assert_eq!(ev.len(), 1);
        assert!(r.state.used_specials.contains(&0));
    }

    #[test]
    fn no_dud_left_falls_back_to_reset() {
        let t0 = Instant::now();
        let mut r = sample_round();
        for id in [0, 2, 3] {
            r.grid.disable_group(Group::Word(id));
        }
        let mut rng = zero_rng();
        let ev = use_special(&mut r, 0, 1.0, &mut rng, t0);
        assert_eq!(ev, vec![GameEvent::TriesReset { token: "[%]".into(), lives: 5 }]);
        assert_eq!(r.grid.group_text(Group::Word(1)), "GARDEN");
    }

    #[test]
    fn special_refocuses_cursor() {
        let t0 = Instant::now();
        let mut r = sample_round();
        r.selection.focus(&mut r.grid, crate::sim::grid::Pos::new(1, 4));
        assert_eq!(r.selection.focused_text(&r.grid), "[%]");
        let mut rng = zero_rng();
        use_special(&mut r, 0, 0.66, &mut rng, t0);
        assert_eq!(r.selection.focused_text(&r.grid), FILLER.to_string());
        assert_eq!(r.selection.active_cells().len(), 1);
    }

    // ── tick ──

    #[test]
    fn lockout_expires_once() {
        let t0 = Instant::now();
        let mut r = sample_round();
        for n in 0..5 {
            guess(&mut r, 0, LOCKOUT, at(t0, n)).unwrap();
        }
        let locked_at = at(t0, 4);
        assert!(tick(&mut r, locked_at + Duration::from_secs(29)).is_empty());
        assert_eq!(tick(&mut r, locked_at + LOCKOUT), vec![GameEvent::LockoutExpired]);
        assert!(tick(&mut r, locked_at + LOCKOUT * 2).is_empty());
    }

    #[test]
    fn tick_is_idle_while_playing() {
        let mut r = sample_round();
        assert!(tick(&mut r, Instant::now()).is_empty());
    }

    // ── whole round ──

    #[test]
    fn example_dictionary_round() {
        let cfg = GameConfig::default();
        let dict = Dictionary::parse("apple beacon garden planet silver");
        let mut rng = StdRng::seed_from_u64(2024);
        let t0 = Instant::now();

        let mut r = Round::start(&dict, &cfg, &mut rng).unwrap();
        let secret = r.state.secret;
        let dud = (0..r.state.candidates.len()).find(|&id| id != secret);

        if let Some(dud) = dud {
            let ev = guess(&mut r, dud, LOCKOUT, t0).unwrap();
            match &ev[0] {
                GameEvent::GuessDenied { likeness, lives, .. } => {
                    assert!(*likeness < 6);
                    assert_eq!(*lives, 4);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(r.phase(), RoundPhase::Playing);
        }

        guess(&mut r, secret, LOCKOUT, at(t0, 1)).unwrap();
        assert_eq!(r.phase(), RoundPhase::Won);
    }
}
