/// Round: one puzzle from generation to Won/Locked.
///
/// ## Ownership
///
/// `Round` owns everything a single attempt needs: the grid, the cursor,
/// the row addresses and the `GameState` value. A new attempt (restart,
/// or a fresh login after a lock-out) builds a new `Round`; nothing
/// survives from the previous one.
///
/// ## Guess guard
///
/// At most one guess/special resolves at a time. `GuessGuard` is taken
/// when one is accepted and released by the shell once its output has
/// finished typing, or implicitly when the debounce window elapses.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::dictionary::Dictionary;
use crate::domain::symbol::CandidateWord;
use crate::error::TermlinkError;
use super::generator::{self, Generated};
use super::grid::Grid;
use super::selection::Selection;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundPhase {
    Playing,
    Locked,
    Won,
}

/// Lives, secret and candidate bookkeeping for one round.
#[derive(Clone, Debug)]
pub struct GameState {
    pub lives: u32,
    pub max_lives: u32,
    /// Index into `candidates`.
    pub secret: usize,
    pub candidates: Vec<CandidateWord>,
    pub used_specials: HashSet<usize>,
    pub phase: RoundPhase,
    pub unlock_at: Option<Instant>,
}

impl GameState {
    pub fn new(candidates: Vec<CandidateWord>, secret: usize, max_lives: u32) -> Self {
        GameState {
            lives: max_lives,
            max_lives,
            secret,
            candidates,
            used_specials: HashSet::new(),
            phase: RoundPhase::Playing,
            unlock_at: None,
        }
    }

    pub fn secret_word(&self) -> &str {
        self.candidates.get(self.secret).map_or("", |c| c.text.as_str())
    }

    pub fn candidate(&self, id: usize) -> Option<&CandidateWord> {
        self.candidates.get(id)
    }

    /// Time left on the lock-out, zero once it has passed.
    pub fn lockout_remaining(&self, now: Instant) -> Duration {
        self.unlock_at.map_or(Duration::ZERO, |at| at.saturating_duration_since(now))
    }
}

#[derive(Clone, Debug)]
pub struct GuessGuard {
    pending_since: Option<Instant>,
    window: Duration,
}

impl GuessGuard {
    pub fn new(window: Duration) -> Self {
        GuessGuard { pending_since: None, window }
    }

    /// Take the guard. Fails while a previous action is still inside
    /// the window.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if let Some(since) = self.pending_since {
            if now.saturating_duration_since(since) < self.window {
                return false;
            }
        }
        self.pending_since = Some(now);
        true
    }

    pub fn release(&mut self) {
        self.pending_since = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Round {
    pub grid: Grid,
    pub selection: Selection,
    pub state: GameState,
    pub guard: GuessGuard,
    pub addresses: Vec<u32>,
    pub row_stride: usize,
}

impl Round {
    /// Generate a fresh round from the configured bucket.
    pub fn start<R: Rng + ?Sized>(
        dictionary: &Dictionary,
        cfg: &GameConfig,
        rng: &mut R,
    ) -> Result<Self, TermlinkError> {
        let puzzle = &cfg.puzzle;
        let words = dictionary.bucket(puzzle.word_length)?;
        let generated = generator::generate(words, puzzle.word_length, puzzle, rng)?;
        let addresses = generator::row_addresses(puzzle.rows, rng);
        let round = Self::from_generated(generated, addresses, cfg);
        info!(
            "round started: {} candidates, {} lives",
            round.state.candidates.len(), round.state.lives,
        );
        Ok(round)
    }

    pub fn from_generated(generated: Generated, addresses: Vec<u32>, cfg: &GameConfig) -> Self {
        let mut grid = Grid::new(generated.symbols, cfg.puzzle.columns);
        let selection = Selection::new(&mut grid);
        Round {
            grid,
            selection,
            state: GameState::new(generated.candidates, generated.secret, cfg.puzzle.max_lives),
            guard: GuessGuard::new(cfg.timing.guess_debounce()),
            addresses,
            row_stride: cfg.puzzle.row_stride,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }
}

/// Hand-built round shared by the sim tests.
///
/// 3 rows x 12 cols, four candidates, secret GARDEN (id 1), two specials:
///   row 0: . B E A C O N . G A R D
///   row 1: E N . [ % ] . P L A N E
///   row 2: T . S I L V E R . < # >
#[cfg(test)]
pub(crate) fn sample_round() -> Round {
    use crate::domain::symbol::Symbol;

    let mut s: Vec<Symbol> = Vec::new();
    let word = |s: &mut Vec<Symbol>, text: &str, id: usize| {
        s.extend(text.chars().map(|c| Symbol::word(c, id)));
    };
    let special = |s: &mut Vec<Symbol>, text: &str, id: usize| {
        s.extend(text.chars().map(|c| Symbol::special(c, id)));
    };
    s.push(Symbol::noise('.'));
    word(&mut s, "BEACON", 0);
    s.push(Symbol::noise('.'));
    word(&mut s, "GARDEN", 1);
    s.push(Symbol::noise('.'));
    special(&mut s, "[%]", 0);
    s.push(Symbol::noise('.'));
    word(&mut s, "PLANET", 2);
    s.push(Symbol::noise('.'));
    word(&mut s, "SILVER", 3);
    s.push(Symbol::noise('.'));
    special(&mut s, "<#>", 1);

    let candidates = ["BEACON", "GARDEN", "PLANET", "SILVER"]
        .iter()
        .enumerate()
        .map(|(id, w)| CandidateWord { id, text: (*w).to_string() })
        .collect();

    let mut cfg = GameConfig::default();
    cfg.puzzle.rows = 3;
    cfg.puzzle.row_stride = 3;
    let generated = Generated { symbols: s, candidates, secret: 1, special_count: 2 };
    Round::from_generated(generated, vec![0xF964, 0xF970, 0xF97C], &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Group;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_round_is_consistent() {
        let r = sample_round();
        assert_eq!(r.grid.cell_count(), 36);
        assert_eq!(r.grid.group_text(Group::Word(2)), "PLANET");
        assert_eq!(r.grid.group_text(Group::Special(1)), "<#>");
        assert_eq!(r.state.secret_word(), "GARDEN");
        assert_eq!(r.state.lives, 5);
        assert_eq!(r.phase(), RoundPhase::Playing);
    }

    #[test]
    fn start_builds_a_full_grid() {
        let cfg = GameConfig::default();
        let dict = Dictionary::parse("apple beacon garden planet silver");
        let mut rng = StdRng::seed_from_u64(11);
        let r = Round::start(&dict, &cfg, &mut rng).unwrap();
        assert_eq!(r.grid.cell_count(), 408);
        assert_eq!(r.grid.row_count(), 34);
        assert_eq!(r.addresses.len(), 34);
        assert!(r.state.secret < r.state.candidates.len());
        assert!(r.state.used_specials.is_empty());
    }

    #[test]
    fn start_without_bucket_fails() {
        let cfg = GameConfig::default();
        let dict = Dictionary::parse("apple beacon");
        let mut rng = StdRng::seed_from_u64(1);
        let r = Round::start(&dict, &cfg, &mut rng);
        assert!(matches!(r, Err(TermlinkError::DictionaryUnavailable(_))));
    }

    #[test]
    fn guard_blocks_inside_window_only() {
        let t0 = Instant::now();
        let mut g = GuessGuard::new(Duration::from_millis(5000));
        assert!(g.try_begin(t0));
        assert!(!g.try_begin(t0 + Duration::from_millis(100)));
        assert!(g.try_begin(t0 + Duration::from_millis(5000)));
        g.release();
        assert!(!g.is_pending());
        assert!(g.try_begin(t0 + Duration::from_millis(5001)));
    }

    #[test]
    fn lockout_remaining_saturates() {
        let t0 = Instant::now();
        let mut st = sample_round().state;
        assert_eq!(st.lockout_remaining(t0), Duration::ZERO);
        st.unlock_at = Some(t0 + Duration::from_secs(30));
        assert_eq!(st.lockout_remaining(t0 + Duration::from_secs(10)), Duration::from_secs(20));
        assert_eq!(st.lockout_remaining(t0 + Duration::from_secs(40)), Duration::ZERO);
    }
}
