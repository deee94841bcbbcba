/// Events emitted by round transitions.
/// The presenter turns these into log lines; the shell reacts to the
/// terminal ones (accepted, locked, expired).

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GuessDenied { guess: String, likeness: usize, lives: u32 },
    PasswordAccepted { word: String },
    DudRemoved { token: String, word: String },
    TriesReset { token: String, lives: u32 },
    TerminalLocked { unlock_in: Duration },
    LockoutExpired,
    /// A guess or special arrived while the previous one was still resolving.
    InputIgnored,
}
