/// Outcome presenter: turns round events into terminal lines.
///
/// ## Message Table
/// ┌──────────────────┬────────────────────────────────────────────────┐
/// │ Event            │ Lines                                          │
/// ├──────────────────┼────────────────────────────────────────────────┤
/// │ GuessDenied      │ >WORD / >Entry denied / >Likeness=N            │
/// │ DudRemoved       │ >TOKEN / >Dud removed.                         │
/// │ TriesReset       │ >TOKEN / >Tries reset.                         │
/// │ TerminalLocked   │ (clear) locked template, unlock notice         │
/// │ PasswordAccepted │ (clear) accepted template, > Password accepted │
/// │ others           │ nothing                                        │
/// └──────────────────┴────────────────────────────────────────────────┘
///
/// Pacing belongs to the `Display` implementation.

use std::time::Duration;

use crate::error::TermlinkError;
use crate::sim::event::GameEvent;
use super::templates::template;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Style {
    Plain,
    Alert,
    Success,
}

/// Anything that can show batches of styled lines.
pub trait Display {
    fn display(&mut self, lines: &[&str], style: Style);
    fn clear(&mut self);
}

pub fn present(event: &GameEvent, out: &mut dyn Display) -> Result<(), TermlinkError> {
    match event {
        GameEvent::GuessDenied { guess, likeness, .. } => {
            let echo = format!(">{guess}");
            let score = format!(">Likeness={likeness}");
            out.display(&[echo.as_str(), ">Entry denied", score.as_str()], Style::Plain);
        }
        GameEvent::DudRemoved { token, .. } => {
            let echo = format!(">{token}");
            out.display(&[echo.as_str(), ">Dud removed."], Style::Plain);
        }
        GameEvent::TriesReset { token, .. } => {
            let echo = format!(">{token}");
            out.display(&[echo.as_str(), ">Tries reset."], Style::Plain);
        }
        GameEvent::TerminalLocked { unlock_in } => {
            let lines = template("locked")?;
            out.clear();
            out.display(lines, Style::Alert);
            let notice = unlock_notice(*unlock_in);
            out.display(&[notice.as_str()], Style::Alert);
        }
        GameEvent::PasswordAccepted { .. } => {
            let lines = template("accepted")?;
            out.clear();
            out.display(lines, Style::Plain);
            out.display(&["> Password accepted"], Style::Success);
        }
        GameEvent::LockoutExpired | GameEvent::InputIgnored => {}
    }
    Ok(())
}

pub fn lives_line(lives: u32) -> String {
    format!("Attempts remaining: {}", "■ ".repeat(lives as usize))
}

pub fn unlock_notice(wait: Duration) -> String {
    format!("Terminal will unlock in {} seconds", whole_secs(wait))
}

pub fn countdown_line(remaining: Duration) -> String {
    format!("Unlocking in {} s", whole_secs(remaining))
}

/// Seconds rounded up, so "0" only shows once the wait is over.
fn whole_secs(d: Duration) -> u64 {
    d.as_secs().saturating_add(u64::from(d.subsec_nanos() > 0))
}
