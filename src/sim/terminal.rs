/// TerminalState: the shell around the puzzle.
///
/// ## Phases
///
/// ```text
///   Boot ──(typed + pause, or skip)──▶ Login
///   Login ──(credentials ok)─────────▶ Hacking
///   Hacking ──(secret guessed)───────▶ Accepted
///   Hacking ──(lives exhausted)──────▶ Locked
///   Locked ──(lockout expired)───────▶ Login
///   Accepted ──[Restart]─────────────▶ Hacking (fresh round)
///   Accepted ──[Exit terminal]───────▶ Login
/// ```
///
/// Two logs: `screen` holds full-screen text (boot, prompts, header,
/// lock/win screens); `feedback` is the column beside the grid.

use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::domain::dictionary::Dictionary;
use crate::error::TermlinkError;
use crate::ui::presenter::{self, Display, Style};
use crate::ui::templates::template;
use crate::ui::typer::OutputLog;
use super::dispatch::{self, InputEvent};
use super::event::GameEvent;
use super::grid::MoveDir;
use super::round::Round;
use super::step;

const SCREEN_LINES: usize = 40;
const FEEDBACK_LINES: usize = 30;
const FIELD_MAX: usize = 24;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Boot,
    Login,
    Hacking,
    Locked,
    Accepted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoginField {
    User,
    Password,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutroChoice {
    Restart,
    Exit,
}

/// Device-independent command for the shell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Text(char),
    Erase,
    Grid(InputEvent),
}

pub struct TerminalState {
    pub phase: Phase,
    pub screen: OutputLog,
    pub feedback: OutputLog,
    pub round: Option<Round>,
    pub user: String,
    pub password: String,
    pub field: LoginField,
    pub choice: OutroChoice,
    boot_pause: u32,
    dictionary: Dictionary,
    cfg: GameConfig,
    rng: StdRng,
}

impl TerminalState {
    pub fn new(cfg: GameConfig, dictionary: Dictionary, rng: StdRng) -> Result<Self, TermlinkError> {
        let chars = cfg.timing.type_chars_per_tick;
        let mut term = TerminalState {
            phase: Phase::Boot,
            screen: OutputLog::new(chars, SCREEN_LINES),
            feedback: OutputLog::new(chars, FEEDBACK_LINES),
            round: None,
            user: String::new(),
            password: String::new(),
            field: LoginField::User,
            choice: OutroChoice::Restart,
            boot_pause: cfg.timing.boot_pause_ticks,
            dictionary,
            cfg,
            rng,
        };
        term.screen.display(template("boot")?, Style::Plain);
        Ok(term)
    }

    // ── Per-tick update ──

    pub fn tick(&mut self, now: Instant) -> Result<(), TermlinkError> {
        self.screen.tick();
        self.feedback.tick();

        match self.phase {
            Phase::Boot => {
                if self.screen.is_idle() {
                    self.boot_pause = self.boot_pause.saturating_sub(1);
                    if self.boot_pause == 0 {
                        self.enter_login()?;
                    }
                }
            }
            Phase::Hacking => {
                if let Some(round) = &mut self.round {
                    if round.guard.is_pending() && self.feedback.is_idle() {
                        round.guard.release();
                    }
                }
            }
            Phase::Locked => {
                let events = match &mut self.round {
                    Some(round) => step::tick(round, now),
                    None => vec![],
                };
                if events.contains(&GameEvent::LockoutExpired) {
                    info!("lockout expired");
                    self.enter_login()?;
                }
            }
            Phase::Login | Phase::Accepted => {}
        }
        Ok(())
    }

    // ── Input ──

    pub fn apply(&mut self, cmd: Command, now: Instant) -> Result<(), TermlinkError> {
        match self.phase {
            Phase::Boot => {
                if cmd == Command::Grid(InputEvent::Activate) {
                    self.screen.finish();
                    self.enter_login()?;
                }
            }
            Phase::Login => self.apply_login(cmd)?,
            Phase::Hacking => self.apply_hacking(cmd, now)?,
            Phase::Locked => {}
            Phase::Accepted => self.apply_outro(cmd)?,
        }
        Ok(())
    }

    fn apply_login(&mut self, cmd: Command) -> Result<(), TermlinkError> {
        let field = match self.field {
            LoginField::User => &mut self.user,
            LoginField::Password => &mut self.password,
        };
        match cmd {
            Command::Text(c) if !c.is_control() => {
                if field.chars().count() < FIELD_MAX {
                    field.push(c);
                }
            }
            Command::Erase => { field.pop(); }
            Command::Grid(InputEvent::Activate) => match self.field {
                LoginField::User => self.field = LoginField::Password,
                LoginField::Password => self.submit_login()?,
            },
            _ => {}
        }
        Ok(())
    }

    fn submit_login(&mut self) -> Result<(), TermlinkError> {
        let ok = self.user == self.cfg.login.user && self.password == self.cfg.login.password;
        self.password.clear();
        self.field = LoginField::User;
        if ok {
            info!("login accepted for {}", self.user);
            self.user.clear();
            return self.start_round();
        }
        warn!("login rejected for {}", self.user);
        self.user.clear();
        self.screen.clear();
        self.screen.display(&["Incorrect user and/or password.", "Please try again", ""], Style::Alert);
        Ok(())
    }

    fn apply_hacking(&mut self, cmd: Command, now: Instant) -> Result<(), TermlinkError> {
        let input = match cmd {
            Command::Grid(ev) => ev,
            Command::Text(' ') => InputEvent::Activate,
            Command::Text(c) => match c.to_ascii_lowercase() {
                'w' => InputEvent::Move(MoveDir::Up),
                's' => InputEvent::Move(MoveDir::Down),
                'a' => InputEvent::Move(MoveDir::Left),
                'd' => InputEvent::Move(MoveDir::Right),
                _ => return Ok(()),
            },
            Command::Erase => return Ok(()),
        };
        let Some(round) = &mut self.round else { return Ok(()) };
        let events = dispatch::dispatch(round, input, &self.cfg, &mut self.rng, now);
        self.handle_events(&events)
    }

    fn apply_outro(&mut self, cmd: Command) -> Result<(), TermlinkError> {
        match cmd {
            Command::Grid(InputEvent::Move(_)) => {
                self.choice = match self.choice {
                    OutroChoice::Restart => OutroChoice::Exit,
                    OutroChoice::Exit => OutroChoice::Restart,
                };
            }
            Command::Grid(InputEvent::Activate) => match self.choice {
                OutroChoice::Restart => self.start_round()?,
                OutroChoice::Exit => self.enter_login()?,
            },
            _ => {}
        }
        Ok(())
    }

    // ── Transitions ──

    /// New round from the dictionary. A configured word file is re-read
    /// every round. Fails before touching the screen if the header
    /// template, the word file or the word bucket is unavailable.
    pub fn start_round(&mut self) -> Result<(), TermlinkError> {
        let header = template("hacking")?;
        if let Some(path) = &self.cfg.dictionary {
            self.dictionary = Dictionary::load(path)?;
        }
        let round = Round::start(&self.dictionary, &self.cfg, &mut self.rng)?;
        self.screen.clear();
        self.screen.display(header, Style::Plain);
        self.feedback.clear();
        self.round = Some(round);
        self.phase = Phase::Hacking;
        Ok(())
    }

    fn enter_login(&mut self) -> Result<(), TermlinkError> {
        self.round = None;
        self.user.clear();
        self.password.clear();
        self.field = LoginField::User;
        self.screen.clear();
        self.screen.display(template("login")?, Style::Plain);
        self.phase = Phase::Login;
        Ok(())
    }

    fn handle_events(&mut self, events: &[GameEvent]) -> Result<(), TermlinkError> {
        for ev in events {
            match ev {
                GameEvent::PasswordAccepted { .. } => {
                    presenter::present(ev, &mut self.screen)?;
                    self.feedback.clear();
                    self.choice = OutroChoice::Restart;
                    self.phase = Phase::Accepted;
                }
                GameEvent::TerminalLocked { .. } => {
                    presenter::present(ev, &mut self.screen)?;
                    self.feedback.clear();
                    self.phase = Phase::Locked;
                }
                GameEvent::InputIgnored => debug!("input ignored while resolving"),
                _ => presenter::present(ev, &mut self.feedback)?,
            }
        }
        Ok(())
    }
}
