/// Single input dispatcher for the puzzle grid.
///
/// Device layers (keyboard, mouse, gamepad) reduce their raw events to
/// `InputEvent`s keyed by grid coordinate; this is the only place that
/// turns them into selection changes and round transitions.

use std::time::Instant;

use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::symbol::Group;
use super::event::GameEvent;
use super::grid::{MoveDir, Pos};
use super::round::{Round, RoundPhase};
use super::step;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Move(MoveDir),
    /// Enter / click on the focused cell.
    Activate,
    /// Click on a specific cell: focus it, then activate.
    ActivateAt(Pos),
    HoverEnter(Pos),
    HoverExit,
}

pub fn dispatch<R: Rng + ?Sized>(
    round: &mut Round,
    input: InputEvent,
    cfg: &GameConfig,
    rng: &mut R,
    now: Instant,
) -> Vec<GameEvent> {
    if round.phase() != RoundPhase::Playing { return vec![]; }

    match input {
        InputEvent::Move(dir) => {
            round.selection.step(&mut round.grid, dir, round.row_stride);
            vec![]
        }
        InputEvent::HoverEnter(pos) => {
            round.selection.focus(&mut round.grid, pos);
            vec![]
        }
        InputEvent::HoverExit => {
            round.selection.blur(&mut round.grid);
            vec![]
        }
        InputEvent::ActivateAt(pos) => {
            if round.grid.cell(pos).is_none() { return vec![]; }
            round.selection.focus(&mut round.grid, pos);
            activate(round, cfg, rng, now)
        }
        InputEvent::Activate => activate(round, cfg, rng, now),
    }
}

fn activate<R: Rng + ?Sized>(
    round: &mut Round,
    cfg: &GameConfig,
    rng: &mut R,
    now: Instant,
) -> Vec<GameEvent> {
    match round.selection.focused_group(&round.grid) {
        Some(Group::Word(id)) => {
            step::guess(round, id, cfg.timing.lockout(), now).unwrap_or_else(|e| {
                debug!("guess ignored: {e}");
                vec![]
            })
        }
        Some(Group::Special(id)) => step::use_special(round, id, cfg.puzzle.dud_chance, rng, now),
        None => vec![],
    }
}
