/// Keyboard and mouse input.
///
/// Drains crossterm events once per frame and reduces them to shell
/// `Command`s:
///   - Arrows        → Grid(Move)
///   - Enter         → Grid(Activate)
///   - Backspace     → Erase
///   - printable key → Text (the shell decides whether WASD moves)
///   - mouse move    → HoverEnter / HoverExit (only on change)
///   - left click    → ActivateAt
///
/// Only presses count; Release events are dropped.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::sim::dispatch::InputEvent;
use crate::sim::grid::{MoveDir, Pos};
use crate::sim::terminal::Command;
use super::renderer::GridLayout;

pub struct InputState {
    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
    mouse_events: Vec<MouseEvent>,
    hovered: Option<Pos>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(8),
            mouse_events: Vec::with_capacity(8),
            hovered: None,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();
        self.mouse_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                }
                Ok(Event::Mouse(m)) => self.mouse_events.push(m),
                _ => {}
            }
        }
    }

    /// Commands for this frame, keys first. `layout` maps mouse
    /// coordinates to grid cells; without it the mouse is ignored.
    pub fn commands(&mut self, layout: Option<&GridLayout>) -> Vec<Command> {
        let mut out: Vec<Command> = self.raw_events.iter().filter_map(key_command).collect();
        match layout {
            Some(layout) => {
                for m in &self.mouse_events {
                    if let Some(cmd) = mouse_command(m, layout, &mut self.hovered) {
                        out.push(cmd);
                    }
                }
            }
            None => self.hovered = None,
        }
        out
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn esc_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| k.code == KeyCode::Esc)
    }
}

pub fn key_command(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release { return None; }
    let cmd = match key.code {
        KeyCode::Up => Command::Grid(InputEvent::Move(MoveDir::Up)),
        KeyCode::Down => Command::Grid(InputEvent::Move(MoveDir::Down)),
        KeyCode::Left => Command::Grid(InputEvent::Move(MoveDir::Left)),
        KeyCode::Right => Command::Grid(InputEvent::Move(MoveDir::Right)),
        KeyCode::Enter => Command::Grid(InputEvent::Activate),
        KeyCode::Backspace => Command::Erase,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Command::Text(c),
        _ => return None,
    };
    Some(cmd)
}

/// Hover is tracked in `hovered` so that only changes are reported.
pub fn mouse_command(m: &MouseEvent, layout: &GridLayout, hovered: &mut Option<Pos>) -> Option<Command> {
    let cell = layout.cell_at(m.column as usize, m.row as usize);
    match m.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            if cell == *hovered { return None; }
            *hovered = cell;
            Some(Command::Grid(match cell {
                Some(pos) => InputEvent::HoverEnter(pos),
                None => InputEvent::HoverExit,
            }))
        }
        MouseEventKind::Down(MouseButton::Left) => {
            cell.map(|pos| Command::Grid(InputEvent::ActivateAt(pos)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    fn layout() -> GridLayout {
        GridLayout { origin_x: 2, origin_y: 5, rows: 34, columns: 12, row_stride: 17 }
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(key_command(&key(KeyCode::Left)), Some(Command::Grid(InputEvent::Move(MoveDir::Left))));
        assert_eq!(key_command(&key(KeyCode::Enter)), Some(Command::Grid(InputEvent::Activate)));
        assert_eq!(key_command(&key(KeyCode::Backspace)), Some(Command::Erase));
        assert_eq!(key_command(&key(KeyCode::Char('w'))), Some(Command::Text('w')));
        assert_eq!(key_command(&key(KeyCode::F(5))), None);
    }

    #[test]
    fn control_chords_and_releases_are_not_text() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_command(&ctrl_c), None);
        let mut up = key(KeyCode::Enter);
        up.kind = KeyEventKind::Release;
        assert_eq!(key_command(&up), None);
    }

    #[test]
    fn hover_reports_only_changes() {
        let l = layout();
        let mut hovered = None;
        // first cell of row 0: x = 2 + 7
        let over = mouse(MouseEventKind::Moved, 9, 5);
        assert_eq!(
            mouse_command(&over, &l, &mut hovered),
            Some(Command::Grid(InputEvent::HoverEnter(Pos::new(0, 0)))),
        );
        assert_eq!(mouse_command(&over, &l, &mut hovered), None);

        let off = mouse(MouseEventKind::Moved, 0, 0);
        assert_eq!(mouse_command(&off, &l, &mut hovered), Some(Command::Grid(InputEvent::HoverExit)));
        assert_eq!(mouse_command(&off, &l, &mut hovered), None);
    }

    #[test]
    fn click_activates_cell_under_pointer() {
        let l = layout();
        let mut hovered = None;
        let click = mouse(MouseEventKind::Down(MouseButton::Left), 9 + 21, 6);
        assert_eq!(
            mouse_command(&click, &l, &mut hovered),
            Some(Command::Grid(InputEvent::ActivateAt(Pos::new(18, 0)))),
        );
        let miss = mouse(MouseEventKind::Down(MouseButton::Left), 1, 6);
        assert_eq!(mouse_command(&miss, &l, &mut hovered), None);
        let right = mouse(MouseEventKind::Down(MouseButton::Right), 9, 5);
        assert_eq!(mouse_command(&right, &l, &mut hovered), None);
    }
}
