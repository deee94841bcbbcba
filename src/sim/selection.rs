/// Cursor focus and directional movement over the grid.
///
/// ## Focus groups
///
/// Focusing a cell highlights every cell of its word or special, or just
/// the cell itself for noise. Exactly one group carries `active` at a
/// time: the previous group is cleared before the new one is set.
///
/// ## Movement Table
/// ┌───────┬────────────────────────────────────────────────────────┐
/// │ Key   │ Target                                                 │
/// ├───────┼────────────────────────────────────────────────────────┤
/// │ Up    │ same column, row - 1; none at the top edge             │
/// │ Down  │ same column, row + 1; none at the bottom edge          │
/// │ Left  │ col - 1; at col 0: LAST cell of row - stride           │
/// │ Right │ first skip to the group's last cell in this row, then  │
/// │       │ col + 1; at row end: FIRST cell of row + stride        │
/// └───────┴────────────────────────────────────────────────────────┘
///
/// The stride wrap follows the two-block layout (rows 0..stride on the
/// left, the rest on the right). Left and Right are deliberately not
/// mirror images: Right skips over a group, Left walks it cell by cell.

use crate::domain::symbol::Group;
use super::grid::{Grid, MoveDir, Pos};

#[derive(Clone, Debug)]
pub struct Selection {
    focus: Pos,
    active: Vec<Pos>,
}

impl Selection {
    /// Start with the first cell focused.
    pub fn new(grid: &mut Grid) -> Self {
        let mut sel = Selection { focus: Pos::new(0, 0), active: Vec::new() };
        sel.focus(grid, Pos::new(0, 0));
        sel
    }

    #[allow(dead_code)]
    pub fn focused(&self) -> Pos {
        self.focus
    }

    #[allow(dead_code)]
    pub fn active_cells(&self) -> &[Pos] {
        &self.active
    }

    /// Group of the focused cell, if it belongs to one.
    pub fn focused_group(&self, grid: &Grid) -> Option<Group> {
        grid.cell(self.focus).and_then(|s| s.group)
    }

    /// All cells sharing `pos`'s word/special, or just `pos`.
    pub fn group_at(grid: &Grid, pos: Pos) -> Vec<Pos> {
        match grid.cell(pos).and_then(|s| s.group) {
            Some(group) => grid.group_cells(group).to_vec(),
            None => vec![pos],
        }
    }

    /// Move focus to `pos` and highlight its group. Out-of-grid is ignored.
    pub fn focus(&mut self, grid: &mut Grid, pos: Pos) -> &[Pos] {
        if grid.cell(pos).is_none() {
            return &self.active;
        }
        grid.set_active(&self.active, false);
        self.focus = pos;
        self.active = Self::group_at(grid, pos);
        grid.set_active(&self.active, true);
        &self.active
    }

    /// Re-evaluate the current focus (its group may have been disabled).
    pub fn refocus(&mut self, grid: &mut Grid) {
        self.focus(grid, self.focus);
    }

    /// Pointer left the cell: drop the highlight but keep the cursor.
    pub fn blur(&mut self, grid: &mut Grid) {
        grid.set_active(&self.active, false);
        self.active.clear();
    }

    /// Text under the cursor (whole word/special, or the single glyph).
    pub fn focused_text(&self, grid: &Grid) -> String {
        Self::group_at(grid, self.focus)
            .iter()
            .filter_map(|&p| grid.cell(p))
            .map(|s| s.text)
            .collect()
    }

    /// Apply one key press. Returns true if the highlighted group changed.
    pub fn step(&mut self, grid: &mut Grid, dir: MoveDir, stride: usize) -> bool {
        let (from, target) = next_pos(grid, self.focus, dir, stride);
        match target {
            Some(pos) => {
                self.focus(grid, pos);
                true
            }
            None => {
                // Right may park the cursor on the group's tail without moving on.
                self.focus = from;
                false
            }
        }
    }
}

/// Pure movement rule. See the table above.
///
/// Returns `(origin, target)`: `origin` differs from `pos` only when Right
/// first skipped to the end of the focused group.
pub fn next_pos(grid: &Grid, pos: Pos, dir: MoveDir, stride: usize) -> (Pos, Option<Pos>) {
    match dir {
        MoveDir::Up | MoveDir::Down => (pos, grid.neighbor(pos, dir)),
        MoveDir::Left => {
            let target = grid.neighbor(pos, MoveDir::Left).or_else(|| {
                let row = pos.row.checked_sub(stride)?;
                let len = grid.row_len(row);
                (len > 0).then(|| Pos::new(row, len - 1))
            });
            (pos, target)
        }
        MoveDir::Right => {
            let from = group_tail_in_row(grid, pos);
            let target = grid.neighbor(from, MoveDir::Right).or_else(|| {
                let row = from.row + stride;
                (grid.row_len(row) > 0).then(|| Pos::new(row, 0))
            });
            (from, target)
        }
    }
}

/// Last cell in `pos`'s row that belongs to the same group as `pos`.
fn group_tail_in_row(grid: &Grid, pos: Pos) -> Pos {
    let Some(group) = grid.cell(pos).and_then(|s| s.group) else {
        return pos;
    };
    grid.group_cells(group)
        .iter()
        .filter(|p| p.row == pos.row)
        .max_by_key(|p| p.col)
        .copied()
        .unwrap_or(pos)
}
