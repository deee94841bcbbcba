/// Grid model: the symbol stream reshaped into fixed-width rows.
///
/// ## Group index
///
/// `words[id]` / `specials[id]` list the cells of each group in reading
/// order. Built once from the symbol stream; a group's list is emptied
/// when the group is disabled, so "has cells" == "still interactive".
///
/// Cells are never added or removed after construction, only mutated.

use crate::domain::symbol::{Group, Symbol};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

/// Cursor direction (one step per key press)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

/// Pure row-major reshape. The last row may be short if `symbols`
/// is not a multiple of `columns`.
pub fn to_grid(symbols: Vec<Symbol>, columns: usize) -> Vec<Vec<Symbol>> {
    let columns = columns.max(1);
    let mut rows = Vec::with_capacity(symbols.len().div_ceil(columns));
    let mut iter = symbols.into_iter().peekable();
    while iter.peek().is_some() {
        rows.push(iter.by_ref().take(columns).collect());
    }
    rows
}

#[derive(Clone, Debug)]
pub struct Grid {
    rows: Vec<Vec<Symbol>>,
    columns: usize,
    words: Vec<Vec<Pos>>,
    specials: Vec<Vec<Pos>>,
}

impl Grid {
    pub fn new(symbols: Vec<Symbol>, columns: usize) -> Self {
        let rows = to_grid(symbols, columns);
        let mut words: Vec<Vec<Pos>> = Vec::new();
        let mut specials: Vec<Vec<Pos>> = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            for (c, sym) in row.iter().enumerate() {
                let (list, id) = match sym.group {
                    Some(Group::Word(id)) => (&mut words, id),
                    Some(Group::Special(id)) => (&mut specials, id),
                    None => continue,
                };
                if list.len() <= id {
                    list.resize(id + 1, Vec::new());
                }
                list[id].push(Pos::new(r, c));
            }
        }

        Grid { rows, columns: columns.max(1), words, specials }
    }

    // ── Shape ──

    pub fn rows(&self) -> &[Vec<Symbol>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    #[allow(dead_code)]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    // ── Cell access ──

    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<&Symbol> {
        self.rows.get(pos.row).and_then(|r| r.get(pos.col))
    }

    #[inline]
    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut Symbol> {
        self.rows.get_mut(pos.row).and_then(|r| r.get_mut(pos.col))
    }

    /// Cardinal neighbour, `None` past any edge (no wraparound).
    pub fn neighbor(&self, pos: Pos, dir: MoveDir) -> Option<Pos> {
        let next = match dir {
            MoveDir::Up => Pos::new(pos.row.checked_sub(1)?, pos.col),
            MoveDir::Down => Pos::new(pos.row + 1, pos.col),
            MoveDir::Left => Pos::new(pos.row, pos.col.checked_sub(1)?),
            MoveDir::Right => Pos::new(pos.row, pos.col + 1),
        };
        self.cell(next).map(|_| next)
    }

    // ── Group index ──

    /// Cells of a group, empty once the group is disabled.
    pub fn group_cells(&self, group: Group) -> &[Pos] {
        let list = match group {
            Group::Word(id) => self.words.get(id),
            Group::Special(id) => self.specials.get(id),
        };
        list.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_text(&self, group: Group) -> String {
        self.group_cells(group)
            .iter()
            .filter_map(|&p| self.cell(p))
            .map(|s| s.text)
            .collect()
    }

    /// Word ids that still have interactive cells.
    pub fn live_words(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter()
            .enumerate()
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(id, _)| id)
    }

    /// Turn every cell of `group` into inert filler and drop it from the index.
    pub fn disable_group(&mut self, group: Group) {
        let cells = match group {
            Group::Word(id) => self.words.get_mut(id).map(std::mem::take),
            Group::Special(id) => self.specials.get_mut(id).map(std::mem::take),
        }
        .unwrap_or_default();
        for pos in cells {
            if let Some(sym) = self.cell_mut(pos) {
                sym.disable();
            }
        }
    }

    pub fn set_active(&mut self, cells: &[Pos], active: bool) {
        for &pos in cells {
            if let Some(sym) = self.cell_mut(pos) {
                sym.active = active;
            }
        }
    }

    /// Wipe the board (lock-out / win). Shape is kept.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            for sym in row.iter_mut() {
                *sym = Symbol::noise(' ');
            }
        }
        self.words.iter_mut().for_each(Vec::clear);
        self.specials.iter_mut().for_each(Vec::clear);
    }
}
