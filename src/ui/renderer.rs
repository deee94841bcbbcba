/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Hacking screen layout:
///
/// ```text
///   Welcome to ROBCO Industries (TM) Termlink
///   Password Required
///
///   Attempts remaining: ■ ■ ■ ■ ■
///
///   0xF964 .$BEACON.{GA  0xF9C0 ]?'#:@(%)..!  >PLANET
///   0xF96A RDEN.[%].<\/  0xF9C4 ...           >Entry denied
///   ...    (row_stride rows per block)        >Likeness=1
///                                             >GARDEN
/// ```

use std::io::{self, BufWriter, Write};
use std::time::Instant;

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::grid::Pos;
use crate::sim::round::Round;
use crate::sim::terminal::{LoginField, OutroChoice, Phase, TerminalState};
use super::presenter::{countdown_line, lives_line, Style};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 8, g: 20, b: 12 };
    const PHOSPHOR: Color = Color::Rgb { r: 64, g: 255, b: 128 };
    const DIM: Color = Color::Rgb { r: 30, g: 140, b: 70 };
    const AMBER: Color = Color::Rgb { r: 255, g: 182, b: 66 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Cell::PHOSPHOR,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = bg;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }
}

// ── GridLayout: grid coordinates <-> terminal coordinates ──

/// Row label width: "0xABCD ".
const ADDR_W: usize = 7;
const BLOCK_GAP: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridLayout {
    pub origin_x: usize,
    pub origin_y: usize,
    pub rows: usize,
    pub columns: usize,
    pub row_stride: usize,
}

impl GridLayout {
    fn block_width(&self) -> usize {
        ADDR_W + self.columns + BLOCK_GAP
    }

    fn blocks(&self) -> usize {
        self.rows.div_ceil(self.row_stride.max(1))
    }

    /// Total width including the trailing gap.
    pub fn width(&self) -> usize {
        self.blocks() * self.block_width()
    }

    /// Terminal position of a row's address label.
    pub fn row_origin(&self, row: usize) -> (usize, usize) {
        let stride = self.row_stride.max(1);
        let x = self.origin_x + (row / stride) * self.block_width();
        let y = self.origin_y + row % stride;
        (x, y)
    }

    pub fn cell_origin(&self, pos: Pos) -> (usize, usize) {
        let (x, y) = self.row_origin(pos.row);
        (x + ADDR_W + pos.col, y)
    }

    /// Grid cell under terminal coordinate `(x, y)`, if any.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<Pos> {
        let stride = self.row_stride.max(1);
        let dy = y.checked_sub(self.origin_y)?;
        let dx = x.checked_sub(self.origin_x)?;
        if dy >= stride { return None; }
        let block = dx / self.block_width();
        let col = (dx % self.block_width()).checked_sub(ADDR_W)?;
        if col >= self.columns { return None; }
        let row = block * stride + dy;
        (row < self.rows).then_some(Pos::new(row, col))
    }
}

// ── Renderer ──

/// Vertical offsets on the hacking screen
const HEADER_ROW: usize = 0;
const LIVES_ROW: usize = 3;
const GRID_ROW: usize = 5;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    layout: Option<GridLayout>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            layout: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Layout of the grid drawn in the last frame (hacking phase only).
    pub fn layout(&self) -> Option<GridLayout> {
        self.layout
    }

    pub fn render(&mut self, term: &TerminalState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change -> clear for clean transition
        if self.last_phase != Some(term.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(term.phase);
        }

        self.front.clear();
        self.layout = None;

        match term.phase {
            Phase::Boot => { self.compose_screen_log(term, 1); }
            Phase::Login => self.compose_login(term),
            Phase::Hacking => self.compose_hacking(term),
            Phase::Locked => self.compose_locked(term),
            Phase::Accepted => self.compose_accepted(term),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Cell::PHOSPHOR;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Cell::PHOSPHOR),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Typed screen log from row `top`. Returns the next free row.
    fn compose_screen_log(&mut self, term: &TerminalState, top: usize) -> usize {
        let mut y = top;
        for (text, style) in term.screen.visible() {
            self.front.put_str(2, y, text, style_fg(style), Cell::BASE_BG);
            y += 1;
        }
        y
    }

    fn compose_login(&mut self, term: &TerminalState) {
        let y = self.compose_screen_log(term, 1);
        if !term.screen.is_idle() { return; }

        let masked = "*".repeat(term.password.chars().count());
        let prompts = [
            ("Username: ", term.user.as_str(), LoginField::User),
            ("Password: ", masked.as_str(), LoginField::Password),
        ];
        for (i, (label, value, field)) in prompts.iter().enumerate() {
            let line = if *field == term.field {
                format!("{label}{value}█")
            } else {
                format!("{label}{value}")
            };
            self.front.put_str(2, y + i, &line, Cell::PHOSPHOR, Cell::BASE_BG);
        }
    }

    fn compose_hacking(&mut self, term: &TerminalState) {
        let round = match &term.round {
            Some(r) => r,
            None => return,
        };

        for (i, (text, style)) in term.screen.visible().into_iter().enumerate() {
            self.front.put_str(2, HEADER_ROW + i, text, style_fg(style), Cell::BASE_BG);
        }
        self.front.put_str(2, LIVES_ROW, &lives_line(round.state.lives), Cell::PHOSPHOR, Cell::BASE_BG);

        let layout = GridLayout {
            origin_x: 2,
            origin_y: GRID_ROW,
            rows: round.grid.row_count(),
            columns: round.grid.columns(),
            row_stride: round.row_stride,
        };
        self.compose_grid(round, &layout);
        self.compose_feedback(term, round, &layout);
        self.layout = Some(layout);

        let help = "Arrows/WASD move  Enter/Click select  Esc quit";
        if self.front.height > 0 {
            self.front.put_str(2, self.front.height - 1, help, Cell::DIM, Cell::BASE_BG);
        }
    }

    fn compose_grid(&mut self, round: &Round, layout: &GridLayout) {
        for (r, row) in round.grid.rows().iter().enumerate() {
            let (ax, ay) = layout.row_origin(r);
            if let Some(addr) = round.addresses.get(r) {
                self.front.put_str(ax, ay, &format!("0x{addr:04X}"), Cell::PHOSPHOR, Cell::BASE_BG);
            }
            for (c, sym) in row.iter().enumerate() {
                let (x, y) = layout.cell_origin(Pos::new(r, c));
                let cell = if sym.active {
                    Cell::from_char(sym.text, Cell::BASE_BG, Cell::PHOSPHOR)
                } else {
                    Cell::from_char(sym.text, Cell::PHOSPHOR, Cell::BASE_BG)
                };
                self.front.set(x, y, cell);
            }
        }
    }

    /// Feedback column beside the grid; the `>` cursor line sits on the last block row.
    fn compose_feedback(&mut self, term: &TerminalState, round: &Round, layout: &GridLayout) {
        let x = layout.origin_x + layout.width();
        let bottom = layout.origin_y + layout.row_stride.max(1) - 1;

        let cursor = format!(">{}", round.selection.focused_text(&round.grid));
        self.front.put_str(x, bottom, &cursor, Cell::PHOSPHOR, Cell::BASE_BG);

        let lines = term.feedback.visible();
        let room = bottom.saturating_sub(layout.origin_y);
        let skip = lines.len().saturating_sub(room);
        for (i, (text, style)) in lines.into_iter().skip(skip).enumerate() {
            let y = bottom - room + i;
            self.front.put_str(x, y, text, style_fg(style), Cell::BASE_BG);
        }
    }

    fn compose_locked(&mut self, term: &TerminalState) {
        let y = self.compose_screen_log(term, 1);
        if !term.screen.is_idle() { return; }
        let remaining = term.round.as_ref()
            .map(|r| r.state.lockout_remaining(Instant::now()))
            .unwrap_or_default();
        self.front.put_str(2, y + 1, &countdown_line(remaining), Cell::AMBER, Cell::BASE_BG);
    }

    fn compose_accepted(&mut self, term: &TerminalState) {
        let y = self.compose_screen_log(term, 1);
        if !term.screen.is_idle() { return; }

        let options = [("[Restart]", OutroChoice::Restart), ("[Exit terminal]", OutroChoice::Exit)];
        for (i, (label, choice)) in options.iter().enumerate() {
            let (fg, bg) = if *choice == term.choice {
                (Cell::BASE_BG, Cell::PHOSPHOR)
            } else {
                (Cell::PHOSPHOR, Cell::BASE_BG)
            };
            self.front.put_str(2, y + 1 + i, label, fg, bg);
        }
    }
}

fn style_fg(style: Style) -> Color {
    match style {
        Style::Plain => Cell::PHOSPHOR,
        Style::Alert => Cell::AMBER,
        Style::Success => Color::White,
    }
}
