//! Screen output: minimal ANSI sequences from canvas changes.
//!
//! The screen keeps the last frame it emitted. Each new frame is compared
//! cell by cell and only the differences are written, with cursor moves
//! skipped for adjacent cells and SGR sequences skipped when the color or
//! modifier state is already right. The whole frame goes out in one write.

use crate::render::{Canvas, Cell, Modifiers, Rgb};
use std::io::Write;

/// Terminal state assumed after the last emitted sequence.
#[derive(Debug, Clone, Copy)]
struct PenState {
    cursor_x: u16,
    cursor_y: u16,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    modifiers: Option<Modifiers>,
}

impl PenState {
    const fn unknown() -> Self {
        Self {
            cursor_x: u16::MAX,
            cursor_y: u16::MAX,
            fg: None,
            bg: None,
            modifiers: None,
        }
    }
}

/// Statistics of one emitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells written.
    pub cells_changed: usize,
    /// Cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Whether the screen was cleared first.
    pub full_redraw: bool,
}

/// Double-buffered screen.
#[derive(Debug)]
pub struct Screen {
    front: Option<Canvas>,
    pen: PenState,
    output: Vec<u8>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a screen that will fully redraw on the first frame.
    pub fn new() -> Self {
        Self {
            front: None,
            pen: PenState::unknown(),
            output: Vec::with_capacity(4096),
        }
    }

    /// Force a full redraw on the next frame.
    pub fn invalidate(&mut self) {
        self.front = None;
        self.pen = PenState::unknown();
    }

    /// Bytes of the last prepared frame.
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Build the sequences that turn the last frame into `next`.
    pub fn prepare(&mut self, next: &Canvas) -> FrameStats {
        self.output.clear();
        let mut stats = FrameStats::default();

        let front = match self.front.take() {
            Some(front) if front.width() == next.width() && front.height() == next.height() => Some(front),
            _ => None,
        };
        if front.is_none() {
            self.output.extend_from_slice(b"\x1b[0m\x1b[2J");
            self.pen = PenState::unknown();
            stats.full_redraw = true;
        }

        for (y, row) in (0..next.height()).zip(next.rows()) {
            for (x, cell) in (0..next.width()).zip(row) {
                let unchanged = front
                    .as_ref()
                    .and_then(|f| f.get(x, y))
                    .is_some_and(|old| old == cell);
                if unchanged || cell.is_wide_continuation() {
                    continue;
                }
                stats.cells_changed += 1;
                if self.emit_cell(x, y, cell) {
                    stats.cursor_moves += 1;
                }
            }
        }

        self.output.extend_from_slice(b"\x1b[0m");
        self.pen.fg = None;
        self.pen.bg = None;
        self.pen.modifiers = None;
        self.front = Some(next.clone());
        stats
    }

    /// Prepare `next` and write it to `writer` in a single call.
    pub fn draw<W: Write>(&mut self, next: &Canvas, writer: &mut W) -> std::io::Result<FrameStats> {
        let stats = self.prepare(next);
        writer.write_all(&self.output)?;
        writer.flush()?;
        Ok(stats)
    }

    /// Emit one cell. Returns whether a cursor move was needed.
    fn emit_cell(&mut self, x: u16, y: u16, cell: &Cell) -> bool {
        let moved = self.pen.cursor_x != x || self.pen.cursor_y != y;
        if moved {
            let _ = write!(self.output, "\x1b[{};{}H", y + 1, x + 1);
            self.pen.cursor_x = x;
            self.pen.cursor_y = y;
        }

        // Removing a modifier needs a full reset, which also drops colors
        let current = self.pen.modifiers.unwrap_or(Modifiers::empty());
        if !current.difference(cell.modifiers).is_empty() {
            self.output.extend_from_slice(b"\x1b[0m");
            self.pen.fg = None;
            self.pen.bg = None;
            self.pen.modifiers = None;
        }

        if self.pen.fg != Some(cell.fg) {
            let Rgb { r, g, b } = cell.fg;
            let _ = write!(self.output, "\x1b[38;2;{r};{g};{b}m");
            self.pen.fg = Some(cell.fg);
        }
        if self.pen.bg != Some(cell.bg) {
            let Rgb { r, g, b } = cell.bg;
            let _ = write!(self.output, "\x1b[48;2;{r};{g};{b}m");
            self.pen.bg = Some(cell.bg);
        }
        if self.pen.modifiers != Some(cell.modifiers) {
            let added = cell.modifiers.difference(self.pen.modifiers.unwrap_or(Modifiers::empty()));
            emit_modifiers(&mut self.output, added);
            self.pen.modifiers = Some(cell.modifiers);
        }

        self.output.extend_from_slice(cell.symbol().as_bytes());
        let advance = u16::try_from(unicode_width::UnicodeWidthStr::width(cell.symbol())).unwrap_or(1);
        self.pen.cursor_x = x.saturating_add(advance.max(1));
        moved
    }
}

fn emit_modifiers(output: &mut Vec<u8>, modifiers: Modifiers) {
    const CODES: [(Modifiers, &[u8]); 7] = [
        (Modifiers::BOLD, b"\x1b[1m"),
        (Modifiers::DIM, b"\x1b[2m"),
        (Modifiers::ITALIC, b"\x1b[3m"),
        (Modifiers::UNDERLINE, b"\x1b[4m"),
        (Modifiers::BLINK, b"\x1b[5m"),
        (Modifiers::REVERSED, b"\x1b[7m"),
        (Modifiers::STRIKETHROUGH, b"\x1b[9m"),
    ];
    for (flag, code) in CODES {
        if modifiers.contains(flag) {
            output.extend_from_slice(code);
        }
    }
}
