//! Canvas: a grid of styled cells that rendered messages are painted into.
//!
//! Cells are stored in row-major order (`index = y * width + x`). A wide
//! grapheme (CJK, most emoji) occupies its own cell plus a continuation cell
//! to its right, so one row always spans exactly `width` columns.

use super::style::{Modifiers, Rgb, Style};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Foreground used where no style sets one.
pub const DEFAULT_FG: Rgb = Rgb::new(220, 220, 220);
/// Background used where no style sets one.
pub const DEFAULT_BG: Rgb = Rgb::new(0, 0, 0);

/// A rectangle defined by position and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate (column) of the top-left corner.
    pub x: u16,
    /// Y coordinate (row) of the top-left corner.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle covering a whole canvas.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Check if the rectangle is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Split horizontally at a given column offset.
    pub fn split_horizontal(&self, at: u16) -> (Self, Self) {
        let at = at.min(self.width);
        (
            Self::new(self.x, self.y, at, self.height),
            Self::new(self.x + at, self.y, self.width - at, self.height),
        )
    }

    /// Split vertically at a given row offset.
    pub fn split_vertical(&self, at: u16) -> (Self, Self) {
        let at = at.min(self.height);
        (
            Self::new(self.x, self.y, self.width, at),
            Self::new(self.x, self.y + at, self.width, self.height - at),
        )
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// A single canvas cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// The grapheme shown in this cell (empty for wide continuations).
    symbol: String,
    /// Foreground color.
    pub fg: Rgb,
    /// Background color.
    pub bg: Rgb,
    /// Style modifiers.
    pub modifiers: Modifiers,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            modifiers: Modifiers::empty(),
        }
    }
}

impl Cell {
    /// The grapheme in this cell.
    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Check if this is a wide-character continuation.
    #[inline]
    pub fn is_wide_continuation(&self) -> bool {
        self.symbol.is_empty()
    }

    fn apply(&mut self, style: Style) {
        if let Some(fg) = style.fg {
            self.fg = fg;
        }
        if let Some(bg) = style.bg {
            self.bg = bg;
        }
        self.modifiers = style.modifiers;
    }
}

/// A grid of cells.
#[derive(Clone)]
pub struct Canvas {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Canvas {
    /// Create a canvas with the given dimensions, filled with blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Cell::default(); size],
            width,
            height,
        }
    }

    /// Get the canvas width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the canvas height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole canvas as a rectangle.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Convert (x, y) coordinates to a linear index.
    #[inline]
    fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get a reference to a cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Get an iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Set a grapheme at (x, y) and return its display width.
    ///
    /// A wide grapheme that would not fit before `clip_right` is not drawn
    /// and 0 is returned.
    pub fn put_grapheme(&mut self, x: u16, y: u16, grapheme: &str, style: Style, clip_right: u16) -> u16 {
        let clip_right = clip_right.min(self.width);
        let width = u16::try_from(UnicodeWidthStr::width(grapheme)).unwrap_or(0);
        if width == 0 || x.saturating_add(width) > clip_right {
            return 0;
        }
        let Some(idx) = self.index_of(x, y) else {
            return 0;
        };

        let cell = &mut self.cells[idx];
        cell.symbol.clear();
        cell.symbol.push_str(grapheme);
        cell.apply(style);

        for offset in 1..width {
            if let Some(next) = self.index_of(x + offset, y) {
                let cell = &mut self.cells[next];
                cell.symbol.clear();
                cell.apply(style);
            }
        }

        width
    }

    /// Write a single-line string starting at (x, y), clipped at `clip_right`.
    ///
    /// Returns the column after the last drawn grapheme.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, clip_right: u16) -> u16 {
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if grapheme == "\t" {
                col = self.put_str(col, y, "    ", style, clip_right);
                continue;
            }
            let drawn = self.put_grapheme(col, y, grapheme, style, clip_right);
            if drawn == 0 && UnicodeWidthStr::width(grapheme) > 0 {
                break;
            }
            col += drawn;
        }
        col
    }

    /// Fill a rectangle with blanks in the given style.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        for row in rect.y..rect.bottom().min(self.height) {
            for col in rect.x..rect.right().min(self.width) {
                if let Some(idx) = self.index_of(col, row) {
                    let cell = &mut self.cells[idx];
                    cell.symbol.clear();
                    cell.symbol.push(' ');
                    cell.apply(style);
                }
            }
        }
    }

    /// Clear the entire canvas.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the canvas. Content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    /// The text of row `y`, trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = (y as usize) * (self.width as usize);
        let row = &self.cells[start..start + self.width as usize];
        let text: String = row.iter().map(Cell::symbol).collect();
        text.trim_end().to_string()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_split() {
        let rect = Rect::new(0, 0, 80, 24);
        let (left, right) = rect.split_horizontal(50);
        assert_eq!(left, Rect::new(0, 0, 50, 24));
        assert_eq!(right, Rect::new(50, 0, 30, 24));
        let (top, bottom) = rect.split_vertical(30);
        assert_eq!(top.height, 24);
        assert!(bottom.is_empty());
        assert!(rect.contains(79, 23));
        assert!(!rect.contains(80, 0));
    }

    #[test]
    fn test_put_str_and_row_text() {
        let mut canvas = Canvas::new(10, 2);
        let end = canvas.put_str(1, 0, "hello", Style::PLAIN, 10);
        assert_eq!(end, 6);
        assert_eq!(canvas.row_text(0), " hello");
        assert_eq!(canvas.row_text(1), "");
    }

    #[test]
    fn test_put_str_clips() {
        let mut canvas = Canvas::new(10, 1);
        let end = canvas.put_str(0, 0, "abcdefgh", Style::PLAIN, 4);
        assert_eq!(end, 4);
        assert_eq!(canvas.row_text(0), "abcd");
    }

    #[test]
    fn test_wide_grapheme() {
        let mut canvas = Canvas::new(5, 1);
        let end = canvas.put_str(0, 0, "日本語", Style::PLAIN, 5);
        // The third glyph would straddle the edge
        assert_eq!(end, 4);
        assert!(canvas.get(1, 0).is_some_and(Cell::is_wide_continuation));
        assert_eq!(canvas.row_text(0), "日本");
    }

    #[test]
    fn test_style_applied() {
        let mut canvas = Canvas::new(4, 1);
        let style = Style::PLAIN.fg(Rgb::new(1, 2, 3)).add(Modifiers::BOLD);
        canvas.put_str(0, 0, "x", style, 4);
        let cell = canvas.get(0, 0).cloned().unwrap_or_default();
        assert_eq!(cell.fg, Rgb::new(1, 2, 3));
        assert_eq!(cell.bg, DEFAULT_BG);
        assert!(cell.modifiers.contains(Modifiers::BOLD));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut canvas = Canvas::new(4, 2);
        let bg = Style::PLAIN.bg(Rgb::new(9, 9, 9));
        canvas.fill(Rect::new(1, 0, 10, 10), bg);
        assert_eq!(canvas.get(0, 0).map(|c| c.bg), Some(DEFAULT_BG));
        assert_eq!(canvas.get(3, 1).map(|c| c.bg), Some(Rgb::new(9, 9, 9)));
        canvas.clear();
        assert_eq!(canvas.get(3, 1).map(|c| c.bg), Some(DEFAULT_BG));
    }

    #[test]
    fn test_zero_sized_canvas() {
        let mut canvas = Canvas::new(0, 0);
        assert_eq!(canvas.put_str(0, 0, "x", Style::PLAIN, 10), 0);
        assert_eq!(canvas.rows().count(), 0);
    }
}
