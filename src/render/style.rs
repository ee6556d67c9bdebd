//! Style primitives: colors, modifiers, styled spans and lines.

use bitflags::bitflags;
use unicode_width::UnicodeWidthStr;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<u32> for Rgb {
    #[inline]
    fn from(hex: u32) -> Self {
        Self::from_u32(hex)
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// # Example
    /// ```
    /// use livefence::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::ITALIC;
    /// assert!(style.contains(Modifiers::BOLD));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Blinking text
        const BLINK = 0b0001_0000;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0b0010_0000;
        /// Strikethrough text
        const STRIKETHROUGH = 0b0100_0000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Foreground, background and modifiers of a piece of text.
///
/// Unset colors inherit from whatever the text is painted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color.
    pub fg: Option<Rgb>,
    /// Background color.
    pub bg: Option<Rgb>,
    /// Text modifiers.
    pub modifiers: Modifiers,
}

impl Style {
    /// Style with no colors and no modifiers.
    pub const PLAIN: Self = Self {
        fg: None,
        bg: None,
        modifiers: Modifiers::empty(),
    };

    /// Set the foreground color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn fg(mut self, fg: Rgb) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Set the background color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn bg(mut self, bg: Rgb) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Add modifiers (builder pattern).
    #[inline]
    #[must_use]
    pub const fn add(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = self.modifiers.union(modifiers);
        self
    }

    /// Layer `other` on top of this style.
    #[inline]
    #[must_use]
    pub const fn patch(self, other: Self) -> Self {
        Self {
            fg: match other.fg {
                Some(fg) => Some(fg),
                None => self.fg,
            },
            bg: match other.bg {
                Some(bg) => Some(bg),
                None => self.bg,
            },
            modifiers: self.modifiers.union(other.modifiers),
        }
    }
}

/// Palette used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Body text.
    pub text: Style,
    /// Secondary text (labels, hints, thinking indicator).
    pub muted: Style,
    /// Headings.
    pub heading: Style,
    /// Links.
    pub link: Style,
    /// Inline code spans.
    pub inline_code: Style,
    /// Block quote text.
    pub quote: Style,
    /// List bullets and numbers.
    pub list_marker: Style,
    /// Code card header bar.
    pub code_header: Style,
    /// Code card body.
    pub code_body: Style,
    /// The "LIVE" badge.
    pub live_badge: Style,
    /// Action buttons.
    pub action: Style,
    /// Action buttons in their active state (copied, feedback given).
    pub action_active: Style,
    /// Streaming caret.
    pub caret: Style,
    /// User message text.
    pub user: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let code_bg = Rgb::from_u32(0x1E_1E_2E);
        Self {
            text: Style::PLAIN.fg(Rgb::new(220, 220, 220)),
            muted: Style::PLAIN.fg(Rgb::new(128, 128, 140)),
            heading: Style::PLAIN.fg(Rgb::new(250, 250, 250)).add(Modifiers::BOLD),
            link: Style::PLAIN.fg(Rgb::new(96, 165, 250)).add(Modifiers::UNDERLINE),
            inline_code: Style::PLAIN.fg(Rgb::new(244, 114, 182)).bg(code_bg),
            quote: Style::PLAIN.fg(Rgb::new(160, 160, 170)).add(Modifiers::ITALIC),
            list_marker: Style::PLAIN.fg(Rgb::new(96, 165, 250)),
            code_header: Style::PLAIN.fg(Rgb::new(180, 180, 190)).bg(Rgb::from_u32(0x2A_2A_3C)),
            code_body: Style::PLAIN.fg(Rgb::new(205, 214, 244)).bg(code_bg),
            live_badge: Style::PLAIN
                .fg(Rgb::new(16, 185, 129))
                .bg(Rgb::from_u32(0x2A_2A_3C))
                .add(Modifiers::BOLD),
            action: Style::PLAIN.fg(Rgb::new(148, 148, 160)),
            action_active: Style::PLAIN.fg(Rgb::new(16, 185, 129)).add(Modifiers::BOLD),
            caret: Style::PLAIN.fg(Rgb::new(96, 165, 250)).add(Modifiers::BLINK),
            user: Style::PLAIN.fg(Rgb::new(240, 240, 240)),
        }
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The text, without newlines.
    pub text: String,
    /// Style applied to the whole run.
    pub style: Style,
}

impl Span {
    /// Create a styled span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in terminal columns.
    #[inline]
    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }
}

/// A single logical line made of spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    /// Spans in display order.
    pub spans: Vec<Span>,
}

impl Line {
    /// Create an empty line.
    pub const fn empty() -> Self {
        Self { spans: Vec::new() }
    }

    /// Create a line holding one styled span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::styled(text, style)],
        }
    }

    /// Append a span.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Check if the line has no visible text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// The line's text without styling.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}
