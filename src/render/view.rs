//! Message view: lays a rendered message out into rows and paints them.
//!
//! Each code card owns a [`CodeViewport`], a bounded window over its body.
//! While the card is live the viewport sticks to the bottom on every growth
//! event; once it settles the offset stays where it is and can be scrolled
//! manually. Nothing outside the card scrolls on its behalf.
//!
//! ```text
//!  code body (12 lines)      viewport (height 4, live)
//!  ┌──────────────┐
//!  │ line 0       │
//!  │ ...          │
//!  │ line 8       │ ◄─┐
//!  │ line 9       │   │ visible_range() = 8..12
//!  │ line 10      │   │
//!  │ line 11 ▍    │ ◄─┘
//!  └──────────────┘
//! ```

use super::canvas::{Canvas, Rect};
use super::message::{CodeCard, MessageActions, Part, RenderConfig, RenderedMessage};
use super::style::{Line, Span, Style, Theme};
use crate::chat::{Feedback, Role};
use crate::clipboard::{Clipboard, CopyButton};
use std::ops::Range;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A bounded scroll window over the lines of a code card body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeViewport {
    /// First visible line.
    offset: usize,
    /// Maximum number of visible lines.
    height: usize,
    /// Total number of body lines.
    total: usize,
}

impl CodeViewport {
    /// Create an empty viewport showing at most `height` lines.
    pub const fn new(height: usize) -> Self {
        Self {
            offset: 0,
            height,
            total: 0,
        }
    }

    /// Record the current body size. A live body follows the bottom.
    pub fn update(&mut self, total: usize, live: bool) {
        self.total = total;
        if live {
            self.scroll_to_bottom();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    /// Lines currently visible.
    pub fn visible_range(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.total)
    }

    /// Scroll towards the start of the body.
    pub const fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Scroll towards the end of the body.
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
    }

    /// Jump to the last lines.
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Check if the last line is visible.
    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }
}

/// One painted row: a line of spans over an optional background fill.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// Content of the row.
    pub line: Line,
    /// Style filled across the full row width before painting the line.
    pub fill: Option<Style>,
}

impl Row {
    /// A row without background fill.
    pub const fn plain(line: Line) -> Self {
        Self { line, fill: None }
    }

    /// A row over a background fill.
    pub const fn filled(line: Line, fill: Style) -> Self {
        Self {
            line,
            fill: Some(fill),
        }
    }
}

/// Interactive state and layout of one message in the transcript.
#[derive(Debug, Clone)]
pub struct MessageView {
    rendered: RenderedMessage,
    viewports: Vec<CodeViewport>,
    copy_buttons: Vec<CopyButton>,
    message_copy: CopyButton,
    code_max_height: usize,
    copy_acknowledgment: std::time::Duration,
}

impl MessageView {
    /// Create a view for a freshly rendered message.
    pub fn new(rendered: RenderedMessage, config: &RenderConfig) -> Self {
        let mut view = Self {
            rendered: RenderedMessage {
                id: rendered.id,
                role: rendered.role,
                parts: Vec::new(),
            },
            viewports: Vec::new(),
            copy_buttons: Vec::new(),
            message_copy: CopyButton::new(config.copy_acknowledgment),
            code_max_height: usize::from(config.code_max_height.max(1)),
            copy_acknowledgment: config.copy_acknowledgment,
        };
        view.update(rendered);
        view
    }

    /// The last rendered form of the message.
    #[inline]
    pub const fn rendered(&self) -> &RenderedMessage {
        &self.rendered
    }

    /// Replace the rendered message after a growth event.
    ///
    /// Per-card state (viewport, copy acknowledgment) is kept by card index.
    pub fn update(&mut self, rendered: RenderedMessage) {
        for card in rendered.code_cards() {
            while self.viewports.len() <= card.index {
                self.viewports.push(CodeViewport::new(self.code_max_height));
                self.copy_buttons.push(CopyButton::new(self.copy_acknowledgment));
            }
            self.viewports[card.index].update(body_lines(&card.code).len(), card.live);
        }
        self.rendered = rendered;
    }

    /// Viewport of a code card.
    pub fn viewport(&self, card: usize) -> Option<&CodeViewport> {
        self.viewports.get(card)
    }

    /// Scroll a settled code card body. Negative values scroll up.
    pub fn scroll_code(&mut self, card: usize, delta: isize) {
        let live = self.card(card).is_some_and(|c| c.live);
        if let Some(viewport) = self.viewports.get_mut(card) {
            // Live bodies are pinned to the bottom
            if live {
                return;
            }
            if delta < 0 {
                viewport.scroll_up(delta.unsigned_abs());
            } else {
                viewport.scroll_down(delta.unsigned_abs());
            }
        }
    }

    fn card(&self, index: usize) -> Option<&CodeCard> {
        self.rendered.code_cards().find(|c| c.index == index)
    }

    /// Copy the body of a code card.
    pub fn copy_code(&mut self, card: usize, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        let Some(code) = self.card(card).map(|c| c.code.clone()) else {
            return false;
        };
        match self.copy_buttons.get_mut(card) {
            Some(button) => button.copy(clipboard, &code, now),
            None => false,
        }
    }

    /// Copy the whole message content.
    pub fn copy_message(&mut self, content: &str, clipboard: &mut dyn Clipboard, now: Instant) -> bool {
        self.message_copy.copy(clipboard, content, now)
    }

    /// Whether a code card shows its "copied" acknowledgment.
    pub fn code_copied(&self, card: usize, now: Instant) -> bool {
        self.copy_buttons.get(card).is_some_and(|b| b.is_acknowledged(now))
    }

    /// Whether the message action bar shows its "copied" acknowledgment.
    pub fn message_copied(&self, now: Instant) -> bool {
        self.message_copy.is_acknowledged(now)
    }

    /// Drop every copy acknowledgment.
    pub fn reset_copy(&mut self) {
        self.message_copy.reset();
        self.copy_buttons.iter_mut().for_each(CopyButton::reset);
    }

    /// Earliest pending acknowledgment expiry.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        std::iter::once(&self.message_copy)
            .chain(&self.copy_buttons)
            .filter_map(CopyButton::deadline)
            .filter(|d| *d > now)
            .min()
    }

    /// Lay the message out into rows `width` columns wide.
    pub fn rows(&self, width: u16, config: &RenderConfig, now: Instant) -> Vec<Row> {
        let width = usize::from(width);
        let theme = &config.theme;
        let mut rows = Vec::new();

        for (i, part) in self.rendered.parts.iter().enumerate() {
            if i > 0 {
                rows.push(Row::default());
            }
            match part {
                Part::Thinking(label) => {
                    rows.push(Row::plain(Line::styled(format!("● {label}..."), theme.muted)));
                }
                Part::Text(lines) => {
                    let prefix = (self.rendered.role == Role::User)
                        .then(|| Span::styled("› ", theme.muted));
                    for (n, line) in lines.iter().enumerate() {
                        let mut line = line.clone();
                        if let Some(prefix) = &prefix {
                            let mut marker = prefix.clone();
                            if n > 0 {
                                marker.text = "  ".to_string();
                            }
                            line.spans.insert(0, marker);
                        }
                        rows.extend(wrap_line(&line, width).into_iter().map(Row::plain));
                    }
                }
                Part::Code(card) => self.card_rows(card, width, config, now, &mut rows),
                Part::Attachments(attachments) => {
                    for attachment in attachments {
                        let kind = match attachment.kind {
                            crate::chat::AttachmentKind::Image => "image",
                            crate::chat::AttachmentKind::Video => "video",
                        };
                        let mime = attachment.mime_type().unwrap_or("unknown");
                        rows.push(Row::plain(Line::styled(format!("› [{kind}: {mime}]"), theme.muted)));
                    }
                }
                Part::Actions(actions) => {
                    rows.push(Row::plain(self.action_line(actions, theme, now)));
                }
            }
        }

        rows
    }

    fn card_rows(&self, card: &CodeCard, width: usize, config: &RenderConfig, now: Instant, rows: &mut Vec<Row>) {
        let theme = &config.theme;

        let mut header = Line::styled(format!(" {}", card.label.to_uppercase()), theme.code_header);
        if card.live {
            header.push(Span::styled("  ● LIVE", theme.live_badge));
        }
        let mut buttons = Vec::new();
        if card.preview_action {
            buttons.push(Span::styled("[▶ preview]", theme.action));
        }
        if self.code_copied(card.index, now) {
            buttons.push(Span::styled("[✓ copied]", theme.action_active));
        } else {
            buttons.push(Span::styled("[copy]", theme.action));
        }
        let buttons_width: usize = buttons.iter().map(Span::width).sum::<usize>() + buttons.len();
        let pad = width.saturating_sub(header.width() + buttons_width).max(1);
        header.push(Span::styled(" ".repeat(pad), theme.code_header));
        for button in buttons {
            header.push(button);
            header.push(Span::styled(" ", theme.code_header));
        }
        rows.push(Row::filled(header, theme.code_header));

        let lines = body_lines(&card.code);
        let range = self
            .viewports
            .get(card.index)
            .map_or(0..lines.len().min(self.code_max_height), CodeViewport::visible_range);
        let last = lines.len().saturating_sub(1);
        for n in range {
            let mut line = Line::styled(format!("  {}", lines[n]), theme.code_body);
            if card.live && n == last {
                line.push(Span::styled(config.caret.clone(), theme.caret.patch(Style {
                    bg: theme.code_body.bg,
                    ..Style::PLAIN
                })));
            }
            rows.push(Row::filled(line, theme.code_body));
        }
    }

    fn action_line(&self, actions: &MessageActions, theme: &Theme, now: Instant) -> Line {
        let mut line = Line::empty();
        if actions.show_preview {
            line.push(Span::styled("[preview] ", theme.action));
        }
        if self.message_copied(now) {
            line.push(Span::styled("[✓ copied] ", theme.action_active));
        } else {
            line.push(Span::styled("[copy] ", theme.action));
        }
        for (feedback, label) in [(Feedback::Up, "[+1]"), (Feedback::Down, "[-1]")] {
            let style = if actions.feedback == Some(feedback) {
                theme.action_active
            } else {
                theme.action
            };
            line.push(Span::styled(label, style));
            line.push(Span::styled(" ", theme.action));
        }
        line
    }
}

/// Lines of a code body. An empty body still has one (empty) line.
fn body_lines(code: &str) -> Vec<&str> {
    let lines: Vec<&str> = code.lines().collect();
    if lines.is_empty() {
        vec![""]
    } else {
        lines
    }
}

/// Word-wrap a line to `width` columns.
///
/// Breaks at word boundaries; words wider than the line are split by
/// grapheme. Whitespace at a wrap point is dropped.
pub fn wrap_line(line: &Line, width: usize) -> Vec<Line> {
    if width == 0 || line.width() <= width {
        return vec![line.clone()];
    }

    let mut out = Vec::new();
    let mut current = Line::empty();
    let mut col = 0;

    for span in &line.spans {
        for word in span.text.split_word_bounds() {
            let word_width = UnicodeWidthStr::width(word);
            let blank = word.trim().is_empty();

            if col + word_width > width && col > 0 {
                break_line(&mut out, &mut current);
                col = 0;
                if blank {
                    continue;
                }
            }

            if word_width <= width {
                push_text(&mut current, word, span.style);
                col += word_width;
                continue;
            }

            for grapheme in word.graphemes(true) {
                let g_width = UnicodeWidthStr::width(grapheme);
                if col + g_width > width && col > 0 {
                    break_line(&mut out, &mut current);
                    col = 0;
                }
                push_text(&mut current, grapheme, span.style);
                col += g_width;
            }
        }
    }

    if !current.spans.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

/// End the current row at a wrap point, dropping its trailing whitespace.
fn break_line(out: &mut Vec<Line>, current: &mut Line) {
    if let Some(last) = current.spans.last_mut() {
        let kept = last.text.trim_end().len();
        last.text.truncate(kept);
    }
    out.push(std::mem::take(current));
}

fn push_text(line: &mut Line, text: &str, style: Style) {
    match line.spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => line.push(Span::styled(text, style)),
    }
}

/// Paint rows into `area`, top to bottom, clipping what does not fit.
///
/// Returns the number of rows painted.
pub fn paint_rows(canvas: &mut Canvas, area: Rect, rows: &[Row]) -> u16 {
    let mut painted = 0;
    for (y, row) in (area.y..area.bottom()).zip(rows) {
        if let Some(fill) = row.fill {
            canvas.fill(Rect::new(area.x, y, area.width, 1), fill);
        }
        let mut x = area.x;
        for span in &row.line.spans {
            x = canvas.put_str(x, y, &span.text, span.style, area.right());
        }
        painted += 1;
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Message, MessageId};
    use crate::clipboard::MemoryClipboard;
    use crate::render::message::render_message;
    use std::time::Duration;

    fn assistant(content: &str, typing: bool) -> Message {
        let mut msg = Message::assistant(MessageId(1));
        msg.content = content.to_string();
        msg.is_typing = typing;
        msg
    }

    fn view_of(msg: &Message, config: &RenderConfig) -> MessageView {
        MessageView::new(render_message(msg, config, Duration::ZERO), config)
    }

    fn row_texts(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.line.plain()).collect()
    }

    #[test]
    fn test_viewport_follows_bottom_while_live() {
        let mut viewport = CodeViewport::new(4);
        viewport.update(12, true);
        assert_eq!(viewport.visible_range(), 8..12);
        viewport.update(15, true);
        assert_eq!(viewport.visible_range(), 11..15);
    }

    #[test]
    fn test_viewport_settled_keeps_offset() {
        let mut viewport = CodeViewport::new(4);
        viewport.update(12, false);
        assert_eq!(viewport.visible_range(), 0..4);
        viewport.scroll_down(3);
        viewport.update(12, false);
        assert_eq!(viewport.visible_range(), 3..7);
        viewport.scroll_down(100);
        assert!(viewport.at_bottom());
        viewport.scroll_up(100);
        assert_eq!(viewport.visible_range(), 0..4);
    }

    #[test]
    fn test_viewport_short_body() {
        let mut viewport = CodeViewport::new(20);
        viewport.update(3, true);
        assert_eq!(viewport.visible_range(), 0..3);
        assert!(viewport.at_bottom());
    }

    #[test]
    fn test_wrap_line_words() {
        let line = Line::styled("the quick brown fox", Style::PLAIN);
        let wrapped: Vec<String> = wrap_line(&line, 10).iter().map(Line::plain).collect();
        assert_eq!(wrapped, ["the quick", "brown fox"]);
    }

    #[test]
    fn test_wrap_line_long_word() {
        let line = Line::styled("abcdefghij", Style::PLAIN);
        let wrapped: Vec<String> = wrap_line(&line, 4).iter().map(Line::plain).collect();
        assert_eq!(wrapped, ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_line_wide_chars() {
        let line = Line::styled("日本語です", Style::PLAIN);
        for row in wrap_line(&line, 4) {
            assert!(row.width() <= 4);
        }
    }

    #[test]
    fn test_live_card_rows() {
        let config = RenderConfig::default();
        let msg = assistant("```js\nconsole.log(1)", true);
        let view = view_of(&msg, &config);
        let rows = row_texts(&view.rows(60, &config, Instant::now()));
        assert!(rows[0].starts_with(" JS  ● LIVE"));
        assert!(rows[0].contains("[copy]"));
        assert!(!rows[0].contains("preview"));
        assert_eq!(rows[1], format!("  console.log(1){}", config.caret));
    }

    #[test]
    fn test_live_card_sticks_to_bottom() {
        let config = RenderConfig {
            code_max_height: 3,
            ..RenderConfig::default()
        };
        let body: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        let msg = assistant(&format!("```html\n{}", body.join("\n")), true);
        let mut view = view_of(&msg, &config);
        assert_eq!(view.viewport(0).map(CodeViewport::visible_range), Some(7..10));

        // Manual scroll is ignored while live
        view.scroll_code(0, -5);
        assert_eq!(view.viewport(0).map(CodeViewport::visible_range), Some(7..10));

        let grown = assistant(&format!("```html\n{}\nline 10", body.join("\n")), true);
        view.update(render_message(&grown, &config, Duration::ZERO));
        assert_eq!(view.viewport(0).map(CodeViewport::visible_range), Some(8..11));

        // Settled: scrolling works again
        let done = assistant(&format!("```html\n{}\nline 10\n```", body.join("\n")), false);
        view.update(render_message(&done, &config, Duration::ZERO));
        view.scroll_code(0, -5);
        assert_eq!(view.viewport(0).map(CodeViewport::visible_range), Some(3..6));
    }

    #[test]
    fn test_copy_code_acknowledgment() {
        let config = RenderConfig::default();
        let msg = assistant("```css\na { color: red; }\n```", false);
        let mut view = view_of(&msg, &config);
        let mut clipboard = MemoryClipboard::new();
        let t0 = Instant::now();

        assert!(view.copy_code(0, &mut clipboard, t0));
        assert_eq!(clipboard.contents(), Some("a { color: red; }"));
        assert!(view.code_copied(0, t0));
        assert_eq!(view.next_deadline(t0), Some(t0 + Duration::from_secs(2)));

        let rows = row_texts(&view.rows(60, &config, t0));
        assert!(rows[0].contains("[✓ copied]"));
        assert!(rows[0].contains("[▶ preview]"));

        let later = t0 + Duration::from_secs(2);
        assert!(!view.code_copied(0, later));
        assert!(!view.copy_code(5, &mut clipboard, later));
    }

    #[test]
    fn test_action_bar_rows() {
        let config = RenderConfig::default();
        let mut msg = assistant("Done.", false);
        msg.toggle_feedback(Feedback::Up);
        let view = view_of(&msg, &config);
        let rows = row_texts(&view.rows(60, &config, Instant::now()));
        assert_eq!(rows.first().map(String::as_str), Some("Done."));
        assert_eq!(rows.last().map(|r| r.trim_end()), Some("[copy] [+1] [-1]"));
    }

    #[test]
    fn test_paint_rows_clips_to_area() {
        let config = RenderConfig::default();
        let msg = assistant("one\n\ntwo\n\nthree", false);
        let view = view_of(&msg, &config);
        let rows = view.rows(20, &config, Instant::now());
        let mut canvas = Canvas::new(20, 2);
        let painted = paint_rows(&mut canvas, Rect::new(0, 0, 20, 2), &rows);
        assert_eq!(painted, 2);
        assert_eq!(canvas.row_text(0), "one");
        assert_eq!(canvas.row_text(1), "");
    }
}
