//! Markdown subset for the text between fences.
//!
//! Supported: paragraphs, headings, emphasis, strong, strikethrough, inline
//! code, links, ordered and unordered lists, block quotes and rules. Code
//! blocks are suppressed here: fenced ones never reach this module and
//! indented ones are dropped. Raw HTML is dropped.

use super::style::{Line, Modifiers, Span, Style, Theme};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Render a markdown fragment into styled lines.
///
/// Whitespace-only input renders nothing. The output never starts or ends
/// with a blank line.
pub fn render_markdown(text: &str, theme: &Theme) -> Vec<Line> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut writer = LineWriter::new(theme);
    for event in Parser::new_ext(text, options) {
        writer.event(event);
    }
    writer.finish()
}

/// Accumulates styled lines while walking parser events.
struct LineWriter<'t> {
    theme: &'t Theme,
    lines: Vec<Line>,
    current: Line,
    styles: Vec<Style>,
    /// One entry per open list: the next number, or `None` for bullets.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'t> LineWriter<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Line::empty(),
            styles: vec![theme.text],
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.theme.text)
    }

    fn push_style(&mut self, layer: Style) {
        let style = self.style().patch(layer);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn push_span(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        if self.current.spans.is_empty() && self.quote_depth > 0 {
            self.current
                .push(Span::styled("│ ".repeat(self.quote_depth), self.theme.quote));
        }
        self.current.push(Span::styled(text, style));
    }

    fn flush(&mut self) {
        if !self.current.spans.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn blank_line(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(Line::empty());
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if self.in_code_block {
            if matches!(event, Event::End(TagEnd::CodeBlock)) {
                self.in_code_block = false;
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                let style = self.style();
                for (i, piece) in text.split('\n').enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.push_span(piece, style);
                }
            }
            Event::Code(code) => {
                let style = self.style().patch(self.theme.inline_code);
                self.push_span(&code, style);
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.blank_line();
                self.push_span("────────", self.theme.muted);
                self.blank_line();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.blank_line();
                self.push_style(self.theme.heading);
            }
            Tag::BlockQuote { .. } => {
                self.blank_line();
                self.quote_depth += 1;
                self.push_style(self.theme.quote);
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.push_span(&marker, self.theme.list_marker);
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::Emphasis => self.push_style(Style::PLAIN.add(Modifiers::ITALIC)),
            Tag::Strong => self.push_style(Style::PLAIN.add(Modifiers::BOLD)),
            Tag::Strikethrough => self.push_style(Style::PLAIN.add(Modifiers::STRIKETHROUGH)),
            Tag::Link { .. } => self.push_style(self.theme.link),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                // Tight list items keep their lines together
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.flush();
                }
            }
            TagEnd::Heading { .. } => {
                self.pop_style();
                self.blank_line();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.blank_line();
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.flush();
        while self.lines.last().is_some_and(Line::is_empty) {
            self.lines.pop();
        }
        self.lines
    }
}
