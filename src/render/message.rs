//! Message renderer: pure mapping from a message to display parts.
//!
//! # Layout of an assistant message
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Text       markdown subset, blanks skipped   │
//! │ Code card  label · LIVE badge · copy/preview │
//! │            body (own viewport) + caret       │
//! │ Text       ... + caret when no fence at all  │
//! │ Actions    copy · preview · up · down (done) │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering is idempotent: the same message, config and elapsed time always
//! produce the same parts.

use super::markdown::render_markdown;
use super::style::{Line, Span, Theme};
use crate::chat::{Attachment, Feedback, Message, MessageId, Role};
use crate::fence::{
    contains_fence, extract_blocks, finalize_blocks, is_previewable, previewable_blocks, segment,
    Segment,
};
use crate::clipboard::DEFAULT_COPY_ACK;
use std::time::Duration;

/// Labels cycled by the thinking indicator.
pub const THINKING_LABELS: [&str; 3] = ["Processing", "Generating", "Composing"];

/// Configuration for message rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Color palette.
    pub theme: Theme,
    /// Glyph appended while text is streaming.
    pub caret: String,
    /// Maximum visible rows of a code card body.
    pub code_max_height: u16,
    /// How long the "copied" acknowledgment stays visible.
    pub copy_acknowledgment: Duration,
    /// Time between thinking label changes.
    pub thinking_interval: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            caret: "▍".to_string(),
            code_max_height: 20,
            copy_acknowledgment: DEFAULT_COPY_ACK,
            thinking_interval: Duration::from_millis(1500),
        }
    }
}

/// A fenced block as displayed in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCard {
    /// Position of the block among the message's blocks.
    pub index: usize,
    /// Header label: filename or language.
    pub label: String,
    /// Lowercased language tag.
    pub language: String,
    /// Block body, exactly what the copy action copies.
    pub code: String,
    /// Still receiving content: LIVE badge, caret, sticky-bottom viewport.
    pub live: bool,
    /// Whether the preview action is offered (previewable and not live).
    pub preview_action: bool,
}

/// Actions shown under a finished assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageActions {
    /// Offer "show preview" (the message has previewable blocks).
    pub show_preview: bool,
    /// Current rating.
    pub feedback: Option<Feedback>,
}

/// One vertical piece of a rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Thinking indicator with its current label.
    Thinking(&'static str),
    /// Styled text lines.
    Text(Vec<Line>),
    /// A code card.
    Code(CodeCard),
    /// Attachments of a user message.
    Attachments(Vec<Attachment>),
    /// Action bar of a finished assistant message.
    Actions(MessageActions),
}

/// Display form of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Source message id.
    pub id: MessageId,
    /// Source message role.
    pub role: Role,
    /// Parts in display order.
    pub parts: Vec<Part>,
}

impl RenderedMessage {
    /// All code cards, in order.
    pub fn code_cards(&self) -> impl Iterator<Item = &CodeCard> {
        self.parts.iter().filter_map(|p| match p {
            Part::Code(card) => Some(card),
            _ => None,
        })
    }

    /// The action bar, if visible.
    pub fn actions(&self) -> Option<&MessageActions> {
        self.parts.iter().find_map(|p| match p {
            Part::Actions(actions) => Some(actions),
            _ => None,
        })
    }

    /// Whether a caret is shown after the text.
    pub fn has_text_caret(&self, config: &RenderConfig) -> bool {
        self.parts.iter().any(|p| match p {
            Part::Text(lines) => lines
                .last()
                .and_then(|l| l.spans.last())
                .is_some_and(|s| s.text == config.caret),
            _ => false,
        })
    }

    /// Plain text of all text parts, one line per row.
    pub fn text(&self) -> String {
        let mut out = Vec::new();
        for part in &self.parts {
            if let Part::Text(lines) = part {
                out.extend(lines.iter().map(Line::plain));
            }
        }
        out.join("\n")
    }
}

/// Label of the thinking indicator after `elapsed` time.
pub fn thinking_label(elapsed: Duration, interval: Duration) -> &'static str {
    let step = elapsed.as_millis() / interval.as_millis().max(1);
    let index = usize::try_from(step % THINKING_LABELS.len() as u128).unwrap_or(0);
    THINKING_LABELS[index]
}

/// Render a message.
///
/// `elapsed` is the time since the message started; it only drives the
/// thinking indicator.
pub fn render_message(message: &Message, config: &RenderConfig, elapsed: Duration) -> RenderedMessage {
    let parts = match message.role {
        Role::User => render_user(message, config),
        Role::Assistant => render_assistant(message, config, elapsed),
    };
    RenderedMessage {
        id: message.id,
        role: message.role,
        parts,
    }
}

fn render_user(message: &Message, config: &RenderConfig) -> Vec<Part> {
    let mut parts = Vec::new();
    if !message.attachments.is_empty() {
        parts.push(Part::Attachments(message.attachments.clone()));
    }
    let text = message.display_text();
    if !text.is_empty() {
        let lines = text
            .split('\n')
            .map(|l| Line::styled(l, config.theme.user))
            .collect();
        parts.push(Part::Text(lines));
    }
    parts
}

fn render_assistant(message: &Message, config: &RenderConfig, elapsed: Duration) -> Vec<Part> {
    if message.is_thinking() {
        return vec![Part::Thinking(thinking_label(elapsed, config.thinking_interval))];
    }

    let content = &message.content;
    let streaming = message.is_typing;
    let mut blocks = extract_blocks(content);
    if !streaming {
        finalize_blocks(&mut blocks);
    }

    let mut parts = Vec::new();
    for (index, seg) in segment(content, &blocks, streaming).into_iter().enumerate() {
        match seg {
            Segment::Text(text) => {
                // Whitespace-only text renders nothing
                let lines = render_markdown(&text, &config.theme);
                if !lines.is_empty() {
                    parts.push(Part::Text(lines));
                }
            }
            Segment::Code { block, streaming: live } => {
                let card_index = blocks
                    .iter()
                    .position(|b| b.source == block.source)
                    .unwrap_or(index);
                parts.push(Part::Code(CodeCard {
                    index: card_index,
                    label: block.label().to_string(),
                    preview_action: !live && is_previewable(&block.language),
                    language: block.language,
                    code: block.code,
                    live,
                }));
            }
        }
    }

    if streaming && !contains_fence(content) {
        append_caret(&mut parts, config);
    }

    if !streaming && !content.is_empty() {
        parts.push(Part::Actions(MessageActions {
            show_preview: !previewable_blocks(&blocks).is_empty(),
            feedback: message.feedback,
        }));
    }

    parts
}

fn append_caret(parts: &mut Vec<Part>, config: &RenderConfig) {
    let caret = Span::styled(config.caret.clone(), config.theme.caret);
    if let Some(Part::Text(lines)) = parts.last_mut() {
        if let Some(line) = lines.last_mut() {
            line.push(caret);
            return;
        }
    }
    parts.push(Part::Text(vec![Line { spans: vec![caret] }]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::AttachmentKind;

    fn assistant(content: &str, typing: bool) -> Message {
        let mut msg = Message::assistant(MessageId(1));
        msg.content = content.to_string();
        msg.is_typing = typing;
        msg
    }

    fn render(msg: &Message) -> RenderedMessage {
        render_message(msg, &RenderConfig::default(), Duration::ZERO)
    }

    #[test]
    fn test_thinking_indicator_cycles() {
        let msg = Message::assistant(MessageId(1));
        let config = RenderConfig::default();
        let at = |ms| render_message(&msg, &config, Duration::from_millis(ms)).parts;
        assert_eq!(at(0), [Part::Thinking("Processing")]);
        assert_eq!(at(1500), [Part::Thinking("Generating")]);
        assert_eq!(at(3100), [Part::Thinking("Composing")]);
        assert_eq!(at(4500), [Part::Thinking("Processing")]);
    }

    #[test]
    fn test_caret_on_plain_streaming_text() {
        let config = RenderConfig::default();
        let rendered = render(&assistant("Hello **there**", true));
        assert!(rendered.has_text_caret(&config));
        assert!(rendered.actions().is_none());
    }

    #[test]
    fn test_no_caret_once_fence_present() {
        let config = RenderConfig::default();
        let rendered = render(&assistant("Look:\n```js\nlet a", true));
        assert!(!rendered.has_text_caret(&config));
        let card = rendered.code_cards().next().cloned();
        assert!(card.as_ref().is_some_and(|c| c.live && !c.preview_action));
    }

    #[test]
    fn test_caret_alone_for_blank_text() {
        let config = RenderConfig::default();
        let rendered = render(&assistant("  \n", true));
        assert_eq!(rendered.parts.len(), 1);
        assert!(rendered.has_text_caret(&config));
    }

    #[test]
    fn test_finished_code_card() {
        let rendered = render(&assistant("Here is code:\n```html index.html\n<div>hi</div>\n```\nDone.", false));
        let cards: Vec<_> = rendered.code_cards().collect();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].label, "index.html");
        assert_eq!(cards[0].code, "<div>hi</div>");
        assert!(!cards[0].live);
        assert!(cards[0].preview_action);
        assert_eq!(rendered.text(), "Here is code:\nDone.");
        assert_eq!(
            rendered.actions(),
            Some(&MessageActions {
                show_preview: true,
                feedback: None
            })
        );
    }

    #[test]
    fn test_non_previewable_block_has_no_preview_action() {
        let rendered = render(&assistant("```PYTHON\nprint(1)\n```", false));
        let card = rendered.code_cards().next().cloned();
        assert!(card.as_ref().is_some_and(|c| c.language == "python" && !c.preview_action));
        assert_eq!(rendered.actions().map(|a| a.show_preview), Some(false));
    }

    #[test]
    fn test_stopped_open_fence_renders_settled() {
        let rendered = render(&assistant("```css\nbody { color: red;", false));
        let card = rendered.code_cards().next().cloned();
        assert!(card.as_ref().is_some_and(|c| !c.live && c.preview_action));
        assert_eq!(card.map(|c| c.code), Some("body { color: red;".to_string()));
    }

    #[test]
    fn test_user_message_hides_placeholder() {
        let attachment = Attachment {
            kind: AttachmentKind::Image,
            data_url: "data:image/png;base64,AA".to_string(),
        };
        let msg = Message::user(MessageId(2), "", vec![attachment]);
        let rendered = render(&msg);
        assert_eq!(rendered.parts.len(), 1);
        assert!(matches!(rendered.parts[0], Part::Attachments(ref a) if a.len() == 1));
    }

    #[test]
    fn test_user_message_is_not_parsed() {
        let msg = Message::user(MessageId(3), "```js\nx\n```", Vec::new());
        let rendered = render(&msg);
        assert_eq!(rendered.code_cards().count(), 0);
        assert_eq!(rendered.text(), "```js\nx\n```");
    }

    #[test]
    fn test_render_is_idempotent() {
        let msg = assistant("a\n```jsx App.jsx\nexport default () => <p/>;\n```\nb", true);
        assert_eq!(render(&msg), render(&msg));
    }
}
