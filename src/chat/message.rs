//! Chat message model.

/// Content stored for a user message that only carries attachments.
pub const ATTACHMENT_PLACEHOLDER: &str = "[Attachment]";

/// Stable identifier of a message within a chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing.
    User,
    /// The streaming assistant.
    Assistant,
}

/// Kind of an attached media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// A still image.
    Image,
    /// A video clip.
    Video,
}

/// A media attachment on a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Media kind.
    pub kind: AttachmentKind,
    /// Inline `data:` URL of the file.
    pub data_url: String,
}

impl Attachment {
    /// MIME type declared by the data URL, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.data_url.strip_prefix("data:")?;
        let end = rest.find([';', ','])?;
        Some(&rest[..end]).filter(|m| !m.is_empty())
    }
}

/// Thumbs up / thumbs down rating of an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// Good response.
    Up,
    /// Bad response.
    Down,
}

/// A chat message.
///
/// Content only grows while `is_typing` is set: deltas are appended, never
/// rewritten. The only resets are a regeneration (content cleared, stream
/// stays live) and an error (content replaced, stream ends).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier.
    pub id: MessageId,
    /// Author.
    pub role: Role,
    /// Raw markdown content.
    pub content: String,
    /// Whether the message is still receiving deltas.
    pub is_typing: bool,
    /// Attached media (user messages only).
    pub attachments: Vec<Attachment>,
    /// User rating (assistant messages only).
    pub feedback: Option<Feedback>,
}

impl Message {
    /// Create a finished user message.
    pub fn user(id: MessageId, content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        let content = content.into();
        let content = if content.trim().is_empty() && !attachments.is_empty() {
            ATTACHMENT_PLACEHOLDER.to_string()
        } else {
            content
        };
        Self {
            id,
            role: Role::User,
            content,
            is_typing: false,
            attachments,
            feedback: None,
        }
    }

    /// Create an empty assistant message that is about to stream.
    pub const fn assistant(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: String::new(),
            is_typing: true,
            attachments: Vec::new(),
            feedback: None,
        }
    }

    /// An assistant message that is typing but has produced nothing yet.
    #[inline]
    pub fn is_thinking(&self) -> bool {
        self.is_typing && self.content.is_empty()
    }

    /// An assistant message that is typing and already has content.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.is_typing && !self.content.is_empty()
    }

    /// Text shown for a user message (the attachment placeholder is hidden).
    pub fn display_text(&self) -> &str {
        if self.content == ATTACHMENT_PLACEHOLDER {
            ""
        } else {
            &self.content
        }
    }

    /// Toggle a rating: selecting the active rating clears it.
    pub fn toggle_feedback(&mut self, feedback: Feedback) -> Option<Feedback> {
        self.feedback = if self.feedback == Some(feedback) {
            None
        } else {
            Some(feedback)
        };
        self.feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Attachment {
        Attachment {
            kind: AttachmentKind::Image,
            data_url: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn test_attachment_only_user_message() {
        let msg = Message::user(MessageId(1), "  ", vec![image()]);
        assert_eq!(msg.content, ATTACHMENT_PLACEHOLDER);
        assert_eq!(msg.display_text(), "");

        let msg = Message::user(MessageId(2), "look", vec![image()]);
        assert_eq!(msg.display_text(), "look");
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(image().mime_type(), Some("image/png"));
        let bad = Attachment {
            kind: AttachmentKind::Video,
            data_url: "https://example.com/v.mp4".to_string(),
        };
        assert_eq!(bad.mime_type(), None);
    }

    #[test]
    fn test_thinking_then_streaming() {
        let mut msg = Message::assistant(MessageId(3));
        assert!(msg.is_thinking());
        assert!(!msg.is_streaming());
        msg.content.push_str("Hi");
        assert!(msg.is_streaming());
        msg.is_typing = false;
        assert!(!msg.is_streaming() && !msg.is_thinking());
    }

    #[test]
    fn test_feedback_toggles() {
        let mut msg = Message::assistant(MessageId(4));
        assert_eq!(msg.toggle_feedback(Feedback::Up), Some(Feedback::Up));
        assert_eq!(msg.toggle_feedback(Feedback::Down), Some(Feedback::Down));
        assert_eq!(msg.toggle_feedback(Feedback::Down), None);
    }
}
