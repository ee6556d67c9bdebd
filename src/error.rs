//! Error types.
//!
//! Parsing, classification and segmentation never fail: malformed fences
//! degrade to plain text or a trailing incomplete block. The errors below
//! cover API misuse and the two external surfaces (preview embedding and
//! clipboard), whose failures the UI degrades gracefully.

use crate::chat::MessageId;

/// Misuse of the chat view API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// No message with this id exists in the view.
    #[error("unknown message {0}")]
    UnknownMessage(MessageId),
    /// The message has already finished streaming.
    #[error("message {0} is not streaming")]
    NotStreaming(MessageId),
    /// Stream events only apply to assistant messages.
    #[error("message {0} is not an assistant message")]
    NotAssistant(MessageId),
}

/// The preview surface failed to load a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The document could not be loaded.
    #[error("preview load failed: {0}")]
    LoadFailed(String),
    /// The surface is gone (window closed, process exited).
    #[error("preview surface unavailable")]
    Unavailable,
    /// Saving a block to disk failed.
    #[error("preview export failed: {0}")]
    ExportFailed(String),
}

/// Writing to the clipboard failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard is available in this environment.
    #[error("clipboard not available")]
    Unavailable,
    /// The platform rejected the write.
    #[error("failed to set clipboard text: {0}")]
    WriteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ChatError::UnknownMessage(MessageId(7)).to_string(),
            "unknown message #7"
        );
        assert_eq!(
            SurfaceError::LoadFailed("boom".into()).to_string(),
            "preview load failed: boom"
        );
        assert_eq!(ClipboardError::Unavailable.to_string(), "clipboard not available");
    }
}
