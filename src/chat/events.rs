//! Stream events delivered by the chat transport.

use super::message::MessageId;

/// Prefix of the content shown when a stream fails.
pub const FAILURE_PREFIX: &str = "Sorry, something went wrong: ";

/// One event of an assistant message stream.
///
/// Events for one message arrive in order: `Started`, any number of `Delta`
/// and `Regenerating`, then exactly one of `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A new assistant message begins.
    Started {
        /// Message being streamed.
        message_id: MessageId,
    },
    /// Text appended to the message.
    Delta {
        /// Message being streamed.
        message_id: MessageId,
        /// New text.
        text: String,
    },
    /// The response is being regenerated: content is cleared, the stream stays live.
    Regenerating {
        /// Message being streamed.
        message_id: MessageId,
    },
    /// The stream finished.
    Done {
        /// Message being streamed.
        message_id: MessageId,
    },
    /// The stream failed.
    Failed {
        /// Message being streamed.
        message_id: MessageId,
        /// Error description.
        message: String,
    },
}

impl StreamEvent {
    /// Message the event belongs to.
    pub const fn message_id(&self) -> MessageId {
        match self {
            Self::Started { message_id }
            | Self::Delta { message_id, .. }
            | Self::Regenerating { message_id }
            | Self::Done { message_id }
            | Self::Failed { message_id, .. } => *message_id,
        }
    }

    /// Whether the event ends the stream.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }

    /// Split `text` into delta events of at most `chunk` characters.
    pub fn deltas(message_id: MessageId, text: &str, chunk: usize) -> Vec<Self> {
        let chunk = chunk.max(1);
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(chunk)
            .map(|c| Self::Delta {
                message_id,
                text: c.iter().collect(),
            })
            .collect()
    }
}
