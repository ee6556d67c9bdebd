//! Chat transcript: messages, stream events and the per-view owner.

mod events;
mod message;
mod view;

pub use events::{StreamEvent, FAILURE_PREFIX};
pub use message::{
    Attachment, AttachmentKind, Feedback, Message, MessageId, Role, ATTACHMENT_PLACEHOLDER,
};
pub use view::{ChatView, StreamState};
