//! # Livefence
//!
//! Streaming code-fence extraction and live preview for chat transcripts.
//!
//! Livefence follows an assistant message as it streams in, token by token,
//! and keeps three things consistent on every delta:
//!
//! - **Segments**: the buffer split into prose and fenced code, losslessly,
//!   with only the trailing unterminated block marked as streaming
//! - **Rendering**: markdown prose, code cards with a live badge and caret,
//!   copy acknowledgments and message actions
//! - **Live preview**: a latch that opens the preview once per message, keeps
//!   it updated, respects a dismissal and debounces document rebuilds
//!
//! ## Core Concepts
//!
//! - **Pure pipeline**: extraction, classification and segmentation are pure
//!   functions of the buffer, re-run from scratch on each delta
//! - **Per-view state**: every [`ChatView`] owns its triggers and its sink
//! - **Explicit time**: timers take an [`std::time::Instant`], so behavior is
//!   deterministic under test
//! - **Actor threads**: ticks and key input arrive over crossbeam channels;
//!   all state stays on the coordinator thread
//!
//! ## Example
//!
//! ```rust
//! use livefence::{segment_buffer, Segment};
//!
//! let segments = segment_buffer("Here:\n```html\n<div>hi</div>", true);
//! assert!(matches!(&segments[1], Segment::Code { streaming: true, .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod chat;
pub mod clipboard;
pub mod error;
pub mod fence;
pub mod preview;
pub mod render;
pub mod session;
pub mod terminal;

// Re-exports for convenience
pub use chat::{ChatView, Message, MessageId, Role, StreamEvent};
pub use clipboard::{Clipboard, CopyButton, MemoryClipboard};
pub use error::{ChatError, ClipboardError, SurfaceError};
pub use fence::{classify, extract_blocks, segment, segment_buffer, CodeBlock, PreviewKind, Segment};
pub use preview::{
    LivePreviewTrigger, PreviewConfig, PreviewDocument, PreviewHost, PreviewSession, PreviewSink,
    PreviewStatus, PreviewSurface,
};
pub use render::{render_message, Canvas, Modifiers, Rect, RenderConfig, RenderedMessage, Rgb, Style};
pub use session::{Command, Coordinator, CoordinatorConfig};
