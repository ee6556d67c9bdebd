//! Fence module: code block extraction, classification and segmentation.
//!
//! Everything here is a pure function of the current buffer. The pipeline is
//! re-run from scratch on every delta:
//!
//! ```text
//! buffer ──► extract_blocks ──► classify ──► previewable blocks
//!                  │
//!                  └──────────► segment ───► Vec<Segment> ──► render
//! ```

mod block;
mod classify;
mod extract;
mod segment;

pub use block::{CodeBlock, DEFAULT_LANGUAGE};
pub use classify::{classify, file_extension, is_previewable, previewable_blocks, PreviewKind};
pub use extract::{contains_fence, extract_blocks, finalize_blocks, FENCE};
pub use segment::{reassemble, segment, segment_buffer, Segment};
