//! Segmenter: split a buffer into ordered text and code pieces.
//!
//! Segments cover the buffer losslessly. Fence delimiters belong to the code
//! segment they open or close, so concatenating the underlying text of every
//! segment reproduces the buffer byte for byte:
//!
//! ```text
//! "intro\n```js\nrun()\n```\noutro"
//!  └─Text─┘└────Code────────┘└Text┘
//! ```

use super::block::CodeBlock;
use super::extract::extract_blocks;

/// A renderable piece of a message buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Prose between fences, verbatim.
    Text(String),
    /// A fenced code block.
    Code {
        /// The extracted block. `block.source` locates the fence in the buffer.
        block: CodeBlock,
        /// Whether this block is still receiving content.
        streaming: bool,
    },
}

impl Segment {
    /// Underlying buffer text of this segment.
    ///
    /// `buffer` must be the buffer the segment was produced from.
    pub fn source_text<'a>(&'a self, buffer: &'a str) -> &'a str {
        match self {
            Self::Text(text) => text,
            Self::Code { block, .. } => buffer.get(block.source.clone()).unwrap_or_default(),
        }
    }

    /// Check if this is a code segment that is still streaming.
    #[inline]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Code { streaming: true, .. })
    }

    /// Check if this is a text segment made only of whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

/// Segment `buffer` using blocks previously extracted from it.
///
/// A code segment is marked streaming only when `is_streaming` is set, the
/// block is the last one and its closing fence has not been seen.
pub fn segment(buffer: &str, blocks: &[CodeBlock], is_streaming: bool) -> Vec<Segment> {
    if blocks.is_empty() {
        return vec![Segment::Text(buffer.to_string())];
    }

    let mut segments = Vec::with_capacity(blocks.len() * 2 + 1);
    let mut cursor = 0;
    let last = blocks.len() - 1;

    for (index, block) in blocks.iter().enumerate() {
        let range = block.source.clone();
        // Blocks from a different buffer would break coverage; skip them
        if range.start < cursor || buffer.get(range.clone()).is_none() {
            continue;
        }

        if range.start > cursor {
            segments.push(Segment::Text(buffer[cursor..range.start].to_string()));
        }

        let streaming = is_streaming && index == last && !block.complete;
        segments.push(Segment::Code {
            block: block.clone(),
            streaming,
        });
        cursor = range.end;
    }

    if cursor < buffer.len() {
        segments.push(Segment::Text(buffer[cursor..].to_string()));
    }

    log::trace!(
        "segmented {} bytes into {} segments ({} blocks)",
        buffer.len(),
        segments.len(),
        blocks.len()
    );

    segments
}

/// Extract and segment in one step.
pub fn segment_buffer(buffer: &str, is_streaming: bool) -> Vec<Segment> {
    segment(buffer, &extract_blocks(buffer), is_streaming)
}

/// Rebuild the buffer from its segments.
pub fn reassemble(segments: &[Segment], buffer: &str) -> String {
    segments.iter().map(|s| s.source_text(buffer)).collect()
}
