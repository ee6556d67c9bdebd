//! `CodeBlock`: a fenced block recovered from a streaming buffer.

use std::ops::Range;

/// Language recorded when the opening fence carries no tag.
pub const DEFAULT_LANGUAGE: &str = "text";

/// A fenced code block extracted from a message buffer.
///
/// Blocks are derived data: they are recomputed from the buffer on every
/// growth event and never persisted. A block is `complete` once its closing
/// fence has been seen (or the stream was finalized while it was open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Lowercased language tag from the opening fence (`text` if absent).
    pub language: String,
    /// Block body with surrounding whitespace trimmed.
    pub code: String,
    /// Optional filename, the second token of the opening fence line.
    pub filename: Option<String>,
    /// Whether the closing fence has been seen.
    pub complete: bool,
    /// Byte range of the whole fence (markers included) in the source buffer.
    pub source: Range<usize>,
}

impl CodeBlock {
    /// Header label: the filename if present, otherwise the language.
    pub fn label(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.language)
    }

    /// Compare the fields that must stay stable once a block completes.
    pub fn same_content(&self, other: &Self) -> bool {
        self.language == other.language
            && self.code == other.code
            && self.filename == other.filename
    }
}
