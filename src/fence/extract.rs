//! Extractor: linear scan of a buffer for fenced code blocks.
//!
//! The scanner is a pure function of the buffer. It is re-run from the start
//! on every growth event, which keeps it free of carried-over state: the same
//! buffer always yields the same blocks.
//!
//! # Fence grammar
//!
//! ```text
//! open   := "```" lang? (hspace+ filename?)? hspace* "\n"
//! lang   := [A-Za-z0-9_+#.-]+
//! body   := anything up to the next "```" (or end of buffer)
//! ```
//!
//! An opening marker whose header line has not been terminated yet is left
//! as plain text: the tag might still be arriving. Anything after the
//! filename token on the header line is ignored.

use super::block::{CodeBlock, DEFAULT_LANGUAGE};

/// The fence delimiter.
pub const FENCE: &str = "```";

/// Outcome of probing one `"```"` occurrence as an opening fence.
enum Probe {
    /// A valid opening fence.
    Open(OpeningFence),
    /// Not an opening fence; scanning continues after this marker.
    Rejected,
    /// Header line not terminated yet; nothing after it can be a fence.
    Pending,
}

/// A recognised opening fence line.
struct OpeningFence {
    /// Byte offset of the first backtick.
    start: usize,
    /// Byte offset of the first body byte (just past the header newline).
    body_start: usize,
    language: String,
    filename: Option<String>,
}

/// Check whether a buffer contains any fence marker at all.
#[inline]
pub fn contains_fence(buffer: &str) -> bool {
    buffer.contains(FENCE)
}

/// Extract all fenced code blocks from `buffer`, in order.
///
/// Every block but the last is complete. The last one is incomplete when its
/// closing fence has not arrived yet, in which case it spans the rest of the
/// buffer. This never fails: malformed markers end up as plain text or inside
/// the trailing incomplete block.
pub fn extract_blocks(buffer: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(open) = find_opening(buffer, cursor) {
        let rest = &buffer[open.body_start..];
        if let Some(rel) = rest.find(FENCE) {
            let close = open.body_start + rel;
            let end = close + FENCE.len();
            blocks.push(CodeBlock {
                language: open.language,
                code: buffer[open.body_start..close].trim().to_string(),
                filename: open.filename,
                complete: true,
                source: open.start..end,
            });
            cursor = end;
        } else {
            blocks.push(CodeBlock {
                language: open.language,
                code: rest.trim().to_string(),
                filename: open.filename,
                complete: false,
                source: open.start..buffer.len(),
            });
            break;
        }
    }

    blocks
}

/// Treat a trailing open fence as closed.
///
/// Used when the stream ends (completion, cancellation or error) with a
/// fence still open: the received body is kept as-is.
pub fn finalize_blocks(blocks: &mut [CodeBlock]) {
    if let Some(last) = blocks.last_mut() {
        last.complete = true;
    }
}

/// Find the next opening fence at or after `from`.
fn find_opening(buffer: &str, from: usize) -> Option<OpeningFence> {
    let mut search = from;
    while let Some(rel) = buffer[search..].find(FENCE) {
        let start = search + rel;
        match probe_opening(buffer, start) {
            Probe::Open(open) => return Some(open),
            Probe::Pending => return None,
            // Slide by one byte so "````js" still opens at the last three ticks
            Probe::Rejected => search = start + 1,
        }
    }
    None
}

/// Probe the marker at `start` as an opening fence.
fn probe_opening(buffer: &str, start: usize) -> Probe {
    let header_start = start + FENCE.len();
    let header = &buffer[header_start..];

    let lang_len = header
        .find(|c: char| !is_tag_char(c))
        .unwrap_or(header.len());

    let after_lang = &header[lang_len..];
    match after_lang.chars().next() {
        // The tag itself may still be streaming in
        None => return Probe::Pending,
        Some(c) if c.is_whitespace() => {}
        Some(_) => return Probe::Rejected,
    }

    let Some(newline) = after_lang.find('\n') else {
        return Probe::Pending;
    };

    let language = if lang_len == 0 {
        DEFAULT_LANGUAGE.to_string()
    } else {
        header[..lang_len].to_ascii_lowercase()
    };

    let filename = after_lang[..newline]
        .split_whitespace()
        .next()
        .map(str::to_string);

    Probe::Open(OpeningFence {
        start,
        body_start: header_start + lang_len + newline + 1,
        language,
        filename,
    })
}

/// Characters allowed in a language tag.
const fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '#' | '.')
}
