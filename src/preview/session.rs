//! The preview session: what the preview panel shows.
//!
//! There is one session per chat view. It receives pushes from the live
//! trigger (through [`PreviewSink`]) and from user actions, and the preview
//! host reads it on every sync.

use super::trigger::PreviewSink;
use crate::fence::CodeBlock;

/// Preview panel state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewSession {
    blocks: Vec<CodeBlock>,
    active_index: usize,
    is_open: bool,
    is_streaming: bool,
    user_dismissed: bool,
    revision: u64,
}

impl PreviewSession {
    /// Create a closed, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Previewable blocks, in order.
    pub fn blocks(&self) -> &[CodeBlock] {
        &self.blocks
    }

    /// Index of the selected tab.
    pub const fn active_index(&self) -> usize {
        self.active_index
    }

    /// The selected block, if any.
    pub fn active_block(&self) -> Option<&CodeBlock> {
        self.blocks.get(self.active_index)
    }

    /// Whether the panel is visible.
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the previewed message is still streaming.
    pub const fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// Whether the user closed the panel since it was last opened.
    pub const fn is_dismissed(&self) -> bool {
        self.user_dismissed
    }

    /// Incremented whenever the block list is replaced.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Select a tab. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.blocks.len() {
            self.active_index = index;
            true
        } else {
            false
        }
    }

    /// Mark the previewed message as streaming or settled.
    pub fn set_streaming(&mut self, streaming: bool) {
        self.is_streaming = streaming;
    }

    /// Close the panel at the user's request.
    pub fn dismiss(&mut self) {
        self.is_open = false;
        self.user_dismissed = true;
    }

    /// Toggle visibility. Opening needs at least one block.
    pub fn toggle(&mut self) -> bool {
        if self.is_open {
            self.dismiss();
        } else if !self.blocks.is_empty() {
            self.is_open = true;
            self.user_dismissed = false;
        }
        self.is_open
    }

    fn replace(&mut self, blocks: &[CodeBlock]) {
        self.blocks = blocks.to_vec();
        if self.active_index >= self.blocks.len() {
            self.active_index = 0;
        }
        self.revision += 1;
    }
}

impl PreviewSink for PreviewSession {
    fn open(&mut self, blocks: &[CodeBlock]) {
        self.replace(blocks);
        self.is_open = true;
        self.is_streaming = true;
        self.user_dismissed = false;
    }

    fn update(&mut self, blocks: &[CodeBlock]) {
        self.replace(blocks);
    }

    fn show(&mut self, blocks: &[CodeBlock], streaming: bool) {
        self.replace(blocks);
        self.is_open = true;
        self.is_streaming = streaming;
        self.user_dismissed = false;
    }

    fn close(&mut self) {
        self.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(n: usize) -> Vec<CodeBlock> {
        (0..n)
            .map(|i| CodeBlock {
                language: "html".to_string(),
                code: format!("<p>{i}</p>"),
                filename: None,
                complete: true,
                source: 0..0,
            })
            .collect()
    }

    #[test]
    fn test_live_open() {
        let mut session = PreviewSession::new();
        session.open(&blocks(1));
        assert!(session.is_open());
        assert!(session.is_streaming());
        assert_eq!(session.active_block().map(|b| b.code.as_str()), Some("<p>0</p>"));
    }

    #[test]
    fn test_selection_persists_until_out_of_range() {
        let mut session = PreviewSession::new();
        session.open(&blocks(3));
        assert!(session.select(2));
        session.update(&blocks(3));
        assert_eq!(session.active_index(), 2);

        session.update(&blocks(2));
        assert_eq!(session.active_index(), 0);
        assert!(!session.select(5));
    }

    #[test]
    fn test_revision_counts_replacements() {
        let mut session = PreviewSession::new();
        session.open(&blocks(1));
        session.update(&blocks(1));
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn test_close_marks_dismissed_and_show_reopens() {
        let mut session = PreviewSession::new();
        session.open(&blocks(1));
        session.close();
        assert!(!session.is_open());
        assert!(session.is_dismissed());

        session.show(&blocks(2), false);
        assert!(session.is_open());
        assert!(!session.is_dismissed());
        assert!(!session.is_streaming());
    }

    #[test]
    fn test_toggle_needs_blocks() {
        let mut session = PreviewSession::new();
        assert!(!session.toggle());
        session.show(&blocks(1), false);
        assert!(!session.toggle());
        assert!(session.toggle());
    }

    #[test]
    fn test_show_keeps_live_message_streaming() {
        let mut session = PreviewSession::new();
        session.show(&blocks(1), true);
        assert!(session.is_open());
        assert!(session.is_streaming());
    }
}
