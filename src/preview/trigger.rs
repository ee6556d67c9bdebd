//! Live preview trigger: opens the preview once per streaming message.
//!
//! ```text
//!            previewable block while streaming
//!   Idle ─────────────────────────────────────► Fired ──growth──► update(blocks)
//!    ▲                                            │
//!    └──────────── reset (new assistant message) ─┘
//!
//!   dismissed (independent latch): every open/update is suppressed
//! ```

use crate::fence::CodeBlock;

/// Receiver of preview pushes from a chat view.
pub trait PreviewSink {
    /// Show the preview with `blocks`. Called at most once per message lifecycle.
    fn open(&mut self, blocks: &[CodeBlock]);

    /// Replace the previewed blocks.
    fn update(&mut self, blocks: &[CodeBlock]);

    /// Show `blocks` at the user's request, even after a dismissal.
    /// `streaming` tells whether the owning message is still typing.
    fn show(&mut self, blocks: &[CodeBlock], _streaming: bool) {
        self.open(blocks);
    }

    /// The user closed the preview.
    fn close(&mut self) {}
}

/// Latch state of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    /// Nothing previewable seen yet.
    #[default]
    Idle,
    /// `open` has been called for this lifecycle.
    Fired,
}

/// What one observation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Nothing to do.
    Skipped,
    /// The sink was opened.
    Opened,
    /// The sink received new blocks.
    Updated,
    /// The user dismissed the preview; nothing was pushed.
    Suppressed,
}

/// Per-message trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivePreviewTrigger {
    state: TriggerState,
    dismissed: bool,
}

impl LivePreviewTrigger {
    /// Create an idle trigger.
    pub const fn new() -> Self {
        Self {
            state: TriggerState::Idle,
            dismissed: false,
        }
    }

    /// Current latch state.
    pub const fn state(&self) -> TriggerState {
        self.state
    }

    /// Whether the user dismissed the preview during this lifecycle.
    pub const fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Observe the previewable blocks after a buffer change.
    pub fn observe(
        &mut self,
        blocks: &[CodeBlock],
        streaming: bool,
        sink: &mut dyn PreviewSink,
    ) -> TriggerOutcome {
        if self.dismissed {
            return TriggerOutcome::Suppressed;
        }
        match self.state {
            TriggerState::Idle if streaming && !blocks.is_empty() => {
                log::debug!("Live preview opened with {} block(s)", blocks.len());
                self.state = TriggerState::Fired;
                sink.open(blocks);
                TriggerOutcome::Opened
            }
            TriggerState::Idle => TriggerOutcome::Skipped,
            TriggerState::Fired => {
                sink.update(blocks);
                TriggerOutcome::Updated
            }
        }
    }

    /// Push the finalized blocks once the stream has ended.
    pub fn finish(&mut self, blocks: &[CodeBlock], sink: &mut dyn PreviewSink) -> TriggerOutcome {
        match (self.state, self.dismissed) {
            (_, true) => TriggerOutcome::Suppressed,
            (TriggerState::Idle, false) => TriggerOutcome::Skipped,
            (TriggerState::Fired, false) => {
                log::debug!("Live preview finalized with {} block(s)", blocks.len());
                sink.update(blocks);
                TriggerOutcome::Updated
            }
        }
    }

    /// Latch the user's dismissal for the rest of this lifecycle.
    pub fn dismiss(&mut self) {
        if !self.dismissed {
            log::debug!("Live preview dismissed");
        }
        self.dismissed = true;
    }

    /// Start a new lifecycle.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fence::{extract_blocks, previewable_blocks};

    #[derive(Default)]
    struct Recorder {
        opens: Vec<usize>,
        updates: Vec<usize>,
    }

    impl PreviewSink for Recorder {
        fn open(&mut self, blocks: &[CodeBlock]) {
            self.opens.push(blocks.len());
        }

        fn update(&mut self, blocks: &[CodeBlock]) {
            self.updates.push(blocks.len());
        }
    }

    fn previewable(text: &str) -> Vec<CodeBlock> {
        previewable_blocks(&extract_blocks(text))
    }

    #[test]
    fn test_opens_once_then_updates() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();

        let outcomes: Vec<_> = ["```html\n<div>", "```html\n<div>a", "```html\n<div>a</div>\n```\n```css\np{}"]
            .iter()
            .map(|text| trigger.observe(&previewable(text), true, &mut sink))
            .collect();

        assert_eq!(
            outcomes,
            [TriggerOutcome::Opened, TriggerOutcome::Updated, TriggerOutcome::Updated]
        );
        assert_eq!(sink.opens, [1]);
        assert_eq!(sink.updates, [1, 2]);
    }

    #[test]
    fn test_waits_for_previewable_block() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();
        assert_eq!(
            trigger.observe(&previewable("```python\nprint()"), true, &mut sink),
            TriggerOutcome::Skipped
        );
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert!(sink.opens.is_empty());
    }

    #[test]
    fn test_does_not_open_when_not_streaming() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();
        assert_eq!(
            trigger.observe(&previewable("```html\n<p/>\n```"), false, &mut sink),
            TriggerOutcome::Skipped
        );
        assert_eq!(trigger.finish(&previewable("```html\n<p/>\n```"), &mut sink), TriggerOutcome::Skipped);
    }

    #[test]
    fn test_dismissal_suppresses_updates_and_finish() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();
        let blocks = previewable("```jsx\nconst App");
        trigger.observe(&blocks, true, &mut sink);
        trigger.dismiss();

        assert_eq!(trigger.observe(&blocks, true, &mut sink), TriggerOutcome::Suppressed);
        assert_eq!(trigger.finish(&blocks, &mut sink), TriggerOutcome::Suppressed);
        assert!(sink.updates.is_empty());
    }

    #[test]
    fn test_finish_pushes_final_update() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();
        trigger.observe(&previewable("```js\nlet a"), true, &mut sink);
        assert_eq!(trigger.finish(&previewable("```js\nlet a = 1;"), &mut sink), TriggerOutcome::Updated);
        assert_eq!(sink.updates, [1]);
    }

    #[test]
    fn test_reset_rearms() {
        let mut trigger = LivePreviewTrigger::new();
        let mut sink = Recorder::default();
        let blocks = previewable("```css\na{}");
        trigger.observe(&blocks, true, &mut sink);
        trigger.dismiss();
        trigger.reset();

        assert!(!trigger.is_dismissed());
        assert_eq!(trigger.observe(&blocks, true, &mut sink), TriggerOutcome::Opened);
        assert_eq!(sink.opens, [1, 1]);
    }
}
