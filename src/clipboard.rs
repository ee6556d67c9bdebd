//! Clipboard access and the copy button state machine.
//!
//! A copy shows an acknowledgment for a fixed time (2 s by default). If the
//! write fails the button silently stays in its idle state: the failure is
//! logged at debug level and nothing else happens.
//!
//! ```text
//!   Idle ──copy ok──► Copied ──ack elapsed / reset──► Idle
//!    ▲                  │
//!    └──copy failed─────┘ (stays Idle)
//! ```

use crate::error::ClipboardError;
use std::time::{Duration, Instant};

/// Default time the "copied" acknowledgment stays visible.
pub const DEFAULT_COPY_ACK: Duration = Duration::from_secs(2);

/// Destination for copied text.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`, verbatim.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard, used when no platform clipboard is wanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub const fn new() -> Self {
        Self { contents: None }
    }

    /// Last copied text.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Platform clipboard backed by `arboard`.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Open the platform clipboard.
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| {
                log::warn!("Clipboard not available: {e}");
                ClipboardError::Unavailable
            })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}

/// Copy action with a timed acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyButton {
    copied_at: Option<Instant>,
    acknowledgment: Duration,
}

impl Default for CopyButton {
    fn default() -> Self {
        Self::new(DEFAULT_COPY_ACK)
    }
}

impl CopyButton {
    /// Create an idle button whose acknowledgment lasts `acknowledgment`.
    pub const fn new(acknowledgment: Duration) -> Self {
        Self {
            copied_at: None,
            acknowledgment,
        }
    }

    /// Copy `text` and start the acknowledgment.
    ///
    /// Returns whether the copy succeeded. Failures are swallowed.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, text: &str, now: Instant) -> bool {
        match clipboard.set_text(text) {
            Ok(()) => {
                self.copied_at = Some(now);
                true
            }
            Err(e) => {
                log::debug!("Copy failed, acknowledgment suppressed: {e}");
                false
            }
        }
    }

    /// Whether the "copied" acknowledgment is showing at `now`.
    pub fn is_acknowledged(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.acknowledgment)
    }

    /// When the acknowledgment expires, if one is showing.
    pub fn deadline(&self) -> Option<Instant> {
        self.copied_at.map(|at| at + self.acknowledgment)
    }

    /// Drop the acknowledgment immediately.
    pub const fn reset(&mut self) {
        self.copied_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::WriteFailed("denied".into()))
        }
    }

    #[test]
    fn test_copy_acknowledges_for_two_seconds() {
        let mut clipboard = MemoryClipboard::new();
        let mut button = CopyButton::default();
        let t0 = Instant::now();

        assert!(button.copy(&mut clipboard, "let x = 1;", t0));
        assert_eq!(clipboard.contents(), Some("let x = 1;"));
        assert!(button.is_acknowledged(t0 + Duration::from_millis(1999)));
        assert!(!button.is_acknowledged(t0 + Duration::from_secs(2)));
        assert_eq!(button.deadline(), Some(t0 + DEFAULT_COPY_ACK));
    }

    #[test]
    fn test_copy_failure_is_silent() {
        let mut button = CopyButton::default();
        let now = Instant::now();
        assert!(!button.copy(&mut BrokenClipboard, "x", now));
        assert!(!button.is_acknowledged(now));
        assert_eq!(button.deadline(), None);
    }

    #[test]
    fn test_reset() {
        let mut button = CopyButton::default();
        let now = Instant::now();
        button.copy(&mut MemoryClipboard::new(), "x", now);
        button.reset();
        assert!(!button.is_acknowledged(now));
    }

    #[test]
    fn test_copy_is_verbatim() {
        let mut clipboard = MemoryClipboard::new();
        let code = "  indented\n\ttabbed\n";
        CopyButton::default().copy(&mut clipboard, code, Instant::now());
        assert_eq!(clipboard.contents(), Some(code));
    }
}
