//! Live preview: trigger, session, documents and host.
//!
//! ```text
//! ChatView ──trigger──► PreviewSink (PreviewSession) ◄──sync── PreviewHost ──load──► PreviewSurface
//! ```

mod document;
mod host;
mod panel;
mod session;
mod trigger;

pub use document::{
    build_document, export_filename, is_full_document, preview_kind, standalone_document, tab_label,
    PreviewDocument, ERROR_MESSAGE, READY_MESSAGE,
};
pub use host::{
    FileSurface, PreviewConfig, PreviewHost, PreviewStatus, PreviewSurface, SurfaceEvent, ViewMode,
};
pub use session::PreviewSession;
pub use trigger::{LivePreviewTrigger, PreviewSink, TriggerOutcome, TriggerState};
