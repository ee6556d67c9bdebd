//! Preview host: turns the session's active block into loaded documents.
//!
//! The host is driven by explicit instants. Every call to [`PreviewHost::sync`]
//! compares the session with what the host saw last time, schedules rebuilds
//! and performs those that are due.
//!
//! # Rebuild timing
//!
//! ```text
//! streaming   change ──► rebuild at change + debounce (window not extended)
//! settled     stream end / new blocks / refresh ──► "Rendering" ──► rebuild at + render_delay
//! any         tab switch while settled ──► rebuild now
//! ```

use super::document::{build_document, export_filename, standalone_document, tab_label, PreviewDocument};
use super::session::PreviewSession;
use crate::error::SurfaceError;
use crate::fence::CodeBlock;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Preview timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Minimum spacing between rebuilds while streaming.
    pub debounce: Duration,
    /// "Rendering" delay before a forced rebuild.
    pub render_delay: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            render_delay: Duration::from_millis(500),
        }
    }
}

/// An isolated place that displays preview documents.
pub trait PreviewSurface {
    /// Replace the displayed document.
    fn load(&mut self, document: &PreviewDocument) -> Result<(), SurfaceError>;
}

/// Surface that writes each document to a file, for opening in a browser.
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    /// Write documents to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PreviewSurface for FileSurface {
    fn load(&mut self, document: &PreviewDocument) -> Result<(), SurfaceError> {
        std::fs::write(&self.path, &document.html).map_err(|e| SurfaceError::LoadFailed(e.to_string()))
    }
}

/// What the preview panel is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewStatus {
    /// No blocks.
    #[default]
    Empty,
    /// The active block has no code yet.
    Waiting,
    /// A rebuild is scheduled.
    Rendering,
    /// The last document loaded.
    Ready,
    /// The surface or the document reported an error.
    Failed(String),
}

/// Preview panel body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Rendered document.
    #[default]
    Preview,
    /// Source of the active block.
    Code,
}

/// Message posted back by a loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The document rendered.
    Ready,
    /// The document raised an error.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    revision: u64,
    active_index: usize,
    active_len: usize,
    streaming: bool,
}

impl Snapshot {
    fn of(session: &PreviewSession) -> Self {
        Self {
            revision: session.revision(),
            active_index: session.active_index(),
            active_len: session.active_block().map_or(0, |b| b.code.len()),
            streaming: session.is_streaming(),
        }
    }
}

/// Drives a [`PreviewSurface`] from a [`PreviewSession`].
#[derive(Debug)]
pub struct PreviewHost<S> {
    surface: S,
    config: PreviewConfig,
    status: PreviewStatus,
    view_mode: ViewMode,
    seen: Option<Snapshot>,
    debounce_at: Option<Instant>,
    render_at: Option<Instant>,
    document: Option<PreviewDocument>,
    loads: u64,
}

impl<S: PreviewSurface> PreviewHost<S> {
    /// Create a host over `surface`.
    pub fn new(surface: S, config: PreviewConfig) -> Self {
        Self {
            surface,
            config,
            status: PreviewStatus::Empty,
            view_mode: ViewMode::Preview,
            seen: None,
            debounce_at: None,
            render_at: None,
            document: None,
            loads: 0,
        }
    }

    /// Current status.
    pub const fn status(&self) -> &PreviewStatus {
        &self.status
    }

    /// Current body mode.
    pub const fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switch the body mode.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Flip between preview and code.
    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = match self.view_mode {
            ViewMode::Preview => ViewMode::Code,
            ViewMode::Code => ViewMode::Preview,
        };
        self.view_mode
    }

    /// Last loaded document.
    pub const fn document(&self) -> Option<&PreviewDocument> {
        self.document.as_ref()
    }

    /// Number of documents handed to the surface so far.
    pub const fn load_count(&self) -> u64 {
        self.loads
    }

    /// The underlying surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Earliest pending rebuild.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_at, self.render_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Header status text: "Generating..." while streaming, "Rendering..." while a
    /// forced rebuild is pending.
    pub fn header_status(&self, session: &PreviewSession) -> Option<&'static str> {
        if session.is_streaming() {
            Some("Generating...")
        } else if self.render_at.is_some() {
            Some("Rendering...")
        } else {
            None
        }
    }

    /// Labels of the session's tabs. Tabs are shown when there is more than one.
    pub fn tab_labels(session: &PreviewSession) -> Vec<String> {
        session.blocks().iter().map(tab_label).collect()
    }

    /// Save the active block's source into `dir` under its download name.
    ///
    /// Returns `None` when there is no code to save.
    pub fn export(session: &PreviewSession, dir: &Path) -> Result<Option<PathBuf>, SurfaceError> {
        write_active(session, dir, |block| (export_filename(block), block.code.clone()))
    }

    /// Write the active block as a page that runs on its own (no reporting
    /// scripts) into `dir`, for opening in a browser tab.
    pub fn export_standalone(session: &PreviewSession, dir: &Path) -> Result<Option<PathBuf>, SurfaceError> {
        write_active(session, dir, |block| {
            let name = export_filename(block);
            let stem = Path::new(&name)
                .file_stem()
                .map_or_else(|| "code".to_string(), |s| s.to_string_lossy().into_owned());
            (format!("{stem}.standalone.html"), standalone_document(block))
        })
    }

    /// Force a rebuild after the rendering delay.
    pub fn refresh(&mut self, now: Instant) {
        self.schedule_render(now);
    }

    /// Apply a message posted back by the loaded document.
    pub fn surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Ready => {
                if matches!(self.status, PreviewStatus::Failed(_)) {
                    return;
                }
                if self.document.is_some() && self.next_deadline().is_none() {
                    self.status = PreviewStatus::Ready;
                }
            }
            SurfaceEvent::Error(message) => {
                log::warn!("Preview document reported an error: {message}");
                self.status = PreviewStatus::Failed(message);
            }
        }
    }

    /// Reconcile with the session and run due rebuilds.
    pub fn sync(&mut self, session: &PreviewSession, now: Instant) {
        if !session.is_open() {
            self.seen = None;
            self.debounce_at = None;
            self.render_at = None;
            return;
        }

        let current = Snapshot::of(session);
        match self.seen.replace(current) {
            None if current.streaming => self.schedule_debounce(now),
            None => self.schedule_render(now),
            Some(prev) if prev.streaming && !current.streaming => {
                self.debounce_at = None;
                self.schedule_render(now);
            }
            Some(prev) if current.streaming => {
                if prev.active_len != current.active_len || prev.active_index != current.active_index {
                    self.schedule_debounce(now);
                }
            }
            Some(prev) if prev.revision != current.revision => self.schedule_render(now),
            Some(prev) if prev.active_index != current.active_index => self.rebuild(session),
            Some(_) => {}
        }

        if self.next_deadline().is_some_and(|at| at <= now) {
            self.rebuild(session);
        } else if self.next_deadline().is_none() && !matches!(self.status, PreviewStatus::Failed(_)) {
            self.status = self.idle_status(session);
        }
    }

    fn idle_status(&self, session: &PreviewSession) -> PreviewStatus {
        match session.active_block() {
            None if session.is_streaming() => PreviewStatus::Waiting,
            None => PreviewStatus::Empty,
            Some(block) if block.code.is_empty() => PreviewStatus::Waiting,
            Some(_) if self.document.is_some() => PreviewStatus::Ready,
            Some(_) => PreviewStatus::Rendering,
        }
    }

    fn schedule_debounce(&mut self, now: Instant) {
        if self.debounce_at.is_none() {
            self.debounce_at = Some(now + self.config.debounce);
        }
        if self.document.is_none() {
            self.status = PreviewStatus::Rendering;
        }
    }

    fn schedule_render(&mut self, now: Instant) {
        if self.render_at.is_none() {
            self.render_at = Some(now + self.config.render_delay);
        }
        self.status = PreviewStatus::Rendering;
    }

    fn rebuild(&mut self, session: &PreviewSession) {
        self.debounce_at = None;
        self.render_at = None;

        let Some(block) = session.active_block().filter(|b| !b.code.is_empty()) else {
            self.status = self.idle_status(session);
            return;
        };

        let document = build_document(block);
        match self.surface.load(&document) {
            Ok(()) => {
                log::trace!("Loaded {} preview ({} bytes)", document.kind, document.html.len());
                self.loads += 1;
                self.document = Some(document);
                self.status = PreviewStatus::Ready;
            }
            Err(e) => {
                log::warn!("Preview surface failed to load document: {e}");
                self.status = PreviewStatus::Failed(e.to_string());
            }
        }
    }
}

fn write_active(
    session: &PreviewSession,
    dir: &Path,
    file: impl FnOnce(&CodeBlock) -> (String, String),
) -> Result<Option<PathBuf>, SurfaceError> {
    let Some(block) = session.active_block().filter(|b| !b.code.is_empty()) else {
        return Ok(None);
    };
    let (name, contents) = file(block);
    let path = dir.join(name);
    std::fs::create_dir_all(dir).map_err(|e| SurfaceError::ExportFailed(e.to_string()))?;
    std::fs::write(&path, contents).map_err(|e| SurfaceError::ExportFailed(e.to_string()))?;
    Ok(Some(path))
}
