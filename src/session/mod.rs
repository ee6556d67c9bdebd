//! Session coordinator: the single-threaded event loop of a chat page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   StreamEvent   ┌─────────────────────────────────────────┐
//! │  Transport   │ ──────────────► │ Coordinator                             │
//! └──────────────┘                 │   ChatView<PreviewSession> ──► sink     │
//! ┌──────────────┐     Command     │   PreviewHost<S>  ◄── sync(session)     │
//! │ Input thread │ ──────────────► │                                         │
//! └──────────────┘                 │                                         │
//! ┌──────────────┐      Tick       │                                         │
//! │ TickerActor  │ ──────────────► │                                         │
//! └──────────────┘                 └─────────────────────────────────────────┘
//! ```
//!
//! Every piece of state lives on the coordinator thread. Other threads only
//! send messages.

mod ticker;

pub use ticker::{Tick, TickerActor};

use crate::chat::{ChatView, MessageId, StreamEvent};
use crate::error::{ChatError, SurfaceError};
use crate::preview::{
    PreviewConfig, PreviewHost, PreviewSession, PreviewSurface, SurfaceEvent, TriggerOutcome, ViewMode,
};
use crate::render::RenderConfig;
use crossbeam_channel::{never, select, Receiver};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Configuration of a [`Coordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Interval between timer ticks.
    pub tick_interval: Duration,
    /// Message rendering.
    pub render: RenderConfig,
    /// Preview timing.
    pub preview: PreviewConfig,
    /// Where exported blocks and standalone pages are written.
    pub export_dir: PathBuf,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            render: RenderConfig::default(),
            preview: PreviewConfig::default(),
            export_dir: std::env::temp_dir(),
        }
    }
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the preview of a message.
    ShowPreview(MessageId),
    /// Close the preview panel.
    DismissPreview,
    /// Open or close the preview panel.
    TogglePreview,
    /// Select a preview tab.
    SelectTab(usize),
    /// Select the tab after the current one, wrapping around.
    NextTab,
    /// Rebuild the preview document.
    RefreshPreview,
    /// Switch between rendered preview and source.
    ToggleViewMode,
    /// Save the active block's source under its download name.
    ExportPreview,
    /// Write the active block as a standalone page.
    OpenStandalone,
    /// Stop every streaming message.
    StopGeneration,
    /// A message from the preview surface.
    Surface(SurfaceEvent),
    /// Leave the event loop.
    Quit,
}

/// Owner of one chat view, its preview session and the preview host.
#[derive(Debug)]
pub struct Coordinator<S> {
    chat: ChatView<PreviewSession>,
    host: PreviewHost<S>,
    tick_interval: Duration,
    export_dir: PathBuf,
    last_export: Option<PathBuf>,
}

impl<S: PreviewSurface> Coordinator<S> {
    /// Create a coordinator whose previews load into `surface`.
    pub fn new(surface: S, config: CoordinatorConfig) -> Self {
        Self {
            chat: ChatView::new(PreviewSession::new(), config.render),
            host: PreviewHost::new(surface, config.preview),
            tick_interval: config.tick_interval,
            export_dir: config.export_dir,
            last_export: None,
        }
    }

    /// The chat view.
    pub const fn chat(&self) -> &ChatView<PreviewSession> {
        &self.chat
    }

    /// The chat view, mutably (user messages, copy, scroll, feedback).
    pub fn chat_mut(&mut self) -> &mut ChatView<PreviewSession> {
        &mut self.chat
    }

    /// The preview session.
    pub const fn session(&self) -> &PreviewSession {
        self.chat.sink()
    }

    /// The preview host.
    pub const fn host(&self) -> &PreviewHost<S> {
        &self.host
    }

    /// File written by the last export or standalone command.
    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    /// Apply a stream event.
    pub fn handle_event(&mut self, event: StreamEvent, now: Instant) -> Result<TriggerOutcome, ChatError> {
        let outcome = self.chat.apply(event, now);
        self.sync(now);
        outcome
    }

    /// Apply a user command. Returns `false` for [`Command::Quit`].
    pub fn handle_command(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::ShowPreview(id) => {
                if let Err(e) = self.chat.show_preview(id) {
                    log::warn!("Cannot show preview: {e}");
                }
            }
            Command::DismissPreview => {
                if self.session().is_open() {
                    self.chat.dismiss_preview();
                }
            }
            Command::TogglePreview => {
                if self.session().is_open() {
                    self.chat.dismiss_preview();
                } else {
                    self.chat.sink_mut().toggle();
                }
            }
            Command::SelectTab(index) => {
                self.chat.sink_mut().select(index);
            }
            Command::NextTab => {
                let session = self.chat.sink_mut();
                let count = session.blocks().len();
                if count > 1 {
                    session.select((session.active_index() + 1) % count);
                }
            }
            Command::RefreshPreview => self.host.refresh(now),
            Command::ToggleViewMode => {
                self.host.toggle_view_mode();
            }
            Command::ExportPreview => {
                let saved = PreviewHost::<S>::export(self.session(), &self.export_dir);
                self.record_export(saved);
            }
            Command::OpenStandalone => {
                let saved = PreviewHost::<S>::export_standalone(self.session(), &self.export_dir);
                self.record_export(saved);
            }
            Command::StopGeneration => {
                self.chat.stop_generation(now);
            }
            Command::Surface(event) => self.host.surface_event(event),
            Command::Quit => return false,
        }
        self.sync(now);
        true
    }

    /// Advance timers.
    pub fn tick(&mut self, now: Instant) {
        self.chat.tick(now);
        self.sync(now);
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match (self.chat.next_deadline(now), self.host.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether the preview body shows source instead of the document.
    pub fn shows_code(&self) -> bool {
        self.host.view_mode() == ViewMode::Code
    }

    fn record_export(&mut self, saved: Result<Option<PathBuf>, SurfaceError>) {
        match saved {
            Ok(Some(path)) => {
                log::info!("Preview exported to {}", path.display());
                self.last_export = Some(path);
            }
            Ok(None) => log::debug!("Nothing to export"),
            Err(e) => log::warn!("Cannot export preview: {e}"),
        }
    }

    fn sync(&mut self, now: Instant) {
        if self.session().is_streaming() && !self.chat.is_streaming() {
            self.chat.sink_mut().set_streaming(false);
        }
        self.host.sync(self.chat.sink(), now);
    }

    /// Run the event loop until [`Command::Quit`], or until both channels are
    /// closed and no timer is pending.
    ///
    /// `on_frame` is called after every event, command and tick.
    pub fn run(
        &mut self,
        events: &Receiver<StreamEvent>,
        commands: &Receiver<Command>,
        mut on_frame: impl FnMut(&Self, Instant),
    ) -> io::Result<()> {
        let ticker = TickerActor::spawn(self.tick_interval)?;
        let closed_events = never();
        let closed_commands = never();
        let mut events_open = true;
        let mut commands_open = true;

        loop {
            let event_rx = if events_open { events } else { &closed_events };
            let command_rx = if commands_open { commands } else { &closed_commands };

            select! {
                recv(event_rx) -> msg => match msg {
                    Ok(event) => {
                        let id = event.message_id();
                        if let Err(e) = self.handle_event(event, Instant::now()) {
                            log::warn!("Dropped stream event for message {id}: {e}");
                        }
                    }
                    Err(_) => {
                        log::debug!("Stream event channel closed");
                        events_open = false;
                    }
                },
                recv(command_rx) -> msg => match msg {
                    Ok(command) => {
                        if !self.handle_command(command, Instant::now()) {
                            break;
                        }
                    }
                    Err(_) => commands_open = false,
                },
                recv(ticker.receiver()) -> _ => self.tick(Instant::now()),
            }

            let now = Instant::now();
            on_frame(self, now);

            if !events_open && !commands_open && !self.chat.is_streaming() && self.next_deadline(now).is_none() {
                break;
            }
        }

        ticker.join();
        log::info!("Session loop finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{PreviewDocument, PreviewStatus};
    use crossbeam_channel::unbounded;

    #[derive(Debug, Default)]
    struct Recording {
        loaded: Vec<PreviewDocument>,
    }

    impl PreviewSurface for Recording {
        fn load(&mut self, document: &PreviewDocument) -> Result<(), SurfaceError> {
            self.loaded.push(document.clone());
            Ok(())
        }
    }

    fn coordinator() -> Coordinator<Recording> {
        Coordinator::new(Recording::default(), CoordinatorConfig::default())
    }

    fn delta(id: MessageId, text: &str) -> StreamEvent {
        StreamEvent::Delta {
            message_id: id,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_stream_opens_preview_and_settles() {
        let mut c = coordinator();
        let t0 = Instant::now();
        let id = c.chat_mut().begin_assistant(t0);

        c.handle_event(delta(id, "Page:\n```html\n<h1>Hi"), t0).ok();
        assert!(c.session().is_open());
        assert!(c.session().is_streaming());

        c.tick(t0 + Duration::from_millis(300));
        assert_eq!(c.host().load_count(), 1);

        c.handle_event(delta(id, "</h1>\n```"), t0 + Duration::from_millis(350)).ok();
        c.handle_event(StreamEvent::Done { message_id: id }, t0 + Duration::from_millis(400))
            .ok();
        assert!(!c.session().is_streaming());
        assert_eq!(c.host().status(), &PreviewStatus::Rendering);

        c.tick(t0 + Duration::from_millis(900));
        assert_eq!(c.host().load_count(), 2);
        assert_eq!(c.host().status(), &PreviewStatus::Ready);
        let last = c.host().surface().loaded.last().map(|d| d.html.clone());
        assert!(last.is_some_and(|html| html.contains("<h1>Hi</h1>")));
        assert_eq!(c.next_deadline(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_escape_and_toggle() {
        let mut c = coordinator();
        let now = Instant::now();
        assert!(c.handle_command(Command::TogglePreview, now));
        assert!(!c.session().is_open());

        let id = c.chat_mut().begin_assistant(now);
        c.handle_event(delta(id, "```css\np {"), now).ok();
        assert!(c.session().is_open());

        c.handle_command(Command::DismissPreview, now);
        assert!(!c.session().is_open());
        c.handle_event(delta(id, " margin: 0; }"), now).ok();
        assert!(!c.session().is_open());

        c.handle_command(Command::TogglePreview, now);
        assert!(c.session().is_open());
    }

    #[test]
    fn test_tabs_and_view_mode() {
        let mut c = coordinator();
        let now = Instant::now();
        let id = c.chat_mut().begin_assistant(now);
        c.handle_event(delta(id, "```html\n<p/>\n```\n```js\nlet a;\n```"), now).ok();
        c.handle_event(StreamEvent::Done { message_id: id }, now).ok();

        c.handle_command(Command::NextTab, now);
        assert_eq!(c.session().active_index(), 1);
        c.handle_command(Command::NextTab, now);
        assert_eq!(c.session().active_index(), 0);

        c.handle_command(Command::ToggleViewMode, now);
        assert!(c.shows_code());
    }

    #[test]
    fn test_show_preview_mid_stream_keeps_rebuilding() {
        let mut c = coordinator();
        let t0 = Instant::now();
        let id = c.chat_mut().begin_assistant(t0);

        c.handle_event(delta(id, "```html\n<p>one</p>\n```\n```html\n<p>two"), t0).ok();
        c.tick(t0 + Duration::from_millis(300));
        assert_eq!(c.host().load_count(), 1);

        c.handle_command(Command::ShowPreview(id), t0 + Duration::from_millis(310));
        assert!(c.session().is_streaming());
        c.handle_command(Command::SelectTab(1), t0 + Duration::from_millis(320));

        for i in 0..30u64 {
            let at = t0 + Duration::from_millis(400 + i * 100);
            c.handle_event(delta(id, "x"), at).ok();
            c.tick(at);
        }

        assert!(c.host().load_count() >= 5);
        assert_eq!(c.host().header_status(c.session()), Some("Generating..."));
        assert_ne!(c.host().status(), &PreviewStatus::Rendering);
        let last = c.host().surface().loaded.last().map(|d| d.html.clone());
        assert!(last.is_some_and(|html| html.contains("<p>twoxxxx")));
    }

    #[test]
    fn test_export_commands() {
        let dir = std::env::temp_dir().join(format!("livefence-coordinator-{}", std::process::id()));
        let mut c = Coordinator::new(
            Recording::default(),
            CoordinatorConfig {
                export_dir: dir.clone(),
                ..CoordinatorConfig::default()
            },
        );
        let now = Instant::now();
        c.handle_command(Command::ExportPreview, now);
        assert_eq!(c.last_export(), None);

        let id = c.chat_mut().begin_assistant(now);
        c.handle_event(delta(id, "```css styles.css\np { color: red; }\n```"), now).ok();
        c.handle_event(StreamEvent::Done { message_id: id }, now).ok();

        c.handle_command(Command::ExportPreview, now);
        assert_eq!(c.last_export(), Some(dir.join("styles.css").as_path()));
        c.handle_command(Command::OpenStandalone, now);
        assert_eq!(c.last_export(), Some(dir.join("styles.standalone.html").as_path()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_quit_command() {
        let mut c = coordinator();
        assert!(!c.handle_command(Command::Quit, Instant::now()));
    }

    #[test]
    fn test_run_drains_events_and_finishes() {
        let mut c = Coordinator::new(
            Recording::default(),
            CoordinatorConfig {
                tick_interval: Duration::from_millis(5),
                preview: PreviewConfig {
                    debounce: Duration::from_millis(10),
                    render_delay: Duration::from_millis(20),
                },
                ..CoordinatorConfig::default()
            },
        );
        let id = c.chat_mut().begin_assistant(Instant::now());

        let (event_tx, event_rx) = unbounded();
        let (command_tx, command_rx) = unbounded::<Command>();
        for event in StreamEvent::deltas(id, "```jsx\nfunction App() { return <p/>; }\n```", 7) {
            event_tx.send(event).ok();
        }
        event_tx.send(StreamEvent::Done { message_id: id }).ok();
        drop(event_tx);
        drop(command_tx);

        let mut frames = 0;
        c.run(&event_rx, &command_rx, |_, _| frames += 1).ok();

        assert!(frames > 0);
        assert!(!c.chat().is_streaming());
        assert_eq!(c.host().status(), &PreviewStatus::Ready);
        assert!(c.host().load_count() >= 1);
    }
}
