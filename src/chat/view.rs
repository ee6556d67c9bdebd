//! Chat view: owns a transcript and applies stream events to it.
//!
//! Each view keeps its own messages, per-message stream state and preview
//! sink, so two views never observe each other's triggers.
//!
//! ```text
//! StreamEvent ──► Message (append) ──► render_message ──► MessageView
//!                      │
//!                      └──► previewable blocks ──► LivePreviewTrigger ──► PreviewSink
//! ```

use super::events::{StreamEvent, FAILURE_PREFIX};
use super::message::{Attachment, Feedback, Message, MessageId, Role};
use crate::clipboard::Clipboard;
use crate::error::ChatError;
use crate::fence::{extract_blocks, finalize_blocks, previewable_blocks, CodeBlock};
use crate::preview::{LivePreviewTrigger, PreviewSink, TriggerOutcome};
use crate::render::{paint_rows, render_message, Canvas, MessageView, Rect, RenderConfig, Row};
use std::time::{Duration, Instant};

/// Streaming lifecycle state of one assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamState {
    trigger: LivePreviewTrigger,
    started: Instant,
}

impl StreamState {
    fn new(now: Instant) -> Self {
        Self {
            trigger: LivePreviewTrigger::new(),
            started: now,
        }
    }

    /// The message's preview trigger.
    pub const fn trigger(&self) -> &LivePreviewTrigger {
        &self.trigger
    }

    /// When the current lifecycle started.
    pub const fn started(&self) -> Instant {
        self.started
    }
}

#[derive(Debug)]
struct Entry {
    message: Message,
    view: MessageView,
    stream: Option<StreamState>,
}

impl Entry {
    fn new(message: Message, stream: Option<StreamState>, config: &RenderConfig) -> Self {
        let rendered = render_message(&message, config, Duration::ZERO);
        Self {
            view: MessageView::new(rendered, config),
            message,
            stream,
        }
    }

    fn rerender(&mut self, config: &RenderConfig, now: Instant) {
        let elapsed = self
            .stream
            .map_or(Duration::ZERO, |s| now.saturating_duration_since(s.started));
        self.view.update(render_message(&self.message, config, elapsed));
    }

    /// Previewable blocks, finalized once the stream is over.
    fn preview_blocks(&self) -> Vec<CodeBlock> {
        let mut blocks = extract_blocks(&self.message.content);
        if !self.message.is_typing {
            finalize_blocks(&mut blocks);
        }
        previewable_blocks(&blocks)
    }

    fn streaming_assistant(&mut self) -> Result<&mut Self, ChatError> {
        if self.message.role != Role::Assistant {
            return Err(ChatError::NotAssistant(self.message.id));
        }
        if !self.message.is_typing {
            return Err(ChatError::NotStreaming(self.message.id));
        }
        Ok(self)
    }

    fn finish(&mut self, sink: &mut dyn PreviewSink, config: &RenderConfig, now: Instant) -> TriggerOutcome {
        self.message.is_typing = false;
        self.rerender(config, now);
        let blocks = self.preview_blocks();
        match self.stream.as_mut() {
            Some(stream) => stream.trigger.finish(&blocks, sink),
            None => TriggerOutcome::Skipped,
        }
    }
}

fn find_mut(entries: &mut [Entry], id: MessageId) -> Result<&mut Entry, ChatError> {
    entries
        .iter_mut()
        .find(|e| e.message.id == id)
        .ok_or(ChatError::UnknownMessage(id))
}

/// A transcript with live preview.
#[derive(Debug)]
pub struct ChatView<S> {
    entries: Vec<Entry>,
    config: RenderConfig,
    sink: S,
    next_id: u64,
}

impl<S: PreviewSink> ChatView<S> {
    /// Create an empty view pushing previews into `sink`.
    pub const fn new(sink: S, config: RenderConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
            sink,
            next_id: 1,
        }
    }

    /// Rendering configuration.
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The preview sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The preview sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Messages in transcript order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    /// Message by id.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.entries.iter().find(|e| e.message.id == id).map(|e| &e.message)
    }

    /// Interactive view of a message.
    pub fn view(&self, id: MessageId) -> Option<&MessageView> {
        self.entries.iter().find(|e| e.message.id == id).map(|e| &e.view)
    }

    /// Stream state of an assistant message.
    pub fn stream_state(&self, id: MessageId) -> Option<&StreamState> {
        self.entries
            .iter()
            .find(|e| e.message.id == id)
            .and_then(|e| e.stream.as_ref())
    }

    /// Whether any message is still streaming.
    pub fn is_streaming(&self) -> bool {
        self.entries.iter().any(|e| e.message.is_typing)
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>, attachments: Vec<Attachment>) -> MessageId {
        let id = self.allocate_id();
        let message = Message::user(id, content, attachments);
        self.entries.push(Entry::new(message, None, &self.config));
        id
    }

    /// Append an empty assistant message and start its stream.
    pub fn begin_assistant(&mut self, now: Instant) -> MessageId {
        let id = self.allocate_id();
        self.start(id, now);
        id
    }

    fn start(&mut self, id: MessageId, now: Instant) {
        log::info!("Stream started for message {id}");
        self.next_id = self.next_id.max(id.0 + 1);
        self.entries.push(Entry::new(
            Message::assistant(id),
            Some(StreamState::new(now)),
            &self.config,
        ));
    }

    /// Apply one stream event.
    pub fn apply(&mut self, event: StreamEvent, now: Instant) -> Result<TriggerOutcome, ChatError> {
        match event {
            StreamEvent::Started { message_id } => {
                let Some(index) = self.entries.iter().position(|e| e.message.id == message_id) else {
                    self.start(message_id, now);
                    return Ok(TriggerOutcome::Skipped);
                };
                let entry = &mut self.entries[index];
                if entry.message.role != Role::Assistant {
                    return Err(ChatError::NotAssistant(message_id));
                }
                log::info!("Stream restarted for message {message_id}");
                entry.message.content.clear();
                entry.message.is_typing = true;
                entry.message.feedback = None;
                entry.stream = Some(StreamState::new(now));
                entry.rerender(&self.config, now);
                Ok(TriggerOutcome::Skipped)
            }
            StreamEvent::Delta { message_id, text } => {
                let entry = find_mut(&mut self.entries, message_id)?.streaming_assistant()?;
                entry.message.content.push_str(&text);
                entry.rerender(&self.config, now);
                let blocks = entry.preview_blocks();
                Ok(match entry.stream.as_mut() {
                    Some(stream) => stream.trigger.observe(&blocks, true, &mut self.sink),
                    None => TriggerOutcome::Skipped,
                })
            }
            StreamEvent::Regenerating { message_id } => {
                let entry = find_mut(&mut self.entries, message_id)?.streaming_assistant()?;
                log::info!("Regenerating message {message_id}");
                entry.message.content.clear();
                entry.stream = Some(StreamState::new(now));
                entry.rerender(&self.config, now);
                Ok(TriggerOutcome::Skipped)
            }
            StreamEvent::Done { message_id } => {
                let entry = find_mut(&mut self.entries, message_id)?.streaming_assistant()?;
                log::info!("Stream finished for message {message_id}");
                Ok(entry.finish(&mut self.sink, &self.config, now))
            }
            StreamEvent::Failed { message_id, message } => {
                let entry = find_mut(&mut self.entries, message_id)?.streaming_assistant()?;
                log::warn!("Stream failed for message {message_id}: {message}");
                entry.message.content = format!("{FAILURE_PREFIX}{message}");
                entry.message.is_typing = false;
                entry.rerender(&self.config, now);
                Ok(TriggerOutcome::Skipped)
            }
        }
    }

    /// Stop every message that is still typing. Returns how many were stopped.
    pub fn stop_generation(&mut self, now: Instant) -> usize {
        let mut stopped = 0;
        for entry in self.entries.iter_mut().filter(|e| e.message.is_typing) {
            log::info!("Generation stopped for message {}", entry.message.id);
            entry.finish(&mut self.sink, &self.config, now);
            stopped += 1;
        }
        stopped
    }

    /// Re-render messages whose display depends on time (thinking indicators).
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for entry in self.entries.iter_mut().filter(|e| e.message.is_thinking()) {
            let before = entry.view.rendered().clone();
            entry.rerender(&self.config, now);
            changed |= *entry.view.rendered() != before;
        }
        changed
    }

    /// Earliest time the display changes without new events.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        self.entries.iter().filter_map(|e| e.view.next_deadline(now)).min()
    }

    /// Open the preview with every previewable block of a message.
    ///
    /// Returns `false` when the message has nothing to preview.
    pub fn show_preview(&mut self, id: MessageId) -> Result<bool, ChatError> {
        let entry = find_mut(&mut self.entries, id)?;
        if entry.message.role != Role::Assistant {
            return Err(ChatError::NotAssistant(id));
        }
        let blocks = entry.preview_blocks();
        if blocks.is_empty() {
            return Ok(false);
        }
        let streaming = entry.message.is_typing;
        log::debug!("Preview shown for message {id} with {} block(s)", blocks.len());
        self.sink.show(&blocks, streaming);
        Ok(true)
    }

    /// Preview action of a single code card.
    pub fn preview_card(&mut self, id: MessageId, card: usize) -> Result<bool, ChatError> {
        let offered = find_mut(&mut self.entries, id)?
            .view
            .rendered()
            .code_cards()
            .any(|c| c.index == card && c.preview_action);
        if !offered {
            return Ok(false);
        }
        self.show_preview(id)
    }

    /// Close the preview. Live updates stay suppressed until the next message.
    pub fn dismiss_preview(&mut self) {
        for stream in self.entries.iter_mut().filter_map(|e| e.stream.as_mut()) {
            stream.trigger.dismiss();
        }
        self.sink.close();
    }

    /// Copy the body of a code card.
    pub fn copy_code(
        &mut self,
        id: MessageId,
        card: usize,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool, ChatError> {
        Ok(find_mut(&mut self.entries, id)?.view.copy_code(card, clipboard, now))
    }

    /// Copy a whole message, verbatim.
    pub fn copy_message(
        &mut self,
        id: MessageId,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool, ChatError> {
        let entry = find_mut(&mut self.entries, id)?;
        Ok(entry.view.copy_message(&entry.message.content, clipboard, now))
    }

    /// Scroll a settled code card.
    pub fn scroll_code(&mut self, id: MessageId, card: usize, delta: isize) -> Result<(), ChatError> {
        find_mut(&mut self.entries, id)?.view.scroll_code(card, delta);
        Ok(())
    }

    /// Toggle the rating of an assistant message.
    pub fn toggle_feedback(
        &mut self,
        id: MessageId,
        feedback: Feedback,
        now: Instant,
    ) -> Result<Option<Feedback>, ChatError> {
        let entry = find_mut(&mut self.entries, id)?;
        if entry.message.role != Role::Assistant {
            return Err(ChatError::NotAssistant(id));
        }
        let rating = entry.message.toggle_feedback(feedback);
        entry.rerender(&self.config, now);
        Ok(rating)
    }

    /// Lay out the whole transcript.
    pub fn rows(&self, width: u16, now: Instant) -> Vec<Row> {
        let mut rows = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                rows.push(Row::default());
            }
            rows.extend(entry.view.rows(width, &self.config, now));
        }
        rows
    }

    /// Paint the tail of the transcript into `area`.
    pub fn paint(&self, canvas: &mut Canvas, area: Rect, now: Instant) -> u16 {
        let rows = self.rows(area.width, now);
        let skip = rows.len().saturating_sub(usize::from(area.height));
        paint_rows(canvas, area, &rows[skip..])
    }
}
