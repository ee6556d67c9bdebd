//! Input actor: polls terminal events on its own thread and sends commands.
//!
//! # Key bindings
//!
//! | Key           | Command          |
//! |---------------|------------------|
//! | Esc           | close preview    |
//! | Ctrl+P        | toggle preview   |
//! | Tab           | next preview tab |
//! | 1-9           | select tab       |
//! | Ctrl+R        | refresh preview  |
//! | Ctrl+E        | preview / code   |
//! | Ctrl+D        | save block       |
//! | Ctrl+O        | standalone page  |
//! | Ctrl+S        | stop generation  |
//! | Ctrl+C, q     | quit             |

use crate::session::Command;
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Map a key press to a command.
pub fn key_command(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    Some(match key.code {
        KeyCode::Esc => Command::DismissPreview,
        KeyCode::Tab => Command::NextTab,
        KeyCode::Char('p') if control => Command::TogglePreview,
        KeyCode::Char('r') if control => Command::RefreshPreview,
        KeyCode::Char('e') if control => Command::ToggleViewMode,
        KeyCode::Char('d') if control => Command::ExportPreview,
        KeyCode::Char('o') if control => Command::OpenStandalone,
        KeyCode::Char('s') if control => Command::StopGeneration,
        KeyCode::Char('c') if control => Command::Quit,
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char(c @ '1'..='9') => Command::SelectTab(c as usize - '1' as usize),
        _ => return None,
    })
}

/// Thread that turns terminal key presses into [`Command`]s.
#[derive(Debug)]
pub struct InputActor {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input thread. `poll_timeout` bounds how long a shutdown takes.
    pub fn spawn(sender: Sender<Command>, poll_timeout: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("livefence-input".to_string())
            .spawn(move || Self::run_loop(&sender, &shutdown_clone, poll_timeout))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the input thread and wait for it.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<Command>, shutdown: &AtomicBool, poll_timeout: Duration) {
        while !shutdown.load(Ordering::Relaxed) {
            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if let Some(command) = key_command(key) {
                            if sender.send(command).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Failed to read terminal event: {e}"),
                },
                Ok(false) => {}
                Err(e) => {
                    log::warn!("Terminal event polling failed: {e}");
                    break;
                }
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
