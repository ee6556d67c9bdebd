//! Terminal backend: raw mode guard, diffed output and key input.

mod input;
mod output;

pub use input::{key_command, InputActor};
pub use output::{FrameStats, Screen};

use crate::render::Canvas;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout};

/// Raw-mode, alternate-screen terminal. Restored on drop.
#[derive(Debug)]
pub struct Terminal {
    stdout: Stdout,
    screen: Screen,
}

impl Terminal {
    /// Enter raw mode and the alternate screen.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self {
            stdout,
            screen: Screen::new(),
        })
    }

    /// Current terminal size in columns and rows.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Draw a frame, writing only what changed since the last one.
    pub fn draw(&mut self, canvas: &Canvas) -> io::Result<FrameStats> {
        self.screen.draw(canvas, &mut self.stdout)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
