// ABOUTME: Terminal setup and event stream handling.
// ABOUTME: Manages crossterm and ratatui terminal lifecycle.

pub mod event;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::error::{AppError, Result};
use event::EventStream;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Frame rate of the animation tick (typing dots, streaming cursor)
const TICK_RATE: Duration = Duration::from_millis(120);

/// Owns the terminal in raw mode on the alternate screen; restores it on drop.
pub struct Tui {
    terminal: Terminal,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self { terminal })
    }

    fn setup_terminal() -> Result<Terminal> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("raw mode: {}", e)))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    pub fn event_stream(&self) -> EventStream {
        EventStream::new(TICK_RATE)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
