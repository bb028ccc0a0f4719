//! Event handling for the TUI.
//!
//! Processes keyboard and terminal events using crossterm.

use crate::error::{Result, TrackerError};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}

/// Handles terminal events.
pub struct EventHandler {
    /// Timeout for polling events.
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Polls for the next event, blocking for at most the tick rate.
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)
            .map_err(|e| TrackerError::internal(format!("Failed to poll events: {e}")))?
        {
            return Ok(Event::Tick);
        }

        let event = event::read()
            .map_err(|e| TrackerError::internal(format!("Failed to read event: {e}")))?;

        Ok(match event {
            // Windows reports releases too
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
            _ => Event::Tick,
        })
    }
}
