//! Terminal User Interface for the NEO dashboard.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::dashboard::{Dashboard, DashboardState};
use crate::error::{Result, TrackerError};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::{debug, info};

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self { terminal })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| TrackerError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            TrackerError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| TrackerError::internal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| TrackerError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| {
            TrackerError::internal(format!("Failed to leave alternate screen: {e}"))
        })?;

        self.terminal
            .show_cursor()
            .map_err(|e| TrackerError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the user quits.
    ///
    /// The whole view is re-rendered from [`DashboardState`] whenever an
    /// interaction changes it.
    pub async fn run(&mut self, dashboard: &Dashboard, app: &mut App) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let result = self.event_loop(dashboard, app).await;

        let _ = panic::take_hook();
        result
    }

    async fn event_loop(&mut self, dashboard: &Dashboard, app: &mut App) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| TrackerError::internal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            if app.needs_refresh {
                debug!("Refreshing dashboard for '{}'", app.state.selected);
                let view = dashboard.render(&app.state).await;
                app.set_view(view);
                continue;
            }

            let event = tokio::task::spawn_blocking(|| EventHandler::new().next())
                .await
                .map_err(|e| TrackerError::internal(format!("Event task failed: {e}")))??;
            app.handle_event(event);
        }

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the interactive dashboard.
pub async fn run(
    dashboard: &Dashboard,
    state: DashboardState,
    connection_info: Option<String>,
) -> Result<()> {
    info!("Starting dashboard with '{}'", state.selected);
    let mut app = App::new(state, connection_info);
    let mut tui = Tui::new()?;
    tui.run(dashboard, &mut app).await
}
