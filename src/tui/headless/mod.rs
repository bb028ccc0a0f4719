//! Headless mode for scripted testing and automation.
//!
//! Runs the dashboard against an in-memory terminal, executing scripted
//! events and capturing the screen for verification. Every event that changes
//! the dashboard state triggers a full re-render, exactly like the TUI.

mod events;
mod output;

pub use events::{Assertion, Event, EventParser};
pub use output::{HeadlessOutput, OutputFormat, ScreenRenderer};

use crate::chart::Chart;
use crate::cli::Cli;
use crate::dashboard::{Dashboard, DashboardState, Panel};
use crate::error::{Result, TrackerError};
use crate::filter::format_date;
use crate::tui::app::App;
use crate::tui::ui;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Screen width in columns.
    pub width: u16,
    /// Screen height in rows.
    pub height: u16,
    pub output_format: OutputFormat,
    /// Whether to stop on first assertion failure.
    pub fail_fast: bool,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 48,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        }
    }
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size()?;

        Ok(Self {
            width,
            height,
            output_format: cli.parse_output_format()?,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    /// Number of events executed.
    pub events_executed: usize,
    /// Total execution duration.
    pub duration: Duration,
    pub assertions_passed: usize,
    /// Failed assertions, in DSL form.
    pub failures: Vec<String>,
    /// Application state snapshot.
    pub state: HeadlessState,
}

/// Snapshot of application state, queryable with `assert:state:`.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessState {
    pub focus: String,
    pub selected: String,
    pub running: bool,
    pub show_help: bool,
    pub sidebar_cursor: usize,
    pub filter_field: String,
    pub hazard: String,
    pub date: String,
    /// `table`, `empty`, `failed` or `pending`.
    pub query_status: String,
    /// `bar`, `histogram` or `none`.
    pub chart: String,
    pub row_count: usize,
    pub filter_row_count: usize,
    pub total_asteroids: i64,
}

impl HeadlessState {
    fn from_app(app: &App) -> Self {
        let view = app.view.as_ref();
        let query_status = match view.map(|v| &v.query_panel) {
            Some(Panel::Table { .. }) => "table",
            Some(Panel::Empty) => "empty",
            Some(Panel::Failed { .. }) => "failed",
            None => "pending",
        };
        let chart = match view.and_then(|v| v.query_panel.chart()) {
            Some(Chart::Bar(_)) => "bar",
            Some(Chart::Histogram(_)) => "histogram",
            None => "none",
        };

        Self {
            focus: format!("{:?}", app.focus),
            selected: view.map_or_else(|| app.state.selected.clone(), |v| v.selected.clone()),
            running: app.running,
            show_help: app.show_help,
            sidebar_cursor: app.sidebar_cursor,
            filter_field: format!("{:?}", app.filter_field),
            hazard: app.state.filter.hazard.to_string(),
            date: format_date(app.state.filter.date),
            query_status: query_status.to_string(),
            chart: chart.to_string(),
            row_count: view.map_or(0, |v| v.query_panel.row_count()),
            filter_row_count: view.map_or(0, |v| v.filter_panel.row_count()),
            total_asteroids: view.map_or(0, |v| v.overview.total_asteroids),
        }
    }

    fn get(&self, field: &str) -> Option<String> {
        let value = match field {
            "focus" => self.focus.clone(),
            "selected" => self.selected.clone(),
            "running" => self.running.to_string(),
            "show_help" => self.show_help.to_string(),
            "sidebar_cursor" => self.sidebar_cursor.to_string(),
            "filter_field" => self.filter_field.clone(),
            "hazard" => self.hazard.clone(),
            "date" => self.date.clone(),
            "query_status" => self.query_status.clone(),
            "chart" => self.chart.clone(),
            "row_count" => self.row_count.to_string(),
            "filter_row_count" => self.filter_row_count.to_string(),
            "total_asteroids" => self.total_asteroids.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Looks up a state field by name for assertions.
fn state_field(app: &App, field: &str) -> Option<String> {
    HeadlessState::from_app(app).get(field)
}

/// Runs the dashboard in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    dashboard: Dashboard,
    events: Vec<Event>,
}

impl HeadlessRunner {
    /// Creates a new headless runner with the given configuration.
    pub fn new(config: HeadlessConfig, dashboard: Dashboard, app: App) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend).map_err(|e| {
            TrackerError::internal(format!("Failed to create test terminal: {e}"))
        })?;

        Ok(Self {
            config,
            terminal,
            app,
            dashboard,
            events: Vec::new(),
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = EventParser::new().parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin for "-".
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            std::io::read_to_string(std::io::stdin())
                .map_err(|e| TrackerError::internal(format!("Failed to read stdin: {e}")))?
        } else {
            std::fs::read_to_string(path).map_err(|e| {
                TrackerError::config(format!("Failed to read script file '{path}': {e}"))
            })?
        };

        self.load_events(&content)
    }

    /// Runs the events and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        let start_time = Instant::now();
        let mut events_executed = 0;
        let mut assertions_passed = 0;
        let mut failures = Vec::new();

        self.refresh().await;
        self.draw()?;

        let events = std::mem::take(&mut self.events);
        for event in events {
            debug!("Headless event: {}", event);

            match &event {
                Event::Key(key) => self.app.handle_event(crate::tui::Event::Key(*key)),
                Event::Select(name) => {
                    if !self.app.select_query(name) {
                        warn!("Unknown query in select event: '{}'", name);
                    }
                }
                Event::Wait(duration) => tokio::time::sleep(*duration).await,
                Event::Resize(w, h) => {
                    self.terminal
                        .resize(Rect::new(0, 0, *w, *h))
                        .map_err(|e| TrackerError::internal(format!("Resize failed: {e}")))?;
                }
                Event::Assert(assertion) => {
                    let screen = self.screen();
                    if assertion.check(&screen, &self.app) {
                        assertions_passed += 1;
                    } else {
                        failures.push(event.to_string());
                        if self.config.fail_fast {
                            events_executed += 1;
                            break;
                        }
                    }
                }
            }

            events_executed += 1;

            self.refresh().await;
            self.draw()?;

            if !self.app.running {
                break;
            }
        }

        Ok(HeadlessResult {
            screen: self.screen(),
            events_executed,
            duration: start_time.elapsed(),
            assertions_passed,
            failures,
            state: HeadlessState::from_app(&self.app),
        })
    }

    /// Re-renders the dashboard view if the state changed.
    async fn refresh(&mut self) {
        if self.app.needs_refresh {
            let view = self.dashboard.render(&self.app.state).await;
            self.app.set_view(view);
        }
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| TrackerError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn screen(&self) -> String {
        ScreenRenderer::render(self.terminal.backend().buffer())
    }
}

/// Runs headless mode from CLI arguments.
///
/// Returns the process exit code: 1 when any assertion failed.
pub async fn run_headless(
    cli: &Cli,
    dashboard: Dashboard,
    state: DashboardState,
    connection_info: Option<String>,
) -> Result<i32> {
    cli.validate_headless()?;

    let config = HeadlessConfig::from_cli(cli)?;
    let app = App::new(state, connection_info);
    let mut runner = HeadlessRunner::new(config.clone(), dashboard, app)?;

    if let Some(ref events) = cli.events {
        runner.load_events(events)?;
    } else if let Some(ref script_path) = cli.script {
        runner.load_script(script_path)?;
    }

    let result = runner.run().await?;
    let output = HeadlessOutput::new(config.output_format).format(&result);

    if let Some(ref path) = config.output_file {
        std::fs::write(path, &output).map_err(|e| {
            TrackerError::internal(format!("Failed to write output file: {e}"))
        })?;
    } else {
        print!("{output}");
    }

    Ok(if result.failures.is_empty() { 0 } else { 1 })
}
