//! Output formatting for headless mode.
//!
//! Provides plain text and JSON output.

use super::{HeadlessResult, HeadlessState};
use crate::error::TrackerError;
use ratatui::buffer::Buffer;
use serde::Serialize;
use std::str::FromStr;

/// Renders a ratatui buffer to a string.
pub struct ScreenRenderer;

impl ScreenRenderer {
    /// Renders a buffer to plain text, trimming trailing blanks.
    pub fn render(buffer: &Buffer) -> String {
        let area = buffer.area;
        if area.height == 0 {
            return String::new();
        }

        let mut lines: Vec<String> = (0..area.height)
            .map(|y| {
                let line: String = (area.left()..area.right())
                    .filter_map(|x| buffer.cell((x, area.top() + y)))
                    .map(|cell| cell.symbol())
                    .collect();
                line.trim_end_matches(' ').to_string()
            })
            .collect();

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        format!("{}\n", lines.join("\n"))
    }
}

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    screen: &'a str,
    screen_lines: Vec<&'a str>,
    events_executed: usize,
    duration_ms: u64,
    assertions: AssertionSummary<'a>,
    state: &'a HeadlessState,
}

#[derive(Debug, Serialize)]
struct AssertionSummary<'a> {
    passed: usize,
    failed: usize,
    failures: &'a [String],
}

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Final screen followed by a summary line.
    #[default]
    Text,
    /// Screen, state and assertion summary as JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(TrackerError::config(format!(
                "Invalid output format: {s}. Expected: text or json"
            ))),
        }
    }
}

/// Formats headless execution results.
pub struct HeadlessOutput {
    format: OutputFormat,
}

impl HeadlessOutput {
    /// Creates a new output formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result according to the configured format.
    pub fn format(&self, result: &HeadlessResult) -> String {
        match self.format {
            OutputFormat::Text => Self::format_text(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    fn format_text(result: &HeadlessResult) -> String {
        let mut out = format!(
            "{}\nEvents: {} executed in {}ms",
            result.screen,
            result.events_executed,
            result.duration.as_millis()
        );

        if result.assertions_passed > 0 || !result.failures.is_empty() {
            out.push_str(&format!(
                " | Assertions: {} passed, {} failed",
                result.assertions_passed,
                result.failures.len()
            ));
        }
        out.push('\n');

        for failure in &result.failures {
            out.push_str(&format!("FAILED: {failure}\n"));
        }
        out
    }

    fn format_json(result: &HeadlessResult) -> String {
        let json_output = JsonOutput {
            screen: &result.screen,
            screen_lines: result.screen.lines().collect(),
            events_executed: result.events_executed,
            duration_ms: result.duration.as_millis() as u64,
            assertions: AssertionSummary {
                passed: result.assertions_passed,
                failed: result.failures.len(),
                failures: &result.failures,
            },
            state: &result.state,
        };

        serde_json::to_string_pretty(&json_output)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use std::time::Duration;

    fn make_test_result() -> HeadlessResult {
        HeadlessResult {
            screen: "NASA NEO\nLine 2\n".to_string(),
            events_executed: 3,
            duration: Duration::from_millis(150),
            assertions_passed: 2,
            failures: vec!["assert:contains:Apophis".to_string()],
            state: HeadlessState {
                focus: "Sidebar".to_string(),
                selected: "1. Count asteroid approaches".to_string(),
                running: true,
                show_help: false,
                sidebar_cursor: 1,
                filter_field: "Date".to_string(),
                hazard: "Both".to_string(),
                date: "2024-01-01".to_string(),
                query_status: "table".to_string(),
                chart: "bar".to_string(),
                row_count: 4,
                filter_row_count: 0,
                total_asteroids: 3,
            },
        }
    }

    #[test]
    fn test_screen_renderer_trims() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 10, 3));
        buffer.set_string(0, 0, "NEO", ratatui::style::Style::default());
        assert_eq!(ScreenRenderer::render(&buffer), "NEO\n");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("frames".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_output() {
        let text = HeadlessOutput::new(OutputFormat::Text).format(&make_test_result());

        assert!(text.contains("NASA NEO"));
        assert!(text.contains("Events: 3 executed"));
        assert!(text.contains("Assertions: 2 passed, 1 failed"));
        assert!(text.contains("FAILED: assert:contains:Apophis"));
    }

    #[test]
    fn test_json_output() {
        let json = HeadlessOutput::new(OutputFormat::Json).format(&make_test_result());
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["events_executed"], 3);
        assert_eq!(parsed["state"]["selected"], "1. Count asteroid approaches");
        assert_eq!(parsed["state"]["chart"], "bar");
        assert_eq!(parsed["assertions"]["failed"], 1);
        assert_eq!(parsed["screen_lines"][0], "NASA NEO");
    }
}
