//! Result table widget for the TUI.
//!
//! Renders query results as formatted tables with column headers,
//! auto-sized columns, and styled NULL values. Rows scroll; the header stays.

use crate::db::{QueryResult, Value};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Lines taken by borders, header and footer.
const CHROME_LINES: usize = 5;

/// Widget for rendering a query result as a table.
pub struct ResultTable<'a> {
    result: &'a QueryResult,
    /// Index of the first data row shown.
    scroll: usize,
}

impl<'a> ResultTable<'a> {
    /// Creates a new result table widget.
    pub fn new(result: &'a QueryResult) -> Self {
        Self { result, scroll: 0 }
    }

    /// Starts the visible rows at `scroll`.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll.min(self.result.rows.len().saturating_sub(1));
        self
    }

    /// Calculates the optimal width for each column.
    fn calculate_column_widths(&self) -> Vec<usize> {
        if self.result.columns.is_empty() {
            return vec![];
        }

        let mut widths: Vec<usize> = self
            .result
            .columns
            .iter()
            .map(|col| col.name.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.result.rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.to_display_string().chars().count());
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    /// Renders the table to lines, showing at most `max_rows` data rows.
    pub fn render_to_lines(&self, available_width: usize, max_rows: usize) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        if self.result.columns.is_empty() {
            lines.push(Line::from(Span::styled(
                "(empty result)",
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        let widths = self.calculate_column_widths();

        // Borders and padding
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let adjusted_widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        lines.push(self.render_border(&adjusted_widths, '┌', '┬', '┐'));
        lines.push(self.render_header_row(&adjusted_widths));
        lines.push(self.render_border(&adjusted_widths, '├', '┼', '┤'));

        for row in self.result.rows.iter().skip(self.scroll).take(max_rows) {
            lines.push(self.render_data_row(row, &adjusted_widths));
        }

        lines.push(self.render_border(&adjusted_widths, '└', '┴', '┘'));
        lines.push(Line::from(Span::styled(
            self.footer(max_rows),
            Style::default().fg(Color::DarkGray),
        )));

        lines
    }

    fn footer(&self, max_rows: usize) -> String {
        let total = self.result.row_count;
        let mut footer = format!(
            "{} row{} returned ({}ms)",
            total,
            if total == 1 { "" } else { "s" },
            self.result.execution_time.as_millis()
        );

        let last = (self.scroll + max_rows).min(total);
        if self.scroll > 0 || last < total {
            footer.push_str(&format!(" | rows {}-{}", self.scroll + 1, last));
        }
        if let Some(warning) = self.result.truncation_warning() {
            footer.push_str(" | ");
            footer.push_str(&warning);
        }
        footer
    }

    /// Renders a horizontal border line.
    fn render_border(&self, widths: &[usize], left: char, mid: char, right: char) -> Line<'a> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    /// Renders the header row with column names.
    fn render_header_row(&self, widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (i, col) in self.result.columns.iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(MIN_COLUMN_WIDTH);
            let name = Self::truncate(&col.name, width);
            let padded = format!(" {name:width$} ");

            spans.push(Span::styled(
                padded,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    /// Renders a data row.
    fn render_data_row(&self, row: &[Value], widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (i, value) in row.iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(MIN_COLUMN_WIDTH);
            let truncated = Self::truncate(&value.to_display_string(), width);
            let padded = format!(" {truncated:width$} ");

            let style = if value.is_null() {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };

            spans.push(Span::styled(padded, style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }
}

impl Widget for ResultTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max_rows = (area.height as usize).saturating_sub(CHROME_LINES);
        let lines = self.render_to_lines(area.width as usize, max_rows);

        for (i, line) in lines.iter().take(area.height as usize).enumerate() {
            buf.set_line(area.x, area.y + i as u16, line, area.width);
        }
    }
}
