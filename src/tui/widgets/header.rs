//! Header widget for the TUI.
//!
//! Displays the dashboard title and database connection info.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

pub const TITLE: &str = "NASA NEO Tracking & Insights Dashboard";

/// Header bar widget.
pub struct Header<'a> {
    connection_info: Option<&'a str>,
    /// Whether the last refresh reached the database.
    is_healthy: bool,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(connection_info: Option<&'a str>, is_healthy: bool) -> Self {
        Self {
            connection_info,
            is_healthy,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" {TITLE}");
        let left_span = Span::styled(left_text, style);
        buf.set_span(area.x, area.y, &left_span, area.width);

        if let Some(info) = self.connection_info {
            let status_dot = if self.is_healthy { "●" } else { "○" };
            let status_color = if self.is_healthy {
                Color::Green
            } else {
                Color::Red
            };
            let status_style = Style::default().bg(Color::Blue).fg(status_color);

            let db_text = format!(" [db: {info}] ");
            let right_width = (db_text.chars().count() + 2) as u16;
            // Only when it fits next to the title
            if right_width + TITLE.len() as u16 + 2 < area.width {
                let right_x = area.right().saturating_sub(right_width);
                buf.set_string(right_x, area.y, " ", style);
                buf.set_string(right_x + 1, area.y, status_dot, status_style);
                buf.set_string(right_x + 2, area.y, &db_text, style);
            }
        }
    }
}
