//! Overview metric cards.

use crate::dashboard::Overview;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Row of four headline numbers.
pub struct Metrics<'a> {
    overview: Option<&'a Overview>,
}

impl<'a> Metrics<'a> {
    /// `None` renders placeholders until the first refresh lands.
    pub fn new(overview: Option<&'a Overview>) -> Self {
        Self { overview }
    }

    fn cards(&self) -> [(&'static str, String); 4] {
        match self.overview {
            Some(o) => [
                ("Total Objects Tracked", group_thousands(o.total_asteroids)),
                ("Close Approaches Recorded", group_thousands(o.total_approaches)),
                ("Potentially Hazardous", group_thousands(o.hazardous)),
                ("Hazard Rate", o.hazard_rate_display()),
            ],
            None => [
                ("Total Objects Tracked", "…".to_string()),
                ("Close Approaches Recorded", "…".to_string()),
                ("Potentially Hazardous", "…".to_string()),
                ("Hazard Rate", "…".to_string()),
            ],
        }
    }
}

impl Widget for Metrics<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        let failed = self.overview.is_some_and(|o| o.error.is_some());
        let border_style = if failed {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        for ((label, value), column) in self.cards().into_iter().zip(columns.iter()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {label} "));
            Paragraph::new(Line::from(Span::styled(
                value,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(block)
            .render(*column, buf);
        }
    }
}

/// Formats a count with comma separators, e.g. `12,345`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
