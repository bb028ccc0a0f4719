//! Filter form widget.
//!
//! One line per field, label on the left and value on the right. The focused
//! field is highlighted when the form has focus.

use crate::filter::{FilterField, FilterState, DATA_RANGE_NOTE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const LABEL_WIDTH: usize = 34;

pub struct FilterForm<'a> {
    state: &'a FilterState,
    cursor: FilterField,
    focused: bool,
}

impl<'a> FilterForm<'a> {
    pub fn new(state: &'a FilterState, cursor: FilterField, focused: bool) -> Self {
        Self {
            state,
            cursor,
            focused,
        }
    }

    fn field_line(&self, field: FilterField) -> Line<'static> {
        let active = self.focused && field == self.cursor;
        let label_style = if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value_style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let arrows = if active { ("◂ ", " ▸") } else { ("  ", "  ") };
        Line::from(vec![
            Span::styled(format!("{:width$}", field.label(), width = LABEL_WIDTH), label_style),
            Span::raw(arrows.0),
            Span::styled(self.state.display_value(field), value_style),
            Span::raw(arrows.1),
        ])
    }
}

impl Widget for FilterForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Advanced Asteroid Approach Filters ");

        let mut lines: Vec<Line> = FilterField::ALL
            .iter()
            .map(|field| self.field_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            DATA_RANGE_NOTE,
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
