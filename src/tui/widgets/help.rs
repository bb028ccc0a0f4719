//! Help overlay widget for the TUI.
//!
//! Displays keyboard shortcuts and usage notes.

use crate::filter::DATA_RANGE_NOTE;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Help overlay widget showing keyboard shortcuts.
pub struct HelpOverlay;

impl HelpOverlay {
    /// Creates a new help overlay widget.
    pub fn new() -> Self {
        Self
    }

    /// Calculates the centered area for the help overlay.
    pub fn area(parent: Rect) -> Rect {
        let width = 64.min(parent.width.saturating_sub(4));
        let height = 30.min(parent.height.saturating_sub(4));
        let x = parent.x + (parent.width.saturating_sub(width)) / 2;
        let y = parent.y + (parent.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }

    /// Returns the help content as lines.
    fn content() -> Vec<Line<'static>> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(Color::White);
        let section_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let note_style = Style::default().fg(Color::Gray);

        vec![
            Line::from(Span::styled("Query Catalog", section_style)),
            Self::shortcut_line("↑/↓", "Move through categories and queries", key_style, desc_style),
            Self::shortcut_line("Enter/Space", "Expand category or run query", key_style, desc_style),
            Self::shortcut_line("←/→", "Collapse/expand category", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("Filters", section_style)),
            Self::shortcut_line("↑/↓", "Choose a filter field", key_style, desc_style),
            Self::shortcut_line("←/→", "Decrease/increase value", key_style, desc_style),
            Self::shortcut_line("PgUp/PgDn", "Move the date by a month", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("Results and Filtered Results", section_style)),
            Self::shortcut_line("↑/↓", "Scroll rows", key_style, desc_style),
            Self::shortcut_line("PgUp/PgDn", "Scroll a page", key_style, desc_style),
            Self::shortcut_line("g/G", "Go to top/bottom", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("General", section_style)),
            Self::shortcut_line("Tab", "Cycle focus", key_style, desc_style),
            Self::shortcut_line("r", "Re-run all queries", key_style, desc_style),
            Self::shortcut_line("?", "Toggle this help", key_style, desc_style),
            Self::shortcut_line("q/Ctrl+C", "Quit", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("About the data", section_style)),
            Line::from(Span::styled(format!("  {DATA_RANGE_NOTE}"), note_style)),
            Line::from(Span::styled(
                "  Every change re-runs the overview, the selected query and the filters.",
                note_style,
            )),
            Line::from(Span::styled(
                "  Credentials come from the secrets file, config, NEO_DB_* or the keyring.",
                note_style,
            )),
        ]
    }

    /// Creates a line with a keyboard shortcut and description.
    fn shortcut_line(
        key: &'static str,
        desc: &'static str,
        key_style: Style,
        desc_style: Style,
    ) -> Line<'static> {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{key:14}"), key_style),
            Span::styled(desc, desc_style),
        ])
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (? to close) ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );

        Paragraph::new(Self::content())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
