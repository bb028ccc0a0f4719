//! Sidebar widget for the TUI.
//!
//! Displays the query catalog as a collapsible category tree.

use crate::catalog;
use crate::tui::app::SidebarItem;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Sidebar widget for the query catalog.
pub struct Sidebar<'a> {
    items: &'a [SidebarItem],
    expanded: &'a [bool],
    cursor: usize,
    selected: &'a str,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    /// Creates a new sidebar widget.
    pub fn new(
        items: &'a [SidebarItem],
        expanded: &'a [bool],
        cursor: usize,
        selected: &'a str,
        focused: bool,
    ) -> Self {
        Self {
            items,
            expanded,
            cursor,
            selected,
            focused,
        }
    }

    fn item_line(&self, index: usize, item: SidebarItem) -> Line<'static> {
        let mut style = match item {
            SidebarItem::Category(_) => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            SidebarItem::Query(name) if name == self.selected => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            SidebarItem::Query(_) => Style::default(),
        };
        if self.focused && index == self.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let text = match item {
            SidebarItem::Category(i) => {
                let open = self.expanded.get(i).copied().unwrap_or(false);
                let title = catalog::categories().get(i).map_or("", |c| c.title);
                format!("{} {title}", if open { "▾" } else { "▸" })
            }
            SidebarItem::Query(name) => {
                let marker = if name == self.selected { "●" } else { " " };
                format!("  {marker} {name}")
            }
        };

        Line::from(Span::styled(text, style))
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Queries ");

        // Keep the cursor in view
        let height = area.height.saturating_sub(2) as usize;
        let offset = (self.cursor + 1).saturating_sub(height);

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .map(|(index, item)| self.item_line(index, *item))
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
