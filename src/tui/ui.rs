//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{
    chart::ChartPanel, filters::FilterForm, header::Header, help::HelpOverlay, metrics::Metrics,
    sidebar::Sidebar, table::ResultTable,
};
use crate::dashboard::{Panel, NO_DATA_MESSAGE};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Metrics
            Constraint::Min(6),    // Sidebar + panels
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(main_layout[2]);

    render_header(frame, main_layout[0], app);
    frame.render_widget(
        Metrics::new(app.view.as_ref().map(|v| &v.overview)),
        main_layout[1],
    );
    render_sidebar(frame, content_layout[0], app);
    render_main(frame, content_layout[1], app);
    render_footer(frame, main_layout[3], app);

    if app.show_help {
        frame.render_widget(HelpOverlay::new(), HelpOverlay::area(area));
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let healthy = app
        .view
        .as_ref()
        .map_or(true, |v| v.overview.error.is_none());
    frame.render_widget(Header::new(app.connection_info.as_deref(), healthy), area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items = app.sidebar_items();
    let selected = app
        .view
        .as_ref()
        .map_or(app.state.selected.as_str(), |v| v.selected.as_str());
    let widget = Sidebar::new(
        &items,
        &app.expanded,
        app.sidebar_cursor,
        selected,
        app.focus == Focus::Sidebar,
    );
    frame.render_widget(widget, area);
}

/// Selected query on top, filters and filtered results below.
fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(52), Constraint::Min(20)])
        .split(rows[1]);

    render_query_panel(frame, rows[0], app);
    frame.render_widget(
        FilterForm::new(&app.state.filter, app.filter_field, app.focus == Focus::Filters),
        bottom[0],
    );
    render_filter_results(frame, bottom[1], app);
}

fn render_query_panel(frame: &mut Frame, area: Rect, app: &App) {
    let title = app
        .view
        .as_ref()
        .map_or(app.state.selected.as_str(), |v| v.selected.as_str());
    let block = panel_block(format!(" {title} "), app.focus == Focus::Results);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = &app.view else {
        render_message(frame, inner, "Loading...", Style::default().fg(Color::DarkGray));
        return;
    };

    match (&view.query_panel, view.query_panel.chart()) {
        (Panel::Table { result, .. }, Some(chart)) => {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(inner);
            frame.render_widget(ResultTable::new(result).scroll(app.results_scroll), split[0]);
            frame.render_widget(ChartPanel::new(chart), split[1]);
        }
        (panel, _) => render_panel(frame, inner, panel, app.results_scroll),
    }
}

fn render_filter_results(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel_block(
        " Filtered Results ".to_string(),
        app.focus == Focus::FilterResults,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = &app.view else {
        return;
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let message_style = match view.filter_panel {
        Panel::Table { .. } => Style::default().fg(Color::Green),
        Panel::Empty | Panel::Failed { .. } => Style::default().fg(Color::Yellow),
    };
    render_message(frame, parts[0], &view.filter_message(), message_style);
    render_panel(frame, parts[1], &view.filter_panel, app.filter_scroll);
}

/// Table, no-data notice or error for a panel without a chart.
fn render_panel(frame: &mut Frame, area: Rect, panel: &Panel, scroll: usize) {
    match panel {
        Panel::Table { result, .. } => {
            frame.render_widget(ResultTable::new(result).scroll(scroll), area);
        }
        Panel::Empty => render_message(
            frame,
            area,
            NO_DATA_MESSAGE,
            Style::default().fg(Color::DarkGray),
        ),
        Panel::Failed { category, message } => render_message(
            frame,
            area,
            &format!("{category}: {message}"),
            Style::default().fg(Color::Red),
        ),
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(Line::from(Span::styled(text.to_string(), style)))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

/// Bottom line: overview warning if any, otherwise key hints.
fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.view.as_ref().and_then(|v| v.overview.error.as_deref()) {
        Some(error) => Line::from(Span::styled(
            format!(" ⚠ Overview unavailable: {error}"),
            Style::default().fg(Color::Red),
        )),
        None => {
            let key = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            let desc = Style::default().fg(Color::DarkGray);
            Line::from(vec![
                Span::styled(" Tab", key),
                Span::styled(" focus  ", desc),
                Span::styled("Enter", key),
                Span::styled(" select  ", desc),
                Span::styled("←/→", key),
                Span::styled(" adjust  ", desc),
                Span::styled("r", key),
                Span::styled(" refresh  ", desc),
                Span::styled("?", key),
                Span::styled(" help  ", desc),
                Span::styled("q", key),
                Span::styled(" quit", desc),
            ])
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
