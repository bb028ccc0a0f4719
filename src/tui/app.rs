//! Application state for the TUI.
//!
//! Contains the main App struct: the dashboard state snapshot, the last view
//! rendered from it, and the purely visual state (focus, cursors, scroll).

use crate::catalog;
use crate::dashboard::{DashboardState, DashboardView};
use crate::filter::FilterField;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sidebar,
    Filters,
    Results,
    FilterResults,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Sidebar => Self::Filters,
            Self::Filters => Self::Results,
            Self::Results => Self::FilterResults,
            Self::FilterResults => Self::Sidebar,
        }
    }

    /// Cycles to the previous focus panel.
    pub fn prev(self) -> Self {
        match self {
            Self::Sidebar => Self::FilterResults,
            Self::Filters => Self::Sidebar,
            Self::Results => Self::Filters,
            Self::FilterResults => Self::Results,
        }
    }
}

/// A visible row of the sidebar tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItem {
    /// Category header, by index into [`catalog::categories`].
    Category(usize),
    /// Query name.
    Query(&'static str),
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current focus panel.
    pub focus: Focus,
    /// What the dashboard should show.
    pub state: DashboardState,
    /// Last view rendered for `state`.
    pub view: Option<DashboardView>,
    /// Set when `state` changed since `view` was rendered.
    pub needs_refresh: bool,
    /// Expanded flag per category.
    pub expanded: Vec<bool>,
    /// Cursor into [`App::sidebar_items`].
    pub sidebar_cursor: usize,
    /// Focused field of the filter form.
    pub filter_field: FilterField,
    /// First visible row of the query results table.
    pub results_scroll: usize,
    /// First visible row of the filtered results table.
    pub filter_scroll: usize,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Database connection info for display.
    pub connection_info: Option<String>,
}

impl App {
    /// Creates a new App showing `state`.
    pub fn new(state: DashboardState, connection_info: Option<String>) -> Self {
        let mut app = Self {
            running: true,
            focus: Focus::default(),
            state,
            view: None,
            needs_refresh: true,
            expanded: vec![false; catalog::categories().len()],
            sidebar_cursor: 0,
            filter_field: FilterField::default(),
            results_scroll: 0,
            filter_scroll: 0,
            show_help: false,
            connection_info,
        };
        let selected = app.state.selected.clone();
        app.reveal(&selected);
        app
    }

    /// Visible sidebar rows: every category, plus the queries of expanded ones.
    pub fn sidebar_items(&self) -> Vec<SidebarItem> {
        let mut items = Vec::new();
        for (index, category) in catalog::categories().iter().enumerate() {
            items.push(SidebarItem::Category(index));
            if self.expanded.get(index).copied().unwrap_or(false) {
                items.extend(category.entries.iter().map(|name| SidebarItem::Query(*name)));
            }
        }
        items
    }

    /// Stores a freshly rendered view.
    pub fn set_view(&mut self, view: DashboardView) {
        self.results_scroll = self
            .results_scroll
            .min(view.query_panel.row_count().saturating_sub(1));
        self.filter_scroll = self
            .filter_scroll
            .min(view.filter_panel.row_count().saturating_sub(1));
        self.view = Some(view);
        self.needs_refresh = false;
    }

    /// Selects a catalog query by name. Returns false for unknown names.
    pub fn select_query(&mut self, name: &str) -> bool {
        let Some(entry) = catalog::find(name) else {
            return false;
        };
        self.state.selected = entry.name.to_string();
        self.results_scroll = 0;
        self.needs_refresh = true;
        self.reveal(entry.name);
        true
    }

    /// Expands the category holding `name` and puts the cursor on it.
    fn reveal(&mut self, name: &str) {
        if let Some(index) = catalog::category_of(name) {
            self.expanded[index] = true;
        }
        if let Some(pos) = self
            .sidebar_items()
            .iter()
            .position(|item| *item == SidebarItem::Query(catalog::resolve(name).name))
        {
            self.sidebar_cursor = pos;
        }
    }

    /// Handles an event and updates application state.
    pub fn handle_event(&mut self, event: super::Event) {
        match event {
            super::Event::Key(key) => self.handle_key(key),
            super::Event::Resize(_, _) | super::Event::Tick => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.needs_refresh = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_key(key.code),
                Focus::Filters => self.handle_filter_key(key.code),
                Focus::Results => {
                    let rows = self.view.as_ref().map_or(0, |v| v.query_panel.row_count());
                    self.results_scroll = scroll(self.results_scroll, key.code, rows);
                }
                Focus::FilterResults => {
                    let rows = self.view.as_ref().map_or(0, |v| v.filter_panel.row_count());
                    self.filter_scroll = scroll(self.filter_scroll, key.code, rows);
                }
            },
        }
    }

    fn handle_sidebar_key(&mut self, code: KeyCode) {
        let items = self.sidebar_items();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.sidebar_cursor + 1 < items.len() {
                    self.sidebar_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => match items.get(self.sidebar_cursor) {
                Some(SidebarItem::Category(index)) => {
                    self.expanded[*index] = !self.expanded[*index];
                }
                Some(SidebarItem::Query(name)) => {
                    self.select_query(name);
                }
                None => {}
            },
            KeyCode::Right => {
                if let Some(SidebarItem::Category(index)) = items.get(self.sidebar_cursor) {
                    self.expanded[*index] = true;
                }
            }
            KeyCode::Left => {
                let category = match items.get(self.sidebar_cursor) {
                    Some(SidebarItem::Category(index)) => Some(*index),
                    Some(SidebarItem::Query(name)) => catalog::category_of(name),
                    None => None,
                };
                if let Some(index) = category {
                    self.expanded[index] = false;
                    self.sidebar_cursor = self
                        .sidebar_items()
                        .iter()
                        .position(|item| *item == SidebarItem::Category(index))
                        .unwrap_or(0);
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.filter_field = self.filter_field.prev(),
            KeyCode::Down | KeyCode::Char('j') => self.filter_field = self.filter_field.next(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => {
                self.state.filter.adjust(self.filter_field, true);
                self.filter_changed();
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
                self.state.filter.adjust(self.filter_field, false);
                self.filter_changed();
            }
            KeyCode::PageUp if self.filter_field == FilterField::Date => {
                self.state.filter.shift_date_months(false);
                self.filter_changed();
            }
            KeyCode::PageDown if self.filter_field == FilterField::Date => {
                self.state.filter.shift_date_months(true);
                self.filter_changed();
            }
            _ => {}
        }
    }

    fn filter_changed(&mut self) {
        self.filter_scroll = 0;
        self.needs_refresh = true;
    }
}

/// New first visible row of a table with `rows` rows after a scroll key.
fn scroll(current: usize, code: KeyCode, rows: usize) -> usize {
    let max_scroll = rows.saturating_sub(1);
    match code {
        KeyCode::Up | KeyCode::Char('k') => current.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => current + 1,
        KeyCode::PageUp => current.saturating_sub(10),
        KeyCode::PageDown => current + 10,
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => max_scroll,
        _ => current,
    }
    .min(max_scroll)
}
