//! Dashboard model: one state snapshot in, one complete view out.
//!
//! The host loop (TUI or headless) owns a [`DashboardState`] and calls
//! [`Dashboard::render`] after every interaction that changes it. Rendering
//! re-runs the overview counts, the selected catalog query and the filter
//! query, each on its own connection.

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{self, DEFAULT_QUERY};
use crate::chart::{build_chart, Chart};
use crate::db::{QueryResult, Value};
use crate::error::Result;
use crate::filter::{build_filter_query, FilterState};
use crate::query::QueryRunner;

pub const NO_DATA_MESSAGE: &str = "No data returned for this query.";

/// Everything the user can change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Name of the selected catalog query.
    pub selected: String,
    pub filter: FilterState,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY)
    }
}

impl DashboardState {
    pub fn new(selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            filter: FilterState::default(),
        }
    }
}

/// Headline counts shown above the panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub total_asteroids: i64,
    pub total_approaches: i64,
    pub hazardous: i64,
    /// First failure while counting, if any.
    pub error: Option<String>,
}

impl Overview {
    /// Share of tracked objects flagged hazardous, in percent.
    pub fn hazard_rate(&self) -> f64 {
        if self.total_asteroids > 0 {
            self.hazardous as f64 / self.total_asteroids as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn hazard_rate_display(&self) -> String {
        format!("{:.1}%", self.hazard_rate())
    }
}

/// Outcome of one query, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Panel {
    /// Rows came back; `chart` is set when the chart heuristic matched.
    Table {
        result: QueryResult,
        chart: Option<Chart>,
    },
    /// The query succeeded with no rows.
    Empty,
    /// The query could not be run.
    Failed { category: String, message: String },
}

impl Panel {
    pub fn row_count(&self) -> usize {
        match self {
            Panel::Table { result, .. } => result.row_count,
            Panel::Empty | Panel::Failed { .. } => 0,
        }
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            Panel::Table { result, .. } => Some(result),
            Panel::Empty | Panel::Failed { .. } => None,
        }
    }

    pub fn chart(&self) -> Option<&Chart> {
        match self {
            Panel::Table { chart, .. } => chart.as_ref(),
            Panel::Empty | Panel::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Panel::Failed { .. })
    }
}

/// Complete screen contents for one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub overview: Overview,
    /// Name of the query actually shown (after fallback).
    pub selected: String,
    pub query_panel: Panel,
    pub filter_panel: Panel,
}

impl DashboardView {
    /// Summary line under the filtered results.
    pub fn filter_message(&self) -> String {
        match &self.filter_panel {
            Panel::Table { result, .. } => {
                format!("Found {} asteroids matching your criteria", result.row_count)
            }
            Panel::Empty | Panel::Failed { .. } => {
                "No asteroids found matching your criteria. Try adjusting the filters.".to_string()
            }
        }
    }
}

/// Turns dashboard state into views by running queries.
#[derive(Clone)]
pub struct Dashboard {
    runner: QueryRunner,
}

impl Dashboard {
    pub fn new(runner: QueryRunner) -> Self {
        Self { runner }
    }

    /// Re-runs everything the screen shows for `state`.
    pub async fn render(&self, state: &DashboardState) -> DashboardView {
        let overview = self.overview().await;

        let entry = match catalog::find(&state.selected) {
            Some(entry) => entry,
            None => {
                warn!(
                    "Unknown query '{}', showing '{}'",
                    state.selected, DEFAULT_QUERY
                );
                catalog::resolve(&state.selected)
            }
        };
        debug!("Rendering dashboard for '{}'", entry.name);

        let query_panel = self
            .show_query(entry.sql_for(self.runner.backend()), &[], true)
            .await;

        let filter_query = build_filter_query(&state.filter);
        let filter_panel = self
            .show_query(&filter_query.sql, &filter_query.params, false)
            .await;

        DashboardView {
            overview,
            selected: entry.name.to_string(),
            query_panel,
            filter_panel,
        }
    }

    /// Runs one statement and packages the outcome as a panel.
    pub async fn show_query(&self, sql: &str, params: &[Value], show_chart: bool) -> Panel {
        match self.runner.run(sql, params).await {
            Ok(result) if result.is_empty() => Panel::Empty,
            Ok(result) => {
                let chart = if show_chart { build_chart(&result) } else { None };
                Panel::Table { result, chart }
            }
            Err(e) => Panel::Failed {
                category: e.category().to_string(),
                message: e.message().to_string(),
            },
        }
    }

    /// Computes the headline counts. Failed counts read as zero.
    pub async fn overview(&self) -> Overview {
        let mut overview = Overview::default();

        let counts = [
            catalog::TOTAL_ASTEROIDS_SQL,
            catalog::TOTAL_APPROACHES_SQL,
            catalog::HAZARDOUS_COUNT_SQL,
        ];
        let mut values = [0i64; 3];

        for (sql, value) in counts.iter().zip(values.iter_mut()) {
            match self.count(sql).await {
                Ok(n) => *value = n,
                Err(e) => {
                    if overview.error.is_none() {
                        overview.error = Some(e.to_string());
                    }
                }
            }
        }

        let [total_asteroids, total_approaches, hazardous] = values;
        overview.total_asteroids = total_asteroids;
        overview.total_approaches = total_approaches;
        overview.hazardous = hazardous;
        overview
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        let result = self.runner.run(sql, &[]).await?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_f64)
            .map(|n| n as i64)
            .unwrap_or(0))
    }
}
