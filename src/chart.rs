//! Chart selection and construction for query results.
//!
//! A result gets at most one chart. The choice is made purely from the column
//! names; the data only matters when the chart is built.

use crate::db::QueryResult;
use serde::Serialize;

/// Second-column names that turn a two-column result into a bar chart.
pub const BAR_CHART_COLUMNS: [&str; 3] = ["count", "approach_count", "total"];

/// Bar charts show at most this many leading rows.
pub const BAR_CHART_ROWS: usize = 10;

/// Upper bound on histogram bins.
pub const HISTOGRAM_MAX_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    Histogram,
}

/// Which chart to draw for a result, and over which columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Column plotted as the measured value.
    pub value_column: String,
    /// Column providing bar labels (bar charts only).
    pub label_column: Option<String>,
    pub title: String,
}

/// A chart ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Chart {
    Bar(BarSeries),
    Histogram(Histogram),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar(series) => &series.title,
            Chart::Histogram(histogram) => &histogram.title,
        }
    }

    /// Names the plotted columns, e.g. `approach_count by neo_reference_id`.
    pub fn axis_caption(&self) -> String {
        match self {
            Chart::Bar(series) => format!("{} by {}", series.y_label, series.x_label),
            Chart::Histogram(histogram) => format!("count by {}", histogram.column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub column: String,
    pub bins: Vec<Bin>,
}

/// One histogram bucket covering `[start, end)` (the last bucket is closed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Histogram {
    /// Largest bucket count, used to scale bars.
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

/// Decides which chart (if any) a result gets.
///
/// Rules, first match wins:
/// 1. exactly two columns and the second is a count column: bar chart;
/// 2. more than one column and the second mentions "velocity": histogram.
pub fn select_chart(result: &QueryResult) -> Option<ChartSpec> {
    if result.is_empty() {
        return None;
    }

    let names = result.column_names();

    if names.len() == 2 && BAR_CHART_COLUMNS.contains(&names[1]) {
        return Some(ChartSpec {
            kind: ChartKind::Bar,
            value_column: names[1].to_string(),
            label_column: Some(names[0].to_string()),
            title: format!("Top 10 - {}", title_case(names[1])),
        });
    }

    if names.len() > 1 && names[1].to_lowercase().contains("velocity") {
        return Some(ChartSpec {
            kind: ChartKind::Histogram,
            value_column: names[1].to_string(),
            label_column: None,
            title: format!("Distribution of {}", title_case(names[1])),
        });
    }

    None
}

/// Selects and builds the chart for a result.
///
/// Returns `None` when no rule applies or no plottable values remain.
pub fn build_chart(result: &QueryResult) -> Option<Chart> {
    let spec = select_chart(result)?;

    match spec.kind {
        ChartKind::Bar => {
            let bars: Vec<(String, f64)> = result
                .rows
                .iter()
                .take(BAR_CHART_ROWS)
                .filter_map(|row| {
                    let label = row.first()?.to_display_string();
                    let value = row.get(1)?.as_f64()?;
                    Some((label, value))
                })
                .collect();

            if bars.is_empty() {
                return None;
            }

            Some(Chart::Bar(BarSeries {
                title: spec.title,
                x_label: spec.label_column.unwrap_or_default(),
                y_label: spec.value_column,
                bars,
            }))
        }
        ChartKind::Histogram => {
            let values: Vec<f64> = result.column_values(1).filter_map(|v| v.as_f64()).collect();
            let bins = histogram_bins(&values);
            if bins.is_empty() {
                return None;
            }

            Some(Chart::Histogram(Histogram {
                title: spec.title,
                column: spec.value_column,
                bins,
            }))
        }
    }
}

/// Number of bins by Sturges' rule, capped at [`HISTOGRAM_MAX_BINS`].
fn bin_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let sturges = (n as f64).log2().ceil() as usize + 1;
    sturges.clamp(1, HISTOGRAM_MAX_BINS)
}

/// Buckets values into equal-width bins spanning `[min, max]`.
fn histogram_bins(values: &[f64]) -> Vec<Bin> {
    let count = bin_count(values.len());
    if count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![Bin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / count as f64;
    let mut bins: Vec<Bin> = (0..count)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width) as usize).min(count - 1);
        bins[index].count += 1;
    }

    if let Some(last) = bins.last_mut() {
        last.end = max;
    }

    bins
}

/// Turns a column name into a title: underscores become spaces and each word
/// starts upper case with the rest lower case.
pub fn title_case(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut in_word = false;

    for c in column.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, Value};

    fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult::with_data(
            columns.iter().map(|c| ColumnInfo::new(*c, "TEXT")).collect(),
            rows,
        )
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("approach_count"), "Approach Count");
        assert_eq!(
            title_case("relative_velocity_km_per_hour"),
            "Relative Velocity Km Per Hour"
        );
        assert_eq!(title_case("MAX_velocity"), "Max Velocity");
        assert_eq!(title_case("total"), "Total");
    }

    #[test]
    fn test_count_column_selects_bar() {
        let r = result(&["month", "count"], vec![vec!["2024-03".into(), 12.into()]]);
        let spec = select_chart(&r).unwrap();
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.title, "Top 10 - Count");
        assert_eq!(spec.label_column.as_deref(), Some("month"));
    }

    #[test]
    fn test_bar_requires_exactly_two_columns() {
        let r = result(
            &["neo_reference_id", "total", "extra"],
            vec![vec![1.into(), 2.into(), 3.into()]],
        );
        assert_eq!(select_chart(&r), None);
    }

    #[test]
    fn test_bar_column_match_is_exact() {
        let r = result(&["x", "close_pass_count"], vec![vec![1.into(), 2.into()]]);
        assert_eq!(select_chart(&r), None);
    }

    #[test]
    fn test_velocity_column_selects_histogram() {
        let r = result(
            &["name", "relative_velocity_km_per_hour"],
            vec![vec!["433 Eros".into(), 52000.5.into()]],
        );
        let spec = select_chart(&r).unwrap();
        assert_eq!(spec.kind, ChartKind::Histogram);
        assert_eq!(spec.title, "Distribution of Relative Velocity Km Per Hour");
    }

    #[test]
    fn test_velocity_match_is_case_insensitive() {
        let r = result(&["id", "Max_VELOCITY"], vec![vec![1.into(), 2.0.into()]]);
        assert_eq!(select_chart(&r).unwrap().kind, ChartKind::Histogram);
    }

    #[test]
    fn test_unrelated_columns_select_nothing() {
        let r = result(
            &["id", "name", "absolute_magnitude_h"],
            vec![vec![1.into(), "433 Eros".into(), 10.4.into()]],
        );
        assert_eq!(select_chart(&r), None);
        assert_eq!(build_chart(&r), None);
    }

    #[test]
    fn test_empty_result_has_no_chart() {
        let r = result(&["month", "count"], vec![]);
        assert_eq!(select_chart(&r), None);
    }

    #[test]
    fn test_bar_chart_uses_first_ten_rows() {
        let rows = (0..15)
            .map(|i| vec![Value::Int(i), Value::Int(100 - i)])
            .collect();
        let r = result(&["neo_reference_id", "approach_count"], rows);

        let Some(Chart::Bar(series)) = build_chart(&r) else {
            panic!("expected bar chart");
        };
        assert_eq!(series.bars.len(), 10);
        assert_eq!(series.bars[0], ("0".to_string(), 100.0));
        assert_eq!(series.title, "Top 10 - Approach Count");
    }

    #[test]
    fn test_histogram_bins() {
        let rows = (0..8)
            .map(|i| vec![Value::Int(i), Value::Float(i as f64 * 10.0)])
            .chain(std::iter::once(vec![Value::Int(9), Value::Null]))
            .collect();
        let r = result(&["neo_reference_id", "avg_velocity"], rows);

        let Some(Chart::Histogram(hist)) = build_chart(&r) else {
            panic!("expected histogram");
        };
        // 8 numeric values: ceil(log2(8)) + 1 = 4 bins
        assert_eq!(hist.bins.len(), 4);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 8);
        assert_eq!(hist.bins[0].start, 0.0);
        assert_eq!(hist.bins[3].end, 70.0);
        assert_eq!(hist.max_count(), 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let r = result(
            &["neo_reference_id", "fastest_velocity"],
            vec![vec![1.into(), 42.0.into()], vec![2.into(), 42.0.into()]],
        );
        let Some(Chart::Histogram(hist)) = build_chart(&r) else {
            panic!("expected histogram");
        };
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 2);
    }

    #[test]
    fn test_bin_count_is_capped() {
        assert_eq!(bin_count(1), 1);
        assert_eq!(bin_count(1_000_000), HISTOGRAM_MAX_BINS);
    }
}
