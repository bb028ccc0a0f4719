//! Query runner and dashboard tests against a seeded SQLite database.

use std::sync::Arc;

use neo_tracker::catalog;
use neo_tracker::chart::Chart;
use neo_tracker::dashboard::{Dashboard, DashboardState, Panel};
use neo_tracker::config::ConnectionConfig;
use neo_tracker::db::{seed_sqlite, DatabaseBackend, Value};
use neo_tracker::error::TrackerError;
use neo_tracker::filter::{build_filter_query, parse_date, FilterState, Hazard};
use neo_tracker::query::QueryRunner;
use pretty_assertions::assert_eq;

use super::seeded_sqlite;

async fn seeded_runner(dir: &tempfile::TempDir) -> QueryRunner {
    let config = seeded_sqlite(dir.path()).await;
    QueryRunner::new(Arc::new(config))
}

#[tokio::test]
async fn test_run_catalog_query() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let sql = catalog::resolve(catalog::DEFAULT_QUERY).sql;
    let result = runner.run(sql, &[]).await.unwrap();

    assert_eq!(result.column_names(), vec!["neo_reference_id", "approach_count"]);
    assert_eq!(result.row_count, 3);
    assert_eq!(result.rows[0][0], Value::Int(3542519));
    assert_eq!(result.rows[0][1].as_f64(), Some(3.0));
}

#[tokio::test]
async fn test_run_with_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let result = runner
        .run(
            "SELECT name FROM asteroids WHERE absolute_magnitude_h < ? ORDER BY name",
            &[Value::Float(23.0)],
        )
        .await
        .unwrap();

    assert_eq!(result.row_count, 2);
    assert_eq!(result.rows[0][0], Value::String("(2010 PK9)".to_string()));
}

#[tokio::test]
async fn test_run_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let result = runner
        .run("SELECT * FROM asteroids WHERE id = ?", &[Value::Int(1)])
        .await
        .unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_run_missing_table_is_query_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let err = runner.run("SELECT * FROM comets", &[]).await.unwrap_err();
    assert!(matches!(err, TrackerError::Query(_)));
}

#[tokio::test]
async fn test_run_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let err = runner.run("DELETE FROM asteroids", &[]).await.unwrap_err();
    assert!(matches!(err, TrackerError::Query(_)));

    let count = runner.run(catalog::TOTAL_ASTEROIDS_SQL, &[]).await.unwrap();
    assert_eq!(count.rows[0][0].as_f64(), Some(3.0));
}

#[tokio::test]
async fn test_missing_database_file_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConnectionConfig::sqlite(dir.path().join("absent.db"));
    let runner = QueryRunner::new(Arc::new(config));

    let err = runner.run("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, TrackerError::Connection(_)));
}

#[tokio::test]
async fn test_filter_query_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let query = build_filter_query(&FilterState::default());
    let result = runner.run(&query.sql, &query.params).await.unwrap();

    let names: Vec<String> = result
        .rows
        .iter()
        .map(|row| row[0].to_display_string())
        .collect();
    assert_eq!(result.row_count, 2);
    assert!(names.contains(&"(2010 PK9)".to_string()));
    assert!(names.contains(&"99942 Apophis".to_string()));
}

#[tokio::test]
async fn test_filter_query_non_hazardous_only() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;

    let mut state = FilterState::default();
    state.hazard = Hazard::No;
    state.ld.max.set(20.0);
    state.velocity.max.set(70_000.0);

    let query = build_filter_query(&state);
    let result = runner.run(&query.sql, &query.params).await.unwrap();

    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0][0], Value::String("(2015 RC)".to_string()));
}

#[tokio::test]
async fn test_dashboard_render() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(seeded_runner(&dir).await);

    let view = dashboard
        .render(&DashboardState::new(catalog::DEFAULT_QUERY))
        .await;

    assert_eq!(view.overview.total_asteroids, 3);
    assert_eq!(view.overview.total_approaches, 5);
    assert_eq!(view.overview.hazardous, 2);
    assert!(view.overview.error.is_none());

    assert_eq!(view.query_panel.row_count(), 3);
    assert!(matches!(view.query_panel.chart(), Some(Chart::Bar(_))));
    assert_eq!(view.filter_panel.row_count(), 2);
}

#[tokio::test]
async fn test_dashboard_velocity_histogram() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(seeded_runner(&dir).await);

    let view = dashboard
        .render(&DashboardState::new("2. Average velocity per asteroid"))
        .await;

    assert!(matches!(view.query_panel.chart(), Some(Chart::Histogram(_))));
}

#[tokio::test]
async fn test_brightest_asteroid_query() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(seeded_runner(&dir).await);

    let view = dashboard
        .render(&DashboardState::new("12. Brightest asteroid (lowest magnitude)"))
        .await;

    let brightest = view.query_panel.result().unwrap();
    assert_eq!(brightest.row_count, 1);
    assert_eq!(brightest.rows[0][1], Value::String("99942 Apophis".to_string()));
    assert_eq!(brightest.rows[0][2], Value::Float(19.4));
}

#[tokio::test]
async fn test_filter_panel_empty_after_data_range() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(seeded_runner(&dir).await);

    let mut state = DashboardState::new(catalog::DEFAULT_QUERY);
    state.filter.date = parse_date("2030-01-01").unwrap();

    let view = dashboard.render(&state).await;

    assert_eq!(view.filter_panel, Panel::Empty);
    assert!(view.filter_message().starts_with("No asteroids found"));
    assert_eq!(view.query_panel.row_count(), 3);
}

#[tokio::test]
async fn test_every_catalog_query_runs_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let runner = seeded_runner(&dir).await;
    assert_eq!(runner.backend(), DatabaseBackend::Sqlite);

    for entry in catalog::entries() {
        if let Err(e) = runner.run(entry.sql_for(runner.backend()), &[]).await {
            panic!("'{}' failed on SQLite: {e}", entry.name);
        }
    }
}

#[tokio::test]
async fn test_month_queries_use_sqlite_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(seeded_runner(&dir).await);

    let view = dashboard
        .render(&DashboardState::new("5. Month with most approaches"))
        .await;
    let busiest = view.query_panel.result().unwrap();
    assert_eq!(busiest.row_count, 1);
    let month = busiest.rows[0][0].to_display_string();
    assert_eq!(month.len(), 7, "{month}");
    assert!(month.starts_with("202"), "{month}");

    let view = dashboard
        .render(&DashboardState::new("11. Approaches per month"))
        .await;
    assert_eq!(view.query_panel.row_count(), 5);
    assert!(matches!(view.query_panel.chart(), Some(Chart::Bar(_))));
}

#[tokio::test]
async fn test_dashboard_failed_panel_keeps_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asteroids_only.db");
    seed_sqlite(
        &path,
        "CREATE TABLE asteroids (id INTEGER PRIMARY KEY, name TEXT, absolute_magnitude_h REAL, \
         is_potentially_hazardous_asteroid INTEGER);
         INSERT INTO asteroids VALUES (1, 'Eros', 11.2, 0), (2, 'Bennu', 20.2, 1);",
    )
    .await
    .unwrap();
    let dashboard = Dashboard::new(QueryRunner::new(Arc::new(ConnectionConfig::sqlite(path))));

    let view = dashboard
        .render(&DashboardState::new("12. Brightest asteroid (lowest magnitude)"))
        .await;

    assert_eq!(view.query_panel.row_count(), 1);
    match &view.filter_panel {
        Panel::Failed { category, message } => {
            assert_eq!(category, "Query Error");
            assert!(message.contains("close_approach"), "{message}");
        }
        other => panic!("expected failed panel, got {other:?}"),
    }
    assert_eq!(view.overview.total_asteroids, 2);
    assert_eq!(view.overview.hazardous, 1);
    assert_eq!(view.overview.total_approaches, 0);
    assert!(view.overview.error.is_some());
}
