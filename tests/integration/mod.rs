//! Database-backed integration tests.

pub mod mysql_test;
pub mod query_test;

use std::path::{Path, PathBuf};

use neo_tracker::config::ConnectionConfig;
use neo_tracker::db::seed_sqlite;

/// Path of the seed script shipped with the tests.
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("neo_seed.sql")
}

/// Creates a seeded SQLite database inside `dir` and returns its config.
pub async fn seeded_sqlite(dir: &Path) -> ConnectionConfig {
    let path = dir.join("neo.db");
    let script = std::fs::read_to_string(fixture_path()).unwrap();
    seed_sqlite(&path, &script).await.unwrap();
    ConnectionConfig::sqlite(path)
}
