//! NEO Tracker - a terminal dashboard for NASA near-Earth object data.

use std::sync::Arc;

use neo_tracker::cli::Cli;
use neo_tracker::config::{Config, ConnectionConfig};
use neo_tracker::dashboard::{Dashboard, DashboardState};
use neo_tracker::db::{seed_sqlite, DatabaseBackend};
use neo_tracker::error::{Result, TrackerError};
use neo_tracker::query::QueryRunner;
use neo_tracker::{logging, secrets, tui};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.headless {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e.message());
            eprintln!("{}: {}", e.category(), e.message());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mut connection = cli.resolve_connection(&config)?;
    secrets::apply_keyring_password(&mut connection);
    connection.validate()?;
    info!("Connection: {}", connection.display_string());

    if let Some(seed_path) = &cli.seed {
        seed_database(&connection, seed_path).await?;
    }

    let connection_info = Some(connection.display_string());
    let dashboard = Dashboard::new(QueryRunner::new(Arc::new(connection)));

    let selected = cli
        .query
        .clone()
        .unwrap_or_else(|| config.dashboard.default_query.clone());
    let state = DashboardState::new(selected);

    if cli.headless {
        return tui::headless::run_headless(&cli, dashboard, state, connection_info).await;
    }

    tui::run(&dashboard, state, connection_info).await?;
    Ok(0)
}

async fn seed_database(connection: &ConnectionConfig, seed_path: &std::path::Path) -> Result<()> {
    let path = match (connection.backend, &connection.path) {
        (DatabaseBackend::Sqlite, Some(path)) => path,
        _ => {
            return Err(TrackerError::config(
                "--seed is only supported for SQLite connections",
            ))
        }
    };

    let script = std::fs::read_to_string(seed_path).map_err(|e| {
        TrackerError::config(format!(
            "Failed to read seed file {}: {e}",
            seed_path.display()
        ))
    })?;

    seed_sqlite(path, &script).await
}
