//! End-to-end tests for headless mode, driving the built binary against a
//! freshly seeded SQLite file.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    crate::integration::fixture_path()
}

/// Runs the binary with a seeded database in `dir` and the given extra args.
fn run_headless(dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    run_headless_seeded(dir, &fixture_path(), args)
}

fn run_headless_seeded(dir: &TempDir, seed: &Path, args: &[&str]) -> (i32, String, String) {
    let db_url = format!("sqlite://{}", dir.path().join("neo.db").display());
    let output = Command::new(env!("CARGO_BIN_EXE_neo-tracker"))
        .arg(&db_url)
        .arg("--seed")
        .arg(seed)
        .args(args)
        .env_remove("NEO_DB_PASSWORD")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_headless_basic_execution() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_headless(&dir, &["--headless", "--events", "wait:10ms"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("NASA NEO Tracking & Insights Dashboard"));
    assert!(stdout.contains("Events: 1 executed"));
}

#[test]
fn test_headless_overview_counts() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_headless(
        &dir,
        &[
            "--headless",
            "--events",
            "assert:state:total_asteroids=3,assert:state:row_count=3,assert:state:chart=bar",
            "--output",
            "json",
        ],
    );

    assert_eq!(code, 0, "stdout: {stdout}\nstderr: {stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["assertions"]["passed"], 3);
    assert_eq!(parsed["state"]["filter_row_count"], 2);
}

#[test]
fn test_headless_sidebar_selection() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_headless(
        &dir,
        &[
            "--headless",
            "--events",
            "key:down,key:enter,assert:state:selected=2. Average velocity per asteroid,assert:state:chart=histogram",
        ],
    );

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Assertions: 2 passed, 0 failed"));
}

#[test]
fn test_headless_select_event_from_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("events.txt");
    std::fs::write(
        &script,
        "select:5. Month with most approaches\nassert:state:query_status=table\nassert:state:row_count=1\n",
    )
    .unwrap();
    let script_arg = script.to_string_lossy().to_string();

    let (code, stdout, _) = run_headless(&dir, &["--headless", "--script", &script_arg]);

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Assertions: 2 passed, 0 failed"));
}

#[test]
fn test_headless_failed_panel() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("partial.sql");
    std::fs::write(
        &seed,
        "CREATE TABLE asteroids (id INTEGER PRIMARY KEY, name TEXT, \
         is_potentially_hazardous_asteroid INTEGER);\n\
         INSERT INTO asteroids VALUES (1, 'Eros', 0);\n",
    )
    .unwrap();

    let (code, stdout, _) = run_headless_seeded(
        &dir,
        &seed,
        &[
            "--headless",
            "--events",
            "assert:state:query_status=failed,assert:contains:Query Error,assert:state:total_asteroids=1",
        ],
    );

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Assertions: 3 passed, 0 failed"));
    assert!(stdout.contains("Overview unavailable"));
}

#[test]
fn test_headless_hazard_filter() {
    let dir = tempfile::tempdir().unwrap();
    let mut events = vec!["key:tab"];
    events.extend(std::iter::repeat("key:down").take(9));
    events.extend([
        "assert:state:filter_field=Hazard",
        "key:right",
        "key:right",
        "assert:state:hazard=No",
        "assert:state:filter_row_count=0",
    ]);
    let events = events.join(",");

    let (code, stdout, _) = run_headless(&dir, &["--headless", "--events", &events]);

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Assertions: 3 passed, 0 failed"));
}

#[test]
fn test_headless_assertion_fail() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_headless(
        &dir,
        &["--headless", "--events", "assert:contains:Comet Halley", "--output", "json"],
    );

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["assertions"]["failed"], 1);
}

#[test]
fn test_headless_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("screen.txt");
    let out_arg = out.to_string_lossy().to_string();

    let (code, stdout, _) = run_headless(
        &dir,
        &["--headless", "--events", "key:?", "--output-file", &out_arg],
    );

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("About the data"));
}

#[test]
fn test_headless_custom_size() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_headless(
        &dir,
        &["--headless", "--size", "100x30", "--events", "wait:10ms", "--output", "json"],
    );

    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let lines = parsed["screen_lines"].as_array().unwrap();
    assert!(lines.len() <= 30);
    assert!(lines
        .iter()
        .all(|line| line.as_str().unwrap().chars().count() <= 100));
}

#[test]
fn test_headless_requires_events() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_headless(&dir, &["--headless"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("--headless requires --events or --script"));
}

#[test]
fn test_seed_requires_sqlite() {
    let output = Command::new(env!("CARGO_BIN_EXE_neo-tracker"))
        .args([
            "mysql://neo@127.0.0.1:1/nasa",
            "--seed",
            "seed.sql",
            "--headless",
            "--events",
            "wait:10ms",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration Error"));
}

#[test]
fn test_env_only_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let missing_config = dir.path().join("absent.toml");

    let run = |with_env: bool| {
        let mut command = Command::new(env!("CARGO_BIN_EXE_neo-tracker"));
        command
            .arg("--config")
            .arg(&missing_config)
            .args(["--seed", "seed.sql", "--headless", "--events", "wait:10ms"])
            .env_remove("NEO_DB_HOST")
            .env_remove("NEO_DB_NAME")
            .env_remove("NEO_DB_USER")
            .env_remove("NEO_DB_PASSWORD")
            .current_dir(dir.path());
        if with_env {
            command
                .env("NEO_DB_HOST", "127.0.0.1")
                .env("NEO_DB_NAME", "nasa")
                .env("NEO_DB_USER", "neo");
        }
        let output = command.output().expect("Failed to execute command");
        String::from_utf8_lossy(&output.stderr).to_string()
    };

    // Credentials validate from the environment alone, so startup reaches the seed check.
    assert!(run(true).contains("--seed is only supported for SQLite"));
    assert!(run(false).contains("Missing database credentials"));
}
