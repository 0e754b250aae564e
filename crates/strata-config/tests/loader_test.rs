//! Layered loading tests for `ConfigLoader`.

use std::fs;
use strata_config::{AppConfig, ConfigLoader};
use strata_core::LogFormat;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).expect("Failed to write config file");
}

#[tokio::test]
async fn test_default_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "default.toml",
        r#"
[database]
url = "postgres://app:app@db:5432/app"
max_connections = 42

[observability]
log_format = "json"
"#,
    );

    let loader = ConfigLoader::with_environment(dir.path(), "development").unwrap();
    let config = loader.get().await;

    assert_eq!(config.database.url, "postgres://app:app@db:5432/app");
    assert_eq!(config.database.max_connections, 42);
    // Unset fields keep their defaults
    assert_eq!(config.database.connect_timeout_secs, 30);
    assert_eq!(config.observability.log_format, LogFormat::Json);
}

#[tokio::test]
async fn test_environment_file_overrides_default() {
    let dir = TempDir::new().unwrap();
    write(&dir, "default.toml", "[database]\nmax_connections = 5\n");
    write(&dir, "staging.toml", "[database]\nmax_connections = 15\n");

    let staging = ConfigLoader::with_environment(dir.path(), "staging").unwrap();
    assert_eq!(staging.get().await.database.max_connections, 15);

    let development = ConfigLoader::with_environment(dir.path(), "development").unwrap();
    assert_eq!(development.get().await.database.max_connections, 5);
}

#[tokio::test]
async fn test_local_file_wins_over_environment_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "staging.toml", "[database]\nidle_timeout_secs = 100\n");
    write(&dir, "local.toml", "[database]\nidle_timeout_secs = 200\n");

    let loader = ConfigLoader::with_environment(dir.path(), "staging").unwrap();
    assert_eq!(loader.get().await.database.idle_timeout_secs, 200);
}

#[tokio::test]
async fn test_invalid_database_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(&dir, "default.toml", "[database]\nurl = \"redis://localhost\"\n");

    let result = ConfigLoader::with_environment(dir.path(), "development");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_reload_picks_up_changes() {
    let dir = TempDir::new().unwrap();
    write(&dir, "default.toml", "[database]\nmax_connections = 3\n");

    let loader = ConfigLoader::with_environment(dir.path(), "development").unwrap();
    assert_eq!(loader.get().await.database.max_connections, 3);

    write(&dir, "default.toml", "[database]\nmax_connections = 8\n");
    loader.reload().await.unwrap();
    assert_eq!(loader.get().await.database.max_connections, 8);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "default.toml", "[database]\nmax_connections = 3\n");

    let loader = ConfigLoader::with_environment(dir.path(), "development").unwrap();

    write(&dir, "default.toml", "[database]\nmin_connections = 9\nmax_connections = 2\n");
    assert!(loader.reload().await.is_err());
    assert_eq!(loader.get().await.database.max_connections, 3);
}

#[tokio::test]
async fn test_serialized_defaults_round_trip_through_loader() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    write(&dir, "default.toml", &toml::to_string(&config).unwrap());

    let loader = ConfigLoader::with_environment(dir.path(), "development").unwrap();
    let loaded = loader.get().await;
    assert_eq!(loaded.database.url, "sqlite::memory:");
    assert_eq!(loaded.app.name, "strata");
}
