use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use crate::shared::AppError;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS races (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        season INTEGER NOT NULL,
        round INTEGER NOT NULL,
        name TEXT NOT NULL,
        circuit TEXT NOT NULL,
        country TEXT NOT NULL,
        quali_date TEXT NOT NULL,
        sprint_date TEXT,
        race_date TEXT NOT NULL,
        quali_locked INTEGER NOT NULL DEFAULT 0,
        sprint_locked INTEGER NOT NULL DEFAULT 0,
        race_locked INTEGER NOT NULL DEFAULT 0,
        UNIQUE(season, round)
    )",
    "CREATE TABLE IF NOT EXISTS bets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        username TEXT NOT NULL,
        race_id INTEGER NOT NULL REFERENCES races(id),
        category TEXT NOT NULL,
        predictions TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(user_id, race_id, category)
    )",
    "CREATE TABLE IF NOT EXISTS race_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        race_id INTEGER NOT NULL REFERENCES races(id),
        category TEXT NOT NULL,
        results TEXT NOT NULL,
        UNIQUE(race_id, category)
    )",
    "CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        username TEXT NOT NULL,
        race_id INTEGER NOT NULL REFERENCES races(id),
        category TEXT NOT NULL,
        points INTEGER NOT NULL,
        detail TEXT NOT NULL,
        UNIQUE(user_id, race_id, category)
    )",
];

/// Opens the SQLite database, creating the file and its directory if needed
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = database_file(database_url).and_then(|path| path.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create database directory {}", parent.display()))?;
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open SQLite database")?;

    Ok(pool)
}

/// Single-connection in-memory database; every connection to `sqlite::memory:`
/// is a distinct database so the pool must never open a second one
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(tables = SCHEMA.len(), "Database schema ready");
    Ok(())
}

fn database_file(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Maps a sqlx failure to the handler-facing error, logging the cause
pub(crate) fn db_error(operation: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, operation, "Database operation failed");
        AppError::DatabaseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_file_is_extracted_from_url() {
        assert_eq!(
            database_file("sqlite://data/f1pronos.db"),
            Some(Path::new("data/f1pronos.db"))
        );
        assert_eq!(
            database_file("sqlite:bets.db?mode=rwc"),
            Some(Path::new("bets.db"))
        );
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(database_file("postgres://localhost/db"), None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, vec!["bets", "race_results", "races", "scores"]);
    }
}
