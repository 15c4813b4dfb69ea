use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};

pub mod schema;

/// The single database handle shared by the registry, catalog and ledger.
///
/// The pool is capped at one connection so every statement runs serially and
/// autocommits. Call [`Store::close`] before the process exits.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if absent) the database file at `path` and ensure the schema.
    pub async fn open(path: &Path) -> AnyResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!(
                    target: "resortdesk",
                    event = "db_dir_create_failed",
                    error = %e,
                    path = %parent.display()
                );
                e
            })?;
        }
        tracing::info!(target: "resortdesk", event = "db_path", path = %path.display());

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(log::LevelFilter::Debug);

        let pool = single_connection_pool()
            .connect_with(opts)
            .await
            .with_context(|| format!("open database {}", path.display()))?;

        let store = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        store.prepare().await?;
        Ok(store)
    }

    /// A private in-memory database, mostly for tests.
    pub async fn open_in_memory() -> AnyResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .log_statements(log::LevelFilter::Debug);
        let pool = single_connection_pool()
            .connect_with(opts)
            .await
            .context("open in-memory database")?;

        let store = Self { pool, path: None };
        store.prepare().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!(target: "resortdesk", event = "db_closed");
    }

    async fn prepare(&self) -> AnyResult<()> {
        schema::ensure_schema(&self.pool)
            .await
            .context("create tables")?;
        log_effective_pragmas(&self.pool).await;
        Ok(())
    }
}

fn single_connection_pool() -> SqlitePoolOptions {
    // An in-memory database lives exactly as long as its connection.
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

async fn log_effective_pragmas(pool: &SqlitePool) {
    use tracing::{info, warn};

    let (sqlite_ver,): (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let jm: (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let fks: (i64,) = sqlx::query_as("PRAGMA foreign_keys;")
        .fetch_one(pool)
        .await
        .unwrap_or((i64::MIN,));

    info!(
        target: "resortdesk",
        event = "db_open",
        sqlite_version = %sqlite_ver,
        journal_mode = %jm.0,
        foreign_keys = %fks.0
    );

    if fks.0 != 1 {
        warn!(
            target: "resortdesk",
            event = "db_open_warning",
            msg = "foreign_keys is off; only application checks guard references"
        );
    }
}
