// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management with PRAGMA setup and per-operation lifecycle.
//!
//! Every store operation opens its own connection and closes it before
//! returning, on success and on error alike. Nothing is pooled.

use std::path::Path;
use std::time::Duration;

use gemchat_config::model::StorageConfig;
use gemchat_core::ChatError;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

/// Schema of the single turn table. Safe to run on every open.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chat_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    request TEXT NOT NULL,
    response TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_chat_log_username ON chat_log (username);
";

/// Connection options derived from [`StorageConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions {
    pub wal_mode: bool,
    pub busy_timeout: Duration,
}

impl From<&StorageConfig> for ConnectOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// One open connection to a store file.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the store at `path` and applies connection PRAGMAs.
    pub async fn open(path: &Path, options: ConnectOptions) -> Result<Self, ChatError> {
        let conn = Connection::open(path).await.map_err(ChatError::storage)?;
        let db = Self { conn };
        let setup = db
            .conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.busy_timeout(options.busy_timeout)?;
                if options.wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    if !mode.eq_ignore_ascii_case("wal") {
                        tracing::warn!(mode = %mode, "WAL mode not applied");
                    }
                }
                Ok(())
            })
            .await
            .map_err(map_tr_err);
        if let Err(e) = setup {
            db.close().await.ok();
            return Err(e);
        }
        Ok(db)
    }

    /// Returns the underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing the WAL.
    pub async fn close(self) -> Result<(), ChatError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Converts a tokio-rusqlite error into [`ChatError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> ChatError {
    ChatError::Storage {
        source: Box::new(e),
    }
}

/// Opens `path`, runs `f` on the connection thread, and closes the connection.
///
/// The connection is closed whatever `f` returns. A close failure after a
/// successful `f` is logged but does not discard the result.
pub async fn with_database<R, F>(path: &Path, options: ConnectOptions, f: F) -> Result<R, ChatError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, rusqlite::Error> + Send + 'static,
    R: Send + 'static,
{
    let db = Database::open(path, options).await?;
    let result = db.connection().call(f).await.map_err(map_tr_err);
    if let Err(e) = db.close().await {
        warn!(path = %path.display(), error = %e, "failed to close store connection");
    } else {
        debug!(path = %path.display(), "store connection closed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options() -> ConnectOptions {
        ConnectOptions {
            wal_mode: true,
            busy_timeout: Duration::from_millis(1000),
        }
    }

    #[tokio::test]
    async fn open_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db");
        let db = Database::open(&path, options()).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.db");
        for _ in 0..2 {
            with_database(&path, options(), |conn| conn.execute_batch(SCHEMA))
                .await
                .unwrap();
        }
        let count: i64 = with_database(&path, options(), |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'chat_log'",
                [],
                |row| row.get(0),
            )
        })
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn with_database_surfaces_query_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("err.db");
        let result = with_database(&path, options(), |conn| {
            conn.execute("INSERT INTO missing_table VALUES (1)", [])
        })
        .await;
        assert!(matches!(result, Err(ChatError::Storage { .. })));
    }

    #[tokio::test]
    async fn open_fails_for_directory_path() {
        let dir = tempdir().unwrap();
        let result = Database::open(dir.path(), options()).await;
        assert!(result.is_err());
    }
}
