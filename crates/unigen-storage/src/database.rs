// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! cache is re-entered from concurrently resolving attributes, and the one
//! writer thread is what keeps that safe.

use std::path::Path;

use thiserror::Error;
use tokio_rusqlite::Connection;
use tracing::debug;
use unigen_core::UnigenError;

use crate::migrations::run_migrations;
use crate::queries::{ledger::UsageLedger, records::RecordStore, results::ResultCache};

/// Helper to convert tokio_rusqlite errors into UnigenError::Storage.
pub(crate) fn storage_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> UnigenError {
    UnigenError::Storage {
        source: Box::new(e),
    }
}

/// Closure error for [`Database::initialize`]: pragma setup fails with a
/// rusqlite error, migrations with a refinery error.
#[derive(Debug, Error)]
enum InitError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] refinery::Error),
}

/// Owns the single background SQLite connection and hands out query facades.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, set PRAGMAs, run migrations.
    pub async fn open(path: &Path) -> Result<Self, UnigenError> {
        let conn = Connection::open(path).await.map_err(|e| UnigenError::Storage {
            source: Box::new(e),
        })?;
        Self::initialize(conn, true).await
    }

    /// Open an in-memory database (tests).
    pub async fn open_in_memory() -> Result<Self, UnigenError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| UnigenError::Storage {
                source: Box::new(e),
            })?;
        // WAL is meaningless for :memory:.
        Self::initialize(conn, false).await
    }

    async fn initialize(conn: Connection, wal: bool) -> Result<Self, UnigenError> {
        conn.call(move |conn| {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error<InitError>| UnigenError::Storage {
            source: Box::new(e),
        })?;

        debug!(wal, "database opened and migrated");
        Ok(Self { conn })
    }

    /// Facade over the per-handler result cache.
    pub fn result_cache(&self) -> ResultCache {
        ResultCache::new(self.conn.clone())
    }

    /// Facade over assembled university records.
    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(self.conn.clone())
    }

    /// Facade over the daily usage ledger.
    pub fn usage_ledger(&self) -> UsageLedger {
        UsageLedger::new(self.conn.clone())
    }
}
