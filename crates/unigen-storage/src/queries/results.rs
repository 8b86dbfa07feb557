// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-handler result cache.
//!
//! Key = (university, attribute, handler, parameter fingerprint). A hit for
//! a fresh entry short-circuits the handler chain; stale entries read as
//! misses and are overwritten on the next accepted result.

use rusqlite::OptionalExtension;
use sha2::{Digest, Sha256};
use tokio_rusqlite::Connection;
use unigen_core::{AttributeValue, HandlerKind, UnigenError};

use crate::database::storage_err;

/// A cached accepted result.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub value: AttributeValue,
    pub references: Vec<String>,
    pub created_at: String,
}

/// Fingerprint handler parameters so prompt or config changes invalidate
/// cached entries instead of silently reusing answers to different questions.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]); // separator so ["ab","c"] != ["a","bc"]
    }
    hex::encode(hasher.finalize())
}

/// Facade over the `result_cache` table.
#[derive(Clone)]
pub struct ResultCache {
    conn: Connection,
}

impl ResultCache {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Look up a fresh cached result for the given key.
    ///
    /// Entries older than `max_age_days` are ignored.
    pub async fn lookup(
        &self,
        university: &str,
        attribute: &str,
        handler: HandlerKind,
        fingerprint: &str,
        max_age_days: u32,
    ) -> Result<Option<CachedResult>, UnigenError> {
        let university = university.to_string();
        let attribute = attribute.to_string();
        let handler = handler.to_string();
        let fingerprint = fingerprint.to_string();
        let cutoff = format!("-{max_age_days} days");

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT value_json, references_json, created_at FROM result_cache \
                     WHERE university = ?1 AND attribute = ?2 AND handler = ?3 \
                       AND fingerprint = ?4 \
                       AND created_at >= strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?5)",
                )?;
                let row = stmt
                    .query_row(
                        rusqlite::params![university, attribute, handler, fingerprint, cutoff],
                        |row| {
                            let value_json: String = row.get(0)?;
                            let references_json: String = row.get(1)?;
                            let created_at: String = row.get(2)?;
                            Ok((value_json, references_json, created_at))
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(storage_err)?
            .map(|(value_json, references_json, created_at)| {
                let value = serde_json::from_str(&value_json).map_err(|e| UnigenError::Storage {
                    source: Box::new(e),
                })?;
                let references =
                    serde_json::from_str(&references_json).map_err(|e| UnigenError::Storage {
                        source: Box::new(e),
                    })?;
                Ok(CachedResult {
                    value,
                    references,
                    created_at,
                })
            })
            .transpose()
    }

    /// Record an accepted result, replacing any prior entry for the key.
    pub async fn record(
        &self,
        university: &str,
        attribute: &str,
        handler: HandlerKind,
        fingerprint: &str,
        value: &AttributeValue,
        references: &[String],
    ) -> Result<(), UnigenError> {
        let university = university.to_string();
        let attribute = attribute.to_string();
        let handler = handler.to_string();
        let fingerprint = fingerprint.to_string();
        let value_json = serde_json::to_string(value).map_err(|e| UnigenError::Storage {
            source: Box::new(e),
        })?;
        let references_json =
            serde_json::to_string(references).map_err(|e| UnigenError::Storage {
                source: Box::new(e),
            })?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO result_cache \
                       (university, attribute, handler, fingerprint, value_json, references_json) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                     ON CONFLICT (university, attribute, handler, fingerprint) \
                     DO UPDATE SET value_json = excluded.value_json, \
                                   references_json = excluded.references_json, \
                                   created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    rusqlite::params![
                        university,
                        attribute,
                        handler,
                        fingerprint,
                        value_json,
                        references_json
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Delete entries older than `max_age_days`. Returns rows removed.
    pub async fn purge_stale(&self, max_age_days: u32) -> Result<usize, UnigenError> {
        let cutoff = format!("-{max_age_days} days");
        self.conn
            .call(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM result_cache \
                     WHERE created_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?1)",
                    rusqlite::params![cutoff],
                )?;
                Ok(removed)
            })
            .await
            .map_err(storage_err)
    }
}
