// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily per-provider usage totals backing quota enforcement.
//!
//! The ledger is the persistent half of the quota tracker: running totals
//! are re-hydrated from here on startup so caps survive restarts.

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use unigen_core::UnigenError;

use crate::database::storage_err;

/// A day's accumulated usage for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayUsage {
    pub calls: u64,
    pub tokens: u64,
}

/// Facade over the `usage_ledger` table.
#[derive(Clone)]
pub struct UsageLedger {
    conn: Connection,
}

impl UsageLedger {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Add one call (and its token count, if any) to a provider's daily row.
    pub async fn add_usage(
        &self,
        day: &str,
        provider: &str,
        tokens: u64,
    ) -> Result<(), UnigenError> {
        let day = day.to_string();
        let provider = provider.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO usage_ledger (day, provider, calls, tokens) \
                     VALUES (?1, ?2, 1, ?3) \
                     ON CONFLICT (day, provider) \
                     DO UPDATE SET calls = calls + 1, tokens = tokens + excluded.tokens",
                    rusqlite::params![day, provider, tokens as i64],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Read a provider's totals for one day (zeroes when absent).
    pub async fn day_usage(&self, day: &str, provider: &str) -> Result<DayUsage, UnigenError> {
        let day = day.to_string();
        let provider = provider.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT calls, tokens FROM usage_ledger WHERE day = ?1 AND provider = ?2",
                )?;
                let row = stmt
                    .query_row(rusqlite::params![day, provider], |row| {
                        Ok(DayUsage {
                            calls: row.get::<_, i64>(0)? as u64,
                            tokens: row.get::<_, i64>(1)? as u64,
                        })
                    })
                    .optional()?;
                Ok(row.unwrap_or_default())
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    #[tokio::test]
    async fn usage_accumulates_per_day_and_provider() {
        let db = Database::open_in_memory().await.unwrap();
        let ledger = db.usage_ledger();

        ledger.add_usage("2026-02-10", "openai", 150).await.unwrap();
        ledger.add_usage("2026-02-10", "openai", 50).await.unwrap();
        ledger.add_usage("2026-02-10", "tavily", 0).await.unwrap();

        let openai = ledger.day_usage("2026-02-10", "openai").await.unwrap();
        assert_eq!(openai, DayUsage { calls: 2, tokens: 200 });

        let tavily = ledger.day_usage("2026-02-10", "tavily").await.unwrap();
        assert_eq!(tavily.calls, 1);

        let empty = ledger.day_usage("2026-02-11", "openai").await.unwrap();
        assert_eq!(empty, DayUsage::default());
    }
}
