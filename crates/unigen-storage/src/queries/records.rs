// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembled university records, stored as one JSON document each.

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use unigen_core::{UnigenError, University};

use crate::database::storage_err;

/// Facade over the `universities` table.
#[derive(Clone)]
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Save (or replace) a resolved university record.
    pub async fn save(&self, university: &University) -> Result<(), UnigenError> {
        let name = university.university_name.clone();
        let record_json =
            serde_json::to_string(university).map_err(|e| UnigenError::Storage {
                source: Box::new(e),
            })?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO universities (university_name, record_json) VALUES (?1, ?2) \
                     ON CONFLICT (university_name) \
                     DO UPDATE SET record_json = excluded.record_json, \
                                   updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    rusqlite::params![name, record_json],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Load a saved record by canonical name.
    pub async fn load(&self, university_name: &str) -> Result<Option<University>, UnigenError> {
        let name = university_name.to_string();
        let record_json = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT record_json FROM universities WHERE university_name = ?1",
                )?;
                let row = stmt
                    .query_row(rusqlite::params![name], |row| row.get::<_, String>(0))
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(storage_err)?;

        record_json
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| UnigenError::Storage {
                    source: Box::new(e),
                })
            })
            .transpose()
    }

    /// List all saved university names, most recently updated first.
    pub async fn list_names(&self) -> Result<Vec<String>, UnigenError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT university_name FROM universities ORDER BY updated_at DESC",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use unigen_core::AttributeValue;

    #[tokio::test]
    async fn save_load_round_trips_record() {
        let db = Database::open_in_memory().await.unwrap();
        let store = db.record_store();

        let mut uni = University::named("University of British Columbia");
        uni.set_attribute("website", &AttributeValue::Text("https://www.ubc.ca/".into()));
        uni.set_attribute(
            "ranking",
            &AttributeValue::List(vec!["2024 QS News |34".into()]),
        );
        store.save(&uni).await.unwrap();

        let loaded = store
            .load("University of British Columbia")
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(loaded.website, "https://www.ubc.ca/");
        assert_eq!(loaded.ranking, vec!["2024 QS News |34"]);
        assert!(store.load("Unknown U").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_prior_record() {
        let db = Database::open_in_memory().await.unwrap();
        let store = db.record_store();

        let mut uni = University::named("UW");
        uni.description = "first".into();
        store.save(&uni).await.unwrap();
        uni.description = "second".into();
        store.save(&uni).await.unwrap();

        assert_eq!(store.load("UW").await.unwrap().unwrap().description, "second");
        assert_eq!(store.list_names().await.unwrap(), vec!["UW"]);
    }
}
