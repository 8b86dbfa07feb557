// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unigen resolve` command implementation.

use std::path::Path;

use tracing::info;
use unigen_config::UnigenConfig;
use unigen_core::UnigenError;
use unigen_resolver::{build_resolver, ResolvedUniversity};
use unigen_storage::Database;

/// Resolve one university, persist the record, and emit it as JSON.
pub async fn run(
    config: &UnigenConfig,
    name: &str,
    output: Option<&Path>,
) -> Result<(), UnigenError> {
    let db = Database::open(Path::new(&config.cache.database_path)).await?;
    let purged = db.result_cache().purge_stale(config.cache.max_age_days).await?;
    if purged > 0 {
        info!(purged, "stale cache entries removed");
    }
    let resolver = build_resolver(config, &db).await?;

    let resolved = resolver.resolve_university(name).await?;
    db.record_store().save(&resolved.university).await?;
    info!(
        university = %resolved.university.university_name,
        attributes = resolved.provenance.len(),
        "record saved"
    );

    let json = render(&resolved)?;
    match output {
        Some(path) => std::fs::write(path, json.as_bytes()).map_err(|e| {
            UnigenError::Internal(format!("cannot write {}: {e}", path.display()))
        })?,
        None => println!("{json}"),
    }
    Ok(())
}

/// The record plus provenance, pretty-printed.
pub fn render(resolved: &ResolvedUniversity) -> Result<String, UnigenError> {
    let body = serde_json::json!({
        "university": resolved.university,
        "provenance": resolved.provenance,
    });
    serde_json::to_string_pretty(&body)
        .map_err(|e| UnigenError::Internal(format!("cannot serialize record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use unigen_core::University;

    #[test]
    fn render_includes_record_and_provenance() {
        let resolved = ResolvedUniversity {
            university: University::named("University of Toronto"),
            provenance: BTreeMap::new(),
        };
        let json = render(&resolved).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed["university"]["university_name"],
            "University of Toronto"
        );
        assert!(parsed["provenance"].is_object());
    }
}
