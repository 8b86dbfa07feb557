// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unigen batch` command implementation.
//!
//! Resolves a list of universities sequentially (attribute-level concurrency
//! already runs inside each resolution) and emits one JSON record per line.
//! A failed university is logged and skipped, never fatal for the batch.

use std::io::Write;
use std::path::Path;

use tracing::{error, info};
use unigen_config::UnigenConfig;
use unigen_core::UnigenError;
use unigen_resolver::build_resolver;
use unigen_storage::Database;

/// Parse the batch input: one name per line, blanks and `#` comments skipped.
pub fn parse_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn run(
    config: &UnigenConfig,
    file: &Path,
    output: Option<&Path>,
) -> Result<(), UnigenError> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        UnigenError::Internal(format!("cannot read {}: {e}", file.display()))
    })?;
    let names = parse_names(&contents);
    if names.is_empty() {
        return Err(UnigenError::Internal(format!(
            "{} lists no universities",
            file.display()
        )));
    }

    let db = Database::open(Path::new(&config.cache.database_path)).await?;
    let purged = db.result_cache().purge_stale(config.cache.max_age_days).await?;
    if purged > 0 {
        info!(purged, "stale cache entries removed");
    }
    let resolver = build_resolver(config, &db).await?;

    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path).map_err(|e| {
            UnigenError::Internal(format!("cannot create {}: {e}", path.display()))
        })?),
        None => Box::new(std::io::stdout()),
    };

    let total = names.len();
    let mut resolved_count = 0usize;
    for (index, name) in names.iter().enumerate() {
        info!(name, position = index + 1, total, "resolving");
        match resolver.resolve_university(name).await {
            Ok(resolved) => {
                db.record_store().save(&resolved.university).await?;
                let line = serde_json::to_string(&resolved.university).map_err(|e| {
                    UnigenError::Internal(format!("cannot serialize record: {e}"))
                })?;
                writeln!(sink, "{line}").map_err(|e| {
                    UnigenError::Internal(format!("cannot write output: {e}"))
                })?;
                resolved_count += 1;
            }
            Err(e) => {
                error!(name, error = %e, "resolution failed, skipping");
            }
        }
    }

    info!(resolved = resolved_count, total, "batch finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_skips_blanks_and_comments() {
        let input = "University of Toronto\n\n# a comment\n  UBC  \n";
        assert_eq!(parse_names(input), vec!["University of Toronto", "UBC"]);
    }

    #[test]
    fn parse_names_of_empty_input_is_empty() {
        assert!(parse_names("\n# only comments\n").is_empty());
    }
}
