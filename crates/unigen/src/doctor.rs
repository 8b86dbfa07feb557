// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unigen doctor` command implementation.
//!
//! Runs quick environment checks: key presence, database openability,
//! ranking data. Fails the process when any check fails outright.

use std::path::Path;
use std::time::Instant;

use unigen_config::UnigenConfig;
use unigen_core::UnigenError;
use unigen_rankings::RankingStore;
use unigen_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    fn symbol(self) -> &'static str {
        match self {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        }
    }
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

pub async fn run(config: &UnigenConfig) -> Result<(), UnigenError> {
    let started = Instant::now();
    let results = vec![
        check_openai(config),
        check_search(config),
        check_database(config).await,
        check_rankings(config),
    ];

    println!();
    println!("  unigen doctor");
    println!("  {}", "-".repeat(50));
    let mut failed = 0;
    for result in &results {
        println!("  [{:>4}] {:<16} {}", result.status.symbol(), result.name, result.message);
        if result.status == CheckStatus::Fail {
            failed += 1;
        }
    }
    println!("  {}", "-".repeat(50));
    println!(
        "  {} checks, {} failed ({} ms)",
        results.len(),
        failed,
        started.elapsed().as_millis()
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn check_openai(config: &UnigenConfig) -> CheckResult {
    match &config.openai.api_key {
        Some(_) => CheckResult {
            name: "openai",
            status: CheckStatus::Pass,
            message: format!("key set, model {}", config.openai.model),
        },
        None => CheckResult {
            name: "openai",
            status: CheckStatus::Fail,
            message: "no API key; LLM handlers disabled (set UNIGEN_OPENAI_API_KEY)".into(),
        },
    }
}

fn check_search(config: &UnigenConfig) -> CheckResult {
    let tavily = config.tavily.api_key.is_some();
    let google = config.google.api_key.is_some() && config.google.cse_id.is_some();
    let (status, message) = if tavily {
        (CheckStatus::Pass, "tavily configured".to_string())
    } else if google {
        (CheckStatus::Pass, "google custom search configured".to_string())
    } else {
        (
            CheckStatus::Warn,
            "no search keys; search-augmented retrieval disabled".to_string(),
        )
    };
    CheckResult {
        name: "search",
        status,
        message,
    }
}

async fn check_database(config: &UnigenConfig) -> CheckResult {
    match Database::open(Path::new(&config.cache.database_path)).await {
        Ok(db) => {
            let saved = db
                .record_store()
                .list_names()
                .await
                .map(|names| names.len())
                .unwrap_or(0);
            CheckResult {
                name: "database",
                status: CheckStatus::Pass,
                message: format!("{} ({saved} saved records)", config.cache.database_path),
            }
        }
        Err(e) => CheckResult {
            name: "database",
            status: CheckStatus::Fail,
            message: format!("cannot open {}: {e}", config.cache.database_path),
        },
    }
}

fn check_rankings(config: &UnigenConfig) -> CheckResult {
    match RankingStore::load(config.rankings.data_dir.clone()) {
        Ok(store) if store.is_empty() => CheckResult {
            name: "ranking data",
            status: CheckStatus::Warn,
            message: format!(
                "{} holds no tables; ranking handler disabled",
                config.rankings.data_dir
            ),
        },
        Ok(_) => CheckResult {
            name: "ranking data",
            status: CheckStatus::Pass,
            message: config.rankings.data_dir.clone(),
        },
        Err(e) => CheckResult {
            name: "ranking data",
            status: CheckStatus::Fail,
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_openai_key_fails_the_check() {
        let config = UnigenConfig::default();
        assert_eq!(check_openai(&config).status, CheckStatus::Fail);
    }

    #[test]
    fn search_is_a_warning_not_a_failure() {
        let config = UnigenConfig::default();
        assert_eq!(check_search(&config).status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn database_check_passes_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = UnigenConfig::default();
        config.cache.database_path = dir
            .path()
            .join("unigen.db")
            .to_string_lossy()
            .into_owned();
        assert_eq!(check_database(&config).await.status, CheckStatus::Pass);
    }
}
