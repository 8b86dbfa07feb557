// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the unigen configuration system.

use unigen_config::diagnostic::suggest_key;
use unigen_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_unigen_config() {
    let toml = r#"
[resolver]
max_concurrent = 2
handler_timeout_secs = 30
log_level = "debug"

[openai]
api_key = "sk-test-123"
model = "gpt-4-turbo"
basic_model = "gpt-3.5-turbo"
max_tokens = 512

[tavily]
api_key = "tvly-123"
max_results = 3

[google]
api_key = "g-key"
cse_id = "cse-1"

[crawler]
max_depth = 1
max_pages = 5
max_page_bytes = 65536

[cache]
database_path = "/tmp/unigen-test.db"
max_age_days = 7

[quota]
openai_daily_calls = 200
openai_daily_tokens = 500000
tavily_daily_calls = 100

[rankings]
data_dir = "/opt/unigen/ranking_data"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.resolver.max_concurrent, 2);
    assert_eq!(config.resolver.log_level, "debug");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(config.openai.max_tokens, 512);
    assert_eq!(config.tavily.max_results, 3);
    assert_eq!(config.google.cse_id.as_deref(), Some("cse-1"));
    assert_eq!(config.crawler.max_depth, 1);
    assert_eq!(config.cache.database_path, "/tmp/unigen-test.db");
    assert_eq!(config.cache.max_age_days, 7);
    assert_eq!(config.quota.openai_daily_calls, Some(200));
    assert_eq!(config.quota.openai_daily_tokens, Some(500_000));
    assert_eq!(config.rankings.data_dir, "/opt/unigen/ranking_data");
}

/// Unknown field in a section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_openai_produces_error() {
    let toml = r#"
[openai]
api_kye = "oops"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("api_kye"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.resolver.max_concurrent, 4);
    assert_eq!(config.resolver.log_level, "info");
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.model, "gpt-4-turbo");
    assert_eq!(config.openai.basic_model, "gpt-3.5-turbo");
    assert!(config.tavily.api_key.is_none());
    assert_eq!(config.tavily.max_results, 5);
    assert!(config.google.api_key.is_none());
    assert_eq!(config.crawler.max_depth, 2);
    assert_eq!(config.crawler.max_pages, 20);
    assert!(
        config
            .crawler
            .tuition_index_url
            .contains("universitystudy.ca")
    );
    assert_eq!(config.cache.database_path, "unigen.db");
    assert_eq!(config.cache.max_age_days, 30);
    assert!(config.quota.openai_daily_calls.is_none());
    assert_eq!(config.rankings.data_dir, "ranking_data");
}

/// A later merge layer (standing in for UNIGEN_* env vars) overrides TOML.
#[test]
fn env_layer_overrides_toml_value() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };
    use unigen_config::model::UnigenConfig;

    let config: UnigenConfig = Figment::new()
        .merge(Serialized::defaults(UnigenConfig::default()))
        .merge(Toml::string("[openai]\napi_key = \"sk-from-toml\""))
        .merge(("openai.api_key", "sk-from-env"))
        .merge(("cache.max_age_days", 3))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(config.cache.max_age_days, 3);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };
    use unigen_config::model::UnigenConfig;

    let config: UnigenConfig = Figment::new()
        .merge(Serialized::defaults(UnigenConfig::default()))
        .merge(Toml::file("/nonexistent/path/unigen.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.openai.model, "gpt-4-turbo");
}

/// Validation errors surface through the high-level entry point.
#[test]
fn load_and_validate_str_rejects_semantic_errors() {
    let toml = r#"
[crawler]
max_depth = 9
"#;
    let errors = load_and_validate_str(toml).expect_err("depth 9 should fail validation");
    assert!(errors.iter().any(|e| e.to_string().contains("max_depth")));
}

/// Typo suggestions come from Jaro-Winkler similarity.
#[test]
fn suggest_key_finds_adjacent_typos() {
    let valid = ["database_path", "max_age_days"];
    assert_eq!(
        suggest_key("databse_path", &valid),
        Some("database_path".to_string())
    );
    assert_eq!(suggest_key("completely_different", &valid), None);
}
