// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive bounds and paired keys.

use crate::diagnostic::ConfigError;
use crate::model::UnigenConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &UnigenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.resolver.max_concurrent == 0 {
        errors.push(ConfigError::Validation {
            message: "resolver.max_concurrent must be at least 1".to_string(),
        });
    }

    if config.resolver.handler_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "resolver.handler_timeout_secs must be at least 1".to_string(),
        });
    }

    const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LOG_LEVELS.contains(&config.resolver.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "resolver.log_level `{}` is not one of {}",
                config.resolver.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.cache.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.database_path must not be empty".to_string(),
        });
    }

    if config.cache.max_age_days == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.max_age_days must be at least 1".to_string(),
        });
    }

    if config.crawler.max_pages == 0 {
        errors.push(ConfigError::Validation {
            message: "crawler.max_pages must be at least 1".to_string(),
        });
    }

    // Depth beyond 5 turns a site load into a site mirror.
    if config.crawler.max_depth > 5 {
        errors.push(ConfigError::Validation {
            message: format!(
                "crawler.max_depth must be at most 5, got {}",
                config.crawler.max_depth
            ),
        });
    }

    if config.crawler.max_page_bytes < 4096 {
        errors.push(ConfigError::Validation {
            message: format!(
                "crawler.max_page_bytes must be at least 4096, got {}",
                config.crawler.max_page_bytes
            ),
        });
    }

    if config.tavily.max_results == 0 || config.tavily.max_results > 20 {
        errors.push(ConfigError::Validation {
            message: format!(
                "tavily.max_results must be between 1 and 20, got {}",
                config.tavily.max_results
            ),
        });
    }

    // Google CSE needs both halves of the credential or neither.
    if config.google.api_key.is_some() != config.google.cse_id.is_some() {
        errors.push(ConfigError::Validation {
            message: "google.api_key and google.cse_id must be set together".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&UnigenConfig::default()).is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = UnigenConfig::default();
        config.resolver.max_concurrent = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("max_concurrent")));
    }

    #[test]
    fn rejects_half_configured_google() {
        let mut config = UnigenConfig::default();
        config.google.api_key = Some("key".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("cse_id"));
    }

    #[test]
    fn collects_all_errors_instead_of_failing_fast() {
        let mut config = UnigenConfig::default();
        config.resolver.max_concurrent = 0;
        config.cache.database_path = "  ".to_string();
        config.crawler.max_depth = 9;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
