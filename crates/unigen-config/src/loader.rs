// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./unigen.toml` > `~/.config/unigen/unigen.toml` >
//! `/etc/unigen/unigen.toml` with environment variable overrides via the
//! `UNIGEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::UnigenConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/unigen/unigen.toml` (system-wide)
/// 3. `~/.config/unigen/unigen.toml` (user XDG config)
/// 4. `./unigen.toml` (local directory)
/// 5. `UNIGEN_*` environment variables
pub fn load_config() -> Result<UnigenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnigenConfig::default()))
        .merge(Toml::file("/etc/unigen/unigen.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("unigen/unigen.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("unigen.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and for callers that supply config text directly.
pub fn load_config_from_str(toml_content: &str) -> Result<UnigenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnigenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<UnigenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UnigenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `UNIGEN_OPENAI_API_KEY` must map to
/// `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    const SECTIONS: [&str; 8] = [
        "resolver", "openai", "tavily", "google", "crawler", "cache", "quota", "rankings",
    ];
    Env::prefixed("UNIGEN_").map(|key| {
        // Example: UNIGEN_OPENAI_API_KEY arrives as "OPENAI_API_KEY".
        let key_str = key.as_str().to_lowercase();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(section)
                && let Some(rest) = rest.strip_prefix('_')
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}
