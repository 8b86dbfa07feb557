// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `unigen config` command implementation.

use unigen_config::UnigenConfig;
use unigen_core::UnigenError;

const REDACTED: &str = "<redacted>";

/// Print the effective configuration as TOML with API keys redacted.
pub fn run(config: &UnigenConfig) -> Result<(), UnigenError> {
    println!("{}", render(config)?);
    Ok(())
}

pub fn render(config: &UnigenConfig) -> Result<String, UnigenError> {
    let mut shown = config.clone();
    redact(&mut shown.openai.api_key);
    redact(&mut shown.tavily.api_key);
    redact(&mut shown.google.api_key);
    toml::to_string_pretty(&shown)
        .map_err(|e| UnigenError::Internal(format!("cannot render config: {e}")))
}

fn redact(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some(REDACTED.to_string());
    }
}
