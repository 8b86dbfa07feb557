// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the unigen pipeline.

use thiserror::Error;

/// The primary error type used across all unigen crates.
#[derive(Debug, Error)]
pub enum UnigenError {
    /// Configuration errors (invalid TOML, missing required fields, missing API keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// Result cache / record store errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, malformed response, token limits).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Search API errors (Tavily, Google Custom Search).
    #[error("search error: {message}")]
    Search {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Crawler errors (fetch failure, oversized page, malformed URL).
    #[error("crawler error: {message}")]
    Crawler {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider quota or budget cap was reached.
    #[error("quota exhausted: {message}")]
    QuotaExhausted { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
