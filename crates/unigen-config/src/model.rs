// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the unigen pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level unigen configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UnigenConfig {
    /// Resolver chain and concurrency settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// OpenAI API settings for the LLM fallback handlers.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Tavily search API settings.
    #[serde(default)]
    pub tavily: TavilyConfig,

    /// Google Custom Search settings.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Web crawler limits and identity.
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-provider quota caps.
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Ranking table data location.
    #[serde(default)]
    pub rankings: RankingsConfig,
}

/// Resolver chain and concurrency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Maximum attributes resolved concurrently per university.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Upper bound on a single handler invocation, in seconds.
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            handler_timeout_secs: default_handler_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

fn default_max_concurrent() -> usize {
    4
}

fn default_handler_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` requires the `UNIGEN_OPENAI_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for attribute resolution.
    #[serde(default = "default_model")]
    pub model: String,

    /// Cheaper model used for basic-info lookups.
    #[serde(default = "default_basic_model")]
    pub basic_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            basic_model: default_basic_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_basic_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

/// Tavily search API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TavilyConfig {
    /// Tavily API key. `None` disables search-augmented retrieval.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Number of search results requested per query.
    #[serde(default = "default_tavily_max_results")]
    pub max_results: usize,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: default_tavily_max_results(),
        }
    }
}

fn default_tavily_max_results() -> usize {
    5
}

/// Google Custom Search configuration.
///
/// Both `api_key` and `cse_id` must be set for the backend to activate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// Google API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Custom Search Engine identifier.
    #[serde(default)]
    pub cse_id: Option<String>,
}

/// Web crawler limits and identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Link-following depth for recursive loads.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Total page cap per recursive load.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-page byte cap; larger responses are truncated.
    #[serde(default = "default_max_page_bytes")]
    pub max_page_bytes: usize,

    /// User-Agent header sent with crawler requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Index page listing Canadian universities for the tuition scrape.
    #[serde(default = "default_tuition_index_url")]
    pub tuition_index_url: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            max_page_bytes: default_max_page_bytes(),
            user_agent: default_user_agent(),
            tuition_index_url: default_tuition_index_url(),
        }
    }
}

fn default_max_depth() -> usize {
    2
}

fn default_max_pages() -> usize {
    20
}

fn default_max_page_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/123.0.0.0 Safari/537.36"
        .to_string()
}

fn default_tuition_index_url() -> String {
    "https://universitystudy.ca/canadian-universities/".to_string()
}

/// Result cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Entries older than this many days are treated as misses.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_age_days: default_max_age_days(),
        }
    }
}

fn default_database_path() -> String {
    "unigen.db".to_string()
}

fn default_max_age_days() -> u32 {
    30
}

/// Per-provider daily quota caps. `None` means unlimited.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Daily OpenAI request cap.
    #[serde(default)]
    pub openai_daily_calls: Option<u32>,

    /// Daily OpenAI token budget (prompt + completion).
    #[serde(default)]
    pub openai_daily_tokens: Option<u64>,

    /// Daily Tavily request cap.
    #[serde(default)]
    pub tavily_daily_calls: Option<u32>,

    /// Daily Google Custom Search request cap.
    #[serde(default)]
    pub google_daily_calls: Option<u32>,
}

/// Ranking table data location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingsConfig {
    /// Directory holding the ranking and program CSV files.
    #[serde(default = "default_rankings_dir")]
    pub data_dir: String,
}

impl Default for RankingsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_rankings_dir(),
        }
    }
}

fn default_rankings_dir() -> String {
    "ranking_data".to_string()
}
