// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search backends for search-augmented attribute retrieval.
//!
//! Tavily is preferred because it returns extracted page content; Google
//! Custom Search is the snippet-only fallback. Which one is active depends
//! on which keys the configuration carries.

mod google;
mod tavily;
pub mod types;

pub use google::GoogleSearchClient;
pub use tavily::TavilyClient;
pub use types::{hits_to_context, SearchHit};

use tracing::info;
use unigen_config::{GoogleConfig, TavilyConfig};
use unigen_core::UnigenError;

/// The configured search provider, if any.
#[derive(Debug, Clone)]
pub enum SearchProvider {
    Tavily(TavilyClient),
    Google(GoogleSearchClient),
}

impl SearchProvider {
    /// Picks a provider from configuration. Tavily wins when both are set.
    ///
    /// Returns `None` when no search keys are configured, which disables the
    /// search-augmented handler entirely.
    pub fn from_config(
        tavily: &TavilyConfig,
        google: &GoogleConfig,
    ) -> Result<Option<Self>, UnigenError> {
        if let Some(key) = tavily.api_key.as_deref() {
            info!("search provider: tavily");
            return Ok(Some(Self::Tavily(TavilyClient::new(
                key,
                tavily.max_results,
            )?)));
        }
        if let (Some(key), Some(cse_id)) = (google.api_key.as_deref(), google.cse_id.as_deref()) {
            info!("search provider: google");
            return Ok(Some(Self::Google(GoogleSearchClient::new(key, cse_id)?)));
        }
        Ok(None)
    }

    /// Provider name for logging and quota accounting.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tavily(_) => "tavily",
            Self::Google(_) => "google",
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, UnigenError> {
        match self {
            Self::Tavily(client) => client.search(query).await,
            Self::Google(client) => client.search(query).await,
        }
    }
}
