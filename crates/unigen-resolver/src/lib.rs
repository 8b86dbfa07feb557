// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribute resolution: registry, handler chain, and assembly.
//!
//! `build_resolver` wires every configured backend into a `Resolver`;
//! unconfigured backends (no search key, no OpenAI key) simply leave their
//! handler out of the chain and resolution falls through past them.

mod assemble;
mod chain;
mod handlers;
mod registry;

pub use assemble::{ResolvedUniversity, Resolver};
pub use chain::{accept_value, HandlerChain, ResolvedAttribute};
pub use handlers::{
    GptGeneralHandler, RankingTableHandler, SearchRetrievalHandler, TuitionCrawlHandler,
};
pub use registry::default_registry;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use unigen_config::UnigenConfig;
use unigen_core::{AttributeHandler, UnigenError};
use unigen_crawler::{PageFetcher, TuitionScraper};
use unigen_openai::OpenAiBackend;
use unigen_quota::QuotaTracker;
use unigen_rankings::RankingStore;
use unigen_search::SearchProvider;
use unigen_storage::Database;

/// Builds a resolver with every handler the configuration supports.
pub async fn build_resolver(
    config: &UnigenConfig,
    db: &Database,
) -> Result<Resolver, UnigenError> {
    let ledger = db.usage_ledger();
    let quota = Arc::new(Mutex::new(
        QuotaTracker::from_ledger(config.quota.clone(), &ledger).await?,
    ));

    let mut handlers: Vec<Arc<dyn AttributeHandler>> = Vec::new();

    let rankings = RankingStore::load(config.rankings.data_dir.clone())?;
    if rankings.is_empty() {
        info!("no ranking data, table handler disabled");
    } else {
        handlers.push(Arc::new(RankingTableHandler::new(Arc::new(rankings))));
    }

    let fetcher = PageFetcher::new(&config.crawler)?;
    let scraper = TuitionScraper::new(fetcher, &config.crawler)?;
    handlers.push(Arc::new(TuitionCrawlHandler::new(scraper)));

    let openai = match config.openai.api_key {
        Some(_) => Some(OpenAiBackend::new(config.openai.clone())?),
        None => {
            info!("no OpenAI key, LLM handlers disabled");
            None
        }
    };

    if let Some(backend) = &openai {
        if let Some(search) = SearchProvider::from_config(&config.tavily, &config.google)? {
            handlers.push(Arc::new(SearchRetrievalHandler::new(
                search,
                backend.clone(),
                Arc::clone(&quota),
                ledger.clone(),
            )));
        }
        handlers.push(Arc::new(GptGeneralHandler::new(
            backend.clone(),
            Arc::clone(&quota),
            ledger.clone(),
        )));
    }

    let chain = Arc::new(HandlerChain::new(
        handlers,
        db.result_cache(),
        config.cache.max_age_days,
        std::time::Duration::from_secs(config.resolver.handler_timeout_secs),
    ));

    Ok(Resolver::new(
        chain,
        default_registry(),
        openai,
        quota,
        ledger,
        db.result_cache(),
        config.cache.max_age_days,
        config.resolver.max_concurrent,
    ))
}
