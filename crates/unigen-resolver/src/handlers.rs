// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The four concrete attribute handlers.
//!
//! Each wraps one backend crate and normalizes its answer through the
//! shared acceptance policy. Provider-calling handlers reserve a quota slot
//! before every call, refund it when the call fails, and settle the token
//! cost (tracker plus persistent ledger) when it succeeds.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use unigen_core::{
    AttributeHandler, AttributeRequest, HandlerKind, HandlerOutcome, UnigenError,
};
use unigen_crawler::{TuitionFees, TuitionScraper};
use unigen_openai::OpenAiBackend;
use unigen_quota::{Provider, QuotaTracker};
use unigen_rankings::RankingStore;
use unigen_search::{hits_to_context, SearchProvider};
use unigen_storage::UsageLedger;

use crate::chain::accept_value;

/// Run a provider call under a quota reservation.
///
/// The slot is reserved (and counted) before the call starts, so concurrent
/// resolutions cannot slip past the cap while a call is in flight. A failed
/// call hands its slot back.
async fn reserved<T, F>(
    quota: &Mutex<QuotaTracker>,
    provider: Provider,
    call: F,
) -> Result<T, UnigenError>
where
    F: Future<Output = Result<T, UnigenError>>,
{
    quota.lock().await.reserve(provider)?;
    match call.await {
        Ok(value) => Ok(value),
        Err(e) => {
            quota.lock().await.cancel(provider);
            Err(e)
        }
    }
}

/// Settle a reserved call's token cost against the tracker and the ledger.
async fn settle(
    quota: &Mutex<QuotaTracker>,
    ledger: &UsageLedger,
    provider: Provider,
    tokens: u64,
) -> Result<(), UnigenError> {
    quota.lock().await.add_tokens(provider, tokens);
    let today = Utc::now().format("%Y-%m-%d").to_string();
    ledger.add_usage(&today, provider.name(), tokens).await
}

/// Static CSV lookups: the `ranking` and `popular_programs` attributes.
pub struct RankingTableHandler {
    store: Arc<RankingStore>,
}

impl RankingTableHandler {
    pub fn new(store: Arc<RankingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AttributeHandler for RankingTableHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::RankingTable
    }

    async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<HandlerOutcome, UnigenError> {
        let lines = match request.spec.name.as_str() {
            "ranking" => self.store.ranking_lines(&request.university_name),
            "popular_programs" => self.store.programs(&request.university_name),
            _ => return Ok(HandlerOutcome::Unavailable),
        };
        if lines.is_empty() {
            return Ok(HandlerOutcome::Unavailable);
        }
        Ok(accept_value(&request.spec, &lines.join("\n"), Vec::new()))
    }
}

/// The universitystudy.ca tuition scrape, for the two tuition attributes.
///
/// Fees for a university are fetched once per run and memoized, so the
/// domestic and international attributes share one crawl.
pub struct TuitionCrawlHandler {
    scraper: TuitionScraper,
    memo: Mutex<HashMap<String, Option<TuitionFees>>>,
}

impl TuitionCrawlHandler {
    pub fn new(scraper: TuitionScraper) -> Self {
        Self {
            scraper,
            memo: Mutex::new(HashMap::new()),
        }
    }

    async fn fees_for(&self, university_name: &str) -> Result<Option<TuitionFees>, UnigenError> {
        let mut memo = self.memo.lock().await;
        if let Some(fees) = memo.get(university_name) {
            return Ok(fees.clone());
        }
        let fees = self.scraper.fetch_tuition(university_name).await?;
        memo.insert(university_name.to_string(), fees.clone());
        Ok(fees)
    }
}

#[async_trait]
impl AttributeHandler for TuitionCrawlHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::TuitionCrawl
    }

    async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<HandlerOutcome, UnigenError> {
        let pick_international = match request.spec.name.as_str() {
            "domestic_student_tuition" => false,
            "international_student_tuition" => true,
            _ => return Ok(HandlerOutcome::Unavailable),
        };

        let Some(fees) = self.fees_for(&request.university_name).await? else {
            return Ok(HandlerOutcome::Unavailable);
        };
        let raw = if pick_international {
            &fees.international
        } else {
            &fees.domestic
        };
        Ok(accept_value(
            &request.spec,
            raw,
            vec![fees.source_url.to_string()],
        ))
    }
}

/// Search-augmented retrieval: web search context fed to the LLM.
pub struct SearchRetrievalHandler {
    search: SearchProvider,
    backend: OpenAiBackend,
    quota: Arc<Mutex<QuotaTracker>>,
    ledger: UsageLedger,
}

impl SearchRetrievalHandler {
    pub fn new(
        search: SearchProvider,
        backend: OpenAiBackend,
        quota: Arc<Mutex<QuotaTracker>>,
        ledger: UsageLedger,
    ) -> Self {
        Self {
            search,
            backend,
            quota,
            ledger,
        }
    }

    fn search_quota_provider(&self) -> Provider {
        match self.search.name() {
            "tavily" => Provider::Tavily,
            _ => Provider::Google,
        }
    }
}

#[async_trait]
impl AttributeHandler for SearchRetrievalHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::SearchRetrieval
    }

    async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<HandlerOutcome, UnigenError> {
        let search_provider = self.search_quota_provider();
        let query = format!(
            "{} {}",
            request.university_name,
            request.spec.name.replace('_', " ")
        );
        let hits = reserved(&self.quota, search_provider, self.search.search(&query)).await?;
        settle(&self.quota, &self.ledger, search_provider, 0).await?;

        if hits.is_empty() {
            debug!(query, "no search hits");
            return Ok(HandlerOutcome::Unavailable);
        }
        let context = hits_to_context(&hits);

        let (answer, usage) = reserved(
            &self.quota,
            Provider::OpenAi,
            self.backend.attribute(request, Some(&context)),
        )
        .await?;
        settle(
            &self.quota,
            &self.ledger,
            Provider::OpenAi,
            u64::from(usage.total_tokens),
        )
        .await?;

        let references = if answer.reference.is_empty() {
            hits.into_iter().map(|hit| hit.url).collect()
        } else {
            answer.reference.clone()
        };
        Ok(accept_value(&request.spec, &answer.output_text(), references))
    }
}

/// The last-resort handler: the LLM's own knowledge, no retrieval.
pub struct GptGeneralHandler {
    backend: OpenAiBackend,
    quota: Arc<Mutex<QuotaTracker>>,
    ledger: UsageLedger,
}

impl GptGeneralHandler {
    pub fn new(
        backend: OpenAiBackend,
        quota: Arc<Mutex<QuotaTracker>>,
        ledger: UsageLedger,
    ) -> Self {
        Self {
            backend,
            quota,
            ledger,
        }
    }
}

#[async_trait]
impl AttributeHandler for GptGeneralHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::GptGeneral
    }

    async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<HandlerOutcome, UnigenError> {
        let (answer, usage) = reserved(
            &self.quota,
            Provider::OpenAi,
            self.backend.attribute(request, None),
        )
        .await?;
        settle(
            &self.quota,
            &self.ledger,
            Provider::OpenAi,
            u64::from(usage.total_tokens),
        )
        .await?;
        Ok(accept_value(
            &request.spec,
            &answer.output_text(),
            answer.reference,
        ))
    }
}
