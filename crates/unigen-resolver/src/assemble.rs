// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-university assembly: basic info first, then every registered
//! attribute through the handler chain, concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};
use unigen_core::{
    AttributeRequest, AttributeSpec, AttributeValue, BasicInfo, HandlerKind, Provenance,
    UnigenError, University,
};
use unigen_openai::OpenAiBackend;
use unigen_quota::{Provider, QuotaTracker};
use unigen_storage::{fingerprint, ResultCache, UsageLedger};

use crate::chain::HandlerChain;

/// Pseudo-attribute under which basic info is cached.
const BASIC_INFO_ATTRIBUTE: &str = "__basic_info";

/// A fully assembled record with per-attribute provenance.
#[derive(Debug, Clone)]
pub struct ResolvedUniversity {
    pub university: University,
    pub provenance: BTreeMap<String, Provenance>,
}

/// Drives the handler chain across the whole attribute registry.
pub struct Resolver {
    chain: Arc<HandlerChain>,
    registry: Arc<Vec<AttributeSpec>>,
    openai: Option<OpenAiBackend>,
    quota: Arc<Mutex<QuotaTracker>>,
    ledger: UsageLedger,
    cache: ResultCache,
    max_age_days: u32,
    max_concurrent: usize,
}

impl Resolver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<HandlerChain>,
        registry: Vec<AttributeSpec>,
        openai: Option<OpenAiBackend>,
        quota: Arc<Mutex<QuotaTracker>>,
        ledger: UsageLedger,
        cache: ResultCache,
        max_age_days: u32,
        max_concurrent: usize,
    ) -> Self {
        Self {
            chain,
            registry: Arc::new(registry),
            openai,
            quota,
            ledger,
            cache,
            max_age_days,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Resolves the canonical identity of a university, cache first.
    ///
    /// Without an OpenAI backend the alias is taken as the canonical name
    /// and the URL anchors stay empty.
    pub async fn basic_info(&self, alias: &str) -> Result<BasicInfo, UnigenError> {
        let Some(backend) = &self.openai else {
            return Ok(BasicInfo {
                university_name: alias.to_string(),
                ..BasicInfo::default()
            });
        };

        let print = fingerprint(&[alias]);
        if let Some(cached) = self
            .cache
            .lookup(
                alias,
                BASIC_INFO_ATTRIBUTE,
                HandlerKind::GptGeneral,
                &print,
                self.max_age_days,
            )
            .await?
        {
            let info: BasicInfo =
                serde_json::from_str(&cached.value.as_text()).map_err(|e| {
                    UnigenError::Internal(format!("corrupt cached basic info for {alias}: {e}"))
                })?;
            return Ok(info);
        }

        self.quota.lock().await.reserve(Provider::OpenAi)?;
        let (info, usage) = match backend.basic_info(alias).await {
            Ok(out) => out,
            Err(e) => {
                self.quota.lock().await.cancel(Provider::OpenAi);
                return Err(e);
            }
        };
        self.quota
            .lock()
            .await
            .add_tokens(Provider::OpenAi, u64::from(usage.total_tokens));
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.ledger
            .add_usage(&today, Provider::OpenAi.name(), u64::from(usage.total_tokens))
            .await?;

        let value = AttributeValue::Text(serde_json::to_string(&info).map_err(|e| {
            UnigenError::Internal(format!("cannot serialize basic info: {e}"))
        })?);
        self.cache
            .record(
                alias,
                BASIC_INFO_ATTRIBUTE,
                HandlerKind::GptGeneral,
                &print,
                &value,
                &[],
            )
            .await?;
        Ok(info)
    }

    /// Resolves one university end to end.
    pub async fn resolve_university(
        &self,
        alias: &str,
    ) -> Result<ResolvedUniversity, UnigenError> {
        let basic = self.basic_info(alias).await?;
        let name = if basic.university_name.trim().is_empty() {
            alias.to_string()
        } else {
            basic.university_name.clone()
        };
        info!(alias, canonical = %name, "resolving university");

        let mut reference = String::new();
        if !basic.website.is_empty() {
            reference.push_str(&format!("official website: {} ", basic.website));
        }
        if !basic.wikipedia.is_empty() {
            reference.push_str(&format!("wikipedia: {}", basic.wikipedia));
        }
        let reference = reference.trim().to_string();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<Result<(String, Option<crate::chain::ResolvedAttribute>), UnigenError>> =
            JoinSet::new();

        for spec in self.registry.iter().cloned() {
            let chain = Arc::clone(&self.chain);
            let semaphore = Arc::clone(&semaphore);
            let request = AttributeRequest {
                university_name: name.clone(),
                spec,
                reference: reference.clone(),
            };
            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.map_err(|e| {
                    UnigenError::Internal(format!("semaphore closed: {e}"))
                })?;
                let attribute = request.spec.name.clone();
                let resolved = chain.resolve(&request).await?;
                Ok((attribute, resolved))
            });
        }

        let mut university = University::named(&name);
        university.abbreviation = basic.abbreviation;
        university.website = basic.website;
        university.wikipedia = basic.wikipedia;
        let mut provenance = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            let (attribute, resolved) = joined
                .map_err(|e| UnigenError::Internal(format!("attribute task panicked: {e}")))??;
            let Some(resolved) = resolved else {
                info!(university = %name, attribute, "unresolved, leaving blank");
                continue;
            };
            let value = normalize_value(&attribute, resolved.value);
            if !university.set_attribute(&attribute, &value) {
                warn!(attribute, "registry names an unknown record field");
                continue;
            }
            provenance.insert(attribute, resolved.provenance);
        }

        Ok(ResolvedUniversity {
            university,
            provenance,
        })
    }
}

/// Applies the per-attribute merge policy before a value lands in the record.
fn normalize_value(attribute: &str, value: AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::List(items) => {
            let items = if attribute == "ranking" {
                dedup_by_source_label(items)
            } else {
                items
            };
            AttributeValue::List(dedup_case_insensitive(items))
        }
        text => text,
    }
}

/// Keeps one ranking line per source label (the part before ` |`).
fn dedup_by_source_label(lines: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for line in lines {
        let label = line
            .split_once('|')
            .map(|(label, _)| label.trim())
            .unwrap_or(line.trim())
            .to_lowercase();
        if seen.contains(&label) {
            continue;
        }
        seen.push(label);
        out.push(line);
    }
    out
}

/// Case-insensitive dedup, first occurrence wins.
fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let key = item.trim().to_lowercase();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(item);
    }
    out
}
