// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The handler chain: cache consultation, ordered fallback, acceptance.
//!
//! For one attribute the chain first consults the result cache, then tries
//! each handler in spec order; the first `Accepted` outcome is written back
//! to the cache and returned. Handler transport errors are logged and
//! treated as `Unavailable` so resolution falls through to the next
//! handler. When everything falls through, the attribute stays unset.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use unigen_core::{
    AttributeHandler, AttributeRequest, AttributeSpec, AttributeValue, HandlerKind,
    HandlerOutcome, Provenance, UnigenError,
};
use unigen_storage::{fingerprint, ResultCache};

/// Answers containing any of these phrases (case-insensitively) are refusals
/// in disguise, not values.
const DENY_PHRASES: [&str; 3] = ["not ranked", "not available", "not know"];

/// Applies the acceptance policy to a raw handler answer.
///
/// Trims, rejects denylist tokens, then parses under the attribute's declared format.
pub fn accept_value(
    spec: &AttributeSpec,
    raw: &str,
    references: Vec<String>,
) -> HandlerOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return HandlerOutcome::Rejected {
            reason: "empty answer".to_string(),
        };
    }

    let lowered = trimmed.to_lowercase();
    if let Some(token) = DENY_PHRASES.iter().find(|token| lowered.contains(*token)) {
        return HandlerOutcome::Rejected {
            reason: format!("answer contains refusal token `{token}`"),
        };
    }
    // Uppercase `N/A` only, so slash-joined text like `Design/Architecture`
    // is not mistaken for a refusal. A bare lowercase `n/a` answer still counts.
    if trimmed.contains("N/A") || trimmed.eq_ignore_ascii_case("n/a") {
        return HandlerOutcome::Rejected {
            reason: "answer contains refusal token `N/A`".to_string(),
        };
    }

    match spec.format.parse(trimmed) {
        Ok(value) => HandlerOutcome::Accepted { value, references },
        Err(reason) => HandlerOutcome::Rejected { reason },
    }
}

/// A resolved attribute with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedAttribute {
    pub value: AttributeValue,
    pub provenance: Provenance,
}

/// Ordered handler fallback backed by the result cache.
pub struct HandlerChain {
    handlers: HashMap<HandlerKind, Arc<dyn AttributeHandler>>,
    cache: ResultCache,
    max_age_days: u32,
    handler_timeout: Duration,
}

impl HandlerChain {
    pub fn new(
        handlers: Vec<Arc<dyn AttributeHandler>>,
        cache: ResultCache,
        max_age_days: u32,
        handler_timeout: Duration,
    ) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|handler| (handler.kind(), handler))
            .collect();
        Self {
            handlers,
            cache,
            max_age_days,
            handler_timeout,
        }
    }

    /// Cache key fingerprint for one request.
    ///
    /// Covers everything that shapes the rendered prompt, so a changed
    /// extra prompt or example invalidates the cached answer.
    fn request_fingerprint(request: &AttributeRequest) -> String {
        let spec = &request.spec;
        fingerprint(&[
            &request.university_name,
            &spec.name,
            &spec.format.to_string(),
            spec.extra_prompt.as_deref().unwrap_or_default(),
            spec.reference.as_deref().unwrap_or_default(),
            spec.example.as_deref().unwrap_or_default(),
            &request.reference,
        ])
    }

    /// Resolve one attribute. `Ok(None)` means every handler fell through.
    pub async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<Option<ResolvedAttribute>, UnigenError> {
        let spec = &request.spec;
        let fingerprint = Self::request_fingerprint(request);

        for kind in &spec.handlers {
            if let Some(cached) = self
                .cache
                .lookup(
                    &request.university_name,
                    &spec.name,
                    *kind,
                    &fingerprint,
                    self.max_age_days,
                )
                .await?
            {
                debug!(
                    university = %request.university_name,
                    attribute = %spec.name,
                    handler = %kind,
                    "cache hit"
                );
                return Ok(Some(ResolvedAttribute {
                    value: cached.value,
                    provenance: Provenance {
                        handler: *kind,
                        references: cached.references,
                        resolved_at: Utc::now(),
                    },
                }));
            }

            let Some(handler) = self.handlers.get(kind) else {
                debug!(handler = %kind, attribute = %spec.name, "handler not configured, skipping");
                continue;
            };

            let outcome = match tokio::time::timeout(self.handler_timeout, handler.resolve(request))
                .await
                .unwrap_or(Err(UnigenError::Timeout {
                    duration: self.handler_timeout,
                }))
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        university = %request.university_name,
                        attribute = %spec.name,
                        handler = %kind,
                        error = %e,
                        "handler failed, falling through"
                    );
                    continue;
                }
            };

            match outcome {
                HandlerOutcome::Accepted { value, references } => {
                    self.cache
                        .record(
                            &request.university_name,
                            &spec.name,
                            *kind,
                            &fingerprint,
                            &value,
                            &references,
                        )
                        .await?;
                    return Ok(Some(ResolvedAttribute {
                        value,
                        provenance: Provenance {
                            handler: *kind,
                            references,
                            resolved_at: Utc::now(),
                        },
                    }));
                }
                HandlerOutcome::Rejected { reason } => {
                    debug!(
                        university = %request.university_name,
                        attribute = %spec.name,
                        handler = %kind,
                        reason,
                        "answer rejected, falling through"
                    );
                }
                HandlerOutcome::Unavailable => {
                    debug!(
                        university = %request.university_name,
                        attribute = %spec.name,
                        handler = %kind,
                        "handler unavailable, falling through"
                    );
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unigen_core::AttributeFormat;
    use unigen_storage::Database;
    use unigen_test_utils::MockHandler;

    fn spec(format: AttributeFormat, handlers: Vec<HandlerKind>) -> AttributeSpec {
        AttributeSpec {
            name: "description".into(),
            format,
            handlers,
            extra_prompt: None,
            reference: None,
            example: None,
        }
    }

    fn request(format: AttributeFormat, handlers: Vec<HandlerKind>) -> AttributeRequest {
        AttributeRequest {
            university_name: "University of Toronto".into(),
            spec: spec(format, handlers),
            reference: String::new(),
        }
    }

    async fn chain_with(handlers: Vec<Arc<dyn AttributeHandler>>) -> (Database, HandlerChain) {
        let db = Database::open_in_memory().await.unwrap();
        let chain = HandlerChain::new(
            handlers,
            db.result_cache(),
            30,
            Duration::from_secs(5),
        );
        (db, chain)
    }

    #[test]
    fn denylist_tokens_are_rejected() {
        let spec = spec(AttributeFormat::Text, vec![HandlerKind::GptGeneral]);
        for raw in ["Not Ranked", "the value is not available", "N/A"] {
            assert!(
                matches!(
                    accept_value(&spec, raw, vec![]),
                    HandlerOutcome::Rejected { .. }
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn slash_joined_text_is_not_a_refusal() {
        let spec = spec(AttributeFormat::TextList, vec![HandlerKind::GptGeneral]);
        let outcome = accept_value(&spec, "Design/Architecture\nEngineering", vec![]);
        assert!(
            matches!(outcome, HandlerOutcome::Accepted { .. }),
            "slash-joined program names must pass: {outcome:?}"
        );
        assert!(matches!(
            accept_value(&spec, "n/a", vec![]),
            HandlerOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn grouped_fee_figure_is_accepted_as_one_number() {
        let spec = spec(AttributeFormat::NumberRange, vec![HandlerKind::TuitionCrawl]);
        match accept_value(&spec, "$6,100", vec![]) {
            HandlerOutcome::Accepted { value, .. } => {
                assert_eq!(value, AttributeValue::Text("6100".into()));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn format_mismatch_is_rejected() {
        let spec = spec(AttributeFormat::Number, vec![HandlerKind::GptGeneral]);
        assert!(matches!(
            accept_value(&spec, "about forty thousand", vec![]),
            HandlerOutcome::Rejected { .. }
        ));
        assert!(matches!(
            accept_value(&spec, "43,500 students", vec![]),
            HandlerOutcome::Accepted { .. }
        ));
    }

    #[tokio::test]
    async fn first_accepted_wins_and_later_handlers_are_not_called() {
        let first = Arc::new(MockHandler::accepting(
            HandlerKind::SearchRetrieval,
            "A large research university.",
        ));
        let second = Arc::new(MockHandler::new(HandlerKind::GptGeneral));
        let (_db, chain) = chain_with(vec![first.clone(), second.clone()]).await;

        let request = request(
            AttributeFormat::Text,
            vec![HandlerKind::SearchRetrieval, HandlerKind::GptGeneral],
        );
        let resolved = chain.resolve(&request).await.unwrap().unwrap();
        assert_eq!(resolved.provenance.handler, HandlerKind::SearchRetrieval);
        assert_eq!(second.call_count().await, 0);
    }

    #[tokio::test]
    async fn rejection_falls_through_to_next_handler() {
        let first = Arc::new(MockHandler::with_outcomes(
            HandlerKind::SearchRetrieval,
            vec![Ok(HandlerOutcome::Rejected {
                reason: "denylist".into(),
            })],
        ));
        let second = Arc::new(MockHandler::accepting(HandlerKind::GptGeneral, "answer"));
        let (_db, chain) = chain_with(vec![first, second]).await;

        let request = request(
            AttributeFormat::Text,
            vec![HandlerKind::SearchRetrieval, HandlerKind::GptGeneral],
        );
        let resolved = chain.resolve(&request).await.unwrap().unwrap();
        assert_eq!(resolved.provenance.handler, HandlerKind::GptGeneral);
    }

    #[tokio::test]
    async fn handler_error_is_swallowed_and_chain_continues() {
        let first = Arc::new(MockHandler::with_outcomes(
            HandlerKind::SearchRetrieval,
            vec![Err(UnigenError::QuotaExhausted {
                message: "daily cap".into(),
            })],
        ));
        let second = Arc::new(MockHandler::accepting(HandlerKind::GptGeneral, "answer"));
        let (_db, chain) = chain_with(vec![first, second]).await;

        let request = request(
            AttributeFormat::Text,
            vec![HandlerKind::SearchRetrieval, HandlerKind::GptGeneral],
        );
        let resolved = chain.resolve(&request).await.unwrap().unwrap();
        assert_eq!(resolved.provenance.handler, HandlerKind::GptGeneral);
    }

    #[tokio::test]
    async fn all_fall_through_leaves_attribute_unset() {
        let only = Arc::new(MockHandler::new(HandlerKind::GptGeneral));
        let (_db, chain) = chain_with(vec![only]).await;

        let request = request(AttributeFormat::Text, vec![HandlerKind::GptGeneral]);
        assert!(chain.resolve(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_run_is_served_from_cache() {
        let handler = Arc::new(MockHandler::accepting(HandlerKind::GptGeneral, "answer"));
        let (_db, chain) = chain_with(vec![handler.clone()]).await;

        let request = request(AttributeFormat::Text, vec![HandlerKind::GptGeneral]);
        chain.resolve(&request).await.unwrap().unwrap();
        let resolved = chain.resolve(&request).await.unwrap().unwrap();
        assert_eq!(resolved.value, AttributeValue::Text("answer".into()));
        assert_eq!(handler.call_count().await, 1);
    }

    #[tokio::test]
    async fn unconfigured_handler_kind_is_skipped() {
        let general = Arc::new(MockHandler::accepting(HandlerKind::GptGeneral, "answer"));
        let (_db, chain) = chain_with(vec![general]).await;

        // TuitionCrawl is listed for the attribute but no such handler is registered.
        let request = request(
            AttributeFormat::Text,
            vec![HandlerKind::TuitionCrawl, HandlerKind::GptGeneral],
        );
        let resolved = chain.resolve(&request).await.unwrap().unwrap();
        assert_eq!(resolved.provenance.handler, HandlerKind::GptGeneral);
    }
}
