// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock attribute handlers for deterministic testing.
//!
//! `MockHandler` implements `AttributeHandler` with pre-scripted outcomes,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use unigen_core::{
    AttributeHandler, AttributeRequest, AttributeValue, HandlerKind, HandlerOutcome, UnigenError,
};

/// A mock handler that returns pre-scripted outcomes.
///
/// Outcomes are popped from a FIFO queue; when the queue runs dry the
/// handler reports `Unavailable`. The calls it received are recorded for
/// assertion.
pub struct MockHandler {
    kind: HandlerKind,
    outcomes: Arc<Mutex<VecDeque<Result<HandlerOutcome, UnigenError>>>>,
    calls: Arc<Mutex<Vec<AttributeRequest>>>,
}

impl MockHandler {
    /// Create a mock handler with an empty outcome queue.
    pub fn new(kind: HandlerKind) -> Self {
        Self {
            kind,
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock handler pre-loaded with the given outcomes.
    pub fn with_outcomes(
        kind: HandlerKind,
        outcomes: Vec<Result<HandlerOutcome, UnigenError>>,
    ) -> Self {
        Self {
            kind,
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shorthand for a handler that always accepts with the given text.
    pub fn accepting(kind: HandlerKind, text: &str) -> Self {
        Self::with_outcomes(
            kind,
            vec![Ok(HandlerOutcome::Accepted {
                value: AttributeValue::Text(text.to_string()),
                references: vec!["https://mock.example/source".to_string()],
            })],
        )
    }

    /// Queue another outcome.
    pub async fn push_outcome(&self, outcome: Result<HandlerOutcome, UnigenError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// The requests this handler has received, in order.
    pub async fn calls(&self) -> Vec<AttributeRequest> {
        self.calls.lock().await.clone()
    }

    /// Number of times the handler was invoked.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl AttributeHandler for MockHandler {
    fn kind(&self) -> HandlerKind {
        self.kind
    }

    async fn resolve(
        &self,
        request: &AttributeRequest,
    ) -> Result<HandlerOutcome, UnigenError> {
        self.calls.lock().await.push(request.clone());
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(HandlerOutcome::Unavailable))
    }
}
