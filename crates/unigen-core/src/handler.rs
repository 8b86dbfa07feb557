// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The handler trait every resolution backend implements.
//!
//! Uses `#[async_trait]` so the resolver can hold handlers as trait objects
//! and dispatch by [`HandlerKind`].

use async_trait::async_trait;

use crate::error::UnigenError;
use crate::types::{AttributeRequest, HandlerKind, HandlerOutcome};

/// A resolution strategy for university attributes.
///
/// Implementations answer with [`HandlerOutcome::Unavailable`] when they have
/// nothing for an input; `Err` is reserved for transport and configuration
/// failures the chain should log.
#[async_trait]
pub trait AttributeHandler: Send + Sync + 'static {
    /// The kind this handler registers under in attribute specs.
    fn kind(&self) -> HandlerKind;

    /// Attempt to resolve one attribute for one university.
    async fn resolve(&self, request: &AttributeRequest) -> Result<HandlerOutcome, UnigenError>;
}
