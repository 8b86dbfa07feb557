// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the unigen university-info pipeline.
//!
//! This crate provides the error type, domain types (university records,
//! attribute specs, handler outcomes), and the [`AttributeHandler`] trait
//! that all resolution backends implement.

pub mod error;
pub mod handler;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::UnigenError;
pub use handler::AttributeHandler;
pub use types::{
    AttributeFormat, AttributeRequest, AttributeSpec, AttributeValue, BasicInfo, HandlerKind,
    HandlerOutcome, Provenance, University,
};
