// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the unigen pipeline: the per-handler result cache,
//! assembled university records, and the provider usage ledger.
//!
//! One background connection serves all three facades; every write funnels
//! through it, which is the concurrency discipline the whole pipeline relies
//! on.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
pub use queries::ledger::{DayUsage, UsageLedger};
pub use queries::records::RecordStore;
pub use queries::results::{CachedResult, ResultCache, fingerprint};
