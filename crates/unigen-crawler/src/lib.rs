// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded web crawling for attribute retrieval.
//!
//! Three layers: a guarded single-page fetcher, a breadth-first loader with
//! depth/page/byte budgets, and the universitystudy.ca tuition scraper
//! built on top of them.

pub mod extract;
mod fetch;
mod loader;
mod tuition;

pub use fetch::{is_private_ip, PageFetcher};
pub use loader::{recursive_load, CrawledPage};
pub use tuition::{TuitionFees, TuitionScraper};
