// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breadth-first page loader with crawl budgets.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};
use unigen_core::UnigenError;
use url::Url;

use crate::extract::{extract_links, html_to_text};
use crate::fetch::PageFetcher;

/// One crawled page, reduced to text.
#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub url: Url,
    pub text: String,
    pub depth: usize,
}

/// Breadth-first crawl from `start`, following same-host links only.
///
/// Stops at `max_depth` link hops or `max_pages` fetched pages, whichever
/// comes first. Fetch failures on non-root pages are logged and skipped;
/// a failure on the root page is an error.
pub async fn recursive_load(
    fetcher: &PageFetcher,
    start: &Url,
    max_depth: usize,
    max_pages: usize,
) -> Result<Vec<CrawledPage>, UnigenError> {
    let mut pages = Vec::new();
    let mut seen: HashSet<Url> = HashSet::new();
    let mut queue: VecDeque<(Url, usize)> = VecDeque::new();

    seen.insert(start.clone());
    queue.push_back((start.clone(), 0));

    while let Some((url, depth)) = queue.pop_front() {
        if pages.len() >= max_pages {
            debug!(max_pages, "page budget reached, stopping crawl");
            break;
        }

        let html = match fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) if depth == 0 => return Err(e),
            Err(e) => {
                warn!(%url, error = %e, "skipping unreachable page");
                continue;
            }
        };

        if depth < max_depth {
            for link in extract_links(&html, &url) {
                let mut link = link;
                link.set_fragment(None);
                if link.host_str() == start.host_str() && seen.insert(link.clone()) {
                    queue.push_back((link, depth + 1));
                }
            }
        }

        pages.push(CrawledPage {
            text: html_to_text(&html),
            url,
            depth,
        });
    }

    Ok(pages)
}
