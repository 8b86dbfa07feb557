// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tuition lookup against universitystudy.ca.
//!
//! The site lists every Canadian university on one index page; each
//! university page carries a "TUITION FEES" section with the undergraduate
//! domestic figure first and the international figure second.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use unigen_config::CrawlerConfig;
use unigen_core::UnigenError;
use url::Url;

use crate::extract::{extract_labelled_links, html_to_text};
use crate::fetch::PageFetcher;
use crate::loader::recursive_load;

static FEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+(?:\.\d{2})?").expect("static regex"));

/// Undergraduate tuition figures scraped from a university page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuitionFees {
    pub domestic: String,
    pub international: String,
    /// The page the figures were taken from.
    pub source_url: Url,
}

/// Scraper bound to one index page.
pub struct TuitionScraper {
    fetcher: PageFetcher,
    index_url: Url,
    max_depth: usize,
    max_pages: usize,
}

impl TuitionScraper {
    pub fn new(fetcher: PageFetcher, config: &CrawlerConfig) -> Result<Self, UnigenError> {
        let index_url = Url::parse(&config.tuition_index_url).map_err(|e| {
            UnigenError::Crawler {
                message: format!(
                    "invalid tuition index URL '{}': {e}",
                    config.tuition_index_url
                ),
                source: Some(Box::new(e)),
            }
        })?;
        Ok(Self {
            fetcher,
            index_url,
            max_depth: config.max_depth,
            max_pages: config.max_pages,
        })
    }

    /// Finds the fee figures for the named university.
    ///
    /// Returns `Ok(None)` when the university is not listed on the index or
    /// its page carries no recognizable fee section.
    pub async fn fetch_tuition(
        &self,
        university_name: &str,
    ) -> Result<Option<TuitionFees>, UnigenError> {
        let index_html = self.fetcher.fetch(&self.index_url).await?;
        let Some(page_url) = find_university_link(&index_html, &self.index_url, university_name)
        else {
            debug!(university_name, "not listed on tuition index");
            return Ok(None);
        };

        // The landing page almost always carries the fee section; crawl
        // deeper only when it does not.
        let page_html = self.fetcher.fetch(&page_url).await?;
        if let Some((domestic, international)) = extract_fees(&html_to_text(&page_html)) {
            return Ok(Some(TuitionFees {
                domestic,
                international,
                source_url: page_url,
            }));
        }

        let pages =
            recursive_load(&self.fetcher, &page_url, self.max_depth, self.max_pages).await?;
        for page in pages.into_iter().skip(1) {
            if let Some((domestic, international)) = extract_fees(&page.text) {
                return Ok(Some(TuitionFees {
                    domestic,
                    international,
                    source_url: page.url,
                }));
            }
        }

        warn!(university_name, url = %page_url, "no tuition section found");
        Ok(None)
    }
}

/// Matches the university's link on the index page by label.
///
/// The label must contain the query (or the query the label),
/// case-insensitively. The shortest matching label wins, so
/// "University of Toronto" is not shadowed by
/// "University of Toronto Mississauga".
fn find_university_link(index_html: &str, base: &Url, university_name: &str) -> Option<Url> {
    let needle = university_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    extract_labelled_links(index_html, base)
        .into_iter()
        .filter(|(label, _)| {
            let label = label.to_lowercase();
            label.contains(&needle) || needle.contains(&label)
        })
        .min_by_key(|(label, _)| label.len())
        .map(|(_, url)| url)
}

/// Pulls the first two dollar figures after the "TUITION FEES" heading.
fn extract_fees(page_text: &str) -> Option<(String, String)> {
    // ASCII-only uppercasing keeps byte offsets valid for slicing below.
    let upper = page_text.to_ascii_uppercase();
    let section_start = upper.find("TUITION FEES")?;
    let section = &page_text[section_start..];

    let mut fees = FEE_RE.find_iter(section).map(|m| m.as_str().to_string());
    let domestic = fees.next()?;
    let international = fees.next()?;
    Some((domestic, international))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unigen_config::CrawlerConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UNI_PAGE: &str = r#"
        <html><body>
        <h1>University of Toronto</h1>
        <h2>TUITION FEES</h2>
        <p>Estimated tuition fees for undergraduate programs:</p>
        <span>Canadian students: $6,100</span>
        <span>International students: $58,160</span>
        </body></html>
    "#;

    fn scraper(index_url: &str) -> TuitionScraper {
        let config = CrawlerConfig {
            tuition_index_url: index_url.to_string(),
            max_depth: 1,
            max_pages: 5,
            ..CrawlerConfig::default()
        };
        let fetcher = PageFetcher::new(&config).unwrap().allow_private_hosts();
        TuitionScraper::new(fetcher, &config).unwrap()
    }

    #[tokio::test]
    async fn fetch_tuition_resolves_index_link_and_fees() {
        let server = MockServer::start().await;
        let index = r#"
            <a href="/canadian-universities/university-of-toronto/">University of Toronto</a>
            <a href="/canadian-universities/university-of-toronto-mississauga/">University of Toronto Mississauga</a>
        "#;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(index))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/university-of-toronto/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(UNI_PAGE))
            .mount(&server)
            .await;

        let fees = scraper(&format!("{}/canadian-universities/", server.uri()))
            .fetch_tuition("University of Toronto")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fees.domestic, "$6,100");
        assert_eq!(fees.international, "$58,160");
        assert!(fees.source_url.path().ends_with("university-of-toronto/"));
    }

    #[tokio::test]
    async fn fetch_tuition_crawls_deeper_when_landing_page_has_no_fees() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/canadian-universities/uoft/">University of Toronto</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/uoft/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<p>Overview only.</p> <a href="/canadian-universities/uoft/fees/">Fees</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/uoft/fees/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(UNI_PAGE))
            .mount(&server)
            .await;

        let fees = scraper(&format!("{}/canadian-universities/", server.uri()))
            .fetch_tuition("University of Toronto")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fees.domestic, "$6,100");
        assert!(fees.source_url.path().ends_with("/fees/"));
    }

    #[tokio::test]
    async fn fetch_tuition_returns_none_for_unlisted_university() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/canadian-universities/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="/x/">Some Other School</a>"#),
            )
            .mount(&server)
            .await;

        let fees = scraper(&format!("{}/canadian-universities/", server.uri()))
            .fetch_tuition("Phantom University")
            .await
            .unwrap();
        assert!(fees.is_none());
    }

    #[test]
    fn fees_require_the_heading() {
        assert!(extract_fees("Fees: $1,000 and $2,000 but no heading").is_none());
        let (d, i) =
            extract_fees("Intro\nTUITION FEES\nDomestic $6,100 International $58,160").unwrap();
        assert_eq!(d, "$6,100");
        assert_eq!(i, "$58,160");
    }

    #[test]
    fn shortest_label_wins_on_ambiguous_match() {
        let base = Url::parse("https://site.example/").unwrap();
        let html = r#"
            <a href="/utm/">University of Toronto Mississauga</a>
            <a href="/uoft/">University of Toronto</a>
        "#;
        let url = find_university_link(html, &base, "university of toronto").unwrap();
        assert_eq!(url.path(), "/uoft/");
    }
}
