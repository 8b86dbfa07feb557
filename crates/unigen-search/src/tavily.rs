// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tavily search API client.
//!
//! Tavily is the primary retrieval backend. The API takes a POST with the
//! key in the body and returns pre-extracted page content per result.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unigen_core::UnigenError;

use crate::types::SearchHit;

const API_BASE_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Client for the Tavily search API.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    max_results: usize,
    max_retries: u32,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: &str, max_results: usize) -> Result<Self, UnigenError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| UnigenError::Search {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            max_results,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Runs a search query and returns the normalized hits.
    ///
    /// Retries once on transient errors (429, 500, 503) after a 1-second delay.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, UnigenError> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            include_answer: false,
        };

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying Tavily search after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| UnigenError::Search {
                    message: format!("Tavily request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, query, "Tavily response received");

            if status.is_success() {
                let parsed: TavilyResponse =
                    response.json().await.map_err(|e| UnigenError::Search {
                        message: format!("failed to parse Tavily response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(parsed.results);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(UnigenError::Search {
                message: format!("Tavily returned {status}: {body}"),
                source: None,
            });
        }

        Err(UnigenError::Search {
            message: "Tavily search failed after retries".into(),
            source: None,
        })
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
