// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Custom Search fallback client.
//!
//! Used when Tavily is unconfigured or its quota is exhausted. Returns
//! snippets only, no extracted content.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use unigen_core::UnigenError;

use crate::types::SearchHit;

const API_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Client for the Google Custom Search JSON API.
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    client: reqwest::Client,
    api_key: String,
    cse_id: String,
    base_url: String,
}

impl GoogleSearchClient {
    pub fn new(api_key: &str, cse_id: &str) -> Result<Self, UnigenError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| UnigenError::Search {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, UnigenError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| UnigenError::Search {
                message: format!("Google CSE request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, query, "Google CSE response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UnigenError::Search {
                message: format!("Google CSE returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: CseResponse = response.json().await.map_err(|e| UnigenError::Search {
            message: format!("failed to parse Google CSE response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                content: item.snippet,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_maps_items_to_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("key", "g-key"))
            .and(query_param("cx", "cse-123"))
            .and(query_param("q", "UBC admission average"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"title": "Admissions", "link": "https://ubc.ca/admissions", "snippet": "Average of 85%"}
                ]
            })))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new("g-key", "cse-123")
            .unwrap()
            .with_base_url(server.uri());
        let hits = client.search("UBC admission average").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://ubc.ca/admissions");
        assert_eq!(hits[0].content, "Average of 85%");
    }

    #[tokio::test]
    async fn search_with_no_items_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new("k", "c")
            .unwrap()
            .with_base_url(server.uri());
        assert!(client.search("nothing").await.unwrap().is_empty());
    }
}
