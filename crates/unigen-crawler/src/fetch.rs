// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded single-page fetcher.
//!
//! Enforces the per-page byte cap while streaming, so an oversized page
//! never fully lands in memory. URLs with literal private or reserved IP
//! hosts are refused outright.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tracing::{debug, warn};
use unigen_core::UnigenError;
use unigen_config::CrawlerConfig;
use url::{Host, Url};

/// Check if an IP is in a private or reserved range.
///
/// Blocks: RFC 1918, loopback, link-local, broadcast, unspecified, the
/// cloud metadata endpoint, IPv6 loopback, unique-local, link-local.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || *v4 == Ipv4Addr::new(169, 254, 169, 254)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// HTTP fetcher with size and destination guards.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    max_page_bytes: usize,
    block_private: bool,
}

impl PageFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, UnigenError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| UnigenError::Crawler {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            max_page_bytes: config.max_page_bytes,
            block_private: true,
        })
    }

    /// Disables the private-IP guard so tests can target a local mock server.
    #[cfg(test)]
    pub(crate) fn allow_private_hosts(mut self) -> Self {
        self.block_private = false;
        self
    }

    /// Fetches one page as a UTF-8 string, truncated at the byte cap.
    pub async fn fetch(&self, url: &Url) -> Result<String, UnigenError> {
        if self.block_private
            && let Some(Host::Ipv4(ip)) = url.host()
            && is_private_ip(&IpAddr::V4(ip))
        {
            return Err(UnigenError::Crawler {
                message: format!("refusing to fetch private address: {url}"),
                source: None,
            });
        }
        if self.block_private
            && let Some(Host::Ipv6(ip)) = url.host()
            && is_private_ip(&IpAddr::V6(ip))
        {
            return Err(UnigenError::Crawler {
                message: format!("refusing to fetch private address: {url}"),
                source: None,
            });
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| UnigenError::Crawler {
                message: format!("request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnigenError::Crawler {
                message: format!("{url} returned {status}"),
                source: None,
            });
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| UnigenError::Crawler {
            message: format!("reading body of {url} failed: {e}"),
            source: Some(Box::new(e)),
        })? {
            let remaining = self.max_page_bytes.saturating_sub(body.len());
            if remaining == 0 {
                warn!(%url, cap = self.max_page_bytes, "page exceeds byte cap, truncating");
                break;
            }
            let take = remaining.min(chunk.len());
            body.extend_from_slice(&chunk[..take]);
        }

        debug!(%url, bytes = body.len(), "page fetched");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(max_page_bytes: usize) -> PageFetcher {
        let config = CrawlerConfig {
            max_page_bytes,
            ..CrawlerConfig::default()
        };
        PageFetcher::new(&config).unwrap().allow_private_hosts()
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let body = fetcher(4096).fetch(&url).await.unwrap();
        assert_eq!(body, "<html>hello</html>");
    }

    #[tokio::test]
    async fn fetch_truncates_at_byte_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(10_000)))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/big", server.uri())).unwrap();
        let body = fetcher(1024).fetch(&url).await.unwrap();
        assert_eq!(body.len(), 1024);
    }

    #[tokio::test]
    async fn fetch_rejects_private_addresses_when_guarded() {
        let config = CrawlerConfig::default();
        let guarded = PageFetcher::new(&config).unwrap();
        let url = Url::parse("http://169.254.169.254/latest/meta-data/").unwrap();
        let err = guarded.fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("private address"), "got: {err}");
    }

    #[tokio::test]
    async fn fetch_errors_on_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = fetcher(4096).fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("404"), "got: {err}");
    }
}
