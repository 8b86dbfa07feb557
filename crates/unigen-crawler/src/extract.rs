// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML reduction helpers: page text and outgoing links.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']([^"'#]+)["']"#).expect("static regex")
});

/// Reduces an HTML document to readable plain text.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 100).unwrap_or_default()
}

/// Extracts absolute `http(s)` links from an HTML document.
///
/// Relative hrefs are resolved against `base`. Fragments, mailto and
/// javascript pseudo-links are dropped.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let mut links = Vec::new();
    for captures in HREF_RE.captures_iter(html) {
        let href = captures[1].trim();
        if href.is_empty()
            || href.starts_with("mailto:")
            || href.starts_with("javascript:")
            || href.starts_with("tel:")
        {
            continue;
        }
        match base.join(href) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => links.push(url),
            Ok(_) => {}
            Err(e) => debug!(href, error = %e, "skipping unparsable link"),
        }
    }
    links
}

/// Extracts `<a href>(text)</a>` pairs, for matching links by their label.
pub fn extract_labelled_links(html: &str, base: &Url) -> Vec<(String, Url)> {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*["']([^"'#]+)["'][^>]*>(.*?)</a>"#)
            .expect("static regex")
    });
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

    let mut out = Vec::new();
    for captures in LINK_RE.captures_iter(html) {
        let href = captures[1].trim();
        let label = TAG_RE.replace_all(&captures[2], " ");
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
        if label.is_empty() {
            continue;
        }
        if let Ok(url) = base.join(href)
            && matches!(url.scheme(), "http" | "https")
        {
            out.push((label, url));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.ca/dir/page.html").unwrap()
    }

    #[test]
    fn text_strips_markup() {
        let text = html_to_text("<html><body><h1>Fees</h1><p>Domestic: $6,100</p></body></html>");
        assert!(text.contains("Fees"));
        assert!(text.contains("Domestic: $6,100"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn links_resolve_relative_hrefs() {
        let html = r#"<a href="../about">About</a> <a href="https://other.example/x">X</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].as_str(), "https://example.ca/about");
        assert_eq!(links[1].as_str(), "https://other.example/x");
    }

    #[test]
    fn links_skip_pseudo_schemes() {
        let html = r#"<a href="mailto:a@b.c">mail</a><a href="javascript:void(0)">js</a>"#;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn labelled_links_flatten_nested_markup() {
        let html = r#"<a class="uni" href="/universities/u-of-t/"><span>University of</span> Toronto</a>"#;
        let links = extract_labelled_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "University of Toronto");
        assert_eq!(links[0].1.as_str(), "https://example.ca/universities/u-of-t/");
    }
}
