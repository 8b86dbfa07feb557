// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wire types for search backends.

use serde::Deserialize;

/// One search hit, normalized across providers.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Snippet or extracted page content, provider dependent.
    #[serde(default)]
    pub content: String,
}

/// Renders hits into a plain-text context block for prompting.
///
/// Each hit becomes a `[n] title (url)` header followed by its snippet.
pub fn hits_to_context(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("[{}] {} ({})\n{}", i + 1, hit.title, hit.url, hit.content));
    }
    out
}
