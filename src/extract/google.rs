//! Google result extraction — result-block containers with link filtering.
//!
//! Google wraps organic results in `div.g` blocks but mixes in redirect,
//! cache, account, and search-refinement links that are not results.
//! The rule takes the first plain `http` anchor per block and drops
//! anything matching the known non-result patterns.

use crate::error::DispatchError;
use crate::extract::selector;
use scraper::Html;

/// Href substrings that mark internal Google plumbing, not organic results.
const NON_RESULT_PATTERNS: &[&str] = &[
    "google.com/url",
    "webcache.googleusercontent.com",
    "accounts.google.com",
    "policies.google.com",
    "support.google.com",
    "google.com/search",
];

/// Extract organic result URLs from a Google results page.
pub(crate) fn extract(html: &str) -> Result<Vec<String>, DispatchError> {
    let document = Html::parse_document(html);

    // Google uses div.g containers for organic search results.
    let block_sel = selector("div.g")?;
    let anchor_sel = selector("a[href]")?;

    let mut urls = Vec::new();

    for block in document.select(&block_sel) {
        let href = block
            .select(&anchor_sel)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.starts_with("http"));

        let href = match href {
            Some(h) => h,
            None => continue,
        };

        if is_non_result(href) {
            continue;
        }

        urls.push(href.to_string());
    }

    tracing::debug!(count = urls.len(), "Google results extracted");
    Ok(urls)
}

/// Whether an href points at Google plumbing rather than a result.
fn is_non_result(href: &str) -> bool {
    NON_RESULT_PATTERNS.iter().any(|p| href.contains(p))
}
