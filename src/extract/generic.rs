//! Generic fallback extraction — every absolute link in the document.
//!
//! Used for the long tail of endpoints without a bespoke rule. Noisy
//! (navigation and footer links are included) but it guarantees every
//! endpoint yields *some* result set without per-provider tuning.

use crate::error::DispatchError;
use crate::extract::selector;
use scraper::Html;

/// Extract every anchor whose href starts with an HTTP scheme, in
/// document order, with no further filtering.
pub(crate) fn extract(html: &str) -> Result<Vec<String>, DispatchError> {
    let document = Html::parse_document(html);

    let anchor_sel = selector("a[href]")?;

    let urls: Vec<String> = document
        .select(&anchor_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .map(str::to_string)
        .collect();

    tracing::debug!(count = urls.len(), "generic extraction complete");
    Ok(urls)
}
