//! Bing result extraction — list items with heading-nested anchors.
//!
//! Bing wraps each organic result in an `li.b_algo` item whose first
//! `h2` heading contains the result link.

use crate::error::DispatchError;
use crate::extract::selector;
use scraper::Html;

/// Extract organic result URLs from a Bing results page.
pub(crate) fn extract(html: &str) -> Result<Vec<String>, DispatchError> {
    let document = Html::parse_document(html);

    // Bing uses li.b_algo containers for organic search results.
    let item_sel = selector("li.b_algo")?;
    let heading_sel = selector("h2")?;
    let anchor_sel = selector("a[href]")?;

    let mut urls = Vec::new();

    for item in document.select(&item_sel) {
        let heading = match item.select(&heading_sel).next() {
            Some(h) => h,
            None => continue,
        };

        let href = heading
            .select(&anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"));

        match href {
            Some(h) if !h.is_empty() => urls.push(h.to_string()),
            _ => continue,
        }
    }

    tracing::debug!(count = urls.len(), "Bing results extracted");
    Ok(urls)
}
