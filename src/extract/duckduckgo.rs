//! DuckDuckGo result extraction — anchors carrying the result-URL marker.
//!
//! The HTML-only DuckDuckGo page wraps results in `.result` containers
//! and marks the canonical result link with the `result__url` class.
//! Hrefs may be protocol-relative; they are normalised to `https`.

use crate::error::DispatchError;
use crate::extract::selector;
use scraper::Html;

/// Extract organic result URLs from a DuckDuckGo results page.
pub(crate) fn extract(html: &str) -> Result<Vec<String>, DispatchError> {
    let document = Html::parse_document(html);

    let container_sel = selector(".result")?;
    let marked_sel = selector("a.result__url")?;

    let mut urls = Vec::new();

    for container in document.select(&container_sel) {
        let href = container
            .select(&marked_sel)
            .next()
            .and_then(|a| a.value().attr("href"));

        let href = match href {
            Some(h) if !h.is_empty() => h,
            _ => continue,
        };

        urls.push(normalise(href));
    }

    tracing::debug!(count = urls.len(), "DuckDuckGo results extracted");
    Ok(urls)
}

/// Make a protocol-relative href absolute.
fn normalise(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    }
}
