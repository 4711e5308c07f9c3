//! Extraction rules: turn a fetched HTML document into result URLs.
//!
//! Each module provides a parser for one endpoint whose markup is known
//! well enough to target organic results precisely; every other endpoint
//! falls back to [`generic`], which collects all absolute links. Rules
//! are resolved per endpoint identifier through [`ExtractRule`], so one
//! provider's markup change breaks only that provider's rule.

pub mod bing;
pub mod duckduckgo;
pub mod generic;
pub mod google;

use crate::error::DispatchError;

/// Maximum number of result URLs per endpoint. Truncation happens after
/// extraction, preserving document order.
pub const MAX_RESULT_URLS: usize = 20;

/// Extraction strategy for one endpoint, resolved by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractRule {
    /// Google result blocks: first `http` anchor per `div.g` container,
    /// with redirect/cache/account/search-echo links excluded.
    GoogleBlocks,
    /// Bing result list items: the anchor nested in each item's first
    /// heading.
    BingHeadings,
    /// DuckDuckGo result containers: the anchor carrying the
    /// `result__url` class marker.
    DuckDuckGoMarked,
    /// Every absolute anchor in the document, in document order.
    Generic,
}

impl ExtractRule {
    /// Resolve the rule for an endpoint identifier.
    ///
    /// Exact matches select a specialized rule; all other identifiers
    /// use the generic fallback, so every endpoint yields *some* result
    /// set without bespoke tuning.
    pub fn for_endpoint(id: &str) -> Self {
        match id {
            "google" => Self::GoogleBlocks,
            "bing" => Self::BingHeadings,
            "duckduckgo" => Self::DuckDuckGoMarked,
            _ => Self::Generic,
        }
    }

    /// Extract result URLs from an HTML document, capped at
    /// [`MAX_RESULT_URLS`].
    ///
    /// Zero matching anchors yields an empty sequence, which is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unexpected`] if a selector fails to
    /// parse (static selectors, defensive only).
    pub fn extract(&self, html: &str) -> Result<Vec<String>, DispatchError> {
        let mut urls = match self {
            Self::GoogleBlocks => google::extract(html),
            Self::BingHeadings => bing::extract(html),
            Self::DuckDuckGoMarked => duckduckgo::extract(html),
            Self::Generic => generic::extract(html),
        }?;
        urls.truncate(MAX_RESULT_URLS);
        Ok(urls)
    }
}

/// Parse a CSS selector, mapping failure onto the dispatch taxonomy.
pub(crate) fn selector(css: &str) -> Result<scraper::Selector, DispatchError> {
    scraper::Selector::parse(css)
        .map_err(|e| DispatchError::Unexpected(format!("invalid selector \"{css}\": {e:?}")))
}
