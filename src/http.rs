//! Fetcher: one HTTP GET per endpoint with browser-like identification.
//!
//! Provides the [`Fetcher`] trait (the dispatch loop's seam, so tests can
//! drive the loop without a network) and [`HttpFetcher`], the production
//! implementation over a configured [`reqwest::Client`] with rotating
//! User-Agent strings, TLS verification, and a fixed timeout.

use crate::config::DispatchConfig;
use crate::error::DispatchError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Retrieves one endpoint's HTML response body.
///
/// A failure is final for that endpoint in that dispatch — there are no
/// retries. Implementations must be `Send + Sync` so a dispatch can run
/// on a background task.
pub trait Fetcher: Send + Sync {
    /// Perform one GET and return the response body on any 2xx status.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Timeout`] if the deadline elapses
    /// - [`DispatchError::Transport`] for DNS/connection failures and
    ///   non-2xx HTTP statuses
    /// - [`DispatchError::Unexpected`] for anything else (e.g. a body
    ///   that cannot be decoded)
    fn fetch(
        &self,
        url: &str,
        config: &DispatchConfig,
    ) -> impl std::future::Future<Output = Result<String, DispatchError>> + Send;
}

/// Production fetcher over [`reqwest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &DispatchConfig) -> Result<String, DispatchError> {
        tracing::trace!(url, "fetching endpoint");

        let client = build_client(config)?;

        let response = client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| classify(url, config, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Transport(format!(
                "{url} returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(url, config, e))?;

        tracing::trace!(url, bytes = body.len(), "response received");
        Ok(body)
    }
}

/// Build a [`reqwest::Client`] configured for search endpoint scraping.
///
/// The client has:
/// - Cookie store enabled (for consent pages, etc.)
/// - Timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Brotli and gzip decompression, rustls TLS verification
///
/// # Errors
///
/// Returns [`DispatchError::Transport`] if the client cannot be constructed.
pub fn build_client(config: &DispatchConfig) -> Result<reqwest::Client, DispatchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| DispatchError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Map a [`reqwest::Error`] onto the dispatch failure taxonomy.
fn classify(url: &str, config: &DispatchConfig, err: reqwest::Error) -> DispatchError {
    if err.is_timeout() {
        DispatchError::Timeout(format!(
            "{url} timed out after {}s",
            config.timeout_seconds
        ))
    } else if err.is_connect() || err.is_redirect() || err.is_status() || err.is_request() {
        DispatchError::Transport(format!("{url}: {err}"))
    } else {
        DispatchError::Unexpected(format!("{url}: {err}"))
    }
}
