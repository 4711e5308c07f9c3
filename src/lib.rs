//! # omnisearch
//!
//! Fan-out web search dispatcher: one query across a large, user-editable
//! registry of search endpoints — no API keys, no external services.
//!
//! This crate takes a query and a registry of endpoint URL templates,
//! fetches each endpoint's HTML response sequentially with a pacing delay,
//! extracts result URLs using endpoint-specific or generic rules, and
//! returns one outcome record per endpoint. The interactive front end,
//! registry file management, and result presentation are external
//! collaborators; this crate is the dispatch-and-extraction engine.
//!
//! ## Design
//!
//! - Endpoints are registered as URL templates with a `{query}` marker,
//!   validated on load
//! - A small set of well-known endpoints get bespoke CSS-selector
//!   extraction rules; everything else falls back to collecting all
//!   absolute links
//! - Endpoints are visited strictly sequentially with a fixed pacing
//!   delay — deliberate throttling, not a missing feature
//! - One endpoint's failure never aborts the batch: failures become
//!   Error-status records and the loop continues
//! - At most one batch (or registry edit) runs per dispatcher instance
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners — this is a library, not a server
//! - Search queries are logged only at trace/debug level
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> omnisearch::Result<()> {
//! use omnisearch::{Dispatcher, EndpointSelection};
//!
//! let dispatcher = Dispatcher::with_defaults();
//! let batch = dispatcher
//!     .dispatch("rust programming", EndpointSelection::All)
//!     .await?;
//! for record in &batch {
//!     println!("{} [{}]: {}", record.endpoint, record.status, record.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod http;
pub mod registry;
pub mod template;
pub mod types;

pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, RegistryEdit};
pub use error::{DispatchError, Result};
pub use extract::{ExtractRule, MAX_RESULT_URLS};
pub use http::{Fetcher, HttpFetcher};
pub use registry::EndpointRegistry;
pub use types::{DispatchBatch, EndpointSelection, RecordStatus, ResultRecord};
