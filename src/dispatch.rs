//! Dispatch loop: sequential fan-out of one query across endpoints.
//!
//! A [`Dispatcher`] visits the requested endpoints strictly in registry
//! order, resolving the URL, fetching, and extracting for each one, with
//! a pacing delay between fetches. Per-endpoint failures are absorbed
//! into Error-status records so one endpoint can never abort the batch;
//! a batch always completes with one record per requested endpoint.
//!
//! # State machine
//!
//! ```text
//! ┌──────┐  dispatch()        ┌─────────────┐  last endpoint  ┌───────────┐
//! │ Idle ├───────────────────►│ Dispatching ├────────────────►│ Completed │
//! └──▲───┘                    └─────────────┘                 └─────┬─────┘
//!    │                                                              │
//!    └──────────────────────── guard drop ◄─────────────────────────┘
//! ```
//!
//! `dispatch()` and `edit_registry()` are mutually exclusive at the
//! dispatcher-instance granularity: while either is in flight, the other
//! (and a second of the same kind) is rejected synchronously, before any
//! work begins.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::extract::ExtractRule;
use crate::http::{Fetcher, HttpFetcher};
use crate::registry::EndpointRegistry;
use crate::template::build_url;
use crate::types::{DispatchBatch, EndpointSelection, ResultRecord};

/// What a dispatcher instance is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Idle,
    Dispatching,
    Editing,
}

impl Activity {
    fn describe(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dispatching => "a dispatch is already running",
            Self::Editing => "a registry edit is in progress",
        }
    }
}

/// Resets the activity flag to `Idle` when an operation ends, even on
/// an early return.
struct ActivityGuard<'a> {
    slot: &'a Mutex<Activity>,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = Activity::Idle;
    }
}

/// Lock a mutex, recovering the inner value if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive lease on the registry for add/edit/delete operations.
///
/// Holding the lease keeps the dispatcher out of `Dispatching`; dropping
/// it returns the instance to idle.
///
/// The lease holds the registry mutex, so do not call
/// [`Dispatcher::registry_snapshot`] on the same thread while it is
/// open — that self-deadlocks. Read through the lease itself instead;
/// it derefs to [`EndpointRegistry`].
pub struct RegistryEdit<'a> {
    registry: MutexGuard<'a, EndpointRegistry>,
    _activity: ActivityGuard<'a>,
}

impl Deref for RegistryEdit<'_> {
    type Target = EndpointRegistry;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

impl DerefMut for RegistryEdit<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.registry
    }
}

/// Dispatches one query across a registry of search endpoints.
///
/// Generic over [`Fetcher`] so tests can drive the loop without a
/// network; production code uses the default [`HttpFetcher`].
pub struct Dispatcher<F: Fetcher = HttpFetcher> {
    config: DispatchConfig,
    fetcher: F,
    registry: Mutex<EndpointRegistry>,
    activity: Mutex<Activity>,
}

impl Dispatcher {
    /// Build a dispatcher over the given registry with the production
    /// HTTP fetcher.
    pub fn new(registry: EndpointRegistry, config: DispatchConfig) -> Self {
        Self::with_fetcher(registry, config, HttpFetcher)
    }

    /// Build a dispatcher over the built-in default registry and default
    /// configuration.
    pub fn with_defaults() -> Self {
        Self::new(EndpointRegistry::defaults(), DispatchConfig::default())
    }
}

impl<F: Fetcher> Dispatcher<F> {
    /// Build a dispatcher with a custom fetcher implementation.
    pub fn with_fetcher(registry: EndpointRegistry, config: DispatchConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            registry: Mutex::new(registry),
            activity: Mutex::new(Activity::Idle),
        }
    }

    /// The configuration this dispatcher runs with.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// A point-in-time copy of the registry, for presentation.
    ///
    /// Must not be called while this thread holds a [`RegistryEdit`]
    /// lease; the lease already gives direct registry access.
    pub fn registry_snapshot(&self) -> EndpointRegistry {
        lock(&self.registry).clone()
    }

    /// Acquire an exclusive registry edit lease.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ConcurrentDispatch`] while a dispatch is
    /// running or another edit lease is open.
    pub fn edit_registry(&self) -> Result<RegistryEdit<'_>, DispatchError> {
        let activity = self.begin(Activity::Editing)?;
        Ok(RegistryEdit {
            registry: lock(&self.registry),
            _activity: activity,
        })
    }

    /// Dispatch `query` to the selected endpoints and collect one record
    /// per endpoint, in dispatch order.
    ///
    /// Visits endpoints strictly sequentially with a pacing delay of
    /// `config.pacing_ms` between fetches (skipped after the last).
    /// Every per-endpoint failure becomes an Error-status record; the
    /// remaining endpoints are still attempted.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ConcurrentDispatch`] if a batch or a
    /// registry edit is already in flight on this instance, and
    /// [`DispatchError::Config`] for an invalid configuration. Both are
    /// rejected before any endpoint is contacted.
    pub async fn dispatch(
        &self,
        query: &str,
        selection: EndpointSelection,
    ) -> Result<DispatchBatch, DispatchError> {
        self.config.validate()?;
        let _guard = self.begin(Activity::Dispatching)?;

        // Snapshot the subset under the registry lock, then release it:
        // the loop must not hold the lock across awaits, and the flag
        // already keeps edits out for the whole batch.
        let subset: Vec<(String, Option<String>)> = {
            let registry = lock(&self.registry);
            match &selection {
                EndpointSelection::All => registry
                    .iter()
                    .map(|(id, template)| (id.to_string(), Some(template.to_string())))
                    .collect(),
                EndpointSelection::One(id) => {
                    vec![(id.clone(), registry.get(id).map(str::to_string))]
                }
            }
        };

        tracing::debug!(query, endpoints = subset.len(), "dispatch started");

        let mut batch = DispatchBatch::with_capacity(subset.len());
        let last = subset.len().saturating_sub(1);

        for (index, (id, template)) in subset.iter().enumerate() {
            let record = match template {
                Some(template) => self.visit(id, template, query).await,
                None => {
                    ResultRecord::error(id, format!("endpoint \"{id}\" is not registered"))
                }
            };
            batch.push(record);

            if index < last && self.config.pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.pacing_ms)).await;
            }
        }

        tracing::debug!(records = batch.len(), "dispatch completed");
        Ok(batch)
    }

    /// Resolve, fetch, and extract one endpoint, absorbing every failure
    /// into the returned record.
    async fn visit(&self, id: &str, template: &str, query: &str) -> ResultRecord {
        let url = match build_url(template, query) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(endpoint = id, error = %err, "URL build failed");
                return ResultRecord::error(id, err.to_string());
            }
        };

        let html = match self.fetcher.fetch(&url, &self.config).await {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(endpoint = id, error = %err, "endpoint fetch failed");
                return ResultRecord::error(id, err.to_string());
            }
        };

        match ExtractRule::for_endpoint(id).extract(&html) {
            Ok(urls) => {
                tracing::debug!(endpoint = id, count = urls.len(), "endpoint extracted");
                ResultRecord::success(id, urls)
            }
            Err(err) => {
                tracing::warn!(endpoint = id, error = %err, "extraction failed");
                ResultRecord::error(id, err.to_string())
            }
        }
    }

    /// Claim the activity flag, rejecting if the instance is not idle.
    fn begin(&self, next: Activity) -> Result<ActivityGuard<'_>, DispatchError> {
        let mut state = lock(&self.activity);
        if *state != Activity::Idle {
            return Err(DispatchError::ConcurrentDispatch(
                state.describe().to_string(),
            ));
        }
        *state = next;
        Ok(ActivityGuard {
            slot: &self.activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;
    use std::collections::HashMap;

    /// A scripted fetcher: maps a URL substring to a canned outcome.
    struct ScriptedFetcher {
        outcomes: HashMap<&'static str, Result<&'static str, DispatchError>>,
    }

    impl ScriptedFetcher {
        fn new(
            outcomes: impl IntoIterator<
                Item = (&'static str, Result<&'static str, DispatchError>),
            >,
        ) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
            }
        }
    }

    impl Fetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            url: &str,
            _config: &DispatchConfig,
        ) -> Result<String, DispatchError> {
            for (needle, outcome) in &self.outcomes {
                if url.contains(needle) {
                    return match outcome {
                        Ok(html) => Ok((*html).to_string()),
                        Err(DispatchError::Timeout(m)) => {
                            Err(DispatchError::Timeout(m.clone()))
                        }
                        Err(DispatchError::Transport(m)) => {
                            Err(DispatchError::Transport(m.clone()))
                        }
                        Err(other) => Err(DispatchError::Unexpected(other.to_string())),
                    };
                }
            }
            Err(DispatchError::Transport(format!("unscripted URL {url}")))
        }
    }

    fn quiet_config() -> DispatchConfig {
        DispatchConfig {
            timeout_seconds: 2,
            pacing_ms: 0,
            user_agent: Some("TestBot/1.0".into()),
        }
    }

    fn three_endpoint_registry() -> EndpointRegistry {
        EndpointRegistry::from_pairs([
            ("alpha", "https://a.test/s?q={query}"),
            ("beta", "https://b.test/s?q={query}"),
            ("gamma", "https://c.test/s?q={query}"),
        ])
        .expect("valid registry")
    }

    const RESULT_PAGE: &str = r#"<html><body>
        <a href="https://x.test/1">one</a>
        <a href="https://x.test/2">two</a>
    </body></html>"#;

    #[tokio::test]
    async fn single_endpoint_dispatch_builds_expected_url() {
        let fetcher = ScriptedFetcher::new([("a.test/s?q=cats", Ok(RESULT_PAGE))]);
        let dispatcher = Dispatcher::with_fetcher(
            EndpointRegistry::from_pairs([("alpha", "https://a.test/s?q={query}")])
                .expect("valid registry"),
            quiet_config(),
            fetcher,
        );

        let batch = dispatcher
            .dispatch("cats", EndpointSelection::One("alpha".into()))
            .await
            .expect("dispatch should run");

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].endpoint, "alpha");
        assert_eq!(batch[0].status, RecordStatus::Success);
        assert_eq!(batch[0].results, ["https://x.test/1", "https://x.test/2"]);
    }

    #[tokio::test]
    async fn failed_endpoint_does_not_abort_batch() {
        let fetcher = ScriptedFetcher::new([
            ("a.test", Ok(RESULT_PAGE)),
            (
                "b.test",
                Err(DispatchError::Timeout(
                    "https://b.test/s?q=cats timed out after 2s".into(),
                )),
            ),
            ("c.test", Ok(RESULT_PAGE)),
        ]);
        let dispatcher =
            Dispatcher::with_fetcher(three_endpoint_registry(), quiet_config(), fetcher);

        let batch = dispatcher
            .dispatch("cats", EndpointSelection::All)
            .await
            .expect("dispatch should run");

        assert_eq!(batch.len(), 3);
        let ids: Vec<&str> = batch.iter().map(|r| r.endpoint.as_str()).collect();
        assert_eq!(ids, ["alpha", "beta", "gamma"]);

        assert_eq!(batch[0].status, RecordStatus::Success);
        assert_eq!(batch[1].status, RecordStatus::Error);
        assert!(batch[1].message.contains("timed out"));
        assert!(batch[1].results.is_empty());
        assert_eq!(batch[2].status, RecordStatus::Success);
    }

    #[tokio::test]
    async fn unregistered_endpoint_yields_error_record() {
        let fetcher = ScriptedFetcher::new([]);
        let dispatcher =
            Dispatcher::with_fetcher(three_endpoint_registry(), quiet_config(), fetcher);

        let batch = dispatcher
            .dispatch("cats", EndpointSelection::One("missing".into()))
            .await
            .expect("dispatch should run");

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].status, RecordStatus::Error);
        assert!(batch[0].message.contains("not registered"));
    }

    #[tokio::test]
    async fn batch_covers_every_endpoint_even_when_all_fail() {
        let fetcher = ScriptedFetcher::new([]);
        let dispatcher =
            Dispatcher::with_fetcher(three_endpoint_registry(), quiet_config(), fetcher);

        let batch = dispatcher
            .dispatch("cats", EndpointSelection::All)
            .await
            .expect("dispatch should run");

        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|r| r.status == RecordStatus::Error));
    }

    #[tokio::test]
    async fn edit_lease_blocks_second_edit() {
        let dispatcher = Dispatcher::with_fetcher(
            three_endpoint_registry(),
            quiet_config(),
            ScriptedFetcher::new([]),
        );

        let edit = dispatcher.edit_registry().expect("first lease");
        match dispatcher.edit_registry() {
            Err(DispatchError::ConcurrentDispatch(_)) => {}
            Err(other) => panic!("expected concurrent rejection, got {other}"),
            Ok(_) => panic!("second lease must be rejected while one is held"),
        }
        drop(edit);
        assert!(dispatcher.edit_registry().is_ok());
    }

    #[tokio::test]
    async fn edit_lease_blocks_dispatch_and_vice_versa() {
        let dispatcher = Dispatcher::with_fetcher(
            three_endpoint_registry(),
            quiet_config(),
            ScriptedFetcher::new([("a.test", Ok(RESULT_PAGE))]),
        );

        {
            let _edit = dispatcher.edit_registry().expect("lease");
            let err = dispatcher
                .dispatch("cats", EndpointSelection::One("alpha".into()))
                .await
                .unwrap_err();
            assert!(matches!(err, DispatchError::ConcurrentDispatch(_)));
            assert!(err.to_string().contains("registry edit"));
        }

        // Lease released: dispatch runs again.
        let batch = dispatcher
            .dispatch("cats", EndpointSelection::One("alpha".into()))
            .await
            .expect("dispatch after lease drop");
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn edits_through_lease_are_visible_to_next_dispatch() {
        let dispatcher = Dispatcher::with_fetcher(
            three_endpoint_registry(),
            quiet_config(),
            ScriptedFetcher::new([("d.test", Ok(RESULT_PAGE))]),
        );

        {
            let mut edit = dispatcher.edit_registry().expect("lease");
            edit.insert("delta", "https://d.test/s?q={query}")
                .expect("valid template");
            edit.remove("alpha");
        }

        let snapshot = dispatcher.registry_snapshot();
        assert!(snapshot.get("alpha").is_none());
        assert_eq!(snapshot.get("delta"), Some("https://d.test/s?q={query}"));

        let batch = dispatcher
            .dispatch("cats", EndpointSelection::One("delta".into()))
            .await
            .expect("dispatch should run");
        assert_eq!(batch[0].status, RecordStatus::Success);
    }

    #[tokio::test]
    async fn invalid_config_rejected_before_any_work() {
        let dispatcher = Dispatcher::with_fetcher(
            three_endpoint_registry(),
            DispatchConfig {
                timeout_seconds: 0,
                ..quiet_config()
            },
            ScriptedFetcher::new([]),
        );

        let err = dispatcher
            .dispatch("cats", EndpointSelection::All)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
    }

    #[tokio::test]
    async fn dispatcher_returns_to_idle_after_batch() {
        let dispatcher = Dispatcher::with_fetcher(
            three_endpoint_registry(),
            quiet_config(),
            ScriptedFetcher::new([("a.test", Ok(RESULT_PAGE))]),
        );

        dispatcher
            .dispatch("cats", EndpointSelection::One("alpha".into()))
            .await
            .expect("first dispatch");
        dispatcher
            .dispatch("cats", EndpointSelection::One("alpha".into()))
            .await
            .expect("second dispatch after first completed");
    }
}
