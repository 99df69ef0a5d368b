//! CMS transport abstraction.
//!
//! The loader talks to the CMS only through [`CmsTransport`], so any client
//! (HTTP, GROQ, in-memory fixtures) can back it.

use crate::error::{LoaderError, LoaderResult};
use crate::query::Query;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// Stream of document versions pushed by the CMS for a live query.
pub type UpdateStream = BoxStream<'static, LoaderResult<Option<Value>>>;

/// A query transport to the CMS.
#[async_trait]
pub trait CmsTransport: Send + Sync {
    /// Runs `query` once. `Ok(None)` means the query matched no document.
    async fn fetch(&self, query: &Query) -> LoaderResult<Option<Value>>;

    /// Opens an update stream for `query`. Each item is the query's result
    /// after an upstream change.
    async fn subscribe(&self, _query: &Query) -> LoaderResult<UpdateStream> {
        Err(LoaderError::LiveUnsupported)
    }
}

/// An in-memory transport for tests and local previews.
pub mod mock {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use std::time::Duration;
    use tracing::debug;

    type Subscriber = (Query, mpsc::UnboundedSender<LoaderResult<Option<Value>>>);

    #[derive(Default)]
    struct Inner {
        documents: Vec<Value>,
        responses: HashMap<String, Option<Value>>,
        failures: VecDeque<LoaderError>,
        delays: VecDeque<Duration>,
        default_delay: Duration,
        fetch_count: usize,
        in_flight: usize,
        max_in_flight: usize,
        subscribers: Vec<Subscriber>,
    }

    impl Inner {
        /// Canned responses first, then route queries against `documents`.
        fn evaluate(&self, query: &Query) -> LoaderResult<Option<Value>> {
            if let Some(response) = self.responses.get(&query.text) {
                return Ok(response.clone());
            }
            let Some((route_type, path)) = query.as_route() else {
                return Err(LoaderError::Rejected(format!("unsupported query: {query}")));
            };
            Ok(self
                .documents
                .iter()
                .rev()
                .find(|doc| {
                    doc.get("_type").and_then(Value::as_str) == Some(route_type.as_str())
                        && doc.get("path").and_then(Value::as_str) == Some(path.as_str())
                })
                .cloned())
        }

        fn notify(&mut self) {
            self.subscribers.retain(|(_, tx)| !tx.is_closed());
            for (query, tx) in &self.subscribers {
                let _ = tx.unbounded_send(self.evaluate(query));
            }
        }
    }

    /// Fixture-backed [`CmsTransport`].
    ///
    /// Understands route queries built by [`Query::route`] plus canned
    /// responses for literal query text. Failures and delays can be queued
    /// per call, and document changes are pushed to live subscribers.
    #[derive(Clone, Default)]
    pub struct MemoryTransport {
        inner: Arc<Mutex<Inner>>,
    }

    impl MemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_documents(documents: impl IntoIterator<Item = Value>) -> Self {
            let transport = Self::new();
            transport.lock().documents.extend(documents);
            transport
        }

        fn lock(&self) -> MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Adds a document, replacing any existing document with the same
        /// `_id`, or the same `_type` and `path`. Live subscribers are
        /// notified.
        pub fn upsert(&self, document: Value) {
            let mut inner = self.lock();
            let same = |existing: &Value| match document.get("_id") {
                Some(id) => existing.get("_id") == Some(id),
                None => {
                    existing.get("_type") == document.get("_type")
                        && existing.get("path").is_some()
                        && existing.get("path") == document.get("path")
                }
            };
            match inner.documents.iter().position(same) {
                Some(index) => inner.documents[index] = document,
                None => inner.documents.push(document),
            }
            inner.notify();
        }

        /// Removes the route documents at `path`. Live subscribers are
        /// notified.
        pub fn remove_path(&self, path: &str) {
            let mut inner = self.lock();
            inner
                .documents
                .retain(|doc| doc.get("path").and_then(Value::as_str) != Some(path));
            inner.notify();
        }

        /// Answers queries with exactly this text with `response`.
        pub fn respond(&self, query_text: impl Into<String>, response: Option<Value>) {
            self.lock().responses.insert(query_text.into(), response);
        }

        /// The next fetch fails with `error`.
        pub fn fail_next(&self, error: LoaderError) {
            self.lock().failures.push_back(error);
        }

        /// The next fetch takes `delay` to answer.
        pub fn delay_next(&self, delay: Duration) {
            self.lock().delays.push_back(delay);
        }

        /// Every fetch without a queued delay takes `delay`.
        pub fn set_delay(&self, delay: Duration) {
            self.lock().default_delay = delay;
        }

        /// Sends `error` to every live subscriber.
        pub fn push_error(&self, error: LoaderError) {
            let mut inner = self.lock();
            inner.subscribers.retain(|(_, tx)| !tx.is_closed());
            for (_, tx) in &inner.subscribers {
                let _ = tx.unbounded_send(Err(error.clone()));
            }
        }

        pub fn fetch_count(&self) -> usize {
            self.lock().fetch_count
        }

        /// Most fetches ever running at the same time.
        pub fn max_concurrent_fetches(&self) -> usize {
            self.lock().max_in_flight
        }

        /// Open live subscriptions.
        pub fn subscriber_count(&self) -> usize {
            self.lock()
                .subscribers
                .iter()
                .filter(|(_, tx)| !tx.is_closed())
                .count()
        }
    }

    /// Decrements the in-flight count even when the fetch is cancelled.
    struct InFlight(Arc<Mutex<Inner>>);

    impl Drop for InFlight {
        fn drop(&mut self) {
            let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
    }

    #[async_trait]
    impl CmsTransport for MemoryTransport {
        async fn fetch(&self, query: &Query) -> LoaderResult<Option<Value>> {
            let (delay, outcome) = {
                let mut inner = self.lock();
                inner.fetch_count += 1;
                inner.in_flight += 1;
                inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
                let delay = inner.delays.pop_front().unwrap_or(inner.default_delay);
                let outcome = match inner.failures.pop_front() {
                    Some(err) => Err(err),
                    None => inner.evaluate(query),
                };
                (delay, outcome)
            };
            let _in_flight = InFlight(Arc::clone(&self.inner));
            debug!(query = %query, delay_ms = delay.as_millis() as u64, "memory fetch");

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        }

        async fn subscribe(&self, query: &Query) -> LoaderResult<UpdateStream> {
            let (tx, rx) = mpsc::unbounded();
            self.lock().subscribers.push((query.clone(), tx));
            Ok(rx.boxed())
        }
    }
}
