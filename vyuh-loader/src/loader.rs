//! Document loader state machine.
//!
//! Every fetch and every live update is tagged with a sequence number taken
//! from a per-loader counter. A result is applied only if its sequence is
//! still the latest issued, so a slow response can never overwrite newer
//! content.
//!
//! At most one fetch runs per loader. A `refresh` while a fetch is running
//! aborts that fetch and starts a new one, so a hung request never delays a
//! refresh.
//!
//! Live updates move the loader to `Loading` and settle it in the same step.
//! Watch receivers only keep the latest value, so they see the settled state
//! of a pushed update, not the `Loading` in between.

use crate::error::{LoaderError, LoaderResult};
use crate::query::{DEFAULT_ROUTE_TYPE, DocumentSource, Query};
use crate::state::LoaderState;
use crate::transport::{CmsTransport, UpdateStream};
use futures::StreamExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Loader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Document type route queries select.
    pub route_type: String,
    /// Longest a single fetch may take before it settles as
    /// [`LoaderError::Timeout`].
    pub fetch_timeout: Duration,
    pub allow_refresh: bool,
    /// Subscribe to the transport's update stream on `load`.
    pub live: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            route_type: DEFAULT_ROUTE_TYPE.to_string(),
            fetch_timeout: Duration::from_millis(30_000),
            allow_refresh: true,
            live: false,
        }
    }
}

// ================================================================
// Shared state
// ================================================================

#[derive(Default)]
struct FetchSlot {
    /// Sequence number of the running fetch.
    seq: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    id: Uuid,
    seq: AtomicU64,
    state: watch::Sender<LoaderState>,
    slot: Mutex<FetchSlot>,
    loaded: AtomicBool,
    disposed: AtomicBool,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, FetchSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a new sequence number and moves to `Loading`.
    fn begin(&self) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoaderState::Loading;
        });
        seq
    }

    /// Applies `next` if `seq` is still the latest issued.
    fn settle(&self, seq: u64, next: LoaderState) -> bool {
        let name = next.name();
        let applied = self.state.send_if_modified(|state| {
            if self.seq.load(Ordering::SeqCst) != seq {
                return false;
            }
            *state = next;
            true
        });
        if applied {
            debug!(loader = %self.id, seq, state = name, "loader settled");
        } else {
            debug!(loader = %self.id, seq, "stale result discarded");
        }
        applied
    }

    fn apply_update(&self, update: LoaderResult<Option<Value>>) {
        let seq = self.begin();
        let next = LoaderState::from_fetch(update);
        if let LoaderState::Error(err) = &next {
            warn!(loader = %self.id, seq, error = %err, "live update failed");
        }
        self.settle(seq, next);
    }
}

// ================================================================
// Live subscription
// ================================================================

/// Handle to a loader's live update stream.
///
/// Closing aborts the task draining the stream, which drops the stream and
/// unsubscribes from the transport. Dropping the handle closes it.
#[derive(Debug)]
pub struct LiveSubscription {
    task: Option<JoinHandle<()>>,
}

impl LiveSubscription {
    fn spawn(shared: Arc<Shared>, mut updates: UpdateStream) -> Self {
        let task = tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                shared.apply_update(update);
            }
            debug!(loader = %shared.id, "live stream ended");
        });
        Self { task: Some(task) }
    }

    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

// ================================================================
// Loader
// ================================================================

/// Fetches one route or query and exposes the result as a [`LoaderState`].
///
/// `load` and `refresh` spawn onto the current tokio runtime and return
/// immediately; observe progress through [`state`](Self::state),
/// [`subscribe`](Self::subscribe) or [`settled`](Self::settled).
pub struct DocumentLoader {
    query: Query,
    transport: Arc<dyn CmsTransport>,
    options: LoaderOptions,
    shared: Arc<Shared>,
    live: Mutex<Option<LiveSubscription>>,
}

impl DocumentLoader {
    pub fn new(
        transport: Arc<dyn CmsTransport>,
        source: DocumentSource,
        options: LoaderOptions,
    ) -> Self {
        let query = source.to_query(&options.route_type);
        let (state, _) = watch::channel(LoaderState::Idle);
        Self {
            query,
            transport,
            options,
            shared: Arc::new(Shared {
                id: Uuid::now_v7(),
                seq: AtomicU64::new(0),
                state,
                slot: Mutex::new(FetchSlot::default()),
                loaded: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
            live: Mutex::new(None),
        }
    }

    /// Loader for the route document at `path`.
    pub fn for_route(
        transport: Arc<dyn CmsTransport>,
        path: impl Into<String>,
        options: LoaderOptions,
    ) -> Self {
        Self::new(transport, DocumentSource::route(path), options)
    }

    pub fn for_query(transport: Arc<dyn CmsTransport>, query: Query, options: LoaderOptions) -> Self {
        Self::new(transport, DocumentSource::Query(query), options)
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn state(&self) -> LoaderState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoaderState> {
        self.shared.state.subscribe()
    }

    /// Waits until the loader is `Ready`, `Empty` or `Error`.
    ///
    /// Never returns for a loader that was never loaded.
    pub async fn settled(&self) -> LoaderState {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(LoaderState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Starts the first fetch and, for live loaders, the update stream.
    ///
    /// Calling `load` again is a no-op. A fetch already started by `refresh`
    /// is reused, but the update stream is still opened.
    pub async fn load(&self) -> LoaderResult<()> {
        self.ensure_active()?;
        if self.shared.loaded.swap(true, Ordering::SeqCst) {
            debug!(loader = %self.id(), "load ignored, already loaded");
            return Ok(());
        }

        info!(loader = %self.id(), query = %self.query, live = self.options.live, "loading document");
        {
            let mut slot = self.shared.slot();
            if slot.task.is_none() {
                self.spawn_fetch(&mut slot);
            }
        }

        if self.options.live {
            let updates = self.transport.subscribe(&self.query).await?;
            let subscription = LiveSubscription::spawn(Arc::clone(&self.shared), updates);
            *self.live.lock().unwrap_or_else(PoisonError::into_inner) = Some(subscription);
        }
        Ok(())
    }

    /// Fetches again. A running fetch is aborted and replaced.
    pub fn refresh(&self) -> LoaderResult<()> {
        self.ensure_active()?;
        if !self.options.allow_refresh {
            return Err(LoaderError::RefreshDisabled);
        }

        let mut slot = self.shared.slot();
        if let Some(task) = slot.task.take() {
            debug!(loader = %self.id(), superseded = slot.seq, "refresh cancels running fetch");
            task.abort();
        } else {
            debug!(loader = %self.id(), "refreshing document");
        }
        self.spawn_fetch(&mut slot);
        Ok(())
    }

    /// Whether a live subscription is open.
    pub fn is_live(&self) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|live| !live.is_closed())
    }

    /// Cancels any running fetch and closes the live subscription. The last
    /// state is kept; later `load`/`refresh` calls fail with
    /// [`LoaderError::Disposed`].
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.seq.fetch_add(1, Ordering::SeqCst);
        {
            let mut slot = self.shared.slot();
            if let Some(task) = slot.task.take() {
                task.abort();
            }
        }
        if let Some(mut live) = self.live.lock().unwrap_or_else(PoisonError::into_inner).take() {
            live.close();
        }
        info!(loader = %self.id(), "document loader disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    fn ensure_active(&self) -> LoaderResult<()> {
        if self.is_disposed() {
            Err(LoaderError::Disposed)
        } else {
            Ok(())
        }
    }

    fn spawn_fetch(&self, slot: &mut FetchSlot) {
        let seq = self.shared.begin();
        slot.seq = seq;
        slot.task = Some(tokio::spawn(run_fetch(
            Arc::clone(&self.shared),
            Arc::clone(&self.transport),
            self.query.clone(),
            self.options.fetch_timeout,
            seq,
        )));
    }
}

impl Drop for DocumentLoader {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("id", &self.shared.id)
            .field("query", &self.query.text)
            .field("state", &self.state().name())
            .finish_non_exhaustive()
    }
}

async fn run_fetch(
    shared: Arc<Shared>,
    transport: Arc<dyn CmsTransport>,
    query: Query,
    timeout: Duration,
    seq: u64,
) {
    let outcome = match tokio::time::timeout(timeout, transport.fetch(&query)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(LoaderError::Timeout(timeout)),
    };

    {
        // A refresh may have replaced this fetch after it returned.
        let mut slot = shared.slot();
        if slot.seq != seq {
            debug!(loader = %shared.id, seq, "superseded fetch finished");
            return;
        }
        slot.task = None;
    }

    if let Err(err) = &outcome {
        warn!(
            loader = %shared.id,
            seq,
            error = %err,
            transient = err.is_transient(),
            "document fetch failed"
        );
    }
    shared.settle(seq, LoaderState::from_fetch(outcome));
}
