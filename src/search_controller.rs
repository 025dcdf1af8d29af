//! Debounced, race-safe search over a [`RepoFetcher`].
//!
//! Every keystroke goes through [`SearchController::on_query_changed`]. The
//! controller waits for the debounce window to pass quietly, issues one fetch
//! for the query present at that moment, and only lets the response of the
//! most recently issued request update the [`ResultState`]. Responses that
//! arrive for a superseded query are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use crate::client::{FetchOutcome, RepoFetcher};
use crate::config::Config;
use crate::data_models::{RequestId, ResultState};
use crate::debouncer::Debouncer;
use crate::error::SearchError;

pub struct SearchController {
    shared: Arc<Shared>,
}

struct Shared {
    fetcher: Arc<dyn RepoFetcher>,
    debounce: Duration,
    handle: Handle,
    state_tx: watch::Sender<ResultState>,
    inner: Mutex<Inner>,
}

struct Inner {
    query: String,
    /// Bumped on every query change; a debounce fire from an older epoch is ignored.
    epoch: u64,
    current_request: Option<RequestId>,
    last_request: u64,
    debouncer: Debouncer,
    subscribers: Vec<mpsc::UnboundedSender<ResultState>>,
}

impl SearchController {
    /// Create a controller that spawns its timers and fetches on the current Tokio runtime.
    pub fn new(fetcher: Arc<dyn RepoFetcher>, debounce: Duration) -> Result<Self, SearchError> {
        let handle = Handle::try_current()?;
        Ok(Self::with_handle(fetcher, debounce, handle))
    }

    pub fn from_config(fetcher: Arc<dyn RepoFetcher>, config: &Config) -> Result<Self, SearchError> {
        Self::new(fetcher, config.debounce())
    }

    /// Create a controller bound to an explicit runtime, so that
    /// [`on_query_changed`](Self::on_query_changed) may be called from threads
    /// outside of it.
    pub fn with_handle(fetcher: Arc<dyn RepoFetcher>, debounce: Duration, handle: Handle) -> Self {
        let (state_tx, _) = watch::channel(ResultState::Idle);
        let inner = Inner {
            query: String::new(),
            epoch: 0,
            current_request: None,
            last_request: 0,
            debouncer: Debouncer::new(handle.clone()),
            subscribers: Vec::new(),
        };
        SearchController {
            shared: Arc::new(Shared {
                fetcher,
                debounce,
                handle,
                state_tx,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Record a new query. Any pending debounce and any in-flight request are
    /// abandoned; the state switches to `Loading` (or `Idle` for `""`) before
    /// this returns.
    pub fn on_query_changed(&self, text: impl Into<String>) {
        let query = text.into();
        let shared = &self.shared;
        let mut inner = shared.lock();

        log::debug!("query changed to {query:?}");
        inner.debouncer.cancel();
        inner.epoch += 1;
        inner.query = query.clone();
        if let Some(request) = inner.current_request.take() {
            log::debug!("request {request} superseded before it resolved");
        }

        if query.is_empty() {
            shared.transition(&mut inner, ResultState::Idle);
            return;
        }

        shared.transition(
            &mut inner,
            ResultState::Loading {
                query: query.clone(),
                request: None,
            },
        );

        let epoch = inner.epoch;
        let weak = Arc::downgrade(shared);
        inner.debouncer.schedule(query, shared.debounce, move |query| {
            if let Some(shared) = weak.upgrade() {
                shared.debounce_fired(epoch, query);
            }
        });
    }

    pub fn current_state(&self) -> ResultState {
        self.shared.state_tx.borrow().clone()
    }

    /// Receive every state transition, in order, from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ResultState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.lock().subscribers.push(tx);
        rx
    }

    /// Latest-value view of the state. Intermediate transitions may be skipped.
    pub fn watch(&self) -> watch::Receiver<ResultState> {
        self.shared.state_tx.subscribe()
    }

    pub fn query(&self) -> String {
        self.shared.lock().query.clone()
    }

    pub fn current_request(&self) -> Option<RequestId> {
        self.shared.lock().current_request
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.shared.lock().debouncer.is_pending()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the state and notify subscribers. Equal replacements are not transitions.
    fn transition(&self, inner: &mut Inner, next: ResultState) {
        let changed = self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next.clone();
            true
        });
        if changed {
            inner
                .subscribers
                .retain(|subscriber| subscriber.send(next.clone()).is_ok());
        }
    }

    fn debounce_fired(self: Arc<Self>, epoch: u64, query: String) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            log::debug!("ignoring debounce for superseded query {query:?}");
            return;
        }

        inner.last_request += 1;
        let request = RequestId::new(inner.last_request);
        inner.current_request = Some(request);
        self.transition(
            &mut inner,
            ResultState::Loading {
                query: query.clone(),
                request: Some(request),
            },
        );
        drop(inner);

        log::info!("fetching repos for {query:?} (request {request})");
        let fetcher = Arc::clone(&self.fetcher);
        let weak: Weak<Shared> = Arc::downgrade(&self);
        self.handle.spawn(async move {
            let outcome = fetcher.fetch_repositories(&query).await;
            match weak.upgrade() {
                Some(shared) => shared.fetch_completed(request, query, outcome),
                None => log::debug!("controller dropped before request {request} resolved"),
            }
        });
    }

    fn fetch_completed(&self, request: RequestId, query: String, outcome: FetchOutcome) {
        let mut inner = self.lock();
        if inner.current_request != Some(request) {
            log::debug!("discarding stale response for {query:?} (request {request})");
            return;
        }
        inner.current_request = None;

        if let FetchOutcome::Error(error) = &outcome {
            log::warn!("fetching repos for {query:?} failed: {error}");
        }
        self.transition(&mut inner, ResultState::resolved(query, outcome));
    }
}
