//! Background loading of datasets into per-view slots.
//!
//! Every view goes through the same path: `Loader::request` runs one
//! retrieval on a worker thread and tags it with a request id; the UI thread
//! drains finished results and hands each to the view's `ViewSlot`.
//!
//! There is no cancellation. A result for an old request can arrive after a
//! newer one; `StalePolicy` says whether it is still applied.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use tracing::{debug, trace};

use crate::data::fetcher::DataFetcher;
use crate::domain::{Dataset, DatasetKind, UserId};
use crate::error::FetchError;

/// Monotonically increasing per loader, starting at 1.
pub type RequestId = u64;

/// How a result that arrives late is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StalePolicy {
    /// Apply every result as it arrives. A slow response for a previous user
    /// can overwrite fresher state.
    #[default]
    LastResolvedWins,
    /// Drop results whose request id is older than the slot's latest request.
    LatestRequestWins,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(FetchError),
}

/// Load state of one view.
///
/// `state` is what the view shows. `pending` stays set until the latest
/// request itself resolves, so a late result for an older request can
/// replace the shown value without marking the view as settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSlot<T> {
    latest_request: Option<RequestId>,
    pending: bool,
    state: SlotState<T>,
}

impl<T> Default for ViewSlot<T> {
    fn default() -> Self {
        Self {
            latest_request: None,
            pending: false,
            state: SlotState::Idle,
        }
    }
}

impl<T> ViewSlot<T> {
    /// Mark a new request as in flight.
    pub fn begin(&mut self, request_id: RequestId) {
        self.latest_request = Some(request_id);
        self.pending = true;
        self.state = SlotState::Loading;
    }

    /// Apply a finished retrieval. Returns `false` when the policy dropped it.
    pub fn apply(&mut self, request_id: RequestId, result: Result<T, FetchError>, policy: StalePolicy) -> bool {
        if policy == StalePolicy::LatestRequestWins
            && self.latest_request.is_some_and(|latest| request_id < latest)
        {
            debug!(request_id, latest = ?self.latest_request, "dropping stale result");
            return false;
        }
        if self.latest_request.is_none_or(|latest| request_id >= latest) {
            self.pending = false;
        }
        self.state = match result {
            Ok(value) => SlotState::Ready(value),
            Err(err) => SlotState::Failed(err),
        };
        true
    }

    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            SlotState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            SlotState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// True until the latest request has resolved.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }
}

/// A finished retrieval, as delivered to the UI thread.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub request_id: RequestId,
    pub kind: DatasetKind,
    pub user: UserId,
    pub result: Result<Dataset, FetchError>,
    pub fetched_at: DateTime<Local>,
}

pub struct Loader {
    fetcher: Arc<DataFetcher>,
    next_id: RequestId,
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
}

impl Loader {
    pub fn new(fetcher: Arc<DataFetcher>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            next_id: 0,
            tx,
            rx,
        }
    }

    pub fn fetcher(&self) -> &DataFetcher {
        &self.fetcher
    }

    /// Start loading `kind` for `user` on a worker thread.
    pub fn request(&mut self, kind: DatasetKind, user: UserId) -> RequestId {
        self.next_id += 1;
        let request_id = self.next_id;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();

        trace!(request_id, %kind, %user, "spawning fetch");
        thread::spawn(move || {
            let result = fetcher.dataset(kind, user);
            // The receiver only goes away when the loader is dropped.
            let _ = tx.send(Loaded {
                request_id,
                kind,
                user,
                result,
                fetched_at: Local::now(),
            });
        });

        request_id
    }

    /// A finished result, if one is ready.
    pub fn try_next(&self) -> Option<Loaded> {
        self.rx.try_recv().ok()
    }

    /// Block for up to `timeout` waiting for the next result.
    pub fn wait_next(&self, timeout: Duration) -> Option<Loaded> {
        match self.rx.recv_timeout(timeout) {
            Ok(loaded) => Some(loaded),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock::MockSource;
    use crate::data::source::DataSource;

    fn network_err() -> FetchError {
        FetchError::Network("timeout".to_string())
    }

    #[test]
    fn last_resolved_wins_applies_late_results() {
        let mut slot: ViewSlot<u32> = ViewSlot::default();
        slot.begin(1);
        slot.begin(2);
        assert!(slot.apply(2, Ok(18), StalePolicy::LastResolvedWins));
        // The response for request 1 shows up after request 2 resolved.
        assert!(slot.apply(1, Ok(12), StalePolicy::LastResolvedWins));
        assert_eq!(slot.value(), Some(&12));
        assert!(!slot.is_loading());
    }

    #[test]
    fn late_result_for_older_request_keeps_slot_loading() {
        let mut slot: ViewSlot<u32> = ViewSlot::default();
        slot.begin(1);
        slot.begin(5);
        // Request 1 resolves while request 5 is still in flight.
        assert!(slot.apply(1, Ok(12), StalePolicy::LastResolvedWins));
        assert_eq!(slot.value(), Some(&12));
        assert!(slot.is_loading());
        assert_eq!(slot.latest_request(), Some(5));

        assert!(slot.apply(5, Ok(18), StalePolicy::LastResolvedWins));
        assert_eq!(slot.value(), Some(&18));
        assert!(!slot.is_loading());
    }

    #[test]
    fn dropped_result_keeps_slot_loading() {
        let mut slot: ViewSlot<u32> = ViewSlot::default();
        slot.begin(1);
        slot.begin(5);
        assert!(!slot.apply(1, Ok(12), StalePolicy::LatestRequestWins));
        assert!(slot.is_loading());
        assert_eq!(slot.state(), &SlotState::Loading);
    }

    #[test]
    fn latest_request_wins_drops_late_results() {
        let mut slot: ViewSlot<u32> = ViewSlot::default();
        slot.begin(1);
        slot.begin(2);
        assert!(slot.apply(2, Ok(18), StalePolicy::LatestRequestWins));
        assert!(!slot.apply(1, Ok(12), StalePolicy::LatestRequestWins));
        assert_eq!(slot.value(), Some(&18));
    }

    #[test]
    fn failures_are_kept_per_slot() {
        let mut slot: ViewSlot<u32> = ViewSlot::default();
        assert_eq!(slot.state(), &SlotState::Idle);
        slot.begin(1);
        assert!(slot.is_loading());
        slot.apply(1, Err(network_err()), StalePolicy::default());
        assert_eq!(slot.error(), Some(&network_err()));
        assert_eq!(slot.value(), None);
    }

    #[test]
    fn loader_delivers_tagged_results() {
        let fetcher = Arc::new(DataFetcher::new(DataSource::Mock(MockSource::bundled().unwrap())));
        let mut loader = Loader::new(fetcher);
        let a = loader.request(DatasetKind::Profile, UserId(12));
        let b = loader.request(DatasetKind::Profile, UserId(404));
        assert_eq!((a, b), (1, 2));

        let mut got = Vec::new();
        for _ in 0..2 {
            got.push(loader.wait_next(Duration::from_secs(5)).expect("result"));
        }
        got.sort_by_key(|l| l.request_id);

        assert_eq!(got[0].user, UserId(12));
        assert!(matches!(&got[0].result, Ok(Dataset::Profile(p)) if p.id == 12));
        assert!(got[1].result.as_ref().unwrap_err().is_not_found());
        assert!(loader.try_next().is_none());
    }
}
