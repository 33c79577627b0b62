//! Shared dashboard loading used by both the text and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the per-view workflow:
//! request -> background fetch -> normalize -> apply to the view's slot
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::config::DataConfig;
use crate::data::{DataFetcher, Loaded, Loader, StalePolicy, ViewSlot};
use crate::domain::{ActivityDay, AverageSession, Dataset, DatasetKind, Performance, Profile, UserId};
use crate::error::{AppError, EXIT_DATA};

/// How long `load_dashboard` waits for all views before giving up.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-view state of one dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub user: UserId,
    pub policy: StalePolicy,
    pub profile: ViewSlot<Profile>,
    pub activity: ViewSlot<Vec<ActivityDay>>,
    pub sessions: ViewSlot<Vec<AverageSession>>,
    pub performance: ViewSlot<Performance>,
    pub last_update: Option<DateTime<Local>>,
}

impl DashboardState {
    pub fn new(user: UserId, policy: StalePolicy) -> Self {
        Self {
            user,
            policy,
            profile: ViewSlot::default(),
            activity: ViewSlot::default(),
            sessions: ViewSlot::default(),
            performance: ViewSlot::default(),
            last_update: None,
        }
    }

    /// Switch the active user and request every view for it.
    ///
    /// Requests already in flight for the previous user are not cancelled.
    pub fn request_all(&mut self, loader: &mut Loader, user: UserId) {
        self.user = user;
        for kind in DatasetKind::ALL {
            let id = loader.request(kind, user);
            self.slot_begin(kind, id);
        }
    }

    fn slot_begin(&mut self, kind: DatasetKind, id: crate::data::RequestId) {
        match kind {
            DatasetKind::Profile => self.profile.begin(id),
            DatasetKind::Activity => self.activity.begin(id),
            DatasetKind::AverageSessions => self.sessions.begin(id),
            DatasetKind::Performance => self.performance.begin(id),
        }
    }

    /// Route a finished retrieval to its view. Returns whether it was applied.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        let Loaded {
            request_id,
            kind,
            user,
            result,
            fetched_at,
        } = loaded;
        let policy = self.policy;

        if user != self.user {
            debug!(request_id, %kind, %user, active = %self.user, "result for a previous user");
        }
        if let Err(err) = &result {
            warn!(request_id, %kind, %user, error = %err, "fetch failed");
        }

        let applied = match result {
            Ok(Dataset::Profile(v)) => self.profile.apply(request_id, Ok(v), policy),
            Ok(Dataset::Activity(v)) => self.activity.apply(request_id, Ok(v), policy),
            Ok(Dataset::AverageSessions(v)) => self.sessions.apply(request_id, Ok(v), policy),
            Ok(Dataset::Performance(v)) => self.performance.apply(request_id, Ok(v), policy),
            Err(err) => match kind {
                DatasetKind::Profile => self.profile.apply(request_id, Err(err), policy),
                DatasetKind::Activity => self.activity.apply(request_id, Err(err), policy),
                DatasetKind::AverageSessions => self.sessions.apply(request_id, Err(err), policy),
                DatasetKind::Performance => self.performance.apply(request_id, Err(err), policy),
            },
        };

        if applied {
            self.last_update = Some(fetched_at);
        }
        applied
    }

    pub fn is_loading(&self) -> bool {
        self.profile.is_loading()
            || self.activity.is_loading()
            || self.sessions.is_loading()
            || self.performance.is_loading()
    }

    /// True when every view ended in an error.
    pub fn all_failed(&self) -> bool {
        self.profile.error().is_some()
            && self.activity.error().is_some()
            && self.sessions.error().is_some()
            && self.performance.error().is_some()
    }
}

/// Load every view for the configured user and wait until all have settled.
pub fn load_dashboard(fetcher: Arc<DataFetcher>, config: &DataConfig) -> Result<DashboardState, AppError> {
    let mut loader = Loader::new(fetcher);
    let mut state = DashboardState::new(config.user, config.stale_policy);
    state.request_all(&mut loader, config.user);

    let deadline = Instant::now() + LOAD_TIMEOUT;
    while state.is_loading() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(AppError::new(EXIT_DATA, "Timed out waiting for dashboard data."));
        }
        if let Some(loaded) = loader.wait_next(remaining) {
            state.apply(loaded);
        }
    }

    Ok(state)
}
