use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::job::{lenient_timestamp, Job};

/// Immutable view of the job collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub jobs: Vec<Job>,
}

impl Snapshot {
    pub fn new(revision: u64, jobs: Vec<Job>) -> Self {
        Self { revision, jobs }
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }
}

/// Change pushed by the store's realtime subscription.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteEvent {
    Inserted {
        job: Job,
    },
    Updated {
        job: Job,
    },
    SoftDeleted {
        id: String,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        deleted_at: Option<DateTime<Utc>>,
    },
}

impl RemoteEvent {
    pub fn job_id(&self) -> &str {
        match self {
            RemoteEvent::Inserted { job } | RemoteEvent::Updated { job } => &job.id,
            RemoteEvent::SoftDeleted { id, .. } => id,
        }
    }
}

/// Merge a realtime event into `snapshot`, producing the next snapshot.
///
/// Inserts and updates are upserts keyed by id and keep the job's position
/// when it already exists. A row that arrives with `deleted_at` set, or a
/// soft-delete event, removes the job. The revision only moves when the
/// job collection actually changes.
pub fn apply_remote_event(snapshot: &Snapshot, event: RemoteEvent) -> Snapshot {
    let mut jobs = snapshot.jobs.clone();
    let position = jobs.iter().position(|job| job.id == event.job_id());

    let changed = match (event, position) {
        (RemoteEvent::Inserted { job } | RemoteEvent::Updated { job }, Some(idx)) => {
            if job.is_deleted() {
                jobs.remove(idx);
                true
            } else if jobs[idx] != job {
                jobs[idx] = job;
                true
            } else {
                false
            }
        }
        (RemoteEvent::Inserted { job } | RemoteEvent::Updated { job }, None) => {
            if job.is_deleted() {
                false
            } else {
                jobs.push(job);
                true
            }
        }
        (RemoteEvent::SoftDeleted { .. }, Some(idx)) => {
            jobs.remove(idx);
            true
        }
        (RemoteEvent::SoftDeleted { id, .. }, None) => {
            debug!("Soft delete for unknown job {} ignored", id);
            false
        }
    };

    if changed {
        Snapshot::new(snapshot.revision + 1, jobs)
    } else {
        snapshot.clone()
    }
}

/// Ticket handed out when a refresh starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshToken(u64);

impl RefreshToken {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { revision: u64 },
    /// A newer refresh was started after this one; its result was dropped.
    Superseded { latest: u64 },
}

#[derive(Debug, Default)]
struct StoreState {
    current: Arc<Snapshot>,
    issued: u64,
    applied: u64,
    last_refreshed_at: Option<DateTime<Utc>>,
    /// Events applied since the latest refresh was issued.
    in_flight_events: Vec<RemoteEvent>,
}

impl StoreState {
    fn refresh_in_flight(&self) -> bool {
        self.issued > self.applied
    }
}

/// Holder of the latest complete snapshot.
///
/// Readers get an `Arc` to the current snapshot and keep it for as long as
/// they need; writers swap in a whole new snapshot, so a reader never sees
/// a half-applied change.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    state: RwLock<StoreState>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Snapshot store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Snapshot store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.read().current)
    }

    /// True once a refresh has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.read().last_refreshed_at.is_some()
    }

    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.read().last_refreshed_at
    }

    /// Start a refresh and get the token its result must be handed back with.
    pub fn begin_refresh(&self) -> RefreshToken {
        let mut state = self.write();
        state.issued += 1;
        state.in_flight_events.clear();
        debug!("Refresh {} started", state.issued);
        RefreshToken(state.issued)
    }

    /// Install the result of the refresh identified by `token`.
    ///
    /// The result is discarded when a newer refresh has been started since,
    /// so responses that resolve out of order never roll the board back.
    /// Events applied while this refresh was in flight are replayed on top
    /// of the fetched jobs.
    pub fn complete_refresh(
        &self,
        token: RefreshToken,
        jobs: Vec<Job>,
        fetched_at: DateTime<Utc>,
    ) -> RefreshOutcome {
        let mut state = self.write();

        if token.0 < state.issued || token.0 <= state.applied {
            warn!(
                "Discarding superseded refresh {} (latest issued {})",
                token.0, state.issued
            );
            return RefreshOutcome::Superseded {
                latest: state.issued,
            };
        }

        let replayed = std::mem::take(&mut state.in_flight_events);
        let replay_count = replayed.len();
        let fetched = Snapshot::new(state.current.revision + 1, jobs);
        let next = replayed
            .into_iter()
            .fold(fetched, |snapshot, event| apply_remote_event(&snapshot, event));

        let revision = next.revision;
        let count = next.jobs.len();
        state.current = Arc::new(next);
        state.applied = token.0;
        state.last_refreshed_at = Some(fetched_at);

        if replay_count > 0 {
            debug!("Replayed {} in-flight events onto refresh {}", replay_count, token.0);
        }
        info!(
            "Snapshot refreshed: {} jobs, revision {} (refresh {})",
            count, revision, token.0
        );
        RefreshOutcome::Applied { revision }
    }

    /// Merge a realtime event into the current snapshot.
    pub fn apply_event(&self, event: RemoteEvent) -> Arc<Snapshot> {
        let mut state = self.write();
        if state.refresh_in_flight() {
            state.in_flight_events.push(event.clone());
        }
        let next = apply_remote_event(&state.current, event);
        if next.revision != state.current.revision {
            state.current = Arc::new(next);
        }
        Arc::clone(&state.current)
    }
}
