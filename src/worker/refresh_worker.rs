use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::board::{RefreshOutcome, SnapshotStore};
use crate::error::SourceError;
use crate::source::JobSource;

/// Background worker keeping the snapshot store fresh
pub struct RefreshWorker {
    store: Arc<SnapshotStore>,
    source: Arc<dyn JobSource>,
}

impl RefreshWorker {
    /// Create a new RefreshWorker instance
    pub fn new(store: Arc<SnapshotStore>, source: Arc<dyn JobSource>) -> Self {
        Self { store, source }
    }

    /// Fetch once and hand the result to the store.
    ///
    /// On a fetch error the store keeps serving its last good snapshot.
    pub async fn refresh_once(&self) -> Result<RefreshOutcome, SourceError> {
        refresh(&self.store, self.source.as_ref()).await
    }

    /// Run the refresh loop until shutdown is signalled
    ///
    /// # Architecture
    /// - Refreshes immediately on start, then every `every`
    /// - Ticks missed while a slow fetch was running are skipped, not replayed
    /// - Fetch failures are logged and retried on the next tick
    /// - Exits as soon as the shutdown channel flips to `true`
    pub async fn run(&self, every: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Refresh worker started (interval {:?})", every);

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.refresh_once().await {
                        Ok(RefreshOutcome::Applied { revision }) => {
                            info!("Refresh worker applied snapshot revision {}", revision);
                        }
                        Ok(RefreshOutcome::Superseded { latest }) => {
                            warn!("Refresh worker result superseded by refresh {}", latest);
                        }
                        Err(e) => {
                            error!("Refresh worker failed to fetch jobs, keeping last snapshot: {}", e);
                        }
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Refresh worker received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!("Refresh worker stopped");
    }
}

/// One refresh cycle: take a token, fetch, then offer the result back.
pub async fn refresh(
    store: &SnapshotStore,
    source: &dyn JobSource,
) -> Result<RefreshOutcome, SourceError> {
    let token = store.begin_refresh();
    let jobs = source.fetch().await?;
    Ok(store.complete_refresh(token, jobs, Utc::now()))
}
