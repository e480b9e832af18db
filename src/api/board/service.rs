use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::validation::ErrorResponse;
use crate::board::{
    Board, BoardParams, Clock, FilterState, RefreshOutcome, RemoteEvent, SnapshotStore,
    StatusCounts,
};
use crate::error::SourceError;
use crate::source::JobSource;
use crate::worker::refresh_worker;
use super::dto::{BoardResponse, BoardRow, EventResponse, RefreshResponse};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The job source could not be read
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A newer refresh started before this one finished
    #[error("Refresh superseded by refresh {0}")]
    Superseded(u64),

    /// No snapshot has been loaded yet
    #[error("Job snapshot not loaded yet")]
    NotLoaded,
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Source(e) => {
                error!("Source error: {}", e);
                HttpResponse::BadGateway().json(ErrorResponse {
                    error: "Failed to refresh jobs".to_string(),
                    fields: serde_json::json!({"message": "Job source unavailable, serving last snapshot"}),
                })
            }
            ServiceError::Superseded(latest) => {
                warn!("Refresh superseded by refresh {}", latest);
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Refresh superseded".to_string(),
                    fields: serde_json::json!({"message": format!("A newer refresh ({}) is in progress", latest)}),
                })
            }
            ServiceError::NotLoaded => {
                warn!("Board used before first snapshot load");
                HttpResponse::ServiceUnavailable().json(ErrorResponse {
                    error: "Not ready".to_string(),
                    fields: serde_json::json!({"message": "Job snapshot has not been loaded yet"}),
                })
            }
        }
    }
}

/// Board service wiring the snapshot store to the filter pipeline
pub struct BoardService {
    store: Arc<SnapshotStore>,
    source: Arc<dyn JobSource>,
    board: Board,
    clock: Arc<dyn Clock>,
}

impl BoardService {
    /// Create a new BoardService instance
    pub fn new(
        store: Arc<SnapshotStore>,
        source: Arc<dyn JobSource>,
        board: Board,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            source,
            board,
            clock,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Render one board view
    ///
    /// # Business Logic
    /// - Builds the filter state from URL parameters
    /// - Runs the pipeline over the current snapshot
    /// - Attaches the SLA countdown to every row that has one
    pub fn view(&self, params: &BoardParams) -> Result<BoardResponse, ServiceError> {
        if !self.store.is_loaded() {
            return Err(ServiceError::NotLoaded);
        }

        let snapshot = self.store.current();
        let state = FilterState::from_params(params);
        let now = self.clock.now_utc();

        let jobs: Vec<BoardRow> = self
            .board
            .apply(&snapshot.jobs, &state, self.clock.as_ref())
            .into_iter()
            .map(|job| BoardRow {
                urgency: self.board.urgency(job, now),
                job: job.clone(),
            })
            .collect();

        info!(
            "Service: Board view revision={} returned {} jobs",
            snapshot.revision,
            jobs.len()
        );

        Ok(BoardResponse {
            has_active_filters: state.has_active_filters(),
            filter: state,
            total: jobs.len(),
            revision: snapshot.revision,
            refreshed_at: self.store.last_refreshed_at(),
            counts: self.board.status_counts(&snapshot.jobs, self.clock.as_ref()),
            jobs,
        })
    }

    pub fn counts(&self) -> Result<StatusCounts, ServiceError> {
        if !self.store.is_loaded() {
            return Err(ServiceError::NotLoaded);
        }
        let snapshot = self.store.current();
        Ok(self.board.status_counts(&snapshot.jobs, self.clock.as_ref()))
    }

    /// Merge a realtime event into the live snapshot
    ///
    /// Refused until the first snapshot is loaded, since that load would
    /// replace whatever the event changed.
    pub fn apply_event(&self, event: RemoteEvent) -> Result<EventResponse, ServiceError> {
        if !self.store.is_loaded() {
            return Err(ServiceError::NotLoaded);
        }

        let job_id = event.job_id().to_string();
        let before = self.store.current().revision;
        let snapshot = self.store.apply_event(event);

        let message = if snapshot.revision == before {
            info!("Service: Event for job {} changed nothing", job_id);
            format!("No change for job {}", job_id)
        } else {
            info!("Service: Applied event for job {} (revision {})", job_id, snapshot.revision);
            format!("Applied event for job {}", job_id)
        };

        Ok(EventResponse {
            message,
            revision: snapshot.revision,
            total: snapshot.jobs.len(),
        })
    }

    /// Refresh the snapshot from the source right now
    pub async fn refresh(&self) -> Result<RefreshResponse, ServiceError> {
        info!("Service: Manual refresh requested");

        match refresh_worker::refresh(&self.store, self.source.as_ref()).await? {
            RefreshOutcome::Applied { revision } => Ok(RefreshResponse {
                message: "Snapshot refreshed".to_string(),
                revision,
            }),
            RefreshOutcome::Superseded { latest } => Err(ServiceError::Superseded(latest)),
        }
    }
}
