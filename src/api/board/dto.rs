use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::board::{FilterState, Job, RemoteEvent, StatusCounts, Urgency};

/// One line on the board
#[derive(Serialize)]
pub struct BoardRow {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

/// Response for a board view
#[derive(Serialize)]
pub struct BoardResponse {
    pub filter: FilterState,
    pub has_active_filters: bool,
    pub total: usize,
    pub revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    pub counts: StatusCounts,
    pub jobs: Vec<BoardRow>,
}

/// Realtime change forwarded by the subscription bridge
#[derive(Deserialize, Serialize, Debug)]
#[serde(transparent)]
pub struct EventRequest {
    pub event: RemoteEvent,
}

impl Validate for EventRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.event.job_id().trim().is_empty() {
            let mut error = ValidationError::new("required");
            error.message = Some("Job id must not be empty".into());
            errors.add("id", error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Response for an applied realtime event
#[derive(Serialize)]
pub struct EventResponse {
    pub message: String,
    pub revision: u64,
    pub total: usize,
}

/// Response for a manual refresh
#[derive(Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub revision: u64,
}
