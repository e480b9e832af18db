use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use super::job::{DateOrTime, Job, JobStatus};
use super::special::SpecialFilter;
use super::window::DateWindow;

/// Raw board query parameters as they appear in the page URL.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct BoardParams {
    /// `overdue`, `unassigned`, `escalated`, `awaiting-ack`, `in-progress`
    /// or a raw status string.
    #[validate(length(max = 64, message = "filter must be at most 64 characters"))]
    pub filter: Option<String>,

    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub search: Option<String>,

    /// `today`, `week`, `month`, `custom`, `all` or `unfinished`.
    #[validate(length(max = 32, message = "date must be at most 32 characters"))]
    pub date: Option<String>,

    #[validate(length(max = 64, message = "status must be at most 64 characters"))]
    pub status: Option<String>,

    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl StatusFilter {
    pub fn matches(&self, job: &Job) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => job.status == *status,
        }
    }
}

/// The regular search + status + date combination.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct StandardFilter {
    pub search: String,
    pub status: StatusFilter,
    pub window: DateWindow,
}

/// Filter state of one board view.
///
/// A special filter replaces the standard filters outright; the two are
/// never combined.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterState {
    Special { which: SpecialFilter },
    Standard(StandardFilter),
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState::Standard(StandardFilter::default())
    }
}

impl FilterState {
    pub fn special(which: SpecialFilter) -> Self {
        FilterState::Special { which }
    }

    /// Build the initial state of a view from its URL parameters.
    ///
    /// Unrecognised values fall back to the defaults instead of failing, so
    /// a stale bookmark still renders a board.
    pub fn from_params(params: &BoardParams) -> Self {
        let filter = params.filter.as_deref().map(str::trim).filter(|f| !f.is_empty());

        if let Some(which) = filter.and_then(SpecialFilter::from_param) {
            debug!("Board filter: special={}", which.as_str());
            return FilterState::special(which);
        }

        let mut status = filter.map(parse_status_param).unwrap_or_default();
        if let Some(raw) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
            status = parse_status_param(raw);
        }

        let from = params.from.as_deref().and_then(parse_bound);
        let to = params.to.as_deref().and_then(parse_bound);

        let window = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(raw) => DateWindow::from_param(raw, from, to).unwrap_or_else(|| {
                warn!("Ignoring unknown date window: {}", raw);
                DateWindow::default()
            }),
            // A status picked from a dashboard link would be hidden by the
            // unfinished default when it is a finished status.
            None if status != StatusFilter::All => DateWindow::All,
            None => DateWindow::default(),
        };

        FilterState::Standard(StandardFilter {
            search: params.search.clone().unwrap_or_default(),
            status,
            window,
        })
    }

    pub fn has_active_filters(&self) -> bool {
        match self {
            FilterState::Special { .. } => true,
            FilterState::Standard(standard) => {
                !standard.search.trim().is_empty()
                    || standard.status != StatusFilter::All
                    || standard.window != DateWindow::default()
            }
        }
    }
}

fn parse_status_param(raw: &str) -> StatusFilter {
    if raw.trim().eq_ignore_ascii_case("all") {
        return StatusFilter::All;
    }
    match JobStatus::parse(raw) {
        Some(status) => StatusFilter::Only(status),
        None => {
            warn!("Ignoring unknown status filter: {}", raw);
            StatusFilter::All
        }
    }
}

fn parse_bound(raw: &str) -> Option<DateOrTime> {
    let parsed = DateOrTime::parse(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!("Ignoring malformed custom date bound: {}", raw);
    }
    parsed
}
