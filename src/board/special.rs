use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::clock::start_of_day;
use super::job::{Job, JobStatus};

/// Dashboard shortcut that replaces the regular status/date filters.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialFilter {
    Overdue,
    Unassigned,
    Escalated,
    AwaitingAck,
}

impl SpecialFilter {
    /// Map a `filter` URL parameter onto a special filter.
    ///
    /// Returns `None` for anything else, including `in-progress` and raw
    /// status strings, which select a status instead.
    pub fn from_param(raw: &str) -> Option<SpecialFilter> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "overdue" => Some(SpecialFilter::Overdue),
            "unassigned" => Some(SpecialFilter::Unassigned),
            "escalated" => Some(SpecialFilter::Escalated),
            "awaiting-ack" | "awaiting_ack" => Some(SpecialFilter::AwaitingAck),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialFilter::Overdue => "overdue",
            SpecialFilter::Unassigned => "unassigned",
            SpecialFilter::Escalated => "escalated",
            SpecialFilter::AwaitingAck => "awaiting-ack",
        }
    }

    pub fn matches(&self, job: &Job, now: DateTime<FixedOffset>) -> bool {
        match self {
            SpecialFilter::Overdue => is_overdue(job, now),
            SpecialFilter::Unassigned => is_unassigned(job),
            SpecialFilter::Escalated => is_escalated(job),
            SpecialFilter::AwaitingAck => is_awaiting_ack(job),
        }
    }
}

/// Scheduled before the local day containing `now` and still open.
///
/// `New` jobs never count: they surface through the unassigned bucket.
pub fn is_overdue(job: &Job, now: DateTime<FixedOffset>) -> bool {
    if job.is_terminal() || job.status == JobStatus::New {
        return false;
    }
    let today = start_of_day(now);
    job.scheduled_date
        .and_then(|scheduled| scheduled.start_in(*now.offset()))
        .is_some_and(|scheduled| scheduled < today)
}

pub fn is_unassigned(job: &Job) -> bool {
    let assigned = job
        .assigned_technician_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    !assigned && !job.is_terminal()
}

pub fn is_escalated(job: &Job) -> bool {
    let raised = job.is_escalated.unwrap_or(false) || job.escalation_triggered_at.is_some();
    raised && job.escalation_acknowledged_at.is_none()
}

pub fn is_awaiting_ack(job: &Job) -> bool {
    job.status == JobStatus::CompletedAwaitingAck
}
