use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::clock::local_midnight;

/// Workflow state of a job as stored upstream
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Assigned,
    InProgress,
    AwaitingFinalization,
    Completed,
    CompletedAwaitingAck,
    IncompleteContinuing,
    IncompleteReassigned,
    Disputed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub const ALL: [JobStatus; 10] = [
        JobStatus::New,
        JobStatus::Assigned,
        JobStatus::InProgress,
        JobStatus::AwaitingFinalization,
        JobStatus::Completed,
        JobStatus::CompletedAwaitingAck,
        JobStatus::IncompleteContinuing,
        JobStatus::IncompleteReassigned,
        JobStatus::Disputed,
        JobStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Assigned => "assigned",
            JobStatus::InProgress => "in_progress",
            JobStatus::AwaitingFinalization => "awaiting_finalization",
            JobStatus::Completed => "completed",
            JobStatus::CompletedAwaitingAck => "completed_awaiting_ack",
            JobStatus::IncompleteContinuing => "incomplete_continuing",
            JobStatus::IncompleteReassigned => "incomplete_reassigned",
            JobStatus::Disputed => "disputed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Parse a status as it appears in a URL parameter.
    ///
    /// Accepts both the stored snake_case spelling and the kebab-case one
    /// used by dashboard links (`in-progress`, `awaiting-ack`).
    pub fn parse(raw: &str) -> Option<JobStatus> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        if normalized == "awaiting_ack" {
            return Some(JobStatus::CompletedAwaitingAck);
        }
        JobStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
    }

    /// Statuses no longer actionable by dispatch.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::CompletedAwaitingAck
        )
    }

    /// Finished from the technician's point of view.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::CompletedAwaitingAck)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Service,
    Repair,
    Checking,
    #[serde(alias = "slot-in", alias = "Slot-In")]
    SlotIn,
    Courier,
    #[default]
    #[serde(other)]
    Unknown,
}

/// `Unknown` ranks with the lowest priorities.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Emergency,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CustomerRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ForkliftRef {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// A service work order as delivered by the external store.
///
/// Only the fields the board reads are modelled; anything else in the row
/// is dropped on deserialization. Every timestamp goes through
/// [`lenient_timestamp`] and every enum through [`lenient_enum`], so a
/// missing, null or malformed value reads as absent (or `Unknown`) rather
/// than failing the row.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub job_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub job_type: JobType,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_date")]
    pub scheduled_date: Option<DateOrTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_technician_id: Option<String>,
    #[serde(default)]
    pub assigned_technician_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub sla_target_minutes: Option<i64>,
    #[serde(default)]
    pub is_escalated: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub escalation_triggered_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub escalation_acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub forklift: Option<ForkliftRef>,
}

impl Job {
    /// Scheduled date when present, otherwise the creation date.
    ///
    /// A date-only schedule starts at local midnight in `offset`.
    pub fn effective_date(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        self.scheduled_date
            .and_then(|scheduled| scheduled.start_in(offset))
            .or(self.created_at)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// SLA window for acknowledgement, falling back to `slot_in_default`
    /// for slot-in jobs that carry no explicit target.
    pub fn sla_target_minutes(&self, slot_in_default: i64) -> Option<i64> {
        match (self.sla_target_minutes, self.job_type) {
            (Some(minutes), _) => Some(minutes),
            (None, JobType::SlotIn) => Some(slot_in_default),
            (None, _) => None,
        }
    }

    /// Slot-in job still waiting for dispatch acknowledgement.
    pub fn is_slot_in_pending(&self) -> bool {
        self.job_type == JobType::SlotIn && self.acknowledged_at.is_none() && !self.is_terminal()
    }
}

/// A date column that may carry a full instant or only a calendar day.
///
/// Calendar days have no timezone of their own; they are placed on the
/// timeline in whatever local offset the board is evaluated in.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum DateOrTime {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

impl DateOrTime {
    pub fn parse(raw: &str) -> Option<DateOrTime> {
        let raw = raw.trim();
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(day) => Some(DateOrTime::Day(day)),
            Err(_) => parse_timestamp(raw).map(DateOrTime::Instant),
        }
    }

    /// First instant covered by this value in `offset`'s local time.
    pub fn start_in(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        match self {
            DateOrTime::Instant(at) => Some(*at),
            DateOrTime::Day(day) => local_midnight(*day, offset),
        }
    }
}

impl From<DateTime<Utc>> for DateOrTime {
    fn from(at: DateTime<Utc>) -> Self {
        DateOrTime::Instant(at)
    }
}

/// Parse a timestamp the way the upstream store may render it.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter: any string that does not parse becomes `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

/// Serde adapter for [`DateOrTime`] columns: unparseable values become `None`.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateOrTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => DateOrTime::parse(&s),
        _ => None,
    })
}

/// Serde adapter for enum columns: null or unrecognised values fall back to
/// the enum's default.
pub fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or_default())
}

/// Serde adapter for minute counts sent as integers, floats or strings.
pub fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().and_then(whole_minutes))
        }
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_minutes))
        }
        _ => None,
    })
}

fn whole_minutes(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}
