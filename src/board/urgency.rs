use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Share of the SLA window left below which a dispatch shows as a warning.
pub const DEFAULT_WARNING_FRACTION: f64 = 0.5;

/// Share of the SLA window left below which a dispatch shows as critical.
pub const DEFAULT_CRITICAL_FRACTION: f64 = 0.2;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Ok,
    Warning,
    Critical,
    Expired,
    /// Dispatch was acknowledged; the countdown no longer applies.
    Acknowledged,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Urgency {
    pub remaining_ms: i64,
    pub tier: UrgencyTier,
}

/// Tier thresholds, expressed as fractions of the SLA target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrgencyPolicy {
    pub warning_fraction: f64,
    pub critical_fraction: f64,
}

impl Default for UrgencyPolicy {
    fn default() -> Self {
        Self {
            warning_fraction: DEFAULT_WARNING_FRACTION,
            critical_fraction: DEFAULT_CRITICAL_FRACTION,
        }
    }
}

impl UrgencyPolicy {
    /// Classify the acknowledgement countdown of a job at `now`.
    ///
    /// `remaining_ms` is `created_at + sla_target_minutes - now` and is
    /// always computed, even for acknowledged jobs, so callers can still
    /// report how early or late the acknowledgement was.
    ///
    /// `None` when the deadline falls outside the representable date range.
    pub fn classify(
        &self,
        created_at: DateTime<Utc>,
        acknowledged_at: Option<DateTime<Utc>>,
        sla_target_minutes: i64,
        now: DateTime<Utc>,
    ) -> Option<Urgency> {
        let deadline = Duration::try_minutes(sla_target_minutes)
            .and_then(|target| created_at.checked_add_signed(target))?;
        let remaining_ms = (deadline - now).num_milliseconds();

        let tier = if acknowledged_at.is_some() {
            UrgencyTier::Acknowledged
        } else {
            self.tier_for(remaining_ms, sla_target_minutes)
        };

        Some(Urgency { remaining_ms, tier })
    }

    fn tier_for(&self, remaining_ms: i64, sla_target_minutes: i64) -> UrgencyTier {
        if remaining_ms <= 0 {
            return UrgencyTier::Expired;
        }

        let target_ms = sla_target_minutes.max(0).saturating_mul(60_000) as f64;
        let remaining = remaining_ms as f64;

        if remaining < target_ms * self.critical_fraction {
            UrgencyTier::Critical
        } else if remaining < target_ms * self.warning_fraction {
            UrgencyTier::Warning
        } else {
            UrgencyTier::Ok
        }
    }
}
