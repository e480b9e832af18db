use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::debug;

use super::clock::Clock;
use super::filter::FilterState;
use super::job::{Job, JobStatus, Priority};
use super::search;
use super::special::{self, SpecialFilter};
use super::urgency::{Urgency, UrgencyPolicy, UrgencyTier};

/// Default acknowledgement window for slot-in jobs without an explicit target.
pub const DEFAULT_SLOT_IN_SLA_MINUTES: i64 = 15;

/// Per-bucket totals behind the dashboard quick-stat widgets.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub overdue: usize,
    pub unassigned: usize,
    pub escalated: usize,
    pub awaiting_ack: usize,
    pub slot_in_pending: usize,
    pub sla_expired: usize,
}

/// Filter-and-sort pipeline for the job board.
#[derive(Debug, Clone, Copy)]
pub struct Board {
    policy: UrgencyPolicy,
    slot_in_sla_minutes: i64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(UrgencyPolicy::default(), DEFAULT_SLOT_IN_SLA_MINUTES)
    }
}

struct SortKey {
    /// Remaining SLA time for slot-in jobs awaiting acknowledgement.
    pending_remaining_ms: Option<i64>,
    emergency: bool,
    effective_date: Option<DateTime<Utc>>,
}

impl Board {
    pub fn new(policy: UrgencyPolicy, slot_in_sla_minutes: i64) -> Self {
        Self {
            policy,
            slot_in_sla_minutes,
        }
    }

    pub fn policy(&self) -> &UrgencyPolicy {
        &self.policy
    }

    /// Acknowledgement countdown for jobs that carry an SLA.
    ///
    /// `None` when the job has no SLA target, no usable creation time, or
    /// a target too large to place a deadline on the calendar.
    pub fn urgency(&self, job: &Job, now: DateTime<Utc>) -> Option<Urgency> {
        let created_at = job.created_at?;
        let target = job.sla_target_minutes(self.slot_in_sla_minutes)?;
        self.policy.classify(created_at, job.acknowledged_at, target, now)
    }

    /// Filter `jobs` with `state` and order the survivors for display.
    ///
    /// Soft-deleted jobs are always dropped. The input is left untouched
    /// and every surviving job appears exactly once.
    pub fn apply<'a>(
        &self,
        jobs: &'a [Job],
        state: &FilterState,
        clock: &dyn Clock,
    ) -> Vec<&'a Job> {
        let now = clock.now();

        let mut keyed: Vec<(SortKey, &Job)> = jobs
            .iter()
            .filter(|job| !job.is_deleted())
            .filter(|job| match state {
                FilterState::Special { which } => which.matches(job, now),
                FilterState::Standard(standard) => {
                    search::matches(job, &standard.search)
                        && standard.status.matches(job)
                        && standard.window.matches(job, now)
                }
            })
            .map(|job| (self.sort_key(job, now), job))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| compare(a, b));

        debug!(
            "Board pipeline: {} of {} jobs selected",
            keyed.len(),
            jobs.len()
        );

        keyed.into_iter().map(|(_, job)| job).collect()
    }

    /// Count active (non-deleted) jobs per widget bucket.
    pub fn status_counts(&self, jobs: &[Job], clock: &dyn Clock) -> StatusCounts {
        let now = clock.now();
        let now_utc = now.with_timezone(&Utc);

        let mut counts = StatusCounts::default();
        for status in JobStatus::ALL {
            counts.by_status.insert(status.as_str(), 0);
        }

        for job in jobs.iter().filter(|job| !job.is_deleted()) {
            counts.total += 1;
            *counts.by_status.entry(job.status.as_str()).or_insert(0) += 1;

            if special::is_overdue(job, now) {
                counts.overdue += 1;
            }
            if special::is_unassigned(job) {
                counts.unassigned += 1;
            }
            if special::is_escalated(job) {
                counts.escalated += 1;
            }
            if SpecialFilter::AwaitingAck.matches(job, now) {
                counts.awaiting_ack += 1;
            }
            if job.is_slot_in_pending() {
                counts.slot_in_pending += 1;
                let expired = self
                    .urgency(job, now_utc)
                    .is_some_and(|u| u.tier == UrgencyTier::Expired);
                if expired {
                    counts.sla_expired += 1;
                }
            }
        }

        counts
    }

    fn sort_key(&self, job: &Job, now: DateTime<FixedOffset>) -> SortKey {
        let pending_remaining_ms = if job.is_slot_in_pending() {
            // No countdown means last among the pending.
            Some(
                self.urgency(job, now.with_timezone(&Utc))
                    .map(|u| u.remaining_ms)
                    .unwrap_or(i64::MAX),
            )
        } else {
            None
        };

        SortKey {
            pending_remaining_ms,
            emergency: job.priority == Priority::Emergency,
            effective_date: job.effective_date(*now.offset()),
        }
    }
}

fn compare(a: &SortKey, b: &SortKey) -> Ordering {
    let pending = match (a.pending_remaining_ms, b.pending_remaining_ms) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    pending
        .then_with(|| b.emergency.cmp(&a.emergency))
        .then_with(|| match (a.effective_date, b.effective_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
