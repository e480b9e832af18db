use chrono::{DateTime, Duration, FixedOffset, Months, Utc};
use serde::Serialize;

use super::clock::{end_of_day, local_midnight, start_of_day};
use super::job::{DateOrTime, Job};

/// Date selector shown next to the status dropdown.
///
/// `Unfinished` shares the enumeration for compatibility with existing
/// links but is a status check, not a date range.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWindow {
    Today,
    Week,
    Month,
    /// A date-only `to` bound covers that whole day.
    Custom {
        from: Option<DateOrTime>,
        to: Option<DateOrTime>,
    },
    All,
    #[default]
    Unfinished,
}

impl DateWindow {
    /// Parse the `date` URL parameter. Custom bounds are supplied separately.
    pub fn from_param(
        raw: &str,
        from: Option<DateOrTime>,
        to: Option<DateOrTime>,
    ) -> Option<DateWindow> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" => Some(DateWindow::Today),
            "week" => Some(DateWindow::Week),
            "month" => Some(DateWindow::Month),
            "custom" => Some(DateWindow::Custom { from, to }),
            "all" => Some(DateWindow::All),
            "unfinished" => Some(DateWindow::Unfinished),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateWindow::Today => "today",
            DateWindow::Week => "week",
            DateWindow::Month => "month",
            DateWindow::Custom { .. } => "custom",
            DateWindow::All => "all",
            DateWindow::Unfinished => "unfinished",
        }
    }

    /// Whether `job` falls inside this window as seen at `now`.
    ///
    /// Date-based windows reject jobs without a usable effective date.
    pub fn matches(&self, job: &Job, now: DateTime<FixedOffset>) -> bool {
        match self {
            DateWindow::All => true,
            DateWindow::Unfinished => !job.status.is_finished(),
            _ => match job.effective_date(*now.offset()) {
                Some(date) => self.contains(date, now),
                None => false,
            },
        }
    }

    fn contains(&self, date: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
        let today = start_of_day(now);
        let offset = *now.offset();
        match self {
            DateWindow::Today => date >= today && date < end_of_day(now),
            DateWindow::Week => date >= today - Duration::days(7),
            DateWindow::Month => match today.checked_sub_months(Months::new(1)) {
                Some(cutoff) => date >= cutoff,
                None => true,
            },
            DateWindow::Custom { from, to } => {
                let after_from = from
                    .and_then(|from| from.start_in(offset))
                    .map_or(true, |from| date >= from);
                after_from && to.map_or(true, |to| not_after(date, to, offset))
            }
            DateWindow::All | DateWindow::Unfinished => true,
        }
    }
}

fn not_after(date: DateTime<Utc>, to: DateOrTime, offset: FixedOffset) -> bool {
    match to {
        DateOrTime::Instant(to) => date <= to,
        DateOrTime::Day(day) => {
            let end = day.succ_opt().and_then(|next| local_midnight(next, offset));
            end.map_or(true, |end| date < end)
        }
    }
}
