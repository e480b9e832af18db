use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};

/// Source of "now" for everything on the board that depends on wall time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    pub fn at_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.fixed_offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Midnight starting `day` in `offset`'s local time.
pub fn local_midnight(day: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(offset).single())
        .map(|local| local.with_timezone(&Utc))
}

/// Local midnight that starts the day containing `now`.
pub fn start_of_day(now: DateTime<FixedOffset>) -> DateTime<Utc> {
    local_midnight(now.date_naive(), *now.offset()).unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Exclusive end of the local day containing `now`.
pub fn end_of_day(now: DateTime<FixedOffset>) -> DateTime<Utc> {
    start_of_day(now) + Duration::days(1)
}
