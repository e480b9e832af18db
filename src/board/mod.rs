//! Job-board filtering and prioritisation.
//!
//! Everything in here is a pure computation over a job snapshot plus an
//! injected clock; fetching and pushing snapshots happens elsewhere.

pub mod clock;
pub mod filter;
pub mod job;
pub mod pipeline;
pub mod search;
pub mod snapshot;
pub mod special;
pub mod urgency;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::{BoardParams, FilterState, StandardFilter, StatusFilter};
pub use job::{DateOrTime, Job, JobStatus, JobType, Priority};
pub use pipeline::{Board, StatusCounts};
pub use snapshot::{apply_remote_event, RefreshOutcome, RemoteEvent, Snapshot, SnapshotStore};
pub use special::SpecialFilter;
pub use urgency::{Urgency, UrgencyPolicy, UrgencyTier};
pub use window::DateWindow;
