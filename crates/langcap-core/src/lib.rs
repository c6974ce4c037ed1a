pub mod capture;
pub mod clock;
pub mod error;
pub mod preprocess;
pub mod scheduler;
pub mod stats;
pub mod store;

pub use capture::{CaptureOutcome, CaptureResolver, CaptureState, PendingCapture, StartedLookup};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CaptureError, StoreError};
pub use scheduler::{IntervalPolicy, StudyScheduler};
pub use stats::StatsEngine;
pub use store::WordStore;
