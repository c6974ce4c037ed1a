use chrono::{DateTime, Utc};
use langcap_types::CaptureStatus;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default)]
struct CaptureCounters {
    /// Lookups started and not yet finished; a superseded one may still be
    /// winding down
    in_flight: u32,
    last_capture_time: Option<DateTime<Utc>>,
    capture_count: u64,
    error_count: u64,
}

/// Application status
#[derive(Default)]
pub struct AppStatus {
    capture: RwLock<CaptureCounters>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lookup_started(&self) {
        self.capture.write().await.in_flight += 1;
    }

    pub async fn capture_saved(&self, at: DateTime<Utc>) {
        let mut capture = self.capture.write().await;
        capture.capture_count += 1;
        capture.last_capture_time = Some(at);
    }

    /// A lookup ended in an error
    pub async fn lookup_failed(&self) {
        let mut capture = self.capture.write().await;
        capture.in_flight = capture.in_flight.saturating_sub(1);
        capture.error_count += 1;
    }

    /// A capture failed without a lookup running
    pub async fn capture_failed(&self) {
        self.capture.write().await.error_count += 1;
    }

    /// Lookup ended without an error
    pub async fn lookup_finished(&self) {
        let mut capture = self.capture.write().await;
        capture.in_flight = capture.in_flight.saturating_sub(1);
    }

    pub async fn snapshot(&self, state: &str) -> CaptureStatus {
        let capture = self.capture.read().await;
        CaptureStatus {
            state: state.to_string(),
            capturing: capture.in_flight > 0,
            capture_count: capture.capture_count,
            error_count: capture.error_count,
            last_capture_time: capture.last_capture_time,
        }
    }
}
