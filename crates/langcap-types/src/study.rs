use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::id::WordId;

/// Review bookkeeping for one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub last_reviewed: DateTime<Utc>,
    /// Current interval, in whole seconds
    pub interval_secs: i64,
    pub due: DateTime<Utc>,
    pub reviews: u32,
    pub streak: u32,
}

impl ReviewState {
    pub fn interval(&self) -> Duration {
        Duration::seconds(self.interval_secs)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }
}

/// One recorded study outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogEntry {
    pub word_id: WordId,
    pub correct: bool,
    pub at: DateTime<Utc>,
}
