use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::GroupId;

/// Aggregate counters shown on the dashboard. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_words: usize,
    pub words_this_week: usize,
    pub words_this_month: usize,
    pub favorite_count: usize,
    pub group_count: usize,
    pub study_sessions: usize,
    pub last_study_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub id: GroupId,
    pub name: String,
    pub word_count: usize,
}
