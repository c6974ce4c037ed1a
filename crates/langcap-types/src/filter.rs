use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::GroupId;

/// Criteria for listing words. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WordFilter {
    pub group: Option<GroupId>,
    pub tag: Option<String>,
    pub favorites_only: bool,
    /// Inclusive lower bound on `createdAt`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `createdAt`
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the word, meaning or translation
    pub query: Option<String>,
    pub oldest_first: bool,
    pub limit: Option<usize>,
}

impl WordFilter {
    pub fn in_group(group: GroupId) -> Self {
        Self {
            group: Some(group),
            ..Default::default()
        }
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
            ..Default::default()
        }
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            created_from: Some(from),
            created_to: Some(to),
            ..Default::default()
        }
    }

    /// Lowercased query, or None when blank
    pub fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_ignored() {
        let filter = WordFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.normalized_query(), None);
    }

    #[test]
    fn filter_fields_default_when_missing() {
        let filter: WordFilter = serde_json::from_str(r#"{"favoritesOnly": true}"#).unwrap();
        assert_eq!(filter, WordFilter::favorites());
    }
}
