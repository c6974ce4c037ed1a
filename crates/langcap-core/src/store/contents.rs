use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use langcap_types::{GroupId, ReviewState, StudyLogEntry, Word, WordGroup, WordId};
use serde::{Deserialize, Serialize};

/// A group as persisted. The word count is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl GroupRecord {
    pub fn view(&self, word_count: usize) -> WordGroup {
        WordGroup {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            created_at: self.created_at,
            word_count,
        }
    }
}

/// Everything the store owns. Callers only ever see it by shared reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreContents {
    pub(crate) words: BTreeMap<WordId, Word>,
    pub(crate) groups: BTreeMap<GroupId, GroupRecord>,
    pub(crate) reviews: BTreeMap<WordId, ReviewState>,
    pub(crate) study_log: Vec<StudyLogEntry>,
}

impl StoreContents {
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.words.values()
    }

    pub fn word(&self, id: &WordId) -> Option<&Word> {
        self.words.get(id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupRecord> {
        self.groups.values()
    }

    pub fn group(&self, id: &GroupId) -> Option<&GroupRecord> {
        self.groups.get(id)
    }

    pub fn review(&self, id: &WordId) -> Option<&ReviewState> {
        self.reviews.get(id)
    }

    pub fn study_log(&self) -> &[StudyLogEntry] {
        &self.study_log
    }

    pub fn word_total(&self) -> usize {
        self.words.len()
    }

    pub fn group_total(&self) -> usize {
        self.groups.len()
    }

    /// Members of `group`, counted from the words themselves
    pub fn members_of(&self, group: &GroupId) -> usize {
        self.words.values().filter(|w| w.in_group(group)).count()
    }

    /// Member counts for every group in one pass
    pub fn member_counts(&self) -> HashMap<GroupId, usize> {
        let mut counts: HashMap<GroupId, usize> =
            self.groups.keys().map(|id| (*id, 0)).collect();

        for word in self.words.values() {
            for group in &word.group_ids {
                if let Some(count) = counts.get_mut(group) {
                    *count += 1;
                }
            }
        }

        counts
    }

    pub(crate) fn group_name_taken(&self, name: &str, except: Option<&GroupId>) -> bool {
        self.groups
            .values()
            .any(|g| g.name == name && Some(&g.id) != except)
    }

    /// Drop references that point nowhere. Returns how many were removed.
    pub(crate) fn repair(&mut self) -> usize {
        let mut removed = 0;

        let groups = &self.groups;
        for word in self.words.values_mut() {
            let before = word.group_ids.len();
            word.group_ids.retain(|g| groups.contains_key(g));
            removed += before - word.group_ids.len();
        }

        let words = &self.words;
        let before = self.reviews.len();
        self.reviews.retain(|id, _| words.contains_key(id));
        removed += before - self.reviews.len();

        removed
    }

    /// True when no word references a missing group and no review state
    /// outlives its word
    pub fn is_consistent(&self) -> bool {
        self.words
            .values()
            .all(|w| w.group_ids.iter().all(|g| self.groups.contains_key(g)))
            && self.reviews.keys().all(|id| self.words.contains_key(id))
    }
}
