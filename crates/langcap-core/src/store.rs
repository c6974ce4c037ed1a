//! Word and group storage.
//!
//! All mutations are serialized behind one write lock and applied to a
//! working copy: the copy is validated, persisted, and only then swapped in.
//! Readers hold the read lock and therefore always see a state in which every
//! group reference resolves.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use langcap_types::{
    GroupDraft, GroupId, GroupPatch, ReviewState, StudyLogEntry, Word, WordDraft, WordFilter,
    WordGroup, WordId, WordPatch,
};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;

pub mod contents;
mod filter;
pub mod snapshot;

pub use contents::{GroupRecord, StoreContents};

pub struct WordStore {
    contents: RwLock<StoreContents>,
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl WordStore {
    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            contents: RwLock::new(StoreContents::default()),
            path: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Open the store file at `path`, creating an empty store if it does not
    /// exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut contents = snapshot::load(&path)?;

        let repaired = contents.repair();
        if repaired > 0 {
            tracing::warn!(
                "Dropped {} dangling references while loading {:?}",
                repaired,
                path
            );
            snapshot::save(&path, &contents)?;
        }

        tracing::info!(
            "Opened store {:?}: {} words, {} groups",
            path,
            contents.word_total(),
            contents.group_total()
        );

        Ok(Self {
            contents: RwLock::new(contents),
            path: Some(path),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run `f` against a consistent view of the store
    pub fn read<T>(&self, f: impl FnOnce(&StoreContents) -> T) -> Result<T, StoreError> {
        let guard = self.read_guard()?;
        Ok(f(&guard))
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, StoreContents>, StoreError> {
        self.contents.read().map_err(|_| StoreError::LockPoisoned)
    }

    /// Apply `op` to a working copy; persist and publish it only if every
    /// step succeeds
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut StoreContents) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.contents.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut next = guard.clone();
        let out = op(&mut next)?;
        debug_assert!(next.is_consistent());

        if let Some(path) = &self.path {
            snapshot::save(path, &next)?;
        }

        *guard = next;
        Ok(out)
    }

    // Words

    pub fn create_word(&self, draft: WordDraft) -> Result<Word, StoreError> {
        let created_at = self.clock.now();

        self.mutate(|contents| {
            let word = required("word", &draft.word)?;
            let meaning = required("meaning", &draft.meaning)?;
            check_groups(contents, &draft.group_ids)?;
            let tags = normalize_tags(draft.tags)?;

            let entry = Word {
                id: WordId::new(),
                word,
                meaning,
                pronunciation: optional(draft.pronunciation),
                examples: normalize_examples(draft.examples),
                notes: optional(draft.notes),
                screenshot: draft.screenshot,
                translated_text: draft.translated_text,
                source_language: draft.source_language,
                target_language: draft.target_language,
                created_at,
                is_favorite: draft.is_favorite,
                group_ids: draft.group_ids,
                tags,
            };

            tracing::debug!("Created word '{}' ({})", entry.word, entry.id);
            contents.words.insert(entry.id, entry.clone());
            Ok(entry)
        })
    }

    pub fn update_word(&self, id: &WordId, patch: WordPatch) -> Result<Word, StoreError> {
        self.mutate(|contents| {
            if let Some(groups) = &patch.group_ids {
                check_groups(contents, groups)?;
            }
            let tags = patch.tags.map(normalize_tags).transpose()?;

            let word = contents
                .words
                .get_mut(id)
                .ok_or_else(|| StoreError::word_not_found(id))?;

            if let Some(favorite) = patch.is_favorite {
                word.is_favorite = favorite;
            }
            if let Some(tags) = tags {
                word.tags = tags;
            }
            if let Some(groups) = patch.group_ids {
                word.group_ids = groups;
            }
            if let Some(notes) = patch.notes {
                word.notes = optional(notes);
            }
            if let Some(examples) = patch.examples {
                word.examples = normalize_examples(examples);
            }

            tracing::debug!("Updated word {}", id);
            Ok(word.clone())
        })
    }

    /// Apply a patch received as JSON. Attempts to change capture-time
    /// fields are rejected by name.
    pub fn update_word_json(
        &self,
        id: &WordId,
        patch: serde_json::Value,
    ) -> Result<Word, StoreError> {
        let patch = parse_word_patch(patch)?;
        self.update_word(id, patch)
    }

    pub fn toggle_favorite(&self, id: &WordId) -> Result<Word, StoreError> {
        self.mutate(|contents| {
            let word = contents
                .words
                .get_mut(id)
                .ok_or_else(|| StoreError::word_not_found(id))?;
            word.is_favorite = !word.is_favorite;
            Ok(word.clone())
        })
    }

    pub fn delete_word(&self, id: &WordId) -> Result<(), StoreError> {
        self.mutate(|contents| {
            contents
                .words
                .remove(id)
                .ok_or_else(|| StoreError::word_not_found(id))?;
            contents.reviews.remove(id);

            tracing::debug!("Deleted word {}", id);
            Ok(())
        })
    }

    pub fn get_word(&self, id: &WordId) -> Result<Word, StoreError> {
        self.read(|contents| contents.word(id).cloned())?
            .ok_or_else(|| StoreError::word_not_found(id))
    }

    pub fn list_words(&self, filter: &WordFilter) -> Result<Vec<Word>, StoreError> {
        let query = filter.normalized_query();

        self.read(|contents| {
            if let Some(group) = &filter.group {
                if contents.group(group).is_none() {
                    return Err(StoreError::group_not_found(group));
                }
            }

            let mut words: Vec<Word> = contents
                .words()
                .filter(|w| filter::matches(filter, w, query.as_deref()))
                .cloned()
                .collect();

            words.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            if !filter.oldest_first {
                words.reverse();
            }
            if let Some(limit) = filter.limit {
                words.truncate(limit);
            }

            Ok(words)
        })?
    }

    /// Distinct tags across all words, sorted
    pub fn all_tags(&self) -> Result<Vec<String>, StoreError> {
        self.read(|contents| {
            contents
                .words()
                .flat_map(|w| w.tags.iter().cloned())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    // Groups

    pub fn create_group(&self, draft: GroupDraft) -> Result<WordGroup, StoreError> {
        let created_at = self.clock.now();

        self.mutate(|contents| {
            let name = required("name", &draft.name)?;
            let color = required("color", &draft.color)?;
            if contents.group_name_taken(&name, None) {
                return Err(StoreError::Conflict(format!(
                    "a group named '{name}' already exists"
                )));
            }

            let record = GroupRecord {
                id: GroupId::new(),
                name,
                description: optional(draft.description),
                color,
                created_at,
            };

            tracing::debug!("Created group '{}' ({})", record.name, record.id);
            let view = record.view(0);
            contents.groups.insert(record.id, record);
            Ok(view)
        })
    }

    pub fn update_group(&self, id: &GroupId, patch: GroupPatch) -> Result<WordGroup, StoreError> {
        self.mutate(|contents| {
            let name = patch.name.as_deref().map(|n| required("name", n)).transpose()?;
            let color = patch.color.as_deref().map(|c| required("color", c)).transpose()?;

            if let Some(name) = &name {
                if contents.group_name_taken(name, Some(id)) {
                    return Err(StoreError::Conflict(format!(
                        "a group named '{name}' already exists"
                    )));
                }
            }

            let members = contents.members_of(id);
            let record = contents
                .groups
                .get_mut(id)
                .ok_or_else(|| StoreError::group_not_found(id))?;

            if let Some(name) = name {
                record.name = name;
            }
            if let Some(color) = color {
                record.color = color;
            }
            if let Some(description) = patch.description {
                record.description = optional(description);
            }

            Ok(record.view(members))
        })
    }

    /// Delete a group and strip it from every word in the same step
    pub fn delete_group(&self, id: &GroupId) -> Result<(), StoreError> {
        self.mutate(|contents| {
            if !contents.groups.contains_key(id) {
                return Err(StoreError::group_not_found(id));
            }

            let mut detached = 0;
            for word in contents.words.values_mut() {
                if word.group_ids.remove(id) {
                    detached += 1;
                }
            }
            contents.groups.remove(id);

            tracing::debug!("Deleted group {} ({} words detached)", id, detached);
            Ok(())
        })
    }

    pub fn get_group(&self, id: &GroupId) -> Result<WordGroup, StoreError> {
        self.read(|contents| {
            contents
                .group(id)
                .map(|record| record.view(contents.members_of(id)))
        })?
        .ok_or_else(|| StoreError::group_not_found(id))
    }

    /// All groups, oldest first, with their current word counts
    pub fn list_groups(&self) -> Result<Vec<WordGroup>, StoreError> {
        self.read(|contents| {
            let counts = contents.member_counts();
            let mut groups: Vec<WordGroup> = contents
                .groups()
                .map(|g| g.view(counts.get(&g.id).copied().unwrap_or(0)))
                .collect();
            groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
            groups
        })
    }

    pub fn get_word_count(&self, group: &GroupId) -> Result<usize, StoreError> {
        self.read(|contents| {
            contents
                .group(group)
                .map(|_| contents.members_of(group))
        })?
        .ok_or_else(|| StoreError::group_not_found(group))
    }

    // Study

    /// Replace the review state of `id` with what `next` computes from the
    /// previous state, and append `entry` to the study log, as one mutation
    pub(crate) fn record_review(
        &self,
        id: &WordId,
        at: DateTime<Utc>,
        correct: bool,
        next: impl FnOnce(Option<&ReviewState>) -> ReviewState,
    ) -> Result<ReviewState, StoreError> {
        self.mutate(|contents| {
            if !contents.words.contains_key(id) {
                return Err(StoreError::word_not_found(id));
            }

            let state = next(contents.reviews.get(id));
            contents.reviews.insert(*id, state.clone());
            contents.study_log.push(StudyLogEntry {
                word_id: *id,
                correct,
                at,
            });

            Ok(state)
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_examples(examples: Option<Vec<String>>) -> Option<Vec<String>> {
    let examples: Vec<String> = examples?
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    (!examples.is_empty()).then_some(examples)
}

fn normalize_tags(tags: BTreeSet<String>) -> Result<BTreeSet<String>, StoreError> {
    tags.into_iter()
        .map(|tag| required("tag", &tag))
        .collect()
}

fn check_groups(contents: &StoreContents, groups: &BTreeSet<GroupId>) -> Result<(), StoreError> {
    match groups.iter().find(|g| contents.group(g).is_none()) {
        Some(missing) => Err(StoreError::Validation(format!(
            "group {missing} does not exist"
        ))),
        None => Ok(()),
    }
}

pub fn parse_word_patch(value: serde_json::Value) -> Result<WordPatch, StoreError> {
    if let Some(object) = value.as_object() {
        if let Some(field) = WordPatch::IMMUTABLE_FIELDS
            .iter()
            .find(|f| object.contains_key(**f))
        {
            return Err(StoreError::Validation(format!(
                "{field} cannot be changed after capture"
            )));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| StoreError::Validation(format!("invalid word patch: {e}")))
}

#[cfg(test)]
mod tests;
