use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::id::{GroupId, WordId};
use crate::types::{LanguageCode, LookupResult, ScreenshotRef};

/// A captured vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub screenshot: ScreenshotRef,
    pub translated_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
    #[serde(default)]
    pub group_ids: BTreeSet<GroupId>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Word {
    pub fn in_group(&self, group: &GroupId) -> bool {
        self.group_ids.contains(group)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Everything needed to create a [`Word`] except the id and timestamp,
/// which the store assigns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WordDraft {
    pub word: String,
    pub meaning: String,
    pub pronunciation: Option<String>,
    pub examples: Option<Vec<String>>,
    pub notes: Option<String>,
    pub screenshot: ScreenshotRef,
    pub translated_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub is_favorite: bool,
    pub group_ids: BTreeSet<GroupId>,
    pub tags: BTreeSet<String>,
}

impl WordDraft {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Default::default()
        }
    }

    /// Compose a draft from a provider lookup for the captured `text`
    pub fn from_lookup(
        text: impl Into<String>,
        lookup: LookupResult,
        screenshot: ScreenshotRef,
        source_language: LanguageCode,
        target_language: LanguageCode,
    ) -> Self {
        let examples = if lookup.examples.is_empty() {
            None
        } else {
            Some(lookup.examples)
        };

        Self {
            word: text.into(),
            meaning: lookup.meaning,
            pronunciation: lookup.pronunciation,
            examples,
            notes: None,
            screenshot,
            translated_text: lookup.translated_text,
            source_language,
            target_language,
            is_favorite: false,
            group_ids: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_languages(mut self, source: &str, target: &str) -> Self {
        self.source_language = source.to_string();
        self.target_language = target.to_string();
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.group_ids = groups.into_iter().collect();
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Changes allowed on an existing word.
///
/// `None` leaves a field untouched. For the optional fields, `Some(None)`
/// (JSON `null`) clears the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WordPatch {
    pub is_favorite: Option<bool>,
    pub tags: Option<BTreeSet<String>>,
    pub group_ids: Option<BTreeSet<GroupId>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub examples: Option<Option<Vec<String>>>,
}

impl WordPatch {
    /// Fields fixed at capture time, as they are spelled on the wire
    pub const IMMUTABLE_FIELDS: &'static [&'static str] = &[
        "id",
        "word",
        "meaning",
        "pronunciation",
        "screenshot",
        "translatedText",
        "sourceLanguage",
        "targetLanguage",
        "createdAt",
    ];

    pub fn favorite(value: bool) -> Self {
        Self {
            is_favorite: Some(value),
            ..Default::default()
        }
    }

    pub fn groups(groups: impl IntoIterator<Item = GroupId>) -> Self {
        Self {
            group_ids: Some(groups.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn tags<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
