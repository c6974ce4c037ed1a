use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::WordFilter;
use crate::group::{GroupDraft, GroupPatch, WordGroup};
use crate::id::{GroupId, WordId};
use crate::stats::{GroupCount, UserStats};
use crate::study::ReviewState;
use crate::types::{CaptureInput, CaptureRegion, ScreenshotRef};
use crate::word::{Word, WordDraft};

/// Requests sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum AppEvent {
    /// Start and resolve a capture from one OCR bundle
    Capture(CaptureInput),
    SelectRegion {
        region: CaptureRegion,
        screenshot: ScreenshotRef,
    },
    SubmitText(String),
    ResolveCapture,
    ConfirmCapture,
    DiscardCapture,
    RetryCapture,
    CancelCapture,
    ResetCapture,
    SetActiveGroups(Vec<GroupId>),
    CaptureStatus,

    CreateWord(WordDraft),
    /// Raw JSON patch; capture-time fields are rejected by name
    UpdateWord {
        id: WordId,
        patch: serde_json::Value,
    },
    ToggleFavorite(WordId),
    DeleteWord(WordId),
    GetWord(WordId),
    ListWords(WordFilter),
    ListTags,

    CreateGroup(GroupDraft),
    UpdateGroup {
        id: GroupId,
        patch: GroupPatch,
    },
    DeleteGroup(GroupId),
    GetGroup(GroupId),
    ListGroups,
    GetWordCount(GroupId),

    Stats,
    GroupBreakdown,
    /// `limit` falls back to the configured session size
    DueWords {
        #[serde(default)]
        limit: Option<usize>,
    },
    RecordOutcome {
        id: WordId,
        correct: bool,
    },
    GetReviewState(WordId),

    ConfigChanged,
    Shutdown,
}

/// Replies and notifications sent back to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum UiEvent {
    BackendReady,
    CaptureState(String),
    CaptureSaved(Word),
    CaptureAwaitingConfirmation(WordDraft),
    CaptureCancelled,
    CaptureStatus(CaptureStatus),
    Word(Word),
    Words(Vec<Word>),
    Tags(Vec<String>),
    Group(WordGroup),
    Groups(Vec<WordGroup>),
    WordCount { group: GroupId, count: usize },
    Deleted { id: String },
    Stats(UserStats),
    GroupBreakdown(Vec<GroupCount>),
    ReviewState {
        word: WordId,
        state: Option<ReviewState>,
    },
    Ack,
    Error {
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    EmptyCapture,
    Lookup,
    InvalidState,
    Storage,
    Config,
}

/// Running capture counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatus {
    pub state: String,
    pub capturing: bool,
    pub capture_count: u64,
    pub error_count: u64,
    pub last_capture_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_tagged_json() {
        let event: AppEvent =
            serde_json::from_str(r#"{"type": "dueWords", "data": {}}"#).unwrap();
        assert_eq!(event, AppEvent::DueWords { limit: None });

        let event: AppEvent = serde_json::from_str(r#"{"type": "listGroups"}"#).unwrap();
        assert_eq!(event, AppEvent::ListGroups);
    }

    #[test]
    fn capture_request_carries_ocr_bundle() {
        let json = r#"{
            "type": "capture",
            "data": {
                "text": "bonjour",
                "region": {"x": 1, "y": 2, "width": 3, "height": 4},
                "screenshot": "shots/1.png"
            }
        }"#;
        let AppEvent::Capture(input) = serde_json::from_str(json).unwrap() else {
            panic!("expected a capture request");
        };
        assert_eq!(input.text, "bonjour");
        assert_eq!(input.region.height, 4);
        assert_eq!(input.screenshot.as_str(), "shots/1.png");
    }
}
