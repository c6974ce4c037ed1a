pub mod event;
pub mod filter;
pub mod group;
pub mod id;
pub mod stats;
pub mod study;
pub mod types;
pub mod word;

pub use event::{AppEvent, CaptureStatus, ErrorKind, UiEvent};
pub use filter::WordFilter;
pub use group::{DEFAULT_GROUP_COLOR, GroupDraft, GroupPatch, WordGroup};
pub use id::{GroupId, ParseIdError, WordId};
pub use stats::{GroupCount, UserStats};
pub use study::{ReviewState, StudyLogEntry};
pub use types::{CaptureInput, CaptureRegion, LanguageCode, LookupResult, ScreenshotRef};
pub use word::{Word, WordDraft, WordPatch};
