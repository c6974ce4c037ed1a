use serde::{Deserialize, Serialize};

/// ISO 639-1 language code ("fr", "en", "ja", ...)
pub type LanguageCode = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Reference to stored screenshot evidence: a file path or an encoded blob.
/// The core stores it verbatim and never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenshotRef(String);

impl ScreenshotRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScreenshotRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ScreenshotRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What the OCR/screenshot layer hands over for one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInput {
    pub text: String,
    pub region: CaptureRegion,
    pub screenshot: ScreenshotRef,
}

/// Result of a dictionary provider lookup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub meaning: String,
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    pub translated_text: String,
}
