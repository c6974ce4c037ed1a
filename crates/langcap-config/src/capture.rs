use langcap_types::CaptureRegion;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_source_language() -> String {
    "fr".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_auto_save() -> bool {
    true
}

fn default_ocr_bounds() -> CaptureRegion {
    CaptureRegion {
        x: 0,
        y: 0,
        width: 800,
        height: 600,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_ocr_bounds")]
    pub ocr_bounds: CaptureRegion,
    /// Store resolved captures right away instead of waiting for confirmation
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            ocr_bounds: default_ocr_bounds(),
            auto_save: default_auto_save(),
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_language.trim().is_empty() {
            return Err(ConfigError::MissingField("sourceLanguage"));
        }
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::MissingField("targetLanguage"));
        }
        if self.ocr_bounds.is_empty() {
            return Err(ConfigError::Invalid(
                "ocrBounds must have a non-zero width and height".to_string(),
            ));
        }
        Ok(())
    }
}
