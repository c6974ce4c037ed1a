use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::dictionary::DictionaryConfig;
use self::storage::StorageConfig;
use self::study::StudyConfig;

pub mod capture;
pub mod dictionary;
pub mod storage;
pub mod study;

pub use dictionary::DictionaryProviderKind;

pub const ENV_DATA_DIR: &str = "LANGCAP_DATA_DIR";
pub const ENV_PROVIDER: &str = "LANGCAP_PROVIDER";
pub const ENV_SOURCE_LANG: &str = "LANGCAP_SOURCE_LANG";
pub const ENV_TARGET_LANG: &str = "LANGCAP_TARGET_LANG";
pub const ENV_TIMEOUT_SECONDS: &str = "LANGCAP_TIMEOUT_SECONDS";
pub const ENV_API_KEY: &str = "LANGCAP_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error("Unknown dictionary provider: {0}")]
    UnknownProvider(String),
}

/// Application configuration. The core reads it, never writes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub dictionary: DictionaryConfig,
    pub capture: CaptureConfig,
    pub study: StudyConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Defaults with environment overrides applied
    pub fn new() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(provider) = lookup(ENV_PROVIDER) {
            self.dictionary.provider = provider.parse()?;
        }

        if let Some(lang) = lookup(ENV_SOURCE_LANG) {
            self.capture.source_language = lang;
        }

        if let Some(lang) = lookup(ENV_TARGET_LANG) {
            self.capture.target_language = lang;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECONDS) {
            self.dictionary.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_TIMEOUT_SECONDS} is not a number: {timeout}"))
            })?;
        }

        if let Some(key) = lookup(ENV_API_KEY) {
            self.dictionary.api_key = key;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dictionary.validate()?;
        self.capture.validate()?;
        self.study.validate()?;
        Ok(())
    }
}
