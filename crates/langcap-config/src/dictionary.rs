use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder a custom endpoint template must contain for the query text
pub const TEXT_PLACEHOLDER: &str = "{text}";
pub const SOURCE_PLACEHOLDER: &str = "{source}";
pub const TARGET_PLACEHOLDER: &str = "{target}";

fn default_free_dictionary_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries".to_string()
}

fn default_translate_url() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DictionaryProviderKind {
    #[default]
    #[serde(rename = "free-dictionary")]
    FreeDictionary,
    #[serde(rename = "google-translate", alias = "translation-api")]
    TranslationApi,
    #[serde(rename = "custom")]
    Custom,
}

impl DictionaryProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeDictionary => "free-dictionary",
            Self::TranslationApi => "google-translate",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DictionaryProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DictionaryProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free-dictionary" => Ok(Self::FreeDictionary),
            "google-translate" | "translation-api" => Ok(Self::TranslationApi),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DictionaryConfig {
    #[serde(rename = "dictionaryProvider")]
    pub provider: DictionaryProviderKind,
    /// Endpoint template for the custom provider, e.g.
    /// `https://dict.example.com/lookup?q={text}&from={source}&to={target}`
    pub custom_dictionary_url: Option<String>,
    #[serde(default = "default_free_dictionary_url")]
    pub free_dictionary_url: String,
    #[serde(default = "default_translate_url")]
    pub translate_api_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            provider: DictionaryProviderKind::default(),
            custom_dictionary_url: None,
            free_dictionary_url: default_free_dictionary_url(),
            translate_api_url: default_translate_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl DictionaryConfig {
    /// Check that the selected provider has what it needs before any request
    /// goes out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeoutSeconds must be greater than zero".to_string(),
            ));
        }

        match self.provider {
            DictionaryProviderKind::FreeDictionary => {
                if self.free_dictionary_url.trim().is_empty() {
                    return Err(ConfigError::MissingField("freeDictionaryUrl"));
                }
            }
            DictionaryProviderKind::TranslationApi => {
                if self.api_key.trim().is_empty() {
                    return Err(ConfigError::MissingField("apiKey"));
                }
                if self.translate_api_url.trim().is_empty() {
                    return Err(ConfigError::MissingField("translateApiUrl"));
                }
            }
            DictionaryProviderKind::Custom => {
                self.custom_template()?;
            }
        }

        Ok(())
    }

    /// The custom endpoint template, checked for the text placeholder
    pub fn custom_template(&self) -> Result<&str, ConfigError> {
        let template = self
            .custom_dictionary_url
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingField("customDictionaryUrl"))?;

        if !template.contains(TEXT_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "customDictionaryUrl must contain the {TEXT_PLACEHOLDER} placeholder"
            )));
        }

        Ok(template)
    }
}
