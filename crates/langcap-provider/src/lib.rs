use std::sync::Arc;
use std::time::Duration;

use langcap_config::ConfigError;
use langcap_config::dictionary::{DictionaryConfig, DictionaryProviderKind};
use langcap_types::LookupResult;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;

mod custom;
mod free_dictionary;
mod translation_api;

#[cfg(test)]
mod test_server;

pub use custom::CustomProvider;
pub use free_dictionary::FreeDictionaryProvider;
pub use translation_api::TranslationApiProvider;

/// Dictionary lookup interface
#[async_trait::async_trait]
pub trait DictionaryProvider: Send + Sync {
    /// Look up `text` written in `source`, explained in `target`
    async fn lookup(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<LookupResult, LookupError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub kind: DictionaryProviderKind,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Dictionary provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("No definition found for '{text}'")]
    NoDefinitionFound { text: String },

    #[error("Invalid provider configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unexpected provider response: {0}")]
    MalformedResponse(String),
}

impl From<ConfigError> for LookupError {
    fn from(e: ConfigError) -> Self {
        LookupError::InvalidConfiguration(e.to_string())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupError::MalformedResponse(e.to_string())
        } else if e.is_builder() {
            LookupError::InvalidConfiguration(e.to_string())
        } else {
            // Timeouts, refused connections, DNS and TLS failures
            LookupError::ProviderUnavailable(e.to_string())
        }
    }
}

impl LookupError {
    pub fn no_definition(text: &str) -> Self {
        LookupError::NoDefinitionFound {
            text: text.to_string(),
        }
    }
}

/// Builds the provider selected in the config
pub trait ProviderFactory: Send + Sync {
    fn build(&self, config: &DictionaryConfig) -> Result<Arc<dyn DictionaryProvider>, LookupError>;
}

/// Factory for the HTTP-backed providers, sharing one connection pool
#[derive(Clone, Default)]
pub struct HttpProviderFactory {
    client: reqwest::Client,
}

impl HttpProviderFactory {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, config: &DictionaryConfig) -> Result<Arc<dyn DictionaryProvider>, LookupError> {
        build_provider(self.client.clone(), config)
    }
}

/// Validate `config` and construct its provider. Configuration problems
/// surface here, before any request is sent.
pub fn build_provider(
    client: reqwest::Client,
    config: &DictionaryConfig,
) -> Result<Arc<dyn DictionaryProvider>, LookupError> {
    config.validate()?;
    let timeout = Duration::from_secs(config.timeout_seconds);

    let provider: Arc<dyn DictionaryProvider> = match config.provider {
        DictionaryProviderKind::FreeDictionary => Arc::new(FreeDictionaryProvider::new(
            client,
            config.free_dictionary_url.clone(),
            timeout,
        )),
        DictionaryProviderKind::TranslationApi => Arc::new(TranslationApiProvider::new(
            client,
            config.api_key.clone(),
            config.translate_api_url.clone(),
            timeout,
        )?),
        DictionaryProviderKind::Custom => Arc::new(CustomProvider::new(
            client,
            config.custom_template()?.to_string(),
            timeout,
        )?),
    };

    tracing::debug!("Built dictionary provider: {}", config.provider);
    Ok(provider)
}

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Map HTTP statuses shared by every provider
pub(crate) fn check_status(status: StatusCode, text: &str) -> Result<(), LookupError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND => Err(LookupError::no_definition(text)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LookupError::InvalidConfiguration(
            format!("provider rejected credentials (HTTP {status})"),
        )),
        StatusCode::BAD_REQUEST => Err(LookupError::InvalidConfiguration(format!(
            "provider rejected the request (HTTP {status})"
        ))),
        _ => Err(LookupError::ProviderUnavailable(format!("HTTP {status}"))),
    }
}
