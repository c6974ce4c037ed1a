use std::time::Duration;

use async_trait::async_trait;
use langcap_config::DictionaryProviderKind;
use langcap_types::LookupResult;

use crate::{DictionaryProvider, LookupError, ProviderMetadata, check_status};

/// Machine translation through a Google Translate v2 compatible endpoint
#[derive(Clone)]
pub struct TranslationApiProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    timeout: Duration,
}

impl TranslationApiProvider {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        api_url: String,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        if api_key.trim().is_empty() {
            return Err(LookupError::InvalidConfiguration(
                "translation API key is not set".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key,
            api_url,
            timeout,
        })
    }
}

#[async_trait]
impl DictionaryProvider for TranslationApiProvider {
    async fn lookup(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<LookupResult, LookupError> {
        let params = [
            ("q", text),
            ("source", source),
            ("target", target),
            ("format", "text"),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        check_status(response.status(), text)?;

        let json: serde_json::Value = response.json().await.map_err(|e| {
            LookupError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        let translated = parse_translation(&json)?;
        if translated.is_empty() {
            return Err(LookupError::no_definition(text));
        }

        Ok(LookupResult {
            meaning: translated.clone(),
            pronunciation: None,
            examples: vec![],
            translated_text: translated,
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google Translate".to_string(),
            kind: DictionaryProviderKind::TranslationApi,
            requires_api_key: true,
        }
    }
}

fn parse_translation(json: &serde_json::Value) -> Result<String, LookupError> {
    json["data"]["translations"]
        .get(0)
        .and_then(|t| t["translatedText"].as_str())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| LookupError::MalformedResponse("No translation in response".to_string()))
}
