use std::time::Duration;

use async_trait::async_trait;
use langcap_config::DictionaryProviderKind;
use langcap_types::LookupResult;
use serde::Deserialize;

use crate::{DictionaryProvider, LookupError, ProviderMetadata, check_status, encode_component};

const MAX_EXAMPLES: usize = 5;

/// Monolingual dictionary in the dictionaryapi.dev v2 format
#[derive(Clone)]
pub struct FreeDictionaryProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FreeDictionaryProvider {
    pub fn new(client: reqwest::Client, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn entry_url(&self, text: &str, language: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            encode_component(language),
            encode_component(text)
        )
    }
}

#[async_trait]
impl DictionaryProvider for FreeDictionaryProvider {
    async fn lookup(
        &self,
        text: &str,
        source: &str,
        _target: &str,
    ) -> Result<LookupResult, LookupError> {
        let url = self.entry_url(text, source);
        tracing::debug!("Free dictionary lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        check_status(response.status(), text)?;

        let entries: Vec<Entry> = response.json().await.map_err(|e| {
            LookupError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        parse_entries(text, entries)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Free Dictionary".to_string(),
            kind: DictionaryProviderKind::FreeDictionary,
            requires_api_key: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<Phonetic>,
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Phonetic {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    definition: String,
    example: Option<String>,
}

fn parse_entries(text: &str, entries: Vec<Entry>) -> Result<LookupResult, LookupError> {
    let meaning = entries
        .iter()
        .flat_map(|e| &e.meanings)
        .flat_map(|m| &m.definitions)
        .map(|d| d.definition.trim())
        .find(|d| !d.is_empty())
        .ok_or_else(|| LookupError::no_definition(text))?
        .to_string();

    let pronunciation = entries.iter().find_map(|e| {
        e.phonetic
            .iter()
            .chain(e.phonetics.iter().filter_map(|p| p.text.as_ref()))
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .map(str::to_string)
    });

    let examples = entries
        .iter()
        .flat_map(|e| &e.meanings)
        .flat_map(|m| &m.definitions)
        .filter_map(|d| d.example.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .take(MAX_EXAMPLES)
        .map(str::to_string)
        .collect();

    Ok(LookupResult {
        translated_text: meaning.clone(),
        meaning,
        pronunciation,
        examples,
    })
}
