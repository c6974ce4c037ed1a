use std::time::Duration;

use async_trait::async_trait;
use langcap_config::DictionaryProviderKind;
use langcap_config::dictionary::{SOURCE_PLACEHOLDER, TARGET_PLACEHOLDER, TEXT_PLACEHOLDER};
use langcap_types::LookupResult;
use serde::Deserialize;

use crate::{DictionaryProvider, LookupError, ProviderMetadata, check_status, encode_component};

/// User-supplied endpoint. The template must contain `{text}` and may
/// contain `{source}` and `{target}`; the endpoint answers with
/// `{"meaning", "pronunciation"?, "examples"?, "translatedText"?}`.
#[derive(Clone)]
pub struct CustomProvider {
    client: reqwest::Client,
    template: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomResponse {
    #[serde(default)]
    meaning: String,
    pronunciation: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
    translated_text: Option<String>,
}

impl CustomProvider {
    pub fn new(
        client: reqwest::Client,
        template: String,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        if !template.contains(TEXT_PLACEHOLDER) {
            return Err(LookupError::InvalidConfiguration(format!(
                "custom dictionary URL is missing the {TEXT_PLACEHOLDER} placeholder"
            )));
        }

        // Render once with dummy values so a broken template fails here
        // instead of on the first capture.
        let probe = render(&template, "probe", "xx", "yy");
        reqwest::Url::parse(&probe).map_err(|e| {
            LookupError::InvalidConfiguration(format!("custom dictionary URL is invalid: {e}"))
        })?;

        Ok(Self {
            client,
            template,
            timeout,
        })
    }
}

fn render(template: &str, text: &str, source: &str, target: &str) -> String {
    template
        .replace(TEXT_PLACEHOLDER, &encode_component(text))
        .replace(SOURCE_PLACEHOLDER, &encode_component(source))
        .replace(TARGET_PLACEHOLDER, &encode_component(target))
}

#[async_trait]
impl DictionaryProvider for CustomProvider {
    async fn lookup(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<LookupResult, LookupError> {
        let url = render(&self.template, text, source, target);
        tracing::debug!("Custom dictionary lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        check_status(response.status(), text)?;

        let body: CustomResponse = response.json().await.map_err(|e| {
            LookupError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        let meaning = body.meaning.trim().to_string();
        if meaning.is_empty() {
            return Err(LookupError::no_definition(text));
        }

        let translated_text = body
            .translated_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| meaning.clone());

        Ok(LookupResult {
            meaning,
            pronunciation: body.pronunciation.filter(|p| !p.trim().is_empty()),
            examples: body.examples,
            translated_text,
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Custom".to_string(),
            kind: DictionaryProviderKind::Custom,
            requires_api_key: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve_once;

    fn provider(template: String) -> CustomProvider {
        CustomProvider::new(reqwest::Client::new(), template, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn template_without_text_placeholder_is_rejected() {
        let result = CustomProvider::new(
            reqwest::Client::new(),
            "https://dict.example.com/lookup?from={source}".to_string(),
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(LookupError::InvalidConfiguration(_))));
    }

    #[test]
    fn unparseable_template_is_rejected() {
        let result = CustomProvider::new(
            reqwest::Client::new(),
            "not a url {text}".to_string(),
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(LookupError::InvalidConfiguration(_))));
    }

    #[test]
    fn render_substitutes_every_placeholder() {
        let url = render("http://d/{source}-{target}?q={text}", "c'est la vie", "fr", "en");
        assert_eq!(url, "http://d/fr-en?q=c%27est%20la%20vie");
    }

    #[tokio::test]
    async fn lookup_reads_custom_payload() {
        let server = serve_once(
            "200 OK",
            r#"{"meaning":"cat","pronunciation":"ʃa","examples":["le chat dort"]}"#,
        )
        .await;

        let result = provider(format!("{}/lookup?q={{text}}&to={{target}}", server.base_url))
            .lookup("chat", "fr", "en")
            .await
            .unwrap();

        assert_eq!(result.meaning, "cat");
        assert_eq!(result.translated_text, "cat");
        assert_eq!(result.pronunciation.as_deref(), Some("ʃa"));
        assert_eq!(result.examples, vec!["le chat dort".to_string()]);

        let request = server.request.await.unwrap();
        assert!(request.starts_with("GET /lookup?q=chat&to=en "));
    }

    #[tokio::test]
    async fn empty_meaning_is_no_definition() {
        let server = serve_once("200 OK", r#"{"meaning":"  "}"#).await;
        let result = provider(format!("{}/{{text}}", server.base_url))
            .lookup("zzz", "fr", "en")
            .await;
        assert!(matches!(result, Err(LookupError::NoDefinitionFound { .. })));
    }
}
