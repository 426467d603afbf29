use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GoogleConfig;
use crate::error::{EvalError, Result};
use super::{TranslationBackend, common::{check_status, split_code, CodeRole, TranslationRequest}};

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

/// Google Cloud Translation API v2 (basic edition)
pub struct GoogleTranslator {
    client: Client,
    config: GoogleConfig,
}

impl GoogleTranslator {
    pub fn new(config: GoogleConfig, client: Client) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EvalError::Config(
                "Google API key missing (set providers.google.api_key or GOOGLE_API_KEY)".to_string(),
            ));
        }

        Ok(Self { client, config })
    }
}

/// Google takes ISO-639-1 codes, with a region only for Chinese
pub fn normalize_google_code(code: &str, _role: CodeRole) -> String {
    let (base, region) = split_code(code);

    match (base.as_str(), region.as_deref()) {
        ("zh", Some("tw" | "hk")) => "zh-TW".to_string(),
        ("zh", _) => "zh-CN".to_string(),
        _ => base,
    }
}

fn extract_translations(body: &Value) -> Vec<Option<String>> {
    body.pointer("/data/translations")
        .and_then(Value::as_array)
        .map(|translations| {
            translations
                .iter()
                .map(|translation| {
                    translation
                        .get("translatedText")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    fn normalize_code(&self, code: &str, role: CodeRole) -> String {
        normalize_google_code(code, role)
    }

    fn max_batch_size(&self) -> usize {
        128
    }

    async fn send(&self, request: &TranslationRequest) -> Result<Vec<Option<String>>> {
        let url = format!(
            "{}/language/translate/v2",
            self.config.endpoint.trim_end_matches('/')
        );
        debug!("Calling Google Translate at {} ({} texts)", url, request.texts.len());

        let body = GoogleRequest {
            q: &request.texts,
            source: &request.source,
            target: &request.target,
            format: "text",
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| EvalError::Translation(format!("Google request failed: {}", e)))?;

        let response = check_status("Google", response).await?;

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| EvalError::Translation(format!("Failed to parse Google response: {}", e)))?;

        Ok(extract_translations(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::testing::{local_client, StubServer};
    use crate::translate::{LanguagePair, TranslationBackend};
    use serde_json::json;

    #[test]
    fn test_codes() {
        assert_eq!(normalize_google_code("en-us", CodeRole::Source), "en");
        assert_eq!(normalize_google_code("en-us", CodeRole::Target), "en");
        assert_eq!(normalize_google_code("zh-cn", CodeRole::Target), "zh-CN");
        assert_eq!(normalize_google_code("ja", CodeRole::Source), "ja");
    }

    #[test]
    fn test_extract_translations() {
        let body = json!({
            "data": {
                "translations": [
                    {"translatedText": "Good morning."},
                    {"detectedSourceLanguage": "de"}
                ]
            }
        });

        assert_eq!(
            extract_translations(&body),
            vec![Some("Good morning.".to_string()), None]
        );
        assert!(extract_translations(&json!({"error": {"code": 403}})).is_empty());
    }

    #[test]
    fn test_request_body_uses_plain_text_format() {
        let texts = vec!["Bonjour".to_string()];
        let body = GoogleRequest {
            q: &texts,
            source: "fr",
            target: "de",
            format: "text",
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"q": ["Bonjour"], "source": "fr", "target": "de", "format": "text"})
        );
    }

    #[tokio::test]
    async fn test_send_passes_key_in_query_and_maps_slots() {
        let server = StubServer::start(
            200,
            r#"{"data": {"translations": [
                {"translatedText": "Der Ausschuss"},
                {"translatedText": "billigte"}
            ]}}"#,
        )
        .await;
        let translator = GoogleTranslator::new(
            GoogleConfig {
                api_key: "g-key".to_string(),
                endpoint: format!("{}/", server.url),
            },
            local_client(),
        )
        .unwrap();

        let texts = vec!["The committee".to_string(), "approved".to_string()];
        let request = translator.prepare(&texts, &LanguagePair::new("en-us", "de"));
        let slots = translator.send(&request).await.unwrap();

        assert_eq!(
            slots,
            vec![Some("Der Ausschuss".to_string()), Some("billigte".to_string())]
        );

        let recorded = server.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, "POST");
        assert_eq!(recorded[0].path(), "/language/translate/v2");
        assert_eq!(recorded[0].query().get("key").map(String::as_str), Some("g-key"));
        assert_eq!(
            recorded[0].json(),
            json!({"q": ["The committee", "approved"], "source": "en", "target": "de", "format": "text"})
        );
    }
}
