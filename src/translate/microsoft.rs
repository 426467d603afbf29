use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::MicrosoftConfig;
use crate::error::{EvalError, Result};
use super::{TranslationBackend, common::{check_status, split_code, CodeRole, TranslationRequest}};

const API_VERSION: &str = "3.0";

#[derive(Debug, Serialize)]
struct MicrosoftText<'a> {
    text: &'a str,
}

/// Azure AI Translator REST API v3
pub struct MicrosoftTranslator {
    client: Client,
    config: MicrosoftConfig,
}

impl MicrosoftTranslator {
    pub fn new(config: MicrosoftConfig, client: Client) -> Result<Self> {
        if config.subscription_key.trim().is_empty() {
            return Err(EvalError::Config(
                "Microsoft subscription key missing (set providers.microsoft.subscription_key or MICROSOFT_TRANSLATOR_KEY)"
                    .to_string(),
            ));
        }

        Ok(Self { client, config })
    }
}

/// Chinese needs a script tag; every other language is sent as its base code
pub fn normalize_microsoft_code(code: &str, _role: CodeRole) -> String {
    let (base, region) = split_code(code);

    match (base.as_str(), region.as_deref()) {
        ("zh", Some("tw" | "hk" | "hant")) => "zh-Hant".to_string(),
        ("zh", _) => "zh-Hans".to_string(),
        _ => base,
    }
}

/// One slot per response element; elements without `translations[0].text` are `None`
fn extract_translations(results: &[Value]) -> Vec<Option<String>> {
    results
        .iter()
        .map(|result| {
            result
                .get("translations")
                .and_then(|translations| translations.get(0))
                .and_then(|translation| translation.get("text"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

#[async_trait]
impl TranslationBackend for MicrosoftTranslator {
    fn name(&self) -> &str {
        "microsoft"
    }

    fn normalize_code(&self, code: &str, role: CodeRole) -> String {
        normalize_microsoft_code(code, role)
    }

    fn max_batch_size(&self) -> usize {
        100
    }

    async fn send(&self, request: &TranslationRequest) -> Result<Vec<Option<String>>> {
        let url = format!("{}/translate", self.config.endpoint.trim_end_matches('/'));
        let trace_id = Uuid::new_v4();
        debug!(
            "Calling Microsoft Translator at {} ({} texts, trace {})",
            url,
            request.texts.len(),
            trace_id
        );

        let body: Vec<MicrosoftText> = request
            .texts
            .iter()
            .map(|text| MicrosoftText { text })
            .collect();

        let response = self
            .client
            .post(&url)
            .query(&[
                ("api-version", API_VERSION),
                ("from", request.source.as_str()),
                ("to", request.target.as_str()),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .header("Ocp-Apim-Subscription-Region", &self.config.region)
            .header("X-ClientTraceId", trace_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| EvalError::Translation(format!("Microsoft request failed: {}", e)))?;

        let response = check_status("Microsoft", response).await?;

        let results: Vec<Value> = response.json().await.map_err(|e| {
            EvalError::Translation(format!("Failed to parse Microsoft response: {}", e))
        })?;

        Ok(extract_translations(&results))
    }
}
