use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DeeplConfig;
use crate::error::{EvalError, Result};
use super::{TranslationBackend, common::{check_status, split_code, CodeRole, TranslationRequest}};

const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_ENDPOINT: &str = "https://api.deepl.com";

#[derive(Debug, Serialize)]
struct DeeplRequest<'a> {
    text: &'a [String],
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// DeepL REST API v2
pub struct DeeplTranslator {
    client: Client,
    config: DeeplConfig,
    endpoint: String,
}

impl DeeplTranslator {
    pub fn new(config: DeeplConfig, client: Client) -> Result<Self> {
        if config.auth_key.trim().is_empty() {
            return Err(EvalError::Config(
                "DeepL auth key missing (set providers.deepl.auth_key or DEEPL_AUTH_KEY)".to_string(),
            ));
        }

        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&config.auth_key).to_string());

        Ok(Self {
            client,
            config,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Free-tier keys carry a ":fx" suffix and are served from a separate host
fn default_endpoint(auth_key: &str) -> &'static str {
    if auth_key.trim().ends_with(":fx") {
        FREE_ENDPOINT
    } else {
        PRO_ENDPOINT
    }
}

/// DeepL sources are region-less; targets keep the region for English and Portuguese
pub fn normalize_deepl_code(code: &str, role: CodeRole) -> String {
    let (base, region) = split_code(code);

    match (role, base.as_str(), region) {
        (CodeRole::Target, "en", None) => "EN-US".to_string(),
        (CodeRole::Target, "en" | "pt", Some(region)) => {
            format!("{}-{}", base.to_uppercase(), region.to_uppercase())
        }
        _ => base.to_uppercase(),
    }
}

#[async_trait]
impl TranslationBackend for DeeplTranslator {
    fn name(&self) -> &str {
        "deepl"
    }

    fn normalize_code(&self, code: &str, role: CodeRole) -> String {
        normalize_deepl_code(code, role)
    }

    fn max_batch_size(&self) -> usize {
        50
    }

    async fn send(&self, request: &TranslationRequest) -> Result<Vec<Option<String>>> {
        let url = format!("{}/v2/translate", self.endpoint);
        debug!("Calling DeepL at {} ({} texts)", url, request.texts.len());

        let body = DeeplRequest {
            text: &request.texts,
            source_lang: &request.source,
            target_lang: &request.target,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.config.auth_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| EvalError::Translation(format!("DeepL request failed: {}", e)))?;

        let response = check_status("DeepL", response).await?;

        let parsed: DeeplResponse = response
            .json()
            .await
            .map_err(|e| EvalError::Translation(format!("Failed to parse DeepL response: {}", e)))?;

        Ok(parsed
            .translations
            .into_iter()
            .map(|translation| Some(translation.text))
            .collect())
    }
}
