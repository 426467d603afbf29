use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{EvalError, Result};

/// Source and target language as canonical codes (e.g. `en-us`, `zh-cn`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Which side of the pair a language code is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRole {
    Source,
    Target,
}

/// Backend-neutral request: texts plus codes already in the backend's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub texts: Vec<String>,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// Every element was translated
    Complete,
    /// Some elements were replaced by empty strings
    Degraded { failed: Vec<usize> },
    /// Nothing usable came back
    Failed { reason: String },
}

/// Candidate lines produced by one translation mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub lines: Vec<String>,
    pub status: TranslationStatus,
}

impl TranslationResult {
    pub fn complete(lines: Vec<String>) -> Self {
        Self {
            lines,
            status: TranslationStatus::Complete,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            status: TranslationStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Classify a positionally aligned batch by the indices that fell back to ""
    pub fn from_batch(lines: Vec<String>, failed: Vec<usize>) -> Self {
        let status = if failed.is_empty() {
            TranslationStatus::Complete
        } else if failed.len() == lines.len() {
            TranslationStatus::Failed {
                reason: format!("all {} sentences failed", lines.len()),
            }
        } else {
            TranslationStatus::Degraded { failed }
        };

        Self { lines, status }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, TranslationStatus::Complete)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TranslationStatus::Failed { .. })
    }

    pub fn status_label(&self) -> String {
        match &self.status {
            TranslationStatus::Complete => "complete".to_string(),
            TranslationStatus::Degraded { failed } => format!("degraded ({} empty)", failed.len()),
            TranslationStatus::Failed { reason } => format!("failed ({})", reason),
        }
    }
}

/// Split `en-us` into (`en`, Some(`us`)), lower-cased
pub fn split_code(code: &str) -> (String, Option<String>) {
    let code = code.trim().to_lowercase().replace('_', "-");
    if let Some((base, region)) = code.split_once('-') {
        let region = (!region.is_empty()).then(|| region.to_string());
        return (base.to_string(), region);
    }
    (code, None)
}

/// Shared HTTP client for provider calls
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("ctxeval/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(EvalError::Http)
}

/// Turn a non-success response into a translation error carrying the body
pub async fn check_status(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(EvalError::Translation(format!(
        "{} API error {}: {}",
        provider, status, error_text
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::testing::{local_client, StubServer};

    #[test]
    fn test_split_code() {
        assert_eq!(split_code("en-us"), ("en".to_string(), Some("us".to_string())));
        assert_eq!(split_code("zh_CN"), ("zh".to_string(), Some("cn".to_string())));
        assert_eq!(split_code("DE"), ("de".to_string(), None));
    }

    #[test]
    fn test_batch_status_classification() {
        let ok = TranslationResult::from_batch(vec!["a".into(), "b".into()], vec![]);
        assert!(ok.is_complete());

        let partial = TranslationResult::from_batch(vec!["a".into(), String::new()], vec![1]);
        assert_eq!(partial.status, TranslationStatus::Degraded { failed: vec![1] });

        let none = TranslationResult::from_batch(vec![String::new(), String::new()], vec![0, 1]);
        assert!(none.is_failed());
        assert_eq!(none.lines.len(), 2);
    }

    #[test]
    fn test_pair_display_uses_canonical_codes() {
        assert_eq!(LanguagePair::new("en-us", "zh-cn").to_string(), "en-us->zh-cn");
    }

    #[tokio::test]
    async fn test_check_status_passes_success_and_reports_client_errors() {
        let ok = StubServer::start(200, r#"{"ok": true}"#).await;
        let response = local_client().get(&ok.url).send().await.unwrap();
        assert!(check_status("Stub", response).await.is_ok());

        let denied = StubServer::start(456, r#"{"message": "Quota exceeded"}"#).await;
        let response = local_client().get(&denied.url).send().await.unwrap();
        match check_status("Stub", response).await {
            Err(EvalError::Translation(message)) => {
                assert!(message.starts_with("Stub API error 456"), "got {}", message);
                assert!(message.contains("Quota exceeded"));
            }
            other => panic!("expected translation error, got {:?}", other.map(|r| r.status())),
        }
    }
}
