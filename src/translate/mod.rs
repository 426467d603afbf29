// Translation gateway
//
// Every provider implements `TranslationBackend` with its own language-code
// vocabulary and wire call; the two translation modes are provided methods
// so fault isolation behaves the same for all providers:
// - translate_batch: each sentence translated on its own (out of context)
// - translate_document: the whole set sent as one text (in context)
//
// To add a provider:
// 1. Implement `normalize_code` and `send` in a new module
// 2. Add a variant to `BackendKind`
// 3. Wire the variant into `BackendFactory::create`

pub mod common;
pub mod deepl;
pub mod google;
pub mod microsoft;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub use common::*;
use crate::config::ProvidersConfig;
use crate::error::{EvalError, Result};

/// A third-party machine translation service
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Backend label used in logs and reports
    fn name(&self) -> &str;

    /// Map a canonical language code to the code this backend accepts
    fn normalize_code(&self, code: &str, role: CodeRole) -> String;

    /// Largest number of texts sent in one HTTP call
    fn max_batch_size(&self) -> usize {
        50
    }

    /// Build the backend-neutral request for `texts`
    fn prepare(&self, texts: &[String], pair: &LanguagePair) -> TranslationRequest {
        TranslationRequest {
            texts: texts.to_vec(),
            source: self.normalize_code(&pair.source, CodeRole::Source),
            target: self.normalize_code(&pair.target, CodeRole::Target),
        }
    }

    /// Perform one wire call. Returns one slot per input text; `None` marks an
    /// element whose response did not have the expected shape.
    async fn send(&self, request: &TranslationRequest) -> Result<Vec<Option<String>>>;

    /// Translate every sentence independently, preserving order and length
    async fn translate_batch(&self, sentences: &[String], pair: &LanguagePair) -> TranslationResult {
        info!(
            "Translating {} sentences individually with {} ({})",
            sentences.len(),
            self.name(),
            pair
        );

        let chunk_size = self.max_batch_size().max(1);
        let mut lines = Vec::with_capacity(sentences.len());
        let mut failed = Vec::new();

        for (chunk_idx, chunk) in sentences.chunks(chunk_size).enumerate() {
            let offset = chunk_idx * chunk_size;
            let request = self.prepare(chunk, pair);

            match self.send(&request).await {
                Ok(mut slots) => {
                    if slots.len() != chunk.len() {
                        warn!(
                            "{} returned {} translations for {} sentences",
                            self.name(),
                            slots.len(),
                            chunk.len()
                        );
                    }
                    slots.resize(chunk.len(), None);

                    for (idx, slot) in slots.into_iter().enumerate() {
                        match slot {
                            Some(translation) => lines.push(translation),
                            None => {
                                warn!("Sentence {} came back malformed, using empty translation", offset + idx);
                                failed.push(offset + idx);
                                lines.push(String::new());
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Batch call for sentences {}..{} failed: {}",
                        offset,
                        offset + chunk.len(),
                        e
                    );
                    failed.extend(offset..offset + chunk.len());
                    lines.extend(std::iter::repeat_n(String::new(), chunk.len()));
                }
            }
        }

        TranslationResult::from_batch(lines, failed)
    }

    /// Translate the sentences as one document and split the result back into lines
    async fn translate_document(&self, sentences: &[String], pair: &LanguagePair) -> TranslationResult {
        if sentences.is_empty() {
            return TranslationResult::complete(Vec::new());
        }

        info!(
            "Translating {} lines as one document with {} ({})",
            sentences.len(),
            self.name(),
            pair
        );

        let document = sentences.join("\n");
        let request = self.prepare(std::slice::from_ref(&document), pair);

        match self.send(&request).await {
            Ok(slots) => match slots.into_iter().next().flatten() {
                Some(text) => {
                    let lines: Vec<String> = text.lines().map(str::to_string).collect();
                    debug!("Document translation split into {} lines", lines.len());
                    TranslationResult::complete(lines)
                }
                None => {
                    warn!("{} returned no document translation", self.name());
                    TranslationResult::failed("response carried no translation")
                }
            },
            Err(e) => {
                warn!("Document translation failed: {}", e);
                TranslationResult::failed(e.to_string())
            }
        }
    }
}

/// Translation provider selectable at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Deepl,
    Microsoft,
    Google,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deepl => "deepl",
            Self::Microsoft => "microsoft",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deepl" => Ok(Self::Deepl),
            "microsoft" | "azure" => Ok(Self::Microsoft),
            "google" => Ok(Self::Google),
            _ => Err(EvalError::UnknownBackend(format!(
                "'{}'. Valid backends: deepl, microsoft, google",
                s
            ))),
        }
    }
}

/// Factory for creating translation backends
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend for `kind`, failing if its credentials are missing
    pub fn create(kind: BackendKind, config: &ProvidersConfig) -> Result<Box<dyn TranslationBackend>> {
        let client = build_http_client(config.timeout_secs)?;

        match kind {
            BackendKind::Deepl => Ok(Box::new(deepl::DeeplTranslator::new(
                config.deepl.clone(),
                client,
            )?)),
            BackendKind::Microsoft => Ok(Box::new(microsoft::MicrosoftTranslator::new(
                config.microsoft.clone(),
                client,
            )?)),
            BackendKind::Google => Ok(Box::new(google::GoogleTranslator::new(
                config.google.clone(),
                client,
            )?)),
        }
    }
}
