use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::translate::LanguagePair;

// Default values for optional configuration keys
fn default_line_count() -> usize {
    200
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_microsoft_region() -> String {
    "westeurope".to_string()
}

fn default_microsoft_endpoint() -> String {
    "https://api.cognitive.microsofttranslator.com".to_string()
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// Language pairs evaluated by a run, in report order
    #[serde(default = "default_pairs")]
    pub pairs: Vec<PairSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Number of lines read from every source and reference file
    #[serde(default = "default_line_count")]
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// HTTP timeout for a single provider call (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub deepl: DeeplConfig,
    #[serde(default)]
    pub microsoft: MicrosoftConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeeplConfig {
    /// DeepL authentication key (free-tier keys end in ":fx")
    #[serde(default)]
    pub auth_key: String,
    /// API base URL; derived from the key type when unset
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrosoftConfig {
    /// Translator resource subscription key
    #[serde(default)]
    pub subscription_key: String,
    /// Azure region of the translator resource
    #[serde(default = "default_microsoft_region")]
    pub region: String,
    /// Translator API base URL
    #[serde(default = "default_microsoft_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Cloud Translation API key
    #[serde(default)]
    pub api_key: String,
    /// Cloud Translation API base URL
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving reports when no explicit output path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// One evaluated language pair with its corpus files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSpec {
    /// Canonical source language code
    pub source: String,
    /// Canonical target language code
    pub target: String,
    /// Source-side sentences
    pub source_file: PathBuf,
    /// Human reference translations, aligned line by line with the source
    pub reference_files: Vec<PathBuf>,
}

impl PairSpec {
    pub fn new(
        source: &str,
        target: &str,
        source_file: impl Into<PathBuf>,
        reference_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            source_file: source_file.into(),
            reference_files,
        }
    }

    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(&self.source, &self.target)
    }

    pub fn label(&self) -> String {
        self.pair().to_string()
    }
}

/// Build a WMT21 newstest pair laid out as `src-data/` and `ref-data/`
fn newstest2021(source: &str, target: &str, references: &[&str]) -> PairSpec {
    let src_base = base_code(source);
    let tgt_base = base_code(target);
    let stem = format!("newstest2021.{}-{}", src_base, tgt_base);

    PairSpec::new(
        source,
        target,
        format!("src-data/{}.src.{}", stem, src_base),
        references
            .iter()
            .map(|id| PathBuf::from(format!("ref-data/{}.ref.{}.{}", stem, id, tgt_base)))
            .collect(),
    )
}

fn base_code(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// The twelve WMT21 news test pairs
pub fn default_pairs() -> Vec<PairSpec> {
    vec![
        newstest2021("en-us", "de", &["A", "C", "D"]),
        newstest2021("de", "en-us", &["A", "B"]),
        newstest2021("en-us", "cs", &["A", "B"]),
        newstest2021("cs", "en-us", &["A", "B"]),
        newstest2021("en-us", "ru", &["A", "B"]),
        newstest2021("ru", "en-us", &["A", "B"]),
        newstest2021("en-us", "zh-cn", &["A", "B"]),
        newstest2021("zh-cn", "en-us", &["A"]),
        newstest2021("en-us", "ja", &["A"]),
        newstest2021("ja", "en-us", &["A"]),
        newstest2021("de", "fr", &["A"]),
        newstest2021("fr", "de", &["A"]),
    ]
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            line_count: default_line_count(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            deepl: DeeplConfig::default(),
            microsoft: MicrosoftConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl Default for MicrosoftConfig {
    fn default() -> Self {
        Self {
            subscription_key: String::new(),
            region: default_microsoft_region(),
            endpoint: default_microsoft_endpoint(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_google_endpoint(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            providers: ProvidersConfig::default(),
            report: ReportConfig::default(),
            pairs: default_pairs(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EvalError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| EvalError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Credentials from the environment take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|var| std::env::var(var).ok());
    }

    /// Apply credential overrides from `lookup`; blank values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 4] = [
            ("DEEPL_AUTH_KEY", &mut self.providers.deepl.auth_key),
            ("MICROSOFT_TRANSLATOR_KEY", &mut self.providers.microsoft.subscription_key),
            ("MICROSOFT_TRANSLATOR_REGION", &mut self.providers.microsoft.region),
            ("GOOGLE_API_KEY", &mut self.providers.google.api_key),
        ];

        for (var, slot) in overrides {
            if let Some(value) = lookup(var) {
                if !value.trim().is_empty() {
                    debug!("Using {} from environment", var);
                    *slot = value.trim().to_string();
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.corpus.line_count == 0 {
            return Err(EvalError::Config("corpus.line_count must be greater than zero".to_string()));
        }

        if self.pairs.is_empty() {
            return Err(EvalError::Config("No language pairs configured".to_string()));
        }

        for spec in &self.pairs {
            if spec.reference_files.is_empty() {
                return Err(EvalError::Config(format!(
                    "Language pair {} has no reference files",
                    spec.label()
                )));
            }
        }

        Ok(())
    }

    /// Restrict the configured pairs to the given labels, keeping config order
    pub fn select_pairs(&self, labels: &[String]) -> Result<Vec<PairSpec>> {
        if labels.is_empty() {
            return Ok(self.pairs.clone());
        }

        for label in labels {
            if !self.pairs.iter().any(|spec| spec.label() == *label) {
                return Err(EvalError::UnknownPair(label.clone()));
            }
        }

        Ok(self
            .pairs
            .iter()
            .filter(|spec| labels.contains(&spec.label()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pairs_follow_newstest_layout() {
        let pairs = default_pairs();
        assert_eq!(pairs.len(), 12);

        let first = &pairs[0];
        assert_eq!(first.label(), "en-us->de");
        assert_eq!(first.source_file, PathBuf::from("src-data/newstest2021.en-de.src.en"));
        assert_eq!(
            first.reference_files,
            vec![
                PathBuf::from("ref-data/newstest2021.en-de.ref.A.de"),
                PathBuf::from("ref-data/newstest2021.en-de.ref.C.de"),
                PathBuf::from("ref-data/newstest2021.en-de.ref.D.de"),
            ]
        );

        let zh_en = &pairs[7];
        assert_eq!(zh_en.label(), "zh-cn->en-us");
        assert_eq!(zh_en.source_file, PathBuf::from("src-data/newstest2021.zh-en.src.zh"));
    }

    #[test]
    fn test_config_survives_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.corpus.line_count = 25;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.corpus.line_count, 25);
        assert_eq!(loaded.pairs, config.pairs);
        assert_eq!(loaded.providers.microsoft.region, "westeurope");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [corpus]
            [providers.deepl]
            auth_key = "abc:fx"
            [providers.microsoft]
            [providers.google]
            [report]
            "#,
        )
        .unwrap();

        assert_eq!(config.corpus.line_count, 200);
        assert_eq!(config.providers.timeout_secs, 300);
        assert_eq!(config.providers.deepl.auth_key, "abc:fx");
        assert_eq!(config.pairs.len(), 12);
    }

    #[test]
    fn test_validate_rejects_zero_lines() {
        let mut config = Config::default();
        config.corpus.line_count = 0;
        assert!(matches!(config.validate(), Err(EvalError::Config(_))));
    }

    #[test]
    fn test_select_pairs_keeps_config_order() {
        let config = Config::default();
        let selected = config
            .select_pairs(&["fr->de".to_string(), "en-us->de".to_string()])
            .unwrap();
        let labels: Vec<String> = selected.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["en-us->de", "fr->de"]);

        assert!(matches!(
            config.select_pairs(&["xx->yy".to_string()]),
            Err(EvalError::UnknownPair(_))
        ));
    }

    #[test]
    fn test_pairs_only_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [[pairs]]
            source = "en-us"
            target = "de"
            source_file = "data/news.en"
            reference_files = ["data/news.ref.A.de", "data/news.ref.B.de"]
            "#,
        )
        .unwrap();

        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.pairs[0].label(), "en-us->de");
        assert_eq!(config.pairs[0].reference_files.len(), 2);
        assert_eq!(config.corpus.line_count, 200);
        assert_eq!(config.providers.microsoft.region, "westeurope");
        assert_eq!(config.report.output_dir, PathBuf::from("reports"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_provider_table_parses() {
        let config: Config = toml::from_str(
            r#"
            [providers.deepl]
            auth_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.providers.deepl.auth_key, "abc");
        assert_eq!(config.providers.timeout_secs, 300);
        assert_eq!(config.providers.google.endpoint, "https://translation.googleapis.com");
        assert!(config.providers.google.api_key.is_empty());
        assert_eq!(config.pairs.len(), 12);
    }

    #[test]
    fn test_overrides_take_set_values_and_skip_blank_ones() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("DEEPL_AUTH_KEY", " env-deepl:fx "),
            ("MICROSOFT_TRANSLATOR_KEY", "env-ms"),
            ("MICROSOFT_TRANSLATOR_REGION", "   "),
            ("GOOGLE_API_KEY", "env-google"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.providers.microsoft.region = "northeurope".to_string();
        config.apply_overrides_from(|var| vars.get(var).map(|value| value.to_string()));

        assert_eq!(config.providers.deepl.auth_key, "env-deepl:fx");
        assert_eq!(config.providers.microsoft.subscription_key, "env-ms");
        assert_eq!(config.providers.microsoft.region, "northeurope");
        assert_eq!(config.providers.google.api_key, "env-google");
    }

    #[test]
    fn test_env_overrides_read_process_environment() {
        // the only test that touches these variables
        unsafe {
            std::env::set_var("GOOGLE_API_KEY", "from-env");
            std::env::set_var("DEEPL_AUTH_KEY", "");
        }

        let mut config = Config::default();
        config.providers.deepl.auth_key = "from-file".to_string();
        config.apply_env_overrides();

        unsafe {
            std::env::remove_var("GOOGLE_API_KEY");
            std::env::remove_var("DEEPL_AUTH_KEY");
        }

        assert_eq!(config.providers.google.api_key, "from-env");
        assert_eq!(config.providers.deepl.auth_key, "from-file");
    }
}
