use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Input file {path} has {found} lines, expected at least {expected}")]
    ShortInput {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Candidate stream has {candidates} lines but reference stream has {references}")]
    Misaligned { candidates: usize, references: usize },

    #[error("Unknown translation backend: {0}")]
    UnknownBackend(String),

    #[error("Unknown language pair: {0}")]
    UnknownPair(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
