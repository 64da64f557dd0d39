use thiserror::Error;

/// Setup-time failures: loading configuration or a normative dataset.
///
/// Frame processing and scoring never fail; they degrade to defaults instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown test type: {0}")]
    UnknownTestType(String),
    #[error("Unknown gender: {0}")]
    UnknownGender(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid configuration value {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
    #[error("Invalid normative dataset: {0}")]
    DatasetFormat(#[from] serde_json::Error),
    #[error("Normative row {index} ({test_type}/{gender}) is invalid: {reason}")]
    InvalidNormativeRow {
        index: usize,
        test_type: String,
        gender: String,
        reason: String,
    },
    #[error("Normative dataset version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
