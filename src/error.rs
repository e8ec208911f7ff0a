// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdversaError {
    #[error("Unsupported language: '{0}' (expected one of: c, java)")]
    UnsupportedLanguage(String),

    #[error("Unsupported mutation kind: '{0}'")]
    UnsupportedMutationKind(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid noise level: {0} (must be finite and >= 0)")]
    InvalidNoiseLevel(f64),

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error at line {line}: {source}")]
    Json {
        source: serde_json::Error,
        line: usize,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl AdversaError {
    /// Stable key used by the failure-reason histogram.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage(_) => "unsupported_language",
            Self::UnsupportedMutationKind(_) => "unsupported_mutation_kind",
            Self::RegionNotFound(_) => "region_not_found",
            Self::MalformedSource(_) => "malformed_source",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidNoiseLevel(_) => "invalid_noise_level",
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
            Self::Toml(_) => "toml",
            Self::Regex(_) => "regex",
        }
    }

    /// Configuration errors abort a run before any sample is processed.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage(_) | Self::UnsupportedMutationKind(_) | Self::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AdversaError>;

// Allow `?` on std::io::Error by converting to AdversaError::Io with unknown path.
impl From<std::io::Error> for AdversaError {
    fn from(source: std::io::Error) -> Self {
        AdversaError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
