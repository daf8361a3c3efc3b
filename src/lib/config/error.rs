use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown provider kind '{kind}' (expected \"ollama\" or \"openai\")")]
    UnknownProviderKind { kind: String },

    #[error("transport '{kind}' is missing required field '{field}'")]
    MissingTransportField { kind: String, field: &'static str },

    #[error("unknown transport kind '{kind}' (expected \"stdio\" or \"http\")")]
    UnknownTransportKind { kind: String },

    #[error("no [transport] section configured; the agent has no tool server to call")]
    MissingTransport,

    #[error("entity '{key}' is invalid: {reason}")]
    InvalidEntity { key: String, reason: String },

    #[error("policy field '{field}' is invalid: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },
}
