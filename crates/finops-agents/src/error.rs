//! Error types for policy runs.

use std::path::PathBuf;

use month_window::WindowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AgentError {
    /// Timeouts and connection failures.
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// The request could not be built or sent as configured; retrying cannot help.
    #[error("Invalid gateway request: {0}")]
    InvalidRequest(String),

    #[error("Gateway HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway response could not be decoded: {0}")]
    Decode(String),

    #[error("Gateway returned no message content")]
    EmptyResponse,

    #[error("Cannot read agent transcript {path}: {source}")]
    Replay {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AgentError {
    /// Whether retrying the same request may succeed (rate limits, 5xx, network).
    pub fn is_transient(&self) -> bool {
        match self {
            AgentError::Request(_) => true,
            AgentError::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FindingsError {
    #[error("No fenced JSON block found in agent output")]
    NoFencedBlock,

    #[error("FINDINGS JSON decode failed: {message}. First 200 chars: {preview}")]
    Decode {
        line: usize,
        column: usize,
        message: String,
        preview: String,
    },
}

#[derive(Error, Debug)]
pub enum FinopsError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Cannot write report {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot serialize findings: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FinopsError>;
