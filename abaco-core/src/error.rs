//! Error types for the Abaco core.
//!
//! Uses `thiserror` for public API error types with structured error variants
//! covering the backend client, configuration, pipeline, and persistence
//! domains.

use std::path::PathBuf;

/// Top-level error type for the Abaco core library.
#[derive(Debug, thiserror::Error)]
pub enum AbacoError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the text-generation backend client.
///
/// `is_retryable` drives the retry loop: rate limits, server errors, and
/// network failures are transient; auth and parse failures are permanent.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Rate limited by backend (HTTP 429)")]
    RateLimited,

    #[error("Backend server error (HTTP {status})")]
    Server { status: u16 },

    #[error("Unrecoverable HTTP error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Backend connection failed: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Invalid response structure: {message}")]
    MalformedResponse { message: String },

    #[error("Missing credential: env var '{var}' not set")]
    MissingCredential { var: String },
}

impl BackendError {
    /// Whether the retry loop should attempt the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::RateLimited
                | BackendError::Server { .. }
                | BackendError::Connection { .. }
                | BackendError::Timeout { .. }
        )
    }
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from pipeline stages.
///
/// Pipeline stages are designed to degrade rather than fail, so these
/// surface only through the coordinator's issue list, never as a crash of
/// the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Result persistence failed: {message}")]
    PersistenceFailed { message: String },
}

/// A type alias for results using the top-level `AbacoError`.
pub type Result<T> = std::result::Result<T, AbacoError>;
