//! Error types for Fortell.

use thiserror::Error;

/// Library-level error type for Fortell operations.
#[derive(Error, Debug)]
pub enum FortellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Script generation failed: {0}")]
    Script(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Video submission failed: {0}")]
    Submission(String),

    #[error("Video rendering failed: {0}")]
    Render(String),

    #[error("Timed out waiting for render job: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Fortell operations.
pub type Result<T> = std::result::Result<T, FortellError>;
