//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail midway.

use crate::error::{FortellError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Uploading requires Google Cloud credentials.
    Upload,
    /// Script writing requires the OpenAI API key.
    Script,
    /// Rendering requires the render API key.
    Render,
    /// The full pipeline requires all of the above.
    Produce,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Upload => {
            check_google_credentials()?;
        }
        Operation::Script => {
            check_openai_api_key()?;
        }
        Operation::Render => {
            check_heygen_api_key()?;
        }
        Operation::Produce => {
            check_google_credentials()?;
            check_openai_api_key()?;
            check_heygen_api_key()?;
        }
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_openai_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(FortellError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(FortellError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if the render API key is configured.
fn check_heygen_api_key() -> Result<()> {
    match std::env::var("HEYGEN_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(FortellError::Config(
            "HEYGEN_API_KEY is empty. Set it with: export HEYGEN_API_KEY='...'".to_string(),
        )),
        Err(_) => Err(FortellError::Config(
            "HEYGEN_API_KEY not set. Set it with: export HEYGEN_API_KEY='...'".to_string(),
        )),
    }
}

/// Check if Google Cloud service-account credentials are configured.
fn check_google_credentials() -> Result<()> {
    match std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        Ok(path) if !path.is_empty() => {
            if std::path::Path::new(&path).exists() {
                Ok(())
            } else {
                Err(FortellError::Config(format!(
                    "GOOGLE_APPLICATION_CREDENTIALS points to a missing file: {}",
                    path
                )))
            }
        }
        _ => Err(FortellError::Config(
            "GOOGLE_APPLICATION_CREDENTIALS not set. \
             Set it to the path of your service account JSON file."
                .to_string(),
        )),
    }
}
