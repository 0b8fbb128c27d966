//! Upload command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::storage::{GcsStore, ObjectStore};
use anyhow::Result;
use std::path::Path;

/// Run the upload command.
pub async fn run_upload(file: &str, bucket: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Upload) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fortell doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let bucket = match bucket.or_else(|| settings.storage.bucket.clone()) {
        Some(b) => b,
        None => {
            Output::error("No storage bucket given.");
            Output::info("Pass --bucket or set storage.bucket in the config.");
            return Err(anyhow::anyhow!("no storage bucket configured"));
        }
    };

    let store = GcsStore::from_env(&settings.storage)?;

    let spinner = Output::spinner(&format!("Uploading {} to {}...", file, bucket));

    match store.upload(Path::new(file), &bucket).await {
        Ok(object) => {
            spinner.finish_and_clear();
            Output::success("Upload complete.");
            Output::kv("Bucket", &object.bucket);
            Output::kv("Object", &object.name);
            Output::kv("Public URL", &object.public_url);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Upload failed: {}", e));
            Err(e.into())
        }
    }
}
