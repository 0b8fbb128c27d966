//! Status command implementation.

use super::render::wait_for_outcome;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::render::{HeyGenClient, JobHandle, JobPoller, PollConfig, RenderApi};
use anyhow::Result;
use std::sync::Arc;

/// Run the status command.
pub async fn run_status(job_id: &str, wait: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Render) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fortell doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let api = Arc::new(HeyGenClient::from_env(&settings.render)?);

    if wait {
        let poller = JobPoller::with_config(api, PollConfig::from_settings(&settings.render));
        let handle = JobHandle {
            video_id: job_id.to_string(),
        };
        return wait_for_outcome(&poller, &handle).await;
    }

    let report = api.video_status(job_id).await?;

    match report.status.as_deref() {
        None => {
            Output::warning("The service returned no status for this job.");
        }
        Some(status) => {
            Output::kv("Job ID", job_id);
            Output::kv("Status", status);
            if let Some(url) = &report.video_url {
                Output::kv("Video URL", url);
            }
            if let Some(error) = report.error_text() {
                Output::kv("Error", &error);
            }
        }
    }

    Ok(())
}
