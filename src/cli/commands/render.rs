//! Render command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::FortellError;
use crate::render::{
    HeyGenClient, JobHandle, JobPoller, PollConfig, RenderRequest, RenderResult,
};
use crate::script::split_scenes;
use anyhow::Result;
use std::io::Read;
use std::sync::Arc;

/// Run the render command.
pub async fn run_render(
    script: &str,
    background: &str,
    avatar: Option<String>,
    voice: Option<String>,
    title: Option<String>,
    test: bool,
    no_wait: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Render) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fortell doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let script_text = read_script(script)?;
    let scenes = split_scenes(&script_text);

    if scenes.is_empty() {
        Output::error("The script contains no scenes; nothing to render.");
        return Err(anyhow::anyhow!("empty script"));
    }

    let mut render_settings = settings.render.clone();
    if test {
        render_settings.test_mode = true;
    }

    let api = Arc::new(HeyGenClient::from_env(&render_settings)?);
    let poller = JobPoller::with_config(api, PollConfig::from_settings(&render_settings));

    let request = RenderRequest::from_settings(scenes, background, &render_settings)
        .with_avatar(avatar)
        .with_voice(voice)
        .with_title(title);

    Output::info(&format!(
        "Submitting render job with {} scene(s)",
        request.scenes.len()
    ));

    let handle = poller.submit(&request).await?;
    Output::success(&format!("Job accepted: {}", handle.video_id));

    if no_wait {
        Output::info("Check progress with: fortell status <job-id> --wait");
        return Ok(());
    }

    wait_for_outcome(&poller, &handle).await
}

/// Read the script from a file, or stdin when the path is '-'.
fn read_script(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Poll the job and print its terminal outcome.
pub(super) async fn wait_for_outcome(poller: &JobPoller, handle: &JobHandle) -> Result<()> {
    let spinner = Output::spinner("Rendering (this can take a few minutes)...");

    match poller.await_completion(handle).await {
        Ok(RenderResult {
            video_url,
            attempts,
        }) => {
            spinner.finish_and_clear();
            match video_url {
                Some(url) => {
                    Output::success("Video ready!");
                    Output::kv("Video URL", &url);
                }
                None => {
                    Output::warning(
                        "Render completed, but the service returned no video URL. \
                         Check the render dashboard for the finished video.",
                    );
                }
            }
            Output::kv("Job ID", &handle.video_id);
            Output::kv("Status checks", &attempts.to_string());
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            match &e {
                FortellError::Render(reason) => {
                    Output::error(&format!(
                        "The render service reported a failure: {}",
                        reason
                    ));
                }
                FortellError::Timeout(msg) => {
                    Output::error(&format!("Gave up waiting: {}", msg));
                }
                other => {
                    Output::error(&format!("Polling failed: {}", other));
                }
            }
            Err(e.into())
        }
    }
}
