//! Produce command implementation - the full pipeline.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::FortellError;
use crate::pipeline::{Pipeline, ProduceOptions, ProduceReport};
use anyhow::Result;
use std::path::Path;

/// Run the produce command.
pub async fn run_produce(
    video: &str,
    bucket: Option<String>,
    notes: Option<String>,
    avatar: Option<String>,
    voice: Option<String>,
    title: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Produce) {
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

    Output::info(&format!("Producing narrated video from {}", video));

    let pipeline = Pipeline::new(settings)?;
    let options = ProduceOptions {
        notes,
        avatar_id: avatar,
        voice_id: voice,
        title,
    };

    match pipeline.produce(Path::new(video), &bucket, &options).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            print_failure(&e);
            Err(e.into())
        }
    }
}

fn print_report(report: &ProduceReport) {
    println!();
    match &report.video_url {
        Some(url) => {
            Output::success("Video ready!");
            Output::kv("Video URL", url);
        }
        None => {
            Output::warning(
                "Render completed, but the service returned no video URL. \
                 Check the render dashboard for the finished video.",
            );
        }
    }
    Output::kv("Job ID", &report.job_id);
    Output::kv("Scenes", &report.scenes.to_string());
    Output::kv("Recording", &report.recording_url);
    Output::kv("Status checks", &report.attempts.to_string());
}

fn print_failure(error: &FortellError) {
    match error {
        FortellError::Render(reason) => {
            Output::error(&format!("The render service reported a failure: {}", reason));
        }
        FortellError::Timeout(msg) => {
            Output::error(&format!("Gave up waiting: {}", msg));
        }
        other => {
            Output::error(&format!("Pipeline failed: {}", other));
        }
    }
}
