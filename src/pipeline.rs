//! Pipeline driver for Fortell.
//!
//! Coordinates the three stages: upload the recording, write the narration
//! script, render the avatar video. Each stage hands a typed result to the
//! next; at most one render job is in flight at a time.

use crate::config::{Prompts, Settings};
use crate::error::{FortellError, Result};
use crate::render::{HeyGenClient, JobPoller, PollConfig, RenderRequest, RenderResult};
use crate::script::{split_scenes, OpenAiScriptWriter, ScriptGenerator};
use crate::storage::{GcsStore, ObjectStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main pipeline for producing a narrated avatar video.
pub struct Pipeline {
    settings: Settings,
    store: Arc<dyn ObjectStore>,
    writer: Arc<dyn ScriptGenerator>,
    poller: JobPoller,
}

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct ProduceOptions {
    /// Author notes woven into the script prompt.
    pub notes: Option<String>,
    /// Avatar override.
    pub avatar_id: Option<String>,
    /// Voice override.
    pub voice_id: Option<String>,
    /// Job title override.
    pub title: Option<String>,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct ProduceReport {
    /// Public URL of the uploaded recording.
    pub recording_url: String,
    /// Identifier of the render job.
    pub job_id: String,
    /// Number of scenes submitted.
    pub scenes: usize,
    /// URL of the finished video, if the service returned one.
    pub video_url: Option<String>,
    /// Status checks it took to finish.
    pub attempts: u32,
}

impl Pipeline {
    /// Create a pipeline wired to the real services.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let store = Arc::new(GcsStore::from_env(&settings.storage)?);

        let writer = Arc::new(
            OpenAiScriptWriter::with_config(&settings.script.model, &settings.script.language)
                .with_prompts(prompts),
        );

        let api = Arc::new(HeyGenClient::from_env(&settings.render)?);
        let poller = JobPoller::with_config(api, PollConfig::from_settings(&settings.render));

        Ok(Self {
            settings,
            store,
            writer,
            poller,
        })
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        store: Arc<dyn ObjectStore>,
        writer: Arc<dyn ScriptGenerator>,
        poller: JobPoller,
    ) -> Self {
        Self {
            settings,
            store,
            writer,
            poller,
        }
    }

    /// Run the full pipeline: upload, script, render.
    #[instrument(skip(self, options), fields(video_path = %video_path.display()))]
    pub async fn produce(
        &self,
        video_path: &Path,
        bucket: &str,
        options: &ProduceOptions,
    ) -> Result<ProduceReport> {
        if !video_path.exists() {
            return Err(FortellError::InvalidInput(format!(
                "recording not found: {}",
                video_path.display()
            )));
        }

        // Upload
        info!("Uploading recording to bucket {}", bucket);
        eprintln!("  Uploading recording...");
        let uploaded = self.store.upload(video_path, bucket).await?;
        eprintln!("  Uploaded: {}", uploaded.public_url);

        // Script
        info!("Writing narration script");
        eprintln!("  Writing narration script...");
        let script = self
            .writer
            .compose(&uploaded.public_url, options.notes.as_deref())
            .await?;
        let scenes = split_scenes(&script);
        eprintln!("  Script ready ({} scenes)", scenes.len());

        // Render
        let request = RenderRequest::from_settings(
            scenes,
            &uploaded.public_url,
            &self.settings.render,
        )
        .with_avatar(options.avatar_id.clone())
        .with_voice(options.voice_id.clone())
        .with_title(options.title.clone());
        let scene_count = request.scenes.len();

        info!("Submitting render job with {} scenes", scene_count);
        eprintln!("  Submitting render job...");
        let handle = self.poller.submit(&request).await?;
        eprintln!("  Job {} accepted; waiting for the render...", handle.video_id);

        let RenderResult {
            video_url,
            attempts,
        } = self.poller.await_completion(&handle).await?;

        Ok(ProduceReport {
            recording_url: uploaded.public_url,
            job_id: handle.video_id,
            scenes: scene_count,
            video_url,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CreateVideoPayload, JobHandle, RenderApi, StatusReport};
    use crate::storage::UploadedObject;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StubStore;

    #[async_trait]
    impl ObjectStore for StubStore {
        async fn upload(&self, path: &Path, bucket: &str) -> Result<UploadedObject> {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("rec.mp4")
                .to_string();
            Ok(UploadedObject {
                bucket: bucket.to_string(),
                public_url: format!("https://storage.googleapis.com/{}/{}", bucket, name),
                name,
            })
        }
    }

    struct StubWriter {
        seen_url: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ScriptGenerator for StubWriter {
        async fn compose(&self, video_url: &str, _notes: Option<&str>) -> Result<String> {
            *self.seen_url.lock().unwrap() = Some(video_url.to_string());
            Ok("First scene [NEXT] Second scene".to_string())
        }
    }

    struct InstantApi {
        submitted: Mutex<Option<CreateVideoPayload>>,
    }

    #[async_trait]
    impl RenderApi for InstantApi {
        async fn create_video(&self, payload: &CreateVideoPayload) -> Result<JobHandle> {
            *self.submitted.lock().unwrap() = Some(payload.clone());
            Ok(JobHandle {
                video_id: "vid-42".to_string(),
            })
        }

        async fn video_status(&self, _video_id: &str) -> Result<StatusReport> {
            Ok(StatusReport {
                status: Some("completed".to_string()),
                video_url: Some("https://cdn.example.com/final.mp4".to_string()),
                error: None,
            })
        }
    }

    fn test_pipeline(api: Arc<InstantApi>, writer: Arc<StubWriter>) -> Pipeline {
        let poller = JobPoller::with_config(
            api,
            crate::render::PollConfig {
                poll_interval: Duration::ZERO,
                error_backoff: Duration::ZERO,
                max_attempts: 10,
            },
        );
        Pipeline::with_components(Settings::default(), Arc::new(StubStore), writer, poller)
    }

    #[tokio::test]
    async fn test_produce_threads_upload_url_through_stages() {
        let api = Arc::new(InstantApi {
            submitted: Mutex::new(None),
        });
        let writer = Arc::new(StubWriter {
            seen_url: Mutex::new(None),
        });
        let pipeline = test_pipeline(api.clone(), writer.clone());

        let recording = tempfile::Builder::new()
            .suffix(".mp4")
            .tempfile()
            .unwrap();

        let report = pipeline
            .produce(recording.path(), "demo-bucket", &ProduceOptions::default())
            .await
            .unwrap();

        // The script writer and the render background both receive the
        // uploaded recording's public URL.
        let seen = writer.seen_url.lock().unwrap().clone().unwrap();
        assert_eq!(seen, report.recording_url);

        let payload = api.submitted.lock().unwrap().clone().unwrap();
        assert_eq!(payload.video_inputs.len(), 2);
        assert_eq!(
            payload.video_inputs[0].background.video_url,
            report.recording_url
        );

        assert_eq!(report.job_id, "vid-42");
        assert_eq!(report.scenes, 2);
        assert_eq!(
            report.video_url.as_deref(),
            Some("https://cdn.example.com/final.mp4")
        );
    }

    #[tokio::test]
    async fn test_produce_rejects_missing_recording() {
        let api = Arc::new(InstantApi {
            submitted: Mutex::new(None),
        });
        let writer = Arc::new(StubWriter {
            seen_url: Mutex::new(None),
        });
        let pipeline = test_pipeline(api, writer);

        let err = pipeline
            .produce(
                Path::new("/nonexistent/recording.mp4"),
                "demo-bucket",
                &ProduceOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FortellError::InvalidInput(_)));
    }
}
