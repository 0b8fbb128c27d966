//! Polling state machine for submitted render jobs.
//!
//! One shared attempt budget covers every kind of poll iteration: ordinary
//! pending statuses, transport errors, and malformed bodies. Exhausting the
//! budget while the job is still pending is a timeout, distinct from a
//! failure the service itself reported.

use super::{JobHandle, RenderApi, RenderRequest, RenderResult, StatusReport};
use crate::config::RenderSettings;
use crate::error::{FortellError, Result};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Timing and budget for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between ordinary status polls.
    pub poll_interval: Duration,
    /// Longer wait after a transport error before polling again.
    pub error_backoff: Duration,
    /// Total status checks before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        // 10 polls at 20s caps the wait near 200s before giving up.
        Self {
            poll_interval: Duration::from_secs(20),
            error_backoff: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl PollConfig {
    /// Build a poll configuration from render settings.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.poll_interval_seconds),
            error_backoff: Duration::from_secs(settings.error_backoff_seconds),
            max_attempts: settings.max_poll_attempts,
        }
    }
}

/// Submits render jobs and polls them to a terminal outcome.
///
/// Holds one job in flight at a time: submit, then wait on the returned
/// handle before submitting again.
pub struct JobPoller {
    api: Arc<dyn RenderApi>,
    config: PollConfig,
}

/// What a single status report means for the poll loop.
#[derive(Debug)]
enum Disposition {
    Completed(Option<String>),
    Failed(String),
    Pending(String),
    Malformed,
}

fn classify(report: &StatusReport) -> Disposition {
    match report.status.as_deref() {
        None => Disposition::Malformed,
        Some("completed") => Disposition::Completed(report.video_url.clone()),
        Some("failed") | Some("error") => Disposition::Failed(
            report
                .error_text()
                .unwrap_or_else(|| "unknown error".to_string()),
        ),
        Some(other) => Disposition::Pending(other.to_string()),
    }
}

fn background_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("valid URL pattern"))
}

impl JobPoller {
    /// Create a poller with default timing.
    pub fn new(api: Arc<dyn RenderApi>) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    /// Create a poller with custom timing and budget.
    pub fn with_config(api: Arc<dyn RenderApi>, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Validate and submit a render job.
    ///
    /// Rejects bad input before any network call; otherwise issues exactly
    /// one creation request. A failed submission is never retried.
    #[instrument(skip(self, request), fields(scenes = request.scenes.len()))]
    pub async fn submit(&self, request: &RenderRequest) -> Result<JobHandle> {
        validate(request)?;
        self.api.create_video(&request.to_payload()).await
    }

    /// Poll the job until it reaches a terminal outcome.
    ///
    /// Blocks the calling task between polls. Transport errors and
    /// malformed bodies are absorbed up to the shared attempt budget.
    #[instrument(skip(self), fields(video_id = %handle.video_id))]
    pub async fn await_completion(&self, handle: &JobHandle) -> Result<RenderResult> {
        let mut attempts = 0u32;

        while attempts < self.config.max_attempts {
            attempts += 1;

            let wait = match self.api.video_status(&handle.video_id).await {
                Err(e) => {
                    warn!(
                        "Status request failed (attempt {}/{}): {}",
                        attempts, self.config.max_attempts, e
                    );
                    self.config.error_backoff
                }
                Ok(report) => match classify(&report) {
                    Disposition::Completed(video_url) => {
                        info!("Render job completed after {} status check(s)", attempts);
                        return Ok(RenderResult {
                            video_url,
                            attempts,
                        });
                    }
                    Disposition::Failed(reason) => {
                        return Err(FortellError::Render(reason));
                    }
                    Disposition::Pending(state) => {
                        debug!(
                            "Job still {} (attempt {}/{})",
                            state, attempts, self.config.max_attempts
                        );
                        self.config.poll_interval
                    }
                    Disposition::Malformed => {
                        warn!(
                            "Status response had no usable body (attempt {}/{})",
                            attempts, self.config.max_attempts
                        );
                        self.config.poll_interval
                    }
                },
            };

            if attempts < self.config.max_attempts {
                tokio::time::sleep(wait).await;
            }
        }

        Err(FortellError::Timeout(format!(
            "job {} still pending after {} status checks; check the render dashboard manually",
            handle.video_id, self.config.max_attempts
        )))
    }
}

/// Reject requests that could never render before spending a network call.
fn validate(request: &RenderRequest) -> Result<()> {
    if request.scenes.is_empty() {
        return Err(FortellError::InvalidInput(
            "script produced no scenes; nothing to render".to_string(),
        ));
    }

    if request.scenes.iter().any(|s| s.text.trim().is_empty()) {
        return Err(FortellError::InvalidInput(
            "script contains an empty scene".to_string(),
        ));
    }

    if !background_url_pattern().is_match(&request.background_url) {
        return Err(FortellError::InvalidInput(format!(
            "invalid background video URL '{}': must start with http:// or https://",
            request.background_url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CreateVideoPayload;
    use crate::script::{split_scenes, Scene};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Render API double that replays a scripted sequence of status
    /// responses and records what was submitted.
    struct ScriptedApi {
        create_calls: AtomicUsize,
        status_calls: AtomicUsize,
        captured: Mutex<Option<CreateVideoPayload>>,
        responses: Mutex<VecDeque<Result<StatusReport>>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Result<StatusReport>>) -> Arc<Self> {
            Arc::new(Self {
                create_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                captured: Mutex::new(None),
                responses: Mutex::new(responses.into()),
            })
        }

        fn pending(status: &str) -> Result<StatusReport> {
            Ok(StatusReport {
                status: Some(status.to_string()),
                ..Default::default()
            })
        }

        fn completed(url: Option<&str>) -> Result<StatusReport> {
            Ok(StatusReport {
                status: Some("completed".to_string()),
                video_url: url.map(str::to_string),
                error: None,
            })
        }

        fn failed(reason: &str) -> Result<StatusReport> {
            Ok(StatusReport {
                status: Some("failed".to_string()),
                video_url: None,
                error: Some(serde_json::json!(reason)),
            })
        }

        fn transport_error() -> Result<StatusReport> {
            Err(FortellError::Io(std::io::Error::other("connection reset")))
        }
    }

    #[async_trait]
    impl RenderApi for ScriptedApi {
        async fn create_video(&self, payload: &CreateVideoPayload) -> Result<JobHandle> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            *self.captured.lock().unwrap() = Some(payload.clone());
            Ok(JobHandle {
                video_id: "vid-123".to_string(),
            })
        }

        async fn video_status(&self, _video_id: &str) -> Result<StatusReport> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(StatusReport::default()))
        }
    }

    fn fast_poller(api: Arc<ScriptedApi>) -> JobPoller {
        JobPoller::with_config(
            api,
            PollConfig {
                poll_interval: Duration::ZERO,
                error_backoff: Duration::ZERO,
                max_attempts: 10,
            },
        )
    }

    fn request_with_scenes(scenes: Vec<Scene>) -> RenderRequest {
        RenderRequest::from_settings(
            scenes,
            "https://storage.googleapis.com/demo/rec.mp4",
            &RenderSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_builds_one_input_per_scene() {
        let api = ScriptedApi::new(vec![]);
        let poller = fast_poller(api.clone());

        let scenes = split_scenes("Intro [NEXT] Details [NEXT] Wrap-up [NEXT]");
        let handle = poller
            .submit(&request_with_scenes(scenes))
            .await
            .unwrap();

        assert_eq!(handle.video_id, "vid-123");
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);

        let payload = api.captured.lock().unwrap().clone().unwrap();
        assert_eq!(payload.video_inputs.len(), 3);
        assert_eq!(payload.video_inputs[1].voice.input_text, "Details");
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_url_without_network_call() {
        let api = ScriptedApi::new(vec![]);
        let poller = fast_poller(api.clone());

        let mut request = request_with_scenes(vec![Scene::new("Hi", 0)]);
        request.background_url = "gs://demo/rec.mp4".to_string();

        let err = poller.submit(&request).await.unwrap_err();
        assert!(matches!(err, FortellError::InvalidInput(_)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_scene_list() {
        let api = ScriptedApi::new(vec![]);
        let poller = fast_poller(api.clone());

        let err = poller
            .submit(&request_with_scenes(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, FortellError::InvalidInput(_)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_completes_after_pending_polls() {
        let api = ScriptedApi::new(vec![
            ScriptedApi::pending("processing"),
            ScriptedApi::pending("processing"),
            ScriptedApi::completed(Some("https://cdn.example.com/final.mp4")),
        ]);
        let poller = fast_poller(api.clone());

        let result = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            result.video_url.as_deref(),
            Some("https://cdn.example.com/final.mp4")
        );
        assert_eq!(result.attempts, 3);
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_pending_budget_exhaustion_is_timeout_not_failure() {
        let api = ScriptedApi::new(
            (0..10).map(|_| ScriptedApi::pending("processing")).collect(),
        );
        let poller = fast_poller(api.clone());

        let err = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FortellError::Timeout(_)));
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces_immediately() {
        let api = ScriptedApi::new(vec![ScriptedApi::failed("bad avatar")]);
        let poller = fast_poller(api.clone());

        let err = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            FortellError::Render(reason) => assert_eq!(reason, "bad avatar"),
            other => panic!("expected render error, got {:?}", other),
        }
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_are_absorbed() {
        let api = ScriptedApi::new(vec![
            ScriptedApi::transport_error(),
            ScriptedApi::completed(Some("https://cdn.example.com/final.mp4")),
        ]);
        let poller = fast_poller(api.clone());

        let result = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_malformed_reports_count_against_the_same_budget() {
        let api = ScriptedApi::new(vec![
            Ok(StatusReport::default()),
            ScriptedApi::completed(Some("https://cdn.example.com/final.mp4")),
        ]);
        let poller = fast_poller(api.clone());

        let result = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_completed_without_url_is_success() {
        let api = ScriptedApi::new(vec![ScriptedApi::completed(None)]);
        let poller = fast_poller(api.clone());

        let result = poller
            .await_completion(&JobHandle {
                video_id: "vid-123".to_string(),
            })
            .await
            .unwrap();

        assert!(result.video_url.is_none());
    }

    #[test]
    fn test_classify_unknown_status_stays_pending() {
        let report = StatusReport {
            status: Some("waiting".to_string()),
            ..Default::default()
        };
        assert!(matches!(classify(&report), Disposition::Pending(_)));
    }

    #[test]
    fn test_classify_error_status_is_failure() {
        let report = StatusReport {
            status: Some("error".to_string()),
            ..Default::default()
        };
        match classify(&report) {
            Disposition::Failed(reason) => assert_eq!(reason, "unknown error"),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
