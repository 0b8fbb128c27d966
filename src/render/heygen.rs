//! HeyGen render API client.

use super::{CreateVideoPayload, JobHandle, RenderApi, StatusReport};
use crate::config::RenderSettings;
use crate::error::{FortellError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Per-request timeout. Status polls and job creation are both small
/// JSON round trips; anything slower is treated as a transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the HeyGen video API.
///
/// The API key and base URL are injected at construction; nothing is read
/// from process-wide state after that.
#[derive(Debug)]
pub struct HeyGenClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HeyGenClient {
    /// Create a client for the given key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `HEYGEN_API_KEY` environment variable and
    /// the configured base URL.
    pub fn from_env(settings: &RenderSettings) -> Result<Self> {
        let api_key = std::env::var("HEYGEN_API_KEY").map_err(|_| {
            FortellError::Config(
                "HEYGEN_API_KEY not set. Set it with: export HEYGEN_API_KEY='...'".to_string(),
            )
        })?;
        Self::new(api_key, &settings.base_url)
    }
}

/// Creation response body. Only the job identifier matters.
#[derive(Debug, Deserialize)]
struct CreateVideoResponse {
    data: Option<CreateVideoData>,
}

#[derive(Debug, Deserialize)]
struct CreateVideoData {
    video_id: Option<String>,
}

/// Status response body wrapping the report.
#[derive(Debug, Deserialize)]
struct VideoStatusResponse {
    #[serde(default)]
    data: Option<StatusReport>,
}

#[async_trait]
impl RenderApi for HeyGenClient {
    #[instrument(skip(self, payload), fields(scenes = payload.video_inputs.len()))]
    async fn create_video(&self, payload: &CreateVideoPayload) -> Result<JobHandle> {
        debug!("Submitting render job to {}", self.base_url);

        let response = self
            .http
            .post(format!("{}/v2/video/generate", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await?;

        // The raw body goes into the error for diagnostics, so read it
        // before deciding whether the call succeeded.
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FortellError::Submission(format!(
                "creation request returned {}: {}",
                status, body
            )));
        }

        let parsed: CreateVideoResponse = serde_json::from_str(&body).map_err(|_| {
            FortellError::Submission(format!("unexpected response format: {}", body))
        })?;

        match parsed.data.and_then(|d| d.video_id) {
            Some(video_id) => {
                info!("Render job accepted: {}", video_id);
                Ok(JobHandle { video_id })
            }
            None => Err(FortellError::Submission(format!(
                "response is missing a job identifier: {}",
                body
            ))),
        }
    }

    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn video_status(&self, video_id: &str) -> Result<StatusReport> {
        let response = self
            .http
            .get(format!("{}/v1/video_status.get", self.base_url))
            .query(&[("video_id", video_id)])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;

        // A body we cannot parse is a status-less report, not a transport
        // failure; the poller retries it on the normal interval.
        match serde_json::from_str::<VideoStatusResponse>(&body) {
            Ok(parsed) => Ok(parsed.data.unwrap_or_default()),
            Err(e) => {
                warn!("Unparseable status body ({}): {}", e, body);
                Ok(StatusReport::default())
            }
        }
    }
}
