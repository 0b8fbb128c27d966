//! Render service integration.
//!
//! Covers the full lifecycle of a render job: building the wire payload
//! from scenes, submitting it, and polling the job to a terminal outcome.

mod heygen;
mod poller;

pub use heygen::HeyGenClient;
pub use poller::{JobPoller, PollConfig};

use crate::config::RenderSettings;
use crate::error::Result;
use crate::script::Scene;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Avatar framing used for every scene: a circular crop pinned to the
/// lower corner of the frame, leaving the recording visible behind it.
const AVATAR_STYLE: &str = "circle";
const AVATAR_SCALE: f64 = 0.35;
const AVATAR_OFFSET_X: f64 = 0.3;
const AVATAR_OFFSET_Y: f64 = -0.4;

/// Output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

/// Validated input for one render job. Immutable after submission.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Ordered narration scenes, one rendered segment each.
    pub scenes: Vec<Scene>,
    /// Public URL of the recording used as the scene background.
    pub background_url: String,
    /// Avatar presenting the narration.
    pub avatar_id: String,
    /// Voice used to synthesize the narration.
    pub voice_id: String,
    /// Output dimensions.
    pub dimension: Dimension,
    /// Job title shown on the render dashboard.
    pub title: String,
    /// Submit in test mode (watermarked, no credits spent).
    pub test_mode: bool,
}

impl RenderRequest {
    /// Build a request from scenes and settings defaults.
    pub fn from_settings(
        scenes: Vec<Scene>,
        background_url: impl Into<String>,
        settings: &RenderSettings,
    ) -> Self {
        Self {
            scenes,
            background_url: background_url.into(),
            avatar_id: settings.avatar_id.clone(),
            voice_id: settings.voice_id.clone(),
            dimension: Dimension {
                width: settings.width,
                height: settings.height,
            },
            title: default_title(),
            test_mode: settings.test_mode,
        }
    }

    /// Override the avatar when one was given on the command line.
    pub fn with_avatar(mut self, avatar_id: Option<String>) -> Self {
        if let Some(id) = avatar_id.filter(|id| !id.is_empty()) {
            self.avatar_id = id;
        }
        self
    }

    /// Override the voice when one was given on the command line.
    pub fn with_voice(mut self, voice_id: Option<String>) -> Self {
        if let Some(id) = voice_id.filter(|id| !id.is_empty()) {
            self.voice_id = id;
        }
        self
    }

    /// Override the job title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        if let Some(t) = title.filter(|t| !t.is_empty()) {
            self.title = t;
        }
        self
    }

    /// Map this request onto the creation payload: one video input per scene.
    pub fn to_payload(&self) -> CreateVideoPayload {
        let video_inputs = self
            .scenes
            .iter()
            .map(|scene| VideoInput {
                character: CharacterSpec {
                    kind: "avatar".to_string(),
                    avatar_id: self.avatar_id.clone(),
                    avatar_style: AVATAR_STYLE.to_string(),
                    scale: AVATAR_SCALE,
                    x: AVATAR_OFFSET_X,
                    y: AVATAR_OFFSET_Y,
                },
                voice: VoiceSpec {
                    kind: "text".to_string(),
                    input_text: scene.text.clone(),
                    voice_id: self.voice_id.clone(),
                },
                background: BackgroundSpec {
                    kind: "video".to_string(),
                    video_url: self.background_url.clone(),
                    set_as_background: true,
                },
            })
            .collect();

        CreateVideoPayload {
            video_inputs,
            dimension: self.dimension,
            test: self.test_mode,
            title: self.title.clone(),
        }
    }
}

/// Default dashboard title for a submitted job.
fn default_title() -> String {
    format!(
        "Narrated screencast {}",
        chrono::Local::now().format("%Y-%m-%d")
    )
}

/// Creation request body for the render API.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVideoPayload {
    pub video_inputs: Vec<VideoInput>,
    pub dimension: Dimension,
    pub test: bool,
    pub title: String,
}

/// One rendered segment: avatar framing, voice-over, and background.
#[derive(Debug, Clone, Serialize)]
pub struct VideoInput {
    pub character: CharacterSpec,
    pub voice: VoiceSpec,
    pub background: BackgroundSpec,
}

/// Avatar placement for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub avatar_id: String,
    pub avatar_style: String,
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

/// Voice synthesis input for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub input_text: String,
    pub voice_id: String,
}

/// Background video for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct BackgroundSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub video_url: String,
    pub set_as_background: bool,
}

/// Handle for a submitted render job.
///
/// The identifier is issued by the remote service and never changes for
/// the lifetime of the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub video_id: String,
}

/// Latest observed status of a render job.
///
/// A report without a status string means the service answered with an
/// empty or unparseable body; the poller treats that as a retryable blip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReport {
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub error: Option<serde_json::Value>,
}

impl StatusReport {
    /// Human-readable error description, whatever shape the service sent.
    pub fn error_text(&self) -> Option<String> {
        match &self.error {
            None => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Terminal success of a render job.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// URL of the finished video. `None` when the service reported the
    /// job completed but returned no URL - a distinct, non-error outcome.
    pub video_url: Option<String>,
    /// Number of status checks it took to reach the outcome.
    pub attempts: u32,
}

/// Remote render service operations.
#[async_trait]
pub trait RenderApi: Send + Sync {
    /// Submit a creation request. Exactly one network call.
    async fn create_video(&self, payload: &CreateVideoPayload) -> Result<JobHandle>;

    /// Fetch the current status of a submitted job.
    async fn video_status(&self, video_id: &str) -> Result<StatusReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RenderRequest {
        RenderRequest::from_settings(
            vec![Scene::new("Welcome", 0), Scene::new("That's all", 1)],
            "https://storage.googleapis.com/demo/rec.mp4",
            &RenderSettings::default(),
        )
    }

    #[test]
    fn test_payload_has_one_input_per_scene() {
        let payload = sample_request().to_payload();
        assert_eq!(payload.video_inputs.len(), 2);
        assert_eq!(payload.video_inputs[0].voice.input_text, "Welcome");
        assert_eq!(payload.video_inputs[1].voice.input_text, "That's all");
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = sample_request().to_payload();
        let value = serde_json::to_value(&payload).unwrap();

        let character = &value["video_inputs"][0]["character"];
        assert_eq!(character["type"], "avatar");
        assert_eq!(character["avatar_style"], "circle");
        assert_eq!(character["scale"], 0.35);
        assert_eq!(character["x"], 0.3);
        assert_eq!(character["y"], -0.4);

        let background = &value["video_inputs"][0]["background"];
        assert_eq!(background["type"], "video");
        assert_eq!(background["set_as_background"], true);
        assert_eq!(
            background["video_url"],
            "https://storage.googleapis.com/demo/rec.mp4"
        );

        assert_eq!(value["dimension"]["width"], 1080);
        assert_eq!(value["dimension"]["height"], 1920);
        assert_eq!(value["test"], false);
    }

    #[test]
    fn test_overrides_ignore_empty_values() {
        let request = sample_request()
            .with_avatar(Some("host-avatar".to_string()))
            .with_voice(Some(String::new()))
            .with_title(None);

        assert_eq!(request.avatar_id, "host-avatar");
        assert_eq!(request.voice_id, RenderSettings::default().voice_id);
        assert!(!request.title.is_empty());
    }

    #[test]
    fn test_error_text_handles_both_shapes() {
        let mut report = StatusReport {
            status: Some("failed".to_string()),
            video_url: None,
            error: Some(serde_json::json!("bad avatar")),
        };
        assert_eq!(report.error_text().as_deref(), Some("bad avatar"));

        report.error = Some(serde_json::json!({"code": 40012, "message": "voice not found"}));
        let text = report.error_text().unwrap();
        assert!(text.contains("voice not found"));

        report.error = None;
        assert!(report.error_text().is_none());
    }

    #[test]
    fn test_status_report_deserializes_partial_bodies() {
        let report: StatusReport = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(report.status.as_deref(), Some("processing"));
        assert!(report.video_url.is_none());
        assert!(report.error.is_none());
    }
}
