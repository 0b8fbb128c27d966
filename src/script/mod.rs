//! Narration scripts and their scene structure.
//!
//! A script is plain narration text with `[NEXT]` markers at scene
//! boundaries. Each span between markers becomes one rendered scene.

mod writer;

pub use writer::{OpenAiScriptWriter, ScriptGenerator};

use serde::{Deserialize, Serialize};

/// Literal token that delimits scene boundaries in narration text.
///
/// Consumers must never emit this token inside ordinary narration.
pub const SCENE_MARKER: &str = "[NEXT]";

/// One narration segment mapped to one rendered clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Narration text spoken over this scene.
    pub text: String,
    /// Order of this scene in the video.
    pub order: usize,
}

impl Scene {
    /// Create a new scene.
    pub fn new(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            order,
        }
    }
}

/// Split a narration script into ordered scenes on the `[NEXT]` marker.
///
/// Segments are trimmed; empty segments (including trailing ones left by a
/// final marker) are dropped, so every returned scene has non-empty text.
pub fn split_scenes(script: &str) -> Vec<Scene> {
    script
        .split(SCENE_MARKER)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(order, text)| Scene::new(text, order))
        .collect()
}
