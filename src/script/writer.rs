//! LLM-backed narration script writing.

use crate::config::Prompts;
use crate::error::{FortellError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Produces narration scripts with `[NEXT]` scene markers.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Write a narration script for the recording at `video_url`.
    async fn compose(&self, video_url: &str, notes: Option<&str>) -> Result<String>;
}

/// OpenAI-based script writer.
pub struct OpenAiScriptWriter {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: String,
    prompts: Prompts,
}

impl OpenAiScriptWriter {
    /// Create a new script writer with default settings.
    pub fn new() -> Self {
        Self::with_config("gpt-4o", "English")
    }

    /// Create a new script writer with custom model and narration language.
    pub fn with_config(model: &str, language: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            language: language.to_string(),
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }
}

impl Default for OpenAiScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptWriter {
    #[instrument(skip(self), fields(video_url = %video_url))]
    async fn compose(&self, video_url: &str, notes: Option<&str>) -> Result<String> {
        info!("Writing narration script with {}", self.model);

        let mut vars = HashMap::new();
        vars.insert("video_url".to_string(), video_url.to_string());
        vars.insert("language".to_string(), self.language.clone());
        vars.insert(
            "notes".to_string(),
            match notes {
                Some(n) => format!("Additional notes from the author:\n{}", n),
                None => String::new(),
            },
        );

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.script.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.script.system.clone())
                .build()
                .map_err(|e| FortellError::Script(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| FortellError::Script(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| FortellError::Script(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            FortellError::OpenAI(format!("Failed to generate script: {}", e))
        })?;

        let script = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| FortellError::Script("Empty response from LLM".to_string()))?
            .trim()
            .to_string();

        if script.is_empty() {
            return Err(FortellError::Script(
                "Model returned a blank script".to_string(),
            ));
        }

        debug!("Generated script with {} characters", script.len());
        Ok(script)
    }
}
