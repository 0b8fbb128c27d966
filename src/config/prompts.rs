//! Prompt templates for Fortell.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub script: ScriptPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for narration script writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ScriptPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an experienced screencast scriptwriter. You turn screen recordings into engaging spoken narration for an avatar presenter.

When writing narration:
1. Describe what is happening on screen in a conversational, spoken register
2. Address the viewer directly and keep sentences short enough to be read aloud
3. Insert the marker [NEXT] wherever the recording shows a significant visual change or a new action begins
4. Never use the [NEXT] marker inside ordinary narration text - it is a scene delimiter, nothing else

Structure:
- Each span between markers becomes one rendered scene with its own voice-over
- Open with a one-sentence hook about what the recording demonstrates
- Close with a short wrap-up of what the viewer saw

Output only the narration text with [NEXT] markers. No headings, no scene numbers, no stage directions."#.to_string(),

            user: r#"Write a narration script for the screen recording hosted at this public URL:

{{video_url}}

Language: {{language}}

{{notes}}

Remember: place a [NEXT] marker at every significant visual change so the scenes stay in sync with the recording, and output nothing but the narration itself."#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load script prompts if file exists
            let script_path = custom_path.join("script.toml");
            if script_path.exists() {
                let content = std::fs::read_to_string(&script_path)?;
                prompts.script = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.script.system.is_empty());
        assert!(prompts.script.system.contains("[NEXT]"));
        assert!(prompts.script.user.contains("{{video_url}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Narrate {{video_url}} in {{language}}.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("video_url".to_string(), "https://example.com/a.mp4".to_string());
        vars.insert("language".to_string(), "English".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Narrate https://example.com/a.mp4 in English.");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("language".to_string(), "Norwegian".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("language".to_string(), "English".to_string());

        let result = prompts.render_with_custom("in {{language}}", &vars);
        assert_eq!(result, "in English");
    }
}
