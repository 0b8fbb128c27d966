//! Script command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::script::{split_scenes, OpenAiScriptWriter, ScriptGenerator};
use anyhow::Result;

/// Run the script command.
pub async fn run_script(
    video_url: &str,
    notes: Option<String>,
    model: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Script) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fortell doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let model = model.unwrap_or_else(|| settings.script.model.clone());
    let writer = OpenAiScriptWriter::with_config(&model, &settings.script.language)
        .with_prompts(prompts);

    let spinner = Output::spinner("Writing narration script...");

    let script = match writer.compose(video_url, notes.as_deref()).await {
        Ok(script) => {
            spinner.finish_and_clear();
            script
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Script generation failed: {}", e));
            return Err(e.into());
        }
    };

    let scenes = split_scenes(&script);

    match output {
        Some(path) => {
            std::fs::write(&path, &script)?;
            Output::success(&format!(
                "Wrote script with {} scene(s) to {}",
                scenes.len(),
                path
            ));
        }
        None => {
            println!("{}", script);
            Output::info(&format!("{} scene(s)", scenes.len()));
        }
    }

    Ok(())
}
