//! Configuration module for Fortell.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ScriptPrompts};
pub use settings::{
    GeneralSettings, PromptSettings, RenderSettings, ScriptSettings, Settings,
    StorageSettings,
};
