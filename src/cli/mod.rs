//! CLI module for Fortell.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Fortell - Narrated Avatar Videos
///
/// A local-first CLI tool that turns screen recordings into narrated avatar videos.
/// The name "Fortell" comes from the Norwegian word for "tell."
#[derive(Parser, Debug)]
#[command(name = "fortell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Fortell and verify credentials
    Init,

    /// Check credentials and configuration
    Doctor,

    /// Run the full pipeline: upload, script, render
    Produce {
        /// Path to the local screen recording
        video: String,

        /// Storage bucket for the upload (defaults to storage.bucket from config)
        #[arg(short, long)]
        bucket: Option<String>,

        /// Extra notes for the scriptwriter (audience, tone, product names)
        #[arg(short, long)]
        notes: Option<String>,

        /// Avatar to present the narration
        #[arg(long)]
        avatar: Option<String>,

        /// Voice to synthesize the narration with
        #[arg(long)]
        voice: Option<String>,

        /// Title shown on the render dashboard
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Upload a recording and print its public URL
    Upload {
        /// Path to the local file
        file: String,

        /// Storage bucket (defaults to storage.bucket from config)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Write a narration script for a hosted recording
    Script {
        /// Public URL of the recording
        video_url: String,

        /// Extra notes for the scriptwriter
        #[arg(short, long)]
        notes: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render a narrated avatar video from a script file
    Render {
        /// Path to the script file ('-' reads from stdin)
        script: String,

        /// Public URL of the background recording
        #[arg(short, long)]
        background: String,

        /// Avatar to present the narration
        #[arg(long)]
        avatar: Option<String>,

        /// Voice to synthesize the narration with
        #[arg(long)]
        voice: Option<String>,

        /// Title shown on the render dashboard
        #[arg(short, long)]
        title: Option<String>,

        /// Submit in test mode (watermarked, no credits spent)
        #[arg(long)]
        test: bool,

        /// Submit the job without waiting for it to finish
        #[arg(long)]
        no_wait: bool,
    },

    /// Check the status of a render job
    Status {
        /// Render job ID
        job_id: String,

        /// Keep polling until the job reaches a terminal state
        #[arg(short, long)]
        wait: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "render.avatar_id")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
