//! Fortell CLI entry point.

use anyhow::Result;
use clap::Parser;
use fortell::cli::{commands, Cli, Commands};
use fortell::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("fortell={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load API keys from a .env file if present
    let _ = dotenvy::dotenv();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Produce {
            video,
            bucket,
            notes,
            avatar,
            voice,
            title,
        } => {
            commands::run_produce(
                video,
                bucket.clone(),
                notes.clone(),
                avatar.clone(),
                voice.clone(),
                title.clone(),
                settings,
            )
            .await?;
        }

        Commands::Upload { file, bucket } => {
            commands::run_upload(file, bucket.clone(), settings).await?;
        }

        Commands::Script {
            video_url,
            notes,
            model,
            output,
        } => {
            commands::run_script(video_url, notes.clone(), model.clone(), output.clone(), settings)
                .await?;
        }

        Commands::Render {
            script,
            background,
            avatar,
            voice,
            title,
            test,
            no_wait,
        } => {
            commands::run_render(
                script,
                background,
                avatar.clone(),
                voice.clone(),
                title.clone(),
                *test,
                *no_wait,
                settings,
            )
            .await?;
        }

        Commands::Status { job_id, wait } => {
            commands::run_status(job_id, *wait, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
