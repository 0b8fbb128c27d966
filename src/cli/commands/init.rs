//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Fortell Setup");
    println!();
    println!("Welcome to Fortell! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API keys
    println!("{}", style("Step 1: Checking API keys").bold().cyan());
    println!();

    let mut missing = Vec::new();

    if std::env::var("OPENAI_API_KEY").is_err() {
        missing.push((
            "OPENAI_API_KEY",
            "Scriptwriting uses the OpenAI API.",
            "export OPENAI_API_KEY='sk-...'",
        ));
    }
    if std::env::var("HEYGEN_API_KEY").is_err() {
        missing.push((
            "HEYGEN_API_KEY",
            "Rendering uses the HeyGen video API.",
            "export HEYGEN_API_KEY='...'",
        ));
    }

    if missing.is_empty() {
        Output::success("API keys are configured!");
    } else {
        Output::warning("Some API keys are missing:");
        println!();
        for (name, why, hint) in &missing {
            println!("  {} {} - {}", style("✗").red(), style(name).bold(), why);
            println!("    {} {}", style("→").dim(), style(hint).green());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Set the missing keys and run 'fortell init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: Check storage credentials
    println!("{}", style("Step 2: Checking storage credentials").bold().cyan());
    println!();

    if std::env::var("GOOGLE_APPLICATION_CREDENTIALS").is_err() {
        Output::warning("GOOGLE_APPLICATION_CREDENTIALS is not set.");
        println!();
        println!("  Fortell uploads recordings to Google Cloud Storage using a");
        println!("  service account. Point the variable at its JSON key file:");
        println!("  {}", style("export GOOGLE_APPLICATION_CREDENTIALS='/path/to/key.json'").green());
        println!();

        if !prompt_continue("Continue without storage credentials?")? {
            println!();
            Output::info("Setup cancelled. Configure credentials and run 'fortell init' again.");
            return Ok(());
        }
    } else {
        Output::success("Storage credentials are configured!");
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("fortell config edit").green());
        println!("  Set a default bucket with: {}", style("storage.bucket").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check credentials", style("fortell doctor").cyan());
    println!(
        "  {} Produce your first video",
        style("fortell produce recording.mp4 --bucket my-bucket").cyan()
    );
    println!();
    println!("For more help: {}", style("fortell --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
