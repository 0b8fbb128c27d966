//! Fortell - Narrated Avatar Videos from Screen Recordings
//!
//! A local-first CLI tool that turns a screen recording into a narrated avatar video.
//!
//! The name "Fortell" comes from the Norwegian word for "tell."
//!
//! # Overview
//!
//! Fortell allows you to:
//! - Upload a screen recording to cloud storage and get a public URL
//! - Write a narration script with scene markers using an LLM
//! - Render a narrated avatar video over the recording and wait for it
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `storage` - Cloud storage uploads
//! - `script` - Narration scripts and scene splitting
//! - `render` - Render job submission and status polling
//! - `pipeline` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use fortell::config::Settings;
//! use fortell::pipeline::{Pipeline, ProduceOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     // Produce a narrated video from a local recording
//!     let report = pipeline
//!         .produce(
//!             std::path::Path::new("recording.mp4"),
//!             "my-bucket",
//!             &ProduceOptions::default(),
//!         )
//!         .await?;
//!     println!("Finished after {} status checks", report.attempts);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod script;
pub mod storage;

pub use error::{FortellError, Result};
