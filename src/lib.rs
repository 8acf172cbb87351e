//! # cv-extract
//!
//! A library for extracting structured candidate data from CV documents
//! with LLM-powered field extraction.
//!
//! ## Features
//!
//! - Text extraction from PDF, DOCX, and plain-text documents
//! - Four independent extraction categories (basic info, languages,
//!   specialties, skills) with per-category failure tolerance
//! - Deterministic completions (temperature 0, JSON-object output) against
//!   any OpenAI-compatible endpoint
//! - Overridable Tera prompt templates
//! - Atomic, idempotent JSON record output
//!
//! ## Quick Start
//!
//! ```no_run
//! use cv_extract::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .input_path("./alice.pdf")
//!     .model("gpt-4o")
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Document**: Converts the input file to plain text
//! 2. **Prompt**: Renders one instruction payload per category
//! 3. **Fields**: Runs each category against the completion endpoint
//! 4. **Writer**: Assembles and persists the candidate record

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod document;
mod error;
mod fields;
mod pipeline;
mod prompt;
mod record;
mod writer;

pub use client::{ChatCompletion, OpenAiClient};
pub use config::{Config, ConfigBuilder, API_KEY_FALLBACK_VAR, API_KEY_VAR, OUTPUT_DIR_NAME};
pub use document::{extract_text, DocumentKind};
pub use error::{Error, Result};
pub use fields::{CategoryOutcome, FieldExtractor};
pub use pipeline::{Pipeline, RunOutcome, RunStats};
pub use prompt::{Category, PromptLibrary};
pub use record::CandidateRecord;
pub use writer::RecordWriter;

/// Runs the complete extraction pipeline with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The input path does not exist
/// - Text extraction yields no content
/// - The output record cannot be written
///
/// # Examples
///
/// ```no_run
/// use cv_extract::{run, Config};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .input_path("./alice.pdf")
///     .model("gpt-4o")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunOutcome> {
    Pipeline::new(config)?.run()
}
