use crate::{
    client::{ChatCompletion, OpenAiClient},
    config::Config,
    document,
    error::{Error, Result},
    fields::{CategoryOutcome, FieldExtractor},
    prompt::{Category, PromptLibrary},
    record::CandidateRecord,
    writer::RecordWriter,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Statistics collected during a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    /// Input file's base name
    pub file_name: String,

    /// Path of the written record
    pub output_path: String,

    /// Characters of text extracted from the document
    pub text_chars: usize,

    /// Categories with an extracted payload
    pub categories_extracted: usize,

    /// Categories that degraded to their default
    pub categories_empty: usize,

    /// Categories whose response failed to parse
    pub categories_failed: usize,

    /// Total execution time
    pub duration: Duration,

    /// Time spent extracting document text
    pub extract_duration: Duration,

    /// Time spent on completion round-trips
    pub completion_duration: Duration,

    /// Time spent writing the record
    pub write_duration: Duration,
}

impl RunStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Extraction Summary                       ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Input File:           {:>30} ║",
            truncate_end(&self.file_name, 30)
        );
        println!(
            "║ Text Extracted:       {:>8} chars                  ║",
            self.text_chars
        );
        println!("║                                                       ║");
        println!(
            "║ Categories Extracted: {:>8}                        ║",
            self.categories_extracted
        );
        println!(
            "║ Categories Empty:     {:>8}                        ║",
            self.categories_empty
        );
        println!(
            "║ Categories Failed:    {:>8}                        ║",
            self.categories_failed
        );
        println!("║                                                       ║");
        println!("║ Output File:                                          ║");
        println!(
            "║   {}                                              ║",
            self.output_path
        );
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Text Extraction:  {:>8.2}s                     ║",
            self.extract_duration.as_secs_f64()
        );
        println!(
            "║   - Completions:      {:>8.2}s                     ║",
            self.completion_duration.as_secs_f64()
        );
        println!(
            "║   - Writing:          {:>8.2}s                     ║",
            self.write_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

fn truncate_end(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let tail: String = s.chars().rev().take(max.saturating_sub(1)).collect();
        format!("…{}", tail.chars().rev().collect::<String>())
    }
}

/// Outcome of a pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The input file was processed and its record written.
    Completed(RunStats),
    /// The input was a directory; batch processing is not implemented and
    /// nothing was done.
    DirectoryUnsupported,
}

/// Main pipeline orchestrator for extracting structured candidate data.
pub struct Pipeline<C = OpenAiClient> {
    config: Config,
    client: C,
    prompts: PromptLibrary,
    writer: RecordWriter,
}

impl Pipeline<OpenAiClient> {
    /// Creates a pipeline with the default completion client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The HTTP client cannot be built
    /// - Template registration fails
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = OpenAiClient::new(&config)?;
        Self::with_client(config, client)
    }
}

impl<C: ChatCompletion> Pipeline<C> {
    /// Creates a pipeline with an explicit completion client.
    ///
    /// This is the seam for test doubles and alternative endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation or template
    /// registration fails.
    pub fn with_client(config: Config, client: C) -> Result<Self> {
        config.validate()?;

        let prompts = PromptLibrary::new(config.template_dir.as_deref())?;
        let writer = RecordWriter::new(config.resolved_output_dir());

        Ok(Self {
            config,
            client,
            prompts,
            writer,
        })
    }

    /// Executes the complete pipeline.
    ///
    /// # Process
    ///
    /// 1. **Resolve**: a directory input is reported as unsupported and
    ///    skipped without side effects
    /// 2. **Extract**: converts the document to plain text
    /// 3. **Complete**: runs the four category extractions in order
    /// 4. **Write**: persists the combined record
    ///
    /// Category failures degrade to defaults; extraction and write failures
    /// abort the file.
    ///
    /// # Errors
    ///
    /// Returns an error if text extraction or the record write fails.
    #[instrument(skip(self), fields(input = %self.config.input_path.display()))]
    pub fn run(self) -> Result<RunOutcome> {
        let start_time = Instant::now();

        info!("Input: {}", self.config.input_path.display());
        info!("Model: {}", self.config.model);

        if self.config.input_path.is_dir() {
            warn!(
                "'{}' is a directory; batch processing is not implemented in this version",
                self.config.input_path.display()
            );
            return Ok(RunOutcome::DirectoryUnsupported);
        }

        let file_name = self
            .config
            .input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::input(&self.config.input_path, "input path has no file name"))?;

        // Stage 1: text extraction
        info!("Stage 1/3: Converting {} to text...", file_name);
        let extract_start = Instant::now();
        let text = document::extract_text(&self.config.input_path)?;
        let extract_duration = extract_start.elapsed();

        info!(
            "✓ Extracted {} characters in {:.2}s",
            text.chars().count(),
            extract_duration.as_secs_f64()
        );

        // Stage 2: category completions, strictly in order
        info!("Stage 2/3: Running category extractions...");
        let completion_start = Instant::now();
        let extractor = FieldExtractor::new(&self.client, &self.prompts, &self.config.model);
        let mut record = CandidateRecord::new(file_name.clone());

        let mut extracted = 0usize;
        let mut empty = 0usize;
        let mut failed = 0usize;

        for &category in Category::all() {
            info!("  Extracting {}...", category);
            let outcome = extractor.extract(category, &text);
            match outcome {
                CategoryOutcome::Extracted(_) => extracted += 1,
                CategoryOutcome::Empty => empty += 1,
                CategoryOutcome::Failed(_) => failed += 1,
            }
            record.apply(category, outcome);
        }

        let completion_duration = completion_start.elapsed();
        info!(
            "✓ Categories: {} extracted, {} empty, {} failed in {:.2}s",
            extracted,
            empty,
            failed,
            completion_duration.as_secs_f64()
        );

        // Stage 3: write the record
        info!("Stage 3/3: Writing candidate record...");
        let write_start = Instant::now();
        let output_path = self.writer.write(&record)?;
        let write_duration = write_start.elapsed();

        info!("✓ Wrote {}", output_path.display());

        let duration = start_time.elapsed();
        info!(
            "✓ Pipeline completed successfully in {:.2}s",
            duration.as_secs_f64()
        );

        Ok(RunOutcome::Completed(RunStats {
            file_name,
            output_path: output_path.display().to_string(),
            text_chars: text.chars().count(),
            categories_extracted: extracted,
            categories_empty: empty,
            categories_failed: failed,
            duration,
            extract_duration,
            completion_duration,
            write_duration,
        }))
    }
}
