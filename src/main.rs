use anyhow::Context;
use clap::Parser;
use cv_extract::{Config, Pipeline, RunOutcome};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "cv-extract",
    version,
    author,
    about = "Extract structured candidate data from CV files",
    long_about = "Extract structured candidate data from CV files using an \
    OpenAI-compatible completion endpoint.\n\n\
    The tool converts a CV document (PDF, DOCX, or plain text) to text, runs \
    four deterministic extraction prompts (basic info, languages, specialties, \
    skills), and writes the combined record as JSON into a \
    structured_candidate_data directory next to the input file.\n\n\
    The API key is read from the OPEN_AI environment variable \
    (OPENAI_API_KEY as a fallback); a .env file is honored.\n\n\
    USAGE EXAMPLES:\n  \
      # Process a single CV\n  \
      cv-extract ./alice.pdf gpt-4o\n\n  \
      # Write records to a custom directory\n  \
      cv-extract ./alice.pdf gpt-4o --out ./records\n\n  \
      # Use custom prompt templates against a local endpoint\n  \
      cv-extract ./alice.pdf llama3 --templates ./prompts --base-url http://localhost:8080/v1"
)]
struct Cli {
    /// Path to a CV file (directory batch mode is not implemented)
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Model identifier passed through to the completion API (e.g. gpt-4o)
    #[arg(value_name = "MODEL")]
    model: String,

    /// Output directory for candidate records
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Directory with prompt template overrides (<category>.tera files)
    #[arg(long, value_name = "PATH")]
    templates: Option<PathBuf>,

    /// Base URL of the completion endpoint
    #[arg(long, default_value = "https://api.openai.com/v1", value_name = "URL")]
    base_url: String,

    /// HTTP timeout per completion request, in seconds
    #[arg(long, default_value_t = 120, value_name = "SECS")]
    timeout: u64,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    // Credentials may live in a .env file next to the invocation
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = Config::builder()
        .input_path(cli.input_path)
        .model(cli.model)
        .base_url(cli.base_url)
        .timeout_secs(cli.timeout);

    if let Some(out) = cli.out {
        builder = builder.output_dir(out);
    }

    if let Some(templates) = cli.templates {
        builder = builder.template_dir(templates);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let outcome = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pipeline execution failed")?;

    match outcome {
        RunOutcome::Completed(stats) => stats.print_summary(),
        RunOutcome::DirectoryUnsupported => {
            println!("Directory processing is not implemented in this version.");
            println!("Pass a single CV file instead.");
        }
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("cv_extract=info"),
        1 => EnvFilter::new("cv_extract=debug"),
        _ => EnvFilter::new("cv_extract=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
