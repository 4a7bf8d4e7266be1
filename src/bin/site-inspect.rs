//! CLI binary for site-inspect.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, submits one image and prints the classified report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use site_inspect::pipeline::input::resolve_from_args;
use site_inspect::prompts::INSPECTOR_SYSTEM_PROMPT;
use site_inspect::{Analyzer, AnalyzerConfig, Report, SplitPolicy, TransportStrategy};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze an image by URL
  site-inspect --url https://example.com/deck.jpg

  # Upload a local photo
  site-inspect --file ./photos/foundation.jpg

  # Inline the photo as a data URI in a JSON request
  site-inspect --file roof.png --strategy json-with-data-uri

  # Upload first, then analyze by file id
  site-inspect --file wall.jpg --strategy two-phase-upload-then-reference

  # One section entry per line instead of per paragraph
  site-inspect --url https://example.com/a.jpg --split lines

  # Check the service is reachable
  site-inspect --probe

  # JSON output for scripting
  site-inspect --url https://example.com/a.jpg --json

ENVIRONMENT VARIABLES:
  SITE_INSPECT_BASE_URL        Analysis service base URL
  SITE_INSPECT_MAX_FILE_BYTES  Client-side upload size cap
  SITE_INSPECT_STRATEGY        multipart-form | json-with-data-uri | two-phase-upload-then-reference
  SITE_INSPECT_SPLIT           paragraphs | lines
  SITE_INSPECT_TIMEOUT_MS      Whole-request timeout (unset = none)
  RUST_LOG                     Override log filter
"#;

/// Analyze construction and property images with a remote vision service.
#[derive(Parser, Debug)]
#[command(
    name = "site-inspect",
    version,
    about = "Analyze construction and property images and print a sectioned report",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image URL. Takes precedence over --file.
    #[arg(short, long)]
    url: Option<String>,

    /// Local image file.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Only check that the service answers on /test.
    #[arg(long)]
    probe: bool,

    /// Analysis service base URL.
    #[arg(long, env = "SITE_INSPECT_BASE_URL", default_value = site_inspect::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Wire encoding for the submission.
    #[arg(long, env = "SITE_INSPECT_STRATEGY", value_enum, default_value = "multipart-form")]
    strategy: StrategyArg,

    /// How the result text is split before classification.
    #[arg(long, env = "SITE_INSPECT_SPLIT", value_enum, default_value = "paragraphs")]
    split: SplitArg,

    /// Largest file accepted, in bytes.
    #[arg(long, env = "SITE_INSPECT_MAX_FILE_BYTES", default_value_t = site_inspect::config::DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,

    /// Whole-request timeout in milliseconds.
    #[arg(long, env = "SITE_INSPECT_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Path to a text file replacing the leading analysis prompt (JSON strategy).
    #[arg(long)]
    prompt: Option<PathBuf>,

    /// Prepend the inspector system message to JSON envelopes.
    #[arg(long)]
    inspector_persona: bool,

    /// Remove blank paragraphs from the report before printing.
    #[arg(long)]
    drop_blank: bool,

    /// Print the report (or failure) as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the report and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    MultipartForm,
    JsonWithDataUri,
    TwoPhaseUploadThenReference,
}

impl From<StrategyArg> for TransportStrategy {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::MultipartForm => TransportStrategy::MultipartForm,
            StrategyArg::JsonWithDataUri => TransportStrategy::JsonWithDataUri,
            StrategyArg::TwoPhaseUploadThenReference => {
                TransportStrategy::TwoPhaseUploadThenReference
            }
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SplitArg {
    Paragraphs,
    Lines,
}

impl From<SplitArg> for SplitPolicy {
    fn from(v: SplitArg) -> Self {
        match v {
            SplitArg::Paragraphs => SplitPolicy::Paragraphs,
            SplitArg::Lines => SplitPolicy::Lines,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;
    let analyzer = Analyzer::new(config).context("Failed to initialise analyzer")?;

    // ── Probe mode ───────────────────────────────────────────────────────
    if cli.probe {
        let message = analyzer.probe().await.context("Service probe failed")?;
        if cli.json {
            println!("{}", serde_json::json!({ "message": message }));
        } else {
            println!("{} {}", green("✔"), message);
        }
        return Ok(());
    }

    let input = resolve_from_args(cli.url.clone(), cli.file.clone())
        .await
        .context("Failed to load input")?;

    // ── Run submission ───────────────────────────────────────────────────
    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Analyzing {}…", input.kind()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let submission = analyzer.analyze(input).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    match submission.value {
        Ok(report) => {
            let report = if cli.drop_blank {
                report.without_blank_paragraphs()
            } else {
                report
            };
            print_report(&report, cli.json)?;
            if !cli.quiet && !cli.json {
                let paragraphs = report.paragraphs().count();
                eprintln!(
                    "{} {} sections, {} paragraphs",
                    green("✔"),
                    bold(&report.sections.len().to_string()),
                    dim(&paragraphs.to_string()),
                );
            }
            Ok(())
        }
        Err(failure) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&failure).context("Failed to serialise failure")?
                );
            } else {
                eprintln!("{} {}", red("✘"), failure.message);
            }
            Err(anyhow::Error::new(failure).context(format!("Submission {} failed", submission.id)))
        }
    }
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        writeln!(handle, "{out}").context("Failed to write to stdout")?;
    } else if report.is_empty() {
        writeln!(handle, "{}", dim("(empty report)")).context("Failed to write to stdout")?;
    } else {
        write!(handle, "{report}").context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Map CLI args to `AnalyzerConfig`.
async fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .base_url(&cli.base_url)
        .strategy(cli.strategy.into())
        .split_policy(cli.split.into())
        .max_file_bytes(cli.max_file_bytes);

    if let Some(ms) = cli.timeout_ms {
        builder = builder.request_timeout_ms(ms);
    }
    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt.trim());
    }
    if cli.inspector_persona {
        builder = builder.system_prompt(INSPECTOR_SYSTEM_PROMPT);
    }

    builder.build().context("Invalid configuration")
}
