//! # site-inspect
//!
//! Submit a construction or property image to a remote analysis service and
//! turn its free-text answer into a sectioned inspection report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL field / file field
//!  │
//!  ├─ 1. Input     URL wins over file; nothing → MissingInput
//!  ├─ 2. Validate  file size cap, before any byte is sent
//!  ├─ 3. Encode    multipart │ JSON + data URI │ upload then reference
//!  ├─ 4. Send      POST /analyze (and /upload for two-phase)
//!  ├─ 5. Normalize Success(text) or Failure(kind, message)
//!  └─ 6. Classify  Structural Components · Materials · Condition ·
//!                  Code Compliance · Other Observations
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use site_inspect::{Analyzer, AnalyzerConfig, SubmissionInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::builder()
//!         .base_url("http://127.0.0.1:5000")
//!         .build()?;
//!     let analyzer = Analyzer::new(config)?;
//!
//!     let input = SubmissionInput::Url("https://example.com/deck.jpg".into());
//!     match analyzer.analyze(input).await.value {
//!         Ok(report) => println!("{report}"),
//!         Err(failure) => eprintln!("{} ({})", failure.message, failure.kind),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `site-inspect` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, SplitPolicy, TransportStrategy};
pub use error::{AnalyzerError, Failure, FailureKind};
pub use output::{AnalysisOutcome, Category, Report, ReportSection, Submission, SubmissionId};
pub use pipeline::classify::ReportClassifier;
pub use pipeline::input::{FileBlob, SubmissionInput, ValidatedInput};
pub use pipeline::transport::{HttpTransport, Transport};
