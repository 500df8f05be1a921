//! scorecheck CLI — run the accuracy gate against the workspace fixture and model.
//!
//! Exit codes: 0 when the classifier passes, 1 when it does not exceed the
//! threshold, 2 when the check could not reach a verdict.

use clap::Parser;
use scorecheck_core::{AccuracyCheck, CheckError, ConfigOverrides, Verdict};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Check that a pre-trained classifier beats the accuracy threshold on the test fixture
#[derive(Parser, Debug)]
#[command(name = "scorecheck", version, about, long_about = None)]
struct Cli {
    /// Workspace directory; relative fixture and model paths resolve against it
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file, layered above the workspace `.scorecheck/config.toml`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixture file (defaults to data/test_data.json)
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Model file (defaults to data/model.json)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            fixture_path: self.fixture.clone(),
            model_path: self.model.clone(),
        }
    }

    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// 0 on Pass, 1 on Fail, 2 when no verdict was reached.
fn exit_code_for(outcome: &anyhow::Result<Verdict>) -> ExitCode {
    match outcome {
        Ok(verdict) if verdict.is_pass() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(_) => ExitCode::from(2),
    }
}

/// Install stderr logging and, when asked, a JSON file layer.
///
/// The returned guard must be held until exit so buffered file logs flush.
fn init_tracing(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(cli.log_filter()));

    let (json_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "scorecheck.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();
    guard
}

fn run(cli: &Cli, workspace: &Path) -> anyhow::Result<Verdict> {
    let config = scorecheck_core::load_config(
        Some(workspace),
        cli.config.as_deref(),
        Some(&cli.overrides()),
    )?;
    let classifier = scorecheck_core::load_model(&config.model_path).map_err(CheckError::from)?;
    let check = AccuracyCheck::from_config(Arc::from(classifier), &config);
    Ok(check.run()?)
}

fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(&cli);

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| cli.workspace.clone());

    let outcome = run(&cli, &workspace);
    match &outcome {
        Ok(verdict) => {
            if cli.json {
                match serde_json::to_string_pretty(verdict) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Failed to encode result: {e}"),
                }
            } else if !cli.quiet {
                println!("{}", verdict.summary());
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Accuracy check could not complete");
            eprintln!("Error: {e:#}");
        }
    }
    exit_code_for(&outcome)
}
