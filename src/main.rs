//! CLI entry point.

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use stubborn::{Download, DownloaderBuilder, ProgressBarOpts, RetryPolicy, Status};
use tracing::{debug, info};

/// Reliable downloader for large artifacts (.zip, .gguf, ...).
///
/// Resumes partially downloaded files with HTTP Range requests and retries
/// failed attempts with exponential backoff.
#[derive(Parser)]
#[command(name = "stubborn")]
#[command(author, version, about)]
struct Args {
    /// Direct download URL
    url: String,

    /// Output file path
    out: PathBuf,

    /// Optional bearer token
    #[arg(long, env = "STUBBORN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Maximum attempts (values below 1 count as 1)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    retries: i64,

    /// Initial backoff in seconds, doubled after every failed attempt (minimum 0.1)
    #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
    backoff_sec: f64,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Log level used when `RUST_LOG` is not set.
    fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_options(self.retries, self.backoff_sec)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let download = Download::parse(&args.url, args.out.clone())?;
    let policy = args.retry_policy();
    debug!(?policy, token = args.token.is_some(), "Starting download");

    let mut builder = DownloaderBuilder::new().retry_policy(policy);
    if args.no_progress || args.quiet {
        builder = builder.style_options(ProgressBarOpts::hidden());
    }
    if let Some(token) = args.token {
        builder = builder.token(token);
    }

    let summary = builder.build().download(&download).await?;
    if let Status::Skipped(reason) = summary.status() {
        info!("Nothing transferred: {}", reason);
    }
    println!("Downloaded successfully: {}", args.out.display());
    Ok(())
}
