//! Stubborn downloads one large file over HTTP(S) and keeps going until it
//! has all of it.
//!
//! Interrupted transfers are resumed with `Range` requests, failed attempts
//! are retried with exponential backoff, and servers that ignore or botch a
//! resume request get their answer written over the partial file instead of
//! after it, so the result is never a corrupt concatenation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stubborn::{Download, DownloaderBuilder, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let download = Download::parse(
//!     "https://example.com/models/model.Q4_K_M.gguf",
//!     "models/model.Q4_K_M.gguf",
//! )?;
//! let downloader = DownloaderBuilder::new()
//!     .retries(5)
//!     .backoff_sec(1.5)
//!     .build();
//! let summary = downloader.download(&download).await?;
//! println!("{} bytes on disk", summary.size());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - The download target, size probe, resume decisions and streaming transfer
//! - [`downloader`] - The `Downloader`, its builder and the retry state machine
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client construction
//! - [`progress`] - Progress bar styling and display
//! - [`utils`] - Header parsing helpers

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod progress;
pub mod utils;

pub use download::{AttemptRecord, Download, Status, Summary, WriteMode};
pub use downloader::{download_with_resume, Downloader, DownloaderBuilder, RetryPolicy};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use progress::{ProgressBarOpts, TransferProgress};
pub use utils::content_length::{parse_content_length, parse_content_range_start};
