//! Downloader module: the attempt loop, its configuration and its builder.
//!
//! - `downloader` - [`Downloader`] and the state machine driving a download
//! - `retry` - [`RetryPolicy`], [`RetryState`] and the transitions between them
//! - `builder` - [`DownloaderBuilder`]
//! - `config` - Configuration structures and callback types
//!
//! # Example
//!
//! ```rust,no_run
//! use stubborn::downloader::download_with_resume;
//!
//! # async fn example() -> Result<(), stubborn::Error> {
//! let summary = download_with_resume(
//!     "https://example.com/models/model.zip",
//!     "artifacts/model.zip",
//!     Some("hf_xxx"),
//!     5,
//!     1.5,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod retry;

pub use builder::DownloaderBuilder;
pub use config::{DownloaderConfig, RetryCallback};
pub use downloader::Downloader;
pub use retry::{RetryPolicy, RetryState};

use crate::download::{Download, Summary};
use crate::error::Result;
use std::path::PathBuf;

/// Download `url` to `output` with the given credential and retry options.
///
/// `retries` is clamped to at least 1 and `backoff_sec` to at least 0.1.
/// No progress bar is drawn.
pub async fn download_with_resume(
    url: &str,
    output: impl Into<PathBuf>,
    token: Option<&str>,
    retries: i64,
    backoff_sec: f64,
) -> Result<Summary> {
    let download = Download::parse(url, output)?;
    let mut builder =
        DownloaderBuilder::hidden().retry_policy(RetryPolicy::from_options(retries, backoff_sec));
    if let Some(token) = token {
        builder = builder.token(token);
    }
    builder.build().download(&download).await
}
