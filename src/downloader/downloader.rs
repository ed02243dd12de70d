//! Core downloader implementation with the attempt loop.
//!
//! [`Downloader::download`] drives the [`RetryState`] machine: one size probe,
//! then attempts until the file is complete or the [`RetryPolicy`] gives up.
//! Each attempt re-reads the local file, asks the server for what is missing
//! and streams the answer to disk in the write mode the resume rules allow.
//!
//! # Example
//!
//! ```rust,no_run
//! use stubborn::download::Download;
//! use stubborn::downloader::DownloaderBuilder;
//!
//! # async fn example() -> Result<(), stubborn::Error> {
//! let download = Download::parse(
//!     "https://example.com/models/model.Q4_K_M.gguf",
//!     "models/model.Q4_K_M.gguf",
//! )?;
//! let summary = DownloaderBuilder::new().retries(5).build().download(&download).await?;
//! println!("{} bytes in {} attempts", summary.size(), summary.attempts().len());
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::retry::{AttemptVerdict, Completion, RetryPolicy, RetryState, Transition};
use crate::download::range::{
    is_complete, plan, reconcile, satisfied_by_range_not_satisfiable, Plan, RequestIntent,
    WriteMode,
};
use crate::download::{transfer, AttemptRecord, Download, Status, Summary};
use crate::error::{Error, Result};
use crate::http::create_http_client;
use crate::progress::{ProgressBarOpts, TransferProgress};
use crate::utils::content_range_start_header;

use reqwest::header::{HeaderMap, RANGE};
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::fmt::Debug;
use tracing::{debug, info, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use stubborn::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build();
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Gets the attempt budget and backoff schedule.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy
    }

    /// Gets the identifying user agent.
    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Gets whether a bearer credential is configured.
    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    /// Gets the extra headers.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.headers.as_ref()
    }

    /// Gets the progress bar style options.
    pub fn style_options(&self) -> &ProgressBarOpts {
        &self.config.style_options
    }

    /// Downloads `download`, resuming whatever is already on disk.
    ///
    /// Returns once the destination is complete, or with the error of the
    /// last attempt once the attempt budget is spent. Partial content is left
    /// in place in the latter case.
    pub async fn download(&self, download: &Download) -> Result<Summary> {
        let client = create_http_client(self.config.http_client_config())?;
        self.download_with_client(&client, download).await
    }

    /// Same as [`download()`], reusing an existing client.
    ///
    /// The client is expected to carry the identifying headers itself, see
    /// [`create_http_client`].
    ///
    /// [`download()`]: Downloader::download
    pub async fn download_with_client(
        &self,
        client: &ClientWithMiddleware,
        download: &Download,
    ) -> Result<Summary> {
        let policy = self.config.retry_policy;
        let progress = TransferProgress::new(self.config.style_options.clone());
        let mut summary = Summary::new(download.clone(), None);
        let mut expected: Option<u64> = None;
        let mut state = RetryState::Probing;

        loop {
            state = match state {
                RetryState::Probing => {
                    expected = download.expected_size(client).await;
                    match expected {
                        Some(size) => debug!("{} is {} bytes long", download.url, size),
                        None => debug!(
                            "Size of {} is unknown, any non-empty file will do",
                            download.url
                        ),
                    }
                    summary = Summary::new(download.clone(), expected);
                    RetryState::after_probe()
                }
                RetryState::Attempting { attempt } => {
                    let mut record = AttemptRecord::new(attempt);
                    let verdict = self
                        .attempt(client, download, expected, &progress, &mut record)
                        .await;
                    if let AttemptVerdict::Failed(ref error) = verdict {
                        record.error = Some(error.to_string());
                    }

                    let transition = policy.next(attempt, verdict);
                    if let Transition::Retry { delay, ref error, .. } = transition {
                        record.backoff = Some(delay);
                        warn!(
                            "Attempt {}/{} failed: {}. Retrying in {:.1}s...",
                            attempt,
                            policy.max_attempts(),
                            error,
                            delay.as_secs_f64()
                        );
                        if let Some(ref callback) = self.config.on_retry {
                            callback(&record);
                        }
                        summary.push_attempt(record);
                        tokio::time::sleep(delay).await;
                    } else {
                        summary.push_attempt(record);
                    }
                    RetryState::from(transition)
                }
                RetryState::Succeeded(completion) => {
                    let size = download.local_len().await?;
                    info!("Downloaded {:?} ({} bytes)", download.output, size);
                    // A failed attempt may have written the last bytes.
                    let transferred = summary.bytes_transferred() > 0;
                    let summary = summary.with_size(size);
                    return Ok(match completion {
                        Completion::Transferred => summary.with_status(Status::Success),
                        _ if transferred => summary.with_status(Status::Success),
                        Completion::AlreadyComplete => {
                            summary.skip("the file was already fully downloaded")
                        }
                        Completion::ConfirmedByServer => {
                            summary.skip("the server reported nothing left to download")
                        }
                    });
                }
                RetryState::Failed(error) => {
                    warn!("Giving up on {}: {}", download.url, error);
                    return Err(error);
                }
            };
        }
    }

    /// Runs one attempt and turns its result into a verdict.
    async fn attempt(
        &self,
        client: &ClientWithMiddleware,
        download: &Download,
        expected: Option<u64>,
        progress: &TransferProgress,
        record: &mut AttemptRecord,
    ) -> AttemptVerdict {
        let error = match self
            .fetch(client, download, expected, progress, record)
            .await
        {
            Ok(completion) => return AttemptVerdict::Complete(completion),
            Err(error) => error,
        };

        let local_len = download.local_len().await.unwrap_or(0);
        if satisfied_by_range_not_satisfiable(error.status(), local_len, expected) {
            debug!(
                "Range not satisfiable for a complete file, accepting {:?}",
                download.output
            );
            return AttemptVerdict::Complete(Completion::ConfirmedByServer);
        }
        AttemptVerdict::Failed(error)
    }

    /// Fetches whatever part of the file is missing and writes it to disk.
    async fn fetch(
        &self,
        client: &ClientWithMiddleware,
        download: &Download,
        expected: Option<u64>,
        progress: &TransferProgress,
        record: &mut AttemptRecord,
    ) -> Result<Completion> {
        let local_len = download.local_len().await?;

        let intent = match plan(local_len, expected) {
            Plan::AlreadyComplete => {
                debug!("{:?} is already complete", download.output);
                return Ok(Completion::AlreadyComplete);
            }
            Plan::Fetch {
                intent,
                discard_local,
            } => {
                if discard_local {
                    warn!(
                        "{:?} holds {} bytes, more than the server announced. Starting over",
                        download.output, local_len
                    );
                    transfer::discard(&download.output).await?;
                }
                intent
            }
        };

        // Request the file, or the part of it that is missing.
        debug!("Fetching {} ({:?})", download.url, intent);
        let mut req = client.get(download.url.as_str());
        if let Some(range) = intent.range_header() {
            req = req.header(RANGE, range);
        }
        let res = req.send().await?;

        // Check the status for errors.
        res.error_for_status_ref()?;

        let status = res.status();
        let mode = reconcile(
            intent,
            status,
            content_range_start_header(res.headers()),
        );
        if let (RequestIntent::Resume { offset }, WriteMode::Truncate) = (intent, mode) {
            warn!(
                "Server answered {} without resuming at byte {}. Rewriting {:?} from scratch",
                status, offset, download.output
            );
        }
        record.write_mode = Some(mode);

        let start = match mode {
            WriteMode::Append => intent.offset(),
            WriteMode::Truncate => 0,
        };
        let pb = progress.start(expected, start);
        let written = transfer::write_stream(res.bytes_stream(), &download.output, mode, &pb).await;
        record.bytes_written = pb.position().saturating_sub(start);
        match written {
            Ok(_) => progress.finish(pb),
            Err(e) => {
                progress.abandon(pb);
                return Err(e);
            }
        }

        let final_len = download.local_len().await?;
        if is_complete(final_len, expected) {
            return Ok(Completion::Transferred);
        }
        Err(match expected {
            Some(expected) => Error::Incomplete {
                expected,
                actual: final_len,
            },
            None => Error::EmptyBody,
        })
    }
}
