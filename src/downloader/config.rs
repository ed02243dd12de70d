//! Configuration structures and defaults for the downloader.
//!
//! Everything a download depends on, including the identifying user agent
//! and the bearer credential, is part of [`DownloaderConfig`]. Nothing is
//! read from process-wide state.
//!
//! # Example
//!
//! ```rust
//! use stubborn::downloader::RetryCallback;
//! use stubborn::download::AttemptRecord;
//!
//! let callback: RetryCallback = Box::new(|record: &AttemptRecord| {
//!     eprintln!(
//!         "attempt {} failed: {}",
//!         record.attempt,
//!         record.error.as_deref().unwrap_or("unknown error")
//!     );
//! });
//! ```

use super::retry::RetryPolicy;
use crate::download::AttemptRecord;
use crate::http::{HttpClientConfig, DEFAULT_READ_TIMEOUT, DEFAULT_USER_AGENT};
use crate::progress::ProgressBarOpts;

use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked after a failed attempt, before the backoff pause.
pub type RetryCallback = Box<dyn Fn(&AttemptRecord) + Send + Sync>;

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Attempt budget and backoff schedule.
    pub retry_policy: RetryPolicy,
    /// Identifying client header sent with every request.
    pub user_agent: String,
    /// Optional bearer credential.
    pub token: Option<String>,
    /// Extra HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Read timeout for every response.
    pub read_timeout: Duration,
    /// Progress bar style options.
    pub style_options: ProgressBarOpts,
    /// Callback for failed attempts that are about to be retried.
    pub on_retry: Option<Arc<RetryCallback>>,
}

impl DownloaderConfig {
    /// HTTP client settings derived from this configuration.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            token: self.token.clone(),
            proxy: self.proxy.clone(),
            headers: self.headers.clone(),
            read_timeout: self.read_timeout,
        }
    }
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("retry_policy", &self.retry_policy)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .field("proxy", &self.proxy)
            .field("read_timeout", &self.read_timeout)
            .field("style_options", &self.style_options)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            headers: None,
            proxy: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            style_options: ProgressBarOpts::default(),
            on_retry: None,
        }
    }
}
