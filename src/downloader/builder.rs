//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use stubborn::downloader::DownloaderBuilder;
//!
//! let downloader = DownloaderBuilder::new()
//!     .retries(8)
//!     .backoff_sec(2.0)
//!     .token("hf_xxx")
//!     .build();
//! assert_eq!(downloader.retry_policy().max_attempts(), 8);
//! ```
//!
//! ```rust
//! use stubborn::downloader::DownloaderBuilder;
//!
//! // No progress bar, and a note on stderr for every failed attempt.
//! let downloader = DownloaderBuilder::hidden()
//!     .on_retry(|record| eprintln!("attempt {} failed", record.attempt))
//!     .build();
//! ```

use super::{config::DownloaderConfig, downloader::Downloader, retry::RetryPolicy};
use crate::download::AttemptRecord;
use crate::progress::ProgressBarOpts;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::{sync::Arc, time::Duration};

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main()  {
/// use stubborn::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().retries(5).backoff_sec(1.5).build();
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Convenience function to hide the progress bar.
    pub fn hidden() -> Self {
        DownloaderBuilder::default().style_options(ProgressBarOpts::hidden())
    }

    /// Set the maximum number of attempts. Values below 1 count as 1.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retry_policy = RetryPolicy::new(retries, self.config.retry_policy.backoff());
        self
    }

    /// Set the pause after the first failed attempt. It doubles after every
    /// further failure. Values below 100 ms count as 100 ms.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_policy =
            RetryPolicy::new(self.config.retry_policy.max_attempts(), backoff);
        self
    }

    /// Same as [`backoff()`] with a value in seconds. Values below 0.1 count as 0.1.
    ///
    /// [`backoff()`]: DownloaderBuilder::backoff
    pub fn backoff_sec(self, backoff_sec: f64) -> Self {
        let policy = RetryPolicy::from_options(0, backoff_sec);
        self.backoff(policy.backoff())
    }

    /// Replace the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    /// Set the bearer credential sent as `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Set the identifying user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the read timeout applied to every response.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the progress bar style options.
    pub fn style_options(mut self, style_options: ProgressBarOpts) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Set callback for failed attempts.
    ///
    /// The callback runs after an attempt failed and before the pause that
    /// precedes the next one. It is not called for the last attempt: that
    /// failure is returned as an error instead.
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AttemptRecord) + Send + Sync + 'static,
    {
        self.config.on_retry = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add extra http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one. The user agent and the credential are set
    /// through their own methods and take precedence.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add an extra http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Downloader {
        Downloader::new(self.config)
    }
}
