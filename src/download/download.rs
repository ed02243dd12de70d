//! Transfer target and size probing.
//!
//! A [`Download`] pairs the URL of a remote artifact with the path it is
//! written to. It also knows how to ask the server for the artifact's total
//! size, which the downloader uses as its success oracle.
//!
//! # Examples
//!
//! ```rust
//! use stubborn::download::Download;
//! use std::convert::TryFrom;
//! use std::path::Path;
//!
//! // Destination derived from the URL.
//! let download = Download::try_from("https://example.com/models/llama-7b.Q4_K_M.gguf")?;
//! assert_eq!(download.output, Path::new("llama-7b.Q4_K_M.gguf"));
//!
//! // Explicit destination.
//! let url = reqwest::Url::parse("https://example.com/resolve/main/model.zip")?;
//! let download = Download::new(&url, "artifacts/model.zip");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::Error;
use crate::utils::content_length_header;

use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::convert::TryFrom;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Upper bound on how long the size probe may take.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Represents a file to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// URL of the file to download.
    pub url: Url,
    /// Path the file is written to.
    pub output: PathBuf,
}

impl Download {
    /// Creates a new [`Download`].
    ///
    /// When using the [`Download::try_from`] method, the destination is the
    /// last path segment of the URL, relative to the working directory.
    pub fn new(url: &Url, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.clone(),
            output: output.into(),
        }
    }

    /// Parse `url` and pair it with an explicit destination.
    pub fn parse(url: &str, output: impl Into<PathBuf>) -> Result<Self, Error> {
        let url = parse_url(url)?;
        Ok(Self::new(&url, output))
    }

    /// Current byte length of the destination, `0` when it doesn't exist yet.
    pub async fn local_len(&self) -> io::Result<u64> {
        local_len(&self.output).await
    }

    /// Ask the server for the total size of the artifact.
    ///
    /// Issues a `HEAD` request bounded by [`PROBE_TIMEOUT`]. Any failure
    /// (network error, timeout, error status, missing or malformed
    /// `Content-Length`) yields `None`: a failed probe only means the size is
    /// unknown, never that the download cannot proceed.
    pub async fn expected_size(&self, client: &ClientWithMiddleware) -> Option<u64> {
        let res = match client
            .head(self.url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                debug!("Size probe for {} failed: {}", self.url, e);
                return None;
            }
        };

        if !res.status().is_success() {
            debug!(
                "Size probe for {} answered with {}",
                self.url,
                res.status()
            );
            return None;
        }

        let size = content_length_header(res.headers());
        debug!("Size probe for {} reported {:?}", self.url, size);
        size
    }
}

/// Byte length of the file at `path`, `0` when it doesn't exist.
pub(crate) async fn local_len(path: &Path) -> io::Result<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

fn parse_url(value: &str) -> Result<Url, Error> {
    let url = Url::parse(value)
        .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "The url \"{}\" uses the unsupported scheme \"{}\"",
            value, scheme
        ))),
    }
}

impl TryFrom<&Url> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        value
            .path_segments()
            .ok_or_else(|| {
                Error::InvalidUrl(format!(
                    "The url \"{}\" does not contain a valid path",
                    value
                ))
            })?
            .next_back()
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                form_urlencoded::parse(segment.as_bytes())
                    .map(|(key, val)| [key, val].concat())
                    .collect::<String>()
            })
            .map(|filename| Download::new(value, filename))
            .ok_or_else(|| {
                Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", value))
            })
    }
}

impl TryFrom<&str> for Download {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse_url(value).and_then(|u| Download::try_from(&u))
    }
}
