//! Error handling for stubborn.
//!
//! Every failure a download can run into is a variant of [`Error`]. The
//! variants also carry the retry taxonomy: [`Error::is_retryable`] tells the
//! retry controller whether another attempt may help, and [`Error::status`]
//! exposes the HTTP status behind a failed request, if there was one.

use reqwest::{header::InvalidHeaderValue, StatusCode};
use std::io;
use thiserror::Error;

/// Errors that can happen when downloading with stubborn.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Reserved for failures that don't fit into other categories.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    ///
    /// Returned when a URL cannot be parsed or is missing the parts a
    /// download needs, such as a filename.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A configured header (user agent or credential) is not a valid header value.
    #[error("Invalid header value")]
    InvalidHeader {
        #[from]
        source: InvalidHeaderValue,
    },

    /// I/O Error.
    ///
    /// Wraps the errors raised while creating, extending, inspecting or
    /// removing the destination file.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    ///
    /// Covers connection failures, timeouts, body read errors and HTTP error
    /// statuses reported by `error_for_status`.
    #[error("Reqwest error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised while a request travelled through the client middleware.
    #[error("Request error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The transfer ended but the file on disk does not have the expected size.
    #[error("download incomplete: {actual} bytes on disk, expected {expected}")]
    Incomplete {
        /// Size announced by the server.
        expected: u64,
        /// Size found on disk after the transfer.
        actual: u64,
    },

    /// The transfer ended with an empty file and the server never announced a size.
    #[error("download incomplete: no bytes received")]
    EmptyBody,

    /// Every attempt failed. Carries the error of the last one.
    #[error("download failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts that were made.
        attempts: u32,
        /// Failure of the last attempt.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether a new attempt could succeed where this one failed.
    ///
    /// Malformed input never gets better by retrying. Everything that comes
    /// from the network, the disk or an unfinished transfer might.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Internal(_)
            | Error::InvalidUrl(_)
            | Error::InvalidHeader { .. }
            | Error::Exhausted { .. } => false,
            Error::IOError { .. }
            | Error::Reqwest { .. }
            | Error::Middleware { .. }
            | Error::Incomplete { .. }
            | Error::EmptyBody => true,
        }
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Reqwest { source } => source.status(),
            Error::Middleware {
                source: reqwest_middleware::Error::Reqwest(source),
            } => source.status(),
            Error::Exhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Result type alias for operations that can fail with a stubborn error.
pub type Result<T> = std::result::Result<T, Error>;
