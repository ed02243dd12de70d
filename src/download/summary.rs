//! Download summary functionality.
//!
//! A successful download returns a [`Summary`]: the final size on disk, the
//! size the server announced, and one [`AttemptRecord`] per connection
//! attempt, failed ones included.
//!
//! # Example
//!
//! ```rust
//! use stubborn::download::{Download, Status, Summary};
//! use std::convert::TryFrom;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let download = Download::try_from("https://example.com/file.zip")?;
//! let summary = Summary::new(download, Some(2048)).with_status(Status::Success);
//!
//! match summary.status() {
//!     Status::Success => println!("Downloaded {} bytes", summary.size()),
//!     Status::Skipped(reason) => println!("Nothing to do: {}", reason),
//!     Status::NotStarted => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

use super::download::Download;
use super::range::WriteMode;
use std::time::Duration;

/// Download status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Download not yet started
    NotStarted,
    /// The file already had the expected content; no body bytes were transferred.
    Skipped(String),
    /// Bytes were transferred and the file is complete.
    Success,
}

/// What happened during a single connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Write mode chosen for the response body, if a body was received.
    pub write_mode: Option<WriteMode>,
    /// Body bytes written to disk during this attempt.
    pub bytes_written: u64,
    /// Failure of the attempt, if it failed.
    pub error: Option<String>,
    /// Pause scheduled before the next attempt.
    pub backoff: Option<Duration>,
}

impl AttemptRecord {
    /// Create an empty record for attempt number `attempt`.
    pub fn new(attempt: u32) -> Self {
        Self {
            attempt,
            write_mode: None,
            bytes_written: 0,
            error: None,
            backoff: None,
        }
    }

    /// Whether this attempt failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Represents a [`Download`] summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Downloaded item.
    download: Download,
    /// Total size announced by the server, if it announced one.
    expected_size: Option<u64>,
    /// Size of the destination once finished.
    size: u64,
    /// Status.
    status: Status,
    /// One record per attempt, in order.
    attempts: Vec<AttemptRecord>,
}

impl Summary {
    /// Create a new [`Download`] [`Summary`].
    pub fn new(download: Download, expected_size: Option<u64>) -> Self {
        Self {
            download,
            expected_size,
            size: 0,
            status: Status::NotStarted,
            attempts: Vec::new(),
        }
    }

    /// Attach a status to a [`Download`] [`Summary`].
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Record the final size of the destination.
    pub fn with_size(self, size: u64) -> Self {
        Self { size, ..self }
    }

    /// Mark the summary as skipped with a message.
    pub fn skip(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Skipped(format!("{}", msg)),
            ..self
        }
    }

    /// Append the record of a finished attempt.
    pub fn push_attempt(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    /// Get the summary's final size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the size announced by the server.
    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    /// Get a reference to the summary's download.
    pub fn download(&self) -> &Download {
        &self.download
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Get the attempt records.
    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    /// Total body bytes written over all attempts.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.attempts.iter().map(|a| a.bytes_written).sum()
    }
}
