//! Progress display for a single download.
//!
//! Each attempt gets its own bar. A resumed attempt starts its bar at the
//! offset it resumes from, so the bar always shows the size of the file on
//! disk rather than the bytes of the current connection.
//!
//! # Example
//!
//! ```rust
//! use stubborn::progress::{ProgressBarOpts, TransferProgress};
//!
//! let progress = TransferProgress::new(ProgressBarOpts::hidden());
//! let pb = progress.start(Some(1024), 512);
//! pb.inc(512);
//! progress.finish(pb);
//! ```

use crate::progress::ProgressBarOpts;
use indicatif::ProgressBar;

/// Creates and retires the progress bars of a download's attempts.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    /// Style options for the bars.
    opts: ProgressBarOpts,
}

impl TransferProgress {
    /// Create a new progress display.
    pub fn new(opts: ProgressBarOpts) -> Self {
        Self { opts }
    }

    /// Create the bar for one attempt.
    ///
    /// # Arguments
    /// * `total` - Expected size of the artifact, if known
    /// * `position` - Bytes already on disk that the attempt builds upon
    pub fn start(&self, total: Option<u64>, position: u64) -> ProgressBar {
        self.opts.to_progress_bar(total).with_position(position)
    }

    /// Finish a bar, clearing or keeping it based on configuration.
    pub fn finish(&self, pb: ProgressBar) {
        if self.opts.clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
    }

    /// Abandon a bar after a failed attempt, leaving it at its last position.
    pub fn abandon(&self, pb: ProgressBar) {
        if self.opts.clear {
            pb.finish_and_clear();
        } else {
            pb.abandon();
        }
    }
}
