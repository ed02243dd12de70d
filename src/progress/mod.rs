//! Progress bar functionality.
//!
//! - `style` - Progress bar templates and visibility options
//! - `display` - Per-attempt progress bars for a download
//!
//! # Example
//!
//! ```rust
//! use stubborn::downloader::DownloaderBuilder;
//! use stubborn::progress::ProgressBarOpts;
//!
//! let downloader = DownloaderBuilder::new()
//!     .style_options(ProgressBarOpts::hidden())
//!     .build();
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::TransferProgress;
pub use style::ProgressBarOpts;
