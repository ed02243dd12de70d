//! Progress bar styling.
//!
//! A transfer bar needs two looks: a regular bar when the server announced
//! the artifact's size, and a spinner when it did not. [`ProgressBarOpts`]
//! holds both templates along with the visibility settings.
//!
//! # Examples
//!
//! ```rust
//! use stubborn::progress::ProgressBarOpts;
//!
//! // Default: pip-like bar, cleared once the transfer is over.
//! let opts = ProgressBarOpts::default();
//!
//! // Custom bar.
//! let opts = ProgressBarOpts::new(
//!     Some("[{bar:40.cyan/blue}] {bytes}/{total_bytes}".to_string()),
//!     Some(ProgressBarOpts::CHARS_FINE.to_string()),
//!     true,
//!     false,
//! );
//!
//! // No output at all.
//! let opts = ProgressBarOpts::hidden();
//! assert!(!opts.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Define the options for the transfer progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Template used when the total size is known.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    /// Template used when the total size is unknown.
    spinner_template: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: Some(Self::TEMPLATE_PIP.into()),
            progress_chars: Some(Self::CHARS_LINE.into()),
            spinner_template: Some(Self::TEMPLATE_SPINNER.into()),
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Template which looks like the Python package installer pip.
    ///
    /// `━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 211.23 KiB/211.23 KiB 1008.31 KiB/s eta 0s`
    pub const TEMPLATE_PIP: &'static str =
        "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} eta {eta:.blue}";
    /// Spinner shown while the total size is unknown.
    ///
    /// `⠋ 12.50 MiB 3.10 MiB/s`
    pub const TEMPLATE_SPINNER: &'static str =
        "{spinner:.green} {bytes:>11.green} {bytes_per_sec:>13.red}";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾╴─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`] with the default spinner.
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            spinner_template: Some(Self::TEMPLATE_SPINNER.into()),
            enabled,
            clear,
        }
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bar.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }

    /// Replace the template used while the total size is unknown.
    pub fn set_spinner_template(&mut self, template: Option<String>) {
        self.spinner_template = template;
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Whether a bar will be drawn at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the bar is cleared once the transfer is over.
    pub fn clears(&self) -> bool {
        self.clear
    }

    /// Create a [`ProgressStyle`] for a transfer of known length.
    ///
    /// An invalid template falls back to indicatif's default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = styled(ProgressStyle::default_bar(), self.template.as_deref());
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// Create a [`ProgressStyle`] for a transfer of unknown length.
    pub fn to_spinner_style(&self) -> ProgressStyle {
        styled(
            ProgressStyle::default_spinner(),
            self.spinner_template.as_deref(),
        )
    }

    /// Create a [`ProgressBar`] for a transfer of `len` bytes, or of unknown
    /// length when `len` is `None`.
    pub fn to_progress_bar(&self, len: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        match len {
            Some(len) => ProgressBar::new(len).with_style(self.to_progress_style()),
            None => ProgressBar::no_length().with_style(self.to_spinner_style()),
        }
    }
}

fn styled(base: ProgressStyle, template: Option<&str>) -> ProgressStyle {
    match template {
        Some(template) => match base.clone().template(template) {
            Ok(style) => style,
            Err(e) => {
                warn!("Ignoring invalid progress template {:?}: {}", template, e);
                base
            }
        },
        None => base,
    }
}
