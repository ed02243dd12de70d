//! Shared utility functions.
//!
//! # Overview
//!
//! - [`content_length`] - `Content-Length` and `Content-Range` header parsing
//!
//! # Example
//!
//! ```rust
//! use stubborn::utils::{parse_content_length, parse_content_range_start};
//!
//! assert_eq!(parse_content_length("1024"), Some(1024));
//! assert_eq!(parse_content_range_start("bytes 512-1023/1024"), Some(512));
//! ```

pub mod content_length;

pub use content_length::{
    content_length_header, content_range_start_header, parse_content_length,
    parse_content_range_start,
};
