//! HTTP module containing HTTP client functionality.
//!
//! - [`client`] - HTTP client creation, default headers and middleware
//!
//! # Example
//!
//! ```rust
//! use stubborn::http::{create_http_client, HttpClientConfig};
//!
//! # fn example() -> Result<(), stubborn::Error> {
//! let client = create_http_client(HttpClientConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_READ_TIMEOUT, DEFAULT_USER_AGENT};
