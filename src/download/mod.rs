//! Download module: what is downloaded and how each attempt moves bytes.
//!
//! # Overview
//!
//! - [`download`] - The [`Download`] target and the size probe
//! - [`range`] - Resume decisions: what to request, how to write the answer
//! - [`transfer`] - Bounded-memory streaming of a response body to disk
//! - [`summary`] - Download results and per-attempt records
//!
//! # Example
//!
//! ```rust
//! use stubborn::download::range::{plan, reconcile, Plan, RequestIntent, WriteMode};
//! use reqwest::StatusCode;
//!
//! // 400 of 1000 bytes are on disk: resume from byte 400.
//! let Plan::Fetch { intent, .. } = plan(400, Some(1000)) else { unreachable!() };
//! assert_eq!(intent, RequestIntent::Resume { offset: 400 });
//!
//! // The server ignored the Range header and sent everything: start over.
//! assert_eq!(reconcile(intent, StatusCode::OK, None), WriteMode::Truncate);
//! ```

pub mod download;
pub mod range;
pub mod summary;
pub mod transfer;

pub use download::{Download, PROBE_TIMEOUT};
pub use range::{Plan, RequestIntent, WriteMode};
pub use summary::{AttemptRecord, Status, Summary};
pub use transfer::CHUNK_SIZE;
