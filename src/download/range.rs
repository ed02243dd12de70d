//! Resume decisions.
//!
//! Everything that decides whether bytes on disk are kept, extended or thrown
//! away lives here, so the resume-safety rule can be read in one place:
//! local bytes are only ever extended when the server proves, with a
//! `206 Partial Content` whose range starts exactly at the end of the local
//! file, that it is sending the continuation. Any other answer overwrites.
//!
//! The decision happens in two steps. [`plan`] looks at the local file before
//! a request is made, [`reconcile`] looks at the response headers once they
//! arrive and yields the [`WriteMode`] the transfer must use.

use reqwest::StatusCode;

/// What an attempt asks the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestIntent {
    /// The whole resource.
    Fresh,
    /// Only the bytes from `offset` onwards.
    Resume {
        /// First byte wanted, equal to the current local length.
        offset: u64,
    },
}

impl RequestIntent {
    /// Value of the `Range` header to send, if any.
    pub fn range_header(&self) -> Option<String> {
        match self {
            RequestIntent::Fresh => None,
            RequestIntent::Resume { offset } => Some(format!("bytes={}-", offset)),
        }
    }

    /// Offset the local file is expected to continue from.
    pub fn offset(&self) -> u64 {
        match self {
            RequestIntent::Fresh => 0,
            RequestIntent::Resume { offset } => *offset,
        }
    }
}

/// Outcome of inspecting the local file before an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// The local file already has the expected size. No transfer needed.
    AlreadyComplete,
    /// A request must be made.
    Fetch {
        /// What to ask for.
        intent: RequestIntent,
        /// The local file is larger than the remote resource and must be
        /// deleted before the request.
        discard_local: bool,
    },
}

/// How the response body is written to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Start the file over.
    Truncate,
    /// Continue at the current end of the file.
    Append,
}

/// Decide what to request given the local length and the expected size.
///
/// # Example
///
/// ```rust
/// use stubborn::download::range::{plan, Plan, RequestIntent};
///
/// assert_eq!(plan(100, Some(100)), Plan::AlreadyComplete);
/// assert_eq!(
///     plan(40, Some(100)),
///     Plan::Fetch { intent: RequestIntent::Resume { offset: 40 }, discard_local: false }
/// );
/// ```
pub fn plan(local_len: u64, expected: Option<u64>) -> Plan {
    match expected {
        Some(expected) if local_len == expected => Plan::AlreadyComplete,
        Some(expected) if local_len > expected => Plan::Fetch {
            intent: RequestIntent::Fresh,
            discard_local: true,
        },
        _ if local_len > 0 => Plan::Fetch {
            intent: RequestIntent::Resume { offset: local_len },
            discard_local: false,
        },
        _ => Plan::Fetch {
            intent: RequestIntent::Fresh,
            discard_local: false,
        },
    }
}

/// Choose the write mode once the response headers are known.
///
/// Appending is only allowed for a resume request answered with
/// `206 Partial Content` whose `Content-Range` starts at the requested
/// offset. A server that ignored the `Range` header, answered with a range
/// starting elsewhere, or omitted the `Content-Range` gets its body written
/// over the local file instead of after it.
pub fn reconcile(
    intent: RequestIntent,
    status: StatusCode,
    content_range_start: Option<u64>,
) -> WriteMode {
    match intent {
        RequestIntent::Resume { offset }
            if status == StatusCode::PARTIAL_CONTENT && content_range_start == Some(offset) =>
        {
            WriteMode::Append
        }
        _ => WriteMode::Truncate,
    }
}

/// Completion policy.
///
/// With a known size, the file must match it exactly. Without one, any
/// non-empty file counts as complete.
pub fn is_complete(final_len: u64, expected: Option<u64>) -> bool {
    match expected {
        Some(expected) => final_len == expected,
        None => final_len > 0,
    }
}

/// Whether a failed request actually confirms that the download is done.
///
/// A `416 Range Not Satisfiable` answer to a resume request means the
/// requested offset lies at or past the end of the resource. When the local
/// file already has the announced size, that is a success signal.
pub fn satisfied_by_range_not_satisfiable(
    status: Option<StatusCode>,
    local_len: u64,
    expected: Option<u64>,
) -> bool {
    status == Some(StatusCode::RANGE_NOT_SATISFIABLE) && expected == Some(local_len)
}
