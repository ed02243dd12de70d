//! HTTP client setup and middleware configuration.
//!
//! The client carries the headers every request must send (the identifying
//! user agent and, when configured, a bearer credential) as default headers,
//! so neither the size probe nor the transfer attempts have to remember them.
//! Requests are traced through `reqwest-tracing`.
//!
//! Retries are not part of the client. The downloader drives
//! its own attempt loop and has to look at the file on disk between attempts.
//!
//! # Example
//!
//! ```rust
//! use stubborn::http::{create_http_client, HttpClientConfig};
//!
//! # fn example() -> Result<(), stubborn::Error> {
//! let config = HttpClientConfig {
//!     token: Some("hf_secret".into()),
//!     ..HttpClientConfig::default()
//! };
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT},
    Proxy,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("stubborn/", env!("CARGO_PKG_VERSION"));

/// Longest silence tolerated while waiting for the next bytes of a response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for HTTP client setup.
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Identifying client header sent with every request.
    pub user_agent: String,
    /// Optional bearer credential, sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Extra headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Read timeout applied to every response.
    pub read_timeout: Duration,
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("proxy", &self.proxy)
            .field("headers", &self.headers)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            proxy: None,
            headers: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl HttpClientConfig {
    /// Assemble the headers sent with every request.
    ///
    /// Extra headers come first so that the user agent and the credential
    /// always win over a conflicting entry.
    pub fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = self.headers.clone().unwrap_or_default();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// The client is set up with:
/// - Tracing middleware for request/response logging
/// - The identifying user agent and optional bearer credential
/// - A read timeout, so a stalled connection surfaces as a retryable error
/// - Optional proxy support
pub fn create_http_client(config: HttpClientConfig) -> Result<ClientWithMiddleware> {
    let headers = config.default_headers()?;

    let mut inner_client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .read_timeout(config.read_timeout);

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}
