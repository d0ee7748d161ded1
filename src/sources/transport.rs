//! Suggest transport.
//!
//! Provides:
//! - [`SuggestTransport`]: the fetch seam used by the engine.
//! - [`HttpSuggestTransport`]: a `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::suggest::response::FetchResponse;

const SUGGEST_USER_AGENT: &str = concat!("omnisuggest/", env!("CARGO_PKG_VERSION"));

/// Fetches raw suggest responses.
///
/// Failures are reported in the returned [`FetchResponse`] rather than as
/// errors; the engine treats any failure as "no suggestions" for the round.
#[async_trait]
pub trait SuggestTransport: Send + Sync {
    async fn fetch(&self, url: Url) -> FetchResponse;
}

/// HTTP transport backed by `reqwest`.
pub struct HttpSuggestTransport {
    client: Client,
}

impl HttpSuggestTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for HttpSuggestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

#[async_trait]
impl SuggestTransport for HttpSuggestTransport {
    async fn fetch(&self, url: Url) -> FetchResponse {
        let response = match self
            .client
            .get(url.clone())
            .header("User-Agent", SUGGEST_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, "Suggest fetch failed: {}", e);
                return FetchResponse::failed();
            }
        };

        let status = response.status().as_u16();
        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        match response.bytes().await {
            Ok(body) => FetchResponse {
                success: true,
                status,
                body: body.to_vec(),
                charset,
            },
            Err(e) => {
                debug!(%url, "Failed to read suggest body: {}", e);
                FetchResponse::failed()
            }
        }
    }
}

/// Extract the `charset` parameter from a `Content-Type` header value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}
