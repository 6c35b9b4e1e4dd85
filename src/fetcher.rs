//! Page retrieval over HTTP.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Browser-like identification string sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// Source of raw page bodies.
pub trait PageFetcher {
    /// Retrieves the document at `url`.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

/// Reasons a page could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{status} for url ({url})")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: StatusCode,
    },
    /// The response body could not be read.
    #[error("failed to read body of {url}: {source}")]
    Body {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => url,
        }
    }
}

/// Blocking reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given identification header and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_url_and_code() {
        let err = FetchError::Status {
            url: "https://en.wikipedia.org/wiki/Nope".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.url(), "https://en.wikipedia.org/wiki/Nope");
        assert_eq!(
            err.to_string(),
            "404 Not Found for url (https://en.wikipedia.org/wiki/Nope)"
        );
    }

    #[test]
    fn unreachable_host_is_a_request_error() {
        let fetcher =
            HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(2)).expect("client builds");
        let err = fetcher
            .fetch("http://127.0.0.1:1/wiki/Potato")
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, FetchError::Request { .. }), "{err:?}");
    }
}
