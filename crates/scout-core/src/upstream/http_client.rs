use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::upstream::EndpointError;

/// Maximum number of body characters kept in [`EndpointError::HttpError`].
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Connection pool and transport settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
    /// Upper bound on idle pooled connections per host.
    pub pool_max_idle_per_host: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 16,
            user_agent: concat!("scout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Thin JSON-over-HTTP POST client shared by probes and live requests.
///
/// Each call gets its own deadline. The whole exchange (connect, send, body read) runs inside
/// [`tokio::time::timeout`], so hitting the deadline drops the request future and aborts the
/// underlying connection work. The client never retries on its own.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, EndpointError> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self, EndpointError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                EndpointError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Sanitizes network errors so logs and errors do not echo credentials embedded in URLs.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "unexpected redirect".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Sends a JSON body via HTTP POST and returns the raw 2xx response body.
    ///
    /// # Errors
    ///
    /// - [`EndpointError::Timeout`] if the exchange did not finish within `timeout`
    /// - [`EndpointError::HttpError`] for non-success HTTP status codes
    /// - [`EndpointError::ConnectionFailed`] for network-related failures
    pub async fn send_request(&self, url: &str, body: Bytes, timeout: Duration) -> Result<Bytes, EndpointError> {
        match tokio::time::timeout(timeout, self.exchange(url, body)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::trace!(timeout_ms = timeout.as_millis() as u64, "http request deadline reached");
                Err(EndpointError::Timeout)
            }
        }
    }

    async fn exchange(&self, url: &str, body: Bytes) -> Result<Bytes, EndpointError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Self::map_network_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return response.bytes().await.map_err(|e| Self::map_network_error(&e));
        }

        let raw_text = response.text().await.unwrap_or_default();
        let sanitized_text = if raw_text.chars().count() > MAX_ERROR_BODY_CHARS {
            let truncated: String = raw_text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            format!("{truncated}... (truncated)")
        } else {
            raw_text
        };

        tracing::trace!(status = status.as_u16(), "http request failed");
        Err(EndpointError::HttpError(status.as_u16(), sanitized_text))
    }

    fn map_network_error(error: &reqwest::Error) -> EndpointError {
        if error.is_timeout() {
            EndpointError::Timeout
        } else {
            EndpointError::ConnectionFailed(Self::sanitize_network_error(error))
        }
    }
}
