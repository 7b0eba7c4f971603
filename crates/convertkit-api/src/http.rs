//! HTTP transport layer.
//!
//! The request engine depends only on the [`Transport`] trait; tests and
//! embedders may substitute their own implementation. [`HttpTransport`] is
//! the default, a thin wrapper around a shared `reqwest` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Request, Response};
use tracing::debug;

use crate::error::ApiError;

/// Sends a fully-prepared HTTP request and yields the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`, mapping network-level failures to
    /// [`ApiError::Transport`].
    async fn send(&self, request: Request) -> Result<Response, ApiError>;
}

/// Default [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Start building a transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(ApiError::Transport)?;

        debug!(%method, %url, status = %response.status(), "received HTTP response");
        Ok(response)
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpTransportBuilder {
    /// Deadline applied to every request; elapsed deadlines surface as
    /// [`ApiError::Transport`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpTransport, ApiError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_constructs_transport() {
        let transport = HttpTransport::builder()
            .timeout(Duration::from_secs(5))
            .build();
        assert!(transport.is_ok());
    }
}
