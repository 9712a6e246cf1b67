//! The transport boundary: one request/response exchange at a time.
//!
//! [`Transport`] is the only collaborator the client assumes. It receives a
//! method, an already-resolved URL, and an optionally pre-serialized body,
//! and must come back with a status code and a fully drained body, or a
//! connectivity failure distinct from any completed exchange.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ConfigError, TransportError};

/// A completed exchange: status code plus the drained response body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code of the response.
    pub status: StatusCode,
    /// The full response body. Empty for body-less responses.
    pub body: Bytes,
}

/// One request/response exchange against the manager.
///
/// Implementations must not retry, must not mutate the request, and must
/// return promptly with [`TransportError::Cancelled`] when the caller's
/// token fires before or during the exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single exchange.
    async fn execute(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError>;
}

/// Default transport over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json; charset=UTF-8")
                .body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<Bytes>,
    ) -> Result<RawResponse, TransportError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.send(method, url, body) => result,
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_token_aborts_before_connecting() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // Nothing listens on this port; the cancelled token must win the race.
        let url = Url::parse("http://127.0.0.1:9/api/v1/templates").unwrap();
        let result = tokio_test::block_on(transport.execute(
            &cancel,
            Method::GET,
            url,
            None,
        ));

        assert!(matches!(result, Err(TransportError::Cancelled)));
    }
}
