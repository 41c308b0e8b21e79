//! The HTTP transport capability consumed by `WebService`.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and yields either an
//! `HttpResponse` (any status code) or a `TransportError` when no status was
//! received. Status interpretation is left entirely to the dispatcher, so a
//! transport must not treat 4xx/5xx as failures.
//!
//! `UreqTransport` is the default implementation. ureq is blocking, so each
//! request runs on Tokio's blocking pool.

use std::future::Future;
use std::io;

use thiserror::Error;
use tracing::warn;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Failure reported by a transport before any HTTP status was available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No network connectivity (DNS unreachable, network down).
    #[error("not connected: {0}")]
    NotConnected(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

/// Executes HTTP requests on behalf of `WebService`.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// `Transport` backed by a ureq `Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must come back as data for the dispatcher to classify.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-configured agent. The agent must be built with
    /// `http_status_as_error(false)`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let agent = self.agent.clone();
        async move {
            tokio::task::spawn_blocking(move || send(&agent, request))
                .await
                .map_err(|e| TransportError::Other(format!("transport task failed: {e}")))?
        }
    }
}

fn send(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match (method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&url), &headers).call(),
        (HttpMethod::Delete, None) => with_headers(agent.delete(&url), &headers).call(),
        (HttpMethod::Head, None) => with_headers(agent.head(&url), &headers).call(),
        (HttpMethod::Options, None) => with_headers(agent.options(&url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => {
            with_headers(agent.delete(&url).force_send_body(), &headers).send(body.as_bytes())
        }
        (HttpMethod::Head, Some(body)) => {
            with_headers(agent.head(&url).force_send_body(), &headers).send(body.as_bytes())
        }
        (HttpMethod::Options, Some(body)) => {
            with_headers(agent.options(&url).force_send_body(), &headers).send(body.as_bytes())
        }
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty(),
        (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(&url), &headers).send(body.as_bytes()),
        (HttpMethod::Patch, None) => with_headers(agent.patch(&url), &headers).send_empty(),
    };

    let mut response = result.map_err(classify_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    // A status was received, so an unreadable body must not turn this into a
    // transport failure.
    let body = match response.body_mut().read_to_vec() {
        Ok(body) => body,
        Err(e) => {
            warn!(status, error = %e, "failed to read response body");
            Vec::new()
        }
    };

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Map a ureq failure onto the transport taxonomy.
fn classify_error(error: ureq::Error) -> TransportError {
    match &error {
        ureq::Error::HostNotFound => TransportError::NotConnected(error.to_string()),
        ureq::Error::Io(io) if is_offline(io) => TransportError::NotConnected(error.to_string()),
        ureq::Error::Timeout(_) => TransportError::Timeout(error.to_string()),
        ureq::Error::BadUri(uri) => TransportError::InvalidUrl(uri.clone()),
        _ => TransportError::Other(error.to_string()),
    }
}

/// Name resolution failed, or the network itself is unreachable.
fn is_offline(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkDown
    ) || is_resolver_failure(error)
}

// std reports getaddrinfo failures with an uncategorized kind, so the message
// (Unix) or the WSAHOST_NOT_FOUND/WSATRY_AGAIN code (Windows) is all there is.
fn is_resolver_failure(error: &io::Error) -> bool {
    error.to_string().contains("failed to lookup address information")
        || (cfg!(windows) && matches!(error.raw_os_error(), Some(11001 | 11002)))
}
