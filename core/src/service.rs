//! The request dispatcher.
//!
//! # Design
//! `WebService` is an ordinary value constructed once by the application and
//! handed to whoever needs it. It holds two pieces of configuration (the
//! `debug` flag and the default headers) and a shared transport. Each `load`
//! clones the service into its own task, so the configuration seen by a call
//! is the configuration at the moment `load` was invoked.
//!
//! Classification is a pure function of the resource and the received
//! response (`parse_response`); only `fetch` touches the transport.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ErrorInfo, NetworkingError};
use crate::http::{Headers, HttpRequest, HttpResponse};
use crate::resource::WebResource;
use crate::transport::{Transport, TransportError, UreqTransport};

const REQUEST_ID_HEADER: &str = "X-Request-Id";
const NO_REQUEST_ID: &str = "No Request Id";

/// Dispatcher configuration, loadable from an application's config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebServiceConfig {
    /// Log every request and response.
    pub debug: bool,
    /// Headers sent with every request unless the resource overrides them.
    pub default_headers: Headers,
}

/// Executes `WebResource`s and classifies their outcome.
///
/// Mutating the configuration takes `&mut self`; calls already started keep
/// the configuration they were started with.
pub struct WebService<T = UreqTransport> {
    transport: Arc<T>,
    config: WebServiceConfig,
}

impl WebService<UreqTransport> {
    /// A service using `UreqTransport` and the default configuration.
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }
}

impl Default for WebService<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for WebService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: Transport> WebService<T> {
    pub fn with_transport(transport: T) -> Self {
        Self::from_config(transport, WebServiceConfig::default())
    }

    pub fn from_config(transport: T, config: WebServiceConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn with_default_headers(mut self, headers: Headers) -> Self {
        self.config.default_headers = headers;
        self
    }

    pub fn debug(&self) -> bool {
        self.config.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn default_headers(&self) -> &Headers {
        &self.config.default_headers
    }

    pub fn set_default_headers(&mut self, headers: Headers) {
        self.config.default_headers = headers;
    }

    pub fn config(&self) -> &WebServiceConfig {
        &self.config
    }

    /// Dispatch `resource` on a new Tokio task and hand its outcome to
    /// `completion`, which runs exactly once on that task.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn load<R, F>(&self, resource: WebResource<R>, completion: F) -> JoinHandle<()>
    where
        R: Send + 'static,
        F: FnOnce(Result<R, NetworkingError>) + Send + 'static,
    {
        let service = self.clone();
        tokio::spawn(async move {
            let outcome = service.fetch(&resource).await;
            completion(outcome);
        })
    }

    /// Dispatch `resource` and await its classified outcome.
    pub async fn fetch<R>(&self, resource: &WebResource<R>) -> Result<R, NetworkingError> {
        let request = resource.build_request(&self.config.default_headers);
        let logged = self.config.debug.then(|| request.clone());

        let outcome = self.transport.execute(request).await;

        if let Some(request) = &logged {
            log_exchange(request, resource, &outcome);
        }

        match outcome {
            Ok(response) => parse_response(resource, &response),
            Err(TransportError::NotConnected(_)) => Err(NetworkingError::NotConnectedToInternet),
            Err(error) => Err(NetworkingError::Transport(error)),
        }
    }
}

/// Classify a received response and decode its body.
pub fn parse_response<R>(resource: &WebResource<R>, response: &HttpResponse) -> Result<R, NetworkingError> {
    if !response.is_success() {
        let info = decode_error_body(resource, &response.body);
        return Err(status_error(response.status, info));
    }

    let json = parse_json(&response.body).map_err(|e| {
        debug!(error = %e, "response body is not JSON");
        NetworkingError::DataCantBeParsed
    })?;

    resource.decode(&json).map_err(|error| match error.downcast::<NetworkingError>() {
        Ok(error) => *error,
        Err(other) => {
            debug!(error = %other, "decoder failed with a foreign error");
            NetworkingError::Unknown(None)
        }
    })
}

/// Extract `ErrorInfo` from a non-2xx body. Failures are logged and yield an
/// empty `ErrorInfo`.
pub fn decode_error_body<R>(resource: &WebResource<R>, body: &[u8]) -> ErrorInfo {
    if !resource.has_error_decoder() || body.is_empty() {
        return ErrorInfo::default();
    }
    let json = match serde_json::from_slice::<Value>(body) {
        Ok(json) => json,
        Err(e) => {
            debug!(error = %e, "error body is not JSON");
            return ErrorInfo::default();
        }
    };
    match resource.decode_error(&json) {
        Some(Ok(info)) => info,
        Some(Err(e)) => {
            debug!(error = %e, "can't parse error JSON");
            ErrorInfo::default()
        }
        None => ErrorInfo::default(),
    }
}

/// Map a non-2xx status code to its error kind.
pub fn status_error(status: u16, info: ErrorInfo) -> NetworkingError {
    match status {
        401 => NetworkingError::Unauthorized,
        400 | 404 | 422 => NetworkingError::InvalidRequest(info.description),
        500 => NetworkingError::ServerError(info.failure_reason),
        _ => {
            warn!(status, "status code {status} not handled");
            NetworkingError::Unknown(Some(format!("status code {status} not handled")))
        }
    }
}

/// An empty body reads as JSON `null`.
fn parse_json(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

/// Correlation id for debug logs: the `X-Request-Id` response header, or a
/// placeholder when there is no response or no such header.
fn request_id(response: Option<&HttpResponse>) -> &str {
    response
        .and_then(|r| r.header(REQUEST_ID_HEADER))
        .unwrap_or(NO_REQUEST_ID)
}

fn log_exchange<R>(
    request: &HttpRequest,
    resource: &WebResource<R>,
    outcome: &Result<HttpResponse, TransportError>,
) {
    let response = outcome.as_ref().ok();
    let request_id = request_id(response);
    let result = match outcome {
        Ok(response) => response.text().into_owned(),
        Err(error) => format!("FAILURE: {error}"),
    };

    info!(
        request_id,
        method = %request.method,
        url = %request.url,
        headers = ?request.headers,
        response_headers = ?response.map(|r| &r.headers),
        parameters = ?resource.parameters(),
        result = %result,
        status = ?response.map(|r| r.status),
        "request completed"
    );
}
