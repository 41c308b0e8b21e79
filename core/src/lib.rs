//! Typed JSON-over-HTTP resource loading.
//!
//! # Overview
//! A `WebResource<T>` describes one endpoint call: URL, method, parameters,
//! headers and the function that turns the response JSON into `T`. A
//! `WebService` executes resources through a `Transport`, classifies the
//! outcome into a `NetworkingError` when something goes wrong, and hands the
//! typed result to a completion callback exactly once.
//!
//! # Design
//! - Request building (`WebResource::build_request`) and response
//!   classification (`service::parse_response`) are pure; only the transport
//!   performs I/O.
//! - `WebService` is an explicit value, not a global. Configuration (debug
//!   logging, default headers) is captured when a call starts.
//! - Presentation layers react to errors through `NetworkingErrorHandler`.

pub mod error;
pub mod handler;
pub mod http;
pub mod resource;
pub mod service;
pub mod transport;

pub use error::{ErrorInfo, ErrorReport, NetworkingError};
pub use handler::{Completion, ErrorAlert, NetworkingErrorHandler};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, ParameterEncoding, Parameters};
pub use resource::{DecodeError, WebResource};
pub use service::{WebService, WebServiceConfig};
pub use transport::{Transport, TransportError, UreqTransport};

// Re-exported so callers can build endpoints without a direct `url` dependency.
pub use url::Url;
