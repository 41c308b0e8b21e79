//! HTTP wire types exchanged between the dispatcher and a transport.
//!
//! # Design
//! Requests and responses are plain data. `WebResource::build_request`
//! produces an `HttpRequest`, a `Transport` turns it into an `HttpResponse`,
//! and `parse_response` classifies the result. Only the transport touches the
//! network, so everything on either side of it stays deterministic.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Header names to values. Ordered so logged and encoded headers are stable.
pub type Headers = BTreeMap<String, String>;

/// Request parameters: string keys to arbitrary JSON values.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where request parameters are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// Appended to the URL's query string.
    QueryString,
    /// Serialized as a JSON object request body.
    JsonBody,
}

impl ParameterEncoding {
    /// GET carries its parameters in the query string, every other method in
    /// a JSON body.
    pub fn for_method(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => ParameterEncoding::QueryString,
            _ => ParameterEncoding::JsonBody,
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` once a status line was received, whatever the
/// status code. The body is kept as raw bytes; it need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
