//! Resource descriptors: one endpoint call plus the strategy for decoding it.
//!
//! # Design
//! A `WebResource<T>` is a value. It never performs I/O; it knows how to turn
//! itself into an `HttpRequest` and how to turn a JSON document into `T` (or,
//! for error responses, into an `ErrorInfo`). The decoders are shared closures
//! so a resource can be cloned and dispatched more than once.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::ErrorInfo;
use crate::http::{Headers, HttpMethod, HttpRequest, ParameterEncoding, Parameters};

/// Failure returned by a decoder. A `NetworkingError` inside is forwarded to
/// the caller as-is; anything else is reported as `NetworkingError::Unknown`.
pub type DecodeError = Box<dyn StdError + Send + Sync>;

/// Turns a successful JSON body into the resource's value.
pub type JsonDecoder<T> = Arc<dyn Fn(&Value) -> Result<T, DecodeError> + Send + Sync>;

/// Turns an error JSON body into an `ErrorInfo`.
pub type ErrorDecoder = Arc<dyn Fn(&Value) -> Result<ErrorInfo, DecodeError> + Send + Sync>;

/// Description of a single HTTP call and how to decode its JSON.
pub struct WebResource<T> {
    url: Url,
    method: HttpMethod,
    parameters: Option<Parameters>,
    headers: Option<Headers>,
    decode: JsonDecoder<T>,
    decode_error: Option<ErrorDecoder>,
}

impl<T> WebResource<T> {
    /// A GET resource with no parameters or headers.
    pub fn new<F>(url: Url, decode: F) -> Self
    where
        F: Fn(&Value) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Self {
            url,
            method: HttpMethod::Get,
            parameters: None,
            headers: None,
            decode: Arc::new(decode),
            decode_error: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_error_decoder<F>(mut self, decode_error: F) -> Self
    where
        F: Fn(&Value) -> Result<ErrorInfo, DecodeError> + Send + Sync + 'static,
    {
        self.set_error_decoder(decode_error);
        self
    }

    /// Attach the decoder used for non-2xx bodies. Without one, error bodies
    /// are never read.
    pub fn set_error_decoder<F>(&mut self, decode_error: F)
    where
        F: Fn(&Value) -> Result<ErrorInfo, DecodeError> + Send + Sync + 'static,
    {
        self.decode_error = Some(Arc::new(decode_error));
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    pub fn has_error_decoder(&self) -> bool {
        self.decode_error.is_some()
    }

    pub fn decode(&self, json: &Value) -> Result<T, DecodeError> {
        (self.decode)(json)
    }

    /// Run the error decoder, if any. `None` when the resource has none.
    pub fn decode_error(&self, json: &Value) -> Option<Result<ErrorInfo, DecodeError>> {
        self.decode_error.as_ref().map(|decode| decode(json))
    }

    /// Default headers overlaid with this resource's headers. The resource
    /// wins on key collision.
    pub fn effective_headers(&self, default_headers: &Headers) -> Headers {
        let mut headers = default_headers.clone();
        if let Some(own) = &self.headers {
            headers.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        headers
    }

    /// Build the request for this resource.
    ///
    /// GET parameters go to the query string (after any query already on the
    /// URL); other methods send them as a JSON object body.
    pub fn build_request(&self, default_headers: &Headers) -> HttpRequest {
        let mut headers: Vec<(String, String)> = self.effective_headers(default_headers).into_iter().collect();
        let mut url = self.url.clone();
        let mut body = None;

        if let Some(parameters) = &self.parameters {
            match ParameterEncoding::for_method(self.method) {
                ParameterEncoding::QueryString => {
                    if !parameters.is_empty() {
                        let mut pairs = url.query_pairs_mut();
                        for (key, value) in parameters {
                            append_query(&mut pairs, key, value);
                        }
                    }
                }
                ParameterEncoding::JsonBody => {
                    body = Some(Value::Object(parameters.clone()).to_string());
                    if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                        headers.push(("Content-Type".to_string(), "application/json".to_string()));
                    }
                }
            }
        }

        HttpRequest {
            method: self.method,
            url: url.into(),
            headers,
            body,
        }
    }
}

/// Bracket-style form encoding: `k[]=v` for arrays, `k[sub]=v` for objects,
/// booleans as `1`/`0`.
fn append_query(pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>, key: &str, value: &Value) {
    match value {
        Value::Null => {
            pairs.append_pair(key, "");
        }
        Value::Bool(flag) => {
            pairs.append_pair(key, if *flag { "1" } else { "0" });
        }
        Value::Number(number) => {
            pairs.append_pair(key, &number.to_string());
        }
        Value::String(text) => {
            pairs.append_pair(key, text);
        }
        Value::Array(items) => {
            let nested = format!("{key}[]");
            for item in items {
                append_query(pairs, &nested, item);
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                append_query(pairs, &format!("{key}[{field}]"), item);
            }
        }
    }
}

impl<T> Clone for WebResource<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method,
            parameters: self.parameters.clone(),
            headers: self.headers.clone(),
            decode: Arc::clone(&self.decode),
            decode_error: self.decode_error.clone(),
        }
    }
}

impl<T> fmt::Debug for WebResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebResource")
            .field("url", &self.url.as_str())
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("headers", &self.headers)
            .field("has_error_decoder", &self.decode_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::NetworkingError;

    fn endpoint(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn passthrough(url: &str) -> WebResource<Value> {
        WebResource::new(endpoint(url), |json| Ok(json.clone()))
    }

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn new_defaults_to_get_without_extras() {
        let resource = passthrough("https://api.example.com/");
        assert_eq!(resource.method(), HttpMethod::Get);
        assert!(resource.parameters().is_none());
        assert!(resource.headers().is_none());
        assert!(!resource.has_error_decoder());
    }

    #[test]
    fn get_puts_parameters_in_query_string() {
        let resource = passthrough("https://api.example.com/")
            .with_parameters(params(json!({"name": "Rick", "count": 2})));
        let req = resource.build_request(&Headers::new());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/?count=2&name=Rick");
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn non_get_puts_parameters_in_json_body() {
        for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete] {
            let resource = passthrough("https://api.example.com/people")
                .with_method(method)
                .with_parameters(params(json!({"name": "Rick"})));
            let req = resource.build_request(&Headers::new());
            assert_eq!(req.url, "https://api.example.com/people", "{method}");
            let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(body, json!({"name": "Rick"}), "{method}");
            assert_eq!(req.header("Content-Type"), Some("application/json"), "{method}");
        }
    }

    #[test]
    fn json_body_keeps_caller_content_type() {
        let resource = passthrough("https://api.example.com/")
            .with_method(HttpMethod::Post)
            .with_headers(headers(&[("content-type", "application/vnd.api+json")]))
            .with_parameters(params(json!({"a": 1})));
        let req = resource.build_request(&Headers::new());
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(req.header("Content-Type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn query_is_appended_to_existing_query() {
        let resource = passthrough("https://api.example.com/search?lang=en")
            .with_parameters(params(json!({"q": "a b&c"})));
        let req = resource.build_request(&Headers::new());
        assert_eq!(req.url, "https://api.example.com/search?lang=en&q=a+b%26c");
    }

    #[test]
    fn empty_parameters_leave_url_untouched() {
        let resource = passthrough("https://api.example.com/").with_parameters(Parameters::new());
        let req = resource.build_request(&Headers::new());
        assert_eq!(req.url, "https://api.example.com/");
    }

    #[test]
    fn nested_query_values_use_brackets() {
        let resource = passthrough("https://api.example.com/").with_parameters(params(json!({
            "ids": [1, 2],
            "filter": {"active": true, "role": "admin"},
            "missing": null,
        })));
        let req = resource.build_request(&Headers::new());
        let url = Url::parse(&req.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("filter[active]".to_string(), "1".to_string()),
                ("filter[role]".to_string(), "admin".to_string()),
                ("ids[]".to_string(), "1".to_string()),
                ("ids[]".to_string(), "2".to_string()),
                ("missing".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn resource_headers_win_over_defaults() {
        let resource = passthrough("https://api.example.com/").with_headers(headers(&[("A", "2"), ("B", "3")]));
        let effective = resource.effective_headers(&headers(&[("A", "1")]));
        assert_eq!(effective, headers(&[("A", "2"), ("B", "3")]));
    }

    #[test]
    fn defaults_apply_when_resource_has_no_headers() {
        let resource = passthrough("https://api.example.com/");
        let req = resource.build_request(&headers(&[("X-App", "demo")]));
        assert_eq!(req.headers, vec![("X-App".to_string(), "demo".to_string())]);
    }

    #[test]
    fn resource_headers_used_as_is_without_defaults() {
        let resource = passthrough("https://api.example.com/").with_headers(headers(&[("B", "3")]));
        assert_eq!(resource.effective_headers(&Headers::new()), headers(&[("B", "3")]));
    }

    #[test]
    fn error_decoder_can_be_attached_after_construction() {
        let mut resource = passthrough("https://api.example.com/");
        assert!(resource.decode_error(&json!({})).is_none());

        resource.set_error_decoder(|json| {
            let reason = json["error"].as_str().ok_or(NetworkingError::DataCantBeParsed)?;
            Ok(ErrorInfo::new(None, Some(reason.to_string())))
        });

        let info = resource.decode_error(&json!({"error": "bad"})).unwrap().unwrap();
        assert_eq!(info.failure_reason.as_deref(), Some("bad"));
        assert!(resource.decode_error(&json!([])).unwrap().is_err());
    }

    #[test]
    fn clone_shares_decoders() {
        let resource = WebResource::new(endpoint("https://api.example.com/"), |json: &Value| {
            json["n"].as_u64().ok_or_else(|| NetworkingError::DataCantBeParsed.into())
        });
        let copy = resource.clone();
        assert_eq!(copy.decode(&json!({"n": 7})).unwrap(), 7);
    }
}
