use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body of a genderize lookup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub name: String,
    pub gender: Option<String>,
    pub probability: f64,
    pub count: u64,
}

/// Body of an `/echo` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

const KNOWN_NAMES: &[(&str, &str, f64, u64)] = &[
    ("rick", "male", 0.99, 28_412),
    ("morty", "male", 0.98, 1_203),
    ("summer", "female", 0.97, 9_871),
    ("beth", "female", 0.99, 14_520),
    ("jerry", "male", 0.99, 33_104),
];

pub fn app() -> Router {
    Router::new()
        .route("/", get(genderize))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .layer(middleware::from_fn(request_id))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Look up the gender of `name`. Unknown names get a null gender.
pub fn predict(name: &str) -> Prediction {
    let lower = name.to_lowercase();
    match KNOWN_NAMES.iter().find(|(known, ..)| *known == lower) {
        Some((_, gender, probability, count)) => Prediction {
            name: name.to_string(),
            gender: Some(gender.to_string()),
            probability: *probability,
            count: *count,
        },
        None => Prediction {
            name: name.to_string(),
            gender: None,
            probability: 0.0,
            count: 0,
        },
    }
}

/// `GET /?name=<name>`. Any other query key is rejected with 422, as the real
/// service does.
async fn genderize(Query(params): Query<BTreeMap<String, String>>) -> Response {
    if let Some(unknown) = params.keys().find(|key| key.as_str() != "name") {
        return error(StatusCode::UNPROCESSABLE_ENTITY, &format!("{unknown} is not a valid parameter"));
    }
    match params.get("name") {
        Some(name) => Json(predict(name)).into_response(),
        None => error(StatusCode::UNPROCESSABLE_ENTITY, "Missing 'name' parameter"),
    }
}

async fn status(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return error(StatusCode::BAD_REQUEST, &format!("{code} is not a valid status code"));
    };
    if status.is_success() {
        return (status, Json(json!({"status": code}))).into_response();
    }
    error(status, status.canonical_reason().unwrap_or("unknown status"))
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => Some(value),
            Err(_) => return error(StatusCode::BAD_REQUEST, "body is not JSON"),
        }
    };
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    })
    .into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn request_id(request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
