use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, Prediction, REQUEST_ID_HEADER};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- genderize ---

#[tokio::test]
async fn genderize_known_name() {
    let resp = app().oneshot(get("/?name=Rick")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let prediction: Prediction = body_json(resp).await;
    assert_eq!(prediction.name, "Rick");
    assert_eq!(prediction.gender.as_deref(), Some("male"));
}

#[tokio::test]
async fn genderize_unknown_name_has_null_gender() {
    let resp = app().oneshot(get("/?name=Zorblax")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert!(json["gender"].is_null());
}

#[tokio::test]
async fn genderize_rejects_unknown_parameter() {
    let resp = app().oneshot(get("/?names=Morty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["error"], "names is not a valid parameter");
}

#[tokio::test]
async fn genderize_requires_name() {
    let resp = app().oneshot(get("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["error"], "Missing 'name' parameter");
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code_with_error_body() {
    for code in [400u16, 401, 404, 418, 500, 503] {
        let resp = app().oneshot(get(&format!("/status/{code}"))).await.unwrap();
        assert_eq!(resp.status().as_u16(), code);
        let json: serde_json::Value = body_json(resp).await;
        assert!(json["error"].is_string(), "{code}");
    }
}

#[tokio::test]
async fn status_route_success_code() {
    let resp = app().oneshot(get("/status/200")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["status"], 200);
}

#[tokio::test]
async fn status_route_rejects_non_numeric_code() {
    let resp = app().oneshot(get("/status/teapot")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_query_and_headers() {
    let req = Request::builder()
        .uri("/echo?name=Rick&count=2")
        .header("X-App", "demo")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query.get("name").map(String::as_str), Some("Rick"));
    assert_eq!(echo.query.get("count").map(String::as_str), Some("2"));
    assert_eq!(echo.headers.get("x-app").map(String::as_str), Some("demo"));
    assert!(echo.body.is_none());
}

#[tokio::test]
async fn echo_reflects_json_body() {
    let resp = app()
        .oneshot(json_request("POST", "/echo", r#"{"name":"Rick"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert!(echo.query.is_empty());
    assert_eq!(echo.body, Some(serde_json::json!({"name": "Rick"})));
}

#[tokio::test]
async fn echo_rejects_non_json_body() {
    let resp = app().oneshot(json_request("PUT", "/echo", "not json")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&bytes).contains("body is not JSON"));
}

// --- request id ---

#[tokio::test]
async fn every_response_has_request_id() {
    for uri in ["/?name=Rick", "/status/500", "/echo"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        let id = resp.headers().get(REQUEST_ID_HEADER).expect(uri);
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok(), "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(get("/people")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
