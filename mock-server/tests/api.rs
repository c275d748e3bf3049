use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, BINARY_BODY, PHOTO_CID, PHOTO_DATA, REPORT_DATA, STATUS_TEXT};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

fn content_type(response: &axum::response::Response) -> String {
    response.headers()[http::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string()
}

fn soap_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "text/xml; charset=utf-8")
        .header(http::header::CONNECTION, "close")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_wraps_envelope_in_junk() {
    let resp = app()
        .oneshot(soap_request("/soap/echo", "<Ping n=\"1\"/>"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("text/xml"));
    let body = body_text(resp).await;
    assert!(body.starts_with("\r\n\r\n<?xml"));
    assert!(body.trim_end().ends_with("<!-- mock-server -->"));
    assert!(body.contains("<method>POST</method>"));
    assert!(body.contains("<connection>close</connection>"));
    assert!(body.contains("<contentType>text/xml; charset=utf-8</contentType>"));
    assert!(body.contains("<payload>&lt;Ping n=\"1\"/&gt;</payload>"));
}

#[tokio::test]
async fn echo_accepts_get() {
    let resp = app().oneshot(get("/soap/echo")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<method>GET</method>"));
    assert!(body.contains("<payload></payload>"));
}

// --- status / binary / redirect ---

#[tokio::test]
async fn status_is_plain_text() {
    let resp = app().oneshot(get("/soap/status")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, STATUS_TEXT);
}

#[tokio::test]
async fn binary_returns_raw_bytes() {
    let resp = app().oneshot(get("/soap/binary")).await.unwrap();
    assert_eq!(content_type(&resp), "application/octet-stream");
    assert_eq!(body_bytes(resp).await.as_ref(), BINARY_BODY);
}

#[tokio::test]
async fn redirect_points_at_status() {
    let resp = app().oneshot(get("/soap/redirect")).await.unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()[http::header::LOCATION], "/soap/status");
}

// --- mtom ---

#[tokio::test]
async fn mtom_declares_quoted_uuid_boundary() {
    let resp = app().oneshot(get("/soap/mtom")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let ct = content_type(&resp);
    assert!(ct.starts_with("multipart/related;"));
    let boundary = ct
        .split("boundary=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .to_string();
    assert!(boundary.starts_with("uuid:"));

    let body = body_text(resp).await;
    assert!(body.starts_with(&format!("--{boundary}\r\n")));
    assert!(body.contains(&format!("Content-ID: <{PHOTO_CID}>\r\n\r\n{PHOTO_DATA}\r\n")));
    assert!(body.contains(REPORT_DATA));
}

#[tokio::test]
async fn mtom_boundaries_differ_per_response() {
    let first = content_type(&app().oneshot(get("/soap/mtom")).await.unwrap());
    let second = content_type(&app().oneshot(get("/soap/mtom")).await.unwrap());
    assert_ne!(first, second);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let resp = app().oneshot(get("/soap/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
