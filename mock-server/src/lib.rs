//! Mock SOAP endpoint used by the integration tests.
//!
//! Serves the response shapes a SOAP client meets in the wild: envelopes
//! wrapped in stray text, MTOM `multipart/related` bodies, plain-text status
//! pages, binary downloads and redirects.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const STATUS_TEXT: &str = "service ready";

pub const PHOTO_CID: &str = "photo@mock.example";
pub const PHOTO_DATA: &str = "iVBORw0KGgoAAAANSUhEUgAAAAE";
pub const REPORT_CID: &str = "report.1@mock.example";
pub const REPORT_DATA: &str = "%PDF-1.4 mock report";
pub const MISSING_CID: &str = "missing@mock.example";

pub const BINARY_BODY: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46];

pub fn app() -> Router {
    Router::new()
        .route("/soap/echo", get(echo).post(echo))
        .route("/soap/status", get(status))
        .route("/soap/mtom", get(mtom).post(mtom))
        .route("/soap/binary", get(binary))
        .route("/soap/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Echo the request back inside an envelope surrounded by junk.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let envelope = format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">",
            "<soap:Body><EchoResponse>",
            "<method>{}</method><connection>{}</connection><contentType>{}</contentType>",
            "<payload>{}</payload>",
            "</EchoResponse></soap:Body></soap:Envelope>"
        ),
        method,
        xml_escape(&header_str(header::CONNECTION)),
        xml_escape(&header_str(header::CONTENT_TYPE)),
        xml_escape(&body),
    );
    (
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        format!("\r\n\r\n{envelope}\r\n<!-- mock-server -->\r\n"),
    )
        .into_response()
}

async fn status() -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], STATUS_TEXT).into_response()
}

/// An MTOM response with a fresh `uuid:` boundary. References three
/// attachments but carries parts for two of them.
async fn mtom() -> Response {
    let boundary = format!("uuid:{}", Uuid::new_v4());
    let content_type = format!(
        "multipart/related; type=\"application/xop+xml\"; boundary=\"{boundary}\"; start=\"<root.message@cxf.apache.org>\"; start-info=\"text/xml\""
    );
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        mtom_body(&boundary),
    )
        .into_response()
}

/// Body of an MTOM response delimited by `boundary`.
pub fn mtom_body(boundary: &str) -> String {
    let envelope = format!(
        concat!(
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">",
            "<soap:Body><GetDocumentsResponse>",
            "<photo><xop:Include href=\"cid:{}\"></xop:Include></photo>",
            "<report><xop:Include xmlns:xop=\"http://www.w3.org/2004/08/xop/include\" href=\"cid:{}\"/></report>",
            "<archive><xop:Include href=\"cid:{}\"></xop:Include></archive>",
            "</GetDocumentsResponse></soap:Body></soap:Envelope>"
        ),
        PHOTO_CID, REPORT_CID, MISSING_CID,
    );
    [
        format!("--{boundary}"),
        "Content-Type: application/xop+xml; charset=UTF-8; type=\"text/xml\"".to_string(),
        "Content-Transfer-Encoding: binary".to_string(),
        "Content-ID: <root.message@cxf.apache.org>".to_string(),
        String::new(),
        envelope,
        format!("--{boundary}"),
        "Content-Type: image/png".to_string(),
        format!("Content-ID: <{PHOTO_CID}>"),
        String::new(),
        PHOTO_DATA.to_string(),
        format!("--{boundary}"),
        "Content-Type: application/pdf".to_string(),
        "Content-Transfer-Encoding: binary".to_string(),
        format!("Content-ID: <{REPORT_CID}>"),
        String::new(),
        REPORT_DATA.to_string(),
        format!("--{boundary}--"),
        String::new(),
    ]
    .join("\r\n")
}

async fn binary() -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Bytes::from_static(BINARY_BODY),
    )
        .into_response()
}

async fn redirect() -> Redirect {
    Redirect::to("/soap/status")
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
