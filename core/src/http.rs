//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe outbound requests and raw responses as plain data.
//! The core builds `OutboundRequest` values and post-processes `RawResponse`
//! values without touching the network; an external executor performs the
//! exchange. Fields are owned (`String`, `Vec`) so values can cross thread
//! and FFI boundaries without lifetime concerns.
//!
//! Headers are kept as an ordered list of pairs. Keys keep the casing the
//! caller supplied, but lookups and overrides compare them ASCII
//! case-insensitively.

use serde_json::{Map, Value};

/// Open configuration bag handed through to the HTTP executor.
pub type TransportOptions = Map<String, Value>;

/// Option key controlling automatic redirect following.
pub const OPTION_FOLLOW_REDIRECTS: &str = "follow_redirects";

/// Option key requesting a persistent (`keep-alive`) connection.
pub const OPTION_FOREVER: &str = "forever";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Request payload supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Binary(bytes) => bytes.is_empty(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

/// An outbound HTTP request described as plain data.
///
/// Built by `RequestBuilder::build`. When `body` is `None` but the caller
/// holds a payload, the payload is written to the exchange after dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub uri: String,
    /// Path, query and fragment of `uri`.
    pub path: String,
    pub secure: bool,
    pub headers: Vec<(String, String)>,
    pub body: Option<Payload>,
    pub options: TransportOptions,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Whether the executor should honour redirects. Absent or non-boolean
    /// values count as enabled.
    pub fn follow_redirects(&self) -> bool {
        self.options
            .get(OPTION_FOLLOW_REDIRECTS)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// Status line and headers of a completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

/// Response body as delivered by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }

    /// Classify raw bytes: valid UTF-8 becomes `Text`, anything else stays
    /// `Binary`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => ResponseBody::Text(text),
            Err(err) => ResponseBody::Binary(err.into_bytes()),
        }
    }
}

/// An HTTP response as returned by the executor, before any SOAP processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub meta: ResponseMeta,
    pub body: ResponseBody,
}

/// Look up a header value by ASCII case-insensitive name. The first match
/// wins.
pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Replace the value of an existing header (matched case-insensitively) or
/// append a new one. A replaced entry takes the caller's key casing.
pub fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
        Some(entry) => *entry = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
