//! Outbound request construction.
//!
//! # Design
//! `RequestBuilder` holds only the injected `TransportDefaults` and carries no
//! mutable state between calls. `build` is a pure transformation from a URL,
//! an optional payload and caller overrides into an `OutboundRequest`; the
//! executor performs the actual I/O.
//!
//! Precedence is fixed: built-in defaults first, then extra headers, then
//! extra options. A request whose final `Connection` header is `keep-alive`
//! carries its payload inside the description. Any other connection mode
//! leaves `body` empty and the payload is written after dispatch.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::TransportDefaults;
use crate::error::BuildError;
use crate::http::{
    header_value, set_header, HttpMethod, OutboundRequest, Payload, TransportOptions,
    OPTION_FOLLOW_REDIRECTS, OPTION_FOREVER,
};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Stateless builder for `OutboundRequest` values.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    defaults: Arc<TransportDefaults>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(TransportDefaults::shared())
    }
}

impl RequestBuilder {
    pub fn new(defaults: Arc<TransportDefaults>) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &TransportDefaults {
        &self.defaults
    }

    pub fn build(
        &self,
        url: &str,
        payload: Option<&Payload>,
        extra_headers: &[(String, String)],
        extra_options: &TransportOptions,
    ) -> Result<OutboundRequest, BuildError> {
        let parsed = Url::parse(url)?;
        let secure = parsed.scheme() == "https";
        let payload = payload.filter(|p| !p.is_empty());
        let method = if payload.is_some() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        };

        let host = parsed.host_str().unwrap_or_default();
        let host = match explicit_port(&parsed, url) {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let forever = extra_options
            .get(OPTION_FOREVER)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut headers = vec![
            ("User-Agent".to_string(), self.defaults.user_agent.clone()),
            ("Accept".to_string(), self.defaults.accept.clone()),
            ("Accept-Encoding".to_string(), self.defaults.accept_encoding.clone()),
            ("Accept-Charset".to_string(), self.defaults.accept_charset.clone()),
            (
                "Connection".to_string(),
                if forever { "keep-alive" } else { "close" }.to_string(),
            ),
            ("Host".to_string(), host),
        ];
        if let Some(Payload::Text(text)) = payload {
            headers.push(("Content-Length".to_string(), text.len().to_string()));
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        }
        for (name, value) in extra_headers {
            set_header(&mut headers, name, value);
        }

        let keep_alive = header_value(&headers, "Connection")
            .is_some_and(|c| c.eq_ignore_ascii_case("keep-alive"));
        let body = if keep_alive { payload.cloned() } else { None };

        let mut options = TransportOptions::new();
        options.insert(
            OPTION_FOLLOW_REDIRECTS.to_string(),
            Value::Bool(self.defaults.follow_redirects),
        );
        for (key, value) in extra_options {
            options.insert(key.clone(), value.clone());
        }

        Ok(OutboundRequest {
            method,
            path: request_target(&parsed),
            uri: parsed.into(),
            secure,
            headers,
            body,
            options,
        })
    }
}

/// Whether a built request expects its payload to be written after dispatch.
pub fn defers_body(request: &OutboundRequest) -> bool {
    !request
        .header("Connection")
        .is_some_and(|c| c.eq_ignore_ascii_case("keep-alive"))
}

/// Path, query and fragment joined the way they appear on the wire. An empty
/// path becomes `/`.
fn request_target(url: &Url) -> String {
    let mut target = match url.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// The port as written in the URL. `Url` drops a port equal to the scheme
/// default, so the raw authority is consulted for that case.
fn explicit_port(parsed: &Url, raw: &str) -> Option<u16> {
    parsed.port().or_else(|| {
        let (_, rest) = raw.split_once("://")?;
        let authority = rest.split(['/', '?', '#']).next()?;
        let host_port = authority.rsplit('@').next()?;
        if host_port.ends_with(']') {
            return None;
        }
        let (_, port) = host_port.rsplit_once(':')?;
        port.parse().ok()
    })
}
