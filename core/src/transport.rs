//! Request/response orchestration around an external HTTP executor.
//!
//! # Design
//! `Transport` owns a `RequestBuilder` and an executor and nothing else; it
//! keeps no per-call state, so one instance can serve concurrent `send`
//! calls from many threads when the executor allows it.
//!
//! The exchange is two-phase. `HttpExecutor::dispatch` starts the request
//! and hands back a `PendingExchange`. For non-keep-alive requests the
//! payload is written to that exchange afterwards; keep-alive requests carry
//! it in the description and skip the write. `finish` yields the raw
//! response, which `process_response` turns into a `SoapResponse`.
//!
//! Executor failures reach the completion callback untouched. No parsing is
//! attempted after a failed exchange.

use tracing::debug;

use crate::attachments::{parse_attachments, AttachmentMap};
use crate::envelope::extract_envelope;
use crate::error::BuildError;
use crate::http::{OutboundRequest, Payload, RawResponse, ResponseBody, ResponseMeta, TransportOptions};
use crate::request::{defers_body, RequestBuilder};

/// Performs the network side of an exchange.
///
/// Connection management, TLS, redirects, retries and timeouts all belong
/// to the implementation; `OutboundRequest::options` carries the caller's
/// settings for them.
pub trait HttpExecutor {
    type Error;
    type Exchange: PendingExchange<Error = Self::Error>;

    /// Start the exchange described by `request`. The request body, if any,
    /// is already part of `request`.
    fn dispatch(&self, request: OutboundRequest) -> Result<Self::Exchange, Self::Error>;
}

/// An exchange that has been dispatched but not yet completed.
pub trait PendingExchange {
    type Error;

    /// Write the payload of a request dispatched without a body.
    fn write_body(&mut self, payload: &Payload) -> Result<(), Self::Error>;

    /// Complete the exchange and return the raw response.
    fn finish(self) -> Result<RawResponse, Self::Error>;
}

/// A response after envelope isolation and attachment extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    pub meta: ResponseMeta,
    /// The envelope span for textual bodies; binary bodies unchanged.
    pub body: ResponseBody,
    /// Always present, empty when the response carries no MTOM parts.
    pub attachments: AttachmentMap,
}

impl SoapResponse {
    pub fn envelope(&self) -> Option<&str> {
        self.body.as_text()
    }
}

/// Run the post-exchange pipeline: attachments first, then envelope
/// isolation. Binary bodies pass through with no attachments.
pub fn process_response(raw: RawResponse) -> SoapResponse {
    let RawResponse { meta, body } = raw;
    match body {
        ResponseBody::Text(text) => {
            let attachments = parse_attachments(&meta.headers, &text);
            let envelope = extract_envelope(&text);
            let body = if envelope.len() == text.len() {
                ResponseBody::Text(text)
            } else {
                ResponseBody::Text(envelope.to_string())
            };
            SoapResponse {
                meta,
                body,
                attachments,
            }
        }
        binary @ ResponseBody::Binary(_) => SoapResponse {
            meta,
            body: binary,
            attachments: AttachmentMap::new(),
        },
    }
}

/// SOAP transport over a caller-supplied executor.
#[derive(Debug, Clone)]
pub struct Transport<E> {
    builder: RequestBuilder,
    executor: E,
}

impl<E: HttpExecutor> Transport<E> {
    pub fn new(executor: E) -> Self {
        Self::with_builder(RequestBuilder::default(), executor)
    }

    pub fn with_builder(builder: RequestBuilder, executor: E) -> Self {
        Self { builder, executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Send one request and report its outcome to `on_complete` exactly once.
    ///
    /// An unparsable `url` is returned as `Err` before anything is
    /// dispatched, and `on_complete` is not called.
    pub fn send<F>(
        &self,
        url: &str,
        payload: Option<Payload>,
        on_complete: F,
        extra_headers: &[(String, String)],
        extra_options: &TransportOptions,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(Result<SoapResponse, E::Error>),
    {
        let request = self
            .builder
            .build(url, payload.as_ref(), extra_headers, extra_options)?;
        on_complete(self.exchange(request, payload));
        Ok(())
    }

    fn exchange(
        &self,
        request: OutboundRequest,
        payload: Option<Payload>,
    ) -> Result<SoapResponse, E::Error> {
        let deferred = payload.filter(|p| defers_body(&request) && !p.is_empty());
        debug!(
            method = request.method.as_str(),
            uri = %request.uri,
            deferred_body = deferred.is_some(),
            "dispatching SOAP request"
        );

        let mut pending = self.executor.dispatch(request)?;
        if let Some(payload) = &deferred {
            pending.write_body(payload)?;
        }
        let raw = pending.finish()?;
        debug!(status = raw.meta.status, "SOAP response received");
        Ok(process_response(raw))
    }
}
