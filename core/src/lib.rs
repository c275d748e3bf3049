//! SOAP-over-HTTP transport core.
//!
//! # Overview
//! Turns a logical SOAP call into an `OutboundRequest` description and turns
//! the raw HTTP response back into a usable payload: the isolated envelope
//! text plus any MTOM attachments it references. The network exchange itself
//! is performed by a caller-supplied `HttpExecutor` (host-does-IO pattern).
//!
//! # Design
//! - `RequestBuilder`, `extract_envelope` and `parse_attachments` are pure
//!   functions of their inputs and can be tested without any I/O.
//! - `Transport` wires them around an executor and reports each exchange
//!   through a completion callback exactly once.
//! - Extraction is best-effort: a missing envelope returns the body as-is and
//!   an unmatched attachment keeps empty fields. Only URL parsing and the
//!   executor can fail.
//! - Defaults (User-Agent, Accept headers, redirect policy) are read-only
//!   `TransportDefaults` injected into the builder.

pub mod attachments;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use attachments::{parse_attachments, Attachment, AttachmentMap};
pub use config::TransportDefaults;
pub use envelope::extract_envelope;
pub use error::BuildError;
pub use http::{
    HttpMethod, OutboundRequest, Payload, RawResponse, ResponseBody, ResponseMeta, TransportOptions,
};
pub use request::RequestBuilder;
pub use transport::{process_response, HttpExecutor, PendingExchange, SoapResponse, Transport};
