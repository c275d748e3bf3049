//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char` for
//! text, pointer + length for byte buffers (bodies may contain NUL bytes or
//! not be UTF-8 at all), and explicit discriminants on enums. Everything
//! handed to C is heap-allocated here and released by the matching
//! `soap_free_*` function.

use std::ffi::CString;
use std::os::raw::c_char;

use soap_http_core::http::{HttpMethod, OutboundRequest, Payload, ResponseBody};
use soap_http_core::request::defers_body;
use soap_http_core::{Attachment, RequestBuilder, SoapResponse};

/// Opaque handle to a `RequestBuilder` with its injected defaults.
pub struct FfiSoapClient {
    pub(crate) builder: RequestBuilder,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Move a string into a C string. Interior NUL bytes yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Move a byte buffer to the heap and return its pointer and length.
pub(crate) fn raw_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    let len = bytes.len();
    (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
}

/// Release a buffer created by `raw_bytes`. Null is ignored.
pub(crate) unsafe fn free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
    }
}

/// Release a C string created by `c_string`. Null is ignored.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
///
/// Used both for headers returned to C (owned by this library) and for
/// headers C passes in (owned by the caller, only read here).
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An outbound request described as C-compatible plain data.
///
/// `body` holds the payload, or is null for a GET. When `defer_body` is
/// true the caller starts the request first and writes `body` afterwards;
/// otherwise the body goes out with the request. `options_json` is the
/// transport options bag as a JSON object.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub uri: *mut c_char,
    pub path: *mut c_char,
    pub secure: bool,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
    pub defer_body: bool,
    pub options_json: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `OutboundRequest` into a heap-allocated `FfiHttpRequest`.
    ///
    /// `payload` is the caller's payload; it fills `body` when the request
    /// description left it out for a deferred write.
    pub(crate) fn from_core(req: OutboundRequest, payload: Option<&Payload>) -> *mut Self {
        let defer_body = req.body.is_none() && payload.is_some() && defers_body(&req);
        let options_json = serde_json::to_string(&req.options).unwrap_or_else(|_| "{}".to_string());
        let (body, body_len) = match req.body.as_ref().or(payload.filter(|_| defer_body)) {
            Some(payload) => raw_bytes(payload.as_bytes().to_vec()),
            None => (std::ptr::null_mut(), 0),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            uri: c_string(req.uri),
            path: c_string(req.path),
            secure: req.secure,
            headers,
            headers_len,
            body,
            body_len,
            defer_body,
            options_json: c_string(options_json),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A raw HTTP response as C-compatible plain data.
///
/// The C caller fills this in after executing the request and passes a
/// pointer to `soap_process_response`. Nothing here is freed by the library.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiSoapResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    Panic = 2,
}

/// One MTOM attachment exposed to C. `mime_type` and `data` are null when
/// the referenced part was not found.
#[repr(C)]
pub struct FfiAttachment {
    pub content_id: *mut c_char,
    pub mime_type: *mut c_char,
    pub data: *mut u8,
    pub data_len: usize,
}

impl FfiAttachment {
    fn from_core(attachment: Attachment) -> Self {
        let (data, data_len) = match attachment.data {
            Some(data) => raw_bytes(data.into_bytes()),
            None => (std::ptr::null_mut(), 0),
        };
        FfiAttachment {
            content_id: c_string(attachment.content_id),
            mime_type: attachment.mime_type.map_or(std::ptr::null_mut(), c_string),
            data,
            data_len,
        }
    }

    /// Free the fields of an `FfiAttachment` (but not the struct itself).
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.content_id);
            free_c_string(self.mime_type);
            free_bytes(self.data, self.data_len);
        }
    }
}

/// Result envelope for `soap_process_response`.
///
/// On success `error_code` is `Ok` and `body` holds the processed body: the
/// isolated envelope when `body_is_text` is true, the untouched bytes
/// otherwise. Attachments are sorted by content-id. On failure
/// `error_message` describes the problem and every pointer is null.
#[repr(C)]
pub struct FfiSoapResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut u8,
    pub body_len: usize,
    pub body_is_text: bool,
    pub attachments: *mut FfiAttachment,
    pub attachments_len: u32,
}

impl FfiSoapResult {
    /// Build a success result from a processed response.
    pub(crate) fn ok(response: SoapResponse) -> *mut Self {
        let body_is_text = matches!(response.body, ResponseBody::Text(_));
        let bytes = match response.body {
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        };
        let (body, body_len) = raw_bytes(bytes);

        let mut attachments: Vec<Attachment> = response.attachments.into_values().collect();
        attachments.sort_by(|a, b| a.content_id.cmp(&b.content_id));
        let attachments_len = attachments.len() as u32;
        let attachments = if attachments.is_empty() {
            std::ptr::null_mut()
        } else {
            let items: Box<[FfiAttachment]> =
                attachments.into_iter().map(FfiAttachment::from_core).collect();
            Box::into_raw(items) as *mut FfiAttachment
        };

        Box::into_raw(Box::new(FfiSoapResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: response.meta.status,
            body,
            body_len,
            body_is_text,
            attachments,
            attachments_len,
        }))
    }

    /// Build an error result.
    pub(crate) fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiSoapResult {
            error_code,
            error_message: c_string(msg),
            http_status: 0,
            body: std::ptr::null_mut(),
            body_len: 0,
            body_is_text: false,
            attachments: std::ptr::null_mut(),
            attachments_len: 0,
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }
}
