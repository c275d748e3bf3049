//! C-ABI wrapper around `soap-http-core`.
//!
//! # Overview
//! Exposes request building and response post-processing through
//! `extern "C"` functions so a host with its own HTTP stack can drive SOAP
//! exchanges without linking to Rust's runtime or serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `soap_build_request` returns a plain request description; the host
//!   performs the exchange and hands the raw response to
//!   `soap_process_response`.
//! - A single `FfiSoapResult` carries the processed body, attachments or an
//!   error code.
//! - The C caller owns all returned pointers and must call the matching
//!   `soap_*_free` / `soap_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use soap_http_core::http::{Payload, RawResponse, ResponseBody, ResponseMeta};
use soap_http_core::{process_response, RequestBuilder, TransportDefaults, TransportOptions};

use types::*;

/// Read a caller-owned C string. Null and non-UTF-8 input yield `None`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Copy a caller-owned header array into owned pairs. Entries with a null or
/// non-UTF-8 key are skipped.
unsafe fn read_headers(headers: *const FfiHeader, len: u32) -> Vec<(String, String)> {
    if headers.is_null() || len == 0 {
        return Vec::new();
    }
    let items = unsafe { std::slice::from_raw_parts(headers, len as usize) };
    items
        .iter()
        .filter_map(|h| {
            let key = unsafe { read_str(h.key) }?;
            let value = unsafe { read_str(h.value) }.unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a request builder configured from `defaults_json`.
///
/// `defaults_json` may be null for the compiled-in defaults; otherwise it is
/// a JSON object whose fields override them (`user_agent`, `accept`,
/// `accept_encoding`, `accept_charset`, `follow_redirects`).
/// Returns null if the JSON is invalid or an internal panic occurs.
/// The caller must free the returned pointer with `soap_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn soap_client_new(defaults_json: *const c_char) -> *mut FfiSoapClient {
    catch_unwind(|| {
        let builder = if defaults_json.is_null() {
            RequestBuilder::default()
        } else {
            let Some(json) = (unsafe { read_str(defaults_json) }) else {
                return std::ptr::null_mut();
            };
            match serde_json::from_str::<TransportDefaults>(json) {
                Ok(defaults) => RequestBuilder::new(defaults.into()),
                Err(_) => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiSoapClient { builder }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `soap_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn soap_client_free(client: *mut FfiSoapClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Build the request description for one SOAP call.
///
/// `payload` may be null (or empty) for a GET. `headers` points to
/// `headers_len` caller-owned entries applied over the defaults.
/// `options_json` may be null or a JSON object of transport options.
/// Returns null if `client` or `url` is null, the URL does not parse, or
/// `options_json` is not a JSON object.
/// The caller must free the returned pointer with `soap_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn soap_build_request(
    client: *const FfiSoapClient,
    url: *const c_char,
    payload: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
    options_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(url) = (unsafe { read_str(url) }) else {
            return std::ptr::null_mut();
        };
        let payload = unsafe { read_str(payload) }
            .filter(|p| !p.is_empty())
            .map(Payload::from);
        let headers = unsafe { read_headers(headers, headers_len) };
        let options = if options_json.is_null() {
            TransportOptions::new()
        } else {
            let parsed = unsafe { read_str(options_json) }
                .and_then(|json| serde_json::from_str::<TransportOptions>(json).ok());
            match parsed {
                Some(options) => options,
                None => return std::ptr::null_mut(),
            }
        };

        match client
            .builder
            .build(url, payload.as_ref(), &headers, &options)
        {
            Ok(req) => FfiHttpRequest::from_core(req, payload.as_ref()),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Response processing
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `RawResponse`.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> RawResponse {
    let bytes = if resp.body.is_null() || resp.body_len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec()
    };
    RawResponse {
        meta: ResponseMeta {
            status: resp.status,
            headers: unsafe { read_headers(resp.headers, resp.headers_len) },
        },
        body: ResponseBody::from_bytes(bytes),
    }
}

/// Isolate the envelope and collect MTOM attachments from a raw response.
///
/// Returns a result with `error_code = Ok` on success, or `NullArg` when
/// `response` is null.
/// The caller must free the returned pointer with `soap_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn soap_process_response(response: *const FfiHttpResponse) -> *mut FfiSoapResult {
    catch_unwind(|| {
        if response.is_null() {
            return FfiSoapResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        FfiSoapResult::ok(process_response(ffi_response_to_core(resp)))
    })
    .unwrap_or_else(|_| FfiSoapResult::panic("panic in soap_process_response"))
}

/// Return the SOAP envelope inside `body`, or a copy of `body` when none is
/// found.
///
/// Returns null if `body` is null or not UTF-8.
/// The caller must free the returned string with `soap_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn soap_extract_envelope(body: *const c_char) -> *mut c_char {
    catch_unwind(|| match unsafe { read_str(body) } {
        Some(body) => c_string(soap_http_core::extract_envelope(body)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `soap_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn soap_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.uri);
            free_c_string(req.path);
            free_c_string(req.options_json);
            free_bytes(req.body, req.body_len);
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                unsafe {
                    free_c_string(h.key);
                    free_c_string(h.value);
                }
            }
        }
    });
}

/// Free an `FfiSoapResult` returned by `soap_process_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn soap_free_result(result: *mut FfiSoapResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            free_bytes(result.body, result.body_len);
        }
        if !result.attachments.is_null() && result.attachments_len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.attachments,
                    result.attachments_len as usize,
                ))
            };
            for item in items.iter() {
                unsafe { item.free_fields() };
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn soap_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
