//! Verify request building and response extraction against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each vector file lists named cases with their inputs and expected
//! outputs. Expected values are compared as `serde_json::Value` so key order
//! in the fixtures does not matter.

use serde_json::Value;
use soap_http_core::{
    extract_envelope, parse_attachments, AttachmentMap, HttpMethod, Payload, RequestBuilder,
    TransportOptions,
};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn header_pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/request.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let builder = RequestBuilder::default();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let payload = case["payload"].as_str().map(Payload::from);
        let extra_headers = header_pairs(&case["extra_headers"]);
        let extra_options: TransportOptions =
            serde_json::from_value(case["extra_options"].clone()).unwrap();
        let expected = &case["expected_request"];

        let req = builder
            .build(case["url"].as_str().unwrap(), payload.as_ref(), &extra_headers, &extra_options)
            .unwrap();

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, expected["path"].as_str().unwrap(), "{name}: path");
        assert_eq!(req.secure, expected["secure"].as_bool().unwrap(), "{name}: secure");

        for (key, value) in expected["headers"].as_object().unwrap() {
            assert_eq!(req.header(key), value.as_str(), "{name}: header {key}");
        }
        for key in expected["absent_headers"].as_array().unwrap() {
            let key = key.as_str().unwrap();
            assert!(req.header(key).is_none(), "{name}: header {key} should be absent");
        }

        let expected_body = expected["body"].as_str().map(Payload::from);
        assert_eq!(req.body, expected_body, "{name}: body");
        assert_eq!(Value::Object(req.options), expected["options"], "{name}: options");
    }
}

// ---------------------------------------------------------------------------
// Envelope extraction
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();

        let extracted = extract_envelope(body);
        assert_eq!(extracted, expected, "{name}: extracted");
        assert_eq!(extract_envelope(extracted), extracted, "{name}: idempotent");
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[test]
fn attachment_test_vectors() {
    let raw = include_str!("../../test-vectors/attachments.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let headers = vec![(
            "Content-Type".to_string(),
            case["content_type"].as_str().unwrap().to_string(),
        )];
        let body = case["body"].as_str().unwrap();

        let attachments = parse_attachments(&headers, body);
        let expected: AttachmentMap = serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(attachments, expected, "{name}: attachments");
    }
}
