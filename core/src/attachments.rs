//! MTOM attachment discovery and extraction.
//!
//! # Design
//! An MTOM response is a `multipart/related` body: one XML part holding the
//! envelope, whose `xop:Include` elements point at binary parts by
//! content-id, followed by one part per binary. Parsing is a lenient scrape,
//! not a MIME validator:
//!
//! 1. No `boundary=` parameter in `Content-Type` means no attachments, and
//!    nothing else is inspected.
//! 2. Every `xop:Include href="cid:..."` in the body seeds an entry with no
//!    MIME type and no data. No references means no splitting.
//! 3. The body is split on the boundary token and the preamble dropped. A
//!    part whose `Content-Id` names a seeded entry fills in its MIME type and
//!    data. Other parts are ignored.
//!
//! Nothing here returns an error. Entries that never match a part keep
//! `None` fields, so callers can report a missing attachment without losing
//! the rest of the call.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::http::header_value;

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bboundary\s*=\s*(?:"([^"]*)"|([^;\s]+))"#).expect("boundary regex is valid")
});

static XOP_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<xop:Include\b[^>]*?\bhref\s*=\s*["']cid:([\w@.\-]+)["'][^>]*>"#)
        .expect("xop:Include regex is valid")
});

static PART_CONTENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Content-Id:[ \t]*<([^>\r\n]+)>").expect("Content-Id regex is valid")
});

static PART_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Content-Type:[ \t]*([^\s;]+)").expect("Content-Type regex is valid")
});

/// A binary part referenced from the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_id: String,
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

impl Attachment {
    fn unresolved(content_id: &str) -> Self {
        Self {
            content_id: content_id.to_string(),
            mime_type: None,
            data: None,
        }
    }
}

/// Attachments of one response, keyed by content-id.
pub type AttachmentMap = HashMap<String, Attachment>;

/// Extract the attachments of a textual response body.
pub fn parse_attachments(headers: &[(String, String)], body: &str) -> AttachmentMap {
    let Some(boundary) = header_value(headers, "Content-Type").and_then(multipart_boundary) else {
        return AttachmentMap::new();
    };

    let mut attachments = discover_references(body);
    if attachments.is_empty() {
        return attachments;
    }

    for part in body.split(boundary).skip(1) {
        let Some(content_id) = PART_CONTENT_ID.captures(part).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(attachment) = attachments.get_mut(&content_id) else {
            trace!(%content_id, "ignoring part without a matching xop:Include");
            continue;
        };
        if let Some(mime) = PART_CONTENT_TYPE.captures(part) {
            attachment.mime_type = Some(mime[1].to_string());
        }
        attachment.data = part_payload(part).map(str::to_string);
    }

    debug!(
        boundary,
        referenced = attachments.len(),
        resolved = attachments.values().filter(|a| a.data.is_some()).count(),
        "parsed MTOM attachments"
    );
    attachments
}

/// The `boundary` parameter of a `Content-Type` value, without quotes.
/// Empty boundaries count as absent.
pub fn multipart_boundary(content_type: &str) -> Option<&str> {
    let captures = BOUNDARY.captures(content_type)?;
    let boundary = captures.get(1).or_else(|| captures.get(2))?.as_str();
    (!boundary.is_empty()).then_some(boundary)
}

/// Seed one unresolved entry per distinct `xop:Include` content-id in
/// `body`.
pub fn discover_references(body: &str) -> AttachmentMap {
    let mut attachments = AttachmentMap::new();
    for captures in XOP_INCLUDE.captures_iter(body) {
        let content_id = &captures[1];
        attachments
            .entry(content_id.to_string())
            .or_insert_with(|| Attachment::unresolved(content_id));
    }
    attachments
}

/// The payload line of a multipart part, by position.
///
/// Assumes the layout produced by common MTOM stacks once the body is split
/// on the bare boundary token: the rest of the delimiter line, `Content-Type`,
/// `Content-Id`, a blank line, then the payload on line 4. When line 4 is
/// blank (one extra part header shifted everything down) line 5 is used.
/// Line endings are CRLF when the part contains any, bare LF otherwise.
pub fn part_payload(part: &str) -> Option<&str> {
    let lines: Vec<&str> = if part.contains("\r\n") {
        part.split("\r\n").collect()
    } else {
        part.split('\n').collect()
    };
    match lines.get(4) {
        Some(line) if line.is_empty() => lines.get(5).copied(),
        line => line.copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(value: &str) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), value.to_string())]
    }

    fn mtom_body() -> String {
        [
            "--XYZ",
            "Content-Type: application/xop+xml; charset=UTF-8; type=\"text/xml\"",
            "Content-Id: <root.message@example.com>",
            "",
            "<s:Envelope><s:Body><img><xop:Include href=\"cid:att1\"></xop:Include></img></s:Body></s:Envelope>",
            "--XYZ",
            "Content-Type: image/png",
            "Content-Id: <att1>",
            "",
            "BINARYDATA",
            "--XYZ--",
        ]
        .join("\r\n")
    }

    #[test]
    fn resolves_referenced_part() {
        let headers = content_type("multipart/related; boundary=XYZ; type=\"application/xop+xml\"");
        let attachments = parse_attachments(&headers, &mtom_body());
        assert_eq!(attachments.len(), 1);
        let att = &attachments["att1"];
        assert_eq!(att.content_id, "att1");
        assert_eq!(att.mime_type.as_deref(), Some("image/png"));
        assert_eq!(att.data.as_deref(), Some("BINARYDATA"));
    }

    #[test]
    fn no_boundary_means_no_attachments() {
        let body = "<xop:Include href=\"cid:img1@example.com\"></xop:Include>";
        assert!(parse_attachments(&content_type("text/xml; charset=utf-8"), body).is_empty());
        assert!(parse_attachments(&[], body).is_empty());
        assert!(parse_attachments(&content_type("multipart/related; boundary=;"), body).is_empty());
    }

    #[test]
    fn discovery_alone_ignores_headers() {
        let body = "<xop:Include href=\"cid:img1@example.com\"></xop:Include>";
        let found = discover_references(body);
        assert_eq!(found["img1@example.com"], Attachment::unresolved("img1@example.com"));
    }

    #[test]
    fn unmatched_reference_keeps_empty_fields() {
        let body = mtom_body().replace("cid:att1", "cid:att1\"></xop:Include><xop:Include href=\"cid:missing-2");
        let attachments = parse_attachments(&content_type("multipart/related; boundary=XYZ;"), &body);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments["missing-2"], Attachment::unresolved("missing-2"));
        assert_eq!(attachments["att1"].data.as_deref(), Some("BINARYDATA"));
    }

    #[test]
    fn no_references_skips_splitting() {
        let body = "--XYZ\r\nContent-Type: image/png\r\nContent-Id: <att1>\r\n\r\nDATA\r\n--XYZ--";
        assert!(parse_attachments(&content_type("multipart/related; boundary=XYZ;"), body).is_empty());
    }

    #[test]
    fn bare_lf_parts() {
        let body = mtom_body().replace("\r\n", "\n");
        let attachments = parse_attachments(&content_type("multipart/related;boundary=XYZ"), &body);
        assert_eq!(attachments["att1"].data.as_deref(), Some("BINARYDATA"));
    }

    #[test]
    fn extra_part_header_shifts_payload() {
        let body = [
            "--uuid:0a1b",
            "<s:Envelope><xop:Include xmlns:xop=\"http://www.w3.org/2004/08/xop/include\" href=\"cid:doc@svc\"/></s:Envelope>",
            "--uuid:0a1b",
            "Content-Id: <doc@svc>",
            "Content-Type: application/pdf",
            "Content-Transfer-Encoding: binary",
            "",
            "%PDF-1.4",
            "--uuid:0a1b--",
        ]
        .join("\r\n");
        let headers = content_type("multipart/related; type=\"application/xop+xml\"; boundary=\"uuid:0a1b\"; start-info=\"text/xml\"");
        let attachments = parse_attachments(&headers, &body);
        assert_eq!(attachments["doc@svc"].mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(attachments["doc@svc"].data.as_deref(), Some("%PDF-1.4"));
    }

    #[test]
    fn duplicate_references_collapse() {
        let body = "<xop:Include href=\"cid:a\"></xop:Include><XOP:INCLUDE href=\"cid:a\"></XOP:INCLUDE>";
        assert_eq!(discover_references(body).len(), 1);
    }

    #[test]
    fn boundary_variants() {
        assert_eq!(multipart_boundary("multipart/related; boundary=XYZ;"), Some("XYZ"));
        assert_eq!(multipart_boundary("multipart/related; boundary=XYZ"), Some("XYZ"));
        assert_eq!(multipart_boundary("multipart/related; BOUNDARY=\"uuid:1-2\""), Some("uuid:1-2"));
        assert_eq!(multipart_boundary("multipart/related; boundary=\"\""), None);
        assert_eq!(multipart_boundary("text/xml"), None);
    }

    #[test]
    fn short_parts_yield_no_payload() {
        assert_eq!(part_payload("\r\nContent-Id: <a>\r\n"), None);
        assert_eq!(part_payload("\n1\n2\n3\n"), None);
        assert_eq!(part_payload("\n1\n2\n3\n\nDATA"), Some("DATA"));
    }
}
