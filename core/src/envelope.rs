//! SOAP envelope isolation.
//!
//! # Design
//! Servers regularly surround the envelope with noise: stray whitespace,
//! HTML error fragments, MIME part headers. `extract_envelope` keeps only the
//! outermost `<prefix:Envelope ...>...</prefix:Envelope>` span, optionally
//! preceded by an `<?xml ...?>` declaration. The closing tag must repeat the
//! prefix of the opening tag, which is why this is a hand-written scanner and
//! not a `regex` pattern (the crate has no backreferences).
//!
//! Matching is ASCII case-insensitive on `Envelope`, on the prefix and on the
//! `xml` declaration target. The closing tag is the first one after the
//! opening tag. When nothing matches, the body is returned unchanged.

use std::ops::Range;

use tracing::trace;

const ENVELOPE: &[u8] = b"envelope";

/// Return the envelope span of `body`, or `body` itself when there is none.
///
/// The result is a sub-slice of the input, so applying this twice yields the
/// same string as applying it once.
pub fn extract_envelope(body: &str) -> &str {
    match find_envelope(body) {
        Some(span) => &body[span],
        None => {
            trace!(len = body.len(), "no SOAP envelope found, passing body through");
            body
        }
    }
}

/// Byte range of the envelope (including a directly preceding XML
/// declaration) inside `body`.
pub fn find_envelope(body: &str) -> Option<Range<usize>> {
    let mut from = 0;
    while let Some(offset) = body[from..].find('<') {
        let open = from + offset;
        from = open + 1;

        let Some((prefix, content_start)) = envelope_open_tag(body, open) else {
            continue;
        };
        let Some(end) = envelope_close_tag(body, content_start, prefix) else {
            continue;
        };
        let start = declaration_start(body, open).unwrap_or(open);
        return Some(start..end);
    }
    None
}

/// Parse `<prefix:Envelope` at `open`. Returns the prefix and the index just
/// past the tag name.
fn envelope_open_tag(body: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = body.as_bytes();
    let prefix_start = open + 1;
    let prefix_len = name_len(&bytes[prefix_start..]);
    if prefix_len == 0 {
        return None;
    }
    let colon = prefix_start + prefix_len;
    if bytes.get(colon) != Some(&b':') {
        return None;
    }
    let name_end = colon + 1 + ENVELOPE.len();
    if !bytes
        .get(colon + 1..name_end)?
        .eq_ignore_ascii_case(ENVELOPE)
    {
        return None;
    }
    match bytes.get(name_end) {
        Some(b'>' | b'/') => {}
        Some(b) if b.is_ascii_whitespace() => {}
        _ => return None,
    }
    Some((&body[prefix_start..colon], name_end))
}

/// Find the first `</prefix:Envelope>` at or after `from`. Returns the index
/// just past its `>`.
fn envelope_close_tag(body: &str, from: usize, prefix: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut search = from;
    while let Some(offset) = body[search..].find("</") {
        let tag = search + offset + 2;
        search = tag;

        let colon = tag + prefix.len();
        let name_end = colon + 1 + ENVELOPE.len();
        let matches = bytes
            .get(tag..colon)
            .is_some_and(|p| p.eq_ignore_ascii_case(prefix.as_bytes()))
            && bytes.get(colon) == Some(&b':')
            && bytes
                .get(colon + 1..name_end)
                .is_some_and(|n| n.eq_ignore_ascii_case(ENVELOPE))
            && bytes.get(name_end) == Some(&b'>');
        if matches {
            return Some(name_end + 1);
        }
    }
    None
}

/// Start of an `<?xml ...?>` declaration separated from `open` only by
/// whitespace.
fn declaration_start(body: &str, open: usize) -> Option<usize> {
    let before = body[..open].trim_end();
    let before = before.strip_suffix("?>")?;
    let decl_open = before.rfind("<?")?;
    let target = &before[decl_open + 2..];
    if target.contains('?') {
        return None;
    }
    let is_xml = target
        .as_bytes()
        .get(..3)
        .is_some_and(|t| t.eq_ignore_ascii_case(b"xml"));
    is_xml.then_some(decl_open)
}

/// Length of the XML name prefix of `bytes`, without colons.
fn name_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        .count()
}
