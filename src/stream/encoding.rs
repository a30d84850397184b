//! Character encoding detection and transcoding for export files.
//!
//! WordPress writes UTF-8 exports, but hand-edited or legacy files sometimes
//! declare another charset in the XML declaration. The declared encoding is
//! sniffed once from the head of the stream and every name, text node,
//! CDATA section and attribute value is decoded through it.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Match `<?xml version="1.0" encoding="..."?>`
#[allow(clippy::expect_used)]
static XML_DECL_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\?xml[^>]*\bencoding\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Detect character encoding from the first bytes of an export.
///
/// Only the XML declaration is consulted, within the first 1024 bytes.
/// Defaults to UTF-8 if no usable declaration is found.
#[must_use]
pub fn detect_encoding(head: &[u8]) -> &'static Encoding {
    let head = &head[..head.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    extract_declared_encoding(&head_str)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Extract the encoding label from an XML declaration.
fn extract_declared_encoding(xml: &str) -> Option<String> {
    XML_DECL_ENCODING_RE
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode raw bytes with the detected encoding.
///
/// Invalid sequences become U+FFFD rather than errors.
#[must_use]
pub fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    if encoding == UTF_8 {
        return String::from_utf8_lossy(bytes);
    }
    let (decoded, _encoding_used, _had_errors) = encoding.decode(bytes);
    decoded
}
