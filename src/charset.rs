//! Character encoding detection for uploaded files
//!
//! Uploaded documents arrive as bytes. Before conversion they are decoded
//! to UTF-8 following a three-level cascade:
//!
//! 1. **Byte Order Mark**: a UTF-8 or UTF-16 BOM decides the encoding
//! 2. **HTML Meta Tags**: for HTML files, `<meta charset>` or
//!    `<meta http-equiv="Content-Type">` in the first 1024 bytes
//! 3. **Default to UTF-8**: if both fail, use UTF-8
//!
//! Invalid byte sequences are replaced with U+FFFD rather than rejected,
//! the same way a browser's text reader behaves.
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::charset::decode_document;
//! use doc_html_converter::content_type::ContentType;
//!
//! let decoded = decode_document(b"\xEF\xBB\xBF# Title", ContentType::Markdown);
//! assert_eq!(decoded.text, "# Title");
//! assert_eq!(decoded.encoding, "UTF-8");
//!
//! let latin1 = b"<meta charset=\"iso-8859-1\"><p>caf\xE9</p>";
//! let decoded = decode_document(latin1, ContentType::Html);
//! assert_eq!(decoded.text, "<meta charset=\"iso-8859-1\"><p>caf\u{e9}</p>");
//! ```

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::OnceLock;

use crate::content_type::ContentType;

/// Maximum bytes to scan for meta charset tags (first 1024 bytes)
const META_SCAN_LIMIT: usize = 1024;

/// Result of decoding an uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded content
    pub text: String,
    /// Canonical name of the encoding that was used
    pub encoding: &'static str,
    /// Whether invalid sequences were replaced
    pub lossy: bool,
}

/// Pick the encoding for a document and the number of BOM bytes to skip
pub fn detect_encoding(bytes: &[u8], content_type: ContentType) -> (&'static Encoding, usize) {
    // Level 1: Byte order mark
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return (encoding, bom_length);
    }

    // Level 2: HTML meta charset (only meaningful for HTML documents)
    if content_type == ContentType::Html
        && let Some(label) = extract_charset_from_html(bytes)
    {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => return (encoding, 0),
            None => tracing::warn!(charset = %label, "unsupported charset in meta tag, using UTF-8"),
        }
    }

    // Level 3: Default to UTF-8
    (UTF_8, 0)
}

/// Decode uploaded bytes to a string
pub fn decode_document(bytes: &[u8], content_type: ContentType) -> DecodedText {
    let (encoding, bom_length) = detect_encoding(bytes, content_type);
    let (text, lossy) = encoding.decode_without_bom_handling(&bytes[bom_length..]);

    if lossy {
        tracing::warn!(
            encoding = encoding.name(),
            "document contains invalid byte sequences; replaced with U+FFFD"
        );
    }

    DecodedText {
        text: text.into_owned(),
        encoding: encoding.name(),
        lossy,
    }
}

/// Extract charset from HTML meta tags
///
/// Scans the HTML content for charset declarations in meta tags.
///
/// # Supported Formats
///
/// - HTML5: `<meta charset="UTF-8">`
/// - HTML4: `<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">`
///
/// # Performance
///
/// Only scans the first 1024 bytes of HTML.
///
/// # Examples
///
/// ```rust
/// use doc_html_converter::charset::extract_charset_from_html;
///
/// let html = b"<html><head><meta charset=\"UTF-8\"></head></html>";
/// assert_eq!(extract_charset_from_html(html), Some("UTF-8".to_string()));
///
/// let html = b"<html><body>No charset</body></html>";
/// assert_eq!(extract_charset_from_html(html), None);
/// ```
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let scan_limit = std::cmp::min(html.len(), META_SCAN_LIMIT);
    let html_prefix = &html[..scan_limit];

    // Lossy conversion is OK for meta tag detection
    let html_str = String::from_utf8_lossy(html_prefix);

    static HTML5_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html5_regex =
        HTML5_REGEX.get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#).ok());
    let html5_regex = html5_regex.as_ref()?;

    if let Some(caps) = html5_regex.captures(&html_str)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    static HTML4_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html4_regex = HTML4_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
        )
        .ok()
    });
    let html4_regex = html4_regex.as_ref()?;

    if let Some(caps) = html4_regex.captures(&html_str)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    None
}
