//! Docs to HTML - document conversion library
//!
//! Converts Markdown, plain text and raw HTML into sanitized,
//! pretty-printed HTML suitable for live preview and export.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `content_type`: Content-type detection by filename or by content
//! - `markdown`: Markdown rendering using pulldown-cmark
//! - `text`: Plain-text paragraphing
//! - `parser`: HTML5 parsing and serialization using html5ever
//! - `security`: HTML sanitization policy and sanitizer
//! - `beautify`: Line-based HTML re-indentation
//! - `converter`: Pipeline orchestration and failure guards
//! - `charset`: Character encoding detection for uploaded files
//! - `upload`: File validation, description, reading and export
//!
//! # Example
//!
//! ```rust
//! use doc_html_converter::{ContentType, auto_convert_to_html, beautify_html};
//!
//! let html = auto_convert_to_html("<div><p onclick=\"x()\">Hi</p></div>", ContentType::Auto);
//! assert_eq!(beautify_html(&html), "<div>\n  <p>Hi</p>\n</div>");
//! ```
//!
//! # Safety
//!
//! Every conversion path ends in the sanitizer. Functions that publish HTML
//! (preview, export) take [`SanitizedHtml`], which only the sanitizer can
//! produce.

pub mod beautify;
pub mod charset;
pub mod content_type;
pub mod converter;
pub mod error;
pub mod markdown;
pub mod parser;
pub mod security;
pub mod text;
pub mod upload;

// Re-export main types for convenience
pub use content_type::{ContentType, detect_content_type, guess_content_type};
pub use converter::{
    Converter, auto_convert_to_html, beautify_html, markdown_to_html, sanitize_html, text_to_html,
};
pub use error::ConversionError;
pub use markdown::MarkdownOptions;
pub use security::{HtmlSanitizer, SanitizedHtml};
pub use upload::FileDescriptor;
