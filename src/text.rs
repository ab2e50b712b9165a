//! Plain-text paragraphing
//!
//! Blank lines separate paragraphs; single newlines inside a paragraph
//! become `<br>`. Paragraphs that are empty or whitespace-only are dropped
//! entirely.
//!
//! ```rust
//! use doc_html_converter::text::render_text;
//!
//! let html = render_text("first line\nsecond line\n\n\n\nnext paragraph").unwrap();
//! assert_eq!(html, "<p>first line<br>second line</p>\n<p>next paragraph</p>");
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ConversionError;

/// Wrap plain-text paragraphs in `<p>` elements
///
/// Text is not escaped here; the converter's sanitizer pass is what makes
/// the result safe to render.
///
/// # Errors
///
/// - `ConversionError::InternalError`: the paragraph pattern is unavailable
pub fn render_text(text: &str) -> Result<String, ConversionError> {
    static PARAGRAPH_BREAK: OnceLock<Option<Regex>> = OnceLock::new();
    let paragraph_break = PARAGRAPH_BREAK
        .get_or_init(|| Regex::new(r"\n{2,}").ok())
        .as_ref()
        .ok_or_else(|| {
            ConversionError::InternalError("paragraph break pattern failed to compile".to_string())
        })?;

    let normalized = text.replace("\r\n", "\n");

    let paragraphs: Vec<String> = paragraph_break
        .split(&normalized)
        .filter(|paragraph| !paragraph.trim().is_empty())
        .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', "<br>")))
        .collect();

    Ok(paragraphs.join("\n"))
}
