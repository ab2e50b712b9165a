//! Conversion pipeline - routes content to a converter and sanitizes it
//!
//! This module ties the content-type detector, the three format converters,
//! the sanitizer and the beautifier together.
//!
//! # Pipeline
//!
//! ```text
//! content + hint ─▶ route ─▶ markdown | text | html ─▶ sanitize ─▶ (beautify)
//! ```
//!
//! - `ContentType::Html` goes straight to the sanitizer
//! - `ContentType::Markdown` is rendered with pulldown-cmark, then sanitized
//! - `ContentType::Text` is split into paragraphs, then sanitized
//! - `ContentType::Auto` is resolved from the content first: HTML tags win
//!   over Markdown sigils, and anything else is plain text
//!
//! Beautifying is opt-in through [`Converter::render`]; the routing step
//! alone ([`Converter::convert`]) returns the sanitized markup unchanged.
//!
//! # Failure handling
//!
//! Conversion never fails from the caller's point of view. Each stage runs
//! inside a guard that catches both errors and panics, logs them with
//! `tracing`, and returns a safe fallback:
//!
//! | Stage      | Fallback                |
//! |------------|-------------------------|
//! | converters | empty string            |
//! | sanitizer  | empty string            |
//! | beautifier | the unmodified input    |
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::converter::Converter;
//! use doc_html_converter::content_type::ContentType;
//!
//! let converter = Converter::new();
//!
//! let html = converter.convert("<h1>Hi</h1><script>x()</script>", ContentType::Auto);
//! assert_eq!(html.as_str(), "<h1>Hi</h1>");
//!
//! let pretty = converter.render("Hello\n\nWorld", ContentType::Text, true);
//! assert_eq!(pretty.as_str(), "<p>Hello</p>\n<p>World</p>");
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use crate::beautify::beautify;
use crate::content_type::{ContentType, guess_content_type};
use crate::error::ConversionError;
use crate::markdown::{MarkdownOptions, MarkdownRenderer};
use crate::security::{HtmlSanitizer, SanitizedHtml};
use crate::text::render_text;

/// Run a fallible stage, degrading to `fallback` on error or panic
fn guarded<T>(
    stage: &'static str,
    fallback: impl FnOnce() -> T,
    body: impl FnOnce() -> Result<T, ConversionError>,
) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::error!(stage, code = e.code(), error = %e, "conversion stage failed");
            fallback()
        }
        Err(_) => {
            tracing::error!(stage, "conversion stage panicked");
            fallback()
        }
    }
}

/// Document conversion pipeline
///
/// Holds the Markdown rendering options and the sanitizer policy. Both are
/// fixed at construction; a `Converter` is read-only afterwards and can be
/// shared freely, including across threads.
///
/// # Usage
///
/// ```rust
/// use doc_html_converter::converter::Converter;
/// use doc_html_converter::markdown::MarkdownOptions;
///
/// // Default preset (line breaks, GFM, heading ids)
/// let converter = Converter::new();
///
/// // Or with custom options
/// let converter = Converter::with_options(MarkdownOptions {
///     heading_ids: false,
///     ..Default::default()
/// });
/// assert_eq!(converter.markdown_to_html("# Title").as_str(), "<h1>Title</h1>\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    renderer: MarkdownRenderer,
    sanitizer: HtmlSanitizer,
}

impl Converter {
    /// Create a converter with the default Markdown preset and sanitizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom Markdown options
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(options),
            sanitizer: HtmlSanitizer::new(),
        }
    }

    /// Replace the sanitizer policy
    pub fn with_sanitizer(mut self, sanitizer: HtmlSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Markdown options this converter was built with
    pub fn markdown_options(&self) -> &MarkdownOptions {
        self.renderer.options()
    }

    /// Render Markdown and sanitize the result
    pub fn markdown_to_html(&self, markdown: &str) -> SanitizedHtml {
        if markdown.is_empty() {
            return SanitizedHtml::default();
        }

        guarded("markdown", SanitizedHtml::default, || {
            let raw = self.renderer.render(markdown);
            self.sanitizer.sanitize(&raw)
        })
    }

    /// Paragraph plain text and sanitize the result
    pub fn text_to_html(&self, text: &str) -> SanitizedHtml {
        if text.is_empty() {
            return SanitizedHtml::default();
        }

        guarded("text", SanitizedHtml::default, || {
            let raw = render_text(text)?;
            self.sanitizer.sanitize(&raw)
        })
    }

    /// Sanitize raw HTML
    pub fn sanitize_html(&self, html: &str) -> SanitizedHtml {
        if html.is_empty() {
            return SanitizedHtml::default();
        }

        guarded("sanitize", SanitizedHtml::default, || {
            self.sanitizer.sanitize(html)
        })
    }

    /// Re-indent already sanitized HTML
    ///
    /// Beautifying only rewrites whitespace between tags, so the result is
    /// still sanitized.
    pub fn beautify(&self, html: &SanitizedHtml) -> SanitizedHtml {
        SanitizedHtml::from_sanitized(beautify_html(html.as_str()))
    }

    /// Resolve the content type that will actually be used for a hint
    pub fn resolve_content_type(&self, content: &str, hint: ContentType) -> ContentType {
        match hint {
            ContentType::Auto => guess_content_type(content),
            explicit => explicit,
        }
    }

    /// Route content to its converter
    ///
    /// Empty content returns empty output without running any converter.
    pub fn convert(&self, content: &str, hint: ContentType) -> SanitizedHtml {
        if content.is_empty() {
            return SanitizedHtml::default();
        }

        let content_type = self.resolve_content_type(content, hint);
        tracing::debug!(
            hint = %hint,
            resolved = %content_type,
            bytes = content.len(),
            "routing content"
        );

        match content_type {
            ContentType::Html => self.sanitize_html(content),
            ContentType::Markdown => self.markdown_to_html(content),
            ContentType::Text | ContentType::Auto => self.text_to_html(content),
        }
    }

    /// Convert and optionally beautify, ready for preview or export
    pub fn render(&self, content: &str, hint: ContentType, beautify: bool) -> SanitizedHtml {
        let html = self.convert(content, hint);
        if beautify { self.beautify(&html) } else { html }
    }
}

/// Process-wide converter built from the default preset on first use
pub fn default_converter() -> &'static Converter {
    static DEFAULT: OnceLock<Converter> = OnceLock::new();
    DEFAULT.get_or_init(Converter::new)
}

/// Convert Markdown to sanitized HTML using the default preset
///
/// Returns an empty string for empty input or on internal failure.
pub fn markdown_to_html(markdown: &str) -> String {
    default_converter().markdown_to_html(markdown).into_string()
}

/// Convert plain text to sanitized HTML paragraphs
///
/// Returns an empty string for empty input or on internal failure.
pub fn text_to_html(text: &str) -> String {
    default_converter().text_to_html(text).into_string()
}

/// Sanitize untrusted HTML
///
/// Returns an empty string for empty input or on internal failure.
pub fn sanitize_html(html: &str) -> String {
    default_converter().sanitize_html(html).into_string()
}

/// Re-indent HTML by tag nesting
///
/// Returns the input unchanged on internal failure.
pub fn beautify_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    guarded("beautify", || html.to_string(), || beautify(html))
}

/// Detect (for `Auto`) and convert content to sanitized HTML
///
/// Callers that want indented output apply [`beautify_html`] themselves.
pub fn auto_convert_to_html(content: &str, hint: ContentType) -> String {
    default_converter().convert(content, hint).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_guarded_returns_value() {
        let value = guarded("test", || 0, || Ok(7));
        assert_eq!(value, 7);
    }

    #[test]
    fn test_guarded_falls_back_on_error() {
        let value = guarded("test", || "fallback".to_string(), || {
            Err(ConversionError::InternalError("boom".to_string()))
        });
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_guarded_falls_back_on_panic() {
        let value: String = guarded("test", String::new, || panic!("boom"));
        assert_eq!(value, "");
    }

    #[test]
    fn test_markdown_heading() {
        let html = markdown_to_html("# Title");
        assert_eq!(html, "<h1 id=\"title\">Title</h1>\n");
    }

    #[test]
    fn test_markdown_raw_html_is_sanitized() {
        let html = markdown_to_html("Hello <img src=x onerror=alert(1)>\n\n<script>alert(2)</script>");
        assert!(!html.contains("onerror"), "{html}");
        assert!(!html.contains("<script"), "{html}");
        assert!(html.contains("<img src=\"x\">"), "{html}");
    }

    #[test]
    fn test_markdown_javascript_link_is_neutralized() {
        let html = markdown_to_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"), "{html}");
        assert!(html.contains("click"), "{html}");
    }

    #[test]
    fn test_text_paragraphs() {
        assert_eq!(text_to_html(""), "");
        assert_eq!(text_to_html("a\n\nb"), "<p>a</p>\n<p>b</p>");
        assert_eq!(text_to_html("a\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn test_text_with_markup_is_sanitized() {
        let html = text_to_html("hello <script>alert(1)</script>\nworld");
        assert_eq!(html, "<p>hello <br>world</p>");
    }

    #[test]
    fn test_sanitize_html_empty() {
        assert_eq!(sanitize_html(""), "");
    }

    #[test]
    fn test_beautify_html_example() {
        assert_eq!(beautify_html("<div><p>x</p></div>"), "<div>\n  <p>x</p>\n</div>");
        assert_eq!(beautify_html("</p>"), "</p>");
        assert_eq!(beautify_html(""), "");
    }

    #[test]
    fn test_auto_routes_tags_to_html() {
        // No Markdown sigils, but tags present: the sanitizer path keeps the markup
        assert_eq!(auto_convert_to_html("<h1>Hi</h1>", ContentType::Auto), "<h1>Hi</h1>");
    }

    #[test]
    fn test_auto_markdown_with_inline_html_goes_to_html_path() {
        let html = auto_convert_to_html("# Title <b>x</b>", ContentType::Auto);
        assert_eq!(html, "# Title <b>x</b>");
    }

    #[test]
    fn test_auto_routes_sigils_to_markdown() {
        let html = auto_convert_to_html("# Title", ContentType::Auto);
        assert!(html.starts_with("<h1"), "{html}");
    }

    #[test]
    fn test_auto_routes_rest_to_text() {
        assert_eq!(auto_convert_to_html("plain words", ContentType::Auto), "<p>plain words</p>");
    }

    #[test]
    fn test_explicit_hint_overrides_detection() {
        assert_eq!(auto_convert_to_html("# not a heading", ContentType::Text), "<p># not a heading</p>");
        assert_eq!(auto_convert_to_html("*raw*", ContentType::Html), "*raw*");
    }

    #[test]
    fn test_empty_content_for_every_hint() {
        for hint in [ContentType::Auto, ContentType::Markdown, ContentType::Text, ContentType::Html] {
            assert_eq!(auto_convert_to_html("", hint), "", "{hint}");
        }
    }

    #[test]
    fn test_render_beautifies_on_request() {
        let converter = Converter::new();
        let flat = converter.render("<div><p>x</p></div>", ContentType::Html, false);
        let pretty = converter.render("<div><p>x</p></div>", ContentType::Html, true);
        assert_eq!(flat.as_str(), "<div><p>x</p></div>");
        assert_eq!(pretty.as_str(), "<div>\n  <p>x</p>\n</div>");
    }

    #[test]
    fn test_resolve_content_type() {
        let converter = Converter::new();
        assert_eq!(converter.resolve_content_type("x", ContentType::Auto), ContentType::Text);
        assert_eq!(converter.resolve_content_type("<p>", ContentType::Markdown), ContentType::Markdown);
    }

    #[test]
    fn test_default_converter_is_shared() {
        assert!(std::ptr::eq(default_converter(), default_converter()));
    }

    #[test]
    fn test_converter_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    proptest! {
        #[test]
        fn prop_auto_convert_never_panics(content in "\\PC{0,128}") {
            for hint in [ContentType::Auto, ContentType::Markdown, ContentType::Text, ContentType::Html] {
                let _ = auto_convert_to_html(&content, hint);
            }
        }
    }
}
