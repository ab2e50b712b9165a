//! Content-type detection
//!
//! Classifies input either by filename extension (the upload path) or by
//! inspecting the text itself (the `auto` path).
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::content_type::{detect_content_type, guess_content_type, ContentType};
//!
//! assert_eq!(detect_content_type(Some("readme.MD")), ContentType::Markdown);
//! assert_eq!(detect_content_type(Some("notes")), ContentType::Text);
//! assert_eq!(guess_content_type("<h1>Hi</h1>"), ContentType::Html);
//! assert_eq!(guess_content_type("# Title"), ContentType::Markdown);
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Extensions classified as Markdown
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd"];

/// Extensions classified as HTML
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Characters that hint at Markdown syntax
const MARKDOWN_SIGILS: &[char] = &['#', '*', '_', '[', ']', '`'];

/// Kind of content handed to the pipeline
///
/// `Auto` is a request-time hint meaning "detect from the content"; the
/// detectors never return it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    Markdown,
    Text,
    Html,
    #[default]
    Auto,
}

impl ContentType {
    /// Lowercase name used in hints and logs
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
            ContentType::Html => "html",
            ContentType::Auto => "auto",
        }
    }

    /// Parse a caller-supplied hint
    ///
    /// Unrecognized hints fall back to `Auto` so the pipeline detects the
    /// type from the content instead of rejecting the request.
    ///
    /// ```rust
    /// use doc_html_converter::content_type::ContentType;
    ///
    /// assert_eq!(ContentType::from_hint("Markdown"), ContentType::Markdown);
    /// assert_eq!(ContentType::from_hint("docx"), ContentType::Auto);
    /// ```
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "text" | "txt" | "plain" => ContentType::Text,
            "html" | "htm" => ContentType::Html,
            _ => ContentType::Auto,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension of a filename: text after the last `.`, lowercased
///
/// Returns an empty string when the name has no `.` at all.
///
/// ```rust
/// use doc_html_converter::content_type::file_extension;
///
/// assert_eq!(file_extension("Notes.TXT"), "txt");
/// assert_eq!(file_extension("archive.tar.gz"), "gz");
/// assert_eq!(file_extension("README"), "");
/// ```
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Classify by filename extension
///
/// Unknown or absent names default to `Text`.
pub fn detect_content_type(filename: Option<&str>) -> ContentType {
    let Some(name) = filename else {
        return ContentType::Text;
    };
    let ext = file_extension(name);

    if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Markdown
    } else if HTML_EXTENSIONS.contains(&ext.as_str()) {
        ContentType::Html
    } else {
        ContentType::Text
    }
}

/// Whether the content contains something shaped like an HTML tag
pub fn has_html_tags(content: &str) -> bool {
    static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").ok());

    regex.as_ref().is_some_and(|regex| regex.is_match(content))
}

/// Whether the content contains any Markdown sigil
pub fn has_markdown_syntax(content: &str) -> bool {
    content.contains(MARKDOWN_SIGILS)
}

/// Classify by content
///
/// Tag presence wins over Markdown sigils, so Markdown with inline HTML is
/// classified as `Html`. Empty input is `Text`.
pub fn guess_content_type(content: &str) -> ContentType {
    if has_html_tags(content) {
        ContentType::Html
    } else if has_markdown_syntax(content) {
        ContentType::Markdown
    } else {
        ContentType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_markdown_extensions() {
        for name in ["a.md", "a.markdown", "a.mdown", "a.mkd", "readme.MD"] {
            assert_eq!(detect_content_type(Some(name)), ContentType::Markdown, "{name}");
        }
    }

    #[test]
    fn test_detect_html_extensions() {
        assert_eq!(detect_content_type(Some("index.html")), ContentType::Html);
        assert_eq!(detect_content_type(Some("INDEX.HTM")), ContentType::Html);
    }

    #[test]
    fn test_detect_defaults_to_text() {
        assert_eq!(detect_content_type(Some("notes")), ContentType::Text);
        assert_eq!(detect_content_type(Some("notes.txt")), ContentType::Text);
        assert_eq!(detect_content_type(Some("image.png")), ContentType::Text);
        assert_eq!(detect_content_type(Some("")), ContentType::Text);
        assert_eq!(detect_content_type(None), ContentType::Text);
    }

    #[test]
    fn test_file_extension_dotfile() {
        assert_eq!(file_extension(".bashrc"), "bashrc");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn test_guess_html_takes_priority() {
        assert_eq!(guess_content_type("<h1>Hi</h1>"), ContentType::Html);
        assert_eq!(guess_content_type("# Title <b>bold</b>"), ContentType::Html);
    }

    #[test]
    fn test_guess_markdown_sigils() {
        for content in ["# Title", "*em*", "snake_case", "[link]", "`code`", "a ] b"] {
            assert_eq!(guess_content_type(content), ContentType::Markdown, "{content}");
        }
    }

    #[test]
    fn test_guess_plain_text() {
        assert_eq!(guess_content_type("Hello, world."), ContentType::Text);
        assert_eq!(guess_content_type(""), ContentType::Text);
        assert_eq!(guess_content_type("a < b"), ContentType::Text);
        assert_eq!(guess_content_type("<>"), ContentType::Text);
    }

    #[test]
    fn test_hint_parsing() {
        assert_eq!(ContentType::from_hint("html"), ContentType::Html);
        assert_eq!(ContentType::from_hint(" TEXT "), ContentType::Text);
        assert_eq!(ContentType::from_hint("auto"), ContentType::Auto);
        assert_eq!(ContentType::from_hint(""), ContentType::Auto);
        assert_eq!(ContentType::Markdown.to_string(), "markdown");
    }

    proptest! {
        #[test]
        fn prop_guess_never_returns_auto(content in ".{0,64}") {
            prop_assert_ne!(guess_content_type(&content), ContentType::Auto);
        }

        #[test]
        fn prop_tagged_content_is_html(
            prefix in "[a-z #*_]{0,16}",
            tag in "[a-z][a-z0-9]{0,6}",
        ) {
            let content = format!("{prefix}<{tag}>body</{tag}>");
            prop_assert_eq!(guess_content_type(&content), ContentType::Html);
        }
    }
}
