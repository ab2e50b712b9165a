//! Line-based HTML re-indentation
//!
//! A heuristic structural formatter, not a parser: it looks at where tags
//! start and end on each line and tracks a nesting depth from that alone.
//! It never changes tags, attributes or text, only the whitespace between
//! them, so it can run on sanitized output without affecting its safety.
//!
//! # Algorithm
//!
//! 1. Every `>` followed (after optional whitespace) by `<` is rewritten to
//!    `>` newline `<`, so each tag boundary starts a new line.
//! 2. Lines are trimmed; blank lines are dropped.
//! 3. A line starting with `</` decrements the depth (never below zero)
//!    before it is written.
//! 4. Each line is written with two spaces per depth level.
//! 5. After writing, an opening line increments the depth unless it is
//!    self-closing, a void element, a comment or doctype, or closes its own
//!    tag on the same line.
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::beautify::beautify;
//!
//! let html = beautify("<div><p>x</p></div>").unwrap();
//! assert_eq!(html, "<div>\n  <p>x</p>\n</div>");
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ConversionError;

/// Indentation unit per depth level
const INDENT: &str = "  ";

/// Elements that never have content, matched as a tag-name prefix
const VOID_TAG_PREFIXES: &[&str] = &["<br", "<hr", "<img", "<input", "<meta", "<link"];

/// Re-indent HTML by tag nesting depth
///
/// Malformed input never fails: unmatched closing tags simply floor the
/// depth at zero.
///
/// # Errors
///
/// - `ConversionError::InternalError`: the tag boundary pattern is unavailable
pub fn beautify(html: &str) -> Result<String, ConversionError> {
    static TAG_BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    let tag_boundary = TAG_BOUNDARY
        .get_or_init(|| Regex::new(r">\s*<").ok())
        .as_ref()
        .ok_or_else(|| {
            ConversionError::InternalError("tag boundary pattern failed to compile".to_string())
        })?;

    let normalized = tag_boundary.replace_all(html, ">\n<");

    let mut depth: usize = 0;
    let mut lines: Vec<String> = Vec::new();

    for line in normalized.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("</") {
            depth = depth.saturating_sub(1);
        }

        lines.push(format!("{}{}", INDENT.repeat(depth), trimmed));

        if opens_block(trimmed) {
            depth += 1;
        }
    }

    Ok(lines.join("\n"))
}

/// Whether a trimmed line leaves an element open for the following lines
fn opens_block(line: &str) -> bool {
    line.starts_with('<')
        && !line.starts_with("</")
        && !line.starts_with("<!")
        && !line.ends_with("/>")
        && !contains_void_tag(line)
        && !closes_itself(line)
}

/// Whether any void tag appears on the line, case-insensitively
fn contains_void_tag(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    VOID_TAG_PREFIXES.iter().any(|prefix| lower.contains(prefix))
}

/// Whether the line ends by closing the element it opens (`<p>x</p>`)
fn closes_itself(line: &str) -> bool {
    let name: String = line[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect();
    if name.is_empty() {
        return false;
    }

    let closing = format!("</{}>", name.to_ascii_lowercase());
    line.to_ascii_lowercase().ends_with(&closing)
}
