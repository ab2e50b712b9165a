//! Markdown rendering with GitHub-flavored defaults
//!
//! Renders Markdown to (unsanitized) HTML with pulldown-cmark. The
//! [`Converter`](crate::converter::Converter) sanitizes the result before
//! anyone sees it.
//!
//! # Rendering preset
//!
//! [`MarkdownOptions::default`] reproduces the preset the application has
//! always used:
//!
//! - **Line breaks**: a single newline inside a paragraph becomes `<br>`
//! - **GFM extensions**: tables, strikethrough, task lists and footnotes
//! - **Heading identifiers**: every heading gets a slug `id`, made unique
//!   within the document (`intro`, `intro-1`, ...)
//! - **No mangling**: literal text is emitted as written; intraword
//!   underscores stay underscores and e-mail addresses are not obfuscated
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Getting Started\nline one\nline two");
//! assert!(html.contains(r#"<h1 id="getting-started">Getting Started</h1>"#));
//! assert!(html.contains("line one<br />"));
//! ```

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashMap;

/// Markdown rendering options
///
/// Built once and shared read-only by every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Render soft line breaks as `<br>`
    pub hard_breaks: bool,
    /// Enable GitHub-flavored extensions
    pub gfm: bool,
    /// Generate slug identifiers for headings
    pub heading_ids: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            gfm: true,
            heading_ids: true,
        }
    }
}

impl MarkdownOptions {
    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

/// Markdown to HTML renderer
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

impl MarkdownRenderer {
    /// Create a renderer with the default preset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with custom options
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Options used for every render
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Render Markdown to raw HTML
    ///
    /// The output is not sanitized: raw HTML blocks in the source pass
    /// through untouched.
    pub fn render(&self, markdown: &str) -> String {
        let hard_breaks = self.options.hard_breaks;
        let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options.parser_options())
            .map(|event| match event {
                Event::SoftBreak if hard_breaks => Event::HardBreak,
                other => other,
            })
            .collect();

        if self.options.heading_ids {
            assign_heading_ids(&mut events);
        }

        let mut output = String::with_capacity(markdown.len() + markdown.len() / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }
}

/// Give every heading without an explicit id a unique slug id
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut slugger = HeadingSlugger::default();

    for index in 0..events.len() {
        if !matches!(events[index], Event::Start(Tag::Heading { .. })) {
            continue;
        }

        let text = heading_text(&events[index + 1..]);
        let slug = slugger.next_slug(&text);

        if let Event::Start(Tag::Heading { ref mut id, .. }) = events[index]
            && id.is_none()
            && !slug.is_empty()
        {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Plain text of a heading, up to its end tag
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(content) | Event::Code(content) => text.push_str(content),
            _ => {}
        }
    }
    text
}

/// Turn heading text into an identifier
///
/// Lowercases, drops punctuation and replaces each whitespace character
/// with `-`. Letters and digits from any script are kept.
///
/// ```rust
/// use doc_html_converter::markdown::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  API v2.0 "), "api-v20");
/// assert_eq!(slugify("snake_case name"), "snake_case-name");
/// ```
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Per-document slug registry that keeps heading ids unique
#[derive(Debug, Default)]
struct HeadingSlugger {
    seen: HashMap<String, usize>,
}

impl HeadingSlugger {
    fn next_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();

        let mut occurrences = 0;
        if let Some(&count) = self.seen.get(&base) {
            occurrences = count;
            loop {
                occurrences += 1;
                slug = format!("{base}-{occurrences}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
        }

        self.seen.insert(base, occurrences);
        self.seen.insert(slug.clone(), 0);
        slug
    }
}
