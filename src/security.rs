//! Security sanitization for rendered HTML
//!
//! Every string this crate hands to a preview or an export file passes
//! through [`HtmlSanitizer`] last. This module implements the policy that
//! prevents:
//! - XSS (Cross-Site Scripting) through script elements
//! - Code injection through event handler attributes
//! - Script execution through `javascript:`-style URLs
//! - Script execution through legacy CSS vectors (`expression()`, bindings)
//!
//! # Threat Model
//!
//! The primary threat is **untrusted document input** typed, pasted or
//! uploaded by a user and later rendered as live HTML. Raw HTML input is
//! untrusted by definition, and Markdown may embed raw HTML. This HTML may
//! contain:
//! - Malicious scripts (`<script>` tags)
//! - Event handlers (onclick, onload, etc.)
//! - JavaScript URLs (javascript:)
//! - Data URLs with executable content
//! - Embedded browsing contexts (iframe, object, embed)
//!
//! # Defense Layers
//!
//! 1. **Tree Parsing**: Markup is parsed with html5ever so the checks see the
//!    same tree a browser would build, not a textual approximation
//! 2. **Element Sanitization**: Remove dangerous elements with their subtree
//! 3. **Attribute Sanitization**: Remove event handlers, `srcdoc` and
//!    `http-equiv`
//! 4. **URL Sanitization**: Remove URL attributes with script-capable schemes
//! 5. **Style Sanitization**: Remove `style` attributes with script vectors
//! 6. **Depth Limiting**: Drop content nested deeper than the configured limit
//!
//! The output is the html5ever serialization of the cleaned tree. Parsing
//! that output again yields the same tree, so sanitizing is idempotent.

use html5ever::tendril::StrTendril;
use std::rc::Rc;
use markup5ever_rcdom::{Handle, NodeData};

use crate::error::ConversionError;
use crate::parser::{parse_html, serialize_document_content};

/// Maximum allowed nesting depth for HTML elements
/// Prevents stack overflow from deeply nested structures
const MAX_NESTING_DEPTH: usize = 1000;

/// Dangerous HTML elements that are removed together with their content
const DANGEROUS_ELEMENTS: &[&str] = &[
    "script",    // JavaScript execution
    "style",     // CSS injection (can contain expressions)
    "noscript",  // Raw-text content re-parsed differently with scripting off
    "iframe",    // Can load external content
    "frame",     // Legacy framesets
    "frameset",  // Legacy framesets
    "object",    // Can execute plugins
    "embed",     // Can execute plugins
    "applet",    // Legacy Java applets
    "link",      // Can load external stylesheets with expressions
    "base",      // Can change base URL for all relative URLs
    "meta",      // http-equiv refresh can navigate to script URLs
    "template",  // Inert content that scripts can later activate
    "svg",       // Foreign content with its own script and animation vectors
    "math",      // Foreign content with namespace-confusion vectors
    "noembed",   // Raw-text element
    "noframes",  // Raw-text element
    "xmp",       // Raw-text element
    "plaintext", // Raw-text element
    "portal",    // Embedded browsing context
];

/// Attributes whose value is interpreted as a URL
const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "xlink:href",
    "src",
    "action",
    "formaction",
    "data",
    "poster",
    "background",
    "cite",
    "srcset",
    "lowsrc",
    "dynsrc",
    "ping",
];

/// Attributes removed regardless of their value
const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "srcdoc",     // Inline document for iframes
    "http-equiv", // Pragma directives
];

/// Dangerous URL schemes that should be blocked
const DANGEROUS_URL_SCHEMES: &[&str] = &[
    "javascript:", // JavaScript execution
    "vbscript:",   // VBScript execution (legacy IE)
    "livescript:", // Netscape-era alias
    "data:",       // Can contain executable content
];

/// Elements allowed to reference inline images through `data:image/`
const DATA_IMAGE_ELEMENTS: &[&str] = &["img", "source"];

/// Substrings that make a `style` attribute executable in some engine
const DANGEROUS_STYLE_PATTERNS: &[&str] = &[
    "expression(",
    "javascript:",
    "vbscript:",
    "-moz-binding",
    "behavior:",
    "behaviour:",
    "@import",
];

/// Elements whose leading newline the parser swallows
const NEWLINE_ELIDING_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Action to take when sanitizing an element or attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Allow as-is
    Allow,
    /// Remove the element and all its children
    Remove,
    /// Strip the attribute but keep the element
    StripAttribute,
    /// Strip an attribute carrying a dangerous URL
    StripUrl,
}

/// Security policy for HTML elements and attributes
///
/// Provides the individual checks used by [`HtmlSanitizer`].
#[derive(Debug, Clone)]
pub struct SecurityValidator {
    /// Maximum allowed nesting depth
    max_depth: usize,
}

impl SecurityValidator {
    /// Create a new security validator with default settings
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Create a security validator with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Check if an element should be removed
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::{SecurityValidator, SanitizeAction};
    ///
    /// let validator = SecurityValidator::new();
    /// assert_eq!(validator.check_element("script"), SanitizeAction::Remove);
    /// assert_eq!(validator.check_element("div"), SanitizeAction::Allow);
    /// ```
    pub fn check_element(&self, tag_name: &str) -> SanitizeAction {
        if DANGEROUS_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str()) {
            SanitizeAction::Remove
        } else {
            SanitizeAction::Allow
        }
    }

    /// Check if an attribute is an inline event handler
    ///
    /// Any `on*` attribute counts: browsers keep adding new events, so a
    /// fixed list would go stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert!(validator.is_event_handler("onclick"));
    /// assert!(validator.is_event_handler("onpointerrawupdate"));
    /// assert!(!validator.is_event_handler("href"));
    /// ```
    pub fn is_event_handler(&self, attr_name: &str) -> bool {
        attr_name.len() > 2
            && attr_name
                .get(..2)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
    }

    /// Check if a URL uses a dangerous scheme
    ///
    /// Whitespace and control characters are ignored, the same way browsers
    /// ignore them when resolving a scheme (`java\tscript:` is still
    /// JavaScript).
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert!(validator.is_dangerous_url("javascript:alert('xss')"));
    /// assert!(validator.is_dangerous_url(" JAVA\tSCRIPT:alert(1)"));
    /// assert!(validator.is_dangerous_url("data:text/html,<script>alert('xss')</script>"));
    /// assert!(!validator.is_dangerous_url("https://example.com"));
    /// assert!(!validator.is_dangerous_url("/relative/path"));
    /// ```
    pub fn is_dangerous_url(&self, url: &str) -> bool {
        let normalized = normalize_url(url);
        DANGEROUS_URL_SCHEMES
            .iter()
            .any(|scheme| normalized.starts_with(scheme))
    }

    /// Sanitize a URL by removing dangerous schemes
    ///
    /// Returns `None` if the URL is dangerous, `Some(url)` if safe.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::new();
    /// assert_eq!(validator.sanitize_url("javascript:alert('xss')"), None);
    /// assert_eq!(validator.sanitize_url("https://example.com"), Some("https://example.com"));
    /// ```
    pub fn sanitize_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        if self.is_dangerous_url(url) {
            None
        } else {
            Some(url)
        }
    }

    /// Check if a `style` attribute value carries a script vector
    pub fn is_dangerous_style(&self, style: &str) -> bool {
        let normalized: String = style
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\\')
            .flat_map(char::to_lowercase)
            .collect();
        DANGEROUS_STYLE_PATTERNS
            .iter()
            .any(|pattern| normalized.contains(pattern))
    }

    /// Decide what to do with one attribute of an element
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::{SecurityValidator, SanitizeAction};
    ///
    /// let validator = SecurityValidator::new();
    /// assert_eq!(validator.check_attribute("a", "href", "javascript:x()"), SanitizeAction::StripUrl);
    /// assert_eq!(validator.check_attribute("p", "onclick", "x()"), SanitizeAction::StripAttribute);
    /// assert_eq!(validator.check_attribute("img", "src", "data:image/png;base64,AAAA"), SanitizeAction::Allow);
    /// assert_eq!(validator.check_attribute("p", "class", "note"), SanitizeAction::Allow);
    /// ```
    pub fn check_attribute(&self, tag_name: &str, attr_name: &str, value: &str) -> SanitizeAction {
        let attr_name = attr_name.to_ascii_lowercase();

        if self.is_event_handler(&attr_name) || FORBIDDEN_ATTRIBUTES.contains(&attr_name.as_str()) {
            return SanitizeAction::StripAttribute;
        }

        if attr_name == "style" && self.is_dangerous_style(value) {
            return SanitizeAction::StripAttribute;
        }

        if URL_ATTRIBUTES.contains(&attr_name.as_str()) && self.is_dangerous_url(value) {
            let inline_image = DATA_IMAGE_ELEMENTS.contains(&tag_name)
                && (attr_name == "src" || attr_name == "srcset")
                && normalize_url(value).starts_with("data:image/");
            if !inline_image {
                return SanitizeAction::StripUrl;
            }
        }

        SanitizeAction::Allow
    }

    /// Validate nesting depth to prevent stack overflow
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_html_converter::security::SecurityValidator;
    ///
    /// let validator = SecurityValidator::with_max_depth(100);
    /// assert!(validator.validate_depth(50).is_ok());
    /// assert!(validator.validate_depth(150).is_err());
    /// ```
    pub fn validate_depth(&self, depth: usize) -> Result<(), String> {
        if depth > self.max_depth {
            Err(format!(
                "HTML nesting depth {} exceeds maximum allowed depth {}",
                depth, self.max_depth
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for SecurityValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase a URL and drop whitespace and control characters
fn normalize_url(url: &str) -> String {
    url.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect()
}

/// HTML that has been through [`HtmlSanitizer`]
///
/// Only the sanitizer (and cosmetic passes over already-sanitized HTML)
/// can construct this type, so functions that publish HTML take it
/// instead of a plain `String`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    /// Wrap a string that is known to be sanitizer output
    pub(crate) fn from_sanitized(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SanitizedHtml> for String {
    fn from(html: SanitizedHtml) -> Self {
        html.0
    }
}

/// Counts of what a sanitizer pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub removed_elements: usize,
    pub removed_attributes: usize,
    pub removed_other: usize,
}

/// DOM-based HTML sanitizer
///
/// # Usage
///
/// ```rust
/// use doc_html_converter::security::HtmlSanitizer;
///
/// let sanitizer = HtmlSanitizer::new();
/// let clean = sanitizer
///     .sanitize(r#"<p onclick="steal()">Hi<script>alert(1)</script></p>"#)
///     .expect("sanitize");
/// assert_eq!(clean.as_str(), "<p>Hi</p>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer {
    validator: SecurityValidator,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: SecurityValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &SecurityValidator {
        &self.validator
    }

    /// Sanitize an HTML string
    ///
    /// Empty input yields empty output without parsing.
    ///
    /// # Errors
    ///
    /// - `ConversionError::SerializeError`: the cleaned tree could not be
    ///   written back to a string
    pub fn sanitize(&self, html: &str) -> Result<SanitizedHtml, ConversionError> {
        self.sanitize_with_report(html).map(|(clean, _)| clean)
    }

    /// Sanitize and also return what was removed
    pub fn sanitize_with_report(
        &self,
        html: &str,
    ) -> Result<(SanitizedHtml, SanitizeReport), ConversionError> {
        if html.is_empty() {
            return Ok((SanitizedHtml::default(), SanitizeReport::default()));
        }

        let dom = parse_html(html);
        let mut report = SanitizeReport::default();
        self.clean_children(&dom.document, 0, false, &mut report);

        let output = serialize_document_content(&dom)?;

        if report != SanitizeReport::default() {
            tracing::debug!(
                removed_elements = report.removed_elements,
                removed_attributes = report.removed_attributes,
                removed_other = report.removed_other,
                "sanitizer removed unsafe markup"
            );
        }

        Ok((SanitizedHtml::from_sanitized(output), report))
    }

    /// Remove unsafe children of `node`, then recurse into the survivors
    ///
    /// A `form` inside another `form` is unwrapped: its children take its
    /// place, since the parser ignores a nested `<form>` start tag.
    fn clean_children(
        &self,
        node: &Handle,
        depth: usize,
        in_form: bool,
        report: &mut SanitizeReport,
    ) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        let mut kept = Vec::with_capacity(children.len());

        for child in children {
            if !self.keep_node(&child, depth + 1, report) {
                continue;
            }

            let is_form = is_form_element(&child);
            self.clean_children(&child, depth + 1, in_form || is_form, report);
            restore_leading_newline(&child);

            if is_form && in_form {
                report.removed_elements += 1;
                let grandchildren = std::mem::take(&mut *child.children.borrow_mut());
                for grandchild in grandchildren {
                    grandchild.parent.set(Some(Rc::downgrade(node)));
                    kept.push(grandchild);
                }
            } else {
                kept.push(child);
            }
        }

        *node.children.borrow_mut() = kept;
    }

    /// Decide whether a node survives, stripping its attributes if it does
    fn keep_node(&self, node: &Handle, depth: usize, report: &mut SanitizeReport) -> bool {
        if self.validator.validate_depth(depth).is_err() {
            report.removed_elements += 1;
            return false;
        }

        match node.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag_name = name.local.as_ref();
                if self.validator.check_element(tag_name) == SanitizeAction::Remove {
                    report.removed_elements += 1;
                    return false;
                }

                let mut attrs = attrs.borrow_mut();
                let before = attrs.len();
                attrs.retain(|attr| {
                    self.validator
                        .check_attribute(tag_name, attr.name.local.as_ref(), &attr.value)
                        == SanitizeAction::Allow
                });
                report.removed_attributes += before - attrs.len();
                true
            }
            NodeData::Text { .. } | NodeData::Document => true,
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {
                report.removed_other += 1;
                false
            }
        }
    }
}

fn is_form_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { ref name, .. } if name.local.as_ref() == "form")
}

/// Double a leading newline inside `pre`-like elements
///
/// The parser drops the first newline after `<pre>`, so a text child that
/// still starts with one only survives a reparse if it is written twice.
fn restore_leading_newline(node: &Handle) {
    let NodeData::Element { ref name, .. } = node.data else {
        return;
    };
    if !NEWLINE_ELIDING_ELEMENTS.contains(&name.local.as_ref()) {
        return;
    }

    let children = node.children.borrow();
    if let Some(first) = children.first()
        && let NodeData::Text { ref contents } = first.data
    {
        let mut contents = contents.borrow_mut();
        if contents.starts_with('\n') {
            let mut restored = StrTendril::from_slice("\n");
            restored.push_tendril(&contents);
            *contents = restored;
        }
    }
}
