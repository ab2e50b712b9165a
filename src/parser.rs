//! HTML5 parsing and serialization using html5ever
//!
//! The sanitizer works on a real DOM tree rather than on text, so that
//! whatever the browser would build from the markup is what gets checked.
//!
//! # Overview
//!
//! Input is parsed as a full HTML5 document with html5ever, following the
//! WHATWG tree-construction algorithm. Malformed markup never fails: the
//! parser recovers exactly the way browsers do (implied `<html>`, `<head>`
//! and `<body>`, auto-closed paragraphs, foster-parented table content).
//!
//! After the tree has been cleaned, [`serialize_document_content`] writes
//! the children of `<head>` followed by the children of `<body>`; the
//! synthesized document wrapper itself is never emitted.
//!
//! # Examples
//!
//! ```rust
//! use doc_html_converter::parser::{parse_html, serialize_document_content};
//!
//! let dom = parse_html("<p>Hello<p>World");
//! let html = serialize_document_content(&dom).expect("serialize");
//! assert_eq!(html, "<p>Hello</p><p>World</p>");
//! ```

use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::ConversionError;

/// Parse an HTML string into a DOM tree
///
/// Parsing is infallible: html5ever recovers from any malformed input.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Find the `<html>` element under the document node
fn root_element(dom: &RcDom) -> Option<Handle> {
    dom.document
        .children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some("html"))
        .cloned()
}

/// Local name of an element node, lowercased by the parser
pub fn element_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref().to_string()),
        _ => None,
    }
}

/// The `<head>` and `<body>` elements of a parsed document, in that order
pub fn document_sections(dom: &RcDom) -> Vec<Handle> {
    let Some(root) = root_element(dom) else {
        return Vec::new();
    };

    root.children
        .borrow()
        .iter()
        .filter(|child| matches!(element_name(child).as_deref(), Some("head" | "body")))
        .cloned()
        .collect()
}

/// Serialize the content of `<head>` and `<body>` back to HTML
///
/// # Errors
///
/// - `ConversionError::SerializeError`: the serializer failed to write, or
///   produced bytes that are not valid UTF-8
pub fn serialize_document_content(dom: &RcDom) -> Result<String, ConversionError> {
    let mut buffer: Vec<u8> = Vec::new();

    for section in document_sections(dom) {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        let handle = SerializableHandle::from(section);
        serialize(&mut buffer, &handle, opts)
            .map_err(|e| ConversionError::SerializeError(format!("HTML serialization failed: {}", e)))?;
    }

    String::from_utf8(buffer).map_err(|e| {
        ConversionError::SerializeError(format!(
            "Serialized HTML is not valid UTF-8 at byte position {}",
            e.utf8_error().valid_up_to()
        ))
    })
}
