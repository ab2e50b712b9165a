//! Security validation tests
//!
//! This test suite validates that every conversion path neutralizes
//! malicious input before it can reach a live preview or an exported file.
//! Markdown, plain text and raw HTML are all attack surfaces: Markdown and
//! text may carry raw HTML, and raw HTML is untrusted by definition.

use doc_html_converter::{
    ContentType, auto_convert_to_html, markdown_to_html, sanitize_html, text_to_html,
};
use proptest::prelude::*;

const ALL_HINTS: [ContentType; 4] = [
    ContentType::Auto,
    ContentType::Markdown,
    ContentType::Text,
    ContentType::Html,
];

/// Test that script tags are completely removed from output
#[test]
fn test_xss_script_tag_removal() {
    let html = r#"<html><body>
        <p>Before dangerous element</p>
        <script>alert('xss')</script>
        <p>After dangerous element</p>
    </body></html>"#;

    let output = sanitize_html(html);

    assert!(!output.contains("<script"));
    assert!(!output.contains("</script"));
    assert!(!output.contains("alert"));
    assert!(!output.contains("xss"));

    assert!(output.contains("<p>Before dangerous element</p>"));
    assert!(output.contains("<p>After dangerous element</p>"));
}

/// Test that scripts are removed whatever the content type hint says
#[test]
fn test_xss_script_removed_for_every_hint() {
    let payload = "Intro\n\n<script>steal(document.cookie)</script>\n\nOutro";

    for hint in ALL_HINTS {
        let output = auto_convert_to_html(payload, hint);
        assert!(!output.contains("<script"), "{hint}: {output}");
        assert!(!output.contains("steal"), "{hint}: {output}");
        assert!(output.contains("Intro"), "{hint}: {output}");
        assert!(output.contains("Outro"), "{hint}: {output}");
    }
}

/// Test that event handler attributes are removed
#[test]
fn test_xss_event_handler_removal() {
    let html = r#"<html><body>
        <p onclick="alert('xss')">Click me</p>
        <div onload="malicious()">Content</div>
        <a href="test.html" onmouseover="attack()">Link</a>
    </body></html>"#;

    let output = sanitize_html(html);

    assert!(!output.contains("onclick"));
    assert!(!output.contains("onload"));
    assert!(!output.contains("onmouseover"));
    assert!(!output.contains("alert"));
    assert!(!output.contains("malicious"));
    assert!(!output.contains("attack"));

    assert!(output.contains("<p>Click me</p>"));
    assert!(output.contains("<div>Content</div>"));
    assert!(output.contains(r#"<a href="test.html">Link</a>"#));
}

/// Test that event handlers inside Markdown raw HTML are removed
#[test]
fn test_xss_event_handler_in_markdown() {
    let markdown = "# Notes\n\nSee <img src=\"cat.png\" onerror=\"alert(1)\"> here.\n";
    let output = markdown_to_html(markdown);

    assert!(output.contains("<h1 id=\"notes\">Notes</h1>"), "{output}");
    assert!(output.contains("<img src=\"cat.png\">"), "{output}");
    assert!(!output.contains("onerror"), "{output}");
    assert!(!output.contains("alert"), "{output}");
}

/// Test that JavaScript URLs are neutralized
#[test]
fn test_xss_javascript_url_removal() {
    let html = r#"<html><body>
        <a href="javascript:alert('xss1')">Link 1</a>
        <a href="JAVASCRIPT:alert('xss2')">Link 2</a>
        <a href="  javascript:alert('xss3')">Link 3</a>
        <img src="javascript:alert('xss4')" alt="Image">
        <a href="vbscript:msgbox('xss5')">Link 5</a>
    </body></html>"#;

    let output = sanitize_html(html);

    assert!(!output.to_lowercase().contains("javascript:"));
    assert!(!output.contains("vbscript:"));
    assert!(!output.contains("alert"));
    assert!(!output.contains("msgbox"));

    assert!(output.contains("<a>Link 1</a>"));
    assert!(output.contains("<a>Link 5</a>"));
    assert!(output.contains(r#"<img alt="Image">"#));
}

/// Test that Markdown links and images cannot carry script URLs
#[test]
fn test_xss_javascript_url_in_markdown_links() {
    let markdown = "[click](javascript:alert(1)) and ![pic](javascript:alert(2))";
    let output = markdown_to_html(markdown);

    assert!(!output.contains("javascript:"), "{output}");
    assert!(output.contains("click"), "{output}");
    assert!(output.contains("alt=\"pic\""), "{output}");
}

/// Test that data URLs are removed except for inline images
#[test]
fn test_data_url_handling() {
    let html = r#"<a href="data:text/html,<script>alert(1)</script>">bad</a><img src="data:image/png;base64,iVBORw0KGgo=" alt="dot">"#;
    let output = sanitize_html(html);

    assert!(output.contains("<a>bad</a>"), "{output}");
    assert!(
        output.contains(r#"<img src="data:image/png;base64,iVBORw0KGgo=" alt="dot">"#),
        "{output}"
    );
}

/// Test that embedded browsing contexts are removed
#[test]
fn test_embedded_content_removal() {
    let html = r#"<p>Safe</p>
        <iframe src="https://evil.example/"></iframe>
        <object data="evil.swf"><param name="x" value="y"></object>
        <embed src="evil.swf">
        <frameset><frame src="evil.html"></frameset>"#;

    let output = sanitize_html(html);

    assert!(output.contains("<p>Safe</p>"));
    assert!(!output.contains("iframe"));
    assert!(!output.contains("object"));
    assert!(!output.contains("embed"));
    assert!(!output.contains("evil"));
}

/// Test that style and resource-loading elements are removed
#[test]
fn test_style_and_link_removal() {
    let html = r#"<html><head>
        <title>Doc</title>
        <style>body { background: url(javascript:alert(1)) }</style>
        <link rel="stylesheet" href="https://evil.example/x.css">
        <base href="https://evil.example/">
        <meta http-equiv="refresh" content="0;url=javascript:alert(2)">
    </head><body><p>Body</p></body></html>"#;

    let output = sanitize_html(html);

    assert!(output.contains("<title>Doc</title>"), "{output}");
    assert!(output.contains("<p>Body</p>"), "{output}");
    for needle in ["<style", "<link", "<base", "<meta", "evil", "alert", "refresh"] {
        assert!(!output.contains(needle), "found {needle} in {output}");
    }
}

/// Test that inline styles with script vectors are removed but safe ones kept
#[test]
fn test_inline_style_attributes() {
    let html = r#"<p style="color: red">ok</p><p style="width: expression(alert(1))">bad</p>"#;
    let output = sanitize_html(html);

    assert_eq!(output, r#"<p style="color: red">ok</p><p>bad</p>"#);
}

/// Test that foreign content cannot smuggle scripts
#[test]
fn test_svg_and_math_removal() {
    let html = r#"<p>a</p><svg><script>alert(1)</script><a xlink:href="javascript:alert(2)">x</a></svg><math><mtext><img src=x onerror=alert(3)></mtext></math><p>b</p>"#;
    let output = sanitize_html(html);

    assert_eq!(output, "<p>a</p><p>b</p>");
}

/// Test that comment-based parser confusion is removed
#[test]
fn test_comment_removal() {
    let html = "<p>x<!--<img src=x onerror=alert(1)>--></p><!-- note -->";
    assert_eq!(sanitize_html(html), "<p>x</p>");
}

/// Test that tables keep their structure while losing handlers
#[test]
fn test_table_with_handlers() {
    let html = r#"<table onmouseover="x()"><tr><td onclick="y()">cell</td></tr></table>"#;
    let output = sanitize_html(html);

    assert_eq!(
        output,
        "<table><tbody><tr><td>cell</td></tr></tbody></table>"
    );
}

/// Test that a form nested by parser recovery is flattened so a second pass
/// sees the same tree
#[test]
fn test_nested_form_is_stable() {
    let html = "<form><div></form><form><input name=a>inner</form>";
    let once = sanitize_html(html);

    assert_eq!(once.matches("<form").count(), 1, "{once}");
    assert!(once.contains("inner"), "{once}");
    assert_eq!(sanitize_html(&once), once);
}

/// Test that GFM tables from Markdown survive sanitization
#[test]
fn test_markdown_table_survives() {
    let markdown = "| a | b |\n|---|---|\n| 1 | 2 |\n";
    let output = markdown_to_html(markdown);

    assert!(output.contains("<table>"), "{output}");
    assert!(output.contains("<th>a</th>"), "{output}");
    assert!(output.contains("<td>2</td>"), "{output}");
}

/// Test that deeply nested markup does not crash and is bounded
#[test]
fn test_deep_nesting_is_bounded() {
    let depth = 5000;
    let html = format!("{}core{}", "<div>".repeat(depth), "</div>".repeat(depth));

    let output = sanitize_html(&html);

    assert!(output.matches("<div>").count() < depth);
    assert!(!output.contains("core"));
}

/// Test that markup in plain text input is sanitized too
#[test]
fn test_text_input_with_markup() {
    let text = "line one <b onclick=\"x()\">bold</b>\nline two\n\n<iframe src=\"e\"></iframe>";
    let output = text_to_html(text);

    assert_eq!(output, "<p>line one <b>bold</b><br>line two</p>\n<p></p>");
}

/// Generate a fragment from pieces that commonly trip sanitizers
fn fragment_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("<p>".to_string()),
        Just("</p>".to_string()),
        Just("<div class=\"n\">".to_string()),
        Just("</div>".to_string()),
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<a href=\"javascript:x()\">".to_string()),
        Just("<a href=\"https://example.com\">".to_string()),
        Just("</a>".to_string()),
        Just("<img src=x onerror=y>".to_string()),
        Just("<script>z()</script>".to_string()),
        Just("<style>p{}</style>".to_string()),
        Just("<table><tr><td>".to_string()),
        Just("</td></tr></table>".to_string()),
        Just("<ul><li>".to_string()),
        Just("</li></ul>".to_string()),
        Just("<!-- c -->".to_string()),
        Just("<svg><g></g></svg>".to_string()),
        Just("<form><div></form><form>inner</form>".to_string()),
        Just("<form><input name=a>".to_string()),
        Just("&amp; &lt;".to_string()),
        "[a-z]{1,8}",
    ]
}

proptest! {
    /// Sanitizing already sanitized output changes nothing
    #[test]
    fn prop_sanitizer_is_idempotent(pieces in prop::collection::vec(fragment_piece(), 0..12)) {
        let html = pieces.concat();
        let once = sanitize_html(&html);
        let twice = sanitize_html(&once);
        prop_assert_eq!(twice, once);
    }

    /// No conversion path ever emits script-capable markup
    #[test]
    fn prop_no_script_survives_any_path(
        pieces in prop::collection::vec(fragment_piece(), 0..12),
        hint in prop::sample::select(ALL_HINTS.to_vec()),
    ) {
        let content = pieces.join("\n");
        let output = auto_convert_to_html(&content, hint);

        prop_assert!(!output.contains("<script"), "{}", output);
        prop_assert!(!output.contains("<style"), "{}", output);
        prop_assert!(!output.contains("<svg"), "{}", output);
        prop_assert!(!output.contains("onerror"), "{}", output);
        prop_assert!(!output.contains("javascript:"), "{}", output);
    }
}
