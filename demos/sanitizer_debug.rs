//! Show what the sanitizer removes from hostile input

use doc_html_converter::security::HtmlSanitizer;

fn main() {
    let samples = [
        (
            "script",
            r#"<p>Before script</p><script>alert('xss')</script><p>After script</p>"#,
        ),
        (
            "iframe",
            r#"<p>Before iframe</p><iframe src="https://evil.example/"></iframe><p>After iframe</p>"#,
        ),
        (
            "handlers and urls",
            r#"<a href="javascript:alert(1)" onmouseover="x()">link</a><img src="x.png" onerror="y()">"#,
        ),
        (
            "styles and comments",
            r#"<p style="width: expression(alert(1))">styled</p><!-- hidden -->"#,
        ),
    ];

    let sanitizer = HtmlSanitizer::new();

    for (label, html) in samples {
        println!("--- {label} ---");
        println!("Input:  {html}");

        match sanitizer.sanitize_with_report(html) {
            Ok((clean, report)) => {
                println!("Output: {clean}");
                println!(
                    "Removed: {} elements, {} attributes, {} other nodes\n",
                    report.removed_elements, report.removed_attributes, report.removed_other
                );
            }
            Err(e) => println!("Error: {e}\n"),
        }
    }
}
