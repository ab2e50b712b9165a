//! Basic conversion example covering each content type

use doc_html_converter::converter::Converter;
use doc_html_converter::{ContentType, guess_content_type};

fn main() {
    println!("=== Docs to HTML - Basic Examples ===\n");

    let converter = Converter::new();

    // Example 1: Markdown with headings, lists and a table
    show(
        &converter,
        "Markdown document",
        "# Release notes\n\n## Fixes\n\n- faster parsing\n- ~~old bug~~ fixed\n\n| a | b |\n|---|---|\n| 1 | 2 |\n",
        ContentType::Markdown,
    );

    // Example 2: Plain text paragraphs and line breaks
    show(
        &converter,
        "Plain text",
        "Dear reader,\nthanks for visiting.\n\n\nSee you soon.",
        ContentType::Text,
    );

    // Example 3: Raw HTML passes through the sanitizer
    show(
        &converter,
        "Raw HTML",
        "<section><h2>Hello</h2><p onclick=\"steal()\">World</p></section>",
        ContentType::Html,
    );

    // Example 4: Automatic detection
    for sample in ["<em>tagged</em>", "**starred**", "just words"] {
        println!("Auto-detect {sample:?} -> {}", guess_content_type(sample));
    }
    println!();
    show(&converter, "Auto-detected", "**starred**", ContentType::Auto);
}

fn show(converter: &Converter, title: &str, input: &str, hint: ContentType) {
    println!("{title} ({hint})");
    println!("Input:");
    println!("{input}\n");

    let html = converter.render(input, hint, true);

    println!("Output HTML:");
    println!("{html}");
    println!("---\n");
}
