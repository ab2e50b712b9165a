#![no_main]

use doc_html_converter::{ContentType, auto_convert_to_html, sanitize_html};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let hint = match selector % 4 {
        0 => ContentType::Auto,
        1 => ContentType::Markdown,
        2 => ContentType::Text,
        _ => ContentType::Html,
    };

    let content = String::from_utf8_lossy(rest);
    let html = auto_convert_to_html(&content, hint);
    assert_eq!(sanitize_html(&html), html, "converter output is not sanitizer-stable");
});
