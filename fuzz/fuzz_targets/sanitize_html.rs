#![no_main]

use doc_html_converter::sanitize_html;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };

    let once = sanitize_html(html);
    let twice = sanitize_html(&once);
    assert_eq!(once, twice, "sanitizer output changed on a second pass");
});
