#![no_main]

use doc_html_converter::beautify_html;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let pretty = beautify_html(&html);

    // Re-indenting only moves whitespace around
    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    assert_eq!(strip(&html), strip(&pretty));
});
