#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(src) = std::str::from_utf8(data) {
        let _ = gong_parser::parse_source(src, gong_parser::Mode::NONE);
        let _ = gong_parser::parse_source(src, gong_parser::Mode::ALL_ERRORS);
    }
});
