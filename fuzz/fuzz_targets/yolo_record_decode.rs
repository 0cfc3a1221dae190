//! Fuzz target for YOLO single-record decoding.
//!
//! Feeds arbitrary UTF-8 lines through record parsing, class resolution
//! and denormalization, checking for panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yoloedit::yolo::fuzz_decode_record;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_decode_record(line);
});
