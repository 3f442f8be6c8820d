#![no_main]
use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use zenpbm::{Limits, pnm};

fuzz_target!(|data: &[u8]| {
    // Header parse and decode must never panic, with or without limits
    let mut cursor = Cursor::new(data);
    let Ok((descriptor, offset)) = pnm::parse_header(&mut cursor) else {
        return;
    };
    let capped = Limits::none().with_max_memory(1 << 24);
    let _ = pnm::decode(&mut cursor, &descriptor, offset, &capped);
    let _ = pnm::decode(&mut cursor, &descriptor, offset, &Limits::none());
});
