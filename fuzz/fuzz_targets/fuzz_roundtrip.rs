#![no_main]
use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use zenpbm::{ChannelType, ImageFormat, Limits, PixelBuffer, PixelFormat, convert, pnm};

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must survive a P5 re-encode and decode to its grey projection
    let limits = Limits::none().with_max_memory(1 << 24);
    let mut cursor = Cursor::new(data);
    let Ok((descriptor, offset)) = pnm::parse_header(&mut cursor) else {
        return;
    };
    let Ok(decoded) = pnm::decode(&mut cursor, &descriptor, offset, &limits) else {
        return;
    };

    let format = ImageFormat::new(decoded.cols(), decoded.rows(), PixelFormat::Gray, ChannelType::U8);
    let mut out = Cursor::new(Vec::new());
    let header = pnm::encode_descriptor(&format).unwrap();
    let body_offset = pnm::write_header(&mut out, &header).unwrap();
    pnm::encode(&mut out, &decoded, &format, body_offset, true).unwrap();

    let mut expected = PixelBuffer::new(format).unwrap();
    convert(&mut expected, &decoded, true).unwrap();

    let mut reread = Cursor::new(out.into_inner());
    let (descriptor2, offset2) = pnm::parse_header(&mut reread).expect("re-encoded header failed to parse");
    assert_eq!(offset2, body_offset);
    let decoded2 = pnm::decode(&mut reread, &descriptor2, offset2, &limits).expect("re-encoded data failed to decode");
    assert_eq!(decoded2, expected, "roundtrip pixel mismatch");
});
