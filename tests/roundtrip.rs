use std::fs;

use zenpbm::*;

fn gray8(w: u32, h: u32, pixels: Vec<u8>) -> PixelBuffer {
    PixelBuffer::from_samples(
        ImageFormat::new(w, h, PixelFormat::Gray, ChannelType::U8),
        Samples::U8(pixels),
    )
    .unwrap()
}

#[test]
fn pgm_roundtrip_gray8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.pgm");
    let pixels = vec![0, 64, 128, 192, 255, 100];
    let src = gray8(3, 2, pixels.clone());

    let mut out = PbmResource::create(&path, &src.format()).unwrap();
    out.write_image(&src).unwrap();

    let input = PbmResource::open(&path).unwrap();
    assert_eq!(input.descriptor().magic, Magic::P5);
    assert_eq!(input.descriptor().max_value, 255);
    assert_eq!(input.data_offset(), b"P5\n3\n2\n255\n".len() as u64);
    let decoded = input.read_image().unwrap();
    assert_eq!(decoded.format(), src.format());
    assert_eq!(decoded.as_u8().unwrap(), &pixels[..]);
}

#[test]
fn single_bool_pixel_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bit.pbm");
    let format = ImageFormat::new(1, 1, PixelFormat::Gray, ChannelType::Bool);
    let src = PixelBuffer::from_samples(format, Samples::Bool(vec![true])).unwrap();

    let mut out = PbmResource::create(&path, &format).unwrap();
    out.write_image(&src).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"P5\n1\n1\n1\n\x01");

    let input = PbmResource::open(&path).unwrap();
    let mut dest = PixelBuffer::new(format).unwrap();
    input.read(&mut dest, Region::full(1, 1)).unwrap();
    assert_eq!(dest.as_bool().unwrap(), &[true]);
}

#[test]
fn rgb_source_roundtrips_as_luma() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.pgm");
    let rgb = PixelBuffer::from_samples(
        ImageFormat::new(2, 2, PixelFormat::Rgb, ChannelType::U8),
        Samples::U8(vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 90, 90, 90]),
    )
    .unwrap();

    let format = ImageFormat::new(2, 2, PixelFormat::Gray, ChannelType::U8);
    let mut out = PbmResource::create(&path, &format).unwrap();
    out.write_image(&rgb).unwrap();

    let mut expected = PixelBuffer::new(format).unwrap();
    convert(&mut expected, &rgb, true).unwrap();

    let decoded = PbmResource::open(&path).unwrap().read_image().unwrap();
    assert_eq!(decoded, expected);
    assert_eq!(decoded.as_u8().unwrap(), &[76, 150, 29, 90]);
}

#[test]
fn bool_source_into_u8_file_is_full_scale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.pgm");
    let bits = PixelBuffer::from_samples(
        ImageFormat::new(3, 1, PixelFormat::Gray, ChannelType::Bool),
        Samples::Bool(vec![true, false, true]),
    )
    .unwrap();

    let format = ImageFormat::new(3, 1, PixelFormat::Gray, ChannelType::U8);
    PbmResource::create(&path, &format)
        .unwrap()
        .write_image(&bits)
        .unwrap();

    let decoded = PbmResource::open(&path).unwrap().read_image().unwrap();
    assert_eq!(decoded.as_u8().unwrap(), &[255, 0, 255]);
}

#[test]
fn sixteen_bit_file_is_written_but_not_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.pgm");
    let format = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U16);
    let src = PixelBuffer::from_samples(format, Samples::U16(vec![1, 65535])).unwrap();

    PbmResource::create(&path, &format)
        .unwrap()
        .write_image(&src)
        .unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"P5\n2\n1\n65535\n\x00\x01\xff\xff");

    let err = PbmResource::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn rescale_off_keeps_numeric_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.pgm");
    let wide = PixelBuffer::from_samples(
        ImageFormat::new(3, 1, PixelFormat::Gray, ChannelType::U16),
        Samples::U16(vec![7, 200, 300]),
    )
    .unwrap();

    let format = ImageFormat::new(3, 1, PixelFormat::Gray, ChannelType::U8);
    let options = ResourceOptions::new().with_rescale(false);
    let mut out = PbmResource::create_with(&path, &format, options).unwrap();
    assert!(!out.rescale());
    out.write_image(&wide).unwrap();

    let decoded = PbmResource::open(&path).unwrap().read_image().unwrap();
    assert_eq!(decoded.as_u8().unwrap(), &[7, 200, 255]);
}

#[test]
fn reads_are_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("twice.ppm");
    fs::write(&path, b"P6\n# two pixels\n2 1\n255\n\x01\x02\x03\x04\x05\x06").unwrap();

    let input = PbmResource::open(&path).unwrap();
    let first = input.read_image().unwrap();
    let second = input.read_image().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.pixel_format(), PixelFormat::Rgb);
    assert_eq!(first.as_u8().unwrap(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn rewriting_replaces_the_body() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("again.pgm");
    let format = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U8);
    let mut out = PbmResource::create(&path, &format).unwrap();

    out.write_image(&gray8(2, 1, vec![1, 2])).unwrap();
    out.write_image(&gray8(2, 1, vec![3, 4])).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, out.data_offset() + 2);
    assert_eq!(&bytes[out.data_offset() as usize..], &[3, 4]);
}

#[test]
fn reopen_for_read_picks_up_a_new_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("changing.pgm");
    fs::write(&path, b"P5 1 1 255\n\x09").unwrap();
    let mut input = PbmResource::open(&path).unwrap();
    assert_eq!(input.format().cols, 1);

    fs::write(&path, b"P2\n# now ascii\n3 1\n9\n0 3 9\n").unwrap();
    input.reopen().unwrap();
    assert_eq!(input.descriptor().magic, Magic::P2);
    assert_eq!(input.format().cols, 3);
    assert_eq!(input.data_offset(), b"P2\n# now ascii\n3 1\n9\n".len() as u64);
    assert_eq!(input.read_image().unwrap().as_u8().unwrap(), &[0, 85, 255]);
}

#[test]
fn reopen_for_write_reemits_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reset.pgm");
    let format = ImageFormat::new(1, 1, PixelFormat::Gray, ChannelType::U8);
    let mut out = PbmResource::create(&path, &format).unwrap();
    out.write_image(&gray8(1, 1, vec![42])).unwrap();

    out.reopen().unwrap();
    assert_eq!(out.mode(), Mode::Write);
    assert_eq!(fs::read(&path).unwrap(), b"P5\n1\n1\n255\n");
}

#[test]
fn gray_file_into_rgba_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expand.pgm");
    fs::write(&path, b"P5 2 1 255\n\x10\x80").unwrap();

    let input = PbmResource::open(&path).unwrap();
    let mut dest = PixelBuffer::new(ImageFormat::new(2, 1, PixelFormat::Rgba, ChannelType::U8)).unwrap();
    input.read(&mut dest, Region::full(2, 1)).unwrap();
    assert_eq!(
        dest.as_u8().unwrap(),
        &[0x10, 0x10, 0x10, 255, 0x80, 0x80, 0x80, 255]
    );
}
