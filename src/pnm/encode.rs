//! P5 encoder.
//!
//! Every image is written as a binary greymap. The max-value token tracks the
//! channel type the caller asked for: 1 for boolean, 255 for 8-bit, 65535 for
//! 16-bit (samples big-endian).

use std::io::{Seek, SeekFrom, Write};

use log::{debug, trace};

use super::{FormatDescriptor, Magic};
use crate::buffer::{PixelBuffer, Samples, convert};
use crate::error::PbmError;
use crate::pixel::{ChannelType, ImageFormat, PixelFormat};

/// Validate `format` for writing and derive the P5 header that describes it.
///
/// Fails before anything touches the disk: multi-plane formats and channel
/// types other than boolean, 8-bit and 16-bit are unsupported.
pub fn encode_descriptor(format: &ImageFormat) -> Result<FormatDescriptor, PbmError> {
    if format.planes != 1 {
        return Err(PbmError::Unsupported(format!(
            "multi-plane images are not supported ({} planes)",
            format.planes
        )));
    }
    let max_value = match format.channel_type {
        ChannelType::Bool | ChannelType::U8 | ChannelType::U16 => format.channel_type.max_value(),
        _ => None,
    }
    .ok_or_else(|| {
        PbmError::Unsupported(format!(
            "cannot write {:?} channels, only Bool, U8 and U16",
            format.channel_type
        ))
    })?;
    if format.cols == 0 || format.rows == 0 {
        return Err(PbmError::InvalidHeader(format!(
            "image dimensions must be positive, got {}x{}",
            format.cols, format.rows
        )));
    }
    Ok(FormatDescriptor {
        magic: Magic::P5,
        columns: format.cols,
        rows: format.rows,
        max_value,
        planes: 1,
    })
}

/// Write the header text for `descriptor` and return the offset where the
/// pixel body starts.
pub fn write_header<W: Write + Seek>(
    writer: &mut W,
    descriptor: &FormatDescriptor,
) -> Result<u64, PbmError> {
    let header = format!(
        "{}\n{}\n{}\n{}\n",
        descriptor.magic, descriptor.columns, descriptor.rows, descriptor.max_value
    );
    writer.write_all(header.as_bytes())?;
    let data_offset = writer.stream_position()?;
    debug!(
        "wrote {} header for {}x{}, max-value {}, data at byte {data_offset}",
        descriptor.magic, descriptor.columns, descriptor.rows, descriptor.max_value
    );
    Ok(data_offset)
}

/// Convert `src` to a single grey channel of `format.channel_type` and write
/// it at `data_offset` in one pass. Returns the body length in bytes.
pub fn encode<W: Write + Seek>(
    writer: &mut W,
    src: &PixelBuffer,
    format: &ImageFormat,
    data_offset: u64,
    rescale: bool,
) -> Result<u64, PbmError> {
    encode_descriptor(format)?;
    if src.planes() != 1 {
        return Err(PbmError::Unsupported(format!(
            "multi-plane images are not supported ({} planes)",
            src.planes()
        )));
    }
    if src.cols() != format.cols || src.rows() != format.rows {
        return Err(PbmError::Unsupported(format!(
            "partial writes are not supported: source is {}x{}, image is {}x{}",
            src.cols(),
            src.rows(),
            format.cols,
            format.rows
        )));
    }

    let mut grey = PixelBuffer::new(ImageFormat::new(
        format.cols,
        format.rows,
        PixelFormat::Gray,
        format.channel_type,
    ))?;
    convert(&mut grey, src, rescale)?;

    let body: Vec<u8> = match grey.into_samples() {
        Samples::Bool(bits) => bits.into_iter().map(u8::from).collect(),
        Samples::U8(bytes) => bytes,
        Samples::U16(words) => words.iter().flat_map(|w| w.to_be_bytes()).collect(),
        Samples::F32(_) => {
            return Err(PbmError::Unsupported("cannot write F32 channels".into()));
        }
    };

    writer.seek(SeekFrom::Start(data_offset))?;
    trace!("writing {} body bytes at byte {data_offset}", body.len());
    writer.write_all(&body)?;
    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_text_per_channel_type() {
        for (channel_type, max) in [
            (ChannelType::Bool, "1"),
            (ChannelType::U8, "255"),
            (ChannelType::U16, "65535"),
        ] {
            let d = encode_descriptor(&ImageFormat::new(3, 2, PixelFormat::Rgb, channel_type))
                .unwrap();
            let mut out = Cursor::new(Vec::new());
            let offset = write_header(&mut out, &d).unwrap();
            let expected = format!("P5\n3\n2\n{max}\n");
            assert_eq!(out.get_ref().as_slice(), expected.as_bytes());
            assert_eq!(offset, expected.len() as u64);
        }
    }

    #[test]
    fn rejects_planes_and_float() {
        let planar = ImageFormat::new(1, 1, PixelFormat::Gray, ChannelType::U8).with_planes(2);
        assert!(matches!(encode_descriptor(&planar), Err(PbmError::Unsupported(_))));
        let float = ImageFormat::new(1, 1, PixelFormat::Gray, ChannelType::F32);
        assert!(matches!(encode_descriptor(&float), Err(PbmError::Unsupported(_))));
    }

    #[test]
    fn sixteen_bit_body_is_big_endian() {
        let format = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U16);
        let src = PixelBuffer::from_samples(format, Samples::U16(vec![0x0102, 0xfffe])).unwrap();
        let mut out = Cursor::new(Vec::new());
        let d = encode_descriptor(&format).unwrap();
        let offset = write_header(&mut out, &d).unwrap();
        let len = encode(&mut out, &src, &format, offset, true).unwrap();
        assert_eq!(len, 4);
        assert_eq!(&out.get_ref()[offset as usize..], &[0x01, 0x02, 0xff, 0xfe]);
    }

    #[test]
    fn rgb_source_narrows_to_luma() {
        let src_format = ImageFormat::new(2, 1, PixelFormat::Rgb, ChannelType::U8);
        let src =
            PixelBuffer::from_samples(src_format, Samples::U8(vec![255, 0, 0, 10, 20, 30])).unwrap();
        let format = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U8);
        let mut out = Cursor::new(Vec::new());
        encode(&mut out, &src, &format, 0, true).unwrap();
        // Rec.601: 255 * 0.299 = 76.2 and 10 * 0.299 + 20 * 0.587 + 30 * 0.114 = 18.2
        assert_eq!(out.get_ref().as_slice(), &[76, 18]);
    }

    #[test]
    fn extent_mismatch_is_unsupported() {
        let src = PixelBuffer::new(ImageFormat::new(2, 2, PixelFormat::Gray, ChannelType::U8))
            .unwrap();
        let format = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U8);
        let mut out = Cursor::new(Vec::new());
        let err = encode(&mut out, &src, &format, 0, true).unwrap_err();
        assert!(matches!(err, PbmError::Unsupported(_)));
        assert!(out.get_ref().is_empty());
    }
}
