//! Netpbm header parser and P1-P6 pixel decoder.

use std::io::{BufRead, Read, Seek, SeekFrom};

use log::{debug, trace, warn};

use super::{FormatDescriptor, Magic};
use crate::buffer::{PixelBuffer, Samples};
use crate::error::PbmError;
use crate::limits::Limits;

/// Longest header token accepted. Nothing legitimate comes close.
const MAX_TOKEN_LEN: usize = 32;

fn peek<R: BufRead>(reader: &mut R) -> Result<Option<u8>, PbmError> {
    Ok(reader.fill_buf()?.first().copied())
}

fn next_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>, PbmError> {
    let byte = peek(reader)?;
    if byte.is_some() {
        reader.consume(1);
    }
    Ok(byte)
}

fn skip_whitespace<R: BufRead>(reader: &mut R) -> Result<(), PbmError> {
    while peek(reader)?.is_some_and(|b| b.is_ascii_whitespace()) {
        reader.consume(1);
    }
    Ok(())
}

/// Consume a `#` comment through (and including) its newline.
fn skip_comment<R: BufRead>(reader: &mut R) -> Result<(), PbmError> {
    loop {
        let (found, used) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (false, buf.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Skip any mix of whitespace and comment lines.
fn skip_filler<R: BufRead>(reader: &mut R) -> Result<(), PbmError> {
    loop {
        match peek(reader)? {
            Some(b'#') => skip_comment(reader)?,
            Some(b) if b.is_ascii_whitespace() => reader.consume(1),
            _ => return Ok(()),
        }
    }
}

fn read_token<R: BufRead>(reader: &mut R, what: &str) -> Result<Vec<u8>, PbmError> {
    skip_filler(reader)?;
    let mut token = Vec::new();
    while let Some(b) = peek(reader)? {
        if b.is_ascii_whitespace() || b == b'#' {
            break;
        }
        if token.len() == MAX_TOKEN_LEN {
            return Err(PbmError::InvalidHeader(format!(
                "{what} is longer than {MAX_TOKEN_LEN} bytes"
            )));
        }
        token.push(b);
        reader.consume(1);
    }
    if token.is_empty() {
        return Err(PbmError::InvalidHeader(format!("missing {what}")));
    }
    Ok(token)
}

fn parse_positive(token: &[u8], what: &str) -> Result<u32, PbmError> {
    let value = core::str::from_utf8(token)
        .ok()
        .and_then(|text| text.parse::<u32>().ok());
    match value {
        Some(0) => Err(PbmError::InvalidHeader(format!(
            "{what} must be positive, found 0"
        ))),
        Some(v) => Ok(v),
        None => Err(PbmError::InvalidHeader(format!(
            "expected {what}, found {:?}",
            String::from_utf8_lossy(token)
        ))),
    }
}

/// Parse a Netpbm header and return it with the offset of the first pixel
/// byte.
///
/// Whitespace and `#` comment lines may precede any token. Exactly one
/// whitespace byte after the last token belongs to the header, so a comment
/// on the same line as the final token is read as part of the raster.
///
/// The max-value must lie in 1..=255; 255 itself is accepted so that 8-bit
/// files written by [`super::encode`] read back.
pub fn parse_header<R: BufRead + Seek>(
    reader: &mut R,
) -> Result<(FormatDescriptor, u64), PbmError> {
    let token = read_token(reader, "magic number")?;
    let magic = Magic::from_token(&token).ok_or_else(|| {
        PbmError::UnrecognizedMagic(String::from_utf8_lossy(&token).into_owned())
    })?;

    let columns = parse_positive(&read_token(reader, "width")?, "width")?;
    let rows = parse_positive(&read_token(reader, "height")?, "height")?;

    let max_value = if magic.is_bitmap() {
        1
    } else {
        let max = parse_positive(&read_token(reader, "max-value")?, "max-value")?;
        if max > 255 {
            return Err(PbmError::InvalidHeader(format!(
                "max-value {max} is unsupported, only channels of 8 bits or narrower are handled"
            )));
        }
        max
    };

    if peek(reader)?.is_some_and(|b| b.is_ascii_whitespace()) {
        reader.consume(1);
    }
    let data_offset = reader.stream_position()?;

    debug!("{magic} header: {columns}x{rows}, max-value {max_value}, data at byte {data_offset}");

    Ok((
        FormatDescriptor {
            magic,
            columns,
            rows,
            max_value,
            planes: 1,
        },
        data_offset,
    ))
}

/// Rescale one sample from `0..=max_value` to `0..=255`, rounding half up.
///
/// Samples at or above `max_value` map to 255, so data that overshoots the
/// declared maximum clamps instead of wrapping.
pub fn normalize_sample(sample: u8, max_value: u8) -> u8 {
    if sample >= max_value {
        return 255;
    }
    let s = u32::from(sample);
    let m = u32::from(max_value);
    ((2 * s * 255 + m) / (2 * m)) as u8
}

/// Normalize a flat sample array in place. Returns how many samples were
/// above `max_value` and got clamped.
pub fn normalize(samples: &mut [u8], max_value: u8) -> usize {
    let clamped = samples.iter().filter(|&&s| s > max_value).count();
    if max_value == 255 {
        return clamped;
    }
    let table: [u8; 256] = core::array::from_fn(|s| normalize_sample(s as u8, max_value));
    for s in samples.iter_mut() {
        *s = table[usize::from(*s)];
    }
    clamped
}

fn read_binary<R: Read>(reader: &mut R, count: usize) -> Result<Vec<u8>, PbmError> {
    let mut raw = Vec::new();
    reader.by_ref().take(count as u64).read_to_end(&mut raw)?;
    if raw.len() < count {
        return Err(PbmError::UnexpectedEof {
            needed: count,
            actual: raw.len(),
        });
    }
    Ok(raw)
}

// '1' is set; any other non-space character reads as clear.
fn read_ascii_bits<R: BufRead>(reader: &mut R, count: usize) -> Result<Vec<bool>, PbmError> {
    let mut bits = Vec::with_capacity(count);
    while bits.len() < count {
        skip_whitespace(reader)?;
        match next_byte(reader)? {
            Some(b) => bits.push(b == b'1'),
            None => {
                return Err(PbmError::UnexpectedEof {
                    needed: count,
                    actual: bits.len(),
                });
            }
        }
    }
    Ok(bits)
}

fn read_ascii_samples<R: BufRead>(reader: &mut R, count: usize) -> Result<Vec<u8>, PbmError> {
    let mut samples = Vec::with_capacity(count);
    while samples.len() < count {
        skip_whitespace(reader)?;
        let mut value = 0u32;
        let mut digits = 0usize;
        while let Some(b) = peek(reader)? {
            if b.is_ascii_whitespace() {
                break;
            }
            if !b.is_ascii_digit() {
                return Err(PbmError::InvalidData(format!(
                    "unexpected byte {:?} in sample {}",
                    b as char,
                    samples.len()
                )));
            }
            value = value
                .saturating_mul(10)
                .saturating_add(u32::from(b - b'0'));
            digits += 1;
            reader.consume(1);
        }
        if digits == 0 {
            return Err(PbmError::UnexpectedEof {
                needed: count,
                actual: samples.len(),
            });
        }
        samples.push(u8::try_from(value).unwrap_or(u8::MAX));
    }
    Ok(samples)
}

/// Decode the whole raster described by `descriptor`, starting at
/// `data_offset`.
///
/// Bitmaps come back as `Bool` samples; everything else as `U8` normalized
/// to 0..=255. The returned buffer has the format of
/// [`FormatDescriptor::image_format`].
pub fn decode<R: BufRead + Seek>(
    reader: &mut R,
    descriptor: &FormatDescriptor,
    data_offset: u64,
    limits: &Limits,
) -> Result<PixelBuffer, PbmError> {
    let magic = descriptor.magic;
    if descriptor.planes != 1 {
        return Err(PbmError::Unsupported(format!(
            "{} planes requested, Netpbm images have one",
            descriptor.planes
        )));
    }
    let max_value = match u8::try_from(descriptor.max_value) {
        Ok(max) if max > 0 => max,
        _ => {
            return Err(PbmError::InvalidHeader(format!(
                "max-value {} is outside 1..=255",
                descriptor.max_value
            )));
        }
    };
    let count = limits.check_staging(
        descriptor.columns,
        descriptor.rows,
        descriptor.channels(),
        1,
    )?;

    // Every sample takes at least one byte, ASCII or binary.
    let end = reader.seek(SeekFrom::End(0))?;
    let available = end.saturating_sub(data_offset);
    if available < count as u64 {
        return Err(PbmError::UnexpectedEof {
            needed: count,
            actual: available as usize,
        });
    }

    reader.seek(SeekFrom::Start(data_offset))?;
    trace!("reading {count} {magic} samples from byte {data_offset}");

    let samples = match magic {
        Magic::P1 => Samples::Bool(read_ascii_bits(reader, count)?),
        Magic::P4 => Samples::Bool(read_binary(reader, count)?.into_iter().map(|b| b != 0).collect()),
        Magic::P2 | Magic::P3 | Magic::P5 | Magic::P6 => {
            let mut raw = if magic.is_ascii() {
                read_ascii_samples(reader, count)?
            } else {
                read_binary(reader, count)?
            };
            let clamped = normalize(&mut raw, max_value);
            if clamped > 0 {
                warn!("{clamped} samples exceed max-value {max_value}, clamped to 255");
            }
            Samples::U8(raw)
        }
    };

    PixelBuffer::from_samples(descriptor.image_format(), samples)
}
