//! Owned pixel buffers and type/layout-aware conversion between them.

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::PbmError;
use crate::pixel::{ChannelType, ImageFormat, PixelFormat};

/// Typed sample storage, row-major and channel-interleaved.
#[derive(Clone, Debug, PartialEq)]
pub enum Samples {
    Bool(Vec<bool>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl Samples {
    fn zeroed(channel_type: ChannelType, len: usize) -> Self {
        match channel_type {
            ChannelType::Bool => Self::Bool(vec![false; len]),
            ChannelType::U8 => Self::U8(vec![0; len]),
            ChannelType::U16 => Self::U16(vec![0; len]),
            ChannelType::F32 => Self::F32(vec![0.0; len]),
        }
    }

    pub fn channel_type(&self) -> ChannelType {
        match self {
            Self::Bool(_) => ChannelType::Bool,
            Self::U8(_) => ChannelType::U8,
            Self::U16(_) => ChannelType::U16,
            Self::F32(_) => ChannelType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, i: usize) -> f64 {
        match self {
            Self::Bool(v) => f64::from(u8::from(v[i])),
            Self::U8(v) => f64::from(v[i]),
            Self::U16(v) => f64::from(v[i]),
            Self::F32(v) => f64::from(v[i]),
        }
    }

    // Saturating store.
    fn set(&mut self, i: usize, value: f64) {
        match self {
            Self::Bool(v) => v[i] = value != 0.0,
            Self::U8(v) => v[i] = value.round().clamp(0.0, 255.0) as u8,
            Self::U16(v) => v[i] = value.round().clamp(0.0, 65535.0) as u16,
            Self::F32(v) => v[i] = value as f32,
        }
    }
}

/// Full-scale value of a channel type in the numeric domain used by [`convert`].
fn full_scale(channel_type: ChannelType) -> f64 {
    match channel_type {
        ChannelType::Bool | ChannelType::F32 => 1.0,
        ChannelType::U8 => 255.0,
        ChannelType::U16 => 65535.0,
    }
}

/// An owned, contiguous image.
///
/// Pixels are stored row-major with channels interleaved. Strides are
/// expressed in pixels: one per column, `cols` per row, `cols * rows` per
/// plane.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    format: ImageFormat,
    samples: Samples,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer for `format`.
    pub fn new(format: ImageFormat) -> Result<Self, PbmError> {
        let bytes_per_sample = format.channel_type.bytes_per_sample();
        let len = format
            .sample_count()
            .filter(|&n| {
                n.checked_mul(bytes_per_sample)
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(PbmError::DimensionsTooLarge {
            width: format.cols,
            height: format.rows,
        })?;
        Ok(Self {
            format,
            samples: Samples::zeroed(format.channel_type, len),
        })
    }

    /// Wrap existing samples. The sample type must match
    /// `format.channel_type` and the length must cover the whole extent.
    pub fn from_samples(format: ImageFormat, samples: Samples) -> Result<Self, PbmError> {
        if samples.channel_type() != format.channel_type {
            return Err(PbmError::InvalidData(format!(
                "{:?} samples supplied for a {:?} buffer",
                samples.channel_type(),
                format.channel_type
            )));
        }
        let needed = format.sample_count().ok_or(PbmError::DimensionsTooLarge {
            width: format.cols,
            height: format.rows,
        })?;
        if samples.len() != needed {
            return Err(PbmError::InvalidData(format!(
                "buffer needs {needed} samples, got {}",
                samples.len()
            )));
        }
        Ok(Self { format, samples })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn cols(&self) -> u32 {
        self.format.cols
    }

    pub fn rows(&self) -> u32 {
        self.format.rows
    }

    pub fn planes(&self) -> u32 {
        self.format.planes
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format.pixel_format
    }

    pub fn channel_type(&self) -> ChannelType {
        self.format.channel_type
    }

    pub fn cstride(&self) -> usize {
        1
    }

    pub fn rstride(&self) -> usize {
        self.format.cols as usize
    }

    pub fn pstride(&self) -> usize {
        self.format.cols as usize * self.format.rows as usize
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn into_samples(self) -> Samples {
        self.samples
    }

    /// Numeric value of one sample of plane 0.
    ///
    /// # Panics
    /// If the coordinates are outside the buffer.
    pub fn sample(&self, col: u32, row: u32, channel: usize) -> f64 {
        let pixel = row as usize * self.rstride() + col as usize * self.cstride();
        self.samples.get(pixel * self.channels() + channel)
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match &self.samples {
            Samples::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.samples {
            Samples::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match &self.samples {
            Samples::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.samples {
            Samples::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Reinterpret an 8-bit buffer as a typed pixel slice.
    ///
    /// Returns [`PbmError::BufferMismatch`] unless the buffer is `U8` with the
    /// pixel format of `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: BufferPixel>(&self) -> Result<&[P], PbmError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        match &self.samples {
            Samples::U8(bytes) if self.format.pixel_format == P::FORMAT => Ok(bytes.as_pixels()),
            _ => Err(PbmError::BufferMismatch {
                expected: ImageFormat {
                    pixel_format: P::FORMAT,
                    channel_type: ChannelType::U8,
                    ..self.format
                },
                actual: self.format,
            }),
        }
    }

    /// Zero-copy view of plane 0 as an [`imgref::ImgRef`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: BufferPixel>(&self) -> Result<imgref::ImgRef<'_, P>, PbmError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            &pixels[..self.pstride()],
            self.format.cols as usize,
            self.format.rows as usize,
        ))
    }

    /// Zero-copy view of plane 0 of an 8-bit grey buffer.
    #[cfg(feature = "imgref")]
    pub fn as_gray_imgref(&self) -> Result<imgref::ImgRef<'_, u8>, PbmError> {
        match &self.samples {
            Samples::U8(bytes) if self.format.pixel_format == PixelFormat::Gray => {
                Ok(imgref::ImgRef::new(
                    &bytes[..self.pstride()],
                    self.format.cols as usize,
                    self.format.rows as usize,
                ))
            }
            _ => Err(PbmError::BufferMismatch {
                expected: ImageFormat {
                    pixel_format: PixelFormat::Gray,
                    channel_type: ChannelType::U8,
                    ..self.format
                },
                actual: self.format,
            }),
        }
    }
}

/// Typed pixels that an 8-bit [`PixelBuffer`] can be viewed as.
#[cfg(feature = "rgb")]
pub trait BufferPixel: Copy {
    const FORMAT: PixelFormat;
}

#[cfg(feature = "rgb")]
impl BufferPixel for rgb::RGB8 {
    const FORMAT: PixelFormat = PixelFormat::Rgb;
}

#[cfg(feature = "rgb")]
impl BufferPixel for rgb::RGBA8 {
    const FORMAT: PixelFormat = PixelFormat::Rgba;
}

/// Convert `src` into `dest`, which must already have the same extent.
///
/// The pixel format and channel type of `dest` decide the result. Grey is
/// derived from RGB with Rec.601 luma weights; a missing alpha channel is
/// filled opaque. With `rescale`, values are mapped between the full ranges
/// of the two channel types (u8 255 becomes u16 65535, boolean `true`
/// becomes the destination maximum); without it the numeric value is kept
/// and saturated. Any nonzero value becomes boolean `true`.
pub fn convert(dest: &mut PixelBuffer, src: &PixelBuffer, rescale: bool) -> Result<(), PbmError> {
    if !dest.format.same_extent(&src.format) {
        return Err(PbmError::BufferMismatch {
            expected: dest.format,
            actual: src.format,
        });
    }

    let src_fmt = src.format.pixel_format;
    let dst_fmt = dest.format.pixel_format;
    let src_ch = src_fmt.channels();
    let dst_ch = dst_fmt.channels();
    let dst_max = full_scale(dest.format.channel_type);
    let scale = if rescale {
        dst_max / full_scale(src.format.channel_type)
    } else {
        1.0
    };

    let pixels = src.samples.len() / src_ch;
    let mut px = [0.0f64; 4];
    for i in 0..pixels {
        for (c, v) in px.iter_mut().enumerate().take(src_ch) {
            *v = src.samples.get(i * src_ch + c) * scale;
        }
        let out = reshape(src_fmt, dst_fmt, px, dst_max);
        for (c, &v) in out.iter().enumerate().take(dst_ch) {
            dest.samples.set(i * dst_ch + c, v);
        }
    }
    Ok(())
}

fn luma(r: f64, g: f64, b: f64) -> f64 {
    (r * 299.0 + g * 587.0 + b * 114.0) / 1000.0
}

fn reshape(from: PixelFormat, to: PixelFormat, px: [f64; 4], opaque: f64) -> [f64; 4] {
    use PixelFormat::*;

    // Normalize to (gray-or-rgb, alpha) first.
    let (rgb, alpha) = match from {
        Gray => ([px[0]; 3], opaque),
        GrayAlpha => ([px[0]; 3], px[1]),
        Rgb => ([px[0], px[1], px[2]], opaque),
        Rgba => ([px[0], px[1], px[2]], px[3]),
    };
    let from_color = matches!(from, Rgb | Rgba);
    let gray = if from_color {
        luma(rgb[0], rgb[1], rgb[2])
    } else {
        rgb[0]
    };

    match to {
        Gray => [gray, 0.0, 0.0, 0.0],
        GrayAlpha => [gray, alpha, 0.0, 0.0],
        Rgb => [rgb[0], rgb[1], rgb[2], 0.0],
        Rgba => [rgb[0], rgb[1], rgb[2], alpha],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_swaps_go_through_from_samples() {
        let gray = ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U8);
        let buf = PixelBuffer::from_samples(gray, Samples::U8(vec![1, 2])).unwrap();
        let rgb = ImageFormat::new(2, 1, PixelFormat::Rgb, ChannelType::U8);
        let err = PixelBuffer::from_samples(rgb, buf.into_samples()).unwrap_err();
        assert!(matches!(err, PbmError::InvalidData(_)));
        assert!(PixelBuffer::from_samples(gray, Samples::U8(Vec::new())).is_err());
    }

    #[test]
    fn convert_never_reads_past_storage() {
        let src = PixelBuffer::from_samples(
            ImageFormat::new(2, 1, PixelFormat::Gray, ChannelType::U8),
            Samples::U8(vec![0, 255]),
        )
        .unwrap();
        let mut dst =
            PixelBuffer::new(ImageFormat::new(2, 1, PixelFormat::Rgba, ChannelType::U16)).unwrap();
        convert(&mut dst, &src, true).unwrap();
        assert_eq!(dst.samples().len(), 8);
        assert_eq!(dst.as_u16().unwrap(), &[0, 0, 0, 65535, 65535, 65535, 65535, 65535]);
    }
}
