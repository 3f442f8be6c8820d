/// Sample type of a single channel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// One bit of information, stored as one `bool` per sample.
    Bool,
    /// 8-bit unsigned.
    U8,
    /// 16-bit unsigned.
    U16,
    /// 32-bit float, nominal range 0.0..=1.0.
    F32,
}

impl ChannelType {
    /// Size of one sample on disk or in a flat byte view.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Bool | Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Value of a fully-on sample, as written in a Netpbm max-value field.
    pub fn max_value(&self) -> Option<u32> {
        match self {
            Self::Bool => Some(1),
            Self::U8 => Some(255),
            Self::U16 => Some(65535),
            Self::F32 => None,
        }
    }
}

/// Channel arrangement of a pixel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Number of channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }
}

/// Shape and sample type of an image.
///
/// This is what callers hand to [`crate::PbmResource::create`], and what a
/// bound resource reports back for the file it owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageFormat {
    pub cols: u32,
    pub rows: u32,
    pub planes: u32,
    pub pixel_format: PixelFormat,
    pub channel_type: ChannelType,
}

impl ImageFormat {
    /// Single-plane format.
    pub fn new(cols: u32, rows: u32, pixel_format: PixelFormat, channel_type: ChannelType) -> Self {
        Self {
            cols,
            rows,
            planes: 1,
            pixel_format,
            channel_type,
        }
    }

    pub fn with_planes(mut self, planes: u32) -> Self {
        self.planes = planes;
        self
    }

    pub fn channels(&self) -> usize {
        self.pixel_format.channels()
    }

    /// Total sample count across all planes, or `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        (self.cols as usize)
            .checked_mul(self.rows as usize)?
            .checked_mul(self.planes as usize)?
            .checked_mul(self.channels())
    }

    /// Whether `other` covers the same columns, rows and planes.
    pub fn same_extent(&self, other: &ImageFormat) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.planes == other.planes
    }
}
