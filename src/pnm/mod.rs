//! Netpbm family: P1-P3 (ASCII) and P4-P6 (binary) bitmaps, greymaps and
//! pixmaps.
//!
//! Reading understands all six variants. Writing always produces a P5
//! greymap whose max-value follows the requested channel type.

mod decode;
mod encode;

use core::fmt;

pub use decode::{decode, normalize, normalize_sample, parse_header};
pub use encode::{encode, encode_descriptor, write_header};

use crate::pixel::{ChannelType, ImageFormat, PixelFormat};

/// Netpbm magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Magic {
    /// ASCII bitmap.
    P1,
    /// ASCII greymap.
    P2,
    /// ASCII pixmap.
    P3,
    /// Binary bitmap, one byte per sample.
    P4,
    /// Binary greymap.
    P5,
    /// Binary pixmap.
    P6,
}

impl Magic {
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"P1" => Some(Self::P1),
            b"P2" => Some(Self::P2),
            b"P3" => Some(Self::P3),
            b"P4" => Some(Self::P4),
            b"P5" => Some(Self::P5),
            b"P6" => Some(Self::P6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
            Self::P6 => "P6",
        }
    }

    pub fn is_ascii(&self) -> bool {
        matches!(self, Self::P1 | Self::P2 | Self::P3)
    }

    /// Bitmaps carry no max-value field; it is implicitly 1.
    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::P1 | Self::P4)
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            Self::P3 | Self::P6 => PixelFormat::Rgb,
            _ => PixelFormat::Gray,
        }
    }

    pub fn channel_type(&self) -> ChannelType {
        if self.is_bitmap() {
            ChannelType::Bool
        } else {
            ChannelType::U8
        }
    }

    pub fn channels(&self) -> usize {
        self.pixel_format().channels()
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a Netpbm header says about the pixel data that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    pub magic: Magic,
    pub columns: u32,
    pub rows: u32,
    /// Declared maximum sample value; 1 for bitmaps.
    pub max_value: u32,
    pub planes: u32,
}

impl FormatDescriptor {
    /// The in-memory format a decode of this file produces.
    pub fn image_format(&self) -> ImageFormat {
        ImageFormat::new(
            self.columns,
            self.rows,
            self.magic.pixel_format(),
            self.magic.channel_type(),
        )
    }

    pub fn channels(&self) -> usize {
        self.magic.channels()
    }
}
