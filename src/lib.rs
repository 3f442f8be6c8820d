//! # zenpbm
//!
//! Netpbm (P1-P6) image file codec.
//!
//! ## Reading
//!
//! All six variants are decoded into a single-plane [`PixelBuffer`]:
//! - **P1** / **P4** (PBM, ASCII / binary) - boolean grey
//! - **P2** / **P5** (PGM, ASCII / binary) - 8-bit grey
//! - **P3** / **P6** (PPM, ASCII / binary) - 8-bit RGB
//!
//! Samples are normalized from the declared max-value to 0..=255. Samples
//! above the declared max-value clamp to 255. Binary bitmaps (P4) store one
//! byte per sample, not eight samples per byte.
//!
//! ## Writing
//!
//! Every image is written as a P5 greymap. The max-value is 1, 255 or 65535
//! depending on whether the resource was created for boolean, 8-bit or 16-bit
//! channels; colour sources are reduced to luma.
//!
//! ## Non-Goals
//!
//! - Partial-region reads or writes - transfers always cover the whole image
//! - Multi-plane images
//! - Max-values above 255 on read
//! - Streaming or incremental decode
//! - Color management
//!
//! ## Usage
//!
//! ```no_run
//! use zenpbm::{ChannelType, ImageFormat, PbmResource, PixelFormat};
//!
//! // Bind for reading: the header is parsed here
//! let input = PbmResource::open("scan.ppm")?;
//! println!("{}x{} {}", input.format().cols, input.format().rows, input.descriptor().magic);
//!
//! // Decode the whole image in its native format
//! let pixels = input.read_image()?;
//!
//! // Write it back out as an 8-bit greymap
//! let format = ImageFormat::new(pixels.cols(), pixels.rows(), PixelFormat::Gray, ChannelType::U8);
//! let mut output = PbmResource::create("scan.pgm", &format)?;
//! output.write_image(&pixels)?;
//! # Ok::<(), zenpbm::PbmError>(())
//! ```

#![forbid(unsafe_code)]

mod buffer;
mod error;
mod limits;
mod pixel;
mod resource;

pub mod pnm;
pub mod registry;

// Re-exports
#[cfg(feature = "rgb")]
pub use buffer::BufferPixel;
pub use buffer::{PixelBuffer, Samples, convert};
pub use error::{ErrorKind, PbmError};
pub use limits::Limits;
pub use pixel::{ChannelType, ImageFormat, PixelFormat};
pub use pnm::{FormatDescriptor, Magic};
pub use resource::{DiskImageResource, Mode, PbmResource, Region, ResourceOptions};
