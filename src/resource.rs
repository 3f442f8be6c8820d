//! File-bound Netpbm resources.
//!
//! A [`PbmResource`] is bound to one path either for reading (after its
//! header was parsed) or for writing (after a header was emitted). The byte
//! offset where pixel data starts is captured at bind time, and every
//! transfer seeks back to it, so one resource can be read any number of
//! times.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};

use log::debug;

use crate::buffer::{PixelBuffer, convert};
use crate::error::PbmError;
use crate::limits::Limits;
use crate::pixel::{ChannelType, ImageFormat, PixelFormat};
use crate::pnm::{self, FormatDescriptor};

/// Image resource stored on disk.
///
/// Implemented by [`PbmResource`]; the registry hands these out as trait
/// objects.
pub trait DiskImageResource {
    /// Path the resource is bound to.
    fn filename(&self) -> &Path;

    /// Format of the stored image.
    fn format(&self) -> ImageFormat;

    /// Read the `region` of the stored image into `dest`.
    fn read(&self, dest: &mut PixelBuffer, region: Region) -> Result<(), PbmError>;

    /// Write `src` into the `region` of the stored image.
    fn write(&mut self, src: &PixelBuffer, region: Region) -> Result<(), PbmError>;

    fn cols(&self) -> u32 {
        self.format().cols
    }

    fn rows(&self) -> u32 {
        self.format().rows
    }

    fn planes(&self) -> u32 {
        self.format().planes
    }

    fn channels(&self) -> usize {
        self.format().channels()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format().pixel_format
    }

    fn channel_type(&self) -> ChannelType {
        self.format().channel_type
    }
}

/// Rectangle of an image, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole extent of a `cols` x `rows` image.
    pub fn full(cols: u32, rows: u32) -> Self {
        Self::new(0, 0, cols, rows)
    }

    pub fn is_full(&self, cols: u32, rows: u32) -> bool {
        *self == Self::full(cols, rows)
    }
}

/// What a resource is bound for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// Settings shared by every transfer a resource performs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceOptions {
    limits: Limits,
    rescale: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceOptions {
    /// No limits; rescaling on.
    pub fn new() -> Self {
        Self {
            limits: Limits::none(),
            rescale: true,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether conversions map between the full ranges of the source and
    /// destination channel types (on by default).
    pub fn with_rescale(mut self, rescale: bool) -> Self {
        self.rescale = rescale;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn rescale(&self) -> bool {
        self.rescale
    }
}

/// A Netpbm file bound for reading or writing.
#[derive(Clone, Debug)]
pub struct PbmResource {
    path: PathBuf,
    mode: Mode,
    format: ImageFormat,
    descriptor: FormatDescriptor,
    data_offset: u64,
    options: ResourceOptions,
}

impl PbmResource {
    /// Bind `path` for reading by parsing its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PbmError> {
        Self::open_with(path, ResourceOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: ResourceOptions) -> Result<Self, PbmError> {
        let path = path.as_ref().to_path_buf();
        let (descriptor, data_offset) =
            bind_read(&path, &options).map_err(|e| e.in_file(&path))?;
        Ok(Self {
            format: descriptor.image_format(),
            path,
            mode: Mode::Read,
            descriptor,
            data_offset,
            options,
        })
    }

    /// Create (or truncate) `path` and write a P5 header for `format`.
    ///
    /// Unsupported formats are rejected before the file is touched.
    pub fn create(path: impl AsRef<Path>, format: &ImageFormat) -> Result<Self, PbmError> {
        Self::create_with(path, format, ResourceOptions::default())
    }

    pub fn create_with(
        path: impl AsRef<Path>,
        format: &ImageFormat,
        options: ResourceOptions,
    ) -> Result<Self, PbmError> {
        let path = path.as_ref().to_path_buf();
        let (descriptor, data_offset) =
            bind_write(&path, format, &options).map_err(|e| e.in_file(&path))?;
        Ok(Self {
            path,
            mode: Mode::Write,
            format: *format,
            descriptor,
            data_offset,
            options,
        })
    }

    /// Bind again in the same mode: re-parse the header of a read resource,
    /// or re-emit (and truncate after) the header of a write resource.
    pub fn reopen(&mut self) -> Result<(), PbmError> {
        let (descriptor, data_offset) = match self.mode {
            Mode::Read => bind_read(&self.path, &self.options),
            Mode::Write => bind_write(&self.path, &self.format, &self.options),
        }
        .map_err(|e| e.in_file(&self.path))?;
        if self.mode == Mode::Read {
            self.format = descriptor.image_format();
        }
        self.descriptor = descriptor;
        self.data_offset = data_offset;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The header as parsed (read) or emitted (write).
    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Byte offset of the first pixel.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    pub fn rescale(&self) -> bool {
        self.options.rescale
    }

    /// Read the whole image into `dest`, converting to its format.
    ///
    /// `region` must cover the whole image and `dest` must have the image's
    /// columns and rows; anything else is [`PbmError::Unsupported`].
    pub fn read(&self, dest: &mut PixelBuffer, region: Region) -> Result<(), PbmError> {
        self.check_transfer(Mode::Read, dest.cols(), dest.rows(), region)
            .and_then(|()| {
                let src = self.decode_file()?;
                convert(dest, &src, self.options.rescale)
            })
            .map_err(|e| e.in_file(&self.path))
    }

    /// Read the whole image in its native format.
    ///
    /// Nothing is allocated until the file is known to hold the whole raster.
    pub fn read_image(&self) -> Result<PixelBuffer, PbmError> {
        let (cols, rows) = (self.format.cols, self.format.rows);
        self.check_transfer(Mode::Read, cols, rows, Region::full(cols, rows))
            .and_then(|()| self.decode_file())
            .map_err(|e| e.in_file(&self.path))
    }

    fn decode_file(&self) -> Result<PixelBuffer, PbmError> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        pnm::decode(
            &mut reader,
            &self.descriptor,
            self.data_offset,
            &self.options.limits,
        )
    }

    /// Write `src` as the image body, replacing whatever body was there.
    ///
    /// `region` must cover the whole image and `src` must have the image's
    /// columns and rows; anything else is [`PbmError::Unsupported`].
    pub fn write(&mut self, src: &PixelBuffer, region: Region) -> Result<(), PbmError> {
        self.check_transfer(Mode::Write, src.cols(), src.rows(), region)
            .and_then(|()| {
                let mut file = OpenOptions::new().write(true).open(&self.path)?;
                let body = pnm::encode(
                    &mut file,
                    src,
                    &self.format,
                    self.data_offset,
                    self.options.rescale,
                )?;
                let end = file.stream_position()?;
                file.set_len(end)?;
                debug!("wrote {body} body bytes to {}", self.path.display());
                Ok(())
            })
            .map_err(|e| e.in_file(&self.path))
    }

    /// Write `src` as the whole image.
    pub fn write_image(&mut self, src: &PixelBuffer) -> Result<(), PbmError> {
        self.write(src, Region::full(self.format.cols, self.format.rows))
    }

    fn check_transfer(&self, wanted: Mode, cols: u32, rows: u32, region: Region) -> Result<(), PbmError> {
        if self.mode != wanted {
            return Err(PbmError::Unsupported(format!(
                "resource is bound for {:?}, not {wanted:?}",
                self.mode
            )));
        }
        let (image_cols, image_rows) = (self.format.cols, self.format.rows);
        if !region.is_full(image_cols, image_rows) {
            return Err(PbmError::Unsupported(format!(
                "partial transfers are not supported: requested {region:?} of a {image_cols}x{image_rows} image"
            )));
        }
        if cols != image_cols || rows != image_rows {
            return Err(PbmError::Unsupported(format!(
                "buffer is {cols}x{rows} but the image is {image_cols}x{image_rows}"
            )));
        }
        Ok(())
    }
}

fn bind_read(path: &Path, options: &ResourceOptions) -> Result<(FormatDescriptor, u64), PbmError> {
    let mut reader = BufReader::new(File::open(path)?);
    let (descriptor, data_offset) = pnm::parse_header(&mut reader)?;
    options
        .limits
        .check_dimensions(descriptor.columns, descriptor.rows)?;
    debug!("opened {} for reading", path.display());
    Ok((descriptor, data_offset))
}

fn bind_write(
    path: &Path,
    format: &ImageFormat,
    options: &ResourceOptions,
) -> Result<(FormatDescriptor, u64), PbmError> {
    let descriptor = pnm::encode_descriptor(format)?;
    options.limits.check_dimensions(format.cols, format.rows)?;
    let mut file = File::create(path)?;
    let data_offset = pnm::write_header(&mut file, &descriptor)?;
    debug!("created {} for writing", path.display());
    Ok((descriptor, data_offset))
}

impl DiskImageResource for PbmResource {
    fn filename(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> ImageFormat {
        self.format
    }

    fn read(&self, dest: &mut PixelBuffer, region: Region) -> Result<(), PbmError> {
        PbmResource::read(self, dest, region)
    }

    fn write(&mut self, src: &PixelBuffer, region: Region) -> Result<(), PbmError> {
        PbmResource::write(self, src, region)
    }
}
