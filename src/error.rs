use std::io;
use std::path::PathBuf;

use crate::pixel::ImageFormat;

/// Coarse classification of a [`PbmError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A file could not be opened or created, or a byte range could not be
    /// transferred in full.
    Io,
    /// The header (or ASCII pixel data) is missing, malformed, or out of range.
    Format,
    /// The request is well-formed but this codec does not implement it.
    Unsupported,
}

/// Errors from Netpbm decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PbmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of input: needed {needed} samples, got {actual}")]
    UnexpectedEof { needed: usize, actual: usize },

    #[error("unrecognized magic number {0:?}")]
    UnrecognizedMagic(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer mismatch: expected {expected:?}, got {actual:?}")]
    BufferMismatch {
        expected: ImageFormat,
        actual: ImageFormat,
    },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<PbmError>,
    },
}

impl PbmError {
    /// Which of the three failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::UnexpectedEof { .. } => ErrorKind::Io,
            Self::UnrecognizedMagic(_)
            | Self::InvalidHeader(_)
            | Self::InvalidData(_)
            | Self::DimensionsTooLarge { .. }
            | Self::LimitExceeded(_)
            | Self::BufferMismatch { .. } => ErrorKind::Format,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::InFile { source, .. } => source.kind(),
        }
    }

    /// Attach the file this error was raised for.
    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ Self::InFile { .. } => already,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any file context stripped.
    pub fn root(&self) -> &PbmError {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}
