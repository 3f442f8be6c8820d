//! Construction hooks for a format registry.
//!
//! A registry that dispatches on file extension or leading bytes can hold
//! [`NETPBM`] and call its constructors without knowing about
//! [`PbmResource`].
//!
//! ```no_run
//! use zenpbm::{DiskImageResource as _, registry};
//!
//! let path = std::path::Path::new("scan.pgm");
//! if registry::matches_extension(path) || registry::sniff(path)? {
//!     let resource = registry::construct_open(path)?;
//!     println!("{}x{}", resource.cols(), resource.rows());
//! }
//! # Ok::<(), zenpbm::PbmError>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::PbmError;
use crate::pixel::ImageFormat;
use crate::resource::{DiskImageResource, PbmResource};

/// File extensions (lowercase, without dot) handled by this codec.
pub const EXTENSIONS: &[&str] = &["pbm", "pgm", "ppm", "pnm"];

/// Registry entry describing the codec.
#[derive(Clone, Copy)]
pub struct FormatHook {
    /// Human-readable format name.
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    /// Check whether leading file bytes look like this format.
    pub can_read: fn(&[u8]) -> bool,
    pub construct_open: fn(&Path) -> Result<Box<dyn DiskImageResource>, PbmError>,
    pub construct_create:
        fn(&Path, &ImageFormat) -> Result<Box<dyn DiskImageResource>, PbmError>,
}

/// The Netpbm entry.
pub static NETPBM: FormatHook = FormatHook {
    name: "Netpbm",
    extensions: EXTENSIONS,
    can_read: matches_magic,
    construct_open,
    construct_create,
};

/// Whether `path` has one of the Netpbm extensions (case-insensitive).
pub fn matches_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Whether `header` starts with a P1-P6 magic number followed by
/// whitespace, a comment, or the end of the sample.
pub fn matches_magic(header: &[u8]) -> bool {
    match header {
        [b'P', b'1'..=b'6'] => true,
        [b'P', b'1'..=b'6', next, ..] => next.is_ascii_whitespace() || *next == b'#',
        _ => false,
    }
}

/// Read the first bytes of `path` and check them with [`matches_magic`].
pub fn sniff(path: &Path) -> Result<bool, PbmError> {
    let mut head = [0u8; 3];
    let mut file = File::open(path).map_err(|e| PbmError::from(e).in_file(path))?;
    let mut filled = 0;
    while filled < head.len() {
        let n = file
            .read(&mut head[filled..])
            .map_err(|e| PbmError::from(e).in_file(path))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(matches_magic(&head[..filled]))
}

/// Open `path` for reading.
pub fn construct_open(path: &Path) -> Result<Box<dyn DiskImageResource>, PbmError> {
    Ok(Box::new(PbmResource::open(path)?))
}

/// Create `path` for writing an image of `format`.
pub fn construct_create(
    path: &Path,
    format: &ImageFormat,
) -> Result<Box<dyn DiskImageResource>, PbmError> {
    Ok(Box::new(PbmResource::create(path, format)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        assert!(matches_extension(Path::new("a.pbm")));
        assert!(matches_extension(Path::new("dir/B.PGM")));
        assert!(matches_extension(Path::new("c.pnm")));
        assert!(!matches_extension(Path::new("d.png")));
        assert!(!matches_extension(Path::new("ppm")));
    }

    #[test]
    fn magic_bytes() {
        assert!(matches_magic(b"P5\n"));
        assert!(matches_magic(b"P1#"));
        assert!(matches_magic(b"P3"));
        assert!(!matches_magic(b"P7\n"));
        assert!(!matches_magic(b"P55"));
        assert!(!matches_magic(b"BM"));
        assert!(!matches_magic(b""));
    }
}
