use crate::error::PbmError;

/// Resource limits applied when a resource is bound and before every
/// staging allocation.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for one staging buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// No limits at all.
    pub const fn none() -> Self {
        Self {
            max_width: None,
            max_height: None,
            max_pixels: None,
            max_memory_bytes: None,
        }
    }

    pub fn with_max_dimensions(mut self, width: u64, height: u64) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Reject a header whose declared extent is over any dimension limit.
    pub(crate) fn check_dimensions(&self, cols: u32, rows: u32) -> Result<(), PbmError> {
        let pixels = u64::from(cols) * u64::from(rows);
        for (what, value, limit) in [
            ("width", u64::from(cols), self.max_width),
            ("height", u64::from(rows), self.max_height),
            ("pixel count", pixels, self.max_pixels),
        ] {
            if let Some(limit) = limit {
                if value > limit {
                    return Err(PbmError::LimitExceeded(format!(
                        "{what} {value} exceeds limit {limit}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Size a staging buffer of `cols * rows * samples` items of
    /// `bytes_per_sample` each, failing on overflow, above `isize::MAX` bytes,
    /// or over the memory limit.
    pub(crate) fn check_staging(
        &self,
        cols: u32,
        rows: u32,
        samples: usize,
        bytes_per_sample: usize,
    ) -> Result<usize, PbmError> {
        let count = (cols as usize)
            .checked_mul(rows as usize)
            .and_then(|px| px.checked_mul(samples))
            .ok_or(PbmError::DimensionsTooLarge {
                width: cols,
                height: rows,
            })?;
        let bytes = count
            .checked_mul(bytes_per_sample)
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or(PbmError::DimensionsTooLarge {
                width: cols,
                height: rows,
            })?;
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes as u64 > max_mem {
                return Err(PbmError::LimitExceeded(format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(count)
    }
}
