use std::sync::Arc;

use crate::foundation::error::{ChromaError, ChromaResult};

pub use kurbo::{Point, Rect, Vec2};

/// Milliseconds on the host event-loop clock.
///
/// All timed components (transition engine, slideshow scheduler, animation
/// playback) are advanced with caller-supplied timestamps instead of reading
/// a wall clock, so the whole engine can be driven deterministically.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimeMs(pub u64);

impl TimeMs {
    /// This instant shifted forward by `ms` milliseconds.
    pub fn saturating_add(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier` (zero when `earlier` is later).
    pub fn saturating_since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Straight-alpha RGBA8 raster, row-major, tightly packed.
///
/// Rasters are immutable once produced: every transform returns a fresh
/// raster, and the pixel buffer is shared behind an [`Arc`] so clones are
/// cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl Raster {
    /// Wrap a raw RGBA8 buffer; `rgba8.len()` must equal `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> ChromaResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ChromaError::validation("raster dimensions overflow"))?;
        if rgba8.len() != expected {
            return Err(ChromaError::validation(format!(
                "raster buffer length {} does not match {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Constructor for buffers whose length is already known to match.
    pub(crate) fn from_parts(width: u32, height: u32, rgba8: Vec<u8>) -> Self {
        debug_assert_eq!(rgba8.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        }
    }

    /// Fully transparent raster of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba8: Arc::new(vec![0u8; (width as usize) * (height as usize) * 4]),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel bytes in row-major RGBA8 order.
    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// RGBA value at `(x, y)`; both coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.rgba8[idx],
            self.rgba8[idx + 1],
            self.rgba8[idx + 2],
            self.rgba8[idx + 3],
        ]
    }

}

/// Bounding box of the chroma-keyed area of a template, in template-pixel
/// coordinates; `right`/`bottom` are exclusive.
///
/// A region is derived from the template raster (and re-derived on every
/// resize); it is never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRegion {
    /// Leftmost matching column.
    pub left: u32,
    /// Topmost matching row.
    pub top: u32,
    /// One past the rightmost matching column.
    pub right: u32,
    /// One past the bottommost matching row.
    pub bottom: u32,
}

impl KeyRegion {
    /// Validated constructor; requires `right > left` and `bottom > top`.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> ChromaResult<Self> {
        if right <= left || bottom <= top {
            return Err(ChromaError::validation(format!(
                "key region must have positive area, got ({left},{top})..({right},{bottom})"
            )));
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Region width in pixels.
    pub fn width(self) -> u32 {
        self.right - self.left
    }

    /// Region height in pixels.
    pub fn height(self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the region lies fully inside a `width`x`height` raster.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        self.right <= width && self.bottom <= height
    }

    /// The region as a float rect for animated geometry.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}
