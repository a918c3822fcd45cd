// src/surface.rs

//! Owned pixel surfaces and scratch buffers.
//!
//! The engine owns one primary surface plus two engine-private scratch
//! areas: a fixed 64x64 tile surface for the tiled codec path and a
//! growable staging buffer for raw/whole-image decodes. Staging capacity
//! never shrinks, amortizing reallocation across updates.

use crate::color::{CanonicalFormat, CANONICAL_BPP};
use crate::error::RasterError;
use crate::region::Rect;

/// Edge length of the fixed tile scratch surface.
pub const TILE_SIZE: u32 = 64;

/// An owned canonical-format pixel buffer.
///
/// Invariant: `data.len() == width * height * 4` at all times observable
/// outside [`Surface::resize`], and resize is atomic from the caller's
/// perspective: on failure the prior buffer and dimensions are untouched.
pub struct Surface {
    width: u32,
    height: u32,
    format: CanonicalFormat,
    data: Vec<u8>,
}

fn alloc_pixels(width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let bytes = width as usize * height as usize * CANONICAL_BPP;
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| RasterError::Allocation { requested: bytes })?;
    data.resize(bytes, 0);
    Ok(data)
}

impl Surface {
    pub fn new(width: u32, height: u32, format: CanonicalFormat) -> Result<Self, RasterError> {
        Ok(Surface {
            width,
            height,
            format,
            data: alloc_pixels(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> CanonicalFormat {
        self.format
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * CANONICAL_BPP
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_extents(0, 0, self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// A borrowed read-only view for use as a blit source.
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride(),
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height {
            Some((y as usize * self.width as usize + x as usize) * CANONICAL_BPP)
        } else {
            None
        }
    }

    /// Reads one canonical pixel; out-of-extent addresses are refused.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<u32, RasterError> {
        let off = self.offset(x, y).ok_or(RasterError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        Ok(u32::from_le_bytes(
            self.data[off..off + 4].try_into().unwrap(),
        ))
    }

    /// Writes one canonical pixel; out-of-extent addresses are refused.
    pub fn put_pixel(&mut self, x: i32, y: i32, pixel: u32) -> Result<(), RasterError> {
        let off = self.offset(x, y).ok_or(RasterError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.data[off..off + 4].copy_from_slice(&pixel.to_le_bytes());
        Ok(())
    }

    /// Reallocates to the new dimensions. No-op when unchanged. The new
    /// buffer starts with undefined content (callers repaint in full); the
    /// old buffer is only released once the new one is in place.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let data = alloc_pixels(width, height)?;
        self.data = data;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// A borrowed rectangular pixel source: canonical-format data with explicit
/// dimensions and row stride.
#[derive(Clone, Copy)]
pub struct PixelView<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

impl PixelView<'_> {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    /// Reads a pixel known to be inside the view.
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        let off = y as usize * self.stride + x as usize * CANONICAL_BPP;
        u32::from_le_bytes(self.data[off..off + 4].try_into().unwrap())
    }
}

/// The growable staging buffer for whole-image decode paths.
///
/// Capacity only ever increases; a failed grow leaves the previous
/// allocation (and any surface content composited from it) intact.
#[derive(Default)]
pub struct Staging {
    data: Vec<u8>,
}

impl Staging {
    /// Ensures at least `bytes` of backing store and returns the buffer.
    pub fn ensure(&mut self, bytes: usize) -> Result<&mut [u8], RasterError> {
        if self.data.len() < bytes {
            let extra = bytes - self.data.len();
            self.data
                .try_reserve_exact(extra)
                .map_err(|_| RasterError::Allocation { requested: bytes })?;
            self.data.resize(bytes, 0);
        }
        Ok(&mut self.data)
    }

    /// A source view over the first `width`x`height` canonical pixels.
    /// Callers must have filled the region via [`Staging::ensure`] first.
    pub fn view(&self, width: u32, height: u32) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width,
            height,
            stride: width as usize * CANONICAL_BPP,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_capacity_invariant() {
        let s = Surface::new(17, 9, CanonicalFormat::Xrgb32).unwrap();
        assert!(s.data().len() >= 17 * 9 * CANONICAL_BPP);
    }

    #[test]
    fn test_resize_every_pixel_writable() {
        // Contract: after resize(W,H), every (x,y) in [0,W)x[0,H) accepts
        // a write without a bounds violation.
        let mut s = Surface::new(4, 4, CanonicalFormat::Xrgb32).unwrap();
        s.resize(7, 5).unwrap();
        assert!(s.data().len() >= 7 * 5 * CANONICAL_BPP);
        for y in 0..5 {
            for x in 0..7 {
                s.put_pixel(x, y, 0x123456).unwrap();
            }
        }
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut s = Surface::new(8, 8, CanonicalFormat::Xrgb32).unwrap();
        s.put_pixel(3, 3, 0xabcdef).unwrap();
        s.resize(8, 8).unwrap();
        // Unchanged dimensions must not disturb pixel content.
        assert_eq!(s.get_pixel(3, 3).unwrap(), 0xabcdef);
    }

    #[test]
    fn test_out_of_bounds_refused() {
        let mut s = Surface::new(4, 4, CanonicalFormat::Xrgb32).unwrap();
        assert!(matches!(
            s.get_pixel(4, 0),
            Err(RasterError::OutOfBounds { .. })
        ));
        assert!(matches!(
            s.put_pixel(0, -1, 0),
            Err(RasterError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_staging_never_shrinks() {
        let mut staging = Staging::default();
        staging.ensure(1024).unwrap();
        assert_eq!(staging.capacity(), 1024);
        staging.ensure(16).unwrap();
        assert_eq!(staging.capacity(), 1024);
        staging.ensure(4096).unwrap();
        assert_eq!(staging.capacity(), 4096);
    }
}
