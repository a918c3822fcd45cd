// src/color.rs

//! Pixel formats and color conversion.
//!
//! All compositing math happens in one canonical 32-bit layout; sources
//! arrive in heterogeneous depths (32/24/16/15/8 bits per pixel), each in a
//! top-down or bottom-up (vertically flipped) scanline order, with 8-bit
//! input indexing a 256-entry palette. Conversion into the canonical format
//! is exact apart from the bit-depth truncation inherent to the narrower
//! formats.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::RasterError;

/// Bytes per pixel of the canonical internal format.
pub const CANONICAL_BPP: usize = 4;

/// Channel order of the canonical 32-bit format.
///
/// `Xrgb32` stores `0x00RRGGBB`; `Xbgr32` is the inverted variant selected
/// by the engine's `INVERT` flag for presentation layers that want BGR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanonicalFormat {
    Xrgb32,
    Xbgr32,
}

impl CanonicalFormat {
    pub const fn pack(self, r: u8, g: u8, b: u8) -> u32 {
        match self {
            CanonicalFormat::Xrgb32 => ((r as u32) << 16) | ((g as u32) << 8) | b as u32,
            CanonicalFormat::Xbgr32 => ((b as u32) << 16) | ((g as u32) << 8) | r as u32,
        }
    }
}

/// Source pixel depth, without layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDepth {
    /// 32 bpp, little-endian `0x00RRGGBB` words.
    Xrgb32,
    /// 24 bpp, B,G,R byte triplets.
    Rgb24,
    /// 16 bpp, little-endian 5-6-5 words.
    Rgb16,
    /// 15 bpp stored in 16-bit words, 5-5-5.
    Rgb15,
    /// 8 bpp palette indices.
    Indexed8,
}

impl PixelDepth {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelDepth::Xrgb32 => 4,
            PixelDepth::Rgb24 => 3,
            PixelDepth::Rgb16 | PixelDepth::Rgb15 => 2,
            PixelDepth::Indexed8 => 1,
        }
    }
}

/// A source pixel layout: depth plus scanline direction.
///
/// The flip is a layout property selected per call by the protocol layer,
/// never inferred from pixel content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub depth: PixelDepth,
    pub flipped: bool,
}

impl PixelFormat {
    pub const fn new(depth: PixelDepth, flipped: bool) -> Self {
        PixelFormat { depth, flipped }
    }

    /// Maps a declared bits-per-pixel value to a source format. Unknown
    /// depths fall back to 32 bpp, matching the legacy lookup.
    pub fn from_bits_per_pixel(bpp: u32, flipped: bool) -> Self {
        let depth = match bpp {
            32 => PixelDepth::Xrgb32,
            24 => PixelDepth::Rgb24,
            16 => PixelDepth::Rgb16,
            15 => PixelDepth::Rgb15,
            8 => PixelDepth::Indexed8,
            _ => PixelDepth::Xrgb32,
        };
        PixelFormat { depth, flipped }
    }

    pub const fn bytes_per_pixel(&self) -> usize {
        self.depth.bytes_per_pixel()
    }
}

/// A 256-entry palette of canonical pixels for 8-bit indexed sources.
#[derive(Clone)]
pub struct Palette {
    entries: [u32; 256],
}

impl Default for Palette {
    fn default() -> Self {
        Palette { entries: [0; 256] }
    }
}

impl Palette {
    pub fn set(&mut self, index: u8, pixel: u32) {
        self.entries[index as usize] = pixel;
    }

    pub fn get(&self, index: u8) -> u32 {
        self.entries[index as usize]
    }
}

/// Expands a 5-bit channel to 8 bits with bit replication.
const fn expand5(v: u16) -> u8 {
    let v = (v & 0x1f) as u8;
    (v << 3) | (v >> 2)
}

/// Expands a 6-bit channel to 8 bits with bit replication.
const fn expand6(v: u16) -> u8 {
    let v = (v & 0x3f) as u8;
    (v << 2) | (v >> 4)
}

/// Decodes one source pixel at `src` into a canonical pixel.
pub(crate) fn decode_pixel(
    src: &[u8],
    depth: PixelDepth,
    canonical: CanonicalFormat,
    palette: &Palette,
) -> u32 {
    match depth {
        PixelDepth::Xrgb32 => {
            let v = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
            canonical.pack((v >> 16) as u8, (v >> 8) as u8, v as u8)
        }
        PixelDepth::Rgb24 => canonical.pack(src[2], src[1], src[0]),
        PixelDepth::Rgb16 => {
            let v = u16::from_le_bytes([src[0], src[1]]);
            canonical.pack(expand5(v >> 11), expand6(v >> 5), expand5(v))
        }
        PixelDepth::Rgb15 => {
            let v = u16::from_le_bytes([src[0], src[1]]);
            canonical.pack(expand5(v >> 10), expand5(v >> 5), expand5(v))
        }
        PixelDepth::Indexed8 => palette.get(src[0]),
    }
}

/// Converts a `width`×`height` block from an arbitrary source layout into a
/// canonical-format destination buffer.
///
/// `src_stride` of `None` means tightly packed rows. Fails only on a buffer
/// bounds violation and performs no partial writes on failure: both buffers
/// are validated in full before the first pixel is written.
#[allow(clippy::too_many_arguments)]
pub fn convert_image(
    dst: &mut [u8],
    dst_stride: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
    src: &[u8],
    src_format: PixelFormat,
    src_stride: Option<usize>,
    canonical: CanonicalFormat,
    palette: &Palette,
) -> Result<(), RasterError> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    let src_bpp = src_format.bytes_per_pixel();
    let src_stride = src_stride.unwrap_or(width * src_bpp);

    let src_needed = (height - 1) * src_stride + width * src_bpp;
    if src_needed > src.len() {
        return Err(RasterError::OutOfBounds {
            x: width as i32,
            y: height as i32,
            width: (src.len() / src_stride.max(1)) as u32,
            height: height as u32,
        });
    }
    let dst_needed = (dst_y + height - 1) * dst_stride + (dst_x + width) * CANONICAL_BPP;
    if dst_needed > dst.len() {
        return Err(RasterError::OutOfBounds {
            x: (dst_x + width) as i32,
            y: (dst_y + height) as i32,
            width: (dst_stride / CANONICAL_BPP) as u32,
            height: (dst.len() / dst_stride.max(1)) as u32,
        });
    }

    for row in 0..height {
        let src_row = if src_format.flipped {
            height - 1 - row
        } else {
            row
        };
        let src_base = src_row * src_stride;
        let dst_base = (dst_y + row) * dst_stride + dst_x * CANONICAL_BPP;
        for col in 0..width {
            let pixel = decode_pixel(
                &src[src_base + col * src_bpp..],
                src_format.depth,
                canonical,
                palette,
            );
            let off = dst_base + col * CANONICAL_BPP;
            dst[off..off + 4].copy_from_slice(&pixel.to_le_bytes());
        }
    }
    Ok(())
}

/// Expands a monochrome bitmask into canonical pixels.
///
/// Bits are MSB-first within each row byte. A set bit selects the
/// *background* color and a clear bit the *foreground* color; this inverted
/// convention matches the legacy hatch/pattern wire data.
pub fn convert_from_monochrome(
    dst: &mut [u32],
    width: usize,
    height: usize,
    bits: &[u8],
    fg: u32,
    bg: u32,
) {
    let row_bytes = width.div_ceil(8);
    for y in 0..height {
        for x in 0..width {
            let byte = bits[y * row_bytes + x / 8];
            let set = byte & (0x80 >> (x % 8)) != 0;
            dst[y * width + x] = if set { bg } else { fg };
        }
    }
}

/// Converts a source-depth-encoded order color into a canonical pixel.
///
/// Colors on the wire are palette indices at depth ≤ 8, packed 5-5-5 or
/// 5-6-5 words at 15/16 bpp, and `0x00BBGGRR` at 24/32 bpp.
pub fn convert_order_color(
    color: u32,
    src_bpp: u32,
    canonical: CanonicalFormat,
    palette: &Palette,
) -> u32 {
    match src_bpp {
        1..=8 => palette.get((color & 0xff) as u8),
        15 => {
            let v = (color & 0xffff) as u16;
            canonical.pack(expand5(v >> 10), expand5(v >> 5), expand5(v))
        }
        16 => {
            let v = (color & 0xffff) as u16;
            canonical.pack(expand5(v >> 11), expand6(v >> 5), expand5(v))
        }
        24 | 32 => canonical.pack(color as u8, (color >> 8) as u8, (color >> 16) as u8),
        other => {
            warn!("order color with unexpected source depth {other}, treating as 32 bpp");
            canonical.pack(color as u8, (color >> 8) as u8, (color >> 16) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pack_orders() {
        assert_eq!(CanonicalFormat::Xrgb32.pack(0x11, 0x22, 0x33), 0x0011_2233);
        assert_eq!(CanonicalFormat::Xbgr32.pack(0x11, 0x22, 0x33), 0x0033_2211);
    }

    #[test]
    fn test_format_from_bits_per_pixel() {
        let f = PixelFormat::from_bits_per_pixel(15, true);
        assert_eq!(f.depth, PixelDepth::Rgb15);
        assert!(f.flipped);
        assert_eq!(f.bytes_per_pixel(), 2);
        // Unknown depths fall back to 32 bpp.
        let f = PixelFormat::from_bits_per_pixel(7, false);
        assert_eq!(f.depth, PixelDepth::Xrgb32);
    }

    #[test]
    fn test_convert_32bpp_is_exact() {
        // Contract: canonical-to-canonical conversion preserves all color
        // bits exactly.
        let src: Vec<u8> = (0..4u32)
            .flat_map(|i| (i * 0x0001_0203).to_le_bytes())
            .collect();
        let mut dst = vec![0u8; 2 * 2 * 4];
        convert_image(
            &mut dst,
            2 * 4,
            0,
            0,
            2,
            2,
            &src,
            PixelFormat::new(PixelDepth::Xrgb32, false),
            None,
            CanonicalFormat::Xrgb32,
            &Palette::default(),
        )
        .unwrap();
        // The padding byte is not carried over (canonical is 0x00RRGGBB),
        // so compare the low 24 bits of each word.
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact(4)) {
            assert_eq!(&s[..3], &d[..3]);
            assert_eq!(d[3], 0);
        }
    }

    #[test]
    fn test_convert_vertical_flip() {
        // Contract: a flipped source reads its rows bottom-up.
        let mut src = vec![0u8; 2 * 4];
        src[0..4].copy_from_slice(&0x0000_00aau32.to_le_bytes()); // row 0
        src[4..8].copy_from_slice(&0x0000_00bbu32.to_le_bytes()); // row 1
        let mut dst = vec![0u8; 2 * 4];
        convert_image(
            &mut dst,
            4,
            0,
            0,
            1,
            2,
            &src,
            PixelFormat::new(PixelDepth::Xrgb32, true),
            None,
            CanonicalFormat::Xrgb32,
            &Palette::default(),
        )
        .unwrap();
        assert_eq!(u32::from_le_bytes(dst[0..4].try_into().unwrap()), 0xbb);
        assert_eq!(u32::from_le_bytes(dst[4..8].try_into().unwrap()), 0xaa);
    }

    #[test]
    fn test_convert_16bpp_extremes() {
        // 5-6-5 full-on white must expand to 255 per channel.
        let src = 0xffffu16.to_le_bytes();
        let mut dst = [0u8; 4];
        convert_image(
            &mut dst,
            4,
            0,
            0,
            1,
            1,
            &src,
            PixelFormat::new(PixelDepth::Rgb16, false),
            None,
            CanonicalFormat::Xrgb32,
            &Palette::default(),
        )
        .unwrap();
        assert_eq!(u32::from_le_bytes(dst), 0x00ff_ffff);
    }

    #[test]
    fn test_convert_indexed_uses_palette() {
        let mut palette = Palette::default();
        palette.set(7, 0x0012_3456);
        let src = [7u8];
        let mut dst = [0u8; 4];
        convert_image(
            &mut dst,
            4,
            0,
            0,
            1,
            1,
            &src,
            PixelFormat::new(PixelDepth::Indexed8, false),
            None,
            CanonicalFormat::Xrgb32,
            &palette,
        )
        .unwrap();
        assert_eq!(u32::from_le_bytes(dst), 0x0012_3456);
    }

    #[test]
    fn test_convert_rejects_short_source_without_writing() {
        // Contract: bounds failures never partial-write.
        let src = [0u8; 4]; // one pixel present, two claimed
        let mut dst = [0xeeu8; 8];
        let err = convert_image(
            &mut dst,
            8,
            0,
            0,
            2,
            1,
            &src,
            PixelFormat::new(PixelDepth::Xrgb32, false),
            None,
            CanonicalFormat::Xrgb32,
            &Palette::default(),
        );
        assert!(matches!(err, Err(RasterError::OutOfBounds { .. })));
        assert!(dst.iter().all(|&b| b == 0xee));
    }

    #[test]
    fn test_monochrome_expansion_convention() {
        // Contract: set bit -> background, clear bit -> foreground.
        let bits = [0b1010_0000u8];
        let mut out = [0u32; 8];
        convert_from_monochrome(&mut out, 8, 1, &bits, 0xf0f0f0, 0x0a0a0a);
        assert_eq!(out[0], 0x0a0a0a);
        assert_eq!(out[1], 0xf0f0f0);
        assert_eq!(out[2], 0x0a0a0a);
        assert_eq!(out[3], 0xf0f0f0);
    }

    #[test]
    fn test_order_color_paletted() {
        let mut palette = Palette::default();
        palette.set(3, 0xabcdef);
        assert_eq!(
            convert_order_color(0x103, 8, CanonicalFormat::Xrgb32, &palette),
            0xabcdef
        );
    }

    #[test]
    fn test_order_color_true_color() {
        // Wire order colors are 0x00BBGGRR.
        assert_eq!(
            convert_order_color(0x00cc_bbaa, 24, CanonicalFormat::Xrgb32, &Palette::default()),
            0x00aa_bbcc
        );
    }
}
