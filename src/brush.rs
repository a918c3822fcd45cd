// src/brush.rs

//! Brush synthesis.
//!
//! Brushes are transient value objects built from order parameters and
//! discarded after the call; materialization turns one into an 8x8 tile of
//! canonical pixels that the blit path samples with modulo addressing.
//! Materialization is a pure function of its inputs: identical
//! (style, colors, index/bitmap) always yields a byte-identical tile.

use log::warn;

use crate::color::{
    convert_from_monochrome, decode_pixel, CanonicalFormat, Palette, PixelFormat,
};

/// Brush tile edge length in pixels.
pub const BRUSH_SIZE: usize = 8;

/// An 8x8 tile of canonical pixels.
pub type PatternTile = [u32; BRUSH_SIZE * BRUSH_SIZE];

/// Brush style from the order stream. Unknown styles are carried so the
/// dispatcher can log and skip them without failing the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushStyle {
    Solid,
    Hatched,
    Pattern,
    Other(u8),
}

/// A brush descriptor as parsed from an order.
#[derive(Debug, Clone)]
pub struct Brush {
    pub style: BrushStyle,
    /// Hatch pattern index, meaningful for [`BrushStyle::Hatched`].
    pub hatch: u8,
    /// Pattern bitmap: 8 mask bytes at 1 bpp, otherwise 8x8 pixels in the
    /// source format implied by `bpp`.
    pub data: Option<Vec<u8>>,
    pub bpp: u32,
}

impl Brush {
    pub fn solid() -> Self {
        Brush {
            style: BrushStyle::Solid,
            hatch: 0,
            data: None,
            bpp: 1,
        }
    }
}

/// The six fixed hatch patterns as monochrome rows: horizontal, vertical,
/// forward-diagonal, backward-diagonal, cross, diagonal-cross. Set bits
/// select the background color (see `color::convert_from_monochrome`).
pub const HATCH_PATTERNS: [[u8; 8]; 6] = [
    [0xff, 0xff, 0xff, 0x00, 0xff, 0xff, 0xff, 0xff],
    [0xf7, 0xf7, 0xf7, 0xf7, 0xf7, 0xf7, 0xf7, 0xf7],
    [0xfe, 0xfd, 0xfb, 0xf7, 0xef, 0xdf, 0xbf, 0x7f],
    [0x7f, 0xbf, 0xdf, 0xef, 0xf7, 0xfb, 0xfd, 0xfe],
    [0xf7, 0xf7, 0xf7, 0x00, 0xf7, 0xf7, 0xf7, 0xf7],
    [0x7e, 0xbd, 0xdb, 0xe7, 0xe7, 0xdb, 0xbd, 0x7e],
];

/// Materializes a brush into an 8x8 canonical tile.
///
/// Returns `None` for unknown styles and malformed pattern data; the
/// caller logs and skips the fill rather than failing the order stream.
pub fn materialize(
    brush: &Brush,
    fg: u32,
    bg: u32,
    canonical: CanonicalFormat,
    palette: &Palette,
) -> Option<PatternTile> {
    match brush.style {
        BrushStyle::Solid => Some([fg; BRUSH_SIZE * BRUSH_SIZE]),
        BrushStyle::Hatched => {
            let Some(rows) = HATCH_PATTERNS.get(brush.hatch as usize) else {
                warn!("hatch brush with invalid index {}", brush.hatch);
                return None;
            };
            let mut tile = [0u32; BRUSH_SIZE * BRUSH_SIZE];
            convert_from_monochrome(&mut tile, BRUSH_SIZE, BRUSH_SIZE, rows, fg, bg);
            Some(tile)
        }
        BrushStyle::Pattern => {
            let Some(data) = brush.data.as_deref() else {
                warn!("pattern brush without bitmap data");
                return None;
            };
            if brush.bpp > 1 {
                let format = PixelFormat::from_bits_per_pixel(brush.bpp, false);
                let bpp = format.bytes_per_pixel();
                if data.len() < BRUSH_SIZE * BRUSH_SIZE * bpp {
                    warn!(
                        "pattern brush bitmap too short: {} bytes at {} bpp",
                        data.len(),
                        brush.bpp
                    );
                    return None;
                }
                let mut tile = [0u32; BRUSH_SIZE * BRUSH_SIZE];
                for (i, px) in tile.iter_mut().enumerate() {
                    *px = decode_pixel(&data[i * bpp..], format.depth, canonical, palette);
                }
                Some(tile)
            } else {
                if data.len() < BRUSH_SIZE {
                    warn!("monochrome pattern brush with {} mask bytes", data.len());
                    return None;
                }
                let mut tile = [0u32; BRUSH_SIZE * BRUSH_SIZE];
                convert_from_monochrome(&mut tile, BRUSH_SIZE, BRUSH_SIZE, data, fg, bg);
                Some(tile)
            }
        }
        BrushStyle::Other(style) => {
            warn!("unimplemented brush style {style}");
            None
        }
    }
}
