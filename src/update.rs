// src/update.rs

//! The surface update pipeline.
//!
//! Compressed surface updates arrive tagged with a codec identifier; the
//! pipeline routes the payload to the matching decode collaborator and
//! composites the result into the primary surface. Decoders are opaque:
//! they take bytes and return either a whole decoded image or a message of
//! fixed-size tiles plus invalidated rectangles.
//!
//! Update compositing deliberately ignores the order-stream clip
//! rectangle; only the tiled path clips, and then only to the rectangles
//! the decoder reported. That mirrors the legacy split between the
//! drawing context and the primary surface context.

use log::{debug, error, warn};

use crate::color::{convert_image, CanonicalFormat, Palette, PixelDepth, PixelFormat, CANONICAL_BPP};
use crate::engine::{blt_into, Pattern, RasterEngine};
use crate::error::RasterError;
use crate::region::{ClipRegion, Rect};
use crate::rop::ROP3_SRCCOPY;
use crate::surface::{PixelView, TILE_SIZE};

/// Codec selector carried by a surface update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    /// Uncompressed pixels in a declared source format.
    None,
    /// Whole-image codec (run-length / planar style); decodes to one
    /// near-canonical buffer.
    NsCodec,
    /// Tiled transform codec; decodes to 64x64 tiles plus invalidated
    /// rectangles.
    RemoteFx,
    /// Anything this engine does not composite.
    Other(u8),
}

/// A codec-tagged surface update. `dest_right`/`dest_bottom` are inclusive,
/// per the wire convention.
pub struct SurfaceCommand<'a> {
    pub codec: CodecId,
    pub dest_left: i32,
    pub dest_top: i32,
    pub dest_right: i32,
    pub dest_bottom: i32,
    /// Declared payload bit depth.
    pub bpp: u32,
    /// Declared decode width; the blit size comes from the destination
    /// rectangle instead (see [`RasterEngine::apply_surface_command`]).
    pub width: u32,
    /// Declared decode height.
    pub height: u32,
    pub data: &'a [u8],
}

/// One rectangle of a bitmap update batch.
pub struct BitmapData<'a> {
    pub dest_left: i32,
    pub dest_top: i32,
    pub dest_right: i32,
    pub dest_bottom: i32,
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub compressed: bool,
    pub data: &'a [u8],
}

/// A whole decoded image and the layout its pixels are in.
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

/// A decoded 64x64 tile with its offset relative to the update's
/// destination origin.
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

/// The output of the tiled codec: tiles plus the rectangles (relative to
/// the destination origin) that must be recomposited.
pub struct TileMessage {
    pub tiles: Vec<Tile>,
    pub rects: Vec<Rect>,
}

/// Whole-image decode collaborator (run-length, planar, and similar).
pub trait ImageDecoder {
    fn decode(
        &mut self,
        data: &[u8],
        bpp: u32,
        width: u32,
        height: u32,
        palette: &Palette,
    ) -> anyhow::Result<DecodedImage>;
}

/// Tiled transform decode collaborator.
pub trait TileDecoder {
    fn decode(&mut self, data: &[u8]) -> anyhow::Result<TileMessage>;
}

/// Registered codec collaborators. All optional; updates for an
/// unregistered codec are skipped with a warning.
#[derive(Default)]
pub struct Codecs {
    pub tiled: Option<Box<dyn TileDecoder>>,
    pub image: Option<Box<dyn ImageDecoder>>,
    pub interleaved: Option<Box<dyn ImageDecoder>>,
    pub planar: Option<Box<dyn ImageDecoder>>,
}

fn check_payload(
    len: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
    bpp: u32,
) -> Result<(), RasterError> {
    let expected = width as usize * height as usize * format.bytes_per_pixel();
    if len < expected {
        return Err(RasterError::DimensionMismatch {
            width,
            height,
            bpp,
            expected,
            actual: len,
        });
    }
    Ok(())
}

impl RasterEngine {
    /// Composites one codec-tagged surface update into the primary surface.
    ///
    /// The declared `width`/`height` size the decode and conversion; the
    /// blit itself covers the inclusive destination rectangle, which is
    /// authoritative even when the two disagree. The asymmetry is part of
    /// the wire contract and preserved literally.
    pub fn apply_surface_command(&mut self, cmd: &SurfaceCommand<'_>) -> Result<(), RasterError> {
        debug!(
            "surface update codec={:?} dest=({},{})-({},{}) declared {}x{} at {} bpp, {} bytes",
            cmd.codec,
            cmd.dest_left,
            cmd.dest_top,
            cmd.dest_right,
            cmd.dest_bottom,
            cmd.width,
            cmd.height,
            cmd.bpp,
            cmd.data.len()
        );
        let dest = Rect::from_inclusive(cmd.dest_left, cmd.dest_top, cmd.dest_right, cmd.dest_bottom);
        match cmd.codec {
            CodecId::None => {
                let format = PixelFormat::from_bits_per_pixel(cmd.bpp, true);
                check_payload(cmd.data.len(), cmd.width, cmd.height, format, cmd.bpp)?;
                self.stage_image(cmd.data, format, cmd.width, cmd.height)?;
                self.blt_staged(dest, cmd.width, cmd.height)
            }
            CodecId::NsCodec => {
                let Some(decoder) = self.codecs.image.as_mut() else {
                    warn!("no whole-image decoder registered, skipping update");
                    return Ok(());
                };
                let decoded =
                    match decoder.decode(cmd.data, cmd.bpp, cmd.width, cmd.height, &self.palette) {
                        Ok(decoded) => decoded,
                        Err(e) => {
                            error!("surface update decode failed: {e:#}");
                            return Err(RasterError::CodecDecode(e));
                        }
                    };
                if let Err(e) = check_payload(
                    decoded.data.len(),
                    cmd.width,
                    cmd.height,
                    decoded.format,
                    cmd.bpp,
                ) {
                    error!("decoder returned short buffer: {e}");
                    return Err(e);
                }
                self.stage_image(&decoded.data, decoded.format, cmd.width, cmd.height)?;
                self.blt_staged(dest, cmd.width, cmd.height)
            }
            CodecId::RemoteFx => self.apply_tiled(cmd),
            CodecId::Other(id) => {
                warn!("unsupported codec id {id}, skipping update");
                Ok(())
            }
        }
    }

    /// Converts a source-format image of declared size into the staging
    /// buffer in canonical form.
    fn stage_image(
        &mut self,
        data: &[u8],
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<(), RasterError> {
        let canonical = self.canonical();
        let stride = width as usize * CANONICAL_BPP;
        let buf = self.staging.ensure(stride * height as usize)?;
        convert_image(
            buf,
            stride,
            0,
            0,
            width as usize,
            height as usize,
            data,
            format,
            None,
            canonical,
            &self.palette,
        )
    }

    /// Copies the staged image to the destination rectangle. The blit size
    /// is the inclusive destination rectangle, not the declared size the
    /// staging conversion used.
    fn blt_staged(&mut self, dest: Rect, staged_w: u32, staged_h: u32) -> Result<(), RasterError> {
        blt_into(
            &mut self.primary,
            &ClipRegion::default(),
            &mut self.damage,
            dest.left,
            dest.top,
            dest.width(),
            dest.height(),
            Some((self.staging.view(staged_w, staged_h), 0, 0)),
            &Pattern::Color(0),
            ROP3_SRCCOPY,
        )
    }

    fn apply_tiled(&mut self, cmd: &SurfaceCommand<'_>) -> Result<(), RasterError> {
        let Some(decoder) = self.codecs.tiled.as_mut() else {
            warn!("no tiled decoder registered, skipping update");
            return Ok(());
        };
        let message = match decoder.decode(cmd.data) {
            Ok(message) => message,
            Err(e) => {
                error!("tiled update decode failed: {e:#}");
                return Err(RasterError::CodecDecode(e));
            }
        };
        debug!(
            "tiled update: {} tiles, {} rects",
            message.tiles.len(),
            message.rects.len()
        );

        let tile_px = TILE_SIZE as usize * TILE_SIZE as usize * CANONICAL_BPP;
        for tile in &message.tiles {
            if tile.data.len() < TILE_SIZE as usize * TILE_SIZE as usize * tile.format.bytes_per_pixel() {
                warn!("short tile payload at ({},{}), skipping tile", tile.x, tile.y);
                continue;
            }
            let tx = cmd.dest_left + tile.x;
            let ty = cmd.dest_top + tile.y;

            // A decoded tile that is already in the canonical layout is
            // blitted straight from the decoder's buffer; the borrow ends
            // with this update, so the decoder can never observe aliasing.
            let direct = self.canonical() == CanonicalFormat::Xrgb32
                && tile.format == PixelFormat::new(PixelDepth::Xrgb32, false);
            if !direct {
                let stride = self.tile.stride();
                let canonical = self.canonical();
                convert_image(
                    self.tile.data_mut(),
                    stride,
                    0,
                    0,
                    TILE_SIZE as usize,
                    TILE_SIZE as usize,
                    &tile.data,
                    tile.format,
                    None,
                    canonical,
                    &self.palette,
                )?;
            }
            let view = if direct {
                PixelView {
                    data: &tile.data[..tile_px],
                    width: TILE_SIZE,
                    height: TILE_SIZE,
                    stride: TILE_SIZE as usize * CANONICAL_BPP,
                }
            } else {
                self.tile.view()
            };

            // A tile intersecting several invalidated rectangles is blitted
            // once per rectangle, in decoder order; the last write wins in
            // any overlap.
            for rect in &message.rects {
                let mut clip = ClipRegion::default();
                clip.set(Some(Rect::from_extents(
                    cmd.dest_left + rect.left,
                    cmd.dest_top + rect.top,
                    rect.width(),
                    rect.height(),
                )));
                blt_into(
                    &mut self.primary,
                    &clip,
                    &mut self.damage,
                    tx,
                    ty,
                    TILE_SIZE as i32,
                    TILE_SIZE as i32,
                    Some((view, 0, 0)),
                    &Pattern::Color(0),
                    ROP3_SRCCOPY,
                )?;
            }
        }
        Ok(())
    }

    /// Composites a batch of bitmap-update rectangles. Compressed payloads
    /// route to the run-length decoder below 32 bpp and the planar decoder
    /// at 32 bpp; uncompressed payloads convert from the declared format in
    /// bottom-up row order. A decode failure skips that rectangle only.
    pub fn apply_bitmap_update(&mut self, rectangles: &[BitmapData<'_>]) -> Result<(), RasterError> {
        for bitmap in rectangles {
            let dest = Rect::from_inclusive(
                bitmap.dest_left,
                bitmap.dest_top,
                bitmap.dest_right,
                bitmap.dest_bottom,
            );
            if bitmap.compressed {
                let slot = if bitmap.bpp < 32 {
                    self.codecs.interleaved.as_mut()
                } else {
                    self.codecs.planar.as_mut()
                };
                let Some(decoder) = slot else {
                    warn!("no decoder for compressed {} bpp bitmap, skipping", bitmap.bpp);
                    continue;
                };
                let decoded = match decoder.decode(
                    bitmap.data,
                    bitmap.bpp,
                    bitmap.width,
                    bitmap.height,
                    &self.palette,
                ) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        error!("bitmap decompression failure: {e:#}");
                        continue;
                    }
                };
                if check_payload(
                    decoded.data.len(),
                    bitmap.width,
                    bitmap.height,
                    decoded.format,
                    bitmap.bpp,
                )
                .is_err()
                {
                    error!("bitmap decoder returned short buffer, skipping rectangle");
                    continue;
                }
                self.stage_image(&decoded.data, decoded.format, bitmap.width, bitmap.height)?;
            } else {
                let format = PixelFormat::from_bits_per_pixel(bitmap.bpp, true);
                check_payload(
                    bitmap.data.len(),
                    bitmap.width,
                    bitmap.height,
                    format,
                    bitmap.bpp,
                )?;
                self.stage_image(bitmap.data, format, bitmap.width, bitmap.height)?;
            }
            self.blt_staged(dest, bitmap.width, bitmap.height)?;
        }
        Ok(())
    }
}
