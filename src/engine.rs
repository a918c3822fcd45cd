// src/engine.rs

//! The compositing engine: primary surface ownership, the BitBlt
//! primitive, and the order dispatcher.
//!
//! All state mutation funnels through `&mut self`, so ordering and
//! single-writer requirements are enforced by the borrow checker; the
//! engine itself is strictly sequential and never blocks.

use log::{debug, trace};

use crate::brush::{Brush, PatternTile, BRUSH_SIZE};
use crate::color::{convert_order_color, CanonicalFormat, Palette, CANONICAL_BPP};
use crate::config::EngineConfig;
use crate::error::RasterError;
use crate::orders::{FrameAction, Order};
use crate::region::{ClipRegion, DamageSet, Rect};
use crate::rop::{rop2, rop3, ROP3_SRCCOPY};
use crate::surface::{PixelView, Staging, Surface, TILE_SIZE};
use crate::update::Codecs;

/// The pattern term of a blit: a uniform color (the legacy fallback when no
/// brush is selected) or a materialized 8x8 brush tile sampled by modulo
/// addressing on destination coordinates.
pub(crate) enum Pattern {
    Color(u32),
    Tile(PatternTile),
}

impl Pattern {
    fn sample(&self, x: i32, y: i32) -> u32 {
        match self {
            Pattern::Color(c) => *c,
            Pattern::Tile(tile) => {
                tile[(y as usize % BRUSH_SIZE) * BRUSH_SIZE + x as usize % BRUSH_SIZE]
            }
        }
    }
}

/// Rectangular block transfer into `dst` through the ternary raster-op
/// table.
///
/// The destination region is clipped against the current clip region
/// intersected with the surface bounds, and (when a source is present)
/// against the translated source extent; pixels outside are skipped
/// silently. `src` is `(view, src_x, src_y)`. The clipped rectangle is
/// recorded as damage.
#[allow(clippy::too_many_arguments)]
pub(crate) fn blt_into(
    dst: &mut Surface,
    clip: &ClipRegion,
    damage: &mut DamageSet,
    dst_x: i32,
    dst_y: i32,
    width: i32,
    height: i32,
    src: Option<(PixelView<'_>, i32, i32)>,
    pattern: &Pattern,
    rop: u8,
) -> Result<(), RasterError> {
    if width <= 0 || height <= 0 {
        return Ok(());
    }
    let Some(bounded) = clip.effective(dst.bounds()) else {
        return Ok(());
    };
    let mut rect = match bounded.intersect(&Rect::from_extents(dst_x, dst_y, width, height)) {
        Some(r) => r,
        None => return Ok(()),
    };
    if let Some((view, src_x, src_y)) = &src {
        // Restrict to destination pixels whose source address exists.
        let reachable = Rect::from_extents(
            dst_x - src_x,
            dst_y - src_y,
            view.width as i32,
            view.height as i32,
        );
        rect = match rect.intersect(&reachable) {
            Some(r) => r,
            None => return Ok(()),
        };
    }

    let stride = dst.stride();
    if rop == ROP3_SRCCOPY {
        if let Some((view, src_x, src_y)) = &src {
            // Straight copy: move whole rows.
            let row_bytes = rect.width() as usize * CANONICAL_BPP;
            for y in rect.top..rect.bottom {
                let sy = src_y + (y - dst_y);
                let sx = src_x + (rect.left - dst_x);
                let src_off = sy as usize * view.stride + sx as usize * CANONICAL_BPP;
                let dst_off = y as usize * stride + rect.left as usize * CANONICAL_BPP;
                dst.data_mut()[dst_off..dst_off + row_bytes]
                    .copy_from_slice(&view.data[src_off..src_off + row_bytes]);
            }
            damage.add(rect);
            return Ok(());
        }
    }

    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            let s = match &src {
                Some((view, src_x, src_y)) => view.pixel(src_x + (x - dst_x), src_y + (y - dst_y)),
                None => 0,
            };
            let d = dst.get_pixel(x, y)?;
            let p = pattern.sample(x, y);
            dst.put_pixel(x, y, rop3(rop, p, s, d))?;
        }
    }
    damage.add(rect);
    Ok(())
}

/// Literal solid fill, bypassing the raster-op table.
pub(crate) fn fill_into(
    dst: &mut Surface,
    clip: &ClipRegion,
    damage: &mut DamageSet,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: u32,
) {
    if width <= 0 || height <= 0 {
        return;
    }
    let Some(bounded) = clip.effective(dst.bounds()) else {
        return;
    };
    let Some(rect) = bounded.intersect(&Rect::from_extents(x, y, width, height)) else {
        return;
    };
    let stride = dst.stride();
    let bytes = color.to_le_bytes();
    for row in rect.top..rect.bottom {
        let base = row as usize * stride;
        for col in rect.left..rect.right {
            let off = base + col as usize * CANONICAL_BPP;
            dst.data_mut()[off..off + 4].copy_from_slice(&bytes);
        }
    }
    damage.add(rect);
}

/// The software raster-compositing engine.
///
/// Owns the primary off-screen surface, the scratch surfaces for the
/// update pipeline, the current clip and palette, and the damage tracker
/// that feeds repaint notifications.
pub struct RasterEngine {
    canonical: CanonicalFormat,
    src_bpp: u32,
    pub(crate) primary: Surface,
    pub(crate) tile: Surface,
    pub(crate) staging: Staging,
    pub(crate) clip: ClipRegion,
    pub(crate) damage: DamageSet,
    pub(crate) palette: Palette,
    pub(crate) frame_acknowledge: u32,
    pub(crate) frame_ack: Option<Box<dyn FnMut(u32)>>,
    /// Registered codec decode collaborators.
    pub codecs: Codecs,
}

impl RasterEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, RasterError> {
        let canonical = config.canonical_format();
        Ok(RasterEngine {
            canonical,
            src_bpp: config.color_depth,
            primary: Surface::new(config.width, config.height, canonical)?,
            tile: Surface::new(TILE_SIZE, TILE_SIZE, canonical)?,
            staging: Staging::default(),
            clip: ClipRegion::default(),
            damage: DamageSet::new(config.max_damage_rects),
            palette: Palette::default(),
            frame_acknowledge: config.frame_acknowledge,
            frame_ack: None,
            codecs: Codecs::default(),
        })
    }

    /// Registers the frame-acknowledgement callback invoked on frame-end
    /// markers while the frame-acknowledge setting is non-zero.
    pub fn set_frame_ack(&mut self, callback: impl FnMut(u32) + 'static) {
        self.frame_ack = Some(Box::new(callback));
    }

    pub fn width(&self) -> u32 {
        self.primary.width()
    }

    pub fn height(&self) -> u32 {
        self.primary.height()
    }

    pub fn format(&self) -> CanonicalFormat {
        self.canonical
    }

    pub(crate) fn canonical(&self) -> CanonicalFormat {
        self.canonical
    }

    /// Read access to the primary surface pixels for presentation.
    pub fn data(&self) -> &[u8] {
        self.primary.data()
    }

    /// Reallocates the primary surface. No-op when the size is unchanged;
    /// otherwise the new surface starts with undefined content and the
    /// protocol layer is expected to repaint in full.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if width == self.primary.width() && height == self.primary.height() {
            return Ok(());
        }
        debug!("resizing primary surface to {width}x{height}");
        self.primary.resize(width, height)?;
        self.damage.drain();
        Ok(())
    }

    /// Installs a palette update for 8-bit indexed sources and order colors.
    pub fn set_palette(&mut self, entries: &[(u8, u8, u8)]) {
        for (i, &(r, g, b)) in entries.iter().take(256).enumerate() {
            self.palette.set(i as u8, self.canonical.pack(r, g, b));
        }
    }

    /// Sets or clears the clip rectangle from a protocol bounds message.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        trace!("set_bounds {bounds:?}");
        self.clip.set(bounds);
    }

    /// Takes all accumulated invalidated rectangles for presentation.
    pub fn drain_damage(&mut self) -> Vec<Rect> {
        self.damage.drain()
    }

    fn convert_color(&self, color: u32) -> u32 {
        convert_order_color(color, self.src_bpp, self.canonical, &self.palette)
    }

    fn pattern_from_brush(&self, brush: &Brush, fore: u32, back: u32) -> Option<Pattern> {
        let fg = self.convert_color(fore);
        let bg = self.convert_color(back);
        crate::brush::materialize(brush, fg, bg, self.canonical, &self.palette).map(Pattern::Tile)
    }

    /// Copies a source rectangle of the primary surface into an owned
    /// buffer, clipped to the surface bounds. Snapshotting makes
    /// overlapping self-copies well defined.
    fn snapshot(&self, x: i32, y: i32, width: i32, height: i32) -> Option<(Vec<u8>, Rect)> {
        let rect = Rect::from_extents(x, y, width, height).intersect(&self.primary.bounds())?;
        let stride = self.primary.stride();
        let row_bytes = rect.width() as usize * CANONICAL_BPP;
        let mut buf = Vec::with_capacity(row_bytes * rect.height() as usize);
        for row in rect.top..rect.bottom {
            let off = row as usize * stride + rect.left as usize * CANONICAL_BPP;
            buf.extend_from_slice(&self.primary.data()[off..off + row_bytes]);
        }
        Some((buf, rect))
    }

    /// Rasterizes a line segment with Bresenham stepping, combining each
    /// visited pixel through the binary raster-op. The final endpoint is
    /// excluded so polyline joints are visited exactly once.
    fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        rop2_code: u8,
        color: u32,
    ) -> Result<(), RasterError> {
        let Some(clip) = self.clip.effective(self.primary.bounds()) else {
            return Ok(());
        };
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        let mut touched: Option<Rect> = None;
        while x != x1 || y != y1 {
            if clip.contains(x, y) {
                let d = self.primary.get_pixel(x, y)?;
                self.primary.put_pixel(x, y, rop2(rop2_code, color, d))?;
                let px = Rect::from_extents(x, y, 1, 1);
                touched = Some(match touched {
                    Some(r) => r.union(&px),
                    None => px,
                });
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        if let Some(rect) = touched {
            self.damage.add(rect);
        }
        Ok(())
    }

    /// Applies one parsed drawing order to the primary surface.
    ///
    /// Unsupported orders are deliberate no-ops; they log and leave the
    /// surface byte-identical.
    pub fn process_order(&mut self, order: &Order<'_>) -> Result<(), RasterError> {
        match order {
            Order::DstBlt {
                left,
                top,
                width,
                height,
                rop,
            } => {
                trace!("DstBlt {left},{top} {width}x{height} rop={rop:#04x}");
                blt_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    *left,
                    *top,
                    *width,
                    *height,
                    None,
                    &Pattern::Color(0),
                    *rop,
                )
            }
            Order::PatBlt {
                left,
                top,
                width,
                height,
                rop,
                fore_color,
                back_color,
                brush,
            } => {
                trace!("PatBlt {left},{top} {width}x{height} rop={rop:#04x}");
                let Some(pattern) = self.pattern_from_brush(brush, *fore_color, *back_color)
                else {
                    // Materialization already logged the reason; skip the fill.
                    return Ok(());
                };
                blt_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    *left,
                    *top,
                    *width,
                    *height,
                    None,
                    &pattern,
                    *rop,
                )
            }
            Order::ScrBlt {
                left,
                top,
                width,
                height,
                rop,
                src_x,
                src_y,
            } => {
                trace!(
                    "ScrBlt {left},{top} {width}x{height} from {src_x},{src_y} rop={rop:#04x}"
                );
                let Some((buf, src_rect)) = self.snapshot(*src_x, *src_y, *width, *height) else {
                    return Ok(());
                };
                let view = PixelView {
                    data: &buf,
                    width: src_rect.width() as u32,
                    height: src_rect.height() as u32,
                    stride: src_rect.width() as usize * CANONICAL_BPP,
                };
                blt_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    left + (src_rect.left - src_x),
                    top + (src_rect.top - src_y),
                    src_rect.width(),
                    src_rect.height(),
                    Some((view, 0, 0)),
                    &Pattern::Color(0),
                    *rop,
                )
            }
            Order::OpaqueRect {
                left,
                top,
                width,
                height,
                color,
            } => {
                let fill = self.convert_color(*color);
                fill_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    *left,
                    *top,
                    *width,
                    *height,
                    fill,
                );
                Ok(())
            }
            Order::MultiOpaqueRect { rectangles, color } => {
                let fill = self.convert_color(*color);
                for rect in rectangles {
                    fill_into(
                        &mut self.primary,
                        &self.clip,
                        &mut self.damage,
                        rect.left,
                        rect.top,
                        rect.width(),
                        rect.height(),
                        fill,
                    );
                }
                Ok(())
            }
            Order::LineTo {
                x_start,
                y_start,
                x_end,
                y_end,
                rop2,
                pen,
            } => {
                if pen.width > 1 {
                    debug!("pen width {} rendered as 1-pixel stroke", pen.width);
                }
                let color = self.convert_color(pen.color);
                self.draw_line(*x_start, *y_start, *x_end, *y_end, *rop2, color)
            }
            Order::Polyline {
                x_start,
                y_start,
                rop2,
                color,
                points,
            } => {
                let color = self.convert_color(*color);
                let (mut x, mut y) = (*x_start, *y_start);
                for delta in points {
                    let (nx, ny) = (x + delta.x, y + delta.y);
                    self.draw_line(x, y, nx, ny, *rop2, color)?;
                    x = nx;
                    y = ny;
                }
                Ok(())
            }
            Order::MemBlt {
                left,
                top,
                width,
                height,
                rop,
                src_x,
                src_y,
                bitmap,
            } => {
                trace!("MemBlt {left},{top} {width}x{height} rop={rop:#04x}");
                blt_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    *left,
                    *top,
                    *width,
                    *height,
                    Some((bitmap.view(), *src_x, *src_y)),
                    &Pattern::Color(0),
                    *rop,
                )
            }
            Order::Mem3Blt {
                left,
                top,
                width,
                height,
                rop,
                src_x,
                src_y,
                bitmap,
                fore_color,
                back_color,
                brush,
            } => {
                trace!("Mem3Blt {left},{top} {width}x{height} rop={rop:#04x}");
                let Some(pattern) = self.pattern_from_brush(brush, *fore_color, *back_color)
                else {
                    return Ok(());
                };
                blt_into(
                    &mut self.primary,
                    &self.clip,
                    &mut self.damage,
                    *left,
                    *top,
                    *width,
                    *height,
                    Some((bitmap.view(), *src_x, *src_y)),
                    &pattern,
                    *rop,
                )
            }
            Order::PolygonSc | Order::PolygonCb | Order::EllipseSc | Order::EllipseCb => {
                debug!("polygon/ellipse order not implemented, skipping");
                Ok(())
            }
            Order::FrameMarker { action, frame_id } => {
                debug!("frame marker {action:?} id={frame_id}");
                if *action == FrameAction::End && self.frame_acknowledge > 0 {
                    if let Some(ack) = self.frame_ack.as_mut() {
                        ack(*frame_id);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushStyle;
    use crate::orders::{DeltaPoint, Pen};
    use crate::rop::ROP3_BLACKNESS;
    use std::cell::RefCell;
    use std::rc::Rc;
    use test_log::test; // For logging within tests

    fn engine(width: u32, height: u32) -> RasterEngine {
        RasterEngine::new(&EngineConfig {
            width,
            height,
            ..Default::default()
        })
        .unwrap()
    }

    fn fill_primary(engine: &mut RasterEngine, color: u32) {
        let (w, h) = (engine.width() as i32, engine.height() as i32);
        fill_into(
            &mut engine.primary,
            &ClipRegion::default(),
            &mut engine.damage,
            0,
            0,
            w,
            h,
            color,
        );
        engine.drain_damage();
    }

    #[test]
    fn test_opaque_rect_fills_converted_color() {
        let mut e = engine(16, 16);
        // 0x00BBGGRR on the wire at 32 bpp.
        e.process_order(&Order::OpaqueRect {
            left: 2,
            top: 2,
            width: 4,
            height: 4,
            color: 0x00cc_bbaa,
        })
        .unwrap();
        assert_eq!(e.primary.get_pixel(3, 3).unwrap(), 0x00aa_bbcc);
        assert_eq!(e.primary.get_pixel(1, 1).unwrap(), 0);
        assert_eq!(e.drain_damage(), vec![Rect::from_extents(2, 2, 4, 4)]);
    }

    #[test]
    fn test_dstblt_clear_is_idempotent() {
        // Contract: applying the clear raster-op twice equals applying it
        // once.
        let mut e = engine(8, 8);
        fill_primary(&mut e, 0x00ff_ffff);
        let clear = Order::DstBlt {
            left: 0,
            top: 0,
            width: 8,
            height: 8,
            rop: ROP3_BLACKNESS,
        };
        e.process_order(&clear).unwrap();
        let once = e.data().to_vec();
        e.process_order(&clear).unwrap();
        assert_eq!(e.data(), &once[..]);
        assert!(once.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unsupported_order_leaves_surface_untouched() {
        let mut e = engine(8, 8);
        fill_primary(&mut e, 0x0012_3456);
        let before = e.data().to_vec();
        e.process_order(&Order::EllipseSc).unwrap();
        e.process_order(&Order::PolygonCb).unwrap();
        assert_eq!(e.data(), &before[..]);
        assert!(e.drain_damage().is_empty());
    }

    #[test]
    fn test_patblt_tiles_pattern_modulo() {
        let mut e = engine(16, 16);
        // Vertical hatch: bit column 4 of every row is clear = foreground.
        e.process_order(&Order::PatBlt {
            left: 0,
            top: 0,
            width: 16,
            height: 16,
            rop: crate::rop::ROP3_PATCOPY,
            fore_color: 0x0000_00ff, // red as 0x00BBGGRR
            back_color: 0x0000_0000,
            brush: Brush {
                style: BrushStyle::Hatched,
                hatch: 1,
                data: None,
                bpp: 1,
            },
        })
        .unwrap();
        let fg = 0x00ff_0000; // canonical red
        // The pattern repeats with period 8 across the whole rect.
        assert_eq!(e.primary.get_pixel(4, 0).unwrap(), fg);
        assert_eq!(e.primary.get_pixel(12, 9).unwrap(), fg);
        assert_eq!(e.primary.get_pixel(5, 0).unwrap(), 0);
    }

    #[test]
    fn test_patblt_unknown_brush_is_noop() {
        let mut e = engine(8, 8);
        fill_primary(&mut e, 0x00ab_cdef);
        let before = e.data().to_vec();
        e.process_order(&Order::PatBlt {
            left: 0,
            top: 0,
            width: 8,
            height: 8,
            rop: crate::rop::ROP3_PATCOPY,
            fore_color: 0,
            back_color: 0,
            brush: Brush {
                style: BrushStyle::Other(9),
                hatch: 0,
                data: None,
                bpp: 1,
            },
        })
        .unwrap();
        assert_eq!(e.data(), &before[..]);
    }

    #[test]
    fn test_scrblt_self_copy() {
        let mut e = engine(8, 8);
        e.primary.put_pixel(0, 0, 0x00aa_aaaa).unwrap();
        e.primary.put_pixel(1, 0, 0x00bb_bbbb).unwrap();
        e.process_order(&Order::ScrBlt {
            left: 4,
            top: 4,
            width: 2,
            height: 1,
            rop: ROP3_SRCCOPY,
            src_x: 0,
            src_y: 0,
        })
        .unwrap();
        assert_eq!(e.primary.get_pixel(4, 4).unwrap(), 0x00aa_aaaa);
        assert_eq!(e.primary.get_pixel(5, 4).unwrap(), 0x00bb_bbbb);
    }

    #[test]
    fn test_scrblt_overlapping_region() {
        // Shifting a gradient right by one must not smear: the snapshot
        // decouples the source from in-progress writes.
        let mut e = engine(8, 1);
        for x in 0..8 {
            e.primary.put_pixel(x, 0, x as u32).unwrap();
        }
        e.process_order(&Order::ScrBlt {
            left: 1,
            top: 0,
            width: 7,
            height: 1,
            rop: ROP3_SRCCOPY,
            src_x: 0,
            src_y: 0,
        })
        .unwrap();
        for x in 1..8 {
            assert_eq!(e.primary.get_pixel(x, 0).unwrap(), x as u32 - 1);
        }
    }

    #[test]
    fn test_clip_bounds_blit() {
        let mut e = engine(16, 16);
        e.set_bounds(Some(Rect::from_inclusive(4, 4, 7, 7)));
        e.process_order(&Order::OpaqueRect {
            left: 0,
            top: 0,
            width: 16,
            height: 16,
            color: 0x0000_00ff,
        })
        .unwrap();
        assert_eq!(e.primary.get_pixel(5, 5).unwrap(), 0x00ff_0000);
        assert_eq!(e.primary.get_pixel(3, 5).unwrap(), 0);
        assert_eq!(e.primary.get_pixel(8, 5).unwrap(), 0);
        e.set_bounds(None);
    }

    #[test]
    fn test_lineto_draws_excluding_endpoint() {
        let mut e = engine(8, 8);
        e.process_order(&Order::LineTo {
            x_start: 0,
            y_start: 0,
            x_end: 4,
            y_end: 0,
            rop2: crate::rop::ROP2_COPYPEN,
            pen: Pen {
                style: 0,
                width: 1,
                color: 0x0000_00ff,
            },
        })
        .unwrap();
        for x in 0..4 {
            assert_eq!(e.primary.get_pixel(x, 0).unwrap(), 0x00ff_0000);
        }
        assert_eq!(e.primary.get_pixel(4, 0).unwrap(), 0);
    }

    #[test]
    fn test_polyline_xor_visits_joints_once() {
        // With an XOR rop2, a pixel visited twice would cancel itself; the
        // joint between segments must survive.
        let mut e = engine(8, 8);
        e.process_order(&Order::Polyline {
            x_start: 0,
            y_start: 0,
            rop2: crate::rop::ROP2_XORPEN,
            color: 0x00ff_ffff,
            points: vec![DeltaPoint { x: 3, y: 0 }, DeltaPoint { x: 0, y: 3 }],
        })
        .unwrap();
        assert_ne!(e.primary.get_pixel(3, 0).unwrap(), 0, "joint pixel erased");
    }

    #[test]
    fn test_memblt_from_cached_bitmap() {
        let mut e = engine(8, 8);
        let mut bitmap = Surface::new(2, 2, CanonicalFormat::Xrgb32).unwrap();
        bitmap.put_pixel(0, 0, 0x11).unwrap();
        bitmap.put_pixel(1, 1, 0x22).unwrap();
        e.process_order(&Order::MemBlt {
            left: 3,
            top: 3,
            width: 2,
            height: 2,
            rop: ROP3_SRCCOPY,
            src_x: 0,
            src_y: 0,
            bitmap: &bitmap,
        })
        .unwrap();
        assert_eq!(e.primary.get_pixel(3, 3).unwrap(), 0x11);
        assert_eq!(e.primary.get_pixel(4, 4).unwrap(), 0x22);
    }

    #[test]
    fn test_frame_marker_acknowledgement() {
        let acked = Rc::new(RefCell::new(Vec::new()));
        let mut e = engine(4, 4);
        let sink = Rc::clone(&acked);
        e.set_frame_ack(move |id| sink.borrow_mut().push(id));

        e.process_order(&Order::FrameMarker {
            action: FrameAction::Begin,
            frame_id: 7,
        })
        .unwrap();
        assert!(acked.borrow().is_empty());
        e.process_order(&Order::FrameMarker {
            action: FrameAction::End,
            frame_id: 7,
        })
        .unwrap();
        assert_eq!(*acked.borrow(), vec![7]);
    }

    #[test]
    fn test_frame_marker_disabled_acknowledgement() {
        let acked = Rc::new(RefCell::new(Vec::new()));
        let mut e = RasterEngine::new(&EngineConfig {
            width: 4,
            height: 4,
            frame_acknowledge: 0,
            ..Default::default()
        })
        .unwrap();
        let sink = Rc::clone(&acked);
        e.set_frame_ack(move |id| sink.borrow_mut().push(id));
        e.process_order(&Order::FrameMarker {
            action: FrameAction::End,
            frame_id: 1,
        })
        .unwrap();
        assert!(acked.borrow().is_empty());
    }

    #[test]
    fn test_multi_opaque_rect() {
        let mut e = engine(16, 16);
        e.process_order(&Order::MultiOpaqueRect {
            rectangles: vec![
                Rect::from_extents(0, 0, 2, 2),
                Rect::from_extents(10, 10, 2, 2),
            ],
            color: 0x00ff_ffff,
        })
        .unwrap();
        assert_eq!(e.primary.get_pixel(1, 1).unwrap(), 0x00ff_ffff);
        assert_eq!(e.primary.get_pixel(11, 11).unwrap(), 0x00ff_ffff);
        assert_eq!(e.drain_damage().len(), 2);
    }

    #[test]
    fn test_resize_noop_preserves_content() {
        let mut e = engine(8, 8);
        fill_primary(&mut e, 0x00dd_dddd);
        e.resize(8, 8).unwrap();
        assert_eq!(e.primary.get_pixel(0, 0).unwrap(), 0x00dd_dddd);
        e.resize(16, 16).unwrap();
        assert_eq!(e.width(), 16);
        assert_eq!(e.height(), 16);
    }
}
