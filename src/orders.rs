// src/orders.rs

//! Typed drawing orders consumed from the wire-protocol parser.
//!
//! The parser collaborator turns byte streams into these structures; the
//! engine only dispatches them. Geometry follows the wire conventions:
//! left/top/width/height for blits and fills, absolute endpoints for lines,
//! delta-point runs for polylines, and source-depth-encoded colors that the
//! dispatcher converts through the palette before use.

use crate::brush::Brush;
use crate::region::Rect;
use crate::surface::Surface;

/// A pen descriptor for line orders. Only a 1-pixel solid stroke is
/// honored; style and width are carried for protocol fidelity.
#[derive(Debug, Clone, Copy)]
pub struct Pen {
    pub style: u32,
    pub width: u32,
    pub color: u32,
}

/// One relative step of a polyline.
#[derive(Debug, Clone, Copy)]
pub struct DeltaPoint {
    pub x: i32,
    pub y: i32,
}

/// Frame lifecycle marker action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Begin,
    End,
}

/// A parsed drawing order. One closed variant per order tag; the
/// dispatcher has exactly one handler each.
///
/// `MemBlt`/`Mem3Blt` borrow their already-decoded cached bitmap surface
/// from the caller; the bitmap cache itself lives outside this engine.
pub enum Order<'a> {
    /// Destination-only blit with a raster-op byte.
    DstBlt {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        rop: u8,
    },
    /// Brush fill through the raster-op table.
    PatBlt {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        rop: u8,
        fore_color: u32,
        back_color: u32,
        brush: Brush,
    },
    /// Screen-to-screen copy (the primary surface is its own source).
    ScrBlt {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        rop: u8,
        src_x: i32,
        src_y: i32,
    },
    /// Literal solid fill; bypasses the raster-op table by definition.
    OpaqueRect {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        color: u32,
    },
    /// Several literal fills sharing one color.
    MultiOpaqueRect { rectangles: Vec<Rect>, color: u32 },
    /// Single line segment with a binary raster-op.
    LineTo {
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
        rop2: u8,
        pen: Pen,
    },
    /// Successive line segments from a running point.
    Polyline {
        x_start: i32,
        y_start: i32,
        rop2: u8,
        color: u32,
        points: Vec<DeltaPoint>,
    },
    /// Blit from a cached bitmap surface.
    MemBlt {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        rop: u8,
        src_x: i32,
        src_y: i32,
        bitmap: &'a Surface,
    },
    /// Blit from a cached bitmap with the brush as the pattern term.
    Mem3Blt {
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        rop: u8,
        src_x: i32,
        src_y: i32,
        bitmap: &'a Surface,
        fore_color: u32,
        back_color: u32,
        brush: Brush,
    },
    /// Accepted but intentionally not rendered.
    PolygonSc,
    /// Accepted but intentionally not rendered.
    PolygonCb,
    /// Accepted but intentionally not rendered.
    EllipseSc,
    /// Accepted but intentionally not rendered.
    EllipseCb,
    /// Frame lifecycle delimiter; carries no pixel content.
    FrameMarker { action: FrameAction, frame_id: u32 },
}
