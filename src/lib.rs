// In src/lib.rs

//! Software raster compositing for remote-display sessions.
//!
//! The engine maintains an off-screen primary surface in one canonical
//! 32-bit pixel format and mutates it from two input channels: parsed
//! drawing orders ([`orders::Order`], dispatched by
//! [`engine::RasterEngine::process_order`]) and codec-tagged surface
//! updates ([`update::SurfaceCommand`], composited by
//! [`engine::RasterEngine::apply_surface_command`]). Accumulated damage
//! rectangles feed the presentation layer via
//! [`engine::RasterEngine::drain_damage`].
//!
//! Wire parsing, codec implementations, and on-screen presentation live
//! outside this crate; decoders plug in through the traits in [`update`].

// Declare modules
pub mod brush;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod orders;
pub mod region;
pub mod rop;
pub mod surface;
pub mod update;

pub use crate::{
    color::{CanonicalFormat, Palette, PixelDepth, PixelFormat},
    config::{EngineConfig, EngineFlags},
    engine::RasterEngine,
    error::RasterError,
    orders::Order,
    region::Rect,
    update::{BitmapData, Codecs, CodecId, ImageDecoder, SurfaceCommand, TileDecoder},
};
