// src/error.rs

//! Error taxonomy for the compositing engine.
//!
//! Every fallible core operation returns `Result<_, RasterError>`; there is
//! no panicking control flow outside of tests. Decode failures from codec
//! collaborators arrive as opaque `anyhow::Error` values and are wrapped so
//! the caller can count them and decide on session-level escalation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// A surface or staging buffer could not grow. Only the update in
    /// progress is aborted; previously composited content stays intact.
    #[error("buffer allocation of {requested} bytes failed")]
    Allocation { requested: usize },

    /// A pixel address outside the surface extent was refused.
    #[error("pixel access out of bounds: ({x},{y}) in {width}x{height} surface")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// A codec collaborator failed to decode one update. Non-fatal: the
    /// update is skipped and the session continues.
    #[error("codec decode failed: {0}")]
    CodecDecode(anyhow::Error),

    /// Declared dimensions/depth are inconsistent with the payload length.
    #[error(
        "declared {width}x{height} at {bpp} bpp needs {expected} bytes, payload has {actual}"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        bpp: u32,
        expected: usize,
        actual: usize,
    },
}
