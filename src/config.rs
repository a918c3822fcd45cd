// src/config.rs

//! Engine configuration.
//!
//! Deserializable from a configuration file (JSON via `serde_json`) or
//! built in code. Defaults match common session parameters; every field is
//! optional in serialized form thanks to `#[serde(default)]`.

use anyhow::Context;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::CanonicalFormat;

bitflags! {
    /// Engine behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct EngineFlags: u32 {
        /// Use the BGR-ordered canonical variant for presentation layers
        /// that consume inverted channel order.
        const INVERT = 1 << 0;
    }
}

/// Complete configuration for one compositing engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial desktop width in pixels.
    pub width: u32,
    /// Initial desktop height in pixels.
    pub height: u32,
    /// Color depth of the session's order stream (bits per pixel); order
    /// colors are decoded at this depth.
    pub color_depth: u32,
    /// Frame-acknowledge count from the network auto-detect subsystem.
    /// Zero disables acknowledgement callbacks on frame-end markers.
    pub frame_acknowledge: u32,
    /// Damage rectangles tracked before collapsing to a bounding box.
    pub max_damage_rects: usize,
    pub flags: EngineFlags,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            width: 1024,
            height: 768,
            color_depth: 32,
            frame_acknowledge: 2,
            max_damage_rects: 32,
            flags: EngineFlags::empty(),
        }
    }
}

impl EngineConfig {
    /// The canonical internal format this configuration selects.
    pub fn canonical_format(&self) -> CanonicalFormat {
        if self.flags.contains(EngineFlags::INVERT) {
            CanonicalFormat::Xbgr32
        } else {
            CanonicalFormat::Xrgb32
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse engine configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text)
    }
}
