//! Per-tick inputs to the compositor.
//!
//! The tick never blocks, so everything it needs must already be a plain
//! value. Hosts sample the pointer and surface size once per frame and pass
//! them in here.

use serde::{Deserialize, Serialize};

/// Render surface extents in device pixels.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Pointer position in surface coordinates, y growing downward.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct TickInputs {
    /// `None` keeps the previous look target, so the head does not snap when
    /// the pointer leaves the surface.
    pub pointer: Option<PointerSample>,
    pub surface: Surface,
}
