//! # Lightfall Kernel
//!
//! The core of the backdrop renderer:
//! - Streak field simulation (spawn, fall, wraparound, resize regeneration)
//! - GPU instance layouts for instanced streak rendering
//! - WGSL render pipelines (fade, streak, blit) for the trail effect
//! - Frame ticker with an explicit cancellation handle
//!
//! ## Architecture
//!
//! The simulation is pure CPU state: a flat `Vec` of plain `Copy` streaks,
//! advanced once per frame tick. Streaks never interact, so update order is
//! irrelevant and the whole collection is replaced in bulk on resize.
//!
//! ## Trail compositing
//!
//! The motion-blur trail is produced by never fully clearing the canvas:
//! each frame first overpaints a persistent accumulation texture with a
//! low-alpha black quad, then strokes the streaks on top, then blits the
//! result to the swapchain. Swapchain contents are not guaranteed to persist
//! across presents, hence the dedicated accumulation texture.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod field;
pub mod instance;
pub mod pipeline;
pub mod ticker;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::field::*;
    pub use crate::instance::*;
    pub use crate::pipeline::*;
    pub use crate::ticker::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_is_plain_value() {
        // Streaks live in a flat Vec and are replaced in bulk; keep them small
        assert!(std::mem::size_of::<Streak>() <= 32);
    }
}
