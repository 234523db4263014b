//! # Lightfall Common
//!
//! Shared foundation for the Lightfall backdrop renderer:
//! - Error types
//! - The streak color palette
//! - Viewport and device-pixel math

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod viewport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::viewport::*;
}

pub use prelude::*;
