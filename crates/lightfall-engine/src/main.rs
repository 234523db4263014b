//! # Lightfall
//!
//! Windowed "falling light" backdrop: a field of luminous streaks raining
//! down the screen, leaving fading trails behind them.
//!
//! This crate ties together the pieces:
//! - Kernel: streak field simulation and GPU render pipelines
//! - Config: persistent TOML configuration
//! - App: winit event loop and lifecycle

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod renderer;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("lightfall=info".parse()?))
        .init();

    info!("Lightfall starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Run the application
    app::run()?;

    info!("Lightfall shutdown complete");
    Ok(())
}
