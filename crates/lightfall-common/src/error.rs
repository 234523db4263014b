//! Error types for Lightfall.

use thiserror::Error;

/// Top-level error type for Lightfall operations.
#[derive(Debug, Error)]
pub enum LightfallError {
    /// GPU-related errors
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// GPU-specific errors.
///
/// Everything in here is non-fatal for the host: the backdrop is cosmetic,
/// so callers degrade to a blank window rather than propagate.
#[derive(Debug, Error)]
pub enum GpuError {
    /// No suitable adapter was found
    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(String),

    /// Device request failed
    #[error("GPU device request failed: {0}")]
    DeviceRequest(String),

    /// Surface creation or configuration failed
    #[error("surface error: {0}")]
    Surface(String),
}

/// Result type alias for Lightfall operations.
pub type LightfallResult<T> = Result<T, LightfallError>;
