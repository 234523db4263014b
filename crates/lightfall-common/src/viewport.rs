//! Viewport dimensions and device-pixel math.
//!
//! The simulation runs in logical (CSS) pixels while the drawing surface is
//! sized in physical device pixels, so strokes stay crisp on high-density
//! displays. `Viewport` carries both via the display's scale factor.

/// Viewport in logical pixels plus the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels
    pub width: f32,
    /// Height in logical pixels
    pub height: f32,
    /// Device pixel ratio (1.0 on standard displays, 2.0 on most HiDPI)
    pub scale_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

impl Viewport {
    /// Creates a viewport from logical dimensions.
    #[must_use]
    pub fn new(width: f32, height: f32, scale_factor: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    /// Creates a viewport from a physical (device pixel) size.
    #[must_use]
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (f64::from(width) / scale) as f32,
            height: (f64::from(height) / scale) as f32,
            scale_factor: scale,
        }
    }

    /// Returns the surface width in physical pixels.
    #[must_use]
    pub fn physical_width(&self) -> u32 {
        (f64::from(self.width) * self.scale_factor).round() as u32
    }

    /// Returns the surface height in physical pixels.
    #[must_use]
    pub fn physical_height(&self) -> u32 {
        (f64::from(self.height) * self.scale_factor).round() as u32
    }

    /// Checks whether the viewport has drawable area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let vp = Viewport::default();
        assert_eq!(vp.width, 1280.0);
        assert_eq!(vp.height, 720.0);
        assert_eq!(vp.scale_factor, 1.0);
        assert!(!vp.is_empty());
    }

    #[test]
    fn test_physical_round_trip_density_1() {
        let vp = Viewport::new(1500.0, 800.0, 1.0);
        assert_eq!(vp.physical_width(), 1500);
        assert_eq!(vp.physical_height(), 800);
    }

    #[test]
    fn test_physical_round_trip_density_2() {
        let vp = Viewport::new(1500.0, 800.0, 2.0);
        assert_eq!(vp.physical_width(), 3000);
        assert_eq!(vp.physical_height(), 1600);

        let back = Viewport::from_physical(3000, 1600, 2.0);
        assert!((back.width - 1500.0).abs() < 0.001);
        assert!((back.height - 800.0).abs() < 0.001);
    }

    #[test]
    fn test_fractional_scale() {
        let vp = Viewport::from_physical(1920, 1080, 1.5);
        assert!((vp.width - 1280.0).abs() < 0.001);
        assert!((vp.height - 720.0).abs() < 0.001);
    }

    #[test]
    fn test_invalid_scale_clamped() {
        let vp = Viewport::new(100.0, 100.0, 0.0);
        assert_eq!(vp.scale_factor, 1.0);

        let vp = Viewport::from_physical(100, 100, -2.0);
        assert_eq!(vp.scale_factor, 1.0);
    }

    #[test]
    fn test_empty_viewport() {
        assert!(Viewport::new(0.0, 100.0, 1.0).is_empty());
        assert!(Viewport::new(100.0, 0.0, 1.0).is_empty());
        assert!(Viewport::new(-5.0, -5.0, 1.0).is_empty());
    }
}
