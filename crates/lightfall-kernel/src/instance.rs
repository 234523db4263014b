//! GPU instance layouts for streak rendering.
//!
//! The streak field is uploaded to the GPU once per frame as a flat array of
//! `StreakInstance`, rendered with one quad per instance. All values are in
//! physical (device) pixels; the logical-pixel simulation is scaled here so
//! strokes stay crisp on high-density displays.

use bytemuck::{Pod, Zeroable};
use lightfall_common::viewport::Viewport;

use crate::field::{Streak, StreakField};

/// Default per-frame fade of the trail buffer.
pub const DEFAULT_FADE_ALPHA: f32 = 0.3;

/// Default overall streak opacity.
pub const DEFAULT_STREAK_OPACITY: f32 = 0.8;

/// GPU instance data for a single streak.
/// Layout: 32 bytes, 16-byte aligned fields for GPU buffers.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct StreakInstance {
    /// Head position (x, y) in physical pixels
    pub head: [f32; 2],
    /// Streak length in physical pixels
    pub length: f32,
    /// Stroke width in physical pixels
    pub width: f32,
    /// Color (straight RGBA; gradient and opacity applied in the shader)
    pub color: [f32; 4],
}

impl StreakInstance {
    /// Size of the instance data in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds an instance from a streak, scaling logical pixels by the
    /// device pixel ratio.
    #[must_use]
    pub fn from_streak(streak: &Streak, scale_factor: f64) -> Self {
        let scale = scale_factor as f32;
        Self {
            head: [streak.x * scale, streak.y * scale],
            length: streak.length * scale,
            width: streak.width * scale,
            color: streak.color.rgba(),
        }
    }
}

/// Uniform parameters shared by the fade and streak passes.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct FieldUniforms {
    /// Drawing surface size (width, height) in physical pixels
    pub surface_size: [f32; 2],
    /// Alpha of the black overpaint that fades previous frames
    pub fade_alpha: f32,
    /// Overall opacity multiplier for streak strokes
    pub streak_opacity: f32,
}

impl Default for FieldUniforms {
    fn default() -> Self {
        Self {
            surface_size: [1280.0, 720.0],
            fade_alpha: DEFAULT_FADE_ALPHA,
            streak_opacity: DEFAULT_STREAK_OPACITY,
        }
    }
}

impl FieldUniforms {
    /// Creates uniforms for a viewport's physical surface.
    #[must_use]
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self {
            surface_size: [
                viewport.physical_width() as f32,
                viewport.physical_height() as f32,
            ],
            ..Default::default()
        }
    }
}

/// Builds the instance array for the current field state.
#[must_use]
pub fn build_instances(field: &StreakField) -> Vec<StreakInstance> {
    let scale = field.viewport().scale_factor;
    field
        .streaks()
        .iter()
        .map(|streak| StreakInstance::from_streak(streak, scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightfall_common::color::StreakColor;

    #[test]
    fn test_instance_size() {
        // 2+1+1+4 floats * 4 bytes, matches the WGSL struct layout
        assert_eq!(StreakInstance::SIZE, 32);
    }

    #[test]
    fn test_uniforms_size() {
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 16);
    }

    #[test]
    fn test_from_streak_density_1() {
        let streak = Streak {
            x: 100.0,
            y: 200.0,
            length: 80.0,
            speed: 3.0,
            width: 1.5,
            color: StreakColor::Blue,
        };
        let instance = StreakInstance::from_streak(&streak, 1.0);
        assert_eq!(instance.head, [100.0, 200.0]);
        assert_eq!(instance.length, 80.0);
        assert_eq!(instance.width, 1.5);
        assert_eq!(instance.color, StreakColor::Blue.rgba());
    }

    #[test]
    fn test_from_streak_scales_to_device_pixels() {
        let streak = Streak {
            x: 100.0,
            y: 200.0,
            length: 80.0,
            speed: 3.0,
            width: 1.5,
            color: StreakColor::Cyan,
        };
        let instance = StreakInstance::from_streak(&streak, 2.0);
        assert_eq!(instance.head, [200.0, 400.0]);
        assert_eq!(instance.length, 160.0);
        assert_eq!(instance.width, 3.0);
    }

    #[test]
    fn test_uniforms_for_viewport() {
        let vp = Viewport::new(1500.0, 800.0, 2.0);
        let uniforms = FieldUniforms::for_viewport(&vp);
        assert_eq!(uniforms.surface_size, [3000.0, 1600.0]);
        assert_eq!(uniforms.fade_alpha, DEFAULT_FADE_ALPHA);
        assert_eq!(uniforms.streak_opacity, DEFAULT_STREAK_OPACITY);
    }

    #[test]
    fn test_build_instances_matches_field() {
        let vp = Viewport::new(300.0, 200.0, 1.0);
        let field = StreakField::new(vp, 11);
        let instances = build_instances(&field);

        assert_eq!(instances.len(), field.len());
        for (streak, instance) in field.streaks().iter().zip(&instances) {
            assert_eq!(instance.head, [streak.x, streak.y]);
            assert_eq!(instance.color, streak.color.rgba());
        }
    }
}
