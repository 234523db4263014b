//! Streak color palette.
//!
//! A fixed three-color palette for the light streaks: cyan, blue, purple.
//! Streaks pick one color at spawn and keep it for life.

/// Number of colors in the streak palette.
pub const PALETTE_SIZE: usize = 3;

/// Color of a single light streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StreakColor {
    /// Bright cyan (#00f2ea)
    #[default]
    Cyan = 0,
    /// Sky blue (#4facfe)
    Blue = 1,
    /// Violet purple (#7c3aed)
    Purple = 2,
}

impl StreakColor {
    /// Creates a color from a palette index, wrapping out-of-range values.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index % PALETTE_SIZE {
            0 => Self::Cyan,
            1 => Self::Blue,
            _ => Self::Purple,
        }
    }

    /// Returns the palette index of this color.
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the color as RGB bytes.
    #[must_use]
    pub const fn rgb8(&self) -> (u8, u8, u8) {
        match self {
            Self::Cyan => (0x00, 0xf2, 0xea),
            Self::Blue => (0x4f, 0xac, 0xfe),
            Self::Purple => (0x7c, 0x3a, 0xed),
        }
    }

    /// Returns the color as normalized RGBA floats (alpha 1.0).
    #[must_use]
    pub fn rgba(&self) -> [f32; 4] {
        let (r, g, b) = self.rgb8();
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index() {
        assert_eq!(StreakColor::from_index(0), StreakColor::Cyan);
        assert_eq!(StreakColor::from_index(1), StreakColor::Blue);
        assert_eq!(StreakColor::from_index(2), StreakColor::Purple);
        // Wraps instead of panicking
        assert_eq!(StreakColor::from_index(3), StreakColor::Cyan);
        assert_eq!(StreakColor::from_index(7), StreakColor::Blue);
    }

    #[test]
    fn test_index_round_trip() {
        for i in 0..PALETTE_SIZE {
            assert_eq!(StreakColor::from_index(i).index(), i);
        }
    }

    #[test]
    fn test_rgb_values() {
        assert_eq!(StreakColor::Cyan.rgb8(), (0x00, 0xf2, 0xea));
        assert_eq!(StreakColor::Blue.rgb8(), (0x4f, 0xac, 0xfe));
        assert_eq!(StreakColor::Purple.rgb8(), (0x7c, 0x3a, 0xed));
    }

    #[test]
    fn test_rgba_normalized() {
        let rgba = StreakColor::Cyan.rgba();
        assert!((rgba[0] - 0.0).abs() < f32::EPSILON);
        assert!((rgba[1] - 242.0 / 255.0).abs() < f32::EPSILON);
        assert!((rgba[3] - 1.0).abs() < f32::EPSILON);

        for i in 0..PALETTE_SIZE {
            for c in StreakColor::from_index(i).rgba() {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }
}
