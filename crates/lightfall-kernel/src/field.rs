//! Streak field simulation.
//!
//! A field of independently falling light streaks. Each streak draws its
//! visual parameters once at spawn from bounded uniform ranges and then only
//! ever moves downward; when it has fully exited below the viewport it wraps
//! back above the top with a fresh horizontal position, reusing the same
//! slot. The collection is sized from the viewport width and fully replaced
//! on resize.

use lightfall_common::color::{StreakColor, PALETTE_SIZE};
use lightfall_common::viewport::Viewport;
use tracing::{debug, trace};

/// Horizontal logical pixels of viewport per streak.
///
/// Density scales with width: a 1500 px viewport gets 100 streaks.
pub const DEFAULT_COLUMN_WIDTH: f32 = 15.0;

/// Streak length range in logical pixels.
pub const LENGTH_RANGE: (f32, f32) = (50.0, 250.0);

/// Streak fall speed range in logical pixels per tick.
pub const SPEED_RANGE: (f32, f32) = (2.0, 7.0);

/// Stroke width range in logical pixels.
pub const WIDTH_RANGE: (f32, f32) = (0.5, 2.5);

/// A single falling light streak.
///
/// `length`, `speed`, `width` and `color` are drawn once at spawn and stay
/// fixed for the streak's lifetime; only the position mutates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    /// Horizontal position of the streak in logical pixels
    pub x: f32,
    /// Vertical position of the streak head (bottom end) in logical pixels
    pub y: f32,
    /// Drawn length in logical pixels
    pub length: f32,
    /// Fall speed in logical pixels per tick
    pub speed: f32,
    /// Stroke width in logical pixels
    pub width: f32,
    /// Palette color
    pub color: StreakColor,
}

impl Streak {
    /// Spawns a streak at a uniformly random position inside the viewport.
    #[must_use]
    pub fn spawn(rng: &mut fastrand::Rng, viewport: &Viewport) -> Self {
        Self {
            x: rng.f32() * viewport.width,
            y: rng.f32() * viewport.height,
            length: random_range(rng, LENGTH_RANGE),
            speed: random_range(rng, SPEED_RANGE),
            width: random_range(rng, WIDTH_RANGE),
            color: StreakColor::from_index(rng.usize(0..PALETTE_SIZE)),
        }
    }

    /// Advances the streak by one tick.
    ///
    /// Moves the head down by `speed`; once the tail has fully exited below
    /// the viewport (`y > height + length`) the streak wraps to just above
    /// the visible top with a fresh random `x`. Returns whether it wrapped.
    pub fn advance(&mut self, rng: &mut fastrand::Rng, viewport: &Viewport) -> bool {
        self.y += self.speed;
        if self.y > viewport.height + self.length {
            self.y = -self.length;
            self.x = rng.f32() * viewport.width;
            true
        } else {
            false
        }
    }

    /// Checks whether any part of the streak is inside the viewport.
    #[must_use]
    pub fn is_visible(&self, viewport: &Viewport) -> bool {
        self.y - self.length < viewport.height && self.y > 0.0
    }
}

/// Draws a uniform value from an inclusive-exclusive range.
fn random_range(rng: &mut fastrand::Rng, (min, max): (f32, f32)) -> f32 {
    min + rng.f32() * (max - min)
}

/// The full collection of streaks for one viewport.
#[derive(Debug)]
pub struct StreakField {
    /// Streak slots; fully replaced on resize, never individually removed
    streaks: Vec<Streak>,
    /// Viewport the field was built for
    viewport: Viewport,
    /// Horizontal pixels per streak
    column_width: f32,
    /// Seedable random source; the only source of randomness in the field
    rng: fastrand::Rng,
}

impl StreakField {
    /// Number of streaks for a viewport width: `floor(width / column_width)`.
    #[must_use]
    pub fn target_count(width: f32, column_width: f32) -> usize {
        if width <= 0.0 || column_width <= 0.0 {
            return 0;
        }
        (width / column_width).floor() as usize
    }

    /// Creates a field for the given viewport with the default density.
    #[must_use]
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_column_width(viewport, seed, DEFAULT_COLUMN_WIDTH)
    }

    /// Creates a field with a custom horizontal density.
    #[must_use]
    pub fn with_column_width(viewport: Viewport, seed: u64, column_width: f32) -> Self {
        let mut field = Self {
            streaks: Vec::new(),
            viewport,
            column_width,
            rng: fastrand::Rng::with_seed(seed),
        };
        field.populate();
        field
    }

    /// Fills the collection from scratch for the current viewport.
    fn populate(&mut self) {
        let count = Self::target_count(self.viewport.width, self.column_width);
        self.streaks = Vec::with_capacity(count);
        for _ in 0..count {
            self.streaks.push(Streak::spawn(&mut self.rng, &self.viewport));
        }
        debug!(
            count,
            width = self.viewport.width,
            height = self.viewport.height,
            "populated streak field"
        );
    }

    /// Advances every streak by one tick.
    ///
    /// Streaks never interact, so update order does not matter.
    pub fn tick(&mut self) {
        let mut wrapped = 0u32;
        for streak in &mut self.streaks {
            if streak.advance(&mut self.rng, &self.viewport) {
                wrapped += 1;
            }
        }
        if wrapped > 0 {
            trace!(wrapped, "streaks wrapped above viewport");
        }
    }

    /// Regenerates the field for a new viewport.
    ///
    /// The collection is replaced wholesale: old streaks are discarded, not
    /// resized in place. Called on every resize event, undebounced.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.populate();
    }

    /// Returns the streaks.
    #[must_use]
    pub fn streaks(&self) -> &[Streak] {
        &self.streaks
    }

    /// Returns the viewport the field was built for.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Returns the number of streaks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streaks.len()
    }

    /// Checks whether the field holds no streaks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streaks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport(width: f32, height: f32) -> Viewport {
        Viewport::new(width, height, 1.0)
    }

    #[test]
    fn test_target_count_formula() {
        assert_eq!(StreakField::target_count(1500.0, 15.0), 100);
        assert_eq!(StreakField::target_count(1499.0, 15.0), 99);
        assert_eq!(StreakField::target_count(14.0, 15.0), 0);
        assert_eq!(StreakField::target_count(0.0, 15.0), 0);
        assert_eq!(StreakField::target_count(-100.0, 15.0), 0);
    }

    #[test]
    fn test_initial_population() {
        // 1500x800 at density 1 -> exactly 100 streaks
        let field = StreakField::new(viewport(1500.0, 800.0), 7);
        assert_eq!(field.len(), 100);

        for streak in field.streaks() {
            assert!((0.0..1500.0).contains(&streak.x));
            assert!((0.0..800.0).contains(&streak.y));
            assert!((LENGTH_RANGE.0..LENGTH_RANGE.1).contains(&streak.length));
            assert!((SPEED_RANGE.0..SPEED_RANGE.1).contains(&streak.speed));
            assert!((WIDTH_RANGE.0..WIDTH_RANGE.1).contains(&streak.width));
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let a = StreakField::new(viewport(600.0, 400.0), 42);
        let b = StreakField::new(viewport(600.0, 400.0), 42);
        assert_eq!(a.streaks(), b.streaks());

        let c = StreakField::new(viewport(600.0, 400.0), 43);
        assert_ne!(a.streaks(), c.streaks());
    }

    #[test]
    fn test_advance_no_wrap() {
        // y=790, length=100, speed=5, height 800 -> 795, no wrap
        let vp = viewport(1500.0, 800.0);
        let mut rng = fastrand::Rng::with_seed(1);
        let mut streak = Streak {
            x: 50.0,
            y: 790.0,
            length: 100.0,
            speed: 5.0,
            width: 1.0,
            color: StreakColor::Cyan,
        };

        assert!(!streak.advance(&mut rng, &vp));
        assert_eq!(streak.y, 795.0);
        assert_eq!(streak.x, 50.0);
    }

    #[test]
    fn test_advance_wraps_past_threshold() {
        // Reaching y=905 > 800+100 wraps to y=-100 with a fresh x
        let vp = viewport(1500.0, 800.0);
        let mut rng = fastrand::Rng::with_seed(1);
        let mut streak = Streak {
            x: 50.0,
            y: 900.0,
            length: 100.0,
            speed: 5.0,
            width: 1.0,
            color: StreakColor::Purple,
        };

        assert!(streak.advance(&mut rng, &vp));
        assert_eq!(streak.y, -100.0);
        assert!((0.0..1500.0).contains(&streak.x));
    }

    #[test]
    fn test_wrap_preserves_visual_parameters() {
        let vp = viewport(1200.0, 600.0);
        let mut field = StreakField::new(vp, 99);
        let before = field.streaks().to_vec();

        // Run long enough that every streak wraps at least once
        // (slowest streak, tallest exit: (600 + 250 + 250) / 2 = 550 ticks)
        for _ in 0..600 {
            field.tick();
        }

        for (old, new) in before.iter().zip(field.streaks()) {
            assert_eq!(old.length, new.length);
            assert_eq!(old.speed, new.speed);
            assert_eq!(old.width, new.width);
            assert_eq!(old.color, new.color);
        }
    }

    #[test]
    fn test_resize_replaces_collection() {
        let mut field = StreakField::new(viewport(1500.0, 800.0), 5);
        let before = field.streaks().to_vec();
        assert_eq!(before.len(), 100);

        field.resize(viewport(750.0, 400.0));
        assert_eq!(field.len(), 50);
        assert_eq!(field.viewport().width, 750.0);

        // No surviving instance: every slot is a fresh draw
        for (old, new) in before.iter().zip(field.streaks()) {
            assert_ne!(old, new);
        }
        for streak in field.streaks() {
            assert!((0.0..750.0).contains(&streak.x));
            assert!((0.0..400.0).contains(&streak.y));
        }
    }

    #[test]
    fn test_resize_to_empty_viewport() {
        let mut field = StreakField::new(viewport(300.0, 300.0), 5);
        assert!(!field.is_empty());

        field.resize(viewport(0.0, 0.0));
        assert!(field.is_empty());
        assert_eq!(field.len(), 0);

        // Ticking an empty field is a no-op, not a panic
        field.tick();
    }

    #[test]
    fn test_custom_column_width() {
        let field = StreakField::with_column_width(viewport(900.0, 600.0), 5, 30.0);
        assert_eq!(field.len(), 30);
    }

    #[test]
    fn test_visibility() {
        let vp = viewport(800.0, 600.0);
        let on_screen = Streak {
            x: 10.0,
            y: 100.0,
            length: 50.0,
            speed: 2.0,
            width: 1.0,
            color: StreakColor::Blue,
        };
        assert!(on_screen.is_visible(&vp));

        let above = Streak { y: -50.0, ..on_screen };
        assert!(!above.is_visible(&vp));

        let below = Streak { y: 700.0, ..on_screen };
        assert!(!below.is_visible(&vp));
    }

    proptest! {
        /// Wraparound fires before y grows unbounded: after any number of
        /// ticks, every streak satisfies y <= height + length.
        #[test]
        fn prop_wrap_bound_holds(
            seed in 0u64..1000,
            width in 100.0f32..2000.0,
            height in 100.0f32..1500.0,
            ticks in 0usize..500,
        ) {
            let mut field = StreakField::new(viewport(width, height), seed);
            for _ in 0..ticks {
                field.tick();
                for streak in field.streaks() {
                    prop_assert!(streak.y <= height + streak.length);
                    prop_assert!(streak.y >= -streak.length);
                }
            }
        }

        /// Count always matches the width formula, at init and after resize.
        #[test]
        fn prop_count_matches_width(
            seed in 0u64..1000,
            w1 in 0.0f32..3000.0,
            w2 in 0.0f32..3000.0,
        ) {
            let mut field = StreakField::new(viewport(w1, 500.0), seed);
            prop_assert_eq!(field.len(), (w1 / 15.0).floor() as usize);

            field.resize(viewport(w2, 500.0));
            prop_assert_eq!(field.len(), (w2 / 15.0).floor() as usize);
        }
    }
}
