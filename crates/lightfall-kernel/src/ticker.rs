//! Frame ticker with explicit cancellation.
//!
//! The repaint loop is modeled as a task gated by a cancellation token
//! rather than a self-rescheduling callback capturing mutable flags:
//! `FrameTicker::start` hands out a `TickerHandle`, and once the handle is
//! stopped no further tick is issued, ever. The driving event loop calls
//! [`FrameTicker::tick`] once per redraw and skips the frame when it
//! returns `false`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Issues frame ticks until its handle is stopped.
#[derive(Debug)]
pub struct FrameTicker {
    /// Shared liveness flag; cleared exactly once by the handle
    active: Arc<AtomicBool>,
    /// Frames issued so far
    frames: u64,
}

/// Cancellation token for a [`FrameTicker`].
///
/// Stopping is idempotent and final: a stopped ticker never issues another
/// tick, and the handle cannot be restarted.
#[derive(Debug, Clone)]
pub struct TickerHandle {
    active: Arc<AtomicBool>,
}

impl FrameTicker {
    /// Starts a ticker and returns it with its cancellation handle.
    #[must_use]
    pub fn start() -> (Self, TickerHandle) {
        let active = Arc::new(AtomicBool::new(true));
        let ticker = Self {
            active: Arc::clone(&active),
            frames: 0,
        };
        (ticker, TickerHandle { active })
    }

    /// Requests one frame tick.
    ///
    /// Returns `true` while the handle is live; after [`TickerHandle::stop`]
    /// every call returns `false` and the frame counter stays frozen.
    pub fn tick(&mut self) -> bool {
        if self.active.load(Ordering::Acquire) {
            self.frames += 1;
            true
        } else {
            false
        }
    }

    /// Checks whether the ticker is still live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Returns the number of ticks issued.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl TickerHandle {
    /// Stops the ticker. Idempotent; no tick succeeds afterwards.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::Release) {
            debug!("frame ticker stopped");
        }
    }

    /// Checks whether the ticker is still live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_while_live() {
        let (mut ticker, handle) = FrameTicker::start();
        assert!(ticker.is_active());
        assert!(handle.is_active());

        for expected in 1..=5 {
            assert!(ticker.tick());
            assert_eq!(ticker.frames(), expected);
        }
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let (mut ticker, handle) = FrameTicker::start();
        assert!(ticker.tick());
        assert!(ticker.tick());

        handle.stop();
        assert!(!ticker.is_active());

        // Simulate N further redraw requests: none may become a frame
        for _ in 0..100 {
            assert!(!ticker.tick());
        }
        assert_eq!(ticker.frames(), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut ticker, handle) = FrameTicker::start();
        handle.stop();
        handle.stop();
        handle.stop();
        assert!(!ticker.tick());
    }

    #[test]
    fn test_stopped_ticker_drives_no_field_mutation() {
        use crate::field::StreakField;
        use lightfall_common::viewport::Viewport;

        let (mut ticker, handle) = FrameTicker::start();
        let mut field = StreakField::new(Viewport::new(600.0, 400.0, 1.0), 3);

        handle.stop();
        let before = field.streaks().to_vec();
        for _ in 0..10 {
            if ticker.tick() {
                field.tick();
            }
        }
        assert_eq!(before, field.streaks());
    }

    #[test]
    fn test_cloned_handle_stops_ticker() {
        let (mut ticker, handle) = FrameTicker::start();
        let clone = handle.clone();
        clone.stop();
        assert!(!handle.is_active());
        assert!(!ticker.tick());
    }
}
