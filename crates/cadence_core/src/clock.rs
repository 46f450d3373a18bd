//! Frame clocks
//!
//! A scheduler never reads wall-clock or calendar time. It asks a
//! [`FrameClock`] for the current time once per tick and derives the
//! elapsed time from the previous reading.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonic frame time, in seconds
pub trait FrameClock {
    /// Current time in seconds
    fn now(&self) -> f32;
}

impl<F> FrameClock for F
where
    F: Fn() -> f32,
{
    fn now(&self) -> f32 {
        self()
    }
}

/// A clock whose time is set explicitly by the host
///
/// Clones share the same underlying time, so a host can keep one copy and
/// hand another to a scheduler.
///
/// ```rust
/// use cadence_core::{FrameClock, ManualClock};
///
/// let clock = ManualClock::new(1.0);
/// let shared = clock.clone();
/// clock.set(2.5);
/// assert_eq!(shared.now(), 2.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    time: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new(time: f32) -> Self {
        Self {
            time: Rc::new(Cell::new(time)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, time: f32) {
        self.time.set(time);
    }

    /// Move time forward by `dt` seconds
    pub fn advance(&self, dt: f32) {
        self.time.set(self.time.get() + dt);
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f32 {
        self.time.get()
    }
}

/// Monotonic clock measuring seconds since its creation
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}
