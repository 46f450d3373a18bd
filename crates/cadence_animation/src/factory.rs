//! Tween factories
//!
//! Convenience constructors pairing common value types with linear
//! interpolation.

use crate::error::{Result, TweenError};
use crate::tween::Tween;
use cadence_core::Interpolate;

/// Pre-built tween constructors
pub struct TweenFactory;

impl TweenFactory {
    // ========================================================================
    // Duration based
    // ========================================================================

    /// Linear tween from `start` to `end` over `duration` seconds
    pub fn lerp<T>(start: T, end: T, start_time: f32, duration: f32) -> Result<Tween<T>>
    where
        T: Interpolate + 'static,
    {
        Tween::new(start, end, start_time, duration, T::lerp)
    }

    /// Keep `value` applied for `duration` seconds
    pub fn hold<T>(value: T, start_time: f32, duration: f32) -> Result<Tween<T>>
    where
        T: Clone + 'static,
    {
        Tween::new(value.clone(), value, start_time, duration, |start: &T, _: &T, _| {
            start.clone()
        })
    }

    /// A dormant tween with no value: waits out `duration`, then completes
    ///
    /// Attach the work to run with [`Tween::on_completed`].
    pub fn delay(start_time: f32, duration: f32) -> Result<Tween<()>> {
        Tween::new((), (), start_time, duration, |_: &(), _: &(), _| ())
    }

    // ========================================================================
    // Speed based
    // ========================================================================

    /// Linear tween moving at `speed` units per second
    ///
    /// The duration is `distance(start, end) / speed`. `speed` must be
    /// finite and positive.
    pub fn with_speed<T>(start: T, end: T, speed: f32, start_time: f32) -> Result<Tween<T>>
    where
        T: Interpolate + 'static,
    {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(TweenError::InvalidSpeed(speed));
        }
        let duration = start.distance(&end) / speed;
        Tween::new(start, end, start_time, duration, T::lerp)
    }

    /// Float tween moving at `speed` units per second
    pub fn float_with_speed(start: f32, end: f32, speed: f32, start_time: f32) -> Result<Tween<f32>> {
        Self::with_speed(start, end, speed, start_time)
    }
}
