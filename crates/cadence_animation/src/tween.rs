//! Tween states
//!
//! A [`Tween`] is a data-only description of one timed interpolation. It
//! knows how to apply its value for a given time and how to finish, but it
//! never removes itself from anywhere: the scheduler decides when a finished
//! tween is dropped and when its terminal effects run.

use crate::error::{Result, TweenError};
use std::any::{type_name, Any};
use std::fmt;

/// Interpolation function: (start, end, progress) -> value
pub type Interpolator<T> = Box<dyn Fn(&T, &T, f32) -> T>;

/// Applies an interpolated value to some external property
pub type Setter<T> = Box<dyn FnMut(T)>;

/// Invoked once when a tween completes
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Type-erased contract the scheduler drives every tick
///
/// [`Tween<T>`] is the standard implementation. Custom states can implement
/// this trait directly and be registered on a channel like any tween.
pub trait TweenState: Any {
    /// Advance to `now`. Returns `true` while the state wants to stay scheduled.
    fn update(&mut self, now: f32) -> bool;

    /// Apply terminal effects (final value, then completion callback)
    fn complete(&mut self);

    fn is_paused(&self) -> bool;

    fn set_paused(&mut self, paused: bool);

    fn start_time(&self) -> f32;

    fn set_start_time(&mut self, start_time: f32);

    /// Name of the animated value type, for diagnostics
    fn value_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// A timed interpolation of a value from `start_value` to `end_value`
pub struct Tween<T> {
    start_value: T,
    end_value: T,
    start_time: f32,
    duration: f32,
    interpolator: Interpolator<T>,
    setter: Option<Setter<T>>,
    on_completed: Option<CompletionCallback>,
    paused: bool,
}

impl<T: Clone + 'static> Tween<T> {
    /// Create a tween starting at `start_time` and lasting `duration` seconds
    ///
    /// Fails when `duration` is negative or either time is not finite.
    pub fn new<F>(
        start_value: T,
        end_value: T,
        start_time: f32,
        duration: f32,
        interpolator: F,
    ) -> Result<Self>
    where
        F: Fn(&T, &T, f32) -> T + 'static,
    {
        if !start_time.is_finite() {
            return Err(TweenError::InvalidTime(start_time));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(TweenError::InvalidDuration(duration));
        }

        Ok(Self {
            start_value,
            end_value,
            start_time,
            duration,
            interpolator: Box::new(interpolator),
            setter: None,
            on_completed: None,
            paused: false,
        })
    }

    /// Set the callback that receives interpolated values
    pub fn with_setter<F: FnMut(T) + 'static>(mut self, setter: F) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Set the callback fired when the tween completes
    pub fn on_completed<F: FnOnce() + 'static>(mut self, callback: F) -> Self {
        self.on_completed = Some(Box::new(callback));
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn start_value(&self) -> &T {
        &self.start_value
    }

    pub fn end_value(&self) -> &T {
        &self.end_value
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// Normalized progress at `now`, clamped to `[0, 1]`
    pub fn progress_at(&self, now: f32) -> f32 {
        if now < self.start_time {
            0.0
        } else if now >= self.end_time() {
            1.0
        } else {
            ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Interpolated value at `now`, without applying it
    pub fn value_at(&self, now: f32) -> T {
        (self.interpolator)(&self.start_value, &self.end_value, self.progress_at(now))
    }
}

impl<T: Clone + 'static> TweenState for Tween<T> {
    fn update(&mut self, now: f32) -> bool {
        if now < self.start_time {
            return true;
        }
        if now >= self.start_time + self.duration {
            return false;
        }

        if let Some(setter) = self.setter.as_mut() {
            let progress = (now - self.start_time) / self.duration;
            setter((self.interpolator)(&self.start_value, &self.end_value, progress));
        }
        true
    }

    fn complete(&mut self) {
        if let Some(setter) = self.setter.as_mut() {
            setter(self.end_value.clone());
        }
        if let Some(callback) = self.on_completed.take() {
            callback();
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn start_time(&self) -> f32 {
        self.start_time
    }

    fn set_start_time(&mut self, start_time: f32) {
        self.start_time = start_time;
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("start_value", &self.start_value)
            .field("end_value", &self.end_value)
            .field("start_time", &self.start_time)
            .field("duration", &self.duration)
            .field("paused", &self.paused)
            .field("has_setter", &self.setter.is_some())
            .field("has_on_completed", &self.on_completed.is_some())
            .finish()
    }
}

/// Owned copy of a tween's data, returned by channel lookups
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSnapshot<T> {
    pub start_value: T,
    pub end_value: T,
    pub start_time: f32,
    pub duration: f32,
    pub paused: bool,
}

impl<T: Clone> TweenSnapshot<T> {
    pub(crate) fn of(tween: &Tween<T>) -> Self {
        Self {
            start_value: tween.start_value.clone(),
            end_value: tween.end_value.clone(),
            start_time: tween.start_time,
            duration: tween.duration,
            paused: tween.paused,
        }
    }

    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }
}
