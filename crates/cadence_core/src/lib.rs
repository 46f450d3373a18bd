//! Cadence Core
//!
//! Foundational pieces shared by the Cadence animation crates:
//!
//! - **Frame Clocks**: the host-supplied time source a scheduler ticks against
//! - **Values**: small animatable value types (`Vec2`, `Vec3`, `Color`)
//! - **Interpolation**: linear defaults used by the tween factories
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{FrameClock, Interpolate, ManualClock};
//!
//! let clock = ManualClock::new(0.0);
//! clock.advance(0.25);
//! assert_eq!(clock.now(), 0.25);
//!
//! assert_eq!(0.0f32.lerp(&10.0, 0.5), 5.0);
//! ```

pub mod clock;
pub mod interpolate;
pub mod values;

pub use clock::{FrameClock, ManualClock, SystemClock};
pub use interpolate::Interpolate;
pub use values::{Color, Vec2, Vec3};
