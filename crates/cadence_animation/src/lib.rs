//! Cadence Animation System
//!
//! Named tween channels driven once per frame.
//!
//! # Features
//!
//! - **Tweens**: Generic timed interpolations with setter and completion callbacks
//! - **Channels**: At most one tween per name; set, replace, stop or complete by name
//! - **Pause and Solo**: Freeze every channel, or all but one until it finishes
//! - **Reentrant**: Callbacks fired during a tick may freely use the scheduler
//! - **Factories**: Linear, speed-based, hold and delay tweens

pub mod config;
pub mod error;
pub mod factory;
pub mod scheduler;
pub mod tween;

pub use config::{SchedulerConfig, TickOrder};
pub use error::{Result, TweenError};
pub use factory::TweenFactory;
pub use scheduler::{ChannelScheduler, SchedulerHandle};
pub use tween::{CompletionCallback, Interpolator, Setter, Tween, TweenSnapshot, TweenState};
