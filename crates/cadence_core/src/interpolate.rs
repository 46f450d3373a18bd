//! Linear interpolation for animatable values
//!
//! Tweens accept any interpolation closure. These implementations are the
//! linear defaults used by the factories in `cadence_animation`.

use crate::values::{Color, Vec2, Vec3};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Non-negative distance between two values, used for speed-based durations
    fn distance(&self, other: &Self) -> f32;
}

// ============================================================================
// Scalars
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn distance(&self, other: &Self) -> f32 {
        (other - self).abs()
    }
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t as f64
    }

    fn distance(&self, other: &Self) -> f32 {
        (other - self).abs() as f32
    }
}

// ============================================================================
// Vectors
// ============================================================================

impl Interpolate for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    fn distance(&self, other: &Self) -> f32 {
        Vec2::distance(self, *other)
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    fn distance(&self, other: &Self) -> f32 {
        Vec3::distance(self, *other)
    }
}

// ============================================================================
// Color
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Largest per-channel difference, so a speed reads as "channel units per second"
    fn distance(&self, other: &Self) -> f32 {
        (other.r - self.r)
            .abs()
            .max((other.g - self.g).abs())
            .max((other.b - self.b).abs())
            .max((other.a - self.a).abs())
    }
}
