//! L4 Atomic Layer: Time calculation utilities
//!
//! All animation state is evaluated against a timeline timestamp (`now`,
//! the time elapsed since some fixed origin) rather than the wall clock,
//! so every frame is reproducible from its timestamp alone.

use std::time::Duration;

/// Animation progress (0.0 to 1.0) of a run that began at `start`
///
/// A zero duration is complete immediately; a `now` before `start` is 0.
#[inline]
pub fn progress(start: Duration, now: Duration, duration: Duration) -> f64 {
    if now < start {
        return 0.0;
    }
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now - start;
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if a run that began at `start` has finished
#[inline]
pub fn is_complete(start: Duration, now: Duration, duration: Duration) -> bool {
    now >= start + duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Where `value` sits between `from` and `to`, as a fraction
#[inline]
pub fn inverse_lerp(from: f64, to: f64, value: f64) -> f64 {
    if (to - from).abs() < f64::EPSILON {
        return 0.0;
    }
    (value - from) / (to - from)
}
