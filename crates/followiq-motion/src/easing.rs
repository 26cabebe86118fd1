//! L4 Atomic Layer: Pure easing functions
//!
//! Provides mathematical easing functions that map input [0, 1] to output [0, 1]
//! with various acceleration curves.

use std::str::FromStr;

pub use followiq_core::EasingType;

use crate::error::{MotionError, Result};

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => if t < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => t,
            EasingType::Cubic => cubic_ease_out(t),
            EasingType::Quintic => quintic_ease_out(t),
            EasingType::EaseOut => exponential_ease_out(t),
            EasingType::EaseInOut => cubic_ease_in_out(t),
            EasingType::Smooth => SMOOTH.apply(t),
            EasingType::Anticipate => ANTICIPATE.apply(t),
        }
    }
}

/// Parse a curve name as written in config files or on the command line
pub fn parse_easing(name: &str) -> Result<EasingType> {
    let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
    let easing = match normalized.as_str() {
        "none" | "instant" => EasingType::None,
        "linear" => EasingType::Linear,
        "cubic" | "ease_out_cubic" => EasingType::Cubic,
        "quintic" => EasingType::Quintic,
        "ease_out" | "expo" => EasingType::EaseOut,
        "ease_in_out" => EasingType::EaseInOut,
        "smooth" => EasingType::Smooth,
        "anticipate" | "ease" => EasingType::Anticipate,
        _ => return Err(MotionError::UnknownEasing(name.to_string())),
    };
    Ok(easing)
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
pub fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Quintic ease-out: f(t) = 1 - (1-t)⁵
#[inline]
fn quintic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv * inv * inv
}

/// Exponential ease-out: f(t) = 1 - 2^(-10t)
#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

#[inline]
fn cubic_ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let k = -2.0 * t + 2.0;
        1.0 - k * k * k / 2.0
    }
}

const SMOOTH: CubicBezier = CubicBezier::new(0.22, 1.0, 0.36, 1.0);
const ANTICIPATE: CubicBezier = CubicBezier::new(0.25, 0.1, 0.25, 1.0);

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const EPSILON: f64 = 1e-7;

    /// `x1` and `x2` are clamped to [0, 1] when solving, so the curve
    /// stays a function of time
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    fn component(a: f64, b: f64, s: f64) -> f64 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    }

    #[inline]
    fn slope(a: f64, b: f64, s: f64) -> f64 {
        let inv = 1.0 - s;
        3.0 * inv * inv * a + 6.0 * inv * s * (b - a) + 3.0 * s * s * (1.0 - b)
    }

    /// Curve parameter whose x equals `x`
    fn solve_parameter(&self, x: f64) -> f64 {
        let x1 = self.x1.clamp(0.0, 1.0);
        let x2 = self.x2.clamp(0.0, 1.0);

        let mut s = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let error = Self::component(x1, x2, s) - x;
            if error.abs() < Self::EPSILON {
                return s;
            }
            let slope = Self::slope(x1, x2, s);
            if slope.abs() < 1e-6 {
                break;
            }
            s -= error / slope;
        }

        // Newton stalled on a flat section, bisect instead
        let (mut lo, mut hi) = (0.0, 1.0);
        s = x;
        while hi - lo > Self::EPSILON {
            let value = Self::component(x1, x2, s);
            if (value - x).abs() < Self::EPSILON {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        s
    }

    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        Self::component(self.y1, self.y2, self.solve_parameter(t))
    }
}

/// Newtype so command-line parsers can use `FromStr` on a curve name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EasingChoice(pub EasingType);

impl FromStr for EasingChoice {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self> {
        parse_easing(s).map(EasingChoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingType; 8] = [
        EasingType::None,
        EasingType::Linear,
        EasingType::Cubic,
        EasingType::Quintic,
        EasingType::EaseOut,
        EasingType::EaseInOut,
        EasingType::Smooth,
        EasingType::Anticipate,
    ];

    #[test]
    fn test_easing_boundaries() {
        for easing in ALL {
            // t=0 should give 0 (except None which jumps)
            if easing != EasingType::None {
                assert!((easing.apply(0.0) - 0.0).abs() < 0.001, "{:?} at t=0", easing);
            }
            // t=1 should give 1
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in ALL.into_iter().filter(|e| *e != EasingType::None) {
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = easing.apply(t);
                assert!(v >= prev - 1e-9, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_cubic_ease_out_formula() {
        assert!((EasingType::Cubic.apply(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let linear = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-5, "t={}", t);
        }
    }

    #[test]
    fn test_smooth_front_loads_motion() {
        assert!(EasingType::Smooth.apply(0.3) > 0.7);
        assert!(EasingType::Smooth.apply(0.3) < 1.0);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        assert_eq!(EasingType::Linear.apply(-1.0), 0.0);
        assert_eq!(EasingType::Cubic.apply(3.0), 1.0);
    }

    #[test]
    fn test_parse_easing() {
        assert_eq!(parse_easing("ease-in-out").unwrap(), EasingType::EaseInOut);
        assert_eq!(parse_easing(" Linear ").unwrap(), EasingType::Linear);
        assert_eq!("smooth".parse::<EasingChoice>().unwrap().0, EasingType::Smooth);
        assert!(matches!(parse_easing("bouncy"), Err(MotionError::UnknownEasing(_))));
    }
}
