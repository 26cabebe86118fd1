//! L4 Atomic Layer: Spring physics
//!
//! Named spring presets plus a damped-spring filter used to smooth values
//! that would otherwise jump (fast scroll, retargeted counters).

use std::str::FromStr;
use std::time::Duration;

use crate::error::MotionError;

/// Longest integration step; larger frame gaps are split into sub-steps
const MAX_STEP_SECS: f64 = 1.0 / 240.0;
/// Cap on the time a single update may integrate (tab was backgrounded)
const MAX_FRAME_SECS: f64 = 0.25;

/// Physical parameters of a damped spring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringParams {
    pub const GENTLE: Self = Self::new(120.0, 14.0, 1.0);
    pub const SNAPPY: Self = Self::new(400.0, 40.0, 1.0);
    pub const SMOOTH: Self = Self::new(100.0, 30.0, 1.0);
    pub const BOUNCY: Self = Self::new(300.0, 10.0, 1.0);

    pub const fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Critically damped spring: fastest settle without overshoot
    pub fn critical(stiffness: f64, mass: f64) -> Self {
        let stiffness = stiffness.max(f64::EPSILON);
        let mass = mass.max(f64::EPSILON);
        Self::new(stiffness, 2.0 * (stiffness * mass).sqrt(), mass)
    }

    /// 1.0 = critical, below overshoots, above creeps
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Preset names accepted in configuration
    pub fn preset_names() -> &'static [&'static str] {
        &["gentle", "snappy", "smooth", "bouncy"]
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::SMOOTH
    }
}

impl FromStr for SpringParams {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gentle" => Ok(Self::GENTLE),
            "snappy" => Ok(Self::SNAPPY),
            "smooth" => Ok(Self::SMOOTH),
            "bouncy" => Ok(Self::BOUNCY),
            _ => Err(MotionError::UnknownPreset(s.to_string())),
        }
    }
}

/// Damped spring chasing a target value
#[derive(Debug, Clone)]
pub struct SpringFilter {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
    rest_delta: f64,
    rest_speed: f64,
}

impl SpringFilter {
    pub fn new(params: SpringParams, initial: f64) -> Self {
        Self {
            params,
            position: initial,
            velocity: 0.0,
            target: initial,
            rest_delta: 0.001,
            rest_speed: 0.01,
        }
    }

    /// Distance and speed below which the spring snaps to its target
    pub fn with_rest_thresholds(mut self, rest_delta: f64, rest_speed: f64) -> Self {
        self.rest_delta = rest_delta.abs();
        self.rest_speed = rest_speed.abs();
        self
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Move to `value` immediately and stop
    pub fn jump(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    /// Advance the simulation by `dt` and return the new position
    pub fn step(&mut self, dt: Duration) -> f64 {
        if self.is_settled() {
            return self.position;
        }

        let mut remaining = dt.as_secs_f64().min(MAX_FRAME_SECS);
        let mass = self.params.mass.max(f64::EPSILON);
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            let displacement = self.position - self.target;
            let force = -self.params.stiffness * displacement - self.params.damping * self.velocity;
            self.velocity += force / mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if (self.position - self.target).abs() < self.rest_delta
            && self.velocity.abs() < self.rest_speed
        {
            self.position = self.target;
            self.velocity = 0.0;
        }
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_settled(filter: &mut SpringFilter, max_frames: usize) -> (usize, f64) {
        let mut peak = filter.position();
        for frame in 0..max_frames {
            let value = filter.step(Duration::from_millis(16));
            peak = peak.max(value);
            if filter.is_settled() {
                return (frame, peak);
            }
        }
        (max_frames, peak)
    }

    #[test]
    fn test_presets_parse() {
        assert_eq!("Snappy".parse::<SpringParams>().unwrap(), SpringParams::SNAPPY);
        assert!(matches!(
            "jelly".parse::<SpringParams>(),
            Err(MotionError::UnknownPreset(_))
        ));
        for name in SpringParams::preset_names() {
            assert!(name.parse::<SpringParams>().is_ok());
        }
    }

    #[test]
    fn test_critical_damping_ratio() {
        let params = SpringParams::critical(170.0, 1.0);
        assert!((params.damping_ratio() - 1.0).abs() < 1e-9);
        assert!((SpringParams::SNAPPY.damping_ratio() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_critically_damped_settles_without_overshoot() {
        let mut filter = SpringFilter::new(SpringParams::critical(300.0, 1.0), 0.0);
        filter.set_target(1.0);
        let (frames, peak) = run_until_settled(&mut filter, 600);
        assert!(frames < 600, "spring never settled");
        assert!(peak <= 1.0 + 1e-6, "overshot to {}", peak);
        assert_eq!(filter.position(), 1.0);
    }

    #[test]
    fn test_bouncy_overshoots_then_settles() {
        let mut filter = SpringFilter::new(SpringParams::BOUNCY, 0.0);
        filter.set_target(1.0);
        let (frames, peak) = run_until_settled(&mut filter, 2000);
        assert!(peak > 1.05);
        assert!(frames < 2000);
    }

    #[test]
    fn test_long_frame_gap_is_stable() {
        let mut filter = SpringFilter::new(SpringParams::SNAPPY, 0.0);
        filter.set_target(100.0);
        let value = filter.step(Duration::from_secs(10));
        assert!(value.is_finite());
        assert!(value <= 100.0 + 1e-6);
    }

    #[test]
    fn test_jump_stops_motion() {
        let mut filter = SpringFilter::new(SpringParams::GENTLE, 0.0);
        filter.set_target(5.0);
        filter.step(Duration::from_millis(16));
        filter.jump(2.0);
        assert!(filter.is_settled());
        assert_eq!(filter.step(Duration::from_millis(16)), 2.0);
    }
}
