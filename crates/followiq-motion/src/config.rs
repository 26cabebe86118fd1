//! L4 Atomic Layer: Configuration types for animations
//!
//! Re-exports configuration from followiq-core and provides typed accessors.

use std::time::Duration;

pub use followiq_core::{EasingType, MotionConfig};

use crate::error::Result;
use crate::spring::SpringParams;
use crate::stagger::StaggerPolicy;

/// Extension trait for MotionConfig with utility methods
pub trait MotionConfigExt {
    /// Reveal duration as Duration (zero under reduced motion)
    fn reveal_duration(&self) -> Duration;

    /// Tick duration for the configured frame rate
    fn frame_duration(&self) -> Duration;

    /// Stagger policy built from step and decay
    fn stagger_policy(&self) -> StaggerPolicy;

    /// Spring preset named in the config
    fn spring(&self) -> Result<SpringParams>;

    fn counter_duration(&self) -> Duration;

    fn typewriter_tick(&self) -> Duration;

    /// Easing after applying reduced motion
    fn effective_easing(&self) -> EasingType;
}

impl MotionConfigExt for MotionConfig {
    #[inline]
    fn reveal_duration(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.reveal_duration_ms)
        }
    }

    #[inline]
    fn frame_duration(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.fps as u64).max(Duration::from_millis(1))
        }
    }

    fn stagger_policy(&self) -> StaggerPolicy {
        let step = if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.stagger_step_ms)
        };
        if (self.stagger_decay - 1.0).abs() < f64::EPSILON {
            StaggerPolicy::Linear { step }
        } else {
            StaggerPolicy::Decay {
                step,
                rate: self.stagger_decay,
            }
        }
    }

    fn spring(&self) -> Result<SpringParams> {
        self.spring_preset.parse()
    }

    fn counter_duration(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.counter_duration_ms)
        }
    }

    fn typewriter_tick(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.typewriter_tick_ms)
        }
    }

    fn effective_easing(&self) -> EasingType {
        if self.reduced_motion {
            EasingType::None
        } else {
            self.easing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MotionConfig::default();
        assert!(!config.reduced_motion);
        assert_eq!(config.reveal_duration(), Duration::from_millis(600));
        assert_eq!(config.frame_duration(), Duration::from_millis(16));
        assert_eq!(config.spring().unwrap(), SpringParams::SMOOTH);
        assert_eq!(config.effective_easing(), EasingType::Cubic);
        assert!(matches!(config.stagger_policy(), StaggerPolicy::Decay { .. }));
    }

    #[test]
    fn test_reduced_motion_zeroes_durations() {
        let config = MotionConfig {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(config.reveal_duration(), Duration::ZERO);
        assert_eq!(config.counter_duration(), Duration::ZERO);
        assert_eq!(config.typewriter_tick(), Duration::ZERO);
        assert_eq!(config.effective_easing(), EasingType::None);
    }

    #[test]
    fn test_linear_stagger_when_decay_is_one() {
        let config = MotionConfig {
            stagger_decay: 1.0,
            ..Default::default()
        };
        assert_eq!(
            config.stagger_policy(),
            StaggerPolicy::Linear {
                step: Duration::from_millis(100)
            }
        );
    }

    #[test]
    fn test_zero_fps_fallback() {
        let config = MotionConfig {
            fps: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_millis(16));
    }

    #[test]
    fn test_unknown_spring_preset() {
        let config = MotionConfig {
            spring_preset: "wobbly".to_string(),
            ..Default::default()
        };
        assert!(config.spring().is_err());
    }
}
