//! L3 Molecular Layer: Reveal transition
//!
//! Plays a `Variants` pair from hidden to visible once triggered.

use std::time::Duration;

use crate::animator::{Animator, AnimatorPhase};
use crate::easing::{EasingType, EasingTypeExt};
use crate::timing::{is_complete, progress};
use crate::variants::{StyleDelta, Variants};

#[derive(Debug, Clone)]
pub struct RevealTransition {
    variants: Variants,
    delay: Duration,
    duration: Duration,
    easing: EasingType,
    /// When the motion itself begins (trigger + delay)
    start: Option<Duration>,
    phase: AnimatorPhase,
}

impl RevealTransition {
    pub fn new(variants: Variants, duration: Duration, easing: EasingType) -> Self {
        Self {
            variants,
            delay: Duration::ZERO,
            duration,
            easing,
            start: None,
            phase: AnimatorPhase::Idle,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn variants(&self) -> &Variants {
        &self.variants
    }

    pub fn is_triggered(&self) -> bool {
        self.start.is_some()
    }

    /// Start the reveal; a second trigger while running or settled is ignored
    pub fn trigger(&mut self, now: Duration) {
        if self.start.is_none() {
            self.start = Some(now + self.delay);
            self.phase = AnimatorPhase::Running;
        }
    }

    /// Back to hidden, ready to trigger again
    pub fn reset(&mut self) {
        self.start = None;
        self.phase = AnimatorPhase::Idle;
    }

    /// Style at `now` without advancing the phase
    pub fn style_at(&self, now: Duration) -> StyleDelta {
        match self.start {
            None => self.variants.hidden,
            Some(start) => {
                let t = progress(start, now, self.duration);
                self.variants.at(self.easing.apply(t))
            }
        }
    }
}

impl Animator for RevealTransition {
    type Output = StyleDelta;

    fn tick(&mut self, now: Duration) -> StyleDelta {
        if let Some(start) = self.start {
            if is_complete(start, now, self.duration) {
                self.phase = AnimatorPhase::Settled;
            }
        }
        self.style_at(now)
    }

    fn phase(&self) -> AnimatorPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::{compute_variants, Direction, RevealOptions};

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn fade_up() -> RevealTransition {
        let variants = compute_variants(&RevealOptions::new(Direction::Up, 40.0));
        RevealTransition::new(variants, ms(600), EasingType::Linear).with_delay(ms(100))
    }

    #[test]
    fn test_hidden_until_triggered() {
        let mut transition = fade_up();
        assert_eq!(transition.tick(ms(5000)), transition.variants().hidden);
        assert_eq!(transition.phase(), AnimatorPhase::Idle);
    }

    #[test]
    fn test_delay_then_linear_progress() {
        let mut transition = fade_up();
        transition.trigger(ms(1000));
        assert_eq!(transition.tick(ms(1050)).opacity, 0.0);

        let mid = transition.tick(ms(1400));
        assert!((mid.opacity - 0.5).abs() < 1e-9);
        assert!((mid.y - 20.0).abs() < 1e-9);
        assert_eq!(transition.phase(), AnimatorPhase::Running);

        assert_eq!(transition.tick(ms(1700)), transition.variants().visible);
        assert!(transition.is_settled());
    }

    #[test]
    fn test_retrigger_is_ignored_and_reset_rearms() {
        let mut transition = fade_up();
        transition.trigger(ms(0));
        transition.trigger(ms(500));
        assert!(transition.tick(ms(700)).opacity >= 1.0);

        transition.reset();
        assert!(!transition.is_triggered());
        assert_eq!(transition.tick(ms(800)), transition.variants().hidden);
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let variants = compute_variants(&RevealOptions::default());
        let mut transition = RevealTransition::new(variants, Duration::ZERO, EasingType::None);
        transition.trigger(ms(10));
        assert_eq!(transition.tick(ms(10)), variants.visible);
        assert!(transition.is_settled());
    }
}
