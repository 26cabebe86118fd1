//! L3 Molecular Layer: Stagger orchestration
//!
//! Computes per-child start delays so a list or grid reveals one item after
//! another instead of all at once. Delays are always relative to the
//! parent's own trigger, so no child starts before its parent.

use std::time::Duration;

/// How the gap between consecutive children evolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaggerPolicy {
    /// `delay(i) = i * step`
    Linear { step: Duration },
    /// `delay(i) = step * (1 - rate^i) / (1 - rate)`
    ///
    /// Each gap is `rate` times the previous one, so long lists front-load
    /// their motion and the tail arrives quickly. The total delay is
    /// bounded by `step / (1 - rate)`.
    Decay { step: Duration, rate: f64 },
}

impl StaggerPolicy {
    pub const DEFAULT_DECAY: f64 = 0.85;

    pub fn linear(step: Duration) -> Self {
        Self::Linear { step }
    }

    pub fn decay(step: Duration) -> Self {
        Self::Decay {
            step,
            rate: Self::DEFAULT_DECAY,
        }
    }

    /// Delay of the child at (possibly fractional) position `index`
    pub fn delay_at(&self, index: f64) -> Duration {
        let index = if index.is_finite() { index.max(0.0) } else { 0.0 };
        let secs = match *self {
            Self::Linear { step } => step.as_secs_f64() * index,
            Self::Decay { step, rate } => {
                let step = step.as_secs_f64();
                if rate >= 1.0 || !rate.is_finite() {
                    step * index
                } else if rate <= 0.0 {
                    if index > 0.0 { step } else { 0.0 }
                } else {
                    step * (1.0 - rate.powf(index)) / (1.0 - rate)
                }
            }
        };
        Duration::from_secs_f64(secs.max(0.0))
    }

    #[inline]
    pub fn delay(&self, index: usize) -> Duration {
        self.delay_at(index as f64)
    }
}

impl Default for StaggerPolicy {
    fn default() -> Self {
        Self::decay(Duration::from_millis(100))
    }
}

/// Which child starts first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaggerFrom {
    #[default]
    First,
    Last,
    /// Middle out
    Center,
}

/// Stagger policy plus where it starts and an offset before the first child
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stagger {
    pub policy: StaggerPolicy,
    pub from: StaggerFrom,
    /// Gap between the parent trigger and the first child
    pub delay_children: Duration,
}

impl Stagger {
    pub fn new(policy: StaggerPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn from(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    pub fn delay_children(mut self, delay: Duration) -> Self {
        self.delay_children = delay;
        self
    }

    fn position(&self, index: usize, count: usize) -> f64 {
        let last = count.saturating_sub(1) as f64;
        let index = index as f64;
        match self.from {
            StaggerFrom::First => index,
            StaggerFrom::Last => (last - index).max(0.0),
            StaggerFrom::Center => (index - last / 2.0).abs(),
        }
    }

    /// Offset of child `index` (of `count`) from the parent trigger
    pub fn child_delay(&self, index: usize, count: usize) -> Duration {
        self.delay_children + self.policy.delay_at(self.position(index, count))
    }

    /// Absolute start time of every child given the parent's trigger time
    pub fn schedule(&self, parent_start: Duration, count: usize) -> Vec<Duration> {
        (0..count)
            .map(|i| parent_start + self.child_delay(i, count))
            .collect()
    }

    /// Time from parent trigger until the last child finishes
    pub fn total_duration(&self, count: usize, child_duration: Duration) -> Duration {
        (0..count)
            .map(|i| self.child_delay(i, count) + child_duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(100);

    fn assert_non_decreasing(policy: StaggerPolicy) {
        let mut prev = Duration::ZERO;
        for i in 0..50 {
            let d = policy.delay(i);
            assert!(d >= prev, "{:?} decreased at {}", policy, i);
            prev = d;
        }
    }

    #[test]
    fn test_linear_delays() {
        let policy = StaggerPolicy::linear(STEP);
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(3), Duration::from_millis(300));
        assert_non_decreasing(policy);
    }

    #[test]
    fn test_decay_starts_at_zero_and_shrinks_gaps() {
        let policy = StaggerPolicy::decay(STEP);
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(1), STEP);
        assert_non_decreasing(policy);

        let gap1 = policy.delay(2) - policy.delay(1);
        let gap5 = policy.delay(6) - policy.delay(5);
        assert!(gap5 < gap1);

        // Bounded by step / (1 - rate)
        let bound = STEP.as_secs_f64() / (1.0 - StaggerPolicy::DEFAULT_DECAY);
        assert!(policy.delay(1000).as_secs_f64() <= bound + 1e-9);
    }

    #[test]
    fn test_decay_degenerate_rates() {
        let unit = StaggerPolicy::Decay { step: STEP, rate: 1.0 };
        assert_eq!(unit.delay(4), Duration::from_millis(400));
        assert_non_decreasing(unit);

        let zero = StaggerPolicy::Decay { step: STEP, rate: 0.0 };
        assert_eq!(zero.delay(0), Duration::ZERO);
        assert_eq!(zero.delay(7), STEP);
        assert_non_decreasing(zero);
    }

    #[test]
    fn test_empty_schedule() {
        let stagger = Stagger::default();
        assert!(stagger.schedule(Duration::from_secs(1), 0).is_empty());
        assert_eq!(stagger.total_duration(0, STEP), Duration::ZERO);
    }

    #[test]
    fn test_children_never_start_before_parent() {
        let parent = Duration::from_millis(750);
        let stagger = Stagger::new(StaggerPolicy::linear(STEP))
            .delay_children(Duration::from_millis(200));
        let starts = stagger.schedule(parent, 4);
        assert_eq!(starts[0], Duration::from_millis(950));
        assert_eq!(starts[3], Duration::from_millis(1250));
        assert!(starts.iter().all(|s| *s >= parent));
    }

    #[test]
    fn test_from_last_and_center() {
        let last = Stagger::new(StaggerPolicy::linear(STEP)).from(StaggerFrom::Last);
        assert_eq!(last.child_delay(4, 5), Duration::ZERO);
        assert_eq!(last.child_delay(0, 5), Duration::from_millis(400));

        let center = Stagger::new(StaggerPolicy::linear(STEP)).from(StaggerFrom::Center);
        assert_eq!(center.child_delay(2, 5), Duration::ZERO);
        assert_eq!(center.child_delay(0, 5), center.child_delay(4, 5));
    }

    #[test]
    fn test_total_duration() {
        let stagger = Stagger::new(StaggerPolicy::linear(STEP));
        assert_eq!(
            stagger.total_duration(3, Duration::from_millis(500)),
            Duration::from_millis(700)
        );
    }
}
