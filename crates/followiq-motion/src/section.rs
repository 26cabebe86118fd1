//! L3 Molecular Layer: Reveal section
//!
//! Ties the pieces together for one page section: the viewport observer
//! decides when it triggers, the section fades in with its variants, and
//! its children follow on the stagger schedule.

use std::time::Duration;

use crate::animator::AnimationState;
use crate::config::{MotionConfig, MotionConfigExt};
use crate::easing::{EasingType, EasingTypeExt};
use crate::stagger::Stagger;
use crate::timing::progress;
use crate::variants::{compute_variants, RevealOptions, StyleDelta, Variants};
use crate::viewport::{Rect, ViewportChange, ViewportObserver, ViewportOptions};

#[derive(Debug, Clone)]
pub struct RevealSection {
    observer: ViewportObserver,
    variants: Variants,
    stagger: Stagger,
    child_count: usize,
    duration: Duration,
    easing: EasingType,
    triggered_at: Option<Duration>,
}

impl RevealSection {
    pub fn new(
        viewport: ViewportOptions,
        reveal: &RevealOptions,
        stagger: Stagger,
        child_count: usize,
        duration: Duration,
        easing: EasingType,
    ) -> Self {
        Self {
            observer: ViewportObserver::new(viewport),
            variants: compute_variants(reveal),
            stagger,
            child_count,
            duration,
            easing,
            triggered_at: None,
        }
    }

    /// Section built from configured durations, stagger and easing
    pub fn from_config(
        config: &MotionConfig,
        viewport: ViewportOptions,
        reveal: &RevealOptions,
        child_count: usize,
    ) -> Self {
        Self::new(
            viewport,
            reveal,
            Stagger::new(config.stagger_policy()),
            child_count,
            config.reveal_duration(),
            config.effective_easing(),
        )
    }

    pub fn variants(&self) -> &Variants {
        &self.variants
    }

    pub fn child_count(&self) -> usize {
        self.child_count
    }

    pub fn triggered_at(&self) -> Option<Duration> {
        self.triggered_at
    }

    pub fn is_in_view(&self) -> bool {
        self.observer.is_in_view()
    }

    /// Feed geometry at timeline time `now`
    ///
    /// Entering the viewport records the trigger time; leaving it (only
    /// possible without `once`) returns the section to hidden.
    pub fn observe(&mut self, element: Option<&Rect>, viewport: &Rect, now: Duration) -> ViewportChange {
        let change = self.observer.observe(element, viewport);
        match change {
            ViewportChange::Entered => self.triggered_at = Some(now),
            ViewportChange::Left => self.triggered_at = None,
            ViewportChange::Unchanged => {}
        }
        change
    }

    fn style_after(&self, delay: Duration, now: Duration) -> StyleDelta {
        match self.triggered_at {
            None => self.variants.hidden,
            Some(trigger) => {
                let t = progress(trigger + delay, now, self.duration);
                self.variants.at(self.easing.apply(t))
            }
        }
    }

    /// The section's own style at `now`
    pub fn style_at(&self, now: Duration) -> StyleDelta {
        self.style_after(Duration::ZERO, now)
    }

    /// Style of child `index` at `now`; out-of-range children stay hidden
    pub fn child_style(&self, index: usize, now: Duration) -> StyleDelta {
        if index >= self.child_count {
            return self.variants.hidden;
        }
        let delay = self.stagger.child_delay(index, self.child_count);
        self.style_after(delay, now)
    }

    /// Visibility, eased progress and opacity of the section itself
    pub fn state(&self, now: Duration) -> AnimationState {
        let progress = match self.triggered_at {
            None => 0.0,
            Some(trigger) => self.easing.apply(progress(trigger, now, self.duration)),
        };
        AnimationState {
            is_visible: self.observer.is_in_view(),
            progress,
            displayed: self.style_at(now).opacity,
        }
    }

    /// True once the section and every child have fully revealed
    pub fn is_complete(&self, now: Duration) -> bool {
        match self.triggered_at {
            None => false,
            Some(trigger) => {
                let total = self
                    .stagger
                    .total_duration(self.child_count, self.duration)
                    .max(self.duration);
                now >= trigger + total
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stagger::StaggerPolicy;
    use crate::variants::Direction;

    const VIEWPORT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1280.0,
        height: 720.0,
    };

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn section(once: bool) -> RevealSection {
        let viewport = ViewportOptions {
            once,
            ..Default::default()
        };
        RevealSection::new(
            viewport,
            &RevealOptions::new(Direction::Up, 40.0),
            Stagger::new(StaggerPolicy::linear(ms(100))),
            3,
            ms(400),
            EasingType::Linear,
        )
    }

    #[test]
    fn test_hidden_until_in_view() {
        let mut section = section(true);
        let below = Rect::new(0.0, 2000.0, 1280.0, 400.0);
        section.observe(Some(&below), &VIEWPORT, ms(0));
        assert_eq!(section.style_at(ms(5000)), section.variants().hidden);
        assert_eq!(section.child_style(0, ms(5000)), section.variants().hidden);
        assert!(!section.is_complete(ms(5000)));
    }

    #[test]
    fn test_children_follow_stagger_after_trigger() {
        let mut section = section(true);
        let visible = Rect::new(0.0, 300.0, 1280.0, 400.0);
        assert_eq!(section.observe(Some(&visible), &VIEWPORT, ms(1000)), ViewportChange::Entered);
        assert_eq!(section.triggered_at(), Some(ms(1000)));

        // Child 2 starts 200ms after the trigger
        assert_eq!(section.child_style(2, ms(1100)).opacity, 0.0);
        assert!((section.child_style(2, ms(1400)).opacity - 0.5).abs() < 1e-9);
        assert!((section.child_style(0, ms(1200)).opacity - 0.5).abs() < 1e-9);
        assert_eq!(section.style_at(ms(1400)), section.variants().visible);

        let state = section.state(ms(1200));
        assert!(state.is_visible);
        assert!((state.progress - 0.5).abs() < 1e-9);
        assert!((state.displayed - 0.5).abs() < 1e-9);

        assert!(!section.is_complete(ms(1599)));
        assert!(section.is_complete(ms(1600)));
        assert_eq!(section.child_style(3, ms(9000)), section.variants().hidden);
    }

    #[test]
    fn test_leaving_resets_without_once() {
        let mut section = section(false);
        let visible = Rect::new(0.0, 300.0, 1280.0, 400.0);
        let above = Rect::new(0.0, -1000.0, 1280.0, 400.0);
        section.observe(Some(&visible), &VIEWPORT, ms(0));
        assert_eq!(section.observe(Some(&above), &VIEWPORT, ms(500)), ViewportChange::Left);
        assert_eq!(section.style_at(ms(600)), section.variants().hidden);

        section.observe(Some(&visible), &VIEWPORT, ms(700));
        assert_eq!(section.triggered_at(), Some(ms(700)));
    }

    #[test]
    fn test_reduced_motion_section_is_instant() {
        let config = MotionConfig {
            reduced_motion: true,
            ..Default::default()
        };
        let mut section = RevealSection::from_config(
            &config,
            ViewportOptions::once(),
            &RevealOptions::default(),
            4,
        );
        section.observe(Some(&Rect::new(0.0, 0.0, 100.0, 100.0)), &VIEWPORT, ms(50));
        assert_eq!(section.child_style(3, ms(50)), section.variants().visible);
        assert!(section.is_complete(ms(50)));
    }
}
