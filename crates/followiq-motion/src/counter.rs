//! L3 Molecular Layer: Number counter
//!
//! Counts a displayed number up (or down) to a target with ease-out cubic,
//! the way stat blocks animate when they scroll into view.

use std::time::Duration;

use crate::animator::{Animator, AnimatorPhase};
use crate::easing::cubic_ease_out;
use crate::timing::{lerp, progress};

/// Active counting run
#[derive(Debug, Clone, Copy)]
struct CountRun {
    start: Duration,
    from: f64,
    to: f64,
}

#[derive(Debug, Clone)]
pub struct CounterAnimator {
    duration: Duration,
    run: Option<CountRun>,
    current: f64,
    phase: AnimatorPhase,
}

impl CounterAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            run: None,
            current: 0.0,
            phase: AnimatorPhase::Idle,
        }
    }

    /// Start from a value other than zero
    pub fn with_initial(mut self, value: f64) -> Self {
        self.current = value;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Last value produced
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.run.map(|run| run.to).unwrap_or(self.current)
    }

    /// Begin counting from the displayed value toward `target`
    pub fn start(&mut self, target: f64, now: Duration) {
        if self.duration.is_zero() || self.current == target {
            self.run = None;
            self.current = target;
            self.phase = AnimatorPhase::Settled;
            return;
        }
        self.run = Some(CountRun {
            start: now,
            from: self.current,
            to: target,
        });
        self.phase = AnimatorPhase::Running;
    }

    /// Change the target mid-run or after settling; restarts from the
    /// displayed value
    pub fn retarget(&mut self, target: f64, now: Duration) {
        if self.phase == AnimatorPhase::Running {
            self.tick(now);
        }
        self.start(target, now);
    }

    /// Back to idle at `value`
    pub fn reset(&mut self, value: f64) {
        self.run = None;
        self.current = value;
        self.phase = AnimatorPhase::Idle;
    }
}

impl Animator for CounterAnimator {
    type Output = f64;

    fn tick(&mut self, now: Duration) -> f64 {
        let Some(run) = self.run else {
            return self.current;
        };

        let t = progress(run.start, now, self.duration);
        if t >= 1.0 {
            self.current = run.to;
            self.run = None;
            self.phase = AnimatorPhase::Settled;
        } else {
            let (lo, hi) = if run.from <= run.to {
                (run.from, run.to)
            } else {
                (run.to, run.from)
            };
            self.current = lerp(run.from, run.to, cubic_ease_out(t)).clamp(lo, hi);
        }
        self.current
    }

    fn phase(&self) -> AnimatorPhase {
        self.phase
    }
}

/// How a counter value is rendered: `"$1,250.50"`, `"10,000+"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFormat {
    pub decimals: usize,
    pub separator: Option<char>,
    pub prefix: String,
    pub suffix: String,
}

impl Default for CounterFormat {
    fn default() -> Self {
        Self {
            decimals: 0,
            separator: Some(','),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl CounterFormat {
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_separator(mut self, separator: Option<char>) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn format(&self, value: f64) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let fixed = format!("{:.*}", self.decimals, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (fixed.as_str(), None),
        };
        // "-0" after rounding is just zero
        let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');

        let mut out = String::with_capacity(fixed.len() + self.prefix.len() + self.suffix.len() + 4);
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        match self.separator {
            Some(sep) => out.push_str(&group_thousands(int_part, sep)),
            None => out.push_str(int_part),
        }
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_counts_to_exact_target_without_overshoot() {
        let mut counter = CounterAnimator::new(Duration::from_secs(2));
        counter.start(1000.0, Duration::ZERO);

        let mut prev = 0.0;
        for frame in 0..=130 {
            let value = counter.tick(ms(frame * 16));
            assert!(value >= prev, "went backwards at frame {}", frame);
            assert!(value <= 1000.0, "overshot to {}", value);
            prev = value;
        }
        assert_eq!(counter.tick(ms(2000)), 1000.0);
        assert_eq!(counter.tick(ms(5000)), 1000.0);
        assert!(counter.is_settled());
    }

    #[test]
    fn test_ease_out_front_loads_progress() {
        let mut counter = CounterAnimator::new(Duration::from_secs(2));
        counter.start(1000.0, Duration::ZERO);
        // 1 - 0.5^3 = 0.875
        assert!((counter.tick(ms(1000)) - 875.0).abs() < 1e-9);
        assert_eq!(counter.phase(), AnimatorPhase::Running);
    }

    #[test]
    fn test_idle_until_started() {
        let mut counter = CounterAnimator::new(ms(500));
        assert_eq!(counter.phase(), AnimatorPhase::Idle);
        assert_eq!(counter.tick(ms(100)), 0.0);
        assert_eq!(counter.phase(), AnimatorPhase::Idle);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut counter = CounterAnimator::new(Duration::ZERO);
        counter.start(42.0, ms(10));
        assert!(counter.is_settled());
        assert_eq!(counter.current(), 42.0);
    }

    #[test]
    fn test_retarget_restarts_from_displayed_value() {
        let mut counter = CounterAnimator::new(ms(1000));
        counter.start(100.0, Duration::ZERO);
        let shown = counter.tick(ms(500));

        counter.retarget(50.0, ms(500));
        assert_eq!(counter.phase(), AnimatorPhase::Running);
        assert_eq!(counter.tick(ms(500)), shown);

        let mut prev = shown;
        for t in (500..=1500).step_by(50) {
            let value = counter.tick(ms(t));
            assert!(value <= prev && value >= 50.0);
            prev = value;
        }
        assert_eq!(prev, 50.0);

        counter.retarget(80.0, ms(2000));
        assert_eq!(counter.tick(ms(3000)), 80.0);
    }

    #[test]
    fn test_format() {
        let plus = CounterFormat::default().with_suffix("+");
        assert_eq!(plus.format(10_000.0), "10,000+");
        assert_eq!(plus.format(999.4), "999+");

        let money = CounterFormat::default().with_prefix("$").with_decimals(2);
        assert_eq!(money.format(1_250.5), "$1,250.50");
        assert_eq!(money.format(-1_234_567.0), "-$1,234,567.00");

        let plain = CounterFormat::default().with_separator(None).with_suffix("%");
        assert_eq!(plain.format(98765.0), "98765%");
        assert_eq!(CounterFormat::default().format(-0.2), "0");
    }
}
