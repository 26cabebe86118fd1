//! L3 Molecular Layer: Typewriter text
//!
//! Reveals a string one character per tick. Characters are Unicode scalar
//! values, so multi-byte text is never cut mid-character.

use std::time::Duration;

use crate::animator::{Animator, AnimatorPhase};

#[derive(Debug, Clone)]
pub struct TypewriterAnimator {
    text: String,
    total_chars: usize,
    shown: usize,
    tick_interval: Duration,
    start: Duration,
    phase: AnimatorPhase,
}

impl TypewriterAnimator {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            text: String::new(),
            total_chars: 0,
            shown: 0,
            tick_interval,
            start: Duration::ZERO,
            phase: AnimatorPhase::Idle,
        }
    }

    /// Replace the text and start typing it from zero characters at `now`
    pub fn set_text(&mut self, text: impl Into<String>, now: Duration) {
        self.text = text.into();
        self.total_chars = self.text.chars().count();
        self.shown = 0;
        self.start = now;
        self.phase = if self.total_chars == 0 || self.tick_interval.is_zero() {
            self.shown = self.total_chars;
            AnimatorPhase::Settled
        } else {
            AnimatorPhase::Running
        };
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters currently shown
    pub fn shown_chars(&self) -> usize {
        self.shown
    }

    /// Currently shown prefix of the text
    pub fn visible(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.shown)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        &self.text[..end]
    }
}

impl Animator for TypewriterAnimator {
    type Output = String;

    fn tick(&mut self, now: Duration) -> String {
        if self.phase == AnimatorPhase::Running {
            let elapsed = now.saturating_sub(self.start);
            let ticks = (elapsed.as_nanos() / self.tick_interval.as_nanos()) as usize;
            // Never un-type characters if time runs backwards
            self.shown = ticks.min(self.total_chars).max(self.shown);
            if self.shown == self.total_chars {
                self.phase = AnimatorPhase::Settled;
            }
        }
        self.visible().to_string()
    }

    fn phase(&self) -> AnimatorPhase {
        self.phase
    }
}
