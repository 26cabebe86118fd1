//! L3 Molecular Layer: Common animator interface
//!
//! Every time-driven animation exposes the same three calls so the frame
//! driver can step it without knowing what it animates.

use std::time::Duration;

use serde::Serialize;

/// Lifecycle of a single animation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimatorPhase {
    /// Nothing started yet
    #[default]
    Idle,
    Running,
    /// Holding the final value
    Settled,
}

impl AnimatorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Settled => "settled",
        }
    }
}

/// Snapshot of one animated element at a point on the timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnimationState {
    pub is_visible: bool,
    /// Eased progress, 0..=1
    pub progress: f64,
    /// Value currently shown (opacity, counter value, ...)
    pub displayed: f64,
}

/// A value that evolves over timeline time
pub trait Animator: Send {
    /// Value produced for each frame
    type Output: Clone + Send + Sync + 'static;

    /// Evaluate the animation at `now` (time since the timeline origin)
    fn tick(&mut self, now: Duration) -> Self::Output;

    fn phase(&self) -> AnimatorPhase;

    fn is_settled(&self) -> bool {
        self.phase() == AnimatorPhase::Settled
    }
}
