//! L3 Molecular Layer: Frame driver
//!
//! Steps an [`Animator`] on a fixed tokio interval and publishes each frame
//! through a `watch` channel. Every run is owned by an [`AnimationHandle`];
//! dropping the handle tears the run down so no timer outlives its view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::animator::{Animator, AnimatorPhase};
use crate::config::{MotionConfig, MotionConfigExt};

/// One evaluated frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame<T> {
    /// Sequence number, starting at 0
    pub index: u64,
    /// Timeline time the frame was evaluated at
    pub at: Duration,
    pub value: T,
    pub phase: AnimatorPhase,
}

/// Runs animators at a fixed frame rate
#[derive(Debug, Clone, Copy)]
pub struct FrameDriver {
    frame_interval: Duration,
}

impl FrameDriver {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        Self::new(config.frame_duration())
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Start stepping `animator` on the current tokio runtime
    ///
    /// The animator's timeline origin is the moment of the call, so runs
    /// should be started at `Duration::ZERO` before spawning. The task ends
    /// after the first settled frame.
    pub fn spawn<A>(&self, mut animator: A) -> AnimationHandle<A::Output>
    where
        A: Animator + 'static,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let done = Arc::new(AtomicBool::new(false));
        let task_done = Arc::clone(&done);
        let frame_interval = self.frame_interval;

        let task = tokio::spawn(async move {
            let origin = Instant::now();
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!("Frame driver started ({:?} per frame)", frame_interval);

            let mut index = 0u64;
            loop {
                tokio::select! {
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            debug!("Frame driver cancelled after {} frames", index);
                            break;
                        }
                    }

                    _ = interval.tick() => {
                        let at = origin.elapsed();
                        let value = animator.tick(at);
                        let phase = animator.phase();
                        trace!(index, ?phase, "Frame");
                        frame_tx.send_replace(Some(Frame { index, at, value, phase }));
                        index += 1;

                        if phase == AnimatorPhase::Settled {
                            debug!("Animation settled after {} frames", index);
                            break;
                        }
                    }
                }
            }

            task_done.store(true, Ordering::Release);
            drop(frame_tx);
        });

        AnimationHandle {
            frames: frame_rx,
            shutdown: shutdown_tx,
            done,
            task,
        }
    }
}

/// Owner of one running animation
///
/// Cancels the run when dropped.
#[derive(Debug)]
pub struct AnimationHandle<T> {
    frames: watch::Receiver<Option<Frame<T>>>,
    shutdown: watch::Sender<bool>,
    done: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl<T: Clone> AnimationHandle<T> {
    /// Stop producing frames
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }

    /// True once the run settled or was cancelled
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire) || self.task.is_finished()
    }

    /// Most recent frame, if any was produced yet
    pub fn latest(&self) -> Option<Frame<T>> {
        self.frames.borrow().clone()
    }

    /// Independent receiver of frame updates
    pub fn subscribe(&self) -> watch::Receiver<Option<Frame<T>>> {
        self.frames.clone()
    }

    /// Wait for the next frame; `None` once the run has ended
    pub async fn next_frame(&mut self) -> Option<Frame<T>> {
        self.frames.changed().await.ok()?;
        self.frames.borrow_and_update().clone()
    }

    /// Wait until the run ends and return its last frame
    pub async fn wait(&mut self) -> Option<Frame<T>> {
        while self.frames.changed().await.is_ok() {}
        self.frames.borrow().clone()
    }
}

impl<T> Drop for AnimationHandle<T> {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }
}

/// Holds at most one active run; starting another cancels the previous one
#[derive(Debug)]
pub struct AnimationSlot<T> {
    driver: FrameDriver,
    current: Option<AnimationHandle<T>>,
}

impl<T: Clone + Send + Sync + 'static> AnimationSlot<T> {
    pub fn new(driver: FrameDriver) -> Self {
        Self {
            driver,
            current: None,
        }
    }

    /// Replace whatever is running with `animator`
    pub fn start<A>(&mut self, animator: A) -> &mut AnimationHandle<T>
    where
        A: Animator<Output = T> + 'static,
    {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        self.current.insert(self.driver.spawn(animator))
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn handle(&mut self) -> Option<&mut AnimationHandle<T>> {
        self.current.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterAnimator;
    use crate::typewriter::TypewriterAnimator;

    const FRAME: Duration = Duration::from_millis(16);

    #[tokio::test(start_paused = true)]
    async fn test_counter_runs_to_completion() {
        let mut counter = CounterAnimator::new(Duration::from_millis(200));
        counter.start(1000.0, Duration::ZERO);

        let mut handle = FrameDriver::new(FRAME).spawn(counter);
        let last = handle.wait().await.unwrap();
        assert_eq!(last.value, 1000.0);
        assert_eq!(last.phase, AnimatorPhase::Settled);
        assert!(last.at >= Duration::from_millis(200));
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_are_monotonic() {
        let mut counter = CounterAnimator::new(Duration::from_millis(100));
        counter.start(50.0, Duration::ZERO);

        let mut handle = FrameDriver::new(FRAME).spawn(counter);
        let mut prev: Option<Frame<f64>> = None;
        while let Some(frame) = handle.next_frame().await {
            if let Some(prev) = &prev {
                assert!(frame.index > prev.index);
                assert!(frame.value >= prev.value);
            }
            prev = Some(frame);
        }
        assert_eq!(prev.unwrap().value, 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_frames() {
        let mut typer = TypewriterAnimator::new(Duration::from_millis(30));
        typer.set_text("a".repeat(1000), Duration::ZERO);

        let handle = FrameDriver::new(FRAME).spawn(typer);
        let mut rx = handle.subscribe();
        for _ in 0..3 {
            rx.changed().await.unwrap();
        }
        drop(handle);

        // The sender goes away with the aborted task
        while rx.changed().await.is_ok() {}
        let frozen = rx.borrow().as_ref().map(|f| f.index);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(rx.borrow().as_ref().map(|f| f.index), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_keeps_one_active_run() {
        let mut slot = AnimationSlot::new(FrameDriver::new(FRAME));

        let mut slow = CounterAnimator::new(Duration::from_secs(60));
        slow.start(1.0, Duration::ZERO);
        let mut first = slot.start(slow).subscribe();
        first.changed().await.unwrap();
        assert!(slot.is_active());

        let mut fast = CounterAnimator::new(Duration::from_millis(50));
        fast.start(7.0, Duration::ZERO);
        slot.start(fast);

        while first.changed().await.is_ok() {}
        let first_value = first.borrow().as_ref().map(|f| f.value).unwrap_or(0.0);
        assert!(first_value < 1.0);

        let last = slot.handle().unwrap().wait().await.unwrap();
        assert_eq!(last.value, 7.0);
        assert!(!slot.is_active());

        slot.cancel();
        assert!(slot.handle().is_none());
    }
}
