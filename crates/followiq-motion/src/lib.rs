//! Scroll-reveal and animation primitives for the Follow IQ site
//!
//! Every animation here is evaluated against a timeline timestamp, so a
//! frame is a pure function of its inputs and the same timestamps always
//! give the same output. Only [`driver`] touches a runtime clock.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Easing curves and cubic-bezier solver
//! - `spring` - Spring presets and damped-spring filter
//! - `timing` - Progress and interpolation helpers
//! - `config` - Motion settings (re-exported from followiq-core)
//!
//! ## L3 Molecular Layer
//! - `viewport` - In-view detection with margins and thresholds
//! - `variants` - Hidden/visible style pairs for reveals
//! - `stagger` - Per-child delay schedules
//! - `scroll_map` - Scroll progress mapped through checkpoints
//! - `counter`, `typewriter`, `transition` - Time-driven animators
//! - `section` - Viewport + variants + stagger for one page section
//! - `driver` - Interval-driven frame loop with cancellation handles
//!
//! # Usage
//!
//! ```ignore
//! use followiq_motion::{Animator, CounterAnimator, CounterFormat};
//!
//! let mut counter = CounterAnimator::new(Duration::from_secs(2));
//! counter.start(10_000.0, Duration::ZERO);
//!
//! let value = counter.tick(Duration::from_millis(500));
//! println!("{}", CounterFormat::default().with_suffix("+").format(value));
//! ```

// L4 Atomic Layer
pub mod config;
pub mod easing;
pub mod error;
pub mod spring;
pub mod timing;

// L3 Molecular Layer
pub mod animator;
pub mod counter;
pub mod driver;
pub mod scroll_map;
pub mod section;
pub mod stagger;
pub mod transition;
pub mod typewriter;
pub mod variants;
pub mod viewport;

pub use animator::{AnimationState, Animator, AnimatorPhase};
pub use config::{MotionConfig, MotionConfigExt};
pub use counter::{CounterAnimator, CounterFormat};
pub use driver::{AnimationHandle, AnimationSlot, Frame, FrameDriver};
pub use easing::{parse_easing, CubicBezier, EasingChoice, EasingType, EasingTypeExt};
pub use error::{MotionError, Result};
pub use scroll_map::{scroll_progress, ScrollLinkedValue, ScrollOffset, ValueMapper};
pub use section::RevealSection;
pub use spring::{SpringFilter, SpringParams};
pub use stagger::{Stagger, StaggerFrom, StaggerPolicy};
pub use transition::RevealTransition;
pub use typewriter::TypewriterAnimator;
pub use variants::{compute_variants, ClipInset, ClipReveal, Direction, RevealOptions, StyleDelta, Variants};
pub use viewport::{Amount, Margin, MarginValue, Rect, ViewportChange, ViewportObserver, ViewportOptions};
