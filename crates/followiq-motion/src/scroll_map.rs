//! L3 Molecular Layer: Scroll-linked values
//!
//! Maps an element's scroll progress through piecewise-linear checkpoints,
//! optionally smoothed by a spring.

use std::time::Duration;

use crate::error::{MotionError, Result};
use crate::spring::{SpringFilter, SpringParams};
use crate::timing::{inverse_lerp, lerp};
use crate::viewport::Rect;

/// Which edges define the start and end of a scroll range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollOffset {
    /// From the element's top meeting the viewport bottom until its bottom
    /// leaves through the viewport top
    #[default]
    StartEnd,
    /// From the element's top reaching the viewport top until its bottom
    /// reaches the viewport bottom (pinned sections)
    StartStart,
}

/// Progress (0..=1) of `element` travelling through `viewport`
pub fn scroll_progress(element: &Rect, viewport: &Rect, offset: ScrollOffset) -> f64 {
    let (travelled, range) = match offset {
        ScrollOffset::StartEnd => (
            viewport.bottom() - element.y,
            viewport.height + element.height,
        ),
        ScrollOffset::StartStart => (viewport.y - element.y, element.height - viewport.height),
    };
    if range <= 0.0 {
        return if travelled > 0.0 { 1.0 } else { 0.0 };
    }
    (travelled / range).clamp(0.0, 1.0)
}

/// Piecewise-linear map from progress checkpoints to output values
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMapper {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl ValueMapper {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Result<Self> {
        if input.len() < 2 {
            return Err(MotionError::Checkpoints(format!(
                "need at least 2 checkpoints, got {}",
                input.len()
            )));
        }
        if input.len() != output.len() {
            return Err(MotionError::Checkpoints(format!(
                "{} inputs but {} outputs",
                input.len(),
                output.len()
            )));
        }
        if input.iter().chain(output.iter()).any(|v| !v.is_finite()) {
            return Err(MotionError::Checkpoints("values must be finite".to_string()));
        }
        if input.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(MotionError::Checkpoints(
                "inputs must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { input, output })
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Output for progress `p`, clamped to the checkpoint range
    pub fn map(&self, p: f64) -> f64 {
        let first = self.input[0];
        let last = self.input[self.input.len() - 1];
        let p = if p.is_nan() { first } else { p.clamp(first, last) };

        // Segment whose upper checkpoint is the first one at or above p
        let upper = self
            .input
            .iter()
            .position(|&x| x >= p)
            .unwrap_or(self.input.len() - 1)
            .max(1);
        let lower = upper - 1;
        let (x0, x1) = (self.input[lower], self.input[upper]);
        if x1 - x0 <= f64::EPSILON {
            return self.output[upper];
        }
        lerp(self.output[lower], self.output[upper], inverse_lerp(x0, x1, p))
    }
}

/// Scroll-driven value with optional spring smoothing
#[derive(Debug, Clone)]
pub struct ScrollLinkedValue {
    mapper: ValueMapper,
    spring: Option<SpringFilter>,
    initial: f64,
    value: f64,
}

impl ScrollLinkedValue {
    /// Starts at the mapper's output for its first checkpoint
    pub fn new(mapper: ValueMapper) -> Self {
        let initial = mapper.map(f64::NEG_INFINITY);
        Self {
            mapper,
            spring: None,
            initial,
            value: initial,
        }
    }

    pub fn with_spring(mut self, params: SpringParams) -> Self {
        self.spring = Some(SpringFilter::new(params, self.value));
        self
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn is_settled(&self) -> bool {
        self.spring.as_ref().map_or(true, SpringFilter::is_settled)
    }

    /// Advance with the latest progress; `None` (no target element) holds
    /// the initial value
    pub fn update(&mut self, progress: Option<f64>, dt: Duration) -> f64 {
        self.value = match progress {
            None => {
                if let Some(spring) = self.spring.as_mut() {
                    spring.jump(self.initial);
                }
                self.initial
            }
            Some(p) => {
                let target = self.mapper.map(p);
                match self.spring.as_mut() {
                    Some(spring) => {
                        spring.set_target(target);
                        spring.step(dt)
                    }
                    None => target,
                }
            }
        };
        self.value
    }
}
