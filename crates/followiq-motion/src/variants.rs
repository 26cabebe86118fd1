//! L3 Molecular Layer: Reveal variant builder
//!
//! Turns declarative reveal options into the two style states an element
//! animates between: `hidden` before it scrolls into view and `visible`
//! after.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MotionError;
use crate::timing::lerp;

/// Direction the element travels while revealing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Rises into place (starts below)
    #[default]
    Up,
    /// Drops into place (starts above)
    Down,
    /// Slides in leftward (starts to the right)
    Left,
    /// Slides in rightward (starts to the left)
    Right,
    /// Fades in place
    None,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::None,
    ];

    /// Starting (x, y) offset for a travel distance
    pub fn offset(&self, distance: f64) -> (f64, f64) {
        match self {
            Self::Up => (0.0, distance),
            Self::Down => (0.0, -distance),
            Self::Left => (distance, 0.0),
            Self::Right => (-distance, 0.0),
            Self::None => (0.0, 0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }
}

impl FromStr for Direction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "none" => Ok(Self::None),
            _ => Err(MotionError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clip-path wipe used instead of (or with) translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipReveal {
    /// Uncovers from the bottom edge upward
    Up,
    /// Uncovers from the top edge downward
    Down,
    Left,
    Right,
    /// Opens from the middle outward
    Center,
}

impl FromStr for ClipReveal {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            _ => Err(MotionError::UnknownDirection(s.to_string())),
        }
    }
}

/// `inset()` clip rectangle in percent of the element box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClipInset {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ClipInset {
    pub const OPEN: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    fn hidden(reveal: ClipReveal) -> Self {
        match reveal {
            ClipReveal::Up => Self { top: 100.0, ..Self::OPEN },
            ClipReveal::Down => Self { bottom: 100.0, ..Self::OPEN },
            ClipReveal::Left => Self { left: 100.0, ..Self::OPEN },
            ClipReveal::Right => Self { right: 100.0, ..Self::OPEN },
            ClipReveal::Center => Self {
                top: 50.0,
                right: 50.0,
                bottom: 50.0,
                left: 50.0,
            },
        }
    }

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            top: lerp(a.top, b.top, t),
            right: lerp(a.right, b.right, t),
            bottom: lerp(a.bottom, b.bottom, t),
            left: lerp(a.left, b.left, t),
        }
    }
}

impl fmt::Display for ClipInset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inset({}% {}% {}% {}%)",
            round2(self.top),
            round2(self.right),
            round2(self.bottom),
            round2(self.left)
        )
    }
}

/// Declarative reveal options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    pub direction: Direction,
    /// Travel distance in pixels
    pub distance: f64,
    /// Blur radius in pixels while hidden
    pub blur: Option<f64>,
    /// Scale factor while hidden (e.g. 0.95)
    pub scale: Option<f64>,
    /// Rotation in degrees while hidden
    pub rotate: Option<f64>,
    pub clip: Option<ClipReveal>,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Up,
            distance: 40.0,
            blur: None,
            scale: None,
            rotate: None,
            clip: None,
        }
    }
}

impl RevealOptions {
    pub fn new(direction: Direction, distance: f64) -> Self {
        Self {
            direction,
            distance,
            ..Default::default()
        }
    }

    pub fn with_blur(mut self, radius: f64) -> Self {
        self.blur = Some(radius);
        self
    }

    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Some(factor);
        self
    }

    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_clip(mut self, clip: ClipReveal) -> Self {
        self.clip = Some(clip);
        self
    }
}

/// Animatable style properties of one element
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleDelta {
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub blur: f64,
    pub scale: f64,
    pub rotate: f64,
    pub clip: Option<ClipInset>,
}

impl Default for StyleDelta {
    /// Fully visible, untransformed
    fn default() -> Self {
        Self {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            blur: 0.0,
            scale: 1.0,
            rotate: 0.0,
            clip: None,
        }
    }
}

impl StyleDelta {
    /// Blend two states; `t` outside [0, 1] is clamped
    pub fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let clip = match (from.clip, to.clip) {
            (None, None) => None,
            (a, b) => Some(ClipInset::interpolate(
                &a.unwrap_or(ClipInset::OPEN),
                &b.unwrap_or(ClipInset::OPEN),
                t,
            )),
        };
        Self {
            opacity: lerp(from.opacity, to.opacity, t),
            x: lerp(from.x, to.x, t),
            y: lerp(from.y, to.y, t),
            blur: lerp(from.blur, to.blur, t),
            scale: lerp(from.scale, to.scale, t),
            rotate: lerp(from.rotate, to.rotate, t),
            clip,
        }
    }

    /// Inline CSS for this state
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "opacity: {}; transform: translate({}px, {}px) scale({}) rotate({}deg)",
            round2(self.opacity),
            round2(self.x),
            round2(self.y),
            round2(self.scale),
            round2(self.rotate)
        );
        if self.blur > 0.0 {
            css.push_str(&format!("; filter: blur({}px)", round2(self.blur)));
        }
        if let Some(clip) = self.clip {
            css.push_str(&format!("; clip-path: {}", clip));
        }
        css
    }
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid printing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// The two endpoint states of a reveal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variants {
    pub hidden: StyleDelta,
    pub visible: StyleDelta,
}

impl Variants {
    /// State at eased progress `t` between hidden (0) and visible (1)
    pub fn at(&self, t: f64) -> StyleDelta {
        StyleDelta::interpolate(&self.hidden, &self.visible, t)
    }
}

/// Hidden and visible states for `options`
pub fn compute_variants(options: &RevealOptions) -> Variants {
    let (x, y) = options.direction.offset(options.distance);
    let hidden = StyleDelta {
        opacity: 0.0,
        x,
        y,
        blur: options.blur.unwrap_or(0.0).max(0.0),
        scale: options.scale.unwrap_or(1.0),
        rotate: options.rotate.unwrap_or(0.0),
        clip: options.clip.map(ClipInset::hidden),
    };
    let visible = StyleDelta {
        clip: options.clip.map(|_| ClipInset::OPEN),
        ..StyleDelta::default()
    };
    Variants { hidden, visible }
}
