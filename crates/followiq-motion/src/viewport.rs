//! L3 Molecular Layer: Viewport observer
//!
//! Intersection-based "is this element visible" signal. The host feeds the
//! element's bounding box (or `None` when the node is not mounted) and the
//! viewport box each frame or scroll event; the observer keeps the in-view
//! flag and reports transitions.

use std::str::FromStr;

use crate::error::MotionError;

/// Axis-aligned box in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlapping box, if the two touch or overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// One side of a root margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    /// Percent of the viewport's width (left/right) or height (top/bottom)
    Percent(f64),
}

impl MarginValue {
    fn resolve(&self, extent: f64) -> f64 {
        match *self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(px) = s.strip_suffix("px") {
            return px.trim().parse().map(Self::Px).map_err(|_| ());
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct.trim().parse().map(Self::Percent).map_err(|_| ());
        }
        match s.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(Self::Px(0.0)),
            _ => Err(()),
        }
    }
}

/// CSS-style root margin: positive grows the viewport, negative shrinks it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(MarginValue::Px(0.0))
    }
}

impl Margin {
    pub fn uniform(value: MarginValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Viewport after applying the margin
    pub fn apply(&self, viewport: &Rect) -> Rect {
        let top = self.top.resolve(viewport.height);
        let right = self.right.resolve(viewport.width);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        Rect::new(
            viewport.x - left,
            viewport.y - top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

impl FromStr for Margin {
    type Err = MotionError;

    /// Accepts the 1-4 value shorthand: `"-100px"`, `"0px 0px -20% 0px"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotionError::InvalidMargin(s.to_string());
        let values = s
            .split_whitespace()
            .map(|part| part.parse::<MarginValue>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

/// How much of the element must be inside the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Amount {
    /// Any intersecting pixel
    #[default]
    Some,
    /// The whole element
    All,
    /// Fraction of the element's area, 0..=1
    Fraction(f64),
}

impl Amount {
    fn is_met(&self, ratio: f64, intersecting: bool) -> bool {
        match *self {
            Self::Some => intersecting,
            Self::All => intersecting && ratio >= 1.0 - 1e-9,
            Self::Fraction(f) => {
                let f = f.clamp(0.0, 1.0);
                if f == 0.0 {
                    intersecting
                } else {
                    intersecting && ratio >= f
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportOptions {
    /// Latch `true` after the first entry
    pub once: bool,
    pub margin: Margin,
    pub amount: Amount,
}

impl ViewportOptions {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Default::default()
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = amount;
        self
    }
}

/// What an observation did to the in-view flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    Entered,
    Left,
    Unchanged,
}

/// Tracks whether one element is in view
#[derive(Debug, Clone, Default)]
pub struct ViewportObserver {
    options: ViewportOptions,
    in_view: bool,
    latched: bool,
    ratio: f64,
}

impl ViewportObserver {
    pub fn new(options: ViewportOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    #[inline]
    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    /// Visible fraction of the element at the last observation
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Visible fraction of `element` inside the margin-adjusted viewport
    pub fn intersection_ratio(&self, element: &Rect, viewport: &Rect) -> (f64, bool) {
        let root = self.options.margin.apply(viewport);
        match element.intersection(&root) {
            None => (0.0, false),
            Some(overlap) => {
                let area = element.area();
                if area <= 0.0 {
                    (1.0, true)
                } else {
                    ((overlap.area() / area).clamp(0.0, 1.0), true)
                }
            }
        }
    }

    /// Feed the latest geometry; `None` means the element is not mounted
    pub fn observe(&mut self, element: Option<&Rect>, viewport: &Rect) -> ViewportChange {
        if self.latched {
            return ViewportChange::Unchanged;
        }

        let (ratio, intersecting) = match element {
            Some(rect) => self.intersection_ratio(rect, viewport),
            None => (0.0, false),
        };
        self.ratio = ratio;

        // The amount gates entry only; once in view, any overlap keeps it there
        let now_in_view = if self.in_view {
            intersecting
        } else {
            self.options.amount.is_met(ratio, intersecting)
        };
        let change = match (self.in_view, now_in_view) {
            (false, true) => ViewportChange::Entered,
            (true, false) => ViewportChange::Left,
            _ => ViewportChange::Unchanged,
        };
        self.in_view = now_in_view;

        if now_in_view && self.options.once {
            self.latched = true;
        }
        if change != ViewportChange::Unchanged {
            tracing::trace!(?change, ratio, "Viewport visibility changed");
        }
        change
    }
}
