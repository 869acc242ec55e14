//! Coordinate spaces and rectangle geometry.
//!
//! Two coordinate spaces exist side by side:
//! - *scoring space*: pixels of the original, unscaled image. Ground truth is
//!   authored here and all scores are computed here.
//! - *display space*: pixels of the canvas as currently rendered, relative to
//!   the canvas' top-left corner. Changes whenever the window is resized.
//!
//! The two point types are distinct; the only way from one to the
//! other is through a [`DisplayScale`].

use serde::{Deserialize, Serialize};

/// A point in original-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringPoint {
    pub x: f32,
    pub y: f32,
}

impl ScoringPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another display point.
    pub fn distance_to(&self, other: DisplayPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height of an image or container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Linear scale from scoring space to display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub x: f32,
    pub y: f32,
}

impl DisplayScale {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Scale that fits `image` inside `container` while preserving aspect ratio.
    ///
    /// Falls back to the identity scale when either size has not been
    /// measured yet.
    pub fn fit(container: ImageSize, image: ImageSize) -> Self {
        if !container.is_measurable() || !image.is_measurable() {
            return Self::identity();
        }
        let s = (container.width / image.width).min(container.height / image.height);
        Self::new(s, s)
    }

    /// Size of `image` once rendered at this scale.
    pub fn apply_to_size(&self, image: ImageSize) -> ImageSize {
        ImageSize::new(image.width * axis(self.x), image.height * axis(self.y))
    }

    pub fn to_display(&self, p: ScoringPoint) -> DisplayPoint {
        DisplayPoint::new(p.x * axis(self.x), p.y * axis(self.y))
    }

    pub fn to_scoring(&self, p: DisplayPoint) -> ScoringPoint {
        ScoringPoint::new(p.x / axis(self.x), p.y / axis(self.y))
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::identity()
    }
}

/// Unusable factors pass coordinates through unchanged.
fn axis(factor: f32) -> f32 {
    if factor.is_finite() && factor > 0.0 {
        factor
    } else {
        1.0
    }
}

/// An axis-aligned rectangle normalised to left <= right, top <= bottom.
///
/// Bounds carry no coordinate space of their own; they are built from either
/// scoring or display corners and only ever compared within one space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    /// Normalise two arbitrary corners.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            left: x0.min(x1),
            right: x0.max(x1),
            top: y0.min(y1),
            bottom: y0.max(y1),
        }
    }

    /// Bounds of the first two scoring corners, if there are two.
    pub fn from_scoring(corners: &[ScoringPoint]) -> Option<Self> {
        match corners {
            [a, b, ..] => Some(Self::from_corners(a.x, a.y, b.x, b.y)),
            _ => None,
        }
    }

    /// Bounds of the first two display corners, if there are two.
    pub fn from_display(corners: &[DisplayPoint]) -> Option<Self> {
        match corners {
            [a, b, ..] => Some(Self::from_corners(a.x, a.y, b.x, b.y)),
            _ => None,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        let x = (self.left + self.right) / 2.0;
        let y = (self.top + self.bottom) / 2.0;
        (x, y)
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn center_distance(&self, other: &Bounds) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    pub fn intersection_area(&self, other: &Bounds) -> f32 {
        let w = self.right.min(other.right) - self.left.max(other.left);
        let h = self.bottom.min(other.bottom) - self.top.max(other.top);
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }
        w * h
    }

    /// Intersection over union. Zero when the union is empty.
    pub fn iou(&self, other: &Bounds) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Edge-to-edge gap on each axis; zero on an axis where the boxes overlap.
    pub fn axis_gaps(&self, other: &Bounds) -> (f32, f32) {
        let gap_x = (self.left.max(other.left) - self.right.min(other.right)).max(0.0);
        let gap_y = (self.top.max(other.top) - self.bottom.min(other.bottom)).max(0.0);
        (gap_x, gap_y)
    }
}
