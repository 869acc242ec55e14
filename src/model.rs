//! Annotation data model.
//!
//! Player rectangles and ground-truth rectangles share their geometry through
//! the [`Region`] trait but are distinct types: only [`UserAnnotation`] can be
//! edited or hit-tested.

use crate::geometry::{Bounds, DisplayPoint, DisplayScale, ScoringPoint};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Identifiers and kinds ──────────────────────────────────────────────────

/// Opaque identifier, stable for an annotation's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape of an annotation. Rectangles are the only supported shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
}

// ── Colors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LabelColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

const LABEL_COLORS: &[(&str, LabelColor)] = &[
    ("Whale", LabelColor::rgb(66, 135, 245)),
    ("Dolphin", LabelColor::rgb(0, 188, 212)),
    ("Shark", LabelColor::rgb(244, 67, 54)),
    ("Turtle", LabelColor::rgb(76, 175, 80)),
    ("Fish", LabelColor::rgb(255, 193, 7)),
    ("Jellyfish", LabelColor::rgb(233, 30, 99)),
    ("Coral", LabelColor::rgb(255, 112, 67)),
    ("Seal", LabelColor::rgb(121, 85, 72)),
    ("Diver", LabelColor::rgb(156, 39, 176)),
    ("Boat", LabelColor::rgb(96, 125, 139)),
    ("Ray", LabelColor::rgb(63, 81, 181)),
    ("Octopus", LabelColor::rgb(255, 87, 34)),
];

/// Color used to draw annotations carrying `label`.
///
/// Known marine labels have fixed colors; anything else gets a stable hue
/// derived from the label text.
pub fn label_color(label: &str) -> LabelColor {
    if let Some((_, color)) = LABEL_COLORS.iter().find(|(name, _)| *name == label) {
        return *color;
    }
    let mut seed = 0u32;
    for b in label.bytes() {
        seed = seed.wrapping_mul(31).wrapping_add(u32::from(b));
    }
    // Golden angle spreads consecutive seeds around the wheel
    let hue = (seed % 360) as f32 * 137.5 % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    LabelColor::rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// h in degrees, s and v in 0-1.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

// ── Shared geometry ────────────────────────────────────────────────────────

/// Read-only geometry shared by player and ground-truth rectangles.
pub trait Region {
    fn kind(&self) -> ShapeKind;
    fn label(&self) -> &str;
    /// Corners in scoring space, in storage order.
    fn corners(&self) -> &[ScoringPoint];

    /// Normalised scoring-space bounds, `None` when fewer than two corners.
    fn bounds(&self) -> Option<Bounds> {
        Bounds::from_scoring(self.corners())
    }
}

// ── Player annotations ─────────────────────────────────────────────────────

/// A rectangle drawn by the player.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAnnotation {
    pub id: AnnotationId,
    pub label: String,
    /// Canonical corners, scoring space.
    pub coordinates: Vec<ScoringPoint>,
    /// Projection of `coordinates` at the current display scale.
    pub display_coordinates: Vec<DisplayPoint>,
    pub is_complete: bool,
}

impl UserAnnotation {
    /// Start an in-progress rectangle anchored at a single corner.
    pub fn anchored(
        id: AnnotationId,
        label: impl Into<String>,
        anchor: DisplayPoint,
        scale: DisplayScale,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            coordinates: vec![scale.to_scoring(anchor)],
            display_coordinates: vec![anchor],
            is_complete: false,
        }
    }

    /// A finished rectangle built from scoring-space corners.
    pub fn complete(
        id: AnnotationId,
        label: impl Into<String>,
        a: ScoringPoint,
        b: ScoringPoint,
        scale: DisplayScale,
    ) -> Self {
        let mut ann = Self {
            id,
            label: label.into(),
            coordinates: vec![a, b],
            display_coordinates: Vec::new(),
            is_complete: true,
        };
        ann.reproject(scale);
        ann
    }

    pub fn color(&self) -> LabelColor {
        label_color(&self.label)
    }

    /// Normalised display-space bounds, `None` when fewer than two corners.
    pub fn display_bounds(&self) -> Option<Bounds> {
        Bounds::from_display(&self.display_coordinates)
    }

    /// Recompute the display cache from the canonical corners.
    pub fn reproject(&mut self, scale: DisplayScale) {
        let display = self.coordinates.iter().map(|p| scale.to_display(*p));
        self.display_coordinates = display.collect();
    }

    /// Replace the corners from display space, keeping the given display
    /// values verbatim in the cache.
    pub fn set_display_corners(&mut self, corners: Vec<DisplayPoint>, scale: DisplayScale) {
        self.coordinates = corners.iter().map(|p| scale.to_scoring(*p)).collect();
        self.display_coordinates = corners;
    }

    /// Reorder the corners to top-left / bottom-right. Returns true if the
    /// corners moved.
    pub fn normalize(&mut self, scale: DisplayScale) -> bool {
        let Some(b) = self.bounds() else {
            return false;
        };
        let ordered = vec![
            ScoringPoint::new(b.left, b.top),
            ScoringPoint::new(b.right, b.bottom),
        ];
        if self.coordinates[..2] == ordered[..] {
            return false;
        }
        self.coordinates = ordered;
        self.reproject(scale);
        true
    }

    /// Complete rectangles with two corners are the only ones that can be
    /// picked, moved, resized or deleted.
    pub fn is_hit_testable(&self) -> bool {
        self.is_complete && self.coordinates.len() == 2 && self.display_coordinates.len() == 2
    }
}

impl Region for UserAnnotation {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn corners(&self) -> &[ScoringPoint] {
        &self.coordinates
    }
}

// ── Ground truth ───────────────────────────────────────────────────────────

/// A pre-authored rectangle the player is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthAnnotation {
    pub id: AnnotationId,
    #[serde(rename = "type", default)]
    pub kind: ShapeKind,
    pub coordinates: Vec<ScoringPoint>,
    pub label: String,
}

impl GroundTruthAnnotation {
    pub fn rectangle(id: u64, label: impl Into<String>, a: ScoringPoint, b: ScoringPoint) -> Self {
        Self {
            id: AnnotationId(id),
            kind: ShapeKind::Rectangle,
            coordinates: vec![a, b],
            label: label.into(),
        }
    }
}

impl Region for GroundTruthAnnotation {
    fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn corners(&self) -> &[ScoringPoint] {
        &self.coordinates
    }
}

// ── Tagged union ───────────────────────────────────────────────────────────

/// Either kind of annotation, for code that handles both (drawing order,
/// overlays).
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    User(UserAnnotation),
    GroundTruth(GroundTruthAnnotation),
}

impl Annotation {
    pub fn is_hit_testable(&self) -> bool {
        match self {
            Annotation::User(ann) => ann.is_hit_testable(),
            Annotation::GroundTruth(_) => false,
        }
    }

    pub fn as_user(&self) -> Option<&UserAnnotation> {
        match self {
            Annotation::User(ann) => Some(ann),
            Annotation::GroundTruth(_) => None,
        }
    }
}

impl Region for Annotation {
    fn kind(&self) -> ShapeKind {
        match self {
            Annotation::User(ann) => ann.kind(),
            Annotation::GroundTruth(ann) => ann.kind(),
        }
    }

    fn label(&self) -> &str {
        match self {
            Annotation::User(ann) => ann.label(),
            Annotation::GroundTruth(ann) => ann.label(),
        }
    }

    fn corners(&self) -> &[ScoringPoint] {
        match self {
            Annotation::User(ann) => ann.corners(),
            Annotation::GroundTruth(ann) => ann.corners(),
        }
    }
}
