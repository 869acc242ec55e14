//! Scoring of player rectangles against ground truth.
//!
//! Overlapping boxes score a boosted IoU with a floor, and near misses earn a
//! little partial credit. Every function here is total: malformed input
//! scores 0.

use crate::geometry::Bounds;
use crate::model::{GroundTruthAnnotation, Region, UserAnnotation};
use std::collections::BTreeMap;

/// Centers further apart than this (scoring pixels) never score.
pub const CENTER_DISTANCE_CUTOFF: f32 = 300.0;
/// Multiplier applied to a nonzero IoU.
pub const OVERLAP_BOOST: f32 = 1.3;
/// Minimum score for any true overlap.
pub const OVERLAP_FLOOR: f32 = 0.2;
/// Fraction of the mean box side under which disjoint edges count as close.
pub const NEAR_EDGE_FACTOR: f32 = 0.2;
pub const NEAR_EDGE_SCORE: f32 = 0.1;
/// Awarded to disjoint boxes whose centers are within half the cutoff.
pub const CLOSE_CENTER_SCORE: f32 = 0.3;
/// A target counts as found only when its best score is strictly above this.
pub const FOUND_THRESHOLD: u32 = 1;

/// Similarity in `[0, 1]` between two regions.
///
/// Symmetric in its arguments. Regions with fewer than two corners score 0.
pub fn rect_overlap_score(a: &impl Region, b: &impl Region) -> f32 {
    match (a.bounds(), b.bounds()) {
        (Some(a), Some(b)) => overlap_score(&a, &b),
        _ => 0.0,
    }
}

/// Similarity in `[0, 1]` between two normalised boxes.
pub fn overlap_score(a: &Bounds, b: &Bounds) -> f32 {
    let distance = a.center_distance(b);
    if !distance.is_finite() || distance > CENTER_DISTANCE_CUTOFF {
        return 0.0;
    }

    let iou = a.iou(b);
    let score = if iou > 0.0 {
        (iou * OVERLAP_BOOST).max(OVERLAP_FLOOR).min(1.0)
    } else {
        let mut partial = 0.0;
        let (gap_x, gap_y) = a.axis_gaps(b);
        let near = NEAR_EDGE_FACTOR * (a.area().sqrt() + b.area().sqrt()) / 2.0;
        if gap_x < near && gap_y < near {
            partial = NEAR_EDGE_SCORE;
        }
        // Applied after the edge rule so it can only raise the score
        if distance <= CENTER_DISTANCE_CUTOFF / 2.0 {
            partial = partial.max(CLOSE_CENTER_SCORE);
        }
        partial
    };

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Score in `[0, 100]` of one player rectangle against one target.
///
/// Shape kind and label must both match before geometry is looked at.
pub fn score(user: &UserAnnotation, target: &GroundTruthAnnotation) -> u32 {
    if user.kind() != target.kind() || user.label() != target.label() {
        return 0;
    }
    (rect_overlap_score(user, target) * 100.0).round() as u32
}

/// Best match for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetScore {
    pub label: String,
    pub score: u32,
    pub found: bool,
}

impl TargetScore {
    pub fn new(label: impl Into<String>, score: u32) -> Self {
        Self {
            label: label.into(),
            score,
            found: score > FOUND_THRESHOLD,
        }
    }
}

/// Found/total counts for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSummary {
    pub label: String,
    pub found: usize,
    pub total: usize,
    pub best: u32,
}

/// Per-target results for one image plus their aggregate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundScore {
    pub per_target: Vec<TargetScore>,
    pub total: u32,
    /// Mean per-target score, rounded; 0 when there are no targets.
    pub normalized: u32,
}

impl RoundScore {
    pub fn from_scores(per_target: Vec<TargetScore>) -> Self {
        let total: u32 = per_target.iter().map(|t| t.score).sum();
        let normalized = if per_target.is_empty() {
            0
        } else {
            (total as f32 / per_target.len() as f32).round() as u32
        };
        Self {
            per_target,
            total,
            normalized,
        }
    }

    pub fn found_count(&self) -> usize {
        self.per_target.iter().filter(|t| t.found).count()
    }

    /// Results grouped by label, sorted by label name.
    pub fn by_label(&self) -> Vec<LabelSummary> {
        let mut grouped: BTreeMap<&str, LabelSummary> = BTreeMap::new();
        for t in &self.per_target {
            let entry = grouped.entry(t.label.as_str()).or_insert_with(|| LabelSummary {
                label: t.label.clone(),
                found: 0,
                total: 0,
                best: 0,
            });
            entry.total += 1;
            if t.found {
                entry.found += 1;
            }
            entry.best = entry.best.max(t.score);
        }
        grouped.into_values().collect()
    }
}

/// Score every target against its best same-label player rectangle.
///
/// One player rectangle may be the best match for several targets. Rectangles
/// still being drawn are ignored.
pub fn round_score(users: &[UserAnnotation], targets: &[GroundTruthAnnotation]) -> RoundScore {
    let per_target = targets
        .iter()
        .map(|target| {
            let best = users
                .iter()
                .filter(|u| u.is_complete && u.label == target.label)
                .map(|u| score(u, target))
                .max()
                .unwrap_or(0);
            TargetScore::new(target.label.clone(), best)
        })
        .collect();
    RoundScore::from_scores(per_target)
}

/// Geometry score plus the externally computed time bonus.
pub fn final_round_score(normalized: u32, time_bonus: i32) -> i32 {
    let normalized = i32::try_from(normalized).unwrap_or(i32::MAX);
    normalized.saturating_add(time_bonus)
}
