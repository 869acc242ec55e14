//! Reef Spotter: spot and box marine life on scenes, scored against ground
//! truth.
//!
//! The geometry, scoring and editor modules have no UI dependency. `render`
//! and `app` put them behind an egui window.

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod game;
pub mod geometry;
pub mod model;
pub mod render;
pub mod scene;
pub mod scoring;
pub mod store;

pub use editor::{apply_events, BoxEditor, EditorEvent, GestureState, Hit};
pub use geometry::{Bounds, DisplayPoint, DisplayScale, ImageSize, ScoringPoint};
pub use model::{AnnotationId, GroundTruthAnnotation, ShapeKind, UserAnnotation};
pub use scoring::{final_round_score, rect_overlap_score, round_score, score, RoundScore};
