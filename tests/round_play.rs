//! Plays rounds through the public API: drawing with the editor, then scoring
//! the result against ground truth.

use reef_spotter::scoring::TargetScore;
use reef_spotter::{
    apply_events, rect_overlap_score, round_score, score, AnnotationId, BoxEditor, DisplayPoint,
    DisplayScale, GroundTruthAnnotation, ImageSize, RoundScore, ScoringPoint, UserAnnotation,
};

fn sp(x: f32, y: f32) -> ScoringPoint {
    ScoringPoint::new(x, y)
}

fn dp(x: f32, y: f32) -> DisplayPoint {
    DisplayPoint::new(x, y)
}

fn user(label: &str, a: ScoringPoint, b: ScoringPoint) -> UserAnnotation {
    UserAnnotation::complete(AnnotationId(1), label, a, b, DisplayScale::identity())
}

fn whale_target() -> GroundTruthAnnotation {
    GroundTruthAnnotation::rectangle(1, "Whale", sp(0.0, 0.0), sp(100.0, 100.0))
}

/// Editor showing a 1000x1000 image at its natural size.
fn editor() -> BoxEditor {
    let mut ed = BoxEditor::new(vec!["Whale".to_string(), "Dolphin".to_string()]);
    ed.set_container_size(ImageSize::new(1000.0, 1000.0), &[]);
    ed.image_loaded(ImageSize::new(1000.0, 1000.0), &[]);
    ed
}

fn gesture(
    ed: &mut BoxEditor,
    list: &mut Vec<UserAnnotation>,
    from: DisplayPoint,
    to: DisplayPoint,
) {
    let events = ed.pointer_down(from, list);
    apply_events(list, &events);
    let events = ed.pointer_move(to, list);
    apply_events(list, &events);
    let events = ed.pointer_up(to, list);
    apply_events(list, &events);
}

#[test]
fn identical_rectangle_scores_full_marks() {
    let guess = user("Whale", sp(0.0, 0.0), sp(100.0, 100.0));
    assert_eq!(score(&guess, &whale_target()), 100);
}

#[test]
fn distant_rectangle_scores_nothing() {
    let guess = user("Whale", sp(500.0, 500.0), sp(600.0, 600.0));
    assert_eq!(score(&guess, &whale_target()), 0);
}

#[test]
fn wrong_label_scores_nothing() {
    let guess = user("Dolphin", sp(0.0, 0.0), sp(100.0, 100.0));
    assert_eq!(score(&guess, &whale_target()), 0);
}

#[test]
fn overlap_score_is_symmetric() {
    let pairs = [
        ((0.0, 0.0, 100.0, 100.0), (10.0, 10.0, 110.0, 110.0)),
        ((0.0, 0.0, 100.0, 100.0), (105.0, 0.0, 200.0, 100.0)),
        ((0.0, 0.0, 50.0, 50.0), (120.0, 120.0, 180.0, 160.0)),
        ((0.0, 0.0, 100.0, 100.0), (700.0, 700.0, 800.0, 800.0)),
    ];
    for ((ax0, ay0, ax1, ay1), (bx0, by0, bx1, by1)) in pairs {
        let a = user("Whale", sp(ax0, ay0), sp(ax1, ay1));
        let b = user("Whale", sp(bx0, by0), sp(bx1, by1));
        assert_eq!(rect_overlap_score(&a, &b), rect_overlap_score(&b, &a));
    }
}

#[test]
fn round_without_targets_is_zero() {
    let result = round_score(&[user("Whale", sp(0.0, 0.0), sp(10.0, 10.0))], &[]);
    assert_eq!(result.normalized, 0);
    assert!(result.per_target.is_empty());
}

#[test]
fn half_found_round_averages() {
    let scores = vec![
        TargetScore::new("Whale", 80),
        TargetScore::new("Dolphin", 0),
    ];
    let result = RoundScore::from_scores(scores);
    assert_eq!(result.total, 80);
    assert_eq!(result.normalized, 40);
    assert_eq!(result.found_count(), 1);
}

#[test]
fn scoring_point_survives_display_round_trip() {
    let scales = [
        DisplayScale::new(0.37, 0.37),
        DisplayScale::new(2.5, 1.25),
        DisplayScale::new(1.0, 0.05),
    ];
    for scale in scales {
        let p = sp(123.4, 987.6);
        let back = scale.to_scoring(scale.to_display(p));
        assert!((back.x - p.x).abs() < 1e-3, "{back:?}");
        assert!((back.y - p.y).abs() < 1e-3, "{back:?}");
    }
}

#[test]
fn short_drag_creates_nothing() {
    let mut ed = editor();
    let mut list = Vec::new();
    gesture(&mut ed, &mut list, dp(10.0, 10.0), dp(12.0, 11.0));
    assert!(list.is_empty());
}

#[test]
fn draw_then_resize_south_east() {
    let mut ed = editor();
    let mut list = Vec::new();
    gesture(&mut ed, &mut list, dp(100.0, 100.0), dp(200.0, 150.0));
    assert_eq!(list.len(), 1);

    gesture(&mut ed, &mut list, dp(200.0, 150.0), dp(260.0, 190.0));
    assert_eq!(list.len(), 1);
    let expected = vec![dp(100.0, 100.0), dp(260.0, 190.0)];
    assert_eq!(list[0].display_coordinates, expected);
}

#[test]
fn drawn_box_over_target_is_found() {
    let mut ed = editor();
    let mut list = Vec::new();
    gesture(&mut ed, &mut list, dp(0.0, 0.0), dp(100.0, 100.0));

    let result = round_score(&list, &[whale_target()]);
    assert_eq!(result.normalized, 100);
    assert!(result.per_target[0].found);
}
