//! egui front end for the box editor: painting and pointer translation.

use crate::editor::{apply_events, BoxEditor, EditorEvent, GestureState, ImageState};
use crate::editor::{LABEL_FONT_SIZE, LABEL_PADDING};
use crate::geometry::{Bounds, DisplayPoint, ImageSize};
use crate::model::{
    label_color, Annotation, AnnotationId, GroundTruthAnnotation, LabelColor, UserAnnotation,
};
use eframe::egui;

const STROKE_WIDTH: f32 = 2.0;
const HANDLE_SIZE: f32 = 8.0;
const FILL_ALPHA: u8 = 40;
const GROUND_TRUTH_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 235, 59);

fn to_egui(c: LabelColor) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

fn translucent(c: LabelColor, alpha: u8) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

fn screen_rect(origin: egui::Pos2, b: Bounds) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(origin.x + b.left, origin.y + b.top),
        egui::pos2(origin.x + b.right, origin.y + b.bottom),
    )
}

fn screen_pos(origin: egui::Pos2, p: DisplayPoint) -> egui::Pos2 {
    egui::pos2(origin.x + p.x, origin.y + p.y)
}

fn display_pos(origin: egui::Pos2, p: egui::Pos2) -> DisplayPoint {
    DisplayPoint::new(p.x - origin.x, p.y - origin.y)
}

/// Show the editor canvas in the remaining space of `ui`.
///
/// Returns every event the editor produced this frame, in order. Handlers
/// within the frame see the collection with earlier events already applied,
/// so the owner reaches the same state by applying the events in order.
pub fn show_canvas(
    ui: &mut egui::Ui,
    editor: &mut BoxEditor,
    texture: Option<&egui::TextureHandle>,
    annotations: &[UserAnnotation],
    targets: &[GroundTruthAnnotation],
) -> Vec<EditorEvent> {
    let mut current = annotations.to_vec();
    let mut events = Vec::new();

    let available = ui.available_size();
    let batch = editor.set_container_size(ImageSize::new(available.x, available.y), &current);
    absorb(&mut current, &mut events, batch);

    match editor.image_state() {
        ImageState::Pending => {
            ui.centered_and_justified(|ui| ui.spinner());
            return events;
        }
        ImageState::Failed(reason) => {
            let message = format!("Could not load image: {reason}");
            ui.centered_and_justified(|ui| {
                ui.colored_label(egui::Color32::LIGHT_RED, message);
            });
            return events;
        }
        ImageState::Loaded(_) => {}
    }
    let Some(canvas) = editor.canvas_size() else {
        return events;
    };

    let size = egui::vec2(canvas.width, canvas.height);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let canvas_rect = response.rect;
    let origin = canvas_rect.min;

    painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
    if let Some(tex) = texture {
        painter.image(
            tex.id(),
            canvas_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    // Pointer input
    let (pressed, released, latest) = ui.ctx().input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
        )
    });
    if pressed && response.hovered() {
        if let Some(pos) = latest {
            let batch = editor.pointer_down(display_pos(origin, pos), &current);
            absorb(&mut current, &mut events, batch);
        }
    }
    let drawing = matches!(editor.gesture(), GestureState::Drawing { .. });
    match latest {
        Some(pos) if canvas_rect.contains(pos) || !drawing => {
            let batch = editor.pointer_move(display_pos(origin, pos), &current);
            absorb(&mut current, &mut events, batch);
            if released {
                let batch = editor.pointer_up(display_pos(origin, pos), &current);
                absorb(&mut current, &mut events, batch);
            }
        }
        _ => editor.pointer_leave(),
    }

    paint(ui.ctx(), &painter, editor, origin, &current, targets);

    if let Some(id) = editor.popup_target() {
        if let Some(batch) = label_popup(ui.ctx(), editor, origin, id, &current) {
            absorb(&mut current, &mut events, batch);
        }
    }

    events
}

fn absorb(
    current: &mut Vec<UserAnnotation>,
    events: &mut Vec<EditorEvent>,
    batch: Vec<EditorEvent>,
) {
    apply_events(current, &batch);
    events.extend(batch);
}

fn paint(
    ctx: &egui::Context,
    painter: &egui::Painter,
    editor: &BoxEditor,
    origin: egui::Pos2,
    annotations: &[UserAnnotation],
    targets: &[GroundTruthAnnotation],
) {
    let layer = egui::LayerId::new(egui::Order::Foreground, egui::Id::new("delete_buttons"));
    let overlay = ctx.layer_painter(layer);

    for item in editor.draw_list(annotations, targets) {
        match &item {
            Annotation::GroundTruth(target) => {
                if let Some(b) = editor.target_display_bounds(target) {
                    paint_ground_truth(painter, screen_rect(origin, b), &target.label);
                }
            }
            Annotation::User(ann) if ann.is_complete => {
                paint_complete(painter, &overlay, editor, origin, ann);
            }
            Annotation::User(ann) => {
                if let Some(b) = ann.display_bounds() {
                    painter.rect_stroke(
                        screen_rect(origin, b),
                        0.0,
                        egui::Stroke::new(STROKE_WIDTH, to_egui(ann.color())),
                        egui::StrokeKind::Middle,
                    );
                }
            }
        }
    }
}

fn paint_ground_truth(painter: &egui::Painter, rect: egui::Rect, label: &str) {
    painter.rect_filled(rect, 0.0, GROUND_TRUTH_COLOR.gamma_multiply(0.15));
    let outline = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    painter.extend(egui::Shape::dashed_line(
        &outline,
        egui::Stroke::new(STROKE_WIDTH, GROUND_TRUTH_COLOR),
        6.0,
        4.0,
    ));
    painter.text(
        rect.left_bottom() + egui::vec2(LABEL_PADDING, -LABEL_PADDING),
        egui::Align2::LEFT_BOTTOM,
        label,
        egui::FontId::proportional(LABEL_FONT_SIZE),
        GROUND_TRUTH_COLOR,
    );
}

fn paint_complete(
    painter: &egui::Painter,
    overlay: &egui::Painter,
    editor: &BoxEditor,
    origin: egui::Pos2,
    ann: &UserAnnotation,
) {
    let Some(b) = ann.display_bounds() else {
        return;
    };
    let color = ann.color();
    let rect = screen_rect(origin, b);
    painter.rect_filled(rect, 0.0, translucent(color, FILL_ALPHA));
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(STROKE_WIDTH, to_egui(color)),
        egui::StrokeKind::Middle,
    );

    if let Some(tag) = editor.label_tag_bounds(ann) {
        let tag_rect = screen_rect(origin, tag);
        painter.rect_filled(tag_rect, 3.0, to_egui(color));
        painter.text(
            tag_rect.left_center() + egui::vec2(LABEL_PADDING, 0.0),
            egui::Align2::LEFT_CENTER,
            &ann.label,
            egui::FontId::proportional(LABEL_FONT_SIZE),
            egui::Color32::WHITE,
        );
    }

    if let Some(handles) = BoxEditor::handle_positions(ann) {
        for (_, p) in handles {
            let size = egui::vec2(HANDLE_SIZE, HANDLE_SIZE);
            let handle = egui::Rect::from_center_size(screen_pos(origin, p), size);
            painter.rect_filled(handle, 1.0, egui::Color32::WHITE);
            painter.rect_stroke(
                handle,
                1.0,
                egui::Stroke::new(1.0, to_egui(color)),
                egui::StrokeKind::Middle,
            );
        }
    }

    if let Some(button) = editor.delete_button_bounds(ann) {
        let button = screen_rect(origin, button);
        overlay.rect_filled(button, 4.0, egui::Color32::from_rgb(211, 47, 47));
        overlay.text(
            button.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            egui::FontId::proportional(LABEL_FONT_SIZE),
            egui::Color32::WHITE,
        );
    }
}

/// Popup listing the available labels next to the chosen rectangle's chip.
fn label_popup(
    ctx: &egui::Context,
    editor: &mut BoxEditor,
    origin: egui::Pos2,
    id: AnnotationId,
    annotations: &[UserAnnotation],
) -> Option<Vec<EditorEvent>> {
    let ann = annotations.iter().find(|a| a.id == id)?;
    let tag = editor.label_tag_bounds(ann)?;
    let anchor = egui::pos2(origin.x + tag.left, origin.y + tag.bottom);

    let mut chosen = None;
    egui::Area::new(egui::Id::new("label_popup"))
        .fixed_pos(anchor)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                for label in editor.available_labels() {
                    let selected = *label == ann.label;
                    let text = egui::RichText::new(label).color(to_egui(label_color(label)));
                    if ui.selectable_label(selected, text).clicked() {
                        chosen = Some(label.clone());
                    }
                }
            });
        });

    chosen.map(|label| editor.select_label(&label, annotations))
}
