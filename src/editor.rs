//! Interactive box editor.
//!
//! Turns pointer input on a scaled canvas into create / move / resize /
//! relabel / delete operations on the player's rectangles. The editor never
//! owns the rectangle collection: every handler receives the current list and
//! reports changes as [`EditorEvent`]s carrying the replacement.
//!
//! All pointer positions are display-space points relative to the canvas'
//! top-left corner.

use crate::geometry::{Bounds, DisplayPoint, DisplayScale, ImageSize, ScoringPoint};
use crate::model::{Annotation, AnnotationId, GroundTruthAnnotation, UserAnnotation};

/// Drags shorter than this (display pixels) are treated as clicks.
pub const MIN_DRAG_DISTANCE: f32 = 10.0;
/// How far from a corner a press still grabs its handle.
pub const HANDLE_TOLERANCE: f32 = 8.0;
/// Side of the square delete button centered on the top-right corner.
pub const DELETE_BUTTON_SIZE: f32 = 20.0;
pub const LABEL_FONT_SIZE: f32 = 14.0;
pub const LABEL_PADDING: f32 = 4.0;
/// Rough glyph width relative to font size, for sizing label chips.
const GLYPH_WIDTH_RATIO: f32 = 0.6;

// ── Handles and hits ───────────────────────────────────────────────────────

/// Corner handle of a rectangle.
///
/// Handles map onto the two stored corners: `NorthWest` is corner 0,
/// `SouthEast` is corner 1, the others mix one coordinate of each.
///
/// On a normalised rectangle the delete button sits on top of the
/// `NorthEast` grab window and wins the hit test, so that handle is only
/// reachable while the stored corners are out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
        Handle::SouthEast,
    ];

    pub fn position(&self, corners: [DisplayPoint; 2]) -> DisplayPoint {
        let [c0, c1] = corners;
        match self {
            Handle::NorthWest => DisplayPoint::new(c0.x, c0.y),
            Handle::NorthEast => DisplayPoint::new(c1.x, c0.y),
            Handle::SouthWest => DisplayPoint::new(c0.x, c1.y),
            Handle::SouthEast => DisplayPoint::new(c1.x, c1.y),
        }
    }

    /// Move this handle to `pos`, touching only the coordinates it controls.
    pub fn drag(&self, corners: &mut [DisplayPoint; 2], pos: DisplayPoint) {
        match self {
            Handle::NorthWest => {
                corners[0].x = pos.x;
                corners[0].y = pos.y;
            }
            Handle::NorthEast => {
                corners[0].y = pos.y;
                corners[1].x = pos.x;
            }
            Handle::SouthWest => {
                corners[0].x = pos.x;
                corners[1].y = pos.y;
            }
            Handle::SouthEast => {
                corners[1].x = pos.x;
                corners[1].y = pos.y;
            }
        }
    }
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    LabelTag(AnnotationId),
    DeleteButton(AnnotationId),
    Handle(AnnotationId, Handle),
    Body(AnnotationId),
    Empty,
}

// ── State ──────────────────────────────────────────────────────────────────

/// The single active interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Drawing {
        anchor: DisplayPoint,
        annotation: UserAnnotation,
    },
    Moving {
        id: AnnotationId,
        origin: DisplayPoint,
        start: Vec<ScoringPoint>,
    },
    Resizing { id: AnnotationId, handle: Handle },
    LabelPopup { id: AnnotationId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Pending,
    Loaded(ImageSize),
    Failed(String),
}

/// Notifications for the owner of the rectangle collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A new finished rectangle; append it to the collection.
    AnnotationCompleted(UserAnnotation),
    /// Replace the whole collection with this list.
    AnnotationsUpdated(Vec<UserAnnotation>),
    LabelChanged { id: AnnotationId, label: String },
    ImageLoadFailed(String),
}

pub struct BoxEditor {
    image: ImageState,
    container: ImageSize,
    scale: DisplayScale,
    gesture: GestureState,
    available_labels: Vec<String>,
    current_label: String,
    show_ground_truth: bool,
    disabled: bool,
    next_id: u64,
}

impl BoxEditor {
    pub fn new(available_labels: Vec<String>) -> Self {
        let current_label = available_labels.first().cloned().unwrap_or_default();
        Self {
            image: ImageState::Pending,
            container: ImageSize::default(),
            scale: DisplayScale::identity(),
            gesture: GestureState::Idle,
            available_labels,
            current_label,
            show_ground_truth: false,
            disabled: false,
            next_id: 1,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image
    }

    /// Size of the rendered image, once one is loaded.
    pub fn canvas_size(&self) -> Option<ImageSize> {
        match self.image {
            ImageState::Loaded(size) => Some(self.scale.apply_to_size(size)),
            _ => None,
        }
    }

    pub fn available_labels(&self) -> &[String] {
        &self.available_labels
    }

    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    /// Choose the label for new rectangles. Ignored for labels outside the
    /// available set.
    pub fn set_current_label(&mut self, label: &str) {
        if self.available_labels.iter().any(|l| l == label) {
            self.current_label = label.to_string();
        }
    }

    pub fn show_ground_truth(&self) -> bool {
        self.show_ground_truth
    }

    pub fn set_show_ground_truth(&mut self, show: bool) {
        self.show_ground_truth = show;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.gesture = GestureState::Idle;
        }
    }

    /// Accepts pointer input only with an image loaded and while enabled.
    pub fn is_interactive(&self) -> bool {
        !self.disabled && matches!(self.image, ImageState::Loaded(_))
    }

    /// The rectangle currently being drawn.
    pub fn in_progress(&self) -> Option<&UserAnnotation> {
        match &self.gesture {
            GestureState::Drawing { annotation, .. } => Some(annotation),
            _ => None,
        }
    }

    /// Rectangle whose label popup is open.
    pub fn popup_target(&self) -> Option<AnnotationId> {
        match self.gesture {
            GestureState::LabelPopup { id } => Some(id),
            _ => None,
        }
    }

    // ── Image lifecycle ────────────────────────────────────────────────────

    /// Start a new image with its own label set. Interaction stays off until
    /// [`BoxEditor::image_loaded`].
    pub fn begin_image(&mut self, available_labels: Vec<String>) {
        self.image = ImageState::Pending;
        self.gesture = GestureState::Idle;
        if !available_labels.iter().any(|l| *l == self.current_label) {
            self.current_label = available_labels.first().cloned().unwrap_or_default();
        }
        self.available_labels = available_labels;
    }

    pub fn image_loaded(
        &mut self,
        size: ImageSize,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        log::debug!("Editor image loaded: {}x{}", size.width, size.height);
        self.image = ImageState::Loaded(size);
        self.scale = DisplayScale::fit(self.container, size);
        if annotations.is_empty() {
            Vec::new()
        } else {
            let updated = self.reprojected(annotations);
            vec![EditorEvent::AnnotationsUpdated(updated)]
        }
    }

    pub fn image_failed(&mut self, reason: impl Into<String>) -> Vec<EditorEvent> {
        let reason = reason.into();
        log::error!("Editor image failed to load: {}", reason);
        self.image = ImageState::Failed(reason.clone());
        self.gesture = GestureState::Idle;
        vec![EditorEvent::ImageLoadFailed(reason)]
    }

    /// Record the space available for the canvas. When the fitted scale
    /// changes, every rectangle's display cache is recomputed from its
    /// scoring-space corners. A no-op without a loaded image.
    pub fn set_container_size(
        &mut self,
        container: ImageSize,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        self.container = container;
        let ImageState::Loaded(image) = self.image else {
            return Vec::new();
        };
        let scale = DisplayScale::fit(container, image);
        if scale == self.scale {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.scale, scale);
        log::debug!("Canvas rescaled: {:.3} -> {:.3}", previous.x, scale.x);

        match &mut self.gesture {
            GestureState::Drawing { anchor, annotation } => {
                annotation.reproject(scale);
                if let Some(first) = annotation.display_coordinates.first() {
                    *anchor = *first;
                }
            }
            GestureState::Moving { origin, .. } => {
                *origin = scale.to_display(previous.to_scoring(*origin));
            }
            _ => {}
        }

        if annotations.is_empty() {
            Vec::new()
        } else {
            let updated = self.reprojected(annotations);
            vec![EditorEvent::AnnotationsUpdated(updated)]
        }
    }

    fn reprojected(&self, annotations: &[UserAnnotation]) -> Vec<UserAnnotation> {
        annotations
            .iter()
            .cloned()
            .map(|mut a| {
                a.reproject(self.scale);
                a
            })
            .collect()
    }

    // ── Geometry helpers ───────────────────────────────────────────────────

    fn canvas_width(&self) -> Option<f32> {
        self.canvas_size().map(|s| s.width)
    }

    /// Where the label chip of `annotation` sits, in display space.
    ///
    /// Above the top-left corner, or below the bottom-right corner when that
    /// would clip off the canvas.
    pub fn label_tag_bounds(&self, annotation: &UserAnnotation) -> Option<Bounds> {
        let b = annotation.display_bounds()?;
        let chars = annotation.label.chars().count() as f32;
        let width = chars * LABEL_FONT_SIZE * GLYPH_WIDTH_RATIO + 2.0 * LABEL_PADDING;
        let height = LABEL_FONT_SIZE + 2.0 * LABEL_PADDING;

        let clips_top = b.top - height < 0.0;
        let clips_right = self.canvas_width().is_some_and(|w| b.left + width > w);
        let tag = if clips_top || clips_right {
            Bounds::from_corners(b.right - width, b.bottom, b.right, b.bottom + height)
        } else {
            Bounds::from_corners(b.left, b.top - height, b.left + width, b.top)
        };
        Some(tag)
    }

    /// Delete button square, centered on the top-right corner.
    pub fn delete_button_bounds(&self, annotation: &UserAnnotation) -> Option<Bounds> {
        let b = annotation.display_bounds()?;
        let half = DELETE_BUTTON_SIZE / 2.0;
        let (x, y) = (b.right, b.top);
        Some(Bounds::from_corners(x - half, y - half, x + half, y + half))
    }

    /// Handle positions in display space, in [`Handle::ALL`] order.
    pub fn handle_positions(annotation: &UserAnnotation) -> Option<[(Handle, DisplayPoint); 4]> {
        let corners = display_corners(annotation)?;
        Some(Handle::ALL.map(|h| (h, h.position(corners))))
    }

    /// Resolve what a press at `pos` hits, highest priority first: label
    /// tags, delete buttons, resize handles, then rectangle bodies. Within a
    /// priority the most recently drawn rectangle wins.
    pub fn hit_test(&self, pos: DisplayPoint, annotations: &[UserAnnotation]) -> Hit {
        let boxes: Vec<&UserAnnotation> = annotations
            .iter()
            .rev()
            .filter(|a| a.is_hit_testable())
            .collect();
        let inside = |b: Option<Bounds>| b.is_some_and(|b| b.contains(pos.x, pos.y));

        if let Some(a) = boxes.iter().find(|a| inside(self.label_tag_bounds(a))) {
            return Hit::LabelTag(a.id);
        }
        if let Some(a) = boxes.iter().find(|a| inside(self.delete_button_bounds(a))) {
            return Hit::DeleteButton(a.id);
        }
        for a in &boxes {
            let Some(handles) = Self::handle_positions(a) else {
                continue;
            };
            for (handle, p) in handles {
                let (dx, dy) = ((pos.x - p.x).abs(), (pos.y - p.y).abs());
                if dx <= HANDLE_TOLERANCE && dy <= HANDLE_TOLERANCE {
                    return Hit::Handle(a.id, handle);
                }
            }
        }
        if let Some(a) = boxes.iter().find(|a| inside(a.display_bounds())) {
            return Hit::Body(a.id);
        }
        Hit::Empty
    }

    fn allocate_id(&mut self, annotations: &[UserAnnotation]) -> AnnotationId {
        let highest = annotations.iter().map(|a| a.id.0).max().unwrap_or(0);
        let id = self.next_id.max(highest + 1);
        self.next_id = id + 1;
        AnnotationId(id)
    }

    // ── Pointer handling ───────────────────────────────────────────────────

    pub fn pointer_down(
        &mut self,
        pos: DisplayPoint,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        if !self.is_interactive() {
            return Vec::new();
        }
        match self.gesture {
            GestureState::Idle => {}
            GestureState::LabelPopup { id } => {
                // Pressing anywhere outside the popup dismisses it
                log::debug!("Label popup for {} dismissed", id);
                self.gesture = GestureState::Idle;
                return Vec::new();
            }
            _ => return Vec::new(),
        }

        match self.hit_test(pos, annotations) {
            Hit::LabelTag(id) => {
                log::debug!("Label popup opened for {}", id);
                self.gesture = GestureState::LabelPopup { id };
                Vec::new()
            }
            Hit::DeleteButton(id) => {
                log::debug!("Deleting {}", id);
                let remaining = annotations.iter().filter(|a| a.id != id).cloned().collect();
                vec![EditorEvent::AnnotationsUpdated(remaining)]
            }
            Hit::Handle(id, handle) => {
                log::debug!("Resizing {} by {:?}", id, handle);
                self.gesture = GestureState::Resizing { id, handle };
                Vec::new()
            }
            Hit::Body(id) => {
                let start = annotations
                    .iter()
                    .find(|a| a.id == id)
                    .map(|a| a.coordinates.clone())
                    .unwrap_or_default();
                log::debug!("Moving {}", id);
                self.gesture = GestureState::Moving {
                    id,
                    origin: pos,
                    start,
                };
                Vec::new()
            }
            Hit::Empty => {
                let id = self.allocate_id(annotations);
                let label = self.current_label.clone();
                let annotation = UserAnnotation::anchored(id, label, pos, self.scale);
                self.gesture = GestureState::Drawing {
                    anchor: pos,
                    annotation,
                };
                Vec::new()
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        pos: DisplayPoint,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        if !self.is_interactive() {
            return Vec::new();
        }
        let scale = self.scale;
        match &mut self.gesture {
            GestureState::Drawing { anchor, annotation } => {
                annotation.set_display_corners(vec![*anchor, pos], scale);
                Vec::new()
            }
            GestureState::Moving { id, origin, start } => {
                let id = *id;
                let offset = DisplayPoint::new(pos.x - origin.x, pos.y - origin.y);
                let delta = scale.to_scoring(offset);
                let moved: Vec<ScoringPoint> = start
                    .iter()
                    .map(|p| ScoringPoint::new(p.x + delta.x, p.y + delta.y))
                    .collect();
                self.update_one(id, annotations, |a| {
                    a.coordinates = moved;
                    a.reproject(scale);
                })
            }
            GestureState::Resizing { id, handle } => {
                let (id, handle) = (*id, *handle);
                self.update_one(id, annotations, |a| {
                    if let Some(mut corners) = display_corners(a) {
                        handle.drag(&mut corners, pos);
                        a.set_display_corners(corners.to_vec(), scale);
                    }
                })
            }
            GestureState::Idle | GestureState::LabelPopup { .. } => Vec::new(),
        }
    }

    pub fn pointer_up(
        &mut self,
        pos: DisplayPoint,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        if !self.is_interactive() {
            return Vec::new();
        }
        let scale = self.scale;
        match std::mem::replace(&mut self.gesture, GestureState::Idle) {
            GestureState::Drawing { anchor, annotation } => {
                if anchor.distance_to(pos) < MIN_DRAG_DISTANCE {
                    log::debug!(
                        "Discarding accidental click at ({:.0}, {:.0})",
                        pos.x,
                        pos.y
                    );
                    return Vec::new();
                }
                let mut annotation = annotation;
                annotation.set_display_corners(vec![anchor, pos], scale);
                annotation.is_complete = true;
                annotation.normalize(scale);
                log::debug!("Completed {} '{}'", annotation.id, annotation.label);
                vec![EditorEvent::AnnotationCompleted(annotation)]
            }
            GestureState::Resizing { id, .. } => {
                let inverted = annotations
                    .iter()
                    .find(|a| a.id == id)
                    .is_some_and(|a| a.clone().normalize(scale));
                if inverted {
                    self.update_one(id, annotations, |a| {
                        a.normalize(scale);
                    })
                } else {
                    Vec::new()
                }
            }
            GestureState::LabelPopup { id } => {
                // The release that follows the opening press keeps the popup up
                self.gesture = GestureState::LabelPopup { id };
                Vec::new()
            }
            GestureState::Moving { .. } | GestureState::Idle => Vec::new(),
        }
    }

    /// Pointer left the canvas or the touch was cancelled. Aborts drawing.
    pub fn pointer_leave(&mut self) {
        if matches!(self.gesture, GestureState::Drawing { .. }) {
            log::debug!("Drawing aborted");
            self.gesture = GestureState::Idle;
        }
    }

    /// Abort drawing or close the label popup.
    pub fn cancel(&mut self) {
        if let GestureState::Drawing { .. } | GestureState::LabelPopup { .. } = self.gesture {
            self.gesture = GestureState::Idle;
        }
    }

    /// Apply a label picked from the open popup and close it. Labels outside
    /// the available set are ignored.
    pub fn select_label(
        &mut self,
        label: &str,
        annotations: &[UserAnnotation],
    ) -> Vec<EditorEvent> {
        let GestureState::LabelPopup { id } = self.gesture else {
            return Vec::new();
        };
        if !self.available_labels.iter().any(|l| l == label) {
            log::warn!("Ignoring unknown label '{}'", label);
            return Vec::new();
        }
        self.gesture = GestureState::Idle;
        let mut events = vec![EditorEvent::LabelChanged {
            id,
            label: label.to_string(),
        }];
        let relabel = label.to_string();
        events.extend(self.update_one(id, annotations, |a| a.label = relabel));
        events
    }

    /// Replace one rectangle in the collection. Resets the gesture when the
    /// rectangle is gone.
    fn update_one(
        &mut self,
        id: AnnotationId,
        annotations: &[UserAnnotation],
        edit: impl FnOnce(&mut UserAnnotation),
    ) -> Vec<EditorEvent> {
        let Some(index) = annotations.iter().position(|a| a.id == id) else {
            log::warn!("Annotation {} vanished during a gesture", id);
            self.gesture = GestureState::Idle;
            return Vec::new();
        };
        let mut updated = annotations.to_vec();
        edit(&mut updated[index]);
        vec![EditorEvent::AnnotationsUpdated(updated)]
    }

    // ── Drawing support ────────────────────────────────────────────────────

    /// Everything to paint, bottom to top: ground truth (when shown), the
    /// player's rectangles, then the one being drawn.
    pub fn draw_list(
        &self,
        annotations: &[UserAnnotation],
        targets: &[GroundTruthAnnotation],
    ) -> Vec<Annotation> {
        let mut list = Vec::with_capacity(targets.len() + annotations.len() + 1);
        if self.show_ground_truth {
            list.extend(targets.iter().cloned().map(Annotation::GroundTruth));
        }
        list.extend(annotations.iter().cloned().map(Annotation::User));
        if let Some(a) = self.in_progress() {
            list.push(Annotation::User(a.clone()));
        }
        list
    }

    /// Project a ground-truth rectangle onto the canvas.
    pub fn target_display_bounds(&self, target: &GroundTruthAnnotation) -> Option<Bounds> {
        let to_display = |p: &ScoringPoint| self.scale.to_display(*p);
        let corners: Vec<DisplayPoint> = target.coordinates.iter().map(to_display).collect();
        Bounds::from_display(&corners)
    }
}

fn display_corners(annotation: &UserAnnotation) -> Option<[DisplayPoint; 2]> {
    match annotation.display_coordinates.as_slice() {
        [a, b] => Some([*a, *b]),
        _ => None,
    }
}

/// Fold a batch of editor events into the owner's collection.
pub fn apply_events(annotations: &mut Vec<UserAnnotation>, events: &[EditorEvent]) {
    for event in events {
        match event {
            EditorEvent::AnnotationCompleted(a) => annotations.push(a.clone()),
            EditorEvent::AnnotationsUpdated(list) => *annotations = list.clone(),
            EditorEvent::LabelChanged { .. } | EditorEvent::ImageLoadFailed(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["Whale".to_string(), "Boat".to_string()]
    }

    /// Editor with a 1000x500 image shown at half size.
    fn editor() -> BoxEditor {
        let mut ed = BoxEditor::new(labels());
        ed.set_container_size(ImageSize::new(500.0, 500.0), &[]);
        ed.image_loaded(ImageSize::new(1000.0, 500.0), &[]);
        ed
    }

    fn p(x: f32, y: f32) -> DisplayPoint {
        DisplayPoint::new(x, y)
    }

    fn s(x: f32, y: f32) -> ScoringPoint {
        ScoringPoint::new(x, y)
    }

    fn draw(
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
    fn test_draw_creates_scoring_space_rectangle() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));

        assert_eq!(list.len(), 1);
        let ann = &list[0];
        assert!(ann.is_complete);
        assert_eq!(ann.label, "Whale");
        assert_eq!(ann.coordinates, vec![s(200.0, 200.0), s(400.0, 300.0)]);
        assert_eq!(
            ann.display_coordinates,
            vec![p(100.0, 100.0), p(200.0, 150.0)]
        );
        assert_eq!(*ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_short_drag_is_discarded() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(10.0, 10.0), p(12.0, 11.0));
        assert!(list.is_empty());
        assert_eq!(*ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_reverse_drag_is_normalised() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(200.0, 150.0), p(100.0, 100.0));
        assert_eq!(
            list[0].display_coordinates,
            vec![p(100.0, 100.0), p(200.0, 150.0)]
        );
    }

    #[test]
    fn test_drawing_tracks_pointer() {
        let mut ed = editor();
        ed.pointer_down(p(50.0, 60.0), &[]);
        assert_eq!(ed.in_progress().map(|a| a.coordinates.len()), Some(1));
        ed.pointer_move(p(80.0, 90.0), &[]);
        let in_progress = ed.in_progress().expect("drawing");
        assert!(!in_progress.is_complete);
        assert_eq!(
            in_progress.display_coordinates,
            vec![p(50.0, 60.0), p(80.0, 90.0)]
        );
    }

    #[test]
    fn test_pointer_leave_aborts_drawing() {
        let mut ed = editor();
        ed.pointer_down(p(50.0, 60.0), &[]);
        ed.pointer_move(p(150.0, 160.0), &[]);
        ed.pointer_leave();
        assert_eq!(*ed.gesture(), GestureState::Idle);
        assert!(ed.pointer_up(p(150.0, 160.0), &[]).is_empty());
    }

    #[test]
    fn test_move_translates_rigidly() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));

        let events = ed.pointer_down(p(150.0, 125.0), &list);
        apply_events(&mut list, &events);
        assert!(matches!(ed.gesture(), GestureState::Moving { .. }));
        let events = ed.pointer_move(p(160.0, 105.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_move(p(170.0, 135.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_up(p(170.0, 135.0), &list);
        apply_events(&mut list, &events);

        // Moved by (20, 10) display = (40, 20) scoring
        assert_eq!(list[0].coordinates, vec![s(240.0, 220.0), s(440.0, 320.0)]);
        assert_eq!(list[0].display_coordinates[0], p(120.0, 110.0));
        assert_eq!(*ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_resize_south_east_moves_only_corner_one() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let corner0 = list[0].display_coordinates[0];

        let events = ed.pointer_down(p(203.0, 148.0), &list);
        apply_events(&mut list, &events);
        let GestureState::Resizing { handle, .. } = ed.gesture() else {
            panic!("not resizing");
        };
        assert_eq!(*handle, Handle::SouthEast);
        let events = ed.pointer_move(p(260.0, 210.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_up(p(260.0, 210.0), &list);
        apply_events(&mut list, &events);

        assert_eq!(list[0].display_coordinates[0], corner0);
        assert_eq!(list[0].display_coordinates[1], p(260.0, 210.0));
        assert_eq!(list[0].coordinates[1], ScoringPoint::new(520.0, 420.0));
    }

    #[test]
    fn test_resize_north_east_touches_mixed_coordinates() {
        let mut corners = [p(10.0, 10.0), p(50.0, 50.0)];
        Handle::NorthEast.drag(&mut corners, p(70.0, 0.0));
        assert_eq!(corners, [p(10.0, 0.0), p(70.0, 50.0)]);
        assert_eq!(Handle::NorthEast.position(corners), p(70.0, 0.0));
    }

    #[test]
    fn test_delete_button_covers_north_east_handle() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let id = list[0].id;

        for dx in [-8.0, -4.0, 0.0, 4.0, 8.0] {
            for dy in [-8.0, -4.0, 0.0, 4.0, 8.0] {
                let hit = ed.hit_test(p(200.0 + dx, 100.0 + dy), &list);
                assert_eq!(hit, Hit::DeleteButton(id), "at offset ({dx}, {dy})");
            }
        }
        assert_eq!(
            ed.hit_test(p(100.0, 150.0), &list),
            Hit::Handle(id, Handle::SouthWest)
        );
    }

    #[test]
    fn test_north_east_handle_on_unordered_corners() {
        let mut ed = editor();
        // Corner 0 is the top-right, so `NorthEast` lands on the top-left
        let mut list = vec![UserAnnotation::complete(
            AnnotationId(1),
            "Whale",
            ScoringPoint::new(400.0, 200.0),
            ScoringPoint::new(200.0, 300.0),
            ed.scale(),
        )];
        assert_eq!(
            ed.hit_test(p(102.0, 103.0), &list),
            Hit::Handle(AnnotationId(1), Handle::NorthEast)
        );

        let events = ed.pointer_down(p(102.0, 103.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_move(p(90.0, 95.0), &list);
        apply_events(&mut list, &events);
        assert_eq!(
            list[0].display_coordinates,
            vec![p(200.0, 95.0), p(90.0, 150.0)]
        );

        let events = ed.pointer_up(p(90.0, 95.0), &list);
        apply_events(&mut list, &events);
        assert_eq!(
            list[0].display_coordinates,
            vec![p(90.0, 95.0), p(200.0, 150.0)]
        );
    }

    #[test]
    fn test_resize_past_opposite_corner_normalises_on_release() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));

        let events = ed.pointer_down(p(200.0, 150.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_move(p(50.0, 60.0), &list);
        apply_events(&mut list, &events);
        let events = ed.pointer_up(p(50.0, 60.0), &list);
        apply_events(&mut list, &events);
        assert_eq!(
            list[0].display_coordinates,
            vec![p(50.0, 60.0), p(100.0, 100.0)]
        );
    }

    #[test]
    fn test_delete_button_removes_rectangle() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        draw(&mut ed, &mut list, p(300.0, 300.0), p(400.0, 400.0));

        // Top-right corner of the first rectangle, nudged outside the handle
        let events = ed.pointer_down(p(200.0 + 9.5, 100.0 - 9.5), &list);
        apply_events(&mut list, &events);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].display_coordinates[0], p(300.0, 300.0));
        assert_eq!(*ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_label_tag_opens_popup_and_relabels() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let id = list[0].id;

        let tag = ed.label_tag_bounds(&list[0]).expect("tag");
        assert!(tag.bottom <= 100.0);
        let (cx, cy) = tag.center();
        ed.pointer_down(p(cx, cy), &list);
        ed.pointer_up(p(cx, cy), &list);
        assert_eq!(ed.popup_target(), Some(id));

        assert!(ed.select_label("Octopus", &list).is_empty());
        let events = ed.select_label("Boat", &list);
        assert_eq!(
            events[0],
            EditorEvent::LabelChanged {
                id,
                label: "Boat".to_string()
            }
        );
        apply_events(&mut list, &events);
        assert_eq!(list[0].label, "Boat");
        assert_eq!(ed.popup_target(), None);
    }

    #[test]
    fn test_label_tag_flips_below_at_top_edge() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 5.0), p(200.0, 60.0));
        let tag = ed.label_tag_bounds(&list[0]).expect("tag");
        assert_eq!(tag.top, 60.0);
        assert_eq!(tag.right, 200.0);
    }

    #[test]
    fn test_press_outside_popup_dismisses_it() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let (cx, cy) = ed.label_tag_bounds(&list[0]).expect("tag").center();
        ed.pointer_down(p(cx, cy), &list);
        assert!(ed.popup_target().is_some());

        ed.pointer_down(p(400.0, 400.0), &list);
        assert_eq!(*ed.gesture(), GestureState::Idle);
        assert!(ed.in_progress().is_none());
    }

    #[test]
    fn test_label_tag_beats_other_rectangles_body() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        // Second rectangle covers the first one's label chip
        draw(&mut ed, &mut list, p(90.0, 40.0), p(300.0, 95.0));
        let (cx, cy) = ed.label_tag_bounds(&list[0]).expect("tag").center();
        assert_eq!(ed.hit_test(p(cx, cy), &list), Hit::LabelTag(list[0].id));
    }

    #[test]
    fn test_hit_test_priority_handle_over_body() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let id = list[0].id;
        assert_eq!(
            ed.hit_test(p(104.0, 104.0), &list),
            Hit::Handle(id, Handle::NorthWest)
        );
        assert_eq!(ed.hit_test(p(150.0, 125.0), &list), Hit::Body(id));
        assert_eq!(ed.hit_test(p(400.0, 20.0), &list), Hit::Empty);
    }

    #[test]
    fn test_incomplete_rectangles_are_not_hit() {
        let ed = editor();
        let mut ann = UserAnnotation::complete(
            AnnotationId(9),
            "Whale",
            ScoringPoint::new(0.0, 0.0),
            ScoringPoint::new(100.0, 100.0),
            ed.scale(),
        );
        ann.is_complete = false;
        assert_eq!(ed.hit_test(p(25.0, 25.0), &[ann]), Hit::Empty);
    }

    #[test]
    fn test_resize_container_keeps_scoring_space() {
        let mut ed = editor();
        let mut list = Vec::new();
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        let before = list[0].coordinates.clone();

        let events = ed.set_container_size(ImageSize::new(250.0, 1000.0), &list);
        apply_events(&mut list, &events);
        assert_eq!(list[0].coordinates, before);
        assert_eq!(
            list[0].display_coordinates,
            vec![p(50.0, 50.0), p(100.0, 75.0)]
        );

        // Same size again is a no-op
        let events = ed.set_container_size(ImageSize::new(250.0, 1000.0), &list);
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_interaction_without_image() {
        let mut ed = BoxEditor::new(labels());
        let events = ed.set_container_size(ImageSize::new(500.0, 500.0), &[]);
        assert!(events.is_empty());
        assert!(ed.pointer_down(p(10.0, 10.0), &[]).is_empty());
        assert_eq!(*ed.gesture(), GestureState::Idle);
        assert!(ed.canvas_size().is_none());
    }

    #[test]
    fn test_image_failure_is_reported() {
        let mut ed = BoxEditor::new(labels());
        let events = ed.image_failed("decode error");
        let expected = EditorEvent::ImageLoadFailed("decode error".to_string());
        assert_eq!(events, vec![expected]);
        assert!(!ed.is_interactive());
        assert!(ed.pointer_down(p(10.0, 10.0), &[]).is_empty());
    }

    #[test]
    fn test_disabled_editor_ignores_input() {
        let mut ed = editor();
        ed.set_disabled(true);
        ed.pointer_down(p(10.0, 10.0), &[]);
        assert_eq!(*ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn test_second_press_ignored_mid_gesture() {
        let mut ed = editor();
        ed.pointer_down(p(10.0, 10.0), &[]);
        let first = match ed.gesture() {
            GestureState::Drawing { anchor, .. } => *anchor,
            other => panic!("unexpected {other:?}"),
        };
        ed.pointer_down(p(300.0, 300.0), &[]);
        let GestureState::Drawing { anchor, .. } = ed.gesture() else {
            panic!("not drawing");
        };
        assert_eq!(*anchor, first);
    }

    #[test]
    fn test_new_ids_are_unique() {
        let mut ed = editor();
        let mut list = vec![UserAnnotation::complete(
            AnnotationId(41),
            "Whale",
            ScoringPoint::new(900.0, 0.0),
            ScoringPoint::new(990.0, 40.0),
            ed.scale(),
        )];
        draw(&mut ed, &mut list, p(100.0, 100.0), p(200.0, 150.0));
        draw(&mut ed, &mut list, p(100.0, 300.0), p(200.0, 350.0));
        assert_eq!(list[1].id, AnnotationId(42));
        assert_eq!(list[2].id, AnnotationId(43));
    }

    #[test]
    fn test_current_label_restricted_to_available() {
        let mut ed = editor();
        ed.set_current_label("Boat");
        assert_eq!(ed.current_label(), "Boat");
        ed.set_current_label("Kraken");
        assert_eq!(ed.current_label(), "Boat");
    }

    #[test]
    fn test_draw_list_includes_ground_truth_only_when_shown() {
        let mut ed = editor();
        let target = GroundTruthAnnotation::rectangle(1, "Whale", s(0.0, 0.0), s(10.0, 10.0));
        assert!(ed.draw_list(&[], std::slice::from_ref(&target)).is_empty());
        ed.set_show_ground_truth(true);
        let list = ed.draw_list(&[], std::slice::from_ref(&target));
        assert_eq!(list.len(), 1);
        assert!(!list[0].is_hit_testable());
        let right = ed.target_display_bounds(&target).map(|b| b.right);
        assert_eq!(right, Some(5.0));
    }
}
