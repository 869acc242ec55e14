//! The game window: toolbar, canvas and score panel around the box editor.

use crate::config::GameConfig;
use crate::editor::{apply_events, BoxEditor, EditorEvent};
use crate::game::{BestScores, GameMode, Round, RoundTimer};
use crate::model::UserAnnotation;
use crate::render;
use crate::scene::SceneDeck;
use crate::scoring::RoundScore;
use crate::store::MemoryStore;
use eframe::egui;
use image::DynamicImage;
use std::path::PathBuf;
use std::time::Duration;

pub struct ReefApp {
    config: GameConfig,
    deck: Option<SceneDeck>,
    round_index: usize,
    round: Option<Round>,

    /// The player's rectangles for the current image. The editor reports
    /// changes; this is the only copy.
    annotations: Vec<UserAnnotation>,
    editor: BoxEditor,
    live_score: RoundScore,
    best: BestScores<MemoryStore>,

    texture: Option<egui::TextureHandle>,
    pending_image: Option<DynamicImage>,
    status: Option<String>,
}

impl ReefApp {
    pub fn new(config: GameConfig, deck: Option<SceneDeck>) -> Self {
        let mut app = Self {
            config,
            deck,
            round_index: 0,
            round: None,
            annotations: Vec::new(),
            editor: BoxEditor::new(Vec::new()),
            live_score: RoundScore::default(),
            best: BestScores::new(MemoryStore::new()),
            texture: None,
            pending_image: None,
            status: None,
        };
        if app.deck.is_some() {
            app.start_round(0);
        }
        app
    }

    fn start_round(&mut self, index: usize) {
        let Some(scene) = self.deck.as_ref().and_then(|d| d.rounds.get(index)) else {
            return;
        };
        let scene = scene.clone();
        self.round_index = index;
        self.annotations.clear();
        self.texture = None;
        self.pending_image = None;
        self.status = None;

        self.editor.begin_image(scene.labels.clone());
        self.editor.set_disabled(false);
        self.editor.set_show_ground_truth(false);

        let events = match image::open(&scene.image) {
            Ok(img) => {
                if (img.width() as f32, img.height() as f32) != (scene.width, scene.height) {
                    log::warn!(
                        "{} is {}x{} but the deck says {}x{}; scoring uses the deck size",
                        scene.image.display(),
                        img.width(),
                        img.height(),
                        scene.width,
                        scene.height
                    );
                }
                self.pending_image = Some(img);
                let size = scene.image_size();
                self.editor.image_loaded(size, &self.annotations)
            }
            Err(e) => {
                let reason = format!("{}: {}", scene.image.display(), e);
                self.editor.image_failed(reason)
            }
        };
        self.handle_events(events);

        let timer = RoundTimer::start(Duration::from_secs(self.config.round_seconds));
        self.round = Some(Round::new(scene.targets, timer));
        self.refresh_score();
    }

    fn handle_events(&mut self, events: Vec<EditorEvent>) {
        if events.is_empty() {
            return;
        }
        apply_events(&mut self.annotations, &events);
        for event in &events {
            match event {
                EditorEvent::AnnotationCompleted(a) => {
                    log::info!("Added {} '{}'", a.id, a.label);
                }
                EditorEvent::LabelChanged { id, label } => {
                    log::info!("Relabelled {} as '{}'", id, label);
                }
                EditorEvent::ImageLoadFailed(reason) => {
                    self.status = Some(format!("Image failed to load: {reason}"));
                }
                EditorEvent::AnnotationsUpdated(_) => {}
            }
        }
        self.refresh_score();
    }

    fn refresh_score(&mut self) {
        if let Some(round) = &self.round {
            self.live_score = round.live_score(&self.annotations);
        }
    }

    fn submit(&mut self) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.is_finished() {
            return;
        }
        let bonus = round.timer().time_bonus(self.config.max_time_bonus);
        round.finish(&self.annotations, bonus, &mut self.best);
        self.editor.set_disabled(true);
        if self.config.reveal_on_submit {
            self.editor.set_show_ground_truth(true);
        }
    }

    fn next_round(&mut self) {
        let count = self.deck.as_ref().map_or(0, |d| d.rounds.len());
        if count > 0 {
            self.start_round((self.round_index + 1) % count);
        }
    }

    fn open_deck(&mut self) {
        let dialog = rfd::FileDialog::new().add_filter("Scene deck", &["json"]);
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.load_deck(path);
    }

    fn load_deck(&mut self, path: PathBuf) {
        match SceneDeck::load(&path) {
            Ok(deck) => {
                self.deck = Some(deck);
                self.start_round(0);
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let Some(img) = self.pending_image.take() else {
            return;
        };
        let rgba = img.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let texture = ctx.load_texture("scene", color_image, egui::TextureOptions::LINEAR);
        self.texture = Some(texture);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open deck…").clicked() {
                self.open_deck();
            }
            ui.separator();

            let labels = self.editor.available_labels().to_vec();
            for label in &labels {
                let selected = self.editor.current_label() == label;
                if ui.selectable_label(selected, label).clicked() {
                    self.editor.set_current_label(label);
                }
            }
            ui.separator();

            let mut show = self.editor.show_ground_truth();
            if ui.checkbox(&mut show, "Show ground truth").changed() {
                self.editor.set_show_ground_truth(show);
            }
            ui.separator();

            let finished = self.round.as_ref().map_or(true, |r| r.is_finished());
            let submit = ui.add_enabled(!finished, egui::Button::new("Submit"));
            if submit.clicked() {
                self.submit();
            }
            if ui.button("Reset round").clicked() {
                self.start_round(self.round_index);
            }
            if ui.button("Next image").clicked() {
                self.next_round();
            }
            ui.separator();

            if let Some(round) = &self.round {
                let remaining = round.timer().remaining().as_secs();
                ui.label(format!("Time: {}:{:02}", remaining / 60, remaining % 60));
            }
            match self.best.best(GameMode::Annotate) {
                Some(best) => ui.label(format!("Best: {best}")),
                None => ui.label("Best: –"),
            };
        });
    }

    fn score_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Score");
        let outcome = self.round.as_ref().and_then(|r| r.outcome());
        let score = outcome.map_or(&self.live_score, |o| &o.score);

        ui.label(format!(
            "Found {} of {} · accuracy {}",
            score.found_count(),
            score.per_target.len(),
            score.normalized
        ));
        ui.separator();

        let grid = egui::Grid::new("label_breakdown").striped(true);
        grid.show(ui, |ui| {
            ui.strong("Label");
            ui.strong("Found");
            ui.strong("Best");
            ui.end_row();
            for summary in score.by_label() {
                ui.label(&summary.label);
                ui.label(format!("{}/{}", summary.found, summary.total));
                ui.label(summary.best.to_string());
                ui.end_row();
            }
        });

        if let Some(outcome) = outcome {
            ui.separator();
            ui.label(format!("Time bonus: +{}", outcome.time_bonus));
            ui.heading(format!("Final score: {}", outcome.final_score));
            if outcome.new_best {
                ui.colored_label(egui::Color32::GOLD, "New best!");
            }
        }

        if let Some(status) = &self.status {
            ui.separator();
            ui.colored_label(egui::Color32::LIGHT_RED, status);
        }
    }
}

impl eframe::App for ReefApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.editor.cancel();
        }

        if self.round.as_ref().is_some_and(|r| r.is_overdue()) {
            log::info!("Time is up");
            self.submit();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::SidePanel::right("score")
            .min_width(220.0)
            .show(ctx, |ui| self.score_panel(ui));

        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if self.deck.is_none() {
                    ui.centered_and_justified(|ui| ui.label("Open a scene deck to start playing."));
                    return Vec::new();
                }
                let targets = self.round.as_ref().map_or(&[][..], |r| r.targets());
                render::show_canvas(
                    ui,
                    &mut self.editor,
                    self.texture.as_ref(),
                    &self.annotations,
                    targets,
                )
            })
            .inner;
        self.handle_events(events);

        if self.round.as_ref().is_some_and(|r| !r.is_finished()) {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
