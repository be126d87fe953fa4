// overlay.rs: egui control surface drawn over the sphere while a viewer is open
//
// The overlay only reads a snapshot of the session and reports what was
// clicked; `viewer::apply_action` carries the clicks out.

use crate::i18n::{tr, tr_with};
use crate::loader::AssetLoader;
use crate::scene::PanoramaScene;
use crate::session::{SceneStatus, ViewerSession};
use crate::surface::SceneSurface;
use crate::camera::DeviceClass;
use egui::{Align2, Color32, RichText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    SelectScene(usize),
    NextScene,
    PreviousScene,
    ToggleAutoRotate,
    TogglePlayback,
    ResetView,
    ZoomIn,
    ZoomOut,
    ToggleFullscreen,
    Close,
}

/// What the overlay needs to know about the session for one frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayModel<'a> {
    pub title: &'a str,
    pub scenes: &'a [PanoramaScene],
    pub active: usize,
    pub status: SceneStatus,
    pub device: DeviceClass,
    pub auto_rotate: bool,
    pub has_playback: bool,
    pub is_playing: bool,
    pub fullscreen: bool,
    pub error: Option<&'a str>,
}

impl<'a> OverlayModel<'a> {
    pub fn of<S: SceneSurface, L: AssetLoader>(session: &'a ViewerSession<S, L>) -> Self {
        Self {
            title: session.title(),
            scenes: session.scenes(),
            active: session.active_index(),
            status: session.status(),
            device: session.device(),
            auto_rotate: session.auto_rotate(),
            has_playback: session.has_playback(),
            is_playing: session.is_playing(),
            fullscreen: session.is_fullscreen(),
            error: session.last_error(),
        }
    }

    fn compact(&self) -> bool {
        self.device == DeviceClass::Compact
    }

    /// The switcher is hidden for single-scene tours.
    pub fn shows_scene_switcher(&self) -> bool {
        self.scenes.len() > 1
    }

    pub fn shows_paging(&self) -> bool {
        self.shows_scene_switcher() && self.compact()
    }

    /// Play/pause only makes sense for a video scene that actually loaded.
    pub fn shows_playback_toggle(&self) -> bool {
        self.has_playback && self.scenes.get(self.active).is_some_and(PanoramaScene::is_video)
    }

    pub fn hint_key(&self) -> &'static str {
        if self.compact() {
            "viewer.hint.compact"
        } else {
            "viewer.hint.desktop"
        }
    }

    pub fn counter_text(&self) -> String {
        tr_with(
            "viewer.scene_counter",
            &[
                ("current", (self.active + 1).to_string()),
                ("total", self.scenes.len().to_string()),
            ],
        )
    }
}

const PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(10, 10, 12, 200);
const ACCENT: Color32 = Color32::from_rgb(212, 175, 55);

fn panel_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(PANEL_FILL)
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
}

/// Draw the overlay and return the actions the user triggered this frame.
pub fn show(ctx: &egui::Context, model: &OverlayModel<'_>) -> Vec<ViewerAction> {
    let mut actions = Vec::new();

    egui::Area::new(egui::Id::new("viewer_header"))
        .anchor(Align2::LEFT_TOP, egui::vec2(16.0, 40.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.label(RichText::new(model.title).heading().color(Color32::WHITE));
                ui.label(RichText::new(tr("viewer.subtitle")).color(ACCENT));
            });
        });

    egui::Area::new(egui::Id::new("viewer_controls"))
        .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 40.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| control_buttons(ui, model, &mut actions));
            });
        });

    if model.shows_scene_switcher() {
        egui::Area::new(egui::Id::new("viewer_scenes"))
            .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -56.0))
            .show(ctx, |ui| {
                panel_frame().show(ui, |ui| {
                    ui.horizontal(|ui| scene_switcher(ui, model, &mut actions));
                });
            });
    }

    match model.status {
        SceneStatus::Loading => {
            egui::Area::new(egui::Id::new("viewer_loading"))
                .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    panel_frame().show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.spinner();
                            ui.label(RichText::new(tr("viewer.loading")).color(Color32::WHITE));
                        });
                    });
                });
        }
        SceneStatus::Unavailable | SceneStatus::Failed => {
            let key = if model.status == SceneStatus::Unavailable {
                "viewer.unavailable"
            } else {
                "viewer.load_failed"
            };
            egui::Area::new(egui::Id::new("viewer_notice"))
                .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    panel_frame().show(ui, |ui| {
                        ui.label(RichText::new(tr(key)).color(Color32::LIGHT_RED));
                        if let Some(detail) = model.error {
                            ui.label(RichText::new(detail).small().color(Color32::GRAY));
                        }
                    });
                });
        }
        SceneStatus::Transitioning | SceneStatus::Idle => {}
    }

    egui::Area::new(egui::Id::new("viewer_hint"))
        .anchor(Align2::LEFT_BOTTOM, egui::vec2(16.0, -40.0))
        .show(ctx, |ui| {
            ui.label(RichText::new(tr(model.hint_key())).small().color(Color32::GRAY));
        });

    actions
}

/// One button in the control strip. Labels are plain text so they render
/// with whatever UI font is installed.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: String,
    pub hover: Option<String>,
    pub selected: Option<bool>,
    pub action: ViewerAction,
}

impl Control {
    fn new(label: impl Into<String>, action: ViewerAction) -> Self {
        Self {
            label: label.into(),
            hover: None,
            selected: None,
            action,
        }
    }
}

pub fn control_entries(model: &OverlayModel<'_>) -> Vec<Control> {
    let rotate_key = if model.auto_rotate {
        "viewer.auto_rotate.stop"
    } else {
        "viewer.auto_rotate.start"
    };
    let mut out = vec![Control {
        selected: Some(model.auto_rotate),
        ..Control::new(tr(rotate_key), ViewerAction::ToggleAutoRotate)
    }];

    if model.shows_playback_toggle() {
        let key = if model.is_playing { "viewer.pause" } else { "viewer.play" };
        out.push(Control::new(tr(key), ViewerAction::TogglePlayback));
    }

    out.push(Control::new(tr("viewer.reset"), ViewerAction::ResetView));
    out.push(Control {
        hover: Some(tr("viewer.zoom_in")),
        ..Control::new("+", ViewerAction::ZoomIn)
    });
    out.push(Control {
        hover: Some(tr("viewer.zoom_out")),
        ..Control::new("-", ViewerAction::ZoomOut)
    });

    let fullscreen_key = if model.fullscreen {
        "viewer.fullscreen.exit"
    } else {
        "viewer.fullscreen.enter"
    };
    out.push(Control::new(tr(fullscreen_key), ViewerAction::ToggleFullscreen));
    out.push(Control::new(tr("viewer.close"), ViewerAction::Close));
    out
}

fn control_buttons(ui: &mut egui::Ui, model: &OverlayModel<'_>, actions: &mut Vec<ViewerAction>) {
    for control in control_entries(model) {
        if control.action == ViewerAction::Close {
            ui.separator();
        }
        let mut response = match control.selected {
            Some(on) => ui.selectable_label(on, &control.label),
            None => ui.button(&control.label),
        };
        if let Some(hover) = &control.hover {
            response = response.on_hover_text(hover);
        }
        if response.clicked() {
            actions.push(control.action);
        }
    }
}

const PAGE_PREVIOUS: &str = "<";
const PAGE_NEXT: &str = ">";

fn scene_switcher(ui: &mut egui::Ui, model: &OverlayModel<'_>, actions: &mut Vec<ViewerAction>) {
    if model.shows_paging() {
        if ui.button(PAGE_PREVIOUS).clicked() {
            actions.push(ViewerAction::PreviousScene);
        }
        let scene = &model.scenes[model.active];
        ui.label(
            RichText::new(format!("{} {}", scene.icon(), scene.name)).color(Color32::WHITE),
        );
        ui.label(RichText::new(model.counter_text()).small().color(Color32::GRAY));
        if ui.button(PAGE_NEXT).clicked() {
            actions.push(ViewerAction::NextScene);
        }
        return;
    }

    for (i, scene) in model.scenes.iter().enumerate() {
        let text = format!("{} {}", scene.icon(), scene.name);
        if ui.selectable_label(i == model.active, text).clicked() && i != model.active {
            actions.push(ViewerAction::SelectScene(i));
        }
    }
}
