// app.rs: host shell around the room catalog and the viewer

use crate::catalog::{Catalog, Room};
use crate::i18n::{tr, tr_with, LANGUAGES};
use crate::renderer::Renderer;
use crate::scene::{MediaKind, PanoramaScene};
use crate::session::Viewport;
use crate::viewer::PanoramaViewer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::event::{ElementState, VirtualKeyCode, WindowEvent};
use winit::window::{Fullscreen, Window};

const PANORAMA_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "webp", "gif"];

/// Frames-per-second over one-second windows.
#[derive(Debug)]
pub struct FpsCounter {
    frames: u32,
    since: Instant,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            since: now,
            fps: 0.0,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.duration_since(self.since).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.since = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Single-scene tour for a panorama picked from disk. GIFs play as video scenes.
pub fn local_tour(path: &Path) -> (Vec<PanoramaScene>, String) {
    let url = path.to_string_lossy().into_owned();
    let name = tr("catalog.local_tour");
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    let scene = if is_gif {
        PanoramaScene::video("local", name, url)
    } else {
        PanoramaScene::image("local", name, url)
    };
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| scene.name.clone());
    (vec![scene], title)
}

/// Something the host UI asked for; handled after the frame is drawn.
#[derive(Debug, Clone, PartialEq)]
enum HostRequest {
    OpenRoom(String),
    OpenFile(PathBuf),
    Exit,
}

pub struct App {
    window: Arc<Window>,
    renderer: Renderer,
    catalog: Catalog,
    viewer: PanoramaViewer,
    show_fps: bool,
    current_lang: String,
    fps: FpsCounter,
    last_frame: Instant,
    exit_requested: bool,
}

impl App {
    pub fn new(
        window: Arc<Window>,
        renderer: Renderer,
        catalog: Catalog,
        viewer: PanoramaViewer,
    ) -> Self {
        let now = Instant::now();
        Self {
            window,
            renderer,
            catalog,
            viewer,
            show_fps: false,
            current_lang: crate::i18n::current_lang(),
            fps: FpsCounter::new(now),
            last_frame: now,
            exit_requested: false,
        }
    }

    pub fn viewer_open(&self) -> bool {
        self.viewer.is_open()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.renderer.size.width,
            height: self.renderer.size.height,
            scale_factor: self.window.scale_factor(),
        }
    }

    /// Open a room's tour. Rooms without scenes never open a viewer.
    pub fn open_room(&mut self, id: &str) -> bool {
        let Some(room) = self.catalog.room(id) else {
            log::warn!("unknown room {id}");
            return false;
        };
        if !room.has_tour() {
            log::info!("room {id} has no panorama scenes");
            return false;
        }
        let (scenes, title) = (room.panorama_scenes.clone(), room.name.clone());
        let viewport = self.viewport();
        self.viewer.open(scenes, title, &self.renderer, viewport, self.window.as_ref())
    }

    pub fn open_file(&mut self, path: PathBuf) -> bool {
        let (scenes, title) = local_tour(&path);
        let viewport = self.viewport();
        self.viewer.open(scenes, title, &self.renderer, viewport, self.window.as_ref())
    }

    fn pick_file(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(tr("file.filter.images"), &PANORAMA_EXTENSIONS)
            .pick_file()
    }

    /// Returns true when the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let response = self.renderer.egui_state.on_event(&self.renderer.egui_ctx, event);
        if response.consumed {
            if crate::input::ends_gesture(event) {
                self.viewer.handle_event(event, self.window.as_ref());
            }
            return true;
        }

        match event {
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                let viewport = self.viewport();
                self.viewer.resize(viewport);
                true
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                self.renderer.resize(**new_inner_size);
                self.viewer.handle_event(event, self.window.as_ref());
                let viewport = self.viewport();
                self.viewer.resize(viewport);
                true
            }
            WindowEvent::DroppedFile(path) => self.open_file(path.clone()),
            WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
                if self.viewer.handle_event(event, self.window.as_ref()) {
                    return true;
                }
                match input.virtual_keycode {
                    Some(VirtualKeyCode::O) => {
                        if let Some(path) = self.pick_file() {
                            self.open_file(path);
                        }
                        true
                    }
                    Some(VirtualKeyCode::F11) => {
                        let on = self.window.fullscreen().is_none();
                        self.window
                            .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
                        true
                    }
                    _ => false,
                }
            }
            _ => self.viewer.handle_event(event, self.window.as_ref()),
        }
    }

    /// One frame: step the viewer, draw sphere and UI, then apply what was clicked.
    pub fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        self.fps.tick(now);
        let dt = now.duration_since(self.last_frame).min(Duration::from_millis(250));
        self.last_frame = now;
        self.viewer.update(dt);

        let mut requests = Vec::new();
        let mut actions = Vec::new();
        let mut show_fps = self.show_fps;
        let mut lang = self.current_lang.clone();
        let fps = self.fps.fps();

        let viewer = &self.viewer;
        let catalog = &self.catalog;
        let result = self.renderer.render_with_ui(&self.window, viewer.layer(), |ctx| {
            menu_bar(ctx, &mut requests, &mut show_fps, &mut lang);
            status_bar(ctx, viewer, show_fps, fps);
            if viewer.is_open() {
                actions = viewer.show_overlay(ctx);
            } else {
                catalog_panel(ctx, catalog, &mut requests);
            }
        });

        self.show_fps = show_fps;
        if lang != self.current_lang {
            crate::i18n::init(lang.clone());
            self.window.set_title(&tr("app.title"));
            self.current_lang = lang;
        }

        self.viewer.dispatch(&actions, self.window.as_ref());
        for request in requests {
            match request {
                HostRequest::OpenRoom(id) => {
                    self.open_room(&id);
                }
                HostRequest::OpenFile(path) => {
                    self.open_file(path);
                }
                HostRequest::Exit => self.exit_requested = true,
            }
        }

        result
    }

    pub fn handle_render_error(&mut self, err: wgpu::SurfaceError) {
        match err {
            wgpu::SurfaceError::Lost => self.renderer.resize(self.renderer.size),
            wgpu::SurfaceError::OutOfMemory => self.exit_requested = true,
            e => log::warn!("render error: {e:?}"),
        }
    }

    pub fn shutdown(&mut self) {
        self.viewer.close(self.window.as_ref());
    }
}

fn menu_bar(
    ctx: &egui::Context,
    requests: &mut Vec<HostRequest>,
    show_fps: &mut bool,
    current_lang: &mut String,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter(tr("file.filter.images"), &PANORAMA_EXTENSIONS)
                        .pick_file()
                    {
                        requests.push(HostRequest::OpenFile(path));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    requests.push(HostRequest::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.checkbox(show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in LANGUAGES {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        ui.close_menu();
                    }
                }
            });
        });
    });
}

fn status_bar(ctx: &egui::Context, viewer: &PanoramaViewer, show_fps: bool, fps: f32) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match viewer.session() {
                Some(session) => {
                    let camera = session.camera();
                    ui.label(format!("FOV: {:.1}°", camera.fov));
                    ui.label("|");
                    ui.label(format!("{}: {:.1}°", tr("status.lon"), camera.lon));
                    ui.label("|");
                    ui.label(format!("{}: {:.1}°", tr("status.lat"), camera.lat));
                }
                None => {
                    ui.label(tr("status.idle"));
                }
            }

            if show_fps {
                ui.label("|");
                ui.label(egui::RichText::new(format!("FPS: {fps:.1}")).color(egui::Color32::GREEN));
            }
        });
    });
}

/// Featured rooms first, then the rest in catalog order.
fn display_order(catalog: &Catalog) -> impl Iterator<Item = &Room> {
    let others = catalog.rooms().iter().filter(|r| !r.featured);
    catalog.featured().chain(others)
}

fn catalog_panel(ctx: &egui::Context, catalog: &Catalog, requests: &mut Vec<HostRequest>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading(tr("catalog.heading"));
        ui.add_space(8.0);
        egui::ScrollArea::vertical().show(ui, |ui| {
            for room in display_order(catalog) {
                room_card(ui, room, requests);
                ui.add_space(8.0);
            }
        });
    });
}

fn room_card(ui: &mut egui::Ui, room: &Room, requests: &mut Vec<HostRequest>) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&room.name).strong().size(18.0));
            if room.featured {
                ui.label(
                    egui::RichText::new(tr("catalog.featured"))
                        .small()
                        .color(egui::Color32::from_rgb(212, 175, 55)),
                );
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(tr_with("catalog.price", &[("price", room.price.to_string())]));
            });
        });
        let description = ui.label(&room.description);
        if !room.long_description.is_empty() {
            description.on_hover_text(&room.long_description);
        }
        ui.label(
            egui::RichText::new(tr_with(
                "catalog.facts",
                &[
                    ("size", room.size.to_string()),
                    ("guests", room.capacity.to_string()),
                    ("bed", room.bed_type.clone()),
                ],
            ))
            .small(),
        );
        if !room.amenities.is_empty() {
            ui.label(egui::RichText::new(room.amenities.join(" · ")).small().weak());
        }

        if room.has_tour() {
            ui.horizontal(|ui| {
                if ui.button(tr("catalog.tour")).clicked() {
                    requests.push(HostRequest::OpenRoom(room.id.clone()));
                }
                let count = room.panorama_scenes.len();
                let kinds: Vec<&str> = room
                    .panorama_scenes
                    .iter()
                    .filter(|s| s.media_kind != MediaKind::Image)
                    .map(|s| s.media_kind.label())
                    .collect();
                let mut text = tr_with("catalog.tour_scenes", &[("count", count.to_string())]);
                if !kinds.is_empty() {
                    text = format!("{text} ({})", kinds.join(", "));
                }
                ui.label(egui::RichText::new(text).small().weak());
            });
        }
    });
}
