// session.rs: state of one open viewing, from open to teardown
//
// Per scene activation the status runs Loading -> Transitioning -> Idle.
// Failed and Unavailable are resting states like Idle, with a UI notice.
//
// Writers: input events and the control surface write camera *targets*;
// `step` is the only writer of the live camera values, opacity and playback
// clock.

use crate::camera::{CameraRig, DeviceClass};
use crate::config::ViewerConfig;
use crate::input::InputTracker;
use crate::loader::{AssetLoader, LoadOutcome, LoadTicket, LoadedAsset};
use crate::media::VideoPlayback;
use crate::scene::{MediaKind, PanoramaScene};
use crate::surface::{FullscreenTarget, SceneSurface};
use std::time::Duration;
use winit::event::WindowEvent;

/// Far plane relative to the sphere radius; keeps the whole sphere inside the frustum.
const FAR_PLANE_SCALE: f32 = 2.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    Loading,
    Transitioning,
    Idle,
    /// Last load failed; the previous frame (or placeholder) stays up.
    Failed,
    /// The scene kind cannot be shown.
    Unavailable,
}

/// Handle to the repeating render step. Cancelled on every teardown path.
#[derive(Debug, Default)]
pub struct RenderTask {
    frames: u64,
    cancelled: bool,
}

impl RenderTask {
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Size of the drawing area in physical pixels plus the DPI scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn logical_width(&self) -> f32 {
        (self.width as f64 / self.scale_factor.max(f64::EPSILON)) as f32
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

pub struct ViewerSession<S: SceneSurface, L: AssetLoader> {
    config: ViewerConfig,
    scenes: Vec<PanoramaScene>,
    title: String,
    active: usize,

    camera: CameraRig,
    input: InputTracker,
    device: DeviceClass,
    viewport: Viewport,

    status: SceneStatus,
    pending: Option<LoadTicket>,
    next_ticket: u64,
    opacity: f32,
    fade_from: f32,
    fade_elapsed: Duration,
    last_error: Option<String>,

    auto_rotate: bool,
    fullscreen: bool,
    playback: Option<VideoPlayback>,

    surface: S,
    loader: Option<L>,
    task: RenderTask,
    closed: bool,
}

impl<S: SceneSurface, L: AssetLoader> ViewerSession<S, L> {
    /// Start a session on the first scene. An empty scene list refuses to open.
    pub fn open(
        scenes: Vec<PanoramaScene>,
        title: impl Into<String>,
        config: ViewerConfig,
        surface: S,
        loader: L,
        viewport: Viewport,
    ) -> Option<Self> {
        if scenes.is_empty() {
            log::warn!("refusing to open the viewer without scenes");
            return None;
        }

        let device = DeviceClass::from_logical_width(viewport.logical_width(), &config);
        let camera = CameraRig::new(&config, device);
        let mut session = Self {
            scenes,
            title: title.into(),
            active: 0,
            camera,
            input: InputTracker::new(viewport.scale_factor),
            device,
            viewport,
            status: SceneStatus::Loading,
            pending: None,
            next_ticket: 0,
            opacity: config.loading_opacity,
            fade_from: config.loading_opacity,
            fade_elapsed: Duration::ZERO,
            last_error: None,
            auto_rotate: config.auto_rotate,
            fullscreen: false,
            playback: None,
            surface,
            loader: Some(loader),
            task: RenderTask::default(),
            closed: false,
            config,
        };
        log::info!(
            "viewer opened: {} ({} scenes)",
            session.title,
            session.scenes.len()
        );
        session.begin_load(0);
        Some(session)
    }

    // --- scene switching ---

    /// Returns false for the active scene, an out-of-range index or a closed session.
    pub fn select_scene(&mut self, index: usize) -> bool {
        if self.closed || index >= self.scenes.len() || index == self.active {
            return false;
        }
        self.active = index;
        log::info!(
            "{}",
            crate::i18n::tr_with("log.scene_switch", &[("name", self.scenes[index].name.clone())])
        );
        self.begin_load(index);
        true
    }

    pub fn next_scene(&mut self) -> bool {
        if self.scenes.len() < 2 {
            return false;
        }
        self.select_scene((self.active + 1) % self.scenes.len())
    }

    pub fn previous_scene(&mut self) -> bool {
        if self.scenes.len() < 2 {
            return false;
        }
        let n = self.scenes.len();
        self.select_scene((self.active + n - 1) % n)
    }

    fn begin_load(&mut self, index: usize) {
        // The old clip stops before anything new starts.
        if let Some(mut playback) = self.playback.take() {
            playback.release();
        }
        self.last_error = None;
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);

        let scene = &self.scenes[index];
        if scene.media_kind == MediaKind::YouTube {
            log::warn!("scene {} uses an unsupported streaming source", scene.id);
            self.pending = None;
            self.status = SceneStatus::Unavailable;
            self.opacity = 1.0;
            self.surface.clear_frame();
            self.surface.set_opacity(self.opacity);
            return;
        }

        self.pending = Some(ticket);
        self.status = SceneStatus::Loading;
        self.opacity = self.config.loading_opacity;
        self.surface.set_opacity(self.opacity);
        if let Some(loader) = self.loader.as_mut() {
            loader.request(ticket, scene);
        }
    }

    /// Apply a finished load. Outcomes for anything but the pending request are dropped.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) {
        if self.closed {
            return;
        }
        if self.pending != Some(outcome.ticket) {
            log::debug!("dropping stale load result {}", outcome.ticket.0);
            return;
        }
        self.pending = None;

        match outcome.result {
            Ok(LoadedAsset::Still(image)) => {
                self.surface.upload_frame(&image);
                self.enter_transition();
            }
            Ok(LoadedAsset::Motion(clip)) => {
                let playback = VideoPlayback::start(clip);
                if let Some(frame) = playback.current_frame() {
                    self.surface.upload_frame(frame);
                }
                self.playback = Some(playback);
                self.enter_transition();
            }
            Err(e) => {
                log::warn!("scene {} failed to load: {e}", self.scenes[self.active].id);
                self.status = SceneStatus::Failed;
                self.opacity = 1.0;
                self.surface.set_opacity(self.opacity);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn enter_transition(&mut self) {
        self.status = SceneStatus::Transitioning;
        self.fade_from = self.opacity;
        self.fade_elapsed = Duration::ZERO;
        self.camera.reset_immediate();
    }

    // --- render step ---

    /// One refresh-synchronised step. Returns false once the task is cancelled,
    /// in which case nothing was touched.
    pub fn step(&mut self, dt: Duration) -> bool {
        if !self.task.is_active() {
            return false;
        }

        while let Some(outcome) = self.loader.as_mut().and_then(|l| l.poll()) {
            self.apply_outcome(outcome);
        }

        if let Some(playback) = self.playback.as_mut() {
            if let Some(frame) = playback.advance(dt) {
                self.surface.upload_frame(frame);
            }
        }

        if self.status == SceneStatus::Transitioning {
            self.fade_elapsed += dt;
            let fade = Duration::from_millis(self.config.fade_ms);
            let t = if fade.is_zero() {
                1.0
            } else {
                (self.fade_elapsed.as_secs_f32() / fade.as_secs_f32()).min(1.0)
            };
            self.opacity = self.fade_from + (1.0 - self.fade_from) * t;
            if t >= 1.0 {
                self.opacity = 1.0;
                self.status = SceneStatus::Idle;
            }
        }
        self.surface.set_opacity(self.opacity);

        if self.auto_rotate && !self.input.is_dragging() {
            self.camera.advance_auto_rotate(self.config.auto_rotate_speed);
        }
        self.camera.interpolate_toward_targets();

        let far = self.config.sphere_radius * FAR_PLANE_SCALE;
        self.surface
            .set_camera(self.camera.view_proj(self.viewport.aspect(), far));
        self.task.frames += 1;
        true
    }

    // --- input and controls ---

    /// Feed a window event. Returns true when it was a viewer gesture.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if self.closed {
            return false;
        }
        if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
            self.input.set_scale_factor(*scale_factor);
            return false;
        }
        self.input.handle_event(event, &mut self.camera, &self.config)
    }

    /// Gesture tracker and camera, for driving input without window events.
    pub fn input_mut(&mut self) -> (&mut InputTracker, &mut CameraRig, &ViewerConfig) {
        (&mut self.input, &mut self.camera, &self.config)
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.auto_rotate = !self.auto_rotate;
    }

    /// Play/pause for video scenes. Returns the new playing state.
    pub fn toggle_playback(&mut self) -> bool {
        match self.playback.as_mut() {
            Some(p) if p.is_playing() => p.pause(),
            Some(p) => p.play(),
            None => return false,
        }
        self.is_playing()
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out(self.config.zoom_step);
    }

    /// Failures are logged and leave the session windowed.
    pub fn set_fullscreen(&mut self, target: &dyn FullscreenTarget, on: bool) {
        match target.request_fullscreen(on) {
            Ok(()) => self.fullscreen = on,
            Err(e) => {
                log::warn!("{e}");
                self.fullscreen = false;
            }
        }
    }

    pub fn toggle_fullscreen(&mut self, target: &dyn FullscreenTarget) {
        let on = !self.fullscreen;
        self.set_fullscreen(target, on);
    }

    /// Aspect and device class follow the new size; orientation and FOV do not change.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        self.viewport = viewport;
        self.input.set_scale_factor(viewport.scale_factor);
        self.device = DeviceClass::from_logical_width(viewport.logical_width(), &self.config);
        self.camera.set_device_class(self.device, &self.config);
    }

    // --- teardown ---

    /// Release everything the session acquired. Safe to call repeatedly and mid-load.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.task.cancel();
        self.input.clear();
        if let Some(mut playback) = self.playback.take() {
            playback.release();
        }
        self.pending = None;
        // Dropping the loader drops the channel; late results go nowhere.
        self.loader = None;
        self.surface.release();
        log::info!("viewer closed after {} frames", self.task.frames());
    }

    // --- accessors ---

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn scenes(&self) -> &[PanoramaScene] {
        &self.scenes
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_scene(&self) -> &PanoramaScene {
        &self.scenes[self.active]
    }

    pub fn can_switch_scenes(&self) -> bool {
        self.scenes.len() > 1
    }

    pub fn status(&self) -> SceneStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SceneStatus::Loading
    }

    pub fn is_transitioning(&self) -> bool {
        self.status == SceneStatus::Transitioning
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(VideoPlayback::is_playing)
    }

    pub fn has_playback(&self) -> bool {
        self.playback.is_some()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn render_task(&self) -> &RenderTask {
        &self.task
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: SceneSurface, L: AssetLoader> Drop for ViewerSession<S, L> {
    fn drop(&mut self) {
        self.close();
    }
}
