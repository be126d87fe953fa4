use glam::Mat4;
use image::RgbaImage;
use panorama_tour::config::ViewerConfig;
use panorama_tour::error::{AssetError, FullscreenError};
use panorama_tour::loader::{AssetLoader, LoadOutcome, LoadTicket, LoadedAsset};
use panorama_tour::media::{VideoClip, VideoFrame};
use panorama_tour::overlay::ViewerAction;
use panorama_tour::scene::PanoramaScene;
use panorama_tour::session::{SceneStatus, ViewerSession, Viewport};
use panorama_tour::surface::{FullscreenTarget, SceneSurface};
use panorama_tour::viewer::apply_action;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

// --- doubles ---

#[derive(Debug, Default)]
struct SurfaceLog {
    uploads: Vec<(u32, u32)>,
    clears: usize,
    opacity: Vec<f32>,
    camera_sets: usize,
    releases: usize,
}

#[derive(Clone, Default)]
struct RecordingSurface(Rc<RefCell<SurfaceLog>>);

impl SceneSurface for RecordingSurface {
    fn upload_frame(&mut self, frame: &RgbaImage) {
        self.0.borrow_mut().uploads.push(frame.dimensions());
    }

    fn clear_frame(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.0.borrow_mut().opacity.push(opacity);
    }

    fn set_camera(&mut self, _view_proj: Mat4) {
        self.0.borrow_mut().camera_sets += 1;
    }

    fn release(&mut self) {
        self.0.borrow_mut().releases += 1;
    }
}

#[derive(Default)]
struct LoaderState {
    requests: Vec<(LoadTicket, String)>,
    ready: VecDeque<LoadOutcome>,
}

#[derive(Clone, Default)]
struct ManualLoader(Rc<RefCell<LoaderState>>);

impl ManualLoader {
    fn requests(&self) -> Vec<(LoadTicket, String)> {
        self.0.borrow().requests.clone()
    }

    fn last_ticket(&self) -> LoadTicket {
        self.0.borrow().requests.last().unwrap().0
    }

    fn deliver(&self, ticket: LoadTicket, result: Result<LoadedAsset, AssetError>) {
        self.0.borrow_mut().ready.push_back(LoadOutcome { ticket, result });
    }
}

impl AssetLoader for ManualLoader {
    fn request(&mut self, ticket: LoadTicket, scene: &PanoramaScene) {
        self.0.borrow_mut().requests.push((ticket, scene.url.clone()));
    }

    fn poll(&mut self) -> Option<LoadOutcome> {
        self.0.borrow_mut().ready.pop_front()
    }
}

struct Screen {
    refuse: bool,
}

impl FullscreenTarget for Screen {
    fn request_fullscreen(&self, on: bool) -> Result<(), FullscreenError> {
        if self.refuse {
            Err(FullscreenError::Refused { requested: on })
        } else {
            Ok(())
        }
    }
}

// --- helpers ---

type TestSession = ViewerSession<RecordingSurface, ManualLoader>;

const FRAME: Duration = Duration::from_millis(16);

fn desktop() -> Viewport {
    Viewport {
        width: 1280,
        height: 720,
        scale_factor: 1.0,
    }
}

fn phone() -> Viewport {
    Viewport {
        width: 375,
        height: 667,
        scale_factor: 1.0,
    }
}

fn two_rooms() -> Vec<PanoramaScene> {
    vec![
        PanoramaScene::image("bedroom", "Bedroom", "bedroom.jpg"),
        PanoramaScene::image("bathroom", "Bathroom", "bathroom.jpg"),
    ]
}

fn open(
    scenes: Vec<PanoramaScene>,
    viewport: Viewport,
) -> (TestSession, RecordingSurface, ManualLoader) {
    let surface = RecordingSurface::default();
    let loader = ManualLoader::default();
    let session = ViewerSession::open(
        scenes,
        "Deluxe Room",
        ViewerConfig::default(),
        surface.clone(),
        loader.clone(),
        viewport,
    )
    .expect("non-empty scene list opens");
    (session, surface, loader)
}

fn still(w: u32, h: u32) -> Result<LoadedAsset, AssetError> {
    Ok(LoadedAsset::Still(RgbaImage::new(w, h)))
}

fn clip(frames: usize, delay_ms: u64) -> Result<LoadedAsset, AssetError> {
    Ok(LoadedAsset::Motion(VideoClip {
        frames: (0..frames)
            .map(|_| VideoFrame {
                image: RgbaImage::new(8, 4),
                delay: Duration::from_millis(delay_ms),
            })
            .collect(),
    }))
}

fn http_failure() -> Result<LoadedAsset, AssetError> {
    Err(AssetError::Http {
        url: "https://example.invalid/pano.jpg".into(),
        message: "connection refused".into(),
    })
}

/// Deliver the pending load and run frames until the fade settles.
fn settle(session: &mut TestSession, loader: &ManualLoader, asset: Result<LoadedAsset, AssetError>) {
    loader.deliver(loader.last_ticket(), asset);
    for _ in 0..40 {
        session.step(FRAME);
    }
}

// --- lifecycle ---

#[test]
fn open_starts_loading_first_scene() {
    let (session, surface, loader) = open(two_rooms(), desktop());
    assert_eq!(session.status(), SceneStatus::Loading);
    assert_eq!(session.active_index(), 0);
    assert_eq!(session.opacity(), 0.5);
    assert_eq!(surface.0.borrow().opacity.last(), Some(&0.5));
    assert_eq!(loader.requests().len(), 1);
    assert_eq!(loader.requests()[0].1, "bedroom.jpg");
    assert!(session.render_task().is_active());
}

#[test]
fn empty_scene_list_does_not_open() {
    let session: Option<TestSession> = ViewerSession::open(
        Vec::new(),
        "Nowhere",
        ViewerConfig::default(),
        RecordingSurface::default(),
        ManualLoader::default(),
        desktop(),
    );
    assert!(session.is_none());
}

#[test]
fn load_fades_from_half_to_full_then_idles() {
    let (mut session, surface, loader) = open(two_rooms(), desktop());
    loader.deliver(loader.last_ticket(), still(64, 32));

    assert!(session.step(FRAME));
    assert_eq!(session.status(), SceneStatus::Transitioning);
    assert_eq!(surface.0.borrow().uploads, vec![(64, 32)]);
    let mid = session.opacity();
    assert!(mid > 0.5 && mid < 1.0, "opacity {mid}");

    session.step(Duration::from_millis(300));
    assert_eq!(session.status(), SceneStatus::Idle);
    assert_eq!(session.opacity(), 1.0);

    let log = surface.0.borrow();
    assert!(log.opacity.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(log.camera_sets, 2);
}

#[test]
fn load_completion_recentres_camera() {
    let (mut session, _surface, loader) = open(two_rooms(), desktop());
    session.zoom_in();
    {
        let (input, camera, config) = session.input_mut();
        input.mouse_button(true);
        input.cursor_moved((0.0, 0.0), camera, config);
        input.cursor_moved((300.0, 120.0), camera, config);
        input.mouse_button(false);
    }
    loader.deliver(loader.last_ticket(), still(8, 4));
    session.step(FRAME);

    let camera = session.camera();
    assert_eq!(camera.lat, 0.0);
    assert_eq!(camera.fov, 100.0);
    assert!(camera.lon.abs() < 0.1);
}

// --- scene switching ---

#[test]
fn single_scene_tour_ignores_switching() {
    let (mut session, _surface, loader) =
        open(vec![PanoramaScene::image("only", "Suite", "suite.jpg")], phone());
    assert!(!session.can_switch_scenes());
    assert!(!session.next_scene());
    assert!(!session.previous_scene());
    assert!(!session.select_scene(0));
    assert!(!session.select_scene(3));
    assert_eq!(loader.requests().len(), 1);
}

#[test]
fn paging_wraps_both_ways() {
    let mut scenes = two_rooms();
    scenes.push(PanoramaScene::image("balcony", "Balcony", "balcony.jpg"));
    let (mut session, _surface, loader) = open(scenes, phone());

    assert!(session.previous_scene());
    assert_eq!(session.active_index(), 2);
    assert!(session.next_scene());
    assert_eq!(session.active_index(), 0);
    assert_eq!(loader.requests().len(), 3);
}

#[test]
fn selecting_the_active_scene_does_not_reload() {
    let (mut session, _surface, loader) = open(two_rooms(), desktop());
    assert!(!session.select_scene(0));
    assert_eq!(loader.requests().len(), 1);
}

#[test]
fn stale_load_result_is_dropped() {
    let (mut session, surface, loader) = open(two_rooms(), desktop());
    let first = loader.last_ticket();
    assert!(session.select_scene(1));
    let second = loader.last_ticket();
    assert_ne!(first, second);

    // The bedroom finishes after the user already moved on.
    loader.deliver(first, still(32, 16));
    session.step(FRAME);
    assert_eq!(session.status(), SceneStatus::Loading);
    assert!(surface.0.borrow().uploads.is_empty());

    loader.deliver(second, still(64, 32));
    session.step(FRAME);
    assert_eq!(session.status(), SceneStatus::Transitioning);
    assert_eq!(surface.0.borrow().uploads, vec![(64, 32)]);
}

#[test]
fn switching_video_scenes_keeps_one_clip_alive() {
    let scenes = vec![
        PanoramaScene::video("lobby", "Lobby", "lobby.gif"),
        PanoramaScene::video("pool", "Pool", "pool.gif"),
    ];
    let (mut session, _surface, loader) = open(scenes, desktop());
    settle(&mut session, &loader, clip(3, 40));
    assert!(session.has_playback());
    assert!(session.is_playing());

    session.select_scene(1);
    assert!(!session.has_playback());
    assert!(!session.is_playing());

    settle(&mut session, &loader, clip(2, 40));
    assert!(session.has_playback());
    assert!(session.is_playing());
}

#[test]
fn video_frames_advance_only_while_playing() {
    let (mut session, surface, loader) =
        open(vec![PanoramaScene::video("lobby", "Lobby", "lobby.gif")], desktop());
    loader.deliver(loader.last_ticket(), clip(2, 100));
    session.step(Duration::ZERO);
    assert_eq!(surface.0.borrow().uploads.len(), 1);

    session.step(Duration::from_millis(150));
    assert_eq!(surface.0.borrow().uploads.len(), 2);

    assert!(!session.toggle_playback());
    session.step(Duration::from_millis(500));
    assert_eq!(surface.0.borrow().uploads.len(), 2);

    assert!(session.toggle_playback());
}

#[test]
fn playback_toggle_is_inert_on_still_scenes() {
    let (mut session, _surface, loader) = open(two_rooms(), desktop());
    settle(&mut session, &loader, still(8, 4));
    assert!(!session.toggle_playback());
    assert!(!session.has_playback());
}

#[test]
fn streaming_scene_is_unavailable() {
    let streamed: PanoramaScene = serde_json::from_str(
        r#"{"id":"pool","name":"Pool","url":"https://www.youtube.com/watch?v=x","type":"youtube"}"#,
    )
    .unwrap();
    let (session, surface, loader) = open(vec![streamed], desktop());

    assert_eq!(session.status(), SceneStatus::Unavailable);
    assert!(loader.requests().is_empty());
    assert_eq!(session.opacity(), 1.0);
    assert_eq!(surface.0.borrow().clears, 1);
}

#[test]
fn failed_load_keeps_previous_frame() {
    let (mut session, surface, loader) = open(two_rooms(), desktop());
    settle(&mut session, &loader, still(64, 32));

    session.select_scene(1);
    loader.deliver(loader.last_ticket(), http_failure());
    session.step(FRAME);

    assert_eq!(session.status(), SceneStatus::Failed);
    assert!(!session.is_loading());
    assert!(!session.is_transitioning());
    assert_eq!(session.opacity(), 1.0);
    assert!(session.last_error().is_some_and(|e| e.contains("connection refused")));
    let log = surface.0.borrow();
    assert_eq!(log.uploads.len(), 1);
    assert_eq!(log.clears, 0);
}

// --- camera ---

#[test]
fn extreme_input_stays_clamped() {
    let (mut session, _surface, loader) = open(two_rooms(), desktop());
    settle(&mut session, &loader, still(8, 4));

    {
        let (input, camera, config) = session.input_mut();
        input.mouse_button(true);
        input.cursor_moved((0.0, 0.0), camera, config);
        input.cursor_moved((0.0, 1.0e6), camera, config);
        input.wheel(1.0e6, camera, config);
        assert_eq!(camera.target_lat, 85.0);
        assert_eq!(camera.target_fov, 120.0);

        input.cursor_moved((0.0, -1.0e6), camera, config);
        input.wheel(-1.0e6, camera, config);
        assert_eq!(camera.target_lat, -85.0);
        assert_eq!(camera.target_fov, 50.0);
    }

    for _ in 0..200 {
        session.step(FRAME);
        let camera = session.camera();
        assert!((-85.0..=85.0).contains(&camera.lat));
        assert!((50.0..=120.0).contains(&camera.fov));
    }
}

#[test]
fn zoom_buttons_step_and_clamp() {
    let (mut session, _surface, _loader) = open(two_rooms(), desktop());
    session.zoom_in();
    assert_eq!(session.camera().target_fov, 90.0);
    for _ in 0..20 {
        session.zoom_in();
    }
    assert_eq!(session.camera().target_fov, 50.0);
    for _ in 0..20 {
        session.zoom_out();
    }
    assert_eq!(session.camera().target_fov, 120.0);
}

#[test]
fn reset_restores_device_defaults_and_keeps_auto_rotate() {
    let (mut session, _surface, _loader) = open(two_rooms(), desktop());
    session.toggle_auto_rotate();
    session.zoom_out();
    {
        let (input, camera, config) = session.input_mut();
        input.mouse_button(true);
        input.cursor_moved((0.0, 0.0), camera, config);
        input.cursor_moved((40.0, 40.0), camera, config);
    }
    session.reset_view();

    let camera = session.camera();
    assert_eq!(camera.target_lon, 0.0);
    assert_eq!(camera.target_lat, 0.0);
    assert_eq!(camera.target_fov, 100.0);
    assert!(!session.auto_rotate());

    let (mut compact, _surface, _loader) = open(two_rooms(), phone());
    compact.zoom_in();
    compact.reset_view();
    assert_eq!(compact.camera().target_fov, 95.0);
    assert!(compact.auto_rotate());
}

#[test]
fn auto_rotate_pauses_while_dragging() {
    let (mut session, _surface, loader) = open(two_rooms(), desktop());
    settle(&mut session, &loader, still(8, 4));

    let before = session.camera().target_lon;
    session.step(FRAME);
    assert!((session.camera().target_lon - before - 0.03).abs() < 1e-4);

    {
        let (input, _camera, _config) = session.input_mut();
        input.mouse_button(true);
    }
    let held = session.camera().target_lon;
    session.step(FRAME);
    assert_eq!(session.camera().target_lon, held);

    session.toggle_auto_rotate();
    {
        let (input, _camera, _config) = session.input_mut();
        input.mouse_button(false);
    }
    session.step(FRAME);
    assert_eq!(session.camera().target_lon, held);
}

#[test]
fn drag_is_measured_in_logical_pixels() {
    let viewport = Viewport {
        width: 2560,
        height: 1440,
        scale_factor: 2.0,
    };
    let (mut session, _surface, _loader) = open(two_rooms(), viewport);
    let (input, camera, config) = session.input_mut();
    input.mouse_button(true);
    input.cursor_moved((0.0, 0.0), camera, config);
    input.cursor_moved((200.0, 0.0), camera, config);
    // 100 logical px at fov 100 and mouse factor 0.12.
    assert!((camera.target_lon + 12.0).abs() < 1e-3);
}

#[test]
fn resize_changes_device_class_but_not_orientation() {
    let (mut session, _surface, _loader) = open(two_rooms(), desktop());
    session.zoom_in();
    let target_fov = session.camera().target_fov;

    session.resize(Viewport {
        width: 0,
        height: 0,
        scale_factor: 1.0,
    });
    assert_eq!(session.viewport(), desktop());

    session.resize(phone());
    assert_eq!(session.device(), panorama_tour::camera::DeviceClass::Compact);
    assert_eq!(session.camera().target_fov, target_fov);
    session.reset_view();
    assert_eq!(session.camera().target_fov, 95.0);
}

// --- fullscreen ---

#[test]
fn fullscreen_refusal_leaves_session_windowed() {
    let (mut session, _surface, _loader) = open(two_rooms(), desktop());
    session.set_fullscreen(&Screen { refuse: true }, true);
    assert!(!session.is_fullscreen());

    let screen = Screen { refuse: false };
    session.toggle_fullscreen(&screen);
    assert!(session.is_fullscreen());
    session.toggle_fullscreen(&screen);
    assert!(!session.is_fullscreen());
}

// --- teardown ---

#[test]
fn close_is_idempotent_and_stops_the_render_step() {
    let (mut session, surface, loader) = open(two_rooms(), desktop());
    settle(&mut session, &loader, still(8, 4));
    let frames = surface.0.borrow().camera_sets;

    session.close();
    session.close();
    assert!(session.is_closed());
    assert!(!session.render_task().is_active());
    assert!(!session.step(FRAME));
    assert_eq!(surface.0.borrow().camera_sets, frames);
    assert_eq!(surface.0.borrow().releases, 1);

    drop(session);
    assert_eq!(surface.0.borrow().releases, 1);
}

#[test]
fn close_during_load_discards_the_late_result() {
    let (mut session, surface, loader) = open(two_rooms(), desktop());
    let ticket = loader.last_ticket();
    session.close();

    session.apply_outcome(LoadOutcome {
        ticket,
        result: still(64, 32),
    });
    assert!(!session.step(FRAME));
    assert!(surface.0.borrow().uploads.is_empty());
    assert!(!session.select_scene(1));
}

#[test]
fn close_releases_video_and_input() {
    let (mut session, _surface, loader) =
        open(vec![PanoramaScene::video("lobby", "Lobby", "lobby.gif")], desktop());
    settle(&mut session, &loader, clip(2, 40));
    {
        let (input, _camera, _config) = session.input_mut();
        input.mouse_button(true);
    }
    session.close();
    assert!(!session.has_playback());
    let (input, _camera, _config) = session.input_mut();
    assert!(!input.is_dragging());
}

#[test]
fn dropping_an_open_session_releases_the_surface() {
    let (session, surface, _loader) = open(two_rooms(), desktop());
    drop(session);
    assert_eq!(surface.0.borrow().releases, 1);
}

// --- actions ---

#[test]
fn overlay_actions_drive_the_session() {
    let (mut session, _surface, _loader) = open(two_rooms(), desktop());
    let screen = Screen { refuse: false };

    assert!(!apply_action(&mut session, ViewerAction::ZoomIn, &screen));
    assert_eq!(session.camera().target_fov, 90.0);
    assert!(!apply_action(&mut session, ViewerAction::SelectScene(1), &screen));
    assert_eq!(session.active_index(), 1);
    assert!(!apply_action(&mut session, ViewerAction::ToggleAutoRotate, &screen));
    assert!(!session.auto_rotate());
    assert!(apply_action(&mut session, ViewerAction::Close, &screen));
}
