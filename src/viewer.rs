// viewer.rs: the panorama viewer component the host talks to
//
// Wraps at most one live `ViewerSession` on the GPU surface. Opening a new
// tour closes the previous one first.

use crate::config::ViewerConfig;
use crate::loader::{AssetLoader, BackgroundLoader, LoadLimits};
use crate::overlay::{self, OverlayModel, ViewerAction};
use crate::renderer::{Renderer, SphereLayer};
use crate::scene::PanoramaScene;
use crate::session::{ViewerSession, Viewport};
use crate::surface::{FullscreenTarget, SceneSurface};
use std::time::Duration;
use winit::event::{ElementState, VirtualKeyCode, WindowEvent};

pub type LiveSession = ViewerSession<SphereLayer, BackgroundLoader>;

/// Keyboard shortcuts understood while a viewer is open.
pub fn action_for_key(key: VirtualKeyCode) -> Option<ViewerAction> {
    use VirtualKeyCode::*;
    Some(match key {
        Escape => ViewerAction::Close,
        Space => ViewerAction::TogglePlayback,
        R => ViewerAction::ResetView,
        Plus | Equals | NumpadAdd => ViewerAction::ZoomIn,
        Minus | NumpadSubtract => ViewerAction::ZoomOut,
        Left => ViewerAction::PreviousScene,
        Right => ViewerAction::NextScene,
        F11 => ViewerAction::ToggleFullscreen,
        _ => return None,
    })
}

/// Carry out one action on the session. Returns true when the viewer should close.
pub fn apply_action<S: SceneSurface, L: AssetLoader>(
    session: &mut ViewerSession<S, L>,
    action: ViewerAction,
    target: &dyn FullscreenTarget,
) -> bool {
    match action {
        ViewerAction::SelectScene(i) => {
            session.select_scene(i);
        }
        ViewerAction::NextScene => {
            session.next_scene();
        }
        ViewerAction::PreviousScene => {
            session.previous_scene();
        }
        ViewerAction::ToggleAutoRotate => session.toggle_auto_rotate(),
        ViewerAction::TogglePlayback => {
            session.toggle_playback();
        }
        ViewerAction::ResetView => session.reset_view(),
        ViewerAction::ZoomIn => session.zoom_in(),
        ViewerAction::ZoomOut => session.zoom_out(),
        ViewerAction::ToggleFullscreen => session.toggle_fullscreen(target),
        ViewerAction::Close => return true,
    }
    false
}

pub struct PanoramaViewer {
    config: ViewerConfig,
    session: Option<LiveSession>,
}

impl PanoramaViewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Open a tour. Empty scene lists are refused and leave any open tour alone.
    pub fn open(
        &mut self,
        scenes: Vec<PanoramaScene>,
        title: impl Into<String>,
        renderer: &Renderer,
        viewport: Viewport,
        window: &dyn FullscreenTarget,
    ) -> bool {
        if scenes.is_empty() {
            log::warn!("tour has no scenes; viewer not opened");
            return false;
        }
        self.close(window);

        let layer = renderer.create_sphere_layer(&self.config);
        self.session = ViewerSession::open(
            scenes,
            title,
            self.config.clone(),
            layer,
            BackgroundLoader::with_limits(LoadLimits::from_config(&self.config)),
            viewport,
        );
        self.session.is_some()
    }

    /// Tear the session down. Leaves fullscreen if the viewer entered it.
    pub fn close(&mut self, window: &dyn FullscreenTarget) {
        if let Some(mut session) = self.session.take() {
            if session.is_fullscreen() {
                session.set_fullscreen(window, false);
            }
            session.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&LiveSession> {
        self.session.as_ref()
    }

    /// GPU layer to draw this frame, if any.
    pub fn layer(&self) -> Option<&SphereLayer> {
        self.session.as_ref().map(|s| s.surface())
    }

    /// Route a window event. Returns true when the viewer used it.
    pub fn handle_event(&mut self, event: &WindowEvent, window: &dyn FullscreenTarget) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if let WindowEvent::KeyboardInput { input, .. } = event {
            if input.state != ElementState::Pressed {
                return false;
            }
            let Some(action) = input.virtual_keycode.and_then(action_for_key) else {
                return false;
            };
            self.dispatch(&[action], window);
            return true;
        }

        session.handle_event(event)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(session) = self.session.as_mut() {
            session.resize(viewport);
        }
    }

    /// Advance the open session by one frame.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.session.as_mut().is_some_and(|s| s.step(dt))
    }

    pub fn show_overlay(&self, ctx: &egui::Context) -> Vec<ViewerAction> {
        match self.session.as_ref() {
            Some(session) => overlay::show(ctx, &OverlayModel::of(session)),
            None => Vec::new(),
        }
    }

    pub fn dispatch(&mut self, actions: &[ViewerAction], window: &dyn FullscreenTarget) {
        for &action in actions {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            if apply_action(session, action, window) {
                self.close(window);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_shortcuts() {
        assert_eq!(action_for_key(VirtualKeyCode::Escape), Some(ViewerAction::Close));
        assert_eq!(action_for_key(VirtualKeyCode::Space), Some(ViewerAction::TogglePlayback));
        assert_eq!(action_for_key(VirtualKeyCode::Equals), Some(ViewerAction::ZoomIn));
        assert_eq!(action_for_key(VirtualKeyCode::NumpadSubtract), Some(ViewerAction::ZoomOut));
        assert_eq!(action_for_key(VirtualKeyCode::Left), Some(ViewerAction::PreviousScene));
        assert_eq!(action_for_key(VirtualKeyCode::Right), Some(ViewerAction::NextScene));
        assert_eq!(action_for_key(VirtualKeyCode::O), None);
    }

    #[test]
    fn closed_viewer_ignores_everything() {
        struct NoScreen;
        impl FullscreenTarget for NoScreen {
            fn request_fullscreen(&self, _on: bool) -> Result<(), crate::error::FullscreenError> {
                Ok(())
            }
        }

        let mut viewer = PanoramaViewer::new(ViewerConfig::default());
        assert!(!viewer.is_open());
        assert!(!viewer.update(Duration::from_millis(16)));
        viewer.dispatch(&[ViewerAction::ZoomIn, ViewerAction::Close], &NoScreen);
        viewer.close(&NoScreen);
        assert!(viewer.layer().is_none());
        assert!(viewer.show_overlay(&egui::Context::default()).is_empty());
    }
}
