// surface.rs: what the session needs from whatever draws the sphere

use crate::error::FullscreenError;
use glam::Mat4;
use image::RgbaImage;
use winit::window::Fullscreen;

/// The viewer-owned drawing target.
///
/// The GPU implementation is `renderer::SphereLayer`; tests use recording
/// doubles. `release` must be safe to call more than once.
pub trait SceneSurface {
    /// Replace the sphere's texture with `frame`.
    fn upload_frame(&mut self, frame: &RgbaImage);

    /// Drop the current texture and show the neutral placeholder colour.
    fn clear_frame(&mut self);

    fn set_opacity(&mut self, opacity: f32);

    /// Called once per render step, after the camera has been updated.
    fn set_camera(&mut self, view_proj: Mat4);

    /// Free GPU-side resources. Later calls are no-ops.
    fn release(&mut self);
}

/// Platform fullscreen switch.
pub trait FullscreenTarget {
    fn request_fullscreen(&self, on: bool) -> Result<(), FullscreenError>;
}

impl FullscreenTarget for winit::window::Window {
    fn request_fullscreen(&self, on: bool) -> Result<(), FullscreenError> {
        if on {
            self.set_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            self.set_fullscreen(None);
        }
        // The request is asynchronous on some platforms; only a state that
        // contradicts it right away counts as refused.
        if !on && self.fullscreen().is_some() {
            return Err(FullscreenError::Refused { requested: on });
        }
        if on && self.current_monitor().is_none() {
            self.set_fullscreen(None);
            return Err(FullscreenError::Refused { requested: on });
        }
        Ok(())
    }
}
