// input.rs: pointer, touch and wheel input → camera targets

use crate::camera::CameraRig;
use crate::config::ViewerConfig;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

/// Pixels one wheel "line" is worth, matching what browsers report per notch.
const WHEEL_LINE_PX: f32 = 100.0;

/// Events that finish a gesture. These reach the tracker even when the UI
/// claimed them; a drag released over a panel must still end.
pub fn ends_gesture(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } => true,
        WindowEvent::CursorLeft { .. } => true,
        WindowEvent::Touch(touch) => {
            matches!(touch.phase, TouchPhase::Ended | TouchPhase::Cancelled)
        }
        _ => false,
    }
}

/// Tracks drag and pinch gestures between events.
///
/// Positions arrive in physical pixels and are converted to logical pixels
/// before they reach the camera, so sensitivity is DPI independent.
#[derive(Debug, Clone)]
pub struct InputTracker {
    scale_factor: f64,
    mouse_down: bool,
    cursor: Option<(f64, f64)>,
    touches: Vec<(u64, (f64, f64))>,
    pinch_distance: Option<f64>,
}

impl InputTracker {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
            mouse_down: false,
            cursor: None,
            touches: Vec::new(),
            pinch_distance: None,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Auto-rotation pauses while this is true.
    pub fn is_dragging(&self) -> bool {
        self.mouse_down || self.touches.len() == 1
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    /// Returns true when the event was a viewer gesture.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        camera: &mut CameraRig,
        config: &ViewerConfig,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } if *button == MouseButton::Left => {
                self.mouse_button(*state == ElementState::Pressed);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved((position.x, position.y), camera, config);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left();
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y / self.scale_factor) as f32,
                };
                self.wheel(delta_y, camera, config);
                true
            }
            WindowEvent::Touch(touch) => {
                let pos = (touch.location.x, touch.location.y);
                match touch.phase {
                    TouchPhase::Started => self.touch_started(touch.id, pos),
                    TouchPhase::Moved => self.touch_moved(touch.id, pos, camera, config),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.touch_ended(touch.id),
                }
                true
            }
            _ => false,
        }
    }

    pub fn mouse_button(&mut self, pressed: bool) {
        self.mouse_down = pressed;
    }

    pub fn cursor_moved(&mut self, pos: (f64, f64), camera: &mut CameraRig, config: &ViewerConfig) {
        if self.mouse_down {
            if let Some(last) = self.cursor {
                let (dx, dy) = self.logical_delta(last, pos);
                camera.apply_drag(dx, dy, config.mouse_sensitivity);
            }
        }
        self.cursor = Some(pos);
    }

    /// Leaving the surface ends a mouse drag.
    pub fn cursor_left(&mut self) {
        self.mouse_down = false;
        self.cursor = None;
    }

    pub fn wheel(&mut self, delta_y: f32, camera: &mut CameraRig, config: &ViewerConfig) {
        camera.apply_wheel(delta_y, config.wheel_factor);
    }

    pub fn touch_started(&mut self, id: u64, pos: (f64, f64)) {
        self.touches.retain(|(t, _)| *t != id);
        self.touches.push((id, pos));
        self.pinch_distance = self.two_finger_distance();
    }

    pub fn touch_moved(
        &mut self,
        id: u64,
        pos: (f64, f64),
        camera: &mut CameraRig,
        config: &ViewerConfig,
    ) {
        let Some(slot) = self.touches.iter().position(|(t, _)| *t == id) else {
            return;
        };
        let last = self.touches[slot].1;
        self.touches[slot].1 = pos;

        match self.touches.len() {
            1 => {
                let (dx, dy) = self.logical_delta(last, pos);
                camera.apply_drag(dx, dy, config.touch_sensitivity);
            }
            2 => {
                let Some(distance) = self.two_finger_distance() else {
                    return;
                };
                if let Some(previous) = self.pinch_distance {
                    let spread = ((distance - previous) / self.scale_factor) as f32;
                    camera.apply_pinch(spread, config.pinch_factor);
                }
                self.pinch_distance = Some(distance);
            }
            _ => {}
        }
    }

    pub fn touch_ended(&mut self, id: u64) {
        self.touches.retain(|(t, _)| *t != id);
        self.pinch_distance = self.two_finger_distance();
    }

    /// Drop every in-progress gesture.
    pub fn clear(&mut self) {
        self.mouse_down = false;
        self.cursor = None;
        self.touches.clear();
        self.pinch_distance = None;
    }

    fn two_finger_distance(&self) -> Option<f64> {
        match self.touches.as_slice() {
            [(_, a), (_, b)] => Some((a.0 - b.0).hypot(a.1 - b.1)),
            _ => None,
        }
    }

    fn logical_delta(&self, from: (f64, f64), to: (f64, f64)) -> (f32, f32) {
        (
            ((to.0 - from.0) / self.scale_factor) as f32,
            ((to.1 - from.1) / self.scale_factor) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DeviceClass;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, ModifiersState, Touch};

    fn setup(scale: f64) -> (InputTracker, CameraRig, ViewerConfig) {
        let config = ViewerConfig::default();
        let camera = CameraRig::new(&config, DeviceClass::Desktop);
        (InputTracker::new(scale), camera, config)
    }

    #[test]
    fn mouse_drag_only_while_pressed() {
        let (mut input, mut cam, config) = setup(1.0);
        input.cursor_moved((100.0, 100.0), &mut cam, &config);
        input.cursor_moved((150.0, 100.0), &mut cam, &config);
        assert_eq!(cam.target_lon, 0.0);

        input.mouse_button(true);
        assert!(input.is_dragging());
        input.cursor_moved((200.0, 110.0), &mut cam, &config);
        assert!((cam.target_lon + 50.0 * 0.12).abs() < 1e-4);
        assert!((cam.target_lat - 10.0 * 0.12).abs() < 1e-4);

        input.mouse_button(false);
        assert!(!input.is_dragging());
    }

    #[test]
    fn cursor_leave_ends_drag() {
        let (mut input, mut cam, config) = setup(1.0);
        input.mouse_button(true);
        input.cursor_moved((0.0, 0.0), &mut cam, &config);
        input.cursor_left();
        assert!(!input.is_dragging());
    }

    #[test]
    fn physical_pixels_are_scaled_to_logical() {
        let (mut input, mut cam, config) = setup(2.0);
        input.mouse_button(true);
        input.cursor_moved((0.0, 0.0), &mut cam, &config);
        input.cursor_moved((100.0, 0.0), &mut cam, &config);
        assert!((cam.target_lon + 50.0 * 0.12).abs() < 1e-4);
    }

    #[test]
    fn single_touch_drags_with_touch_sensitivity() {
        let (mut input, mut cam, config) = setup(1.0);
        input.touch_started(7, (10.0, 10.0));
        assert!(input.is_dragging());
        input.touch_moved(7, (30.0, 10.0), &mut cam, &config);
        assert!((cam.target_lon + 20.0 * 0.15).abs() < 1e-4);
        input.touch_ended(7);
        assert!(!input.is_dragging());
    }

    #[test]
    fn two_fingers_pinch_instead_of_drag() {
        let (mut input, mut cam, config) = setup(1.0);
        input.touch_started(1, (100.0, 100.0));
        input.touch_started(2, (300.0, 100.0));
        assert!(!input.is_dragging());

        // Fingers move together by 100px.
        input.touch_moved(2, (200.0, 100.0), &mut cam, &config);
        assert_eq!(cam.target_lon, 0.0);
        assert!((cam.target_fov - (100.0 - 100.0 * 0.06)).abs() < 1e-4);

        input.touch_ended(1);
        assert_eq!(input.active_touches(), 1);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let (mut input, mut cam, config) = setup(1.0);
        input.wheel(100.0, &mut cam, &config);
        assert!((cam.target_fov - 103.5).abs() < 1e-4);
    }

    fn device() -> DeviceId {
        // Safety: only compared, never handed back to the platform.
        unsafe { DeviceId::dummy() }
    }

    #[allow(deprecated)]
    fn left_button(state: ElementState) -> WindowEvent<'static> {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
            modifiers: ModifiersState::empty(),
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent<'static> {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id,
        })
    }

    #[test]
    fn only_gesture_endings_bypass_the_ui() {
        assert!(ends_gesture(&left_button(ElementState::Released)));
        assert!(!ends_gesture(&left_button(ElementState::Pressed)));
        assert!(ends_gesture(&touch(1, TouchPhase::Ended, 0.0, 0.0)));
        assert!(ends_gesture(&touch(1, TouchPhase::Cancelled, 0.0, 0.0)));
        assert!(!ends_gesture(&touch(1, TouchPhase::Moved, 0.0, 0.0)));
        assert!(ends_gesture(&WindowEvent::CursorLeft { device_id: device() }));
    }

    #[test]
    fn release_over_ui_still_ends_mouse_drag() {
        let (mut input, mut cam, config) = setup(1.0);
        input.handle_event(&left_button(ElementState::Pressed), &mut cam, &config);
        input.cursor_moved((10.0, 10.0), &mut cam, &config);
        assert!(input.is_dragging());

        // The host routes this even though the UI consumed it.
        let release = left_button(ElementState::Released);
        assert!(ends_gesture(&release));
        input.handle_event(&release, &mut cam, &config);
        assert!(!input.is_dragging());

        input.cursor_moved((300.0, 10.0), &mut cam, &config);
        assert_eq!(cam.target_lon, 0.0);
    }

    #[test]
    fn lifted_finger_over_ui_does_not_turn_next_drag_into_pinch() {
        let (mut input, mut cam, config) = setup(1.0);
        input.handle_event(&touch(1, TouchPhase::Started, 10.0, 10.0), &mut cam, &config);
        let lifted = touch(1, TouchPhase::Ended, 10.0, 10.0);
        assert!(ends_gesture(&lifted));
        input.handle_event(&lifted, &mut cam, &config);
        assert_eq!(input.active_touches(), 0);

        input.handle_event(&touch(2, TouchPhase::Started, 50.0, 50.0), &mut cam, &config);
        input.handle_event(&touch(2, TouchPhase::Moved, 70.0, 50.0), &mut cam, &config);
        assert!(input.is_dragging());
        assert!((cam.target_lon + 20.0 * 0.15).abs() < 1e-4);
        assert_eq!(cam.target_fov, 100.0);
    }

    #[test]
    fn unknown_touch_id_is_ignored() {
        let (mut input, mut cam, config) = setup(1.0);
        input.touch_moved(42, (5.0, 5.0), &mut cam, &config);
        assert_eq!(cam.target_lon, 0.0);
        assert_eq!(input.active_touches(), 0);
    }
}
