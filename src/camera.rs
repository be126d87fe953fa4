// camera.rs: orbit-in-place camera with input-driven targets and smoothed live values

use crate::config::ViewerConfig;
use glam::{Mat4, Vec3};

/// Near plane distance; the camera sits at the sphere centre.
pub const NEAR_PLANE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    /// Narrow viewport, touch-first layout.
    Compact,
}

impl DeviceClass {
    pub fn from_logical_width(width: f32, config: &ViewerConfig) -> Self {
        if width < config.compact_width {
            DeviceClass::Compact
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn default_fov(self, config: &ViewerConfig) -> f32 {
        match self {
            DeviceClass::Desktop => config.default_fov,
            DeviceClass::Compact => config.compact_default_fov,
        }
    }
}

/// Camera orientation in degrees.
///
/// Longitude runs free and is only reduced through `sin`/`cos`; latitude and
/// FOV are clamped both when a target is set and after every interpolation.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub lon: f32,
    pub lat: f32,
    pub fov: f32,
    pub target_lon: f32,
    pub target_lat: f32,
    pub target_fov: f32,

    fov_min: f32,
    fov_max: f32,
    lat_limit: f32,
    smoothing: f32,
    default_fov: f32,
}

impl CameraRig {
    pub fn new(config: &ViewerConfig, device: DeviceClass) -> Self {
        let default_fov = device.default_fov(config);
        Self {
            lon: 0.0,
            lat: 0.0,
            fov: default_fov,
            target_lon: 0.0,
            target_lat: 0.0,
            target_fov: default_fov,
            fov_min: config.fov_min,
            fov_max: config.fov_max,
            lat_limit: config.latitude_limit,
            smoothing: config.smoothing,
            default_fov,
        }
    }

    pub fn fov_range(&self) -> (f32, f32) {
        (self.fov_min, self.fov_max)
    }

    /// Changes the default used by `reset`; does not move the camera.
    pub fn set_device_class(&mut self, device: DeviceClass, config: &ViewerConfig) {
        self.default_fov = device.default_fov(config);
    }

    fn clamp_lat(&self, lat: f32) -> f32 {
        lat.clamp(-self.lat_limit, self.lat_limit)
    }

    fn clamp_fov(&self, fov: f32) -> f32 {
        fov.clamp(self.fov_min, self.fov_max)
    }

    /// Drag by `(dx, dy)` logical pixels. `k` is the mouse or touch factor;
    /// the per-pixel angle grows with the current FOV.
    pub fn apply_drag(&mut self, dx: f32, dy: f32, k: f32) {
        let sensitivity = (self.fov / 100.0) * k;
        self.target_lon -= dx * sensitivity;
        self.target_lat = self.clamp_lat(self.target_lat + dy * sensitivity);
    }

    /// `spread` is how much the finger distance grew since the last sample.
    /// Fingers moving together narrow the FOV.
    pub fn apply_pinch(&mut self, spread: f32, factor: f32) {
        self.target_fov = self.clamp_fov(self.target_fov + spread * factor);
    }

    /// `delta_y` follows the browser convention: positive scrolls down and zooms out.
    pub fn apply_wheel(&mut self, delta_y: f32, factor: f32) {
        self.target_fov = self.clamp_fov(self.target_fov + delta_y * factor);
    }

    pub fn zoom_in(&mut self, step: f32) {
        self.target_fov = self.clamp_fov(self.target_fov - step);
    }

    pub fn zoom_out(&mut self, step: f32) {
        self.target_fov = self.clamp_fov(self.target_fov + step);
    }

    pub fn reset(&mut self) {
        self.target_lon = 0.0;
        self.target_lat = 0.0;
        self.target_fov = self.default_fov;
    }

    /// Reset targets and jump the live values there too.
    pub fn reset_immediate(&mut self) {
        self.reset();
        self.lon = self.target_lon;
        self.lat = self.target_lat;
        self.fov = self.target_fov;
    }

    pub fn advance_auto_rotate(&mut self, step_deg: f32) {
        self.target_lon += step_deg;
    }

    pub fn interpolate_toward_targets(&mut self) {
        // Shift both by whole turns so small steps stay representable in f32.
        if self.lon.abs() > 360.0 {
            let turns = (self.lon / 360.0).trunc() * 360.0;
            self.lon -= turns;
            self.target_lon -= turns;
        }

        self.lon = approach(self.lon, self.target_lon, self.smoothing);
        self.lat = approach(self.lat, self.target_lat, self.smoothing);
        self.fov = approach(self.fov, self.target_fov, self.smoothing);

        self.lat = self.clamp_lat(self.lat);
        self.fov = self.clamp_fov(self.fov);
    }

    /// Unit vector the camera looks along (Y up).
    pub fn look_direction(&self) -> Vec3 {
        let phi = (90.0 - self.lat).to_radians();
        let theta = self.lon.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
    }

    pub fn view_proj(&self, aspect: f32, far: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov.to_radians(), aspect.max(1e-3), NEAR_PLANE, far);
        let view = Mat4::look_at_rh(Vec3::ZERO, self.look_direction(), Vec3::Y);
        proj * view
    }
}

fn approach(current: f32, target: f32, t: f32) -> f32 {
    let next = current + (target - current) * t;
    if (target - next).abs() < 1e-4 {
        target
    } else {
        next
    }
}
