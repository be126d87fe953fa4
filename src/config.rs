// config.rs: viewer tuning constants
//
// Lookup order:
// - CLI: --config <path>
// - Env: TOUR_CONFIG
// - <exe_dir>/assets/viewer.json, then ./assets/viewer.json
// - built-in defaults
//
// Any field missing from the file keeps its default.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub fov_min: f32,
    pub fov_max: f32,
    pub default_fov: f32,
    /// Default FOV on compact viewports.
    pub compact_default_fov: f32,
    /// Logical width below which the viewport counts as compact.
    pub compact_width: f32,
    /// Latitude is kept inside ±this many degrees.
    pub latitude_limit: f32,

    pub auto_rotate: bool,
    /// Degrees of longitude per frame.
    pub auto_rotate_speed: f32,

    pub mouse_sensitivity: f32,
    pub touch_sensitivity: f32,
    pub pinch_factor: f32,
    pub wheel_factor: f32,
    pub zoom_step: f32,

    /// Fraction of the remaining distance covered per frame.
    pub smoothing: f32,
    pub fade_ms: u64,
    pub loading_opacity: f32,

    pub sphere_radius: f32,
    pub sphere_width_segments: usize,
    pub sphere_height_segments: usize,

    /// Whole-request limit for remote scene assets.
    pub fetch_timeout_secs: u64,
    /// Decoded size limit of one animated scene, all frames together.
    pub max_clip_mb: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_min: 50.0,
            fov_max: 120.0,
            default_fov: 100.0,
            compact_default_fov: 95.0,
            compact_width: 768.0,
            latitude_limit: 85.0,
            auto_rotate: true,
            auto_rotate_speed: 0.03,
            mouse_sensitivity: 0.12,
            touch_sensitivity: 0.15,
            pinch_factor: 0.06,
            wheel_factor: 0.035,
            zoom_step: 10.0,
            smoothing: 0.1,
            fade_ms: 300,
            loading_opacity: 0.5,
            sphere_radius: 500.0,
            sphere_width_segments: 60,
            sphere_height_segments: 40,
            fetch_timeout_secs: 30,
            max_clip_mb: 768,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolve from CLI/env/asset locations; falls back to defaults and logs why.
    pub fn resolve(cli_path: Option<&Path>) -> Self {
        let Some(path) = cli_path.map(Path::to_path_buf).or_else(find_config_file) else {
            log::info!("no viewer config found, using defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("viewer config loaded from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring viewer config: {err}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.fov_min > 0.0 && self.fov_min <= self.fov_max && self.fov_max < 180.0) {
            return invalid(format!(
                "fov range {}..{} must satisfy 0 < min <= max < 180",
                self.fov_min, self.fov_max
            ));
        }
        for (name, fov) in [
            ("default_fov", self.default_fov),
            ("compact_default_fov", self.compact_default_fov),
        ] {
            if !(self.fov_min..=self.fov_max).contains(&fov) {
                return invalid(format!(
                    "{name} {fov} lies outside {}..{}",
                    self.fov_min, self.fov_max
                ));
            }
        }
        if !(self.latitude_limit > 0.0 && self.latitude_limit < 90.0) {
            return invalid(format!(
                "latitude_limit {} must be inside (0, 90)",
                self.latitude_limit
            ));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return invalid(format!("smoothing {} must be inside (0, 1]", self.smoothing));
        }
        if !(0.0..=1.0).contains(&self.loading_opacity) {
            return invalid(format!(
                "loading_opacity {} must be inside [0, 1]",
                self.loading_opacity
            ));
        }
        if self.sphere_width_segments < 3 || self.sphere_height_segments < 2 {
            return invalid("sphere needs at least 3x2 segments".to_string());
        }
        if self.fetch_timeout_secs == 0 || self.max_clip_mb == 0 {
            return invalid("fetch_timeout_secs and max_clip_mb must be positive".to_string());
        }
        Ok(())
    }
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(v) = std::env::var("TOUR_CONFIG") {
        if !v.trim().is_empty() {
            return Some(PathBuf::from(v));
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join("viewer.json");
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join("viewer.json");
    p.exists().then_some(p)
}
