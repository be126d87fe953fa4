// error.rs: typed failures of the tour viewer

use std::path::PathBuf;
use thiserror::Error;

/// Why a scene asset could not be turned into pixels.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },

    #[error("failed to decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{url} contains no frames")]
    EmptyAnimation { url: String },

    #[error("{url} needs more than {budget_mb} MiB once decoded")]
    ClipTooLarge { url: String, budget_mb: u64 },

    #[error("scene kind {kind} is not supported")]
    UnsupportedKind { kind: &'static str },

    #[error("failed to start loader thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("room {room} lists scene id {scene} more than once")]
    DuplicateSceneId { room: String, scene: String },

    #[error("room {room} has a scene without a name")]
    UnnamedScene { room: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum FullscreenError {
    #[error("the platform refused the fullscreen change (requested fullscreen: {requested})")]
    Refused { requested: bool },
}
