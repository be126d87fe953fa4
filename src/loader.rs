// loader.rs: off-thread scene asset loading
//
// Each request carries a `LoadTicket`. The session only accepts an outcome
// whose ticket matches the request it is waiting on, so late results from a
// scene the user already left are dropped.

use crate::config::ViewerConfig;
use crate::error::AssetError;
use crate::media::{VideoClip, VideoFrame};
use crate::scene::{MediaKind, PanoramaScene};
use image::codecs::gif::GifDecoder;
use image::io::Reader as ImageReader;
use image::{AnimationDecoder, ImageDecoder, RgbaImage};
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

#[derive(Debug)]
pub enum LoadedAsset {
    Still(RgbaImage),
    Motion(VideoClip),
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<LoadedAsset, AssetError>,
}

/// Bounds on a single load so abandoned or oversized assets cannot pile up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLimits {
    pub fetch_timeout: Duration,
    pub clip_budget_bytes: u64,
}

impl LoadLimits {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            clip_budget_bytes: config.max_clip_mb.saturating_mul(1024 * 1024),
        }
    }
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

pub trait AssetLoader {
    /// Start loading `scene`; the outcome is reported through `poll`.
    fn request(&mut self, ticket: LoadTicket, scene: &PanoramaScene);

    /// Next finished load, if any. Never blocks.
    fn poll(&mut self) -> Option<LoadOutcome>;
}

/// Spawns one worker thread per request.
///
/// Dropping the loader drops the receiver; workers that finish afterwards
/// fail to send and their result is discarded.
pub struct BackgroundLoader {
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
    limits: LoadLimits,
}

impl BackgroundLoader {
    pub fn new() -> Self {
        Self::with_limits(LoadLimits::default())
    }

    pub fn with_limits(limits: LoadLimits) -> Self {
        let (tx, rx) = channel();
        Self { tx, rx, limits }
    }
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for BackgroundLoader {
    fn request(&mut self, ticket: LoadTicket, scene: &PanoramaScene) {
        let tx = self.tx.clone();
        let url = scene.url.clone();
        let kind = scene.media_kind;
        let limits = self.limits;

        let spawned = thread::Builder::new()
            .name(format!("scene-loader-{}", ticket.0))
            .spawn(move || {
                log::info!(
                    "{}",
                    crate::i18n::tr_with("log.loading_scene", &[("url", url.clone())])
                );
                let result = load_scene_asset(&url, kind, &limits);
                match &result {
                    Ok(LoadedAsset::Still(img)) => log::info!(
                        "{}",
                        crate::i18n::tr_with(
                            "log.scene_loaded_size",
                            &[("w", img.width().to_string()), ("h", img.height().to_string())]
                        )
                    ),
                    Ok(LoadedAsset::Motion(clip)) => log::info!(
                        "{}",
                        crate::i18n::tr_with(
                            "log.video_loaded_frames",
                            &[("frames", clip.frames.len().to_string())]
                        )
                    ),
                    Err(e) => log::warn!("{e}"),
                }
                if tx.send(LoadOutcome { ticket, result }).is_err() {
                    log::debug!("viewer closed before load {} finished", ticket.0);
                }
            });

        if let Err(e) = spawned {
            let _ = self.tx.send(LoadOutcome {
                ticket,
                result: Err(AssetError::Spawn(e)),
            });
        }
    }

    fn poll(&mut self) -> Option<LoadOutcome> {
        self.rx.try_recv().ok()
    }
}

pub fn load_scene_asset(
    url: &str,
    kind: MediaKind,
    limits: &LoadLimits,
) -> Result<LoadedAsset, AssetError> {
    match kind {
        MediaKind::Image => {
            decode_still(url, read_asset_bytes(url, limits.fetch_timeout)?).map(LoadedAsset::Still)
        }
        MediaKind::Video => decode_motion(
            url,
            read_asset_bytes(url, limits.fetch_timeout)?,
            limits.clip_budget_bytes,
        )
        .map(LoadedAsset::Motion),
        MediaKind::YouTube => Err(AssetError::UnsupportedKind { kind: kind.label() }),
    }
}

fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout(timeout)
        .build()
}

fn fetch_http(agent: &ureq::Agent, url: &str) -> Result<Vec<u8>, AssetError> {
    let http_err = |message: String| AssetError::Http {
        url: url.to_string(),
        message,
    };
    let resp = agent.get(url).call().map_err(|e| http_err(e.to_string()))?;
    let mut bytes = Vec::new();
    resp.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| http_err(e.to_string()))?;
    Ok(bytes)
}

/// Local path, `file://` URL or `http(s)://` URL. Remote fetches give up after `timeout`.
pub fn read_asset_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>, AssetError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return fetch_http(&http_agent(timeout), url);
    }

    let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
    std::fs::read(&path).map_err(|source| AssetError::Io { path, source })
}

pub fn decode_still(url: &str, bytes: Vec<u8>) -> Result<RgbaImage, AssetError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Decode {
            url: url.to_string(),
            source,
        })
}

/// Animated panoramas are GIFs; every frame is decoded up front, as long as
/// the decoded clip fits in `budget_bytes`.
pub fn decode_motion(url: &str, bytes: Vec<u8>, budget_bytes: u64) -> Result<VideoClip, AssetError> {
    let decode_err = |source| AssetError::Decode {
        url: url.to_string(),
        source,
    };
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
    let (width, height) = decoder.dimensions();
    let frame_bytes = u64::from(width) * u64::from(height) * 4;

    let mut frames = Vec::new();
    let mut used = 0u64;
    for frame in decoder.into_frames() {
        // Checked before decoding so an oversized clip never gets allocated.
        used += frame_bytes;
        if used > budget_bytes {
            return Err(AssetError::ClipTooLarge {
                url: url.to_string(),
                budget_mb: budget_bytes / (1024 * 1024),
            });
        }
        let frame = frame.map_err(decode_err)?;
        let (numer, denom) = frame.delay().numer_denom_ms();
        frames.push(VideoFrame {
            delay: Duration::from_micros(u64::from(numer) * 1000 / u64::from(denom.max(1))),
            image: frame.into_buffer(),
        });
    }

    if frames.is_empty() {
        return Err(AssetError::EmptyAnimation {
            url: url.to_string(),
        });
    }
    Ok(VideoClip { frames })
}
