// media.rs: decoded motion panoramas and their playback clock

use image::RgbaImage;
use std::time::Duration;

/// Shortest frame delay honoured; zero-delay GIF frames play at this rate.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct VideoClip {
    pub frames: Vec<VideoFrame>,
}

impl VideoClip {
    pub fn duration(&self) -> Duration {
        self.frames.iter().map(|f| f.delay.max(MIN_FRAME_DELAY)).sum()
    }
}

/// Looping playback of one clip. Only the active session holds one, so at
/// most one clip is ever advancing.
#[derive(Debug)]
pub struct VideoPlayback {
    clip: Option<VideoClip>,
    index: usize,
    elapsed: Duration,
    playing: bool,
}

impl VideoPlayback {
    /// Starts playing immediately, as the viewer auto-plays video scenes.
    pub fn start(clip: VideoClip) -> Self {
        Self {
            clip: Some(clip),
            index: 0,
            elapsed: Duration::ZERO,
            playing: true,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing && self.clip.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.clip.is_none()
    }

    pub fn play(&mut self) {
        if self.clip.is_some() {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn current_frame(&self) -> Option<&RgbaImage> {
        self.clip
            .as_ref()
            .and_then(|c| c.frames.get(self.index))
            .map(|f| &f.image)
    }

    /// Move the clock forward. Returns the new frame when it changed.
    pub fn advance(&mut self, dt: Duration) -> Option<&RgbaImage> {
        if !self.playing {
            return None;
        }
        let clip = self.clip.as_ref()?;
        if clip.frames.len() < 2 {
            return None;
        }

        // Skip whole loops so a long stall doesn't spin here.
        let total = clip.duration();
        self.elapsed += dt;
        if !total.is_zero() && self.elapsed > total {
            let loops = self.elapsed.as_nanos() / total.as_nanos();
            self.elapsed -= total * loops as u32;
        }

        let start = self.index;
        loop {
            let delay = clip.frames[self.index].delay.max(MIN_FRAME_DELAY);
            if self.elapsed < delay {
                break;
            }
            self.elapsed -= delay;
            self.index = (self.index + 1) % clip.frames.len();
        }

        if self.index != start {
            self.current_frame()
        } else {
            None
        }
    }

    /// Stop and free the decoded frames.
    pub fn release(&mut self) {
        self.playing = false;
        self.clip = None;
        self.index = 0;
        self.elapsed = Duration::ZERO;
    }
}
