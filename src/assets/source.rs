use std::path::{Path, PathBuf};

use crate::{
    assets::decode::{self, AnimationFrame},
    foundation::core::{Raster, TimeMs},
    foundation::error::{ChromaError, ChromaResult},
    slideshow::OrderingPolicy,
};

/// Live playback cursor over a decoded animation.
///
/// The cursor advances whenever the host event loop calls
/// [`AnimationPlayback::advance`] with the current time; frames loop forever.
#[derive(Clone, Debug)]
pub struct AnimationPlayback {
    frames: Vec<AnimationFrame>,
    cursor: usize,
    next_due: TimeMs,
}

impl AnimationPlayback {
    /// Start playback at frame 0; `frames` must be non-empty.
    pub fn new(frames: Vec<AnimationFrame>, now: TimeMs) -> ChromaResult<Self> {
        let Some(first) = frames.first() else {
            return Err(ChromaError::validation("animation has no frames"));
        };
        let next_due = now.saturating_add(first.delay_ms);
        Ok(Self {
            frames,
            cursor: 0,
            next_due,
        })
    }

    /// The frame currently on screen.
    pub fn current(&self) -> &Raster {
        &self.frames[self.cursor].raster
    }

    /// Step past every frame whose delay has elapsed; returns whether the
    /// visible frame changed.
    pub fn advance(&mut self, now: TimeMs) -> bool {
        let mut changed = false;
        while now >= self.next_due {
            self.cursor = (self.cursor + 1) % self.frames.len();
            self.next_due = self.next_due.saturating_add(self.frames[self.cursor].delay_ms);
            changed = true;
        }
        changed
    }
}

/// The item a slideshow currently has on screen.
#[derive(Clone, Debug)]
pub enum SlideContent {
    /// Still image decoded once.
    Still {
        /// Source file.
        path: PathBuf,
        /// Decoded pixels.
        frame: Raster,
    },
    /// Animated image with a live cursor.
    Animated {
        /// Source file.
        path: PathBuf,
        /// Frame sequence and cursor.
        playback: AnimationPlayback,
    },
}

impl SlideContent {
    /// Decode `path` into still or animated content by extension.
    ///
    /// Failures surface as [`ChromaError::ContentLoad`]; the caller keeps
    /// whatever it was displaying before.
    pub fn load(path: &Path, now: TimeMs) -> ChromaResult<Self> {
        if decode::is_animated(path) {
            let frames = decode::load_animation(path)
                .map_err(|e| ChromaError::content_load(format!("{}: {e}", path.display())))?;
            let playback = AnimationPlayback::new(frames, now)
                .map_err(|e| ChromaError::content_load(format!("{}: {e}", path.display())))?;
            Ok(Self::Animated {
                path: path.to_path_buf(),
                playback,
            })
        } else {
            let frame = decode::load_raster(path)
                .map_err(|e| ChromaError::content_load(format!("{}: {e}", path.display())))?;
            Ok(Self::Still {
                path: path.to_path_buf(),
                frame,
            })
        }
    }

    /// Source path of this content.
    pub fn path(&self) -> &Path {
        match self {
            Self::Still { path, .. } | Self::Animated { path, .. } => path,
        }
    }

    /// The raster currently representing this content.
    pub fn current_frame(&self) -> &Raster {
        match self {
            Self::Still { frame, .. } => frame,
            Self::Animated { playback, .. } => playback.current(),
        }
    }
}

/// What a window displays inside its key region. Exactly one variant is
/// active per window, and variants switch only through the window's
/// content-load operation.
#[derive(Clone, Debug)]
pub enum ContentSource {
    /// Single still image decoded once.
    StaticImage {
        /// Source file.
        path: PathBuf,
        /// Decoded pixels.
        frame: Raster,
    },
    /// Animated image re-rendered on every frame tick.
    AnimatedImage {
        /// Source file.
        path: PathBuf,
        /// Frame sequence and live cursor.
        playback: AnimationPlayback,
    },
    /// Timed slideshow over a folder of images.
    FolderSlideshow {
        /// Folder scanned for displayable files.
        folder: PathBuf,
        /// Initial and per-wraparound ordering.
        policy: OrderingPolicy,
        /// Seconds between advances.
        interval_secs: u32,
        /// The item currently on screen, if any has loaded yet.
        current: Option<SlideContent>,
    },
}

impl ContentSource {
    /// Promote decoded slide content to a standalone (non-slideshow) source.
    pub fn from_slide(slide: SlideContent) -> Self {
        match slide {
            SlideContent::Still { path, frame } => Self::StaticImage { path, frame },
            SlideContent::Animated { path, playback } => Self::AnimatedImage { path, playback },
        }
    }

    /// The raster to composite right now, if any content is loaded.
    pub fn current_frame(&self) -> Option<&Raster> {
        match self {
            Self::StaticImage { frame, .. } => Some(frame),
            Self::AnimatedImage { playback, .. } => Some(playback.current()),
            Self::FolderSlideshow { current, .. } => {
                current.as_ref().map(SlideContent::current_frame)
            }
        }
    }

    /// Advance any live animation cursor; returns whether the visible frame
    /// changed.
    pub fn advance_playback(&mut self, now: TimeMs) -> bool {
        match self {
            Self::AnimatedImage { playback, .. } => playback.advance(now),
            Self::FolderSlideshow {
                current: Some(SlideContent::Animated { playback, .. }),
                ..
            } => playback.advance(now),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
