use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

use crate::foundation::{
    core::TimeMs,
    error::{ChromaError, ChromaResult},
};

/// File extensions a slideshow folder is scanned for.
pub const SLIDESHOW_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Initial and per-wraparound playlist ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderingPolicy {
    /// Stable sort by path.
    #[default]
    #[serde(rename = "alfabetica")]
    Alphabetical,
    /// Re-shuffled on start and on every wraparound.
    #[serde(rename = "aleatoria")]
    Random,
}

/// Instruction produced by a due slideshow tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideAdvance {
    /// File to display next.
    pub path: PathBuf,
    /// Whether the switch should run through the transition engine. False
    /// only on the very first tick after start.
    pub animate: bool,
}

/// Timer-driven advancement through an ordered or shuffled folder playlist.
///
/// The scheduler never touches the clock itself: the host event loop calls
/// [`SlideshowScheduler::poll`] with the current time. The tick period is
/// fixed at `interval_secs * 1000` ms measured from the previous due time;
/// only stopping and restarting the scheduler resets it.
#[derive(Debug)]
pub struct SlideshowScheduler {
    playlist: Vec<PathBuf>,
    index: usize,
    policy: OrderingPolicy,
    period_ms: u64,
    next_due: TimeMs,
    first_advance_pending: bool,
    running: bool,
    rng: SmallRng,
}

impl SlideshowScheduler {
    /// Scan `folder`, order the playlist, and start ticking.
    ///
    /// Returns the scheduler plus the first item, which the caller displays
    /// without a transition. A missing or imageless folder yields
    /// [`ChromaError::EmptySlideshow`] and no scheduler.
    pub fn start(
        folder: &Path,
        policy: OrderingPolicy,
        interval_secs: u32,
        now: TimeMs,
    ) -> ChromaResult<(Self, PathBuf)> {
        Self::start_with_rng(folder, policy, interval_secs, now, SmallRng::from_entropy())
    }

    /// [`SlideshowScheduler::start`] with a deterministic shuffle seed.
    pub fn start_seeded(
        folder: &Path,
        policy: OrderingPolicy,
        interval_secs: u32,
        now: TimeMs,
        seed: u64,
    ) -> ChromaResult<(Self, PathBuf)> {
        Self::start_with_rng(
            folder,
            policy,
            interval_secs,
            now,
            SmallRng::seed_from_u64(seed),
        )
    }

    fn start_with_rng(
        folder: &Path,
        policy: OrderingPolicy,
        interval_secs: u32,
        now: TimeMs,
        mut rng: SmallRng,
    ) -> ChromaResult<(Self, PathBuf)> {
        if interval_secs == 0 {
            return Err(ChromaError::validation(
                "slideshow interval must be at least 1 second",
            ));
        }
        let mut playlist = scan_folder(folder)?;
        if playlist.is_empty() {
            return Err(ChromaError::empty_slideshow(format!(
                "no displayable files in {}",
                folder.display()
            )));
        }
        order(&mut playlist, policy, &mut rng);
        let first = playlist[0].clone();
        let period_ms = u64::from(interval_secs) * 1000;
        Ok((
            Self {
                playlist,
                index: 0,
                policy,
                period_ms,
                next_due: now.saturating_add(period_ms),
                first_advance_pending: true,
                running: true,
                rng,
            },
            first,
        ))
    }

    /// Advance if a tick is due; re-orders the playlist on wraparound.
    pub fn poll(&mut self, now: TimeMs) -> Option<SlideAdvance> {
        if !self.running || now < self.next_due {
            return None;
        }
        self.next_due = self.next_due.saturating_add(self.period_ms);
        self.index += 1;
        if self.index >= self.playlist.len() {
            order(&mut self.playlist, self.policy, &mut self.rng);
            self.index = 0;
        }
        let animate = !self.first_advance_pending;
        self.first_advance_pending = false;
        Some(SlideAdvance {
            path: self.playlist[self.index].clone(),
            animate,
        })
    }

    /// Stop ticking; [`SlideshowScheduler::poll`] becomes a no-op.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the scheduler is still ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of files in the current playlist.
    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    /// Whether the playlist is empty (never true for a started scheduler).
    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }
}

fn order(playlist: &mut [PathBuf], policy: OrderingPolicy, rng: &mut SmallRng) {
    match policy {
        OrderingPolicy::Alphabetical => playlist.sort(),
        OrderingPolicy::Random => playlist.shuffle(rng),
    }
}

fn scan_folder(folder: &Path) -> ChromaResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("list slideshow folder {}", folder.display()))
        .map_err(|e| ChromaError::empty_slideshow(e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("read entry in {}", folder.display()))
            .map_err(|e| ChromaError::empty_slideshow(e.to_string()))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                let e = e.to_ascii_lowercase();
                SLIDESHOW_EXTENSIONS.contains(&e.as_str())
            });
        if matches && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
#[path = "../tests/unit/slideshow.rs"]
mod tests;
