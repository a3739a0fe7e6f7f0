//! Chromaframe renders borderless desktop overlay windows that float user
//! content inside the chroma-keyed hole of a decorative template image.
//!
//! The crate is the compositing and animation core; the host shell (tray
//! menu, dialogs, actual window toolkit) stays outside and plugs into two
//! seams:
//!
//! - [`OverlaySurface`] — one frameless, per-pixel-alpha host window per
//!   [`OverlayWindow`], receiving template/overlay layers and stacking
//!   commands.
//! - [`ConfigStore`] — persistence of [`RegistryConfig`] snapshots.
//!
//! # Pipeline overview
//!
//! 1. **Detect**: [`detect_key_region`] finds the keyed hole in a template.
//! 2. **Compose**: [`render_overlay`] scales, places, clamps, and masks a
//!    content frame into that hole.
//! 3. **Animate**: [`Transition`] runs the two-phase (out/swap/in) switch
//!    effects; [`SlideshowScheduler`] produces the timed advances.
//! 4. **Own**: [`OverlayWindow`] drives the three above for one window;
//!    [`WindowRegistry`] owns the windows, the global movable flag, and the
//!    z-order discipline.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Advance-driven**: every timed component is stepped with a
//!   caller-supplied [`TimeMs`], never a wall clock, so the engine is
//!   single-threaded and deterministic under test.
//! - **Fresh rasters**: transforms return new [`Raster`]s; nothing mutates
//!   pixels another component can see.
//! - **Isolated failures**: a bad window is reported, never fatal to its
//!   siblings or the process.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod compose;
mod config;
mod foundation;
mod keying;
mod slideshow;
mod window;

pub use animation::ease::Ease;
pub use animation::transition::{
    Transition, TransitionEvent, TransitionFrame, TransitionKind, TransitionSpec,
};
pub use assets::decode::{
    AnimationFrame, decode_raster, is_animated, load_animation, load_raster,
};
pub use assets::source::{AnimationPlayback, ContentSource, SlideContent};
pub use compose::{FitMode, fit_dimensions, place_axis, render_overlay, resample};
pub use config::{RegistryConfig, WindowEdit, WindowState};
pub use foundation::core::{KeyRegion, Point, Raster, Rect, TimeMs, Vec2};
pub use foundation::error::{ChromaError, ChromaResult};
pub use keying::{KeyRule, detect_key_region, knock_out_key, region_mask};
pub use slideshow::{
    OrderingPolicy, SLIDESHOW_EXTENSIONS, SlideAdvance, SlideshowScheduler,
};
pub use window::overlay::{
    KeyCommand, MIN_WINDOW_DIM, NUDGE_STEP, OverlaySurface, OverlayWindow,
};
pub use window::registry::{ConfigStore, LoadReport, WindowRegistry};
