use std::path::Path;

use crate::{
    animation::transition::{Transition, TransitionEvent, TransitionSpec},
    assets::{
        decode,
        source::{ContentSource, SlideContent},
    },
    compose::{self, FitMode},
    config::WindowState,
    foundation::core::{KeyRegion, Raster, Rect, TimeMs},
    foundation::error::{ChromaError, ChromaResult},
    keying::{self, KeyRule},
    slideshow::SlideshowScheduler,
};

/// Pixels an arrow key shifts the content offset by.
pub const NUDGE_STEP: i32 = 10;
/// Smallest window edge reachable through keyboard rescaling.
pub const MIN_WINDOW_DIM: u32 = 50;

/// Host window-system seam: one frameless, always-on-top-capable surface
/// with per-pixel alpha, layered as content overlay below, template above.
///
/// The overlay layer is drawn anchored at its rect's origin and clipped to
/// the rect; the transition engine animates that rect and the layer opacity.
pub trait OverlaySurface {
    /// Position and size the whole surface in screen coordinates.
    fn set_geometry(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// Replace the template layer pixels.
    fn present_template(&mut self, template: &Raster);
    /// Replace the overlay layer: pixels, window-space placement rect, and
    /// opacity. `None` clears the layer.
    fn present_overlay(&mut self, overlay: Option<&Raster>, rect: Rect, opacity: f64);
    /// Raise the surface above its siblings.
    fn raise(&mut self);
    /// Lower the surface below its siblings.
    fn lower(&mut self);
}

/// Keyboard commands routed to a window by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    /// Arrow up: shift content up by [`NUDGE_STEP`].
    NudgeUp,
    /// Arrow down.
    NudgeDown,
    /// Arrow left.
    NudgeLeft,
    /// Arrow right.
    NudgeRight,
    /// `T`: toggle key transparency.
    ToggleKeyTransparency,
    /// `R`: toggle aspect preservation.
    TogglePreserveAspect,
    /// `+`: grow the window by 10%.
    ScaleUp,
    /// `-`: shrink the window by 10% (floored at [`MIN_WINDOW_DIM`]).
    ScaleDown,
}

/// One borderless overlay window: a template raster with a chroma-keyed
/// hole, a content source displayed inside it, and the transition/slideshow
/// machinery driving content switches.
///
/// Construction is all-or-nothing: an unreadable template or one without a
/// detectable key region fails with [`ChromaError::InvalidTemplate`] and no
/// partially initialized window exists. Content and slideshow failures are
/// non-fatal; the window keeps its prior (possibly empty) content.
pub struct OverlayWindow {
    name: String,
    state: WindowState,
    key_rule: KeyRule,
    /// Full-resolution template master; every resize resamples from here.
    master: Raster,
    master_region: KeyRegion,
    template: Raster,
    key_region: KeyRegion,
    source: Option<ContentSource>,
    slideshow: Option<SlideshowScheduler>,
    transition: Transition,
    surface: Box<dyn OverlaySurface>,
    drag_anchor: Option<(i32, i32)>,
}

impl std::fmt::Debug for OverlayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayWindow")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("key_rule", &self.key_rule)
            .field("master_region", &self.master_region)
            .field("key_region", &self.key_region)
            .field("source", &self.source)
            .field("slideshow", &self.slideshow)
            .field("transition", &self.transition)
            .field("drag_anchor", &self.drag_anchor)
            .finish_non_exhaustive()
    }
}

impl OverlayWindow {
    /// Build a window from persisted state and a host surface.
    pub fn new(
        name: impl Into<String>,
        state: WindowState,
        surface: Box<dyn OverlaySurface>,
        now: TimeMs,
    ) -> ChromaResult<Self> {
        let name = name.into();
        let key_rule = KeyRule::default();

        let master = decode::load_raster(&state.template_path).map_err(|e| {
            ChromaError::invalid_template(format!("{}: {e}", state.template_path.display()))
        })?;
        let master_region = keying::detect_key_region(&master, key_rule).ok_or_else(|| {
            ChromaError::invalid_template(format!(
                "no key-colored pixels in {}",
                state.template_path.display()
            ))
        })?;

        let width = if state.width == 0 { master.width() } else { state.width };
        let height = if state.height == 0 { master.height() } else { state.height };
        let template = compose::resample(&master, width, height)?;
        let key_region = detect_or_rescale(&name, &template, key_rule, master_region, &master);

        let mut state = state;
        state.width = width;
        state.height = height;

        let transition = Transition::new(TransitionSpec::for_kind(state.transition), key_region);

        let mut window = Self {
            name,
            state,
            key_rule,
            master,
            master_region,
            template,
            key_region,
            source: None,
            slideshow: None,
            transition,
            surface,
            drag_anchor: None,
        };

        window.surface.set_geometry(
            window.state.pos_x,
            window.state.pos_y,
            window.state.width,
            window.state.height,
        );
        window.present_template();
        window.init_content(now);
        window.present_overlay(now)?;
        Ok(window)
    }

    /// Stable window name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current persisted-shape state snapshot.
    pub fn state(&self) -> &WindowState {
        &self.state
    }

    /// Current key region in window coordinates.
    pub fn key_region(&self) -> KeyRegion {
        self.key_region
    }

    /// Stacking rank.
    pub fn z_order(&self) -> i64 {
        self.state.z_order
    }

    /// Assign a new stacking rank (registry-owned discipline).
    pub(crate) fn set_z_order(&mut self, z: i64) {
        self.state.z_order = z;
    }

    /// Raise the host surface.
    pub(crate) fn raise(&mut self) {
        self.surface.raise();
    }

    /// Lower the host surface.
    pub(crate) fn lower(&mut self) {
        self.surface.lower();
    }

    fn init_content(&mut self, now: TimeMs) {
        if let Some(path) = self.state.content().cloned() {
            if let Err(e) = self.load_content(&path, now) {
                tracing::warn!(window = %self.name, error = %e, "initial content failed to load");
            }
        }
        if self.state.loop_mode {
            self.start_slideshow(now);
        }
    }

    fn start_slideshow(&mut self, now: TimeMs) {
        let Some(folder) = self.state.folder().cloned() else {
            return;
        };
        match SlideshowScheduler::start(&folder, self.state.ordering, self.state.interval_secs, now)
        {
            Ok((scheduler, first)) => {
                self.slideshow = Some(scheduler);
                self.source = Some(ContentSource::FolderSlideshow {
                    folder,
                    policy: self.state.ordering,
                    interval_secs: self.state.interval_secs,
                    current: None,
                });
                if let Err(e) = self.load_content(&first, now) {
                    tracing::warn!(window = %self.name, error = %e, "first slideshow item failed to load");
                }
            }
            Err(e) => {
                tracing::debug!(window = %self.name, error = %e, "slideshow not started");
            }
        }
    }

    /// Load and display a content file immediately (no transition).
    ///
    /// In slideshow mode the item becomes the current slide; otherwise the
    /// source switches to a static or animated variant by extension. On
    /// error the previous content stays on screen.
    #[tracing::instrument(skip(self), fields(window = %self.name))]
    pub fn load_content(&mut self, path: &Path, now: TimeMs) -> ChromaResult<()> {
        let slide = SlideContent::load(path, now)?;
        match &mut self.source {
            Some(ContentSource::FolderSlideshow { current, .. }) => *current = Some(slide),
            _ => self.source = Some(ContentSource::from_slide(slide)),
        }
        self.state.content_path = Some(path.to_path_buf());
        self.present_overlay(now)
    }

    /// Replace the template, re-deriving the master, scaled raster, and key
    /// region. Nothing changes unless every step succeeds.
    #[tracing::instrument(skip(self), fields(window = %self.name))]
    pub fn load_template(&mut self, path: &Path, now: TimeMs) -> ChromaResult<()> {
        let master = decode::load_raster(path)
            .map_err(|e| ChromaError::invalid_template(format!("{}: {e}", path.display())))?;
        let master_region = keying::detect_key_region(&master, self.key_rule).ok_or_else(|| {
            ChromaError::invalid_template(format!("no key-colored pixels in {}", path.display()))
        })?;
        let template = compose::resample(&master, self.state.width, self.state.height)?;
        let key_region =
            detect_or_rescale(&self.name, &template, self.key_rule, master_region, &master);

        self.master = master;
        self.master_region = master_region;
        self.template = template;
        self.key_region = key_region;
        self.state.template_path = path.to_path_buf();
        self.transition.set_region(key_region);
        self.present_template();
        self.present_overlay(now)
    }

    /// Resize the window, resampling the template from the retained master
    /// and recomputing the key region at the new scale.
    #[tracing::instrument(skip(self), fields(window = %self.name))]
    pub fn resize(&mut self, width: u32, height: u32, now: TimeMs) -> ChromaResult<()> {
        let width = width.max(1);
        let height = height.max(1);
        self.template = compose::resample(&self.master, width, height)?;
        self.state.width = width;
        self.state.height = height;
        self.key_region = detect_or_rescale(
            &self.name,
            &self.template,
            self.key_rule,
            self.master_region,
            &self.master,
        );
        self.transition.set_region(self.key_region);
        self.surface
            .set_geometry(self.state.pos_x, self.state.pos_y, width, height);
        self.present_template();
        self.present_overlay(now)
    }

    /// Rescale the whole window by `factor`, floored at
    /// [`MIN_WINDOW_DIM`] per edge. Non-positive factors are ignored.
    pub fn scale_by(&mut self, factor: f64, now: TimeMs) -> ChromaResult<()> {
        if factor <= 0.0 {
            return Ok(());
        }
        let width = ((f64::from(self.state.width) * factor) as u32).max(MIN_WINDOW_DIM);
        let height = ((f64::from(self.state.height) * factor) as u32).max(MIN_WINDOW_DIM);
        self.resize(width, height, now)
    }

    /// Shift the manual content offset and re-render.
    pub fn nudge_offset(&mut self, dx: i32, dy: i32, now: TimeMs) -> ChromaResult<()> {
        self.state.offset_x += dx;
        self.state.offset_y += dy;
        self.present_overlay(now)
    }

    /// Toggle transparency of keyed template pixels; immediate re-render.
    pub fn toggle_key_transparency(&mut self, now: TimeMs) -> ChromaResult<()> {
        self.state.key_transparency = !self.state.key_transparency;
        self.present_template();
        self.present_overlay(now)
    }

    /// Toggle aspect preservation for content; immediate re-render.
    pub fn toggle_preserve_aspect(&mut self, now: TimeMs) -> ChromaResult<()> {
        self.state.preserve_aspect = !self.state.preserve_aspect;
        self.present_overlay(now)
    }

    /// Dispatch one keyboard command.
    pub fn handle_key(&mut self, cmd: KeyCommand, now: TimeMs) -> ChromaResult<()> {
        match cmd {
            KeyCommand::NudgeUp => self.nudge_offset(0, -NUDGE_STEP, now),
            KeyCommand::NudgeDown => self.nudge_offset(0, NUDGE_STEP, now),
            KeyCommand::NudgeLeft => self.nudge_offset(-NUDGE_STEP, 0, now),
            KeyCommand::NudgeRight => self.nudge_offset(NUDGE_STEP, 0, now),
            KeyCommand::ToggleKeyTransparency => self.toggle_key_transparency(now),
            KeyCommand::TogglePreserveAspect => self.toggle_preserve_aspect(now),
            KeyCommand::ScaleUp => self.scale_by(1.1, now),
            KeyCommand::ScaleDown => self.scale_by(0.9, now),
        }
    }

    /// Move the window to screen coordinates.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.state.pos_x = x;
        self.state.pos_y = y;
        self.surface
            .set_geometry(x, y, self.state.width, self.state.height);
    }

    /// Anchor a drag at the given cursor position.
    pub fn begin_drag(&mut self, cursor_x: i32, cursor_y: i32) {
        self.drag_anchor = Some((cursor_x - self.state.pos_x, cursor_y - self.state.pos_y));
    }

    /// Move the window so the drag anchor follows the cursor.
    pub fn drag_to(&mut self, cursor_x: i32, cursor_y: i32) {
        if let Some((ax, ay)) = self.drag_anchor {
            self.move_to(cursor_x - ax, cursor_y - ay);
        }
    }

    /// Release the drag anchor.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Begin an animated switch to `path` through the window's transition.
    pub fn transition_to(&mut self, path: &Path, now: TimeMs) {
        self.transition.start(path.to_path_buf(), now);
    }

    /// Single event-loop re-entry point: polls the slideshow, advances the
    /// transition (performing its midpoint swap), steps animated content,
    /// and re-presents when anything changed.
    pub fn advance(&mut self, now: TimeMs) -> ChromaResult<()> {
        let mut dirty = false;

        let tick = self.slideshow.as_mut().and_then(|s| s.poll(now));
        if let Some(adv) = tick {
            if adv.animate {
                self.transition.start(adv.path, now);
            } else if let Err(e) = self.load_content(&adv.path, now) {
                tracing::warn!(window = %self.name, error = %e, "slideshow item failed to load");
            }
            dirty = true;
        }

        while let Some(event) = self.transition.advance(now) {
            match event {
                TransitionEvent::Swap(path) => {
                    if let Err(e) = self.load_content(&path, now) {
                        tracing::warn!(window = %self.name, error = %e, "transition target failed to load");
                    }
                }
                TransitionEvent::Finished => {}
            }
            dirty = true;
        }

        if let Some(source) = &mut self.source
            && source.advance_playback(now)
        {
            dirty = true;
        }

        if dirty || !self.transition.is_idle() {
            self.present_overlay(now)?;
        }
        Ok(())
    }

    /// Stop the slideshow timer and drop any running transition. Part of
    /// the close path so nothing fires against a window being torn down.
    pub fn stop(&mut self) {
        if let Some(scheduler) = &mut self.slideshow {
            scheduler.stop();
        }
        self.transition.cancel();
    }

    fn present_template(&mut self) {
        let view = if self.state.key_transparency {
            keying::knock_out_key(&self.template, self.key_rule)
        } else {
            self.template.clone()
        };
        self.surface.present_template(&view);
    }

    fn present_overlay(&mut self, now: TimeMs) -> ChromaResult<()> {
        let frame = self.transition.sample(now);
        let fit = if self.state.preserve_aspect {
            FitMode::PreserveAspect
        } else {
            FitMode::Stretch
        };
        match self.source.as_ref().and_then(ContentSource::current_frame) {
            None => {
                self.surface.present_overlay(None, frame.rect, frame.opacity);
            }
            Some(content) => {
                let layer = compose::render_overlay(
                    &self.template,
                    self.key_region,
                    Some(content),
                    fit,
                    (self.state.offset_x, self.state.offset_y),
                    self.key_rule,
                )?;
                self.surface
                    .present_overlay(Some(&layer), frame.rect, frame.opacity);
            }
        }
        Ok(())
    }
}

/// Key region of a resampled template; falls back to proportionally scaling
/// the master's region when resampling smeared the key color below the rule
/// thresholds.
fn detect_or_rescale(
    name: &str,
    template: &Raster,
    rule: KeyRule,
    master_region: KeyRegion,
    master: &Raster,
) -> KeyRegion {
    if let Some(region) = keying::detect_key_region(template, rule) {
        return region;
    }
    tracing::warn!(window = %name, "key region undetectable after resample, scaling master region");
    let sx = f64::from(template.width()) / f64::from(master.width());
    let sy = f64::from(template.height()) / f64::from(master.height());
    let left = ((f64::from(master_region.left) * sx).round() as u32).min(template.width() - 1);
    let top = ((f64::from(master_region.top) * sy).round() as u32).min(template.height() - 1);
    let right = ((f64::from(master_region.right) * sx).round() as u32)
        .clamp(left + 1, template.width());
    let bottom = ((f64::from(master_region.bottom) * sy).round() as u32)
        .clamp(top + 1, template.height());
    KeyRegion {
        left,
        top,
        right,
        bottom,
    }
}
