use std::collections::BTreeMap;

use crate::{
    assets::decode,
    config::{RegistryConfig, WindowEdit, WindowState},
    foundation::core::TimeMs,
    foundation::error::{ChromaError, ChromaResult},
    keying::{self, KeyRule},
    window::overlay::{KeyCommand, OverlaySurface, OverlayWindow},
};

/// Persistence seam: the host stores full configuration snapshots
/// (load-all / overwrite-all, no partial-field patches).
pub trait ConfigStore {
    /// Persist a complete snapshot atomically.
    fn save(&mut self, config: &RegistryConfig) -> ChromaResult<()>;
}

/// Outcome of loading a persisted configuration.
///
/// Per-window failures are isolated: one bad window never prevents the
/// others from loading. The host resolves each failure with the user
/// (edit / remove / ignore).
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Windows successfully instantiated.
    pub loaded: usize,
    /// Windows that failed, with the typed reason.
    pub failed: Vec<(String, ChromaError)>,
}

/// Owner of all overlay windows: global z-order discipline, the global
/// movable toggle, and the persistence seam.
///
/// Explicitly constructed and handed to the host (no process-wide
/// singleton); the host routes clicks, drags, and key input here by window
/// name.
pub struct WindowRegistry {
    windows: BTreeMap<String, OverlayWindow>,
    movable: bool,
    store: Box<dyn ConfigStore>,
}

impl WindowRegistry {
    /// Empty registry backed by a persistence store.
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        Self {
            windows: BTreeMap::new(),
            movable: false,
            store,
        }
    }

    /// Instantiate every persisted window in ascending z-order, so the
    /// on-screen stacking matches the saved state.
    ///
    /// `make_surface` supplies one host surface per window; a window whose
    /// surface cannot be built fails like any other bad window.
    pub fn load<F>(&mut self, config: RegistryConfig, now: TimeMs, mut make_surface: F) -> LoadReport
    where
        F: FnMut(&str, &WindowState) -> ChromaResult<Box<dyn OverlaySurface>>,
    {
        self.movable = config.windows_movable;

        let mut ordered: Vec<(String, WindowState)> = config.windows.into_iter().collect();
        ordered.sort_by(|a, b| a.1.z_order.cmp(&b.1.z_order).then(a.0.cmp(&b.0)));

        let mut report = LoadReport::default();
        for (name, state) in ordered {
            let window = make_surface(&name, &state)
                .and_then(|surface| OverlayWindow::new(name.clone(), state, surface, now));
            match window {
                Ok(w) => {
                    self.windows.insert(name, w);
                    report.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(window = %name, error = %e, "window failed to load");
                    report.failed.push((name, e));
                }
            }
        }
        self.restore_stacking();
        tracing::info!(
            loaded = report.loaded,
            failed = report.failed.len(),
            "configuration loaded"
        );
        report
    }

    /// Create a window from an edit record; it lands on top (`z = max+1`).
    ///
    /// When `base` names an existing window the new one opens offset by
    /// (40, 40) from it. The template is validated (readable, detectable
    /// key region) before anything is touched.
    pub fn create_window<F>(
        &mut self,
        edit: &WindowEdit,
        base: Option<&str>,
        now: TimeMs,
        make_surface: F,
    ) -> ChromaResult<String>
    where
        F: FnOnce(&str, &WindowState) -> ChromaResult<Box<dyn OverlaySurface>>,
    {
        let (width, height) = validate_template(edit)?;
        let name = self.next_name();
        let mut state = WindowState::from_edit(edit, width, height, self.max_z() + 1);
        if let Some(base) = base.and_then(|n| self.windows.get(n)) {
            state.pos_x = base.state().pos_x + 40;
            state.pos_y = base.state().pos_y + 40;
        }

        let surface = make_surface(&name, &state)?;
        let window = OverlayWindow::new(name.clone(), state, surface, now)?;
        self.windows.insert(name.clone(), window);
        self.persist();
        Ok(name)
    }

    /// Re-create a window with an edited record.
    ///
    /// Position, size, z-order, and content offset survive; everything the
    /// dialog owns is replaced. A rejected edit (bad template) leaves the
    /// prior window untouched.
    pub fn edit_window<F>(
        &mut self,
        name: &str,
        edit: &WindowEdit,
        now: TimeMs,
        make_surface: F,
    ) -> ChromaResult<()>
    where
        F: FnOnce(&str, &WindowState) -> ChromaResult<Box<dyn OverlaySurface>>,
    {
        let Some(existing) = self.windows.get(name) else {
            return Err(ChromaError::validation(format!("unknown window '{name}'")));
        };
        validate_template(edit)?;

        let state = existing.state().apply_edit(edit);
        let surface = make_surface(name, &state)?;
        let replacement = OverlayWindow::new(name.to_string(), state, surface, now)?;

        if let Some(mut old) = self.windows.remove(name) {
            old.stop();
        }
        self.windows.insert(name.to_string(), replacement);
        self.persist();
        Ok(())
    }

    /// Stop and remove a window, persisting the shrunken configuration.
    pub fn remove_window(&mut self, name: &str) -> ChromaResult<()> {
        let Some(mut window) = self.windows.remove(name) else {
            return Err(ChromaError::validation(format!("unknown window '{name}'")));
        };
        window.stop();
        self.persist();
        Ok(())
    }

    /// Whether clicking a window raises it.
    pub fn movable(&self) -> bool {
        self.movable
    }

    /// Flip the global movable flag and persist it.
    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
        self.persist();
    }

    /// Route a click on `name`.
    ///
    /// Movable mode raises the window and reassigns `z = max+1`. Fixed mode
    /// must leave stacking untouched; because some hosts auto-raise on any
    /// click regardless of application intent, the saved order is
    /// re-imposed by lowering and re-raising every window in ascending z.
    pub fn handle_click(&mut self, name: &str) {
        if self.movable {
            self.bring_to_front(name);
        } else {
            self.restore_stacking();
        }
    }

    /// Raise `name` and give it the top z-order (movable mode only).
    pub fn bring_to_front(&mut self, name: &str) {
        if !self.movable {
            return;
        }
        let max_z = self.max_z();
        let window_count = self.windows.len();
        let Some(window) = self.windows.get_mut(name) else {
            return;
        };
        if window.z_order() == max_z && window_count > 1 {
            return;
        }
        window.raise();
        window.set_z_order(max_z + 1);
        self.persist();
    }

    /// Re-impose the persisted stacking: lower every window, then raise
    /// them back in ascending z-order.
    pub fn restore_stacking(&mut self) {
        let mut ordered: Vec<&mut OverlayWindow> = self.windows.values_mut().collect();
        ordered.sort_by_key(|w| w.z_order());
        for window in ordered.iter_mut() {
            window.lower();
        }
        for window in ordered {
            window.raise();
        }
    }

    /// Move a window (drag or programmatic) and persist.
    pub fn move_window(&mut self, name: &str, x: i32, y: i32) -> ChromaResult<()> {
        let window = self.window_mut(name)?;
        window.move_to(x, y);
        self.persist();
        Ok(())
    }

    /// Resize a window and persist.
    pub fn resize_window(&mut self, name: &str, w: u32, h: u32, now: TimeMs) -> ChromaResult<()> {
        let window = self.window_mut(name)?;
        window.resize(w, h, now)?;
        self.persist();
        Ok(())
    }

    /// Route a keyboard command to a window and persist the outcome.
    pub fn key_input(&mut self, name: &str, cmd: KeyCommand, now: TimeMs) -> ChromaResult<()> {
        let window = self.window_mut(name)?;
        window.handle_key(cmd, now)?;
        self.persist();
        Ok(())
    }

    /// Advance every window's timers and animations to `now`.
    pub fn advance_all(&mut self, now: TimeMs) {
        for (name, window) in &mut self.windows {
            if let Err(e) = window.advance(now) {
                tracing::warn!(window = %name, error = %e, "window advance failed");
            }
        }
    }

    /// Persist all window states; call on shutdown.
    pub fn shutdown(&mut self) {
        for window in self.windows.values_mut() {
            window.stop();
        }
        self.persist();
    }

    /// Direct access to one window.
    pub fn window(&self, name: &str) -> Option<&OverlayWindow> {
        self.windows.get(name)
    }

    /// Number of live windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no windows are loaded.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Window names in map order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    /// Full configuration snapshot of the live windows.
    pub fn snapshot(&self) -> RegistryConfig {
        RegistryConfig {
            windows_movable: self.movable,
            windows: self
                .windows
                .iter()
                .map(|(name, w)| (name.clone(), w.state().clone()))
                .collect(),
        }
    }

    fn window_mut(&mut self, name: &str) -> ChromaResult<&mut OverlayWindow> {
        self.windows
            .get_mut(name)
            .ok_or_else(|| ChromaError::validation(format!("unknown window '{name}'")))
    }

    fn next_name(&self) -> String {
        let mut i = 1usize;
        loop {
            let name = format!("window{i}");
            if !self.windows.contains_key(&name) {
                return name;
            }
            i += 1;
        }
    }

    fn max_z(&self) -> i64 {
        self.windows.values().map(OverlayWindow::z_order).max().unwrap_or(0)
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(error = %e, "configuration save failed");
        }
    }
}

/// Check an edit's template (readable + detectable key region) and return
/// its natural dimensions, leaving all prior state untouched on failure.
fn validate_template(edit: &WindowEdit) -> ChromaResult<(u32, u32)> {
    let raster = decode::load_raster(&edit.template_path).map_err(|e| {
        ChromaError::invalid_template(format!("{}: {e}", edit.template_path.display()))
    })?;
    keying::detect_key_region(&raster, KeyRule::default()).ok_or_else(|| {
        ChromaError::invalid_template(format!(
            "no key-colored pixels in {}",
            edit.template_path.display()
        ))
    })?;
    Ok((raster.width(), raster.height()))
}

#[cfg(test)]
#[path = "../../tests/unit/window/registry.rs"]
mod tests;
