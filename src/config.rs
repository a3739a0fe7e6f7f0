use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    animation::transition::TransitionKind,
    foundation::error::{ChromaError, ChromaResult},
    slideshow::OrderingPolicy,
};

fn default_interval() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Persisted per-window configuration and geometry.
///
/// Wire field names follow the persisted JSON contract consumed by the host
/// configuration store; Rust-side names are English. The store uses
/// load-all / overwrite-all semantics, so every snapshot carries the full
/// record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WindowState {
    /// Decorative frame image containing the key region.
    #[serde(rename = "caminho_template")]
    pub template_path: PathBuf,
    /// Last displayed content file; tracks slideshow advancement.
    #[serde(rename = "caminho_imagem", default)]
    pub content_path: Option<PathBuf>,
    /// Slideshow folder; `None` when the window shows a single file.
    #[serde(rename = "pasta_imagens", default)]
    pub slideshow_folder: Option<PathBuf>,
    /// Whether the folder slideshow is active.
    #[serde(rename = "modo_loop", default)]
    pub loop_mode: bool,
    /// Seconds between slideshow advances.
    #[serde(rename = "intervalo", default = "default_interval")]
    pub interval_secs: u32,
    /// Slideshow ordering policy.
    #[serde(rename = "ordem", default)]
    pub ordering: OrderingPolicy,
    /// Transition kind used when content switches.
    #[serde(rename = "tipo_animacao", default)]
    pub transition: TransitionKind,
    /// Whether keyed template pixels render fully transparent.
    #[serde(rename = "transparente", default = "default_true")]
    pub key_transparency: bool,
    /// Whether content keeps its aspect ratio inside the key region.
    #[serde(rename = "manter_proporcao", default)]
    pub preserve_aspect: bool,
    /// Window x position in screen coordinates.
    #[serde(rename = "pos_x", default)]
    pub pos_x: i32,
    /// Window y position in screen coordinates.
    #[serde(rename = "pos_y", default)]
    pub pos_y: i32,
    /// Window width in pixels; 0 means "size to the template".
    #[serde(rename = "largura", default)]
    pub width: u32,
    /// Window height in pixels; 0 means "size to the template".
    #[serde(rename = "altura", default)]
    pub height: u32,
    /// Stacking rank among overlay windows (higher is frontmost).
    #[serde(rename = "z_order", default)]
    pub z_order: i64,
    /// Manual content offset along x within the key region.
    #[serde(rename = "offset_x", default)]
    pub offset_x: i32,
    /// Manual content offset along y within the key region.
    #[serde(rename = "offset_y", default)]
    pub offset_y: i32,
}

impl WindowState {
    /// Content path, ignoring empty strings left by older configs.
    pub fn content(&self) -> Option<&PathBuf> {
        self.content_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Slideshow folder, ignoring empty strings left by older configs.
    pub fn folder(&self) -> Option<&PathBuf> {
        self.slideshow_folder
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// State for a brand-new window sized to its template.
    pub fn from_edit(edit: &WindowEdit, width: u32, height: u32, z_order: i64) -> Self {
        Self {
            template_path: edit.template_path.clone(),
            content_path: edit.content_path.clone(),
            slideshow_folder: edit.slideshow_folder.clone(),
            loop_mode: edit.loop_mode,
            interval_secs: edit.interval_secs,
            ordering: edit.ordering,
            transition: edit.transition,
            key_transparency: edit.key_transparency,
            preserve_aspect: edit.preserve_aspect,
            pos_x: 0,
            pos_y: 0,
            width,
            height,
            z_order,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Merge an edit into this state.
    ///
    /// Precedence is explicit: position, size, z-order, and the manual
    /// content offset survive; every field the edit dialog owns is
    /// overwritten.
    pub fn apply_edit(&self, edit: &WindowEdit) -> Self {
        Self {
            template_path: edit.template_path.clone(),
            content_path: edit.content_path.clone(),
            slideshow_folder: edit.slideshow_folder.clone(),
            loop_mode: edit.loop_mode,
            interval_secs: edit.interval_secs,
            ordering: edit.ordering,
            transition: edit.transition,
            key_transparency: edit.key_transparency,
            preserve_aspect: edit.preserve_aspect,
            ..self.clone()
        }
    }
}

/// Complete window record produced by the host's edit dialog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WindowEdit {
    /// Decorative frame image.
    pub template_path: PathBuf,
    /// Single content file, if any.
    pub content_path: Option<PathBuf>,
    /// Slideshow folder, if any.
    pub slideshow_folder: Option<PathBuf>,
    /// Whether the folder slideshow is active.
    pub loop_mode: bool,
    /// Seconds between slideshow advances.
    pub interval_secs: u32,
    /// Slideshow ordering policy.
    pub ordering: OrderingPolicy,
    /// Transition kind.
    pub transition: TransitionKind,
    /// Keyed pixels render transparent.
    pub key_transparency: bool,
    /// Content keeps its aspect ratio.
    pub preserve_aspect: bool,
}

/// Full persisted application configuration (load-all / overwrite-all).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegistryConfig {
    /// Whether clicking a window raises it (vs. fixed stacking).
    #[serde(rename = "janelas_moviveis", default)]
    pub windows_movable: bool,
    /// Window states keyed by stable window name.
    #[serde(rename = "janelas", default)]
    pub windows: BTreeMap<String, WindowState>,
}

impl RegistryConfig {
    /// Parse a persisted configuration document.
    pub fn from_json(json: &str) -> ChromaResult<Self> {
        serde_json::from_str(json).map_err(|e| ChromaError::serde(e.to_string()))
    }

    /// Serialize for the persistence store (pretty-printed).
    pub fn to_json(&self) -> ChromaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ChromaError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
