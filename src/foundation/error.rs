/// Convenience result type used across chromaframe.
pub type ChromaResult<T> = Result<T, ChromaError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-window failures are isolated: nothing in this taxonomy is fatal to
/// the process, and callers surface `InvalidTemplate` to the user for
/// edit/remove/ignore resolution while `ContentLoad` and `EmptySlideshow`
/// leave the window running with its prior content.
#[derive(thiserror::Error, Debug)]
pub enum ChromaError {
    /// Template file missing, undecodable, or without a detectable key
    /// region. Fatal to that window's construction.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Content file missing or undecodable; the window keeps prior content.
    #[error("content load error: {0}")]
    ContentLoad(String),

    /// Slideshow folder missing or holding no displayable files.
    #[error("empty slideshow: {0}")]
    EmptySlideshow(String),

    /// Invalid user-provided or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing persisted state.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChromaError {
    /// Build a [`ChromaError::InvalidTemplate`] value.
    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }

    /// Build a [`ChromaError::ContentLoad`] value.
    pub fn content_load(msg: impl Into<String>) -> Self {
        Self::ContentLoad(msg.into())
    }

    /// Build a [`ChromaError::EmptySlideshow`] value.
    pub fn empty_slideshow(msg: impl Into<String>) -> Self {
        Self::EmptySlideshow(msg.into())
    }

    /// Build a [`ChromaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChromaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
