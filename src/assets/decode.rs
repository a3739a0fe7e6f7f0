use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use image::AnimationDecoder;

use crate::foundation::{core::Raster, error::ChromaResult};

/// Fallback display delay for animation frames that declare none.
const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// Decode a raster image file (png/jpg/jpeg/bmp/webp/gif first frame) to
/// straight RGBA8.
pub fn load_raster(path: &Path) -> ChromaResult<Raster> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    decode_raster(&bytes)
}

/// Decode encoded image bytes to straight RGBA8.
pub fn decode_raster(bytes: &[u8]) -> ChromaResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_rgba8(width, height, rgba.into_raw())
}

/// One decoded animation frame with its display delay.
#[derive(Clone, Debug)]
pub struct AnimationFrame {
    /// Decoded frame pixels.
    pub raster: Raster,
    /// How long the frame stays on screen.
    pub delay_ms: u64,
}

/// Whether `path` names an animated image format played frame-by-frame.
pub fn is_animated(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"))
}

/// Decode an animated image into its full frame sequence.
pub fn load_animation(path: &Path) -> ChromaResult<Vec<AnimationFrame>> {
    let file = File::open(path).with_context(|| format!("open gif {}", path.display()))?;
    let decoder =
        image::codecs::gif::GifDecoder::new(BufReader::new(file)).context("read gif header")?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;

    let mut out = Vec::with_capacity(frames.len());
    for frame in frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        let delay_ms = if numer == 0 || denom == 0 {
            DEFAULT_FRAME_DELAY_MS
        } else {
            u64::from(numer / denom)
        };
        let buf = frame.into_buffer();
        let (width, height) = buf.dimensions();
        out.push(AnimationFrame {
            raster: Raster::from_rgba8(width, height, buf.into_raw())?,
            delay_ms,
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
