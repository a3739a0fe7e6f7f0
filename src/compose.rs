use crate::{
    foundation::core::{KeyRegion, Raster},
    foundation::error::{ChromaError, ChromaResult},
    keying::{self, KeyRule},
};

/// How content is scaled into the key region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FitMode {
    /// Resize exactly to the region, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Contain-fit: scale so the larger dimension fits, preserving aspect.
    PreserveAspect,
}

/// Lanczos resample to exactly `width` x `height` (both floored at 1).
///
/// Callers resample from a retained full-resolution master, never from a
/// previously resampled raster, so repeated interactive resizes do not
/// accumulate quality loss.
pub fn resample(raster: &Raster, width: u32, height: u32) -> ChromaResult<Raster> {
    let width = width.max(1);
    let height = height.max(1);
    if width == raster.width() && height == raster.height() {
        return Ok(raster.clone());
    }
    let src = image::RgbaImage::from_raw(raster.width(), raster.height(), raster.rgba8().to_vec())
        .ok_or_else(|| ChromaError::validation("raster buffer does not match its dimensions"))?;
    let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Lanczos3);
    Raster::from_rgba8(width, height, out.into_raw())
}

/// Scaled content dimensions for a region under `mode`.
pub fn fit_dimensions(
    content_w: u32,
    content_h: u32,
    region_w: u32,
    region_h: u32,
    mode: FitMode,
) -> (u32, u32) {
    match mode {
        FitMode::Stretch => (region_w.max(1), region_h.max(1)),
        FitMode::PreserveAspect => {
            let sx = f64::from(region_w) / f64::from(content_w.max(1));
            let sy = f64::from(region_h) / f64::from(content_h.max(1));
            let scale = sx.min(sy);
            let w = (f64::from(content_w) * scale).round() as u32;
            let h = (f64::from(content_h) * scale).round() as u32;
            (w.max(1), h.max(1))
        }
    }
}

/// Placement of scaled content along one axis: centered, shifted by the
/// manual offset, then clamped to `[0, region - content]`.
///
/// When the content is larger than the region the clamp range collapses and
/// the position pins to the single value `region - content` (negative), so
/// the overflow hangs off one edge deterministically.
pub fn place_axis(region: u32, content: u32, offset: i32) -> i64 {
    let span = i64::from(region) - i64::from(content);
    let centered = span.div_euclid(2) + i64::from(offset);
    centered.max(0).min(span)
}

/// Composite a content frame into the keyed region of a template.
///
/// Steps, each producing a fresh raster:
/// 1. scale `content` to the region under `mode`;
/// 2. place it (center + offset + clamp, see [`place_axis`]);
/// 3. straight alpha-over onto a transparent region-sized canvas;
/// 4. replace the canvas alpha with the template's key mask, clipping the
///    content to the exact shape of the keyed area.
///
/// With no content the overlay layer is simply cleared (fully transparent).
pub fn render_overlay(
    template: &Raster,
    region: KeyRegion,
    content: Option<&Raster>,
    mode: FitMode,
    offset: (i32, i32),
    rule: KeyRule,
) -> ChromaResult<Raster> {
    let (rw, rh) = (region.width(), region.height());
    let Some(content) = content else {
        return Ok(Raster::transparent(rw, rh));
    };
    if !region.fits_within(template.width(), template.height()) {
        return Err(ChromaError::validation(
            "key region exceeds template bounds",
        ));
    }

    let (sw, sh) = fit_dimensions(content.width(), content.height(), rw, rh, mode);
    let scaled = resample(content, sw, sh)?;
    let px = place_axis(rw, sw, offset.0);
    let py = place_axis(rh, sh, offset.1);

    let mut canvas = vec![0u8; (rw as usize) * (rh as usize) * 4];
    blit_over(&mut canvas, rw, rh, &scaled, px, py);

    let mask = keying::region_mask(template, region, rule);
    for (px4, m) in canvas.chunks_exact_mut(4).zip(mask) {
        px4[3] = m;
    }

    Raster::from_rgba8(rw, rh, canvas)
}

/// Straight alpha-over of `src` onto the canvas at `(x, y)`, clipped to the
/// canvas bounds on every side.
fn blit_over(canvas: &mut [u8], canvas_w: u32, canvas_h: u32, src: &Raster, x: i64, y: i64) {
    let src_px = src.rgba8();
    for sy in 0..i64::from(src.height()) {
        let dy = y + sy;
        if dy < 0 || dy >= i64::from(canvas_h) {
            continue;
        }
        for sx in 0..i64::from(src.width()) {
            let dx = x + sx;
            if dx < 0 || dx >= i64::from(canvas_w) {
                continue;
            }
            let si = ((sy as usize) * (src.width() as usize) + (sx as usize)) * 4;
            let di = ((dy as usize) * (canvas_w as usize) + (dx as usize)) * 4;
            let blended = straight_over(
                [canvas[di], canvas[di + 1], canvas[di + 2], canvas[di + 3]],
                [src_px[si], src_px[si + 1], src_px[si + 2], src_px[si + 3]],
            );
            canvas[di..di + 4].copy_from_slice(&blended);
        }
    }
}

/// Straight (non-premultiplied) source-over for one RGBA8 pixel.
fn straight_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 255 || dst[3] == 0 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = u32::from(dst[3]);
    // out_a in [0, 255*255] scale
    let out_a = sa * 255 + da * (255 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = u32::from(src[i]);
        let dc = u32::from(dst[i]);
        let num = sc * sa * 255 + dc * da * (255 - sa);
        out[i] = ((num + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
