use crate::foundation::core::{KeyRegion, Raster};

/// Predicate over an RGB triple selecting chroma-key pixels.
///
/// The default rule matches the saturated green conventionally painted into
/// overlay templates: green above 200 with red and blue both below 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeyRule {
    /// Green channel must exceed this value.
    pub min_green: u8,
    /// Red channel must stay below this value.
    pub max_red: u8,
    /// Blue channel must stay below this value.
    pub max_blue: u8,
}

impl Default for KeyRule {
    fn default() -> Self {
        Self {
            min_green: 200,
            max_red: 100,
            max_blue: 100,
        }
    }
}

impl KeyRule {
    /// Whether an RGB triple is key-colored under this rule.
    pub fn matches(self, r: u8, g: u8, b: u8) -> bool {
        g > self.min_green && r < self.max_red && b < self.max_blue
    }
}

/// Tight bounding box of all key-colored pixels in `raster`.
///
/// Returns `None` when no pixel matches; callers must treat that as a fatal
/// per-window configuration error, not a silent default. Alpha is ignored:
/// the rule is a pure RGB predicate. O(width * height), no side effects.
pub fn detect_key_region(raster: &Raster, rule: KeyRule) -> Option<KeyRegion> {
    let (w, h) = (raster.width(), raster.height());
    let px = raster.rgba8();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for y in 0..h {
        let row = (y as usize) * (w as usize) * 4;
        for x in 0..w {
            let i = row + (x as usize) * 4;
            if rule.matches(px[i], px[i + 1], px[i + 2]) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
                });
            }
        }
    }

    bounds.map(|(l, t, r, b)| KeyRegion {
        left: l,
        top: t,
        right: r + 1,
        bottom: b + 1,
    })
}

/// Template with key-colored pixels forced to full transparency.
///
/// Used for display when key transparency is enabled, so the keyed hole in
/// the frame does not paint over the desktop behind it.
pub fn knock_out_key(template: &Raster, rule: KeyRule) -> Raster {
    let mut out = template.rgba8().to_vec();
    for px in out.chunks_exact_mut(4) {
        if rule.matches(px[0], px[1], px[2]) {
            px.copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    Raster::from_parts(template.width(), template.height(), out)
}

/// Alpha mask (255 where keyed, 0 elsewhere) of `region` within `template`.
///
/// The mask follows the exact, possibly irregular shape of the keyed area,
/// not just its bounding rectangle. Returned row-major, one byte per pixel,
/// `region.width() * region.height()` long. The region must lie within the
/// template.
pub fn region_mask(template: &Raster, region: KeyRegion, rule: KeyRule) -> Vec<u8> {
    let px = template.rgba8();
    let w = template.width() as usize;
    let mut mask = Vec::with_capacity((region.width() as usize) * (region.height() as usize));
    for y in region.top..region.bottom {
        for x in region.left..region.right {
            let i = ((y as usize) * w + (x as usize)) * 4;
            mask.push(if rule.matches(px[i], px[i + 1], px[i + 2]) {
                255
            } else {
                0
            });
        }
    }
    mask
}

#[cfg(test)]
#[path = "../tests/unit/keying.rs"]
mod tests;
