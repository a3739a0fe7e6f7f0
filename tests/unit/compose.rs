use super::*;

use crate::foundation::core::KeyRegion;

const GREEN: [u8; 4] = [0, 255, 0, 255];
const GRAY: [u8; 4] = [90, 90, 90, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn solid(width: u32, height: u32, px: [u8; 4]) -> Raster {
    Raster::from_rgba8(width, height, px.repeat((width * height) as usize)).unwrap()
}

/// Gray template with a solid keyed rectangle at (left, top)..(right, bottom).
fn template_with_hole(width: u32, height: u32, hole: KeyRegion) -> Raster {
    let mut buf = GRAY.repeat((width * height) as usize);
    for y in hole.top..hole.bottom {
        for x in hole.left..hole.right {
            let i = ((y * width + x) * 4) as usize;
            buf[i..i + 4].copy_from_slice(&GREEN);
        }
    }
    Raster::from_rgba8(width, height, buf).unwrap()
}

#[test]
fn place_axis_clamps_to_region() {
    assert_eq!(place_axis(100, 40, 0), 30);
    assert_eq!(place_axis(100, 40, 1000), 60);
    assert_eq!(place_axis(100, 40, -1000), 0);
}

#[test]
fn place_axis_pins_oversized_content() {
    // clamp range collapses to the single value region - content
    assert_eq!(place_axis(100, 150, 0), -50);
    assert_eq!(place_axis(100, 150, 1000), -50);
    assert_eq!(place_axis(100, 150, -1000), -50);
}

#[test]
fn fit_stretch_ignores_aspect() {
    assert_eq!(fit_dimensions(10, 100, 50, 20, FitMode::Stretch), (50, 20));
}

#[test]
fn fit_preserve_aspect_contains() {
    // 100x50 into 40x40: larger dimension fits, the other shrinks with it
    assert_eq!(
        fit_dimensions(100, 50, 40, 40, FitMode::PreserveAspect),
        (40, 20)
    );
    // upscaling is allowed
    assert_eq!(
        fit_dimensions(10, 5, 40, 40, FitMode::PreserveAspect),
        (40, 20)
    );
}

#[test]
fn resample_is_exact_at_same_size() {
    let r = solid(7, 3, RED);
    let out = resample(&r, 7, 3).unwrap();
    assert_eq!(out, r);
}

#[test]
fn resample_changes_dimensions() {
    let r = solid(8, 8, RED);
    let out = resample(&r, 4, 2).unwrap();
    assert_eq!((out.width(), out.height()), (4, 2));
    let px = out.pixel(1, 1);
    assert!(px[0] >= 250 && px[1] <= 5 && px[3] == 255);
}

#[test]
fn render_without_content_clears_overlay() {
    let hole = KeyRegion::new(2, 2, 6, 5).unwrap();
    let template = template_with_hole(10, 8, hole);
    let out = render_overlay(
        &template,
        hole,
        None,
        FitMode::Stretch,
        (0, 0),
        KeyRule::default(),
    )
    .unwrap();
    assert_eq!(out, Raster::transparent(4, 3));
}

#[test]
fn render_masks_content_to_keyed_pixels() {
    // keyed pixels: only the left column of the 2x2 bounding box
    let mut buf = GRAY.repeat(6 * 6);
    for y in 2..4 {
        let i = ((y * 6 + 2) * 4) as usize;
        buf[i..i + 4].copy_from_slice(&GREEN);
    }
    let template = Raster::from_rgba8(6, 6, buf).unwrap();
    let hole = KeyRegion::new(2, 2, 3, 4).unwrap();

    let content = solid(1, 2, RED);
    let out = render_overlay(
        &template,
        hole,
        Some(&content),
        FitMode::Stretch,
        (0, 0),
        KeyRule::default(),
    )
    .unwrap();

    assert_eq!((out.width(), out.height()), (1, 2));
    assert_eq!(out.pixel(0, 0), RED);
    assert_eq!(out.pixel(0, 1), RED);
}

#[test]
fn render_clips_outside_irregular_key_shape() {
    // bounding box 2x1 but only the left pixel is keyed
    let mut buf = GRAY.repeat(5 * 3);
    let left = ((1 * 5 + 1) * 4) as usize;
    buf[left..left + 4].copy_from_slice(&GREEN);
    // non-keyed pixel inside the would-be box stays gray, widen box via a
    // second keyed pixel two columns over
    let right = ((1 * 5 + 3) * 4) as usize;
    buf[right..right + 4].copy_from_slice(&GREEN);
    let template = Raster::from_rgba8(5, 3, buf).unwrap();

    let hole = crate::keying::detect_key_region(&template, KeyRule::default()).unwrap();
    assert_eq!(hole, KeyRegion::new(1, 1, 4, 2).unwrap());

    let content = solid(3, 1, RED);
    let out = render_overlay(
        &template,
        hole,
        Some(&content),
        FitMode::Stretch,
        (0, 0),
        KeyRule::default(),
    )
    .unwrap();

    assert_eq!(out.pixel(0, 0)[3], 255);
    assert_eq!(out.pixel(1, 0)[3], 0); // gray gap inside the bounding box
    assert_eq!(out.pixel(2, 0)[3], 255);
}

#[test]
fn render_is_idempotent_for_unchanged_inputs() {
    let hole = KeyRegion::new(1, 1, 7, 5).unwrap();
    let template = template_with_hole(9, 6, hole);
    let content = solid(12, 9, RED);

    let a = render_overlay(
        &template,
        hole,
        Some(&content),
        FitMode::PreserveAspect,
        (3, -2),
        KeyRule::default(),
    )
    .unwrap();
    let b = render_overlay(
        &template,
        hole,
        Some(&content),
        FitMode::PreserveAspect,
        (3, -2),
        KeyRule::default(),
    )
    .unwrap();
    assert_eq!(a.rgba8(), b.rgba8());
}

#[test]
fn render_respects_offset_placement() {
    let hole = KeyRegion::new(0, 0, 4, 1).unwrap();
    let template = template_with_hole(4, 1, hole);
    // 1px content in a 4px row, offset far right: clamped to x = 3
    let content = solid(1, 1, RED);
    let out = render_overlay(
        &template,
        hole,
        Some(&content),
        FitMode::PreserveAspect,
        (100, 0),
        KeyRule::default(),
    )
    .unwrap();
    assert_eq!(out.pixel(3, 0), RED);
    assert_eq!(out.pixel(0, 0)[0], 0); // nothing drawn at the left
}

#[test]
fn straight_over_respects_source_alpha() {
    let dst = [0, 0, 0, 0];
    let src = [200, 100, 50, 128];
    assert_eq!(straight_over(dst, src), src);

    let dst = [10, 20, 30, 255];
    let out = straight_over(dst, [200, 100, 50, 0]);
    assert_eq!(out, dst);
}
