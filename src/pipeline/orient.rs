//! Orientation correction: forced quarter-turns and automatic deskew.
//!
//! Forced quarter-turns are exact pixel permutations and use the `image`
//! crate's own `rotate90`/`rotate180`/`rotate270`. Deskew rotates about the
//! image centre with bicubic (Keys, a = −0.75) resampling. Source coordinates
//! that fall outside the page are clamped to the nearest edge pixel, so
//! rotated corners repeat the page margin instead of turning black.
//!
//! Angles are in degrees; positive means counter-clockwise as seen on screen.
//!
//! ## Auto-detect
//!
//! 1. Reduce to 8-bit luma.
//! 2. Otsu threshold, inverted: pixels at or below the level are ink.
//! 3. Minimum-area rectangle around all ink pixels.
//! 4. Reduce the rectangle's edge angle modulo 90° into [−90°, 0°) and map it
//!    to a correction: `a < −45 → −(90 + a)`, otherwise `−a`.
//! 5. Rotate by the correction, keeping width and height.
//!
//! A page with no ink (uniform intensity) is returned untouched.

use crate::config::{QuarterTurn, Rotation};
use image::{DynamicImage, GrayImage, ImageBuffer, Pixel};
use imageproc::contrast::otsu_level;
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::{debug, info};

/// Keys cubic convolution parameter (same as OpenCV's `INTER_CUBIC`).
const CUBIC_A: f64 = -0.75;

/// Corrections below this are an identity for any realistic page size.
const MIN_CORRECTION_DEGREES: f64 = 1e-3;

/// Apply `rotation` to a rendered page.
pub fn correct_orientation(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Fixed(turn) => rotate_quarter(image, turn),
        Rotation::Auto => deskew(image),
    }
}

/// Rotate counter-clockwise by an exact quarter-turn. 90° and 270° swap
/// width and height.
///
/// `image` names its turns clockwise, so 90° here is its `rotate270`.
pub fn rotate_quarter(image: DynamicImage, turn: QuarterTurn) -> DynamicImage {
    let rotated = match turn {
        QuarterTurn::Deg0 => return image,
        QuarterTurn::Deg90 => image.rotate270(),
        QuarterTurn::Deg180 => image.rotate180(),
        QuarterTurn::Deg270 => image.rotate90(),
    };
    debug!(
        "Forced rotation {}° : {}x{} → {}x{}",
        turn.degrees(),
        image.width(),
        image.height(),
        rotated.width(),
        rotated.height()
    );
    rotated
}

/// Detect and remove small skew. Width and height are preserved.
pub fn deskew(image: DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let Some(correction) = detect_skew(&gray) else {
        debug!("No ink found; page left unchanged");
        return image;
    };
    if correction.abs() < MIN_CORRECTION_DEGREES {
        debug!("Page already straight");
        return image;
    }
    info!("Deskewing page by {:.2}°", correction);
    rotate_about_center(&image, correction, image.width(), image.height())
}

/// Corrective rotation for a grayscale page, or `None` when it has no ink.
pub fn detect_skew(gray: &GrayImage) -> Option<f64> {
    let points = ink_outline(gray)?;
    let corners = min_area_rect(&points);
    let reported = reported_angle(&corners);
    let correction = skew_correction(reported);
    debug!(
        "Ink rectangle angle {:.2}° → correction {:.2}°",
        reported, correction
    );
    Some(correction)
}

/// Map a rectangle angle in [−90°, 0°) to the skew correction.
///
/// The rectangle angle is only meaningful modulo 90°: a box tilted 10°
/// clockwise reports either −10° or −100° ≡ −10°, while one tilted 10°
/// counter-clockwise reports −80°. Folding at −45° picks the smaller of the
/// two candidate corrections.
pub fn skew_correction(reported: f64) -> f64 {
    if reported < -45.0 {
        -(90.0 + reported)
    } else {
        -reported
    }
}

/// Counter-clockwise angle of the rectangle's first non-degenerate edge,
/// reduced modulo 90° into [−90°, 0°).
pub fn reported_angle(corners: &[Point<i32>; 4]) -> f64 {
    let edge = corners
        .iter()
        .zip(corners.iter().cycle().skip(1))
        .map(|(a, b)| ((b.x - a.x) as f64, (b.y - a.y) as f64))
        .find(|&(dx, dy)| dx != 0.0 || dy != 0.0);

    let degrees = match edge {
        // Image y grows downwards; negate it to measure counter-clockwise.
        Some((dx, dy)) => (-dy).atan2(dx).to_degrees(),
        None => 0.0,
    };
    degrees.rem_euclid(90.0) - 90.0
}

/// Leftmost and rightmost ink pixel of every row.
///
/// The convex hull of these is the hull of all ink pixels, at a fraction of
/// the point count.
fn ink_outline(gray: &GrayImage) -> Option<Vec<Point<i32>>> {
    let (min, max) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if min >= max {
        return None;
    }

    let level = otsu_level(gray);
    let width = gray.width() as usize;
    let mut points = Vec::new();

    for (y, row) in gray.as_raw().chunks_exact(width).enumerate() {
        let first = row.iter().position(|&v| v <= level);
        let last = row.iter().rposition(|&v| v <= level);
        if let (Some(first), Some(last)) = (first, last) {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }

    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

/// Rotate `image` counter-clockwise by `degrees` about its centre into an
/// `out_w` × `out_h` canvas whose centre coincides with the source centre.
pub fn rotate_about_center(
    image: &DynamicImage,
    degrees: f64,
    out_w: u32,
    out_h: u32,
) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(warp_rotate(buf, degrees, out_w, out_h))
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(warp_rotate(buf, degrees, out_w, out_h))
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(warp_rotate(buf, degrees, out_w, out_h))
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(warp_rotate(buf, degrees, out_w, out_h))
        }
        other => DynamicImage::ImageRgba8(warp_rotate(&other.to_rgba8(), degrees, out_w, out_h)),
    }
}

/// `sin` and `cos` that are exact for multiples of 90°.
fn exact_sin_cos(degrees: f64) -> (f64, f64) {
    let d = degrees.rem_euclid(360.0);
    if d == 0.0 {
        (0.0, 1.0)
    } else if d == 90.0 {
        (1.0, 0.0)
    } else if d == 180.0 {
        (0.0, -1.0)
    } else if d == 270.0 {
        (-1.0, 0.0)
    } else {
        d.to_radians().sin_cos()
    }
}

fn warp_rotate<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    degrees: f64,
    out_w: u32,
    out_h: u32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    let (sin, cos) = exact_sin_cos(degrees);
    // Pixel centres, so quarter turns land exactly on source pixels.
    let (cx, cy) = ((w as f64 - 1.0) / 2.0, (h as f64 - 1.0) / 2.0);
    let (ox, oy) = ((out_w as f64 - 1.0) / 2.0, (out_h as f64 - 1.0) / 2.0);

    let mut out = ImageBuffer::<P, Vec<u8>>::new(out_w, out_h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f64 - ox;
        let dy = y as f64 - oy;
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        sample_bicubic(src, sx, sy, pixel.channels_mut());
    }
    out
}

/// Bicubic sample at `(sx, sy)` with edge replication.
fn sample_bicubic<P>(src: &ImageBuffer<P, Vec<u8>>, sx: f64, sy: f64, dst: &mut [u8])
where
    P: Pixel<Subpixel = u8>,
{
    let (w, h) = src.dimensions();
    let (x0, y0) = (sx.floor(), sy.floor());
    let wx = cubic_weights(sx - x0);
    let wy = cubic_weights(sy - y0);

    let mut acc = [0.0f64; 4];
    for (j, &wyj) in wy.iter().enumerate() {
        let py = clamp_index(y0 as i64 + j as i64 - 1, h);
        for (i, &wxi) in wx.iter().enumerate() {
            let px = clamp_index(x0 as i64 + i as i64 - 1, w);
            let weight = wyj * wxi;
            for (a, &c) in acc.iter_mut().zip(src.get_pixel(px, py).channels()) {
                *a += weight * c as f64;
            }
        }
    }
    for (d, a) in dst.iter_mut().zip(acc) {
        *d = a.round().clamp(0.0, 255.0) as u8;
    }
}

fn clamp_index(i: i64, len: u32) -> u32 {
    i.clamp(0, len as i64 - 1) as u32
}

/// Weights for the four taps at offsets −1, 0, 1, 2 from `floor(x)`.
fn cubic_weights(t: f64) -> [f64; 4] {
    [
        cubic_kernel(1.0 + t),
        cubic_kernel(t),
        cubic_kernel(1.0 - t),
        cubic_kernel(2.0 - t),
    ]
}

fn cubic_kernel(x: f64) -> f64 {
    let x = x.abs();
    if x <= 1.0 {
        ((CUBIC_A + 2.0) * x - (CUBIC_A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((CUBIC_A * x - 5.0 * CUBIC_A) * x + 8.0 * CUBIC_A) * x - 4.0 * CUBIC_A
    } else {
        0.0
    }
}
