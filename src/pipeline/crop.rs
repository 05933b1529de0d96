//! Uniform margin crop.

use crate::error::Pdf2ImgError;
use image::{DynamicImage, GenericImageView};

/// Check that `margin` leaves a non-empty image on a `width` × `height` page.
///
/// Run before anything is written for the page so a bad margin never leaves
/// a partial set of artifacts behind.
pub fn check_margin(page: usize, margin: u32, width: u32, height: u32) -> Result<(), Pdf2ImgError> {
    let twice = u64::from(margin) * 2;
    if twice >= u64::from(width) || twice >= u64::from(height) {
        return Err(Pdf2ImgError::CropExceedsPage {
            page,
            margin,
            width,
            height,
        });
    }
    Ok(())
}

/// Remove `margin` pixels from all four edges of page `page` (1-based).
///
/// The result is `(w − 2m) × (h − 2m)`. A zero margin returns the input.
pub fn crop_margin(image: DynamicImage, margin: u32, page: usize) -> Result<DynamicImage, Pdf2ImgError> {
    if margin == 0 {
        return Ok(image);
    }
    let (w, h) = image.dimensions();
    check_margin(page, margin, w, h)?;
    Ok(image.crop_imm(margin, margin, w - 2 * margin, h - 2 * margin))
}
