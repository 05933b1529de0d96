//! Vertical page split for double-page spreads.

use crate::error::Pdf2ImgError;
use crate::output::Side;
use image::DynamicImage;

/// A processed page: either kept whole or cut into two halves.
#[derive(Debug, Clone)]
pub enum PageParts {
    Whole(DynamicImage),
    Spread {
        left: DynamicImage,
        right: DynamicImage,
    },
}

impl PageParts {
    /// The images to write, each tagged with its side when split.
    pub fn into_parts(self) -> Vec<(Option<Side>, DynamicImage)> {
        match self {
            PageParts::Whole(img) => vec![(None, img)],
            PageParts::Spread { left, right } => {
                vec![(Some(Side::Left), left), (Some(Side::Right), right)]
            }
        }
    }

    pub fn count(&self) -> usize {
        match self {
            PageParts::Whole(_) => 1,
            PageParts::Spread { .. } => 2,
        }
    }
}

/// Split page `page` (1-based) at `floor(w / 2)` when `split` is set.
///
/// Left is `[0, w/2)`, right is `[w/2, w)`; for odd widths the right half
/// takes the extra column. Both halves keep the full height.
pub fn split_page(image: DynamicImage, split: bool, page: usize) -> Result<PageParts, Pdf2ImgError> {
    if !split {
        return Ok(PageParts::Whole(image));
    }
    let (w, h) = (image.width(), image.height());
    if w < 2 {
        return Err(Pdf2ImgError::PageTooNarrowToSplit { page, width: w });
    }
    let mid = w / 2;
    Ok(PageParts::Spread {
        left: image.crop_imm(0, 0, mid, h),
        right: image.crop_imm(mid, 0, w - mid, h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn columns(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, _| Luma([x as u8])))
    }

    #[test]
    fn no_split_passes_through() {
        let img = columns(10, 4);
        match split_page(img.clone(), false, 1).unwrap() {
            PageParts::Whole(out) => assert_eq!(out, img),
            other => panic!("expected Whole, got {other:?}"),
        }
    }

    #[test]
    fn even_width_splits_evenly() {
        let parts = split_page(columns(10, 4), true, 1).unwrap();
        assert_eq!(parts.count(), 2);
        let PageParts::Spread { left, right } = parts else {
            panic!("expected Spread");
        };
        assert_eq!((left.width(), left.height()), (5, 4));
        assert_eq!((right.width(), right.height()), (5, 4));
        assert_eq!(right.to_luma8().get_pixel(0, 0)[0], 5);
    }

    #[test]
    fn odd_width_gives_right_the_extra_column() {
        let PageParts::Spread { left, right } = split_page(columns(11, 3), true, 1).unwrap() else {
            panic!("expected Spread");
        };
        assert_eq!(left.width(), 5);
        assert_eq!(right.width(), 6);
        assert_eq!(left.width() + right.width(), 11);
    }

    #[test]
    fn parts_are_left_then_right() {
        let parts = split_page(columns(4, 2), true, 1).unwrap().into_parts();
        let sides: Vec<_> = parts.iter().map(|(s, _)| *s).collect();
        assert_eq!(sides, vec![Some(Side::Left), Some(Side::Right)]);
    }

    #[test]
    fn one_pixel_page_cannot_split() {
        let err = split_page(columns(1, 5), true, 2).unwrap_err();
        assert!(matches!(
            err,
            Pdf2ImgError::PageTooNarrowToSplit { page: 2, width: 1 }
        ));
    }
}
