//! [`Dimensions`] for decoded `image` crate buffers.

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::resource::Dimensions;

impl Dimensions for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::dimensions(self).0
    }

    fn height(&self) -> u32 {
        GenericImageView::dimensions(self).1
    }
}

impl Dimensions for RgbaImage {
    fn width(&self) -> u32 {
        GenericImageView::dimensions(self).0
    }

    fn height(&self) -> u32 {
        GenericImageView::dimensions(self).1
    }
}
