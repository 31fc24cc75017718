use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::layout::Size;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an image handle. Clones of a handle share it; two handles
/// built from pixel-identical data do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

/// Read-only RGBA bitmap with a stable identity.
#[derive(Clone)]
pub struct ImageHandle {
    id: ImageId,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self::from_arc(Arc::new(pixels))
    }

    /// Wrap shared pixels. Every call mints a new identity.
    pub fn from_arc(pixels: Arc<RgbaImage>) -> Self {
        Self {
            id: ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)),
            pixels,
        }
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        Self::new(img.to_rgba8())
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageHandle {}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResampleError {
    #[error("cannot resample an empty {width}x{height} source")]
    EmptySource { width: u32, height: u32 },
    #[error("cannot resample to an empty {width}x{height} target")]
    EmptyTarget { width: u32, height: u32 },
}

/// `round(dim * magnification)` per axis. A non-empty axis never rounds to 0.
pub fn magnified_size(size: Size, magnification: f64) -> Size {
    let scale = |dim: u32| -> u32 {
        if dim == 0 {
            return 0;
        }
        ((dim as f64 * magnification).round() as u32).max(1)
    };
    Size::new(scale(size.width), scale(size.height))
}

/// Resample `src` to exactly `target`. Lanczos keeps reductions sharp.
pub fn downscale(src: &RgbaImage, target: Size) -> Result<RgbaImage, ResampleError> {
    if src.width() == 0 || src.height() == 0 {
        return Err(ResampleError::EmptySource {
            width: src.width(),
            height: src.height(),
        });
    }
    if target.is_empty() {
        return Err(ResampleError::EmptyTarget {
            width: target.width,
            height: target.height,
        });
    }
    Ok(imageops::resize(src, target.width, target.height, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity_but_copies_do_not() {
        let a = ImageHandle::new(RgbaImage::new(2, 2));
        let b = ImageHandle::new(RgbaImage::new(2, 2));
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_eq!(a.id(), a2.id());
        assert_ne!(a, b);
    }

    #[test]
    fn shared_pixels_still_get_new_identity() {
        let pixels = Arc::new(RgbaImage::new(1, 1));
        let a = ImageHandle::from_arc(Arc::clone(&pixels));
        let b = ImageHandle::from_arc(pixels);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn magnified_size_rounds_and_never_vanishes() {
        assert_eq!(magnified_size(Size::new(101, 50), 0.5), Size::new(51, 25));
        assert_eq!(magnified_size(Size::new(3, 3), 0.25), Size::new(1, 1));
        assert_eq!(magnified_size(Size::new(10, 0), 2.0), Size::new(20, 0));
    }

    #[test]
    fn downscale_hits_exact_target() {
        let src = RgbaImage::from_pixel(40, 20, image::Rgba([200, 10, 10, 255]));
        let out = downscale(&src, Size::new(10, 5)).unwrap();
        assert_eq!(out.dimensions(), (10, 5));
        assert_eq!(out.get_pixel(5, 2).0[3], 255);
    }

    #[test]
    fn downscale_rejects_empty_source_and_target() {
        let empty = RgbaImage::new(0, 4);
        assert_eq!(
            downscale(&empty, Size::new(1, 1)).unwrap_err(),
            ResampleError::EmptySource { width: 0, height: 4 }
        );
        let src = RgbaImage::new(4, 4);
        assert!(matches!(
            downscale(&src, Size::new(0, 2)),
            Err(ResampleError::EmptyTarget { .. })
        ));
    }
}
