use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use siv::ImageHandle;

fn decode_image(path: &Path) -> Result<ImageHandle, image::ImageError> {
    let img = image::open(path)?;
    Ok(ImageHandle::from_dynamic(img))
}

/// Decode `paths` in parallel, keeping their order. Files that fail to
/// decode are logged and left out.
pub fn load_images(paths: &[PathBuf]) -> Vec<ImageHandle> {
    let start_time = Instant::now();
    let decoded: Vec<Option<ImageHandle>> = paths
        .par_iter()
        .map(|path| match decode_image(path) {
            Ok(handle) => {
                log::debug!("Decoded {:?} ({}x{})", path, handle.width(), handle.height());
                Some(handle)
            }
            Err(e) => {
                log::warn!("Could not load {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let images: Vec<ImageHandle> = decoded.into_iter().flatten().collect();
    log::info!(
        "Decoded {}/{} images in {:.2}s",
        images.len(),
        paths.len(),
        start_time.elapsed().as_secs_f64()
    );
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn keeps_order_and_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let wide = dir.path().join("wide.png");
        let broken = dir.path().join("broken.png");
        let tall = dir.path().join("tall.png");
        RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255])).save(&wide).unwrap();
        std::fs::write(&broken, b"not a png").unwrap();
        RgbaImage::from_pixel(2, 4, Rgba([4, 5, 6, 255])).save(&tall).unwrap();

        let images = load_images(&[wide, broken, tall]);

        assert_eq!(images.len(), 2);
        assert_eq!((images[0].width(), images[0].height()), (4, 2));
        assert_eq!((images[1].width(), images[1].height()), (2, 4));
        assert_ne!(images[0].id(), images[1].id());
    }
}
