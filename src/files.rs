use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tga", "tiff", "tif", "webp", "ico", "pnm", "pbm",
    "pgm", "ppm", "pam", "dds", "hdr", "exr", "ff", "qoi",
];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand the command-line paths into image files. Explicit files keep their
/// argument order; each directory contributes its images sorted by name,
/// then (when `recursive`) its subdirectories in name order.
pub fn collect_images(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let start_time = Instant::now();
    let mut found = Vec::new();

    for path in paths {
        if path.is_dir() {
            scan_dir(path, recursive, &mut found);
        } else if path.is_file() && is_image_file(path) {
            found.push(path.clone());
        } else {
            log::warn!("Skipping {:?}: not an image file or directory", path);
        }
    }

    log::info!(
        "Scan complete in {:.2}s. Found {} images.",
        start_time.elapsed().as_secs_f64(),
        found.len()
    );
    found
}

fn scan_dir(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read {:?}: {}", dir, e);
            return;
        }
    };
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in entries.filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && is_image_file(&p) {
            files.push(p);
        } else if recursive && p.is_dir() {
            subdirs.push(p);
        }
    }

    files.sort();
    if !files.is_empty() {
        log::debug!("Scanning {:?}... ({} images)", dir, files.len());
    }
    found.extend(files);

    if recursive {
        subdirs.sort();
        for sub in subdirs {
            scan_dir(&sub, true, found);
        }
    }
}
