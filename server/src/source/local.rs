//! Local image discovery
//!
//! Scans a directory tree for survey photos at startup and registers them
//! with the source store. Image names are the path relative to the images
//! directory, with forward slashes, so CPC path matching can use trailing
//! directory components.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::store::SourceStore;

/// Supported image file extensions
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A photo found on disk
#[derive(Debug, Clone)]
pub struct DiscoveredImage {
    /// Relative path from the images dir, forward slashes
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Scan `images_dir` recursively for supported images, probing dimensions.
///
/// Files that fail to probe are skipped with a warning.
pub fn scan_images(images_dir: &Path) -> Vec<DiscoveredImage> {
    let mut found = Vec::new();
    visit(images_dir, images_dir, &mut found);
    found.sort_by(|a, b| a.name.cmp(&b.name));
    info!("Found {} images in {:?}", found.len(), images_dir);
    found
}

fn visit(dir: &Path, base: &Path, found: &mut Vec<DiscoveredImage>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to read images directory {:?}: {}", dir, e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit(&path, base, found);
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let Some(ext) = ext else { continue };
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }

        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                if let Some(name) = relative_name(&path, base) {
                    debug!("Found image: {} ({}x{})", name, width, height);
                    found.push(DiscoveredImage {
                        name,
                        width,
                        height,
                    });
                }
            }
            Err(e) => {
                warn!("Skipping unreadable image {:?}: {}", path, e);
            }
        }
    }
}

fn relative_name(path: &Path, base: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(base).ok()?.to_path_buf();
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Register every discovered image with the store. Returns how many were
/// registered; per-image failures (e.g. duplicates on rescan) are logged
/// and skipped.
pub async fn register_local_images(store: &SourceStore, images_dir: &Path) -> usize {
    let mut registered = 0;
    for img in scan_images(images_dir) {
        match store
            .register_image(&img.name, img.width, img.height, None)
            .await
        {
            Ok(_) => registered += 1,
            Err(e) => warn!("Failed to register image '{}': {}", img.name, e),
        }
    }
    registered
}
