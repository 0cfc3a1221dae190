//! Image discovery and dimension probing.
//!
//! Images are never decoded here. Scanning only lists files, and the
//! [`ImageSource`] collaborator supplies pixel dimensions, by default by
//! reading image headers with `imagesize`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::YoloEditError;
use crate::geometry::ImageDims;

/// Extensions recognized as images, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// Supplies pixel dimensions for images.
pub trait ImageSource {
    fn dimensions(&self, path: &Path) -> Result<ImageDims, YoloEditError>;
}

/// Reads dimensions from image file headers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageSizeProbe;

impl ImageSource for ImageSizeProbe {
    fn dimensions(&self, path: &Path) -> Result<ImageDims, YoloEditError> {
        read_image_dimensions(path)
    }
}

/// Lists the images directly inside `root`, de-duplicated and sorted.
pub fn scan_images(root: &Path) -> Result<Vec<PathBuf>, YoloEditError> {
    if !root.is_dir() {
        return Err(YoloEditError::Scan {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = BTreeSet::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| YoloEditError::Scan {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.insert(entry.into_path());
        }
    }

    Ok(files.into_iter().collect())
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn read_image_dimensions(path: &Path) -> Result<ImageDims, YoloEditError> {
    let size = imagesize::size(path).map_err(|source| YoloEditError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size.width.try_into().map_err(|_| YoloEditError::Scan {
        path: path.to_path_buf(),
        message: format!("image width {} does not fit in u32", size.width),
    })?;

    let height: u32 = size.height.try_into().map_err(|_| YoloEditError::Scan {
        path: path.to_path_buf(),
        message: format!("image height {} does not fit in u32", size.height),
    })?;

    Ok(ImageDims::new(width, height))
}
