//! Where label files live relative to their images.
//!
//! An image directory that is, or sits under, an `images` directory keeps its
//! labels in a `labels` sibling at the same parent level. Any other image
//! directory gets a `labels/` subdirectory of its own.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::YoloEditError;
use crate::yolo::LABEL_EXTENSION;

const IMAGES_DIR_NAME: &str = "images";
const LABELS_DIR_NAME: &str = "labels";

/// Name of the class list stored next to the images.
pub const CLASSES_FILE_NAME: &str = "classes.txt";

/// Labels directory for an image directory, without touching the filesystem.
///
/// When any path segment is exactly `images`, labels go to `labels` under the
/// image directory's parent: `data/images` maps to `data/labels` and
/// `data/images/train` to `data/images/labels`. Other paths map to
/// `<dir>/labels`.
pub fn labels_dir_for(image_dir: &Path) -> PathBuf {
    let has_images_segment = image_dir
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == IMAGES_DIR_NAME));

    match image_dir.parent() {
        Some(parent) if has_images_segment => parent.join(LABELS_DIR_NAME),
        _ => image_dir.join(LABELS_DIR_NAME),
    }
}

/// Resolves the labels directory for an image directory and creates it.
///
/// Calling this repeatedly is harmless.
pub fn ensure_labels_dir(image_dir: &Path) -> Result<PathBuf, YoloEditError> {
    let dir = labels_dir_for(image_dir);
    fs::create_dir_all(&dir).map_err(|source| YoloEditError::LabelIo {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Label file for an image: its file stem with a `.txt` extension.
pub fn label_path(labels_dir: &Path, image_path: &Path) -> PathBuf {
    let mut file_name = image_path
        .file_stem()
        .unwrap_or(image_path.as_os_str())
        .to_os_string();
    file_name.push(".");
    file_name.push(LABEL_EXTENSION);
    labels_dir.join(file_name)
}

/// Location of `classes.txt` for an image directory.
pub fn classes_path(image_dir: &Path) -> PathBuf {
    image_dir.join(CLASSES_FILE_NAME)
}
