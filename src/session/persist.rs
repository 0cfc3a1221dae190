//! Label and class file persistence.
//!
//! A missing label file means "no annotations": saving an image with zero
//! boxes deletes its file instead of leaving an empty one behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::classes::{ClassRegistry, Rgb};
use crate::error::YoloEditError;
use crate::geometry::{BoundingBox, ImageDims};
use crate::layout::{classes_path, label_path};
use crate::yolo::{decode_labels, encode_boxes, DecodedLabels};

/// What saving one image did on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The label file was (re)written.
    Written { records: usize },
    /// The image has no boxes and its stale label file was deleted.
    Removed,
    /// The image has no boxes and had no label file.
    Nothing,
}

/// Writes the label file for one image, or deletes it when `boxes` is empty.
pub fn save_image(
    labels_dir: &Path,
    image: &Path,
    boxes: &[BoundingBox],
    dims: ImageDims,
    classes: &ClassRegistry,
) -> Result<SaveOutcome, YoloEditError> {
    let path = label_path(labels_dir, image);

    if boxes.is_empty() {
        return match fs::remove_file(&path) {
            Ok(()) => Ok(SaveOutcome::Removed),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(SaveOutcome::Nothing),
            Err(source) => Err(YoloEditError::LabelIo { path, source }),
        };
    }

    let content = encode_boxes(boxes, dims, classes)?;
    fs::write(&path, content).map_err(|source| YoloEditError::LabelIo {
        path: path.clone(),
        source,
    })?;

    Ok(SaveOutcome::Written {
        records: boxes.len(),
    })
}

/// Reads and decodes the label file for one image.
///
/// Returns `Ok(None)` when the image has no label file.
pub fn load_image(
    labels_dir: &Path,
    image: &Path,
    dims: ImageDims,
    classes: &ClassRegistry,
) -> Result<Option<DecodedLabels>, YoloEditError> {
    let path = label_path(labels_dir, image);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(YoloEditError::LabelIo { path, source }),
    };

    let decoded = decode_labels(&content, dims, classes);
    if decoded.dropped() > 0 {
        log::debug!(
            "{}: dropped {} malformed and {} unknown-class record(s)",
            path.display(),
            decoded.malformed,
            decoded.unknown_class
        );
    }
    Ok(Some(decoded))
}

/// Writes `classes.txt`, one class name per line in positional order.
///
/// An empty registry writes nothing and returns `Ok(None)`, so an existing
/// class list is never truncated.
pub fn save_classes(
    image_dir: &Path,
    classes: &ClassRegistry,
) -> Result<Option<PathBuf>, YoloEditError> {
    if classes.is_empty() {
        return Ok(None);
    }

    let path = classes_path(image_dir);
    let mut content = String::new();
    for class in classes.all() {
        content.push_str(&class.name);
        content.push('\n');
    }

    fs::write(&path, content).map_err(|source| YoloEditError::ClassesIo {
        path: path.clone(),
        source,
    })?;
    Ok(Some(path))
}

/// Reads `classes.txt` into a fresh registry.
///
/// Returns `Ok(None)` when the file does not exist. Each non-blank line
/// becomes a class whose export id is its zero-based line index; blank lines
/// are skipped but still use up an index. Colors come from the fixed palette
/// for the first lines and are random after that. A repeated name is
/// skipped.
pub fn load_classes(image_dir: &Path) -> Result<Option<ClassRegistry>, YoloEditError> {
    let path = classes_path(image_dir);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(YoloEditError::ClassesIo { path, source }),
    };

    let mut registry = ClassRegistry::new();
    for (line_idx, line) in content.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        let export_id = u32::try_from(line_idx).unwrap_or(u32::MAX);
        match registry.add(name, Some(Rgb::for_line(line_idx)), Some(export_id)) {
            Ok(_) => {}
            Err(YoloEditError::DuplicateClass(name)) => {
                log::warn!(
                    "{}: line {} repeats class '{}', skipping",
                    path.display(),
                    line_idx + 1,
                    name
                );
            }
            Err(err) => return Err(err),
        }
    }

    log::info!("imported {} class(es) from {}", registry.len(), path.display());
    Ok(Some(registry))
}
