//! The annotation session: one opened image directory and everything being
//! edited in it.
//!
//! A [`Session`] owns the class registry, the box store and the active
//! image. Renderers feed it pointer events in view coordinates and read
//! back [`Session::render_boxes`] together with [`Session::transform`].
//! Every completed edit is written to the image's label file straight away.

mod persist;

pub use persist::{load_classes, load_image, save_classes, save_image, SaveOutcome};

use std::path::{Path, PathBuf};

use crate::classes::{ClassRegistry, Rgb};
use crate::error::YoloEditError;
use crate::geometry::{
    fit_transform, handle_radius, to_image_coords, BoundingBox, Coord, Image, ImageDims, View,
    ViewTransform,
};
use crate::layout::{classes_path, ensure_labels_dir};
use crate::report::{BatchFailure, BatchKind, BatchReport, ImageSummary, SessionSummary};
use crate::scan::{scan_images, ImageSizeProbe, ImageSource};
use crate::store::{BoxStore, Cascade, Edit, Gesture, ImageKey};

/// What [`Session::open`] should import besides the image list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenOptions {
    /// Replace the registry with `classes.txt` when the file exists.
    pub load_classes: bool,
    /// Load every label file once classes are known.
    pub load_annotations: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            load_classes: true,
            load_annotations: true,
        }
    }
}

/// Result of opening a directory.
#[derive(Clone, Debug)]
pub struct OpenSummary {
    pub images: usize,
    /// Number of classes read from `classes.txt`, if it was imported.
    pub classes_imported: Option<usize>,
    /// Set when `classes.txt` exists but could not be read. The registry is
    /// left unchanged and the open carries on.
    pub classes_failure: Option<BatchFailure>,
    /// Annotation load report, if annotations were loaded.
    pub load: Option<BatchReport>,
}

/// Result of loading one image's label file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Whether a label file existed.
    pub present: bool,
    pub loaded: usize,
    pub malformed: usize,
    pub unknown_class: usize,
}

#[derive(Clone, Debug)]
struct ImageEntry {
    path: PathBuf,
    key: ImageKey,
    dims: Option<ImageDims>,
}

/// An editing session over one image directory.
#[derive(Debug)]
pub struct Session<S = ImageSizeProbe> {
    source: S,
    root: Option<PathBuf>,
    labels_dir: Option<PathBuf>,
    images: Vec<ImageEntry>,
    current: usize,
    classes: ClassRegistry,
    selected_class: Option<usize>,
    store: BoxStore,
    selected_box: Option<usize>,
    viewport: (u32, u32),
    transform: Option<ViewTransform>,
}

impl Session<ImageSizeProbe> {
    /// A session that reads image dimensions from file headers.
    pub fn new() -> Self {
        Self::with_source(ImageSizeProbe)
    }
}

impl Default for Session<ImageSizeProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ImageSource> Session<S> {
    /// A session with the default classes and no directory opened.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            root: None,
            labels_dir: None,
            images: Vec::new(),
            current: 0,
            classes: ClassRegistry::with_defaults(),
            selected_class: Some(0),
            store: BoxStore::new(),
            selected_box: None,
            viewport: (0, 0),
            transform: None,
        }
    }

    // Directory

    /// Opens an image directory.
    ///
    /// The directory is scanned, its labels directory is created if needed
    /// and all in-memory annotations are dropped. Depending on `options`,
    /// `classes.txt` is imported and then every label file is loaded; label
    /// files are only read when at least one class exists. An unreadable
    /// `classes.txt` is reported in the summary instead of failing the open.
    /// The first image becomes active.
    pub fn open(&mut self, root: &Path, options: OpenOptions) -> Result<OpenSummary, YoloEditError> {
        let paths = scan_images(root)?;
        let labels_dir = ensure_labels_dir(root)?;

        self.images = paths
            .into_iter()
            .map(|path| ImageEntry {
                key: ImageKey::from_path(&path),
                path,
                dims: None,
            })
            .collect();
        self.root = Some(root.to_path_buf());
        self.labels_dir = Some(labels_dir);
        self.current = 0;
        self.selected_box = None;
        self.store.clear_all();

        log::info!("opened {} with {} image(s)", root.display(), self.images.len());

        let mut classes_failure = None;
        let classes_imported = if options.load_classes {
            match self.load_classes() {
                Ok(count) => count,
                Err(err) => {
                    log::warn!("{err}");
                    classes_failure = Some(BatchFailure {
                        path: classes_path(root),
                        message: err.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        let load = if options.load_annotations && !self.classes.is_empty() {
            Some(self.load_all()?)
        } else {
            None
        };

        self.refresh_transform();

        Ok(OpenSummary {
            images: self.images.len(),
            classes_imported,
            classes_failure,
            load,
        })
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn labels_dir(&self) -> Option<&Path> {
        self.labels_dir.as_deref()
    }

    /// Image paths in display order.
    pub fn images(&self) -> impl Iterator<Item = &Path> {
        self.images.iter().map(|entry| entry.path.as_path())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.images.is_empty()).then_some(self.current)
    }

    pub fn current_image(&self) -> Option<&Path> {
        self.images.get(self.current).map(|entry| entry.path.as_path())
    }

    fn current_key(&self) -> Option<ImageKey> {
        self.images.get(self.current).map(|entry| entry.key.clone())
    }

    fn index_of_path(&self, image: &Path) -> Result<usize, YoloEditError> {
        let key = ImageKey::from_path(image);
        self.index_of_key(&key)
    }

    fn index_of_key(&self, key: &ImageKey) -> Result<usize, YoloEditError> {
        self.images
            .iter()
            .position(|entry| &entry.key == key)
            .ok_or_else(|| YoloEditError::ImageNotInSession(key.to_string()))
    }

    fn dims_at(&mut self, index: usize) -> Result<ImageDims, YoloEditError> {
        let entry = self
            .images
            .get_mut(index)
            .ok_or_else(|| YoloEditError::ImageNotInSession(format!("image #{index}")))?;
        if let Some(dims) = entry.dims {
            return Ok(dims);
        }
        let dims = self.source.dimensions(&entry.path)?;
        entry.dims = Some(dims);
        Ok(dims)
    }

    // View

    /// Sets the viewport size in view pixels and refits the active image.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.refresh_transform();
    }

    /// Transform of the active image, or `None` when no image is shown.
    pub fn transform(&self) -> Option<&ViewTransform> {
        self.transform.as_ref()
    }

    /// Dimensions of the active image, when known.
    pub fn current_dims(&self) -> Option<ImageDims> {
        self.images.get(self.current).and_then(|entry| entry.dims)
    }

    /// Maps a view point into the active image.
    pub fn to_image(&self, view: Coord<View>) -> Option<Coord<Image>> {
        to_image_coords(view, self.transform.as_ref(), self.current_dims())
    }

    fn refresh_transform(&mut self) {
        self.transform = None;
        if self.images.is_empty() {
            return;
        }
        match self.dims_at(self.current) {
            Ok(dims) => {
                let (vw, vh) = self.viewport;
                self.transform = Some(fit_transform(dims.width, dims.height, vw, vh));
            }
            Err(err) => log::warn!("{err}"),
        }
    }

    // Pointer routing

    /// Handles a pointer press at a view position.
    ///
    /// Corner handles of every box are tested first, then box bodies, in
    /// stored order. A handle hit starts a resize and a body hit starts a
    /// move, selecting that box. Otherwise the selection is cleared and a
    /// draw starts, provided a class is selected.
    pub fn pointer_down(&mut self, view: Coord<View>) {
        let (Some(key), Some(transform), Some(dims)) =
            (self.current_key(), self.transform, self.current_dims())
        else {
            return;
        };
        let point = transform.to_image(view, dims);
        let radius = handle_radius(transform.scale);

        if let Some((index, handle)) = self.store.hit_handle(&key, point, radius) {
            self.selected_box = Some(index);
            self.store.begin_resize(&key, index, handle, dims);
        } else if let Some(index) = self.store.hit_box(&key, point) {
            self.selected_box = Some(index);
            self.store.begin_move(&key, index, point, dims);
        } else {
            self.selected_box = None;
            if let Some(class_index) = self.selected_class {
                self.store.begin_draw(&key, class_index, view);
            }
        }
    }

    /// Updates the active gesture with a new pointer position.
    pub fn pointer_drag(&mut self, view: Coord<View>) {
        match self.store.gesture() {
            Gesture::Idle => {}
            Gesture::Drawing { .. } => self.store.update_draw(view),
            Gesture::Moving { .. } => {
                if let Some(point) = self.to_image(view) {
                    self.store.update_move(point);
                }
            }
            Gesture::Resizing { .. } => {
                if let Some(point) = self.to_image(view) {
                    self.store.update_resize(point);
                }
            }
        }
    }

    /// Finishes the active gesture and saves the image it edited.
    ///
    /// `Ok(None)` means nothing changed (no gesture, or a draw too small to
    /// keep). An error means the edit was applied in memory but writing the
    /// label file failed.
    pub fn pointer_up(&mut self, view: Coord<View>) -> Result<Option<Edit>, YoloEditError> {
        let (Some(transform), Some(dims)) = (self.transform, self.current_dims()) else {
            self.store.abort_gesture();
            return Ok(None);
        };

        let edit = match self.store.gesture() {
            Gesture::Idle => None,
            Gesture::Drawing { .. } => self.store.end_draw(view, &transform, dims),
            Gesture::Moving { .. } => {
                self.store.update_move(transform.to_image(view, dims));
                self.store.end_move()
            }
            Gesture::Resizing { .. } => {
                self.store.update_resize(transform.to_image(view, dims));
                self.store.end_resize()
            }
        };

        match edit {
            Some(edit) => {
                self.persist(&edit)?;
                Ok(Some(edit))
            }
            None => Ok(None),
        }
    }

    /// Active gesture, for renderers that draw a rubber band.
    pub fn gesture(&self) -> &Gesture {
        self.store.gesture()
    }

    /// Discards the active gesture. Stored boxes are left as they were.
    pub fn abort_gesture(&mut self) {
        self.store.abort_gesture();
    }

    pub fn selected_box(&self) -> Option<usize> {
        self.selected_box
    }

    /// Clears the box selection and discards any gesture.
    pub fn deselect(&mut self) {
        self.selected_box = None;
        self.store.abort_gesture();
    }

    // Box edits

    /// Deletes the selected box. Returns `Ok(None)` when nothing is selected.
    pub fn delete_selected(&mut self) -> Result<Option<Edit>, YoloEditError> {
        match self.selected_box {
            Some(index) => self.delete_box(index),
            None => Ok(None),
        }
    }

    /// Deletes a box of the active image by index.
    pub fn delete_box(&mut self, index: usize) -> Result<Option<Edit>, YoloEditError> {
        let Some(key) = self.current_key() else {
            return Ok(None);
        };
        let Some(edit) = self.store.delete(&key, index) else {
            return Ok(None);
        };
        self.selected_box = None;
        self.persist(&edit)?;
        Ok(Some(edit))
    }

    /// Removes every box of the active image.
    pub fn clear_current(&mut self) -> Result<Option<Edit>, YoloEditError> {
        let Some(key) = self.current_key() else {
            return Ok(None);
        };
        let edit = self.store.clear(&key);
        self.selected_box = None;
        self.persist(&edit)?;
        Ok(Some(edit))
    }

    fn persist(&mut self, edit: &Edit) -> Result<(), YoloEditError> {
        let index = self.index_of_key(&edit.image)?;
        self.save_at(index).map(|_| ())
    }

    /// Snapshot of the active image's boxes, with any gesture preview applied.
    pub fn render_boxes(&self) -> Vec<BoundingBox> {
        self.images
            .get(self.current)
            .map(|entry| self.store.render_boxes(&entry.key))
            .unwrap_or_default()
    }

    /// Stored boxes of any image in the session.
    pub fn boxes(&self, image: &Path) -> Result<&[BoundingBox], YoloEditError> {
        let index = self.index_of_path(image)?;
        Ok(self.store.boxes(&self.images[index].key))
    }

    /// `"{n}. {class}"` rows for the active image's boxes, numbered from 1.
    pub fn box_labels(&self) -> Vec<String> {
        self.render_boxes()
            .iter()
            .enumerate()
            .map(|(i, bbox)| {
                let name = self
                    .classes
                    .get(bbox.class_index)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                format!("{}. {}", i + 1, name)
            })
            .collect()
    }

    /// `"{i} / {n} - {file}"` for the active image, numbered from 1.
    pub fn position_label(&self) -> Option<String> {
        let entry = self.images.get(self.current)?;
        let file_name = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some(format!(
            "{} / {} - {}",
            self.current + 1,
            self.images.len(),
            file_name
        ))
    }

    pub fn total_boxes(&self) -> usize {
        self.store.total_boxes()
    }

    // Navigation

    /// Saves the active image and moves to the next one.
    ///
    /// Returns false, without saving, when already on the last image.
    pub fn next_image(&mut self) -> bool {
        if self.current + 1 >= self.images.len() {
            return false;
        }
        self.navigate_to(self.current + 1);
        true
    }

    /// Saves the active image and moves to the previous one.
    pub fn prev_image(&mut self) -> bool {
        if self.current == 0 || self.images.is_empty() {
            return false;
        }
        self.navigate_to(self.current - 1);
        true
    }

    fn navigate_to(&mut self, index: usize) {
        if let Err(err) = self.save_at(self.current) {
            log::warn!("{err}");
        }
        self.store.abort_gesture();
        self.selected_box = None;
        self.current = index;
        self.refresh_transform();
    }

    // Classes

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn selected_class(&self) -> Option<usize> {
        self.selected_class
    }

    /// Selects the class used for new boxes. Out-of-range indices are ignored.
    pub fn select_class(&mut self, index: usize) {
        if index < self.classes.len() {
            self.selected_class = Some(index);
        }
    }

    /// Adds a class and selects it.
    pub fn add_class(
        &mut self,
        name: &str,
        color: Option<Rgb>,
        export_id: Option<u32>,
    ) -> Result<usize, YoloEditError> {
        let index = self.classes.add(name, color, export_id)?;
        self.selected_class = Some(index);
        Ok(index)
    }

    pub fn set_export_id(&mut self, name: &str, export_id: u32) -> Result<(), YoloEditError> {
        self.classes.set_export_id(name, export_id)
    }

    /// Removes a class and applies the cascade to every image's boxes.
    ///
    /// Nothing is written to disk; call [`Session::save_all`] to persist.
    pub fn remove_class(&mut self, name: &str) -> Result<Cascade, YoloEditError> {
        let removed = self.classes.remove(name)?;
        let cascade = self.store.remove_class_index(removed);
        self.selected_box = None;
        self.selected_class = match self.selected_class {
            Some(selected) if !self.classes.is_empty() => {
                Some(selected.min(self.classes.len() - 1))
            }
            _ => None,
        };
        log::info!(
            "removed class '{}': {} box(es) deleted, {} renumbered",
            name,
            cascade.removed,
            cascade.renumbered
        );
        Ok(cascade)
    }

    /// Replaces the registry. All in-memory annotations are dropped.
    pub fn set_classes(&mut self, classes: ClassRegistry) {
        self.classes = classes;
        self.store.clear_all();
        self.selected_box = None;
        self.selected_class = (!self.classes.is_empty()).then_some(0);
    }

    /// Imports `classes.txt` from the session root.
    ///
    /// Returns the number of classes read, or `None` when the file is absent
    /// (in which case nothing changes).
    pub fn load_classes(&mut self) -> Result<Option<usize>, YoloEditError> {
        let root = self.root.clone().ok_or(YoloEditError::NoSessionRoot)?;
        let Some(registry) = load_classes(&root)? else {
            return Ok(None);
        };
        let count = registry.len();
        self.set_classes(registry);
        Ok(Some(count))
    }

    /// Writes `classes.txt` into the session root.
    ///
    /// Returns `Ok(None)` without writing when the registry is empty.
    pub fn save_classes(&self) -> Result<Option<PathBuf>, YoloEditError> {
        let root = self.root.as_deref().ok_or(YoloEditError::NoSessionRoot)?;
        save_classes(root, &self.classes)
    }

    // Persistence

    /// Saves one image's label file.
    pub fn save_image(&mut self, image: &Path) -> Result<SaveOutcome, YoloEditError> {
        let index = self.index_of_path(image)?;
        self.save_at(index)
    }

    /// Saves the active image, if any.
    pub fn save_current(&mut self) -> Result<Option<SaveOutcome>, YoloEditError> {
        if self.images.is_empty() {
            return Ok(None);
        }
        self.save_at(self.current).map(Some)
    }

    fn save_at(&mut self, index: usize) -> Result<SaveOutcome, YoloEditError> {
        let labels_dir = self.labels_dir.clone().ok_or(YoloEditError::NoSessionRoot)?;
        let dims = self.dims_at(index)?;
        let entry = &self.images[index];
        save_image(
            &labels_dir,
            &entry.path,
            self.store.boxes(&entry.key),
            dims,
            &self.classes,
        )
    }

    /// Loads one image's label file, replacing its in-memory boxes.
    ///
    /// Without a label file this is a no-op.
    pub fn load_image(&mut self, image: &Path) -> Result<LoadOutcome, YoloEditError> {
        let index = self.index_of_path(image)?;
        self.load_at(index)
    }

    fn load_at(&mut self, index: usize) -> Result<LoadOutcome, YoloEditError> {
        let labels_dir = self.labels_dir.clone().ok_or(YoloEditError::NoSessionRoot)?;
        let dims = self.dims_at(index)?;
        let entry = &self.images[index];

        let Some(decoded) = load_image(&labels_dir, &entry.path, dims, &self.classes)? else {
            return Ok(LoadOutcome::default());
        };

        let outcome = LoadOutcome {
            present: true,
            loaded: decoded.boxes.len(),
            malformed: decoded.malformed,
            unknown_class: decoded.unknown_class,
        };
        let key = entry.key.clone();
        if index == self.current {
            self.selected_box = None;
        }
        self.store.replace(&key, decoded.boxes);
        Ok(outcome)
    }

    /// Saves every image, then `classes.txt` unless the registry is empty.
    ///
    /// Images are saved independently; a failure is recorded in the report
    /// and the batch carries on.
    pub fn save_all(&mut self) -> Result<BatchReport, YoloEditError> {
        let root = self.root.clone().ok_or(YoloEditError::NoSessionRoot)?;
        let mut report = BatchReport::new(BatchKind::Save);

        for index in 0..self.images.len() {
            report.total += 1;
            match self.save_at(index) {
                Ok(SaveOutcome::Written { records }) => {
                    report.annotated += 1;
                    report.records += records;
                }
                Ok(SaveOutcome::Removed | SaveOutcome::Nothing) => {}
                Err(err) => {
                    log::warn!("{err}");
                    report.fail(&self.images[index].path, err.to_string());
                }
            }
        }

        if let Err(err) = save_classes(&root, &self.classes) {
            log::warn!("{err}");
            report.fail(classes_path(&root), err.to_string());
        }

        Ok(report)
    }

    /// Loads every image's label file.
    pub fn load_all(&mut self) -> Result<BatchReport, YoloEditError> {
        if self.labels_dir.is_none() {
            return Err(YoloEditError::NoSessionRoot);
        }
        let mut report = BatchReport::new(BatchKind::Load);

        for index in 0..self.images.len() {
            report.total += 1;
            match self.load_at(index) {
                Ok(outcome) => {
                    if outcome.loaded > 0 {
                        report.annotated += 1;
                    }
                    report.records += outcome.loaded;
                    report.dropped += outcome.malformed + outcome.unknown_class;
                }
                Err(err) => {
                    log::warn!("{err}");
                    report.fail(&self.images[index].path, err.to_string());
                }
            }
        }

        log::info!(
            "loaded annotations for {} of {} image(s)",
            report.annotated,
            report.total
        );
        Ok(report)
    }

    /// Summary of the opened directory for display.
    pub fn summary(&self, load: Option<BatchReport>) -> Result<SessionSummary, YoloEditError> {
        let root = self.root.clone().ok_or(YoloEditError::NoSessionRoot)?;
        let labels_dir = self.labels_dir.clone().ok_or(YoloEditError::NoSessionRoot)?;

        let images = self
            .images
            .iter()
            .map(|entry| ImageSummary {
                file_name: entry
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                boxes: self.store.boxes(&entry.key).len(),
            })
            .collect();

        Ok(SessionSummary {
            root,
            labels_dir,
            classes: self.classes.all().to_vec(),
            images,
            total_boxes: self.store.total_boxes(),
            load,
        })
    }
}
