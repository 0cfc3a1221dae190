//! The box store: per-image annotation lists and the gestures that edit them.
//!
//! The store exclusively owns the annotation set. Renderers read snapshots
//! through [`BoxStore::render_boxes`]; every completed edit is reported back
//! as an [`Edit`] so the caller can persist the affected image.

mod gesture;
mod hit;
mod ids;

pub use gesture::{Gesture, MIN_DRAW_EXTENT};
pub use hit::{first_box_at, first_handle_at, hit_test_box, hit_test_handle};
pub use ids::ImageKey;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{BoundingBox, Coord, Handle, Image, ImageDims, View, ViewTransform};

/// What a completed operation changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditKind {
    Created { index: usize },
    Moved { index: usize },
    Resized { index: usize },
    Deleted { index: usize },
    Cleared { removed: usize },
}

/// Completion notification for an operation that changed an image's boxes.
#[must_use = "an edit should be persisted by the caller"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub image: ImageKey,
    pub kind: EditKind,
}

/// Outcome of removing a class from every image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Cascade {
    /// Boxes of the removed class that were deleted.
    pub removed: usize,
    /// Boxes whose class index was shifted down by one.
    pub renumbered: usize,
    /// Images whose box list changed.
    pub images: Vec<ImageKey>,
}

/// Mapping from image to its ordered list of boxes.
#[derive(Clone, Debug, Default)]
pub struct BoxStore {
    boxes: BTreeMap<ImageKey, Vec<BoundingBox>>,
    gesture: Gesture,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored boxes for an image, without any gesture preview.
    pub fn boxes(&self, image: &ImageKey) -> &[BoundingBox] {
        self.boxes.get(image).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Snapshot for rendering: stored boxes with the active gesture's
    /// preview substituted for the box it edits.
    pub fn render_boxes(&self, image: &ImageKey) -> Vec<BoundingBox> {
        let mut out = self.boxes(image).to_vec();
        if self.gesture.image() == Some(image) {
            if let (Some(index), Some(preview)) = (self.gesture.box_index(), self.gesture.preview())
            {
                if let Some(slot) = out.get_mut(index) {
                    *slot = *preview;
                }
            }
        }
        out
    }

    /// Images that currently hold at least one box.
    pub fn annotated_images(&self) -> impl Iterator<Item = (&ImageKey, &[BoundingBox])> {
        self.boxes
            .iter()
            .filter(|(_, boxes)| !boxes.is_empty())
            .map(|(key, boxes)| (key, boxes.as_slice()))
    }

    pub fn total_boxes(&self) -> usize {
        self.boxes.values().map(Vec::len).sum()
    }

    /// Appends a box to an image and returns its index.
    pub fn push(&mut self, image: &ImageKey, bbox: BoundingBox) -> usize {
        let list = self.boxes.entry(image.clone()).or_default();
        list.push(bbox.normalized());
        list.len() - 1
    }

    /// Replaces every box of an image, e.g. after loading its label file.
    pub fn replace(&mut self, image: &ImageKey, boxes: Vec<BoundingBox>) {
        self.abort_gesture_on(image);
        let boxes = boxes.into_iter().map(BoundingBox::normalized).collect();
        self.boxes.insert(image.clone(), boxes);
    }

    /// Removes one box.
    pub fn delete(&mut self, image: &ImageKey, index: usize) -> Option<Edit> {
        let list = self.boxes.get_mut(image)?;
        if index >= list.len() {
            return None;
        }
        list.remove(index);
        self.abort_gesture_on(image);
        Some(Edit {
            image: image.clone(),
            kind: EditKind::Deleted { index },
        })
    }

    /// Removes every box of an image.
    pub fn clear(&mut self, image: &ImageKey) -> Edit {
        self.abort_gesture_on(image);
        let removed = self.boxes.remove(image).map(|b| b.len()).unwrap_or(0);
        Edit {
            image: image.clone(),
            kind: EditKind::Cleared { removed },
        }
    }

    /// Drops every image and gesture.
    pub fn clear_all(&mut self) {
        self.boxes.clear();
        self.gesture = Gesture::Idle;
    }

    /// Applies the class-removal cascade for the class formerly at `removed`.
    ///
    /// Boxes of that class are deleted from every image and boxes with a
    /// greater index move down by one, keeping indices aligned with the
    /// registry's positions.
    pub fn remove_class_index(&mut self, removed: usize) -> Cascade {
        self.gesture = Gesture::Idle;
        let mut cascade = Cascade::default();

        for (key, list) in self.boxes.iter_mut() {
            let before = list.len();
            list.retain(|b| b.class_index != removed);
            let deleted = before - list.len();

            let mut shifted = 0;
            for b in list.iter_mut().filter(|b| b.class_index > removed) {
                b.class_index -= 1;
                shifted += 1;
            }

            if deleted > 0 || shifted > 0 {
                cascade.removed += deleted;
                cascade.renumbered += shifted;
                cascade.images.push(key.clone());
            }
        }

        cascade
    }

    /// Index of the first box under `point`.
    pub fn hit_box(&self, image: &ImageKey, point: Coord<Image>) -> Option<usize> {
        first_box_at(self.boxes(image), point)
    }

    /// First box whose corner handle is under `point`.
    pub fn hit_handle(
        &self,
        image: &ImageKey,
        point: Coord<Image>,
        radius: i32,
    ) -> Option<(usize, Handle)> {
        first_handle_at(self.boxes(image), point, radius)
    }

    // Gestures

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Discards the active gesture without touching stored boxes.
    pub fn abort_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn abort_gesture_on(&mut self, image: &ImageKey) {
        if self.gesture.image() == Some(image) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Starts a drag-to-create gesture at a view position.
    pub fn begin_draw(&mut self, image: &ImageKey, class_index: usize, at: Coord<View>) {
        self.gesture = Gesture::Drawing {
            image: image.clone(),
            class_index,
            start: at,
            current: at,
        };
    }

    pub fn update_draw(&mut self, at: Coord<View>) {
        if let Gesture::Drawing { current, .. } = &mut self.gesture {
            *current = at;
        }
    }

    /// Finishes a draw gesture.
    ///
    /// Rubber bands narrower than [`MIN_DRAW_EXTENT`] view pixels on either
    /// axis are discarded and `None` is returned. Otherwise the corners are
    /// mapped into the image and the new box is appended.
    pub fn end_draw(
        &mut self,
        at: Coord<View>,
        transform: &ViewTransform,
        dims: ImageDims,
    ) -> Option<Edit> {
        if !matches!(self.gesture, Gesture::Drawing { .. }) {
            return None;
        }
        let Gesture::Drawing {
            image,
            class_index,
            start,
            ..
        } = std::mem::take(&mut self.gesture)
        else {
            return None;
        };

        if gesture::is_degenerate_draw(start, at) {
            return None;
        }

        let a = transform.to_image(start, dims);
        let b = transform.to_image(at, dims);
        let index = self.push(&image, BoundingBox::from_corners(class_index, a, b));
        Some(Edit {
            image,
            kind: EditKind::Created { index },
        })
    }

    /// Starts moving a stored box. Returns false if the box does not exist.
    pub fn begin_move(
        &mut self,
        image: &ImageKey,
        index: usize,
        at: Coord<Image>,
        dims: ImageDims,
    ) -> bool {
        let Some(original) = self.boxes(image).get(index).copied() else {
            return false;
        };
        self.gesture = Gesture::Moving {
            image: image.clone(),
            index,
            start: at,
            original,
            preview: original,
            dims,
        };
        true
    }

    pub fn update_move(&mut self, at: Coord<Image>) {
        if let Gesture::Moving {
            start,
            original,
            preview,
            dims,
            ..
        } = &mut self.gesture
        {
            *preview = gesture::moved_box(original, *start, at, *dims);
        }
    }

    /// Commits a move gesture.
    pub fn end_move(&mut self) -> Option<Edit> {
        if !matches!(self.gesture, Gesture::Moving { .. }) {
            return None;
        }
        let Gesture::Moving {
            image,
            index,
            preview,
            ..
        } = std::mem::take(&mut self.gesture)
        else {
            return None;
        };
        self.commit(image, index, preview, EditKind::Moved { index })
    }

    /// Starts resizing a stored box by one corner.
    pub fn begin_resize(
        &mut self,
        image: &ImageKey,
        index: usize,
        handle: Handle,
        dims: ImageDims,
    ) -> bool {
        let Some(original) = self.boxes(image).get(index).copied() else {
            return false;
        };
        self.gesture = Gesture::Resizing {
            image: image.clone(),
            index,
            handle,
            original,
            preview: original,
            dims,
        };
        true
    }

    pub fn update_resize(&mut self, at: Coord<Image>) {
        if let Gesture::Resizing {
            handle,
            original,
            preview,
            dims,
            ..
        } = &mut self.gesture
        {
            *preview = gesture::resized_box(original, *handle, at, *dims);
        }
    }

    /// Commits a resize gesture.
    pub fn end_resize(&mut self) -> Option<Edit> {
        if !matches!(self.gesture, Gesture::Resizing { .. }) {
            return None;
        }
        let Gesture::Resizing {
            image,
            index,
            preview,
            ..
        } = std::mem::take(&mut self.gesture)
        else {
            return None;
        };
        self.commit(image, index, preview, EditKind::Resized { index })
    }

    fn commit(
        &mut self,
        image: ImageKey,
        index: usize,
        bbox: BoundingBox,
        kind: EditKind,
    ) -> Option<Edit> {
        let slot = self.boxes.get_mut(&image)?.get_mut(index)?;
        *slot = bbox.normalized();
        Some(Edit { image, kind })
    }
}
