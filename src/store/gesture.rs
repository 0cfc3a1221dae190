//! In-progress pointer gestures.
//!
//! A gesture never writes to the authoritative box list while it runs. Move
//! and resize gestures keep the box as it was when the gesture began plus a
//! live preview that renderers draw instead of the stored box. Committing
//! writes the preview back; aborting just drops the gesture.

use crate::geometry::{BoundingBox, Coord, Handle, Image, ImageDims, View};

use super::ImageKey;

/// Minimum extent, in view pixels, of a drawn box on each axis.
pub const MIN_DRAW_EXTENT: i32 = 5;

/// Current editing phase of the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    /// No pointer gesture in progress.
    #[default]
    Idle,
    /// Drag-to-create, tracked in view coordinates.
    Drawing {
        image: ImageKey,
        class_index: usize,
        start: Coord<View>,
        current: Coord<View>,
    },
    /// Translating an existing box.
    Moving {
        image: ImageKey,
        index: usize,
        start: Coord<Image>,
        original: BoundingBox,
        preview: BoundingBox,
        dims: ImageDims,
    },
    /// Dragging one corner of an existing box.
    Resizing {
        image: ImageKey,
        index: usize,
        handle: Handle,
        original: BoundingBox,
        preview: BoundingBox,
        dims: ImageDims,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Image the gesture operates on.
    pub fn image(&self) -> Option<&ImageKey> {
        match self {
            Self::Idle => None,
            Self::Drawing { image, .. }
            | Self::Moving { image, .. }
            | Self::Resizing { image, .. } => Some(image),
        }
    }

    /// Index of the stored box being edited, for move and resize.
    pub fn box_index(&self) -> Option<usize> {
        match self {
            Self::Moving { index, .. } | Self::Resizing { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The live replacement for the edited box, for move and resize.
    pub fn preview(&self) -> Option<&BoundingBox> {
        match self {
            Self::Moving { preview, .. } | Self::Resizing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// The box as it was before the gesture started.
    pub fn original(&self) -> Option<&BoundingBox> {
        match self {
            Self::Moving { original, .. } | Self::Resizing { original, .. } => Some(original),
            _ => None,
        }
    }

    /// The handle grabbed by a resize gesture.
    ///
    /// This stays the handle that was grabbed even after the drag has flipped
    /// the box through its opposite corner.
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Self::Resizing { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    /// The rubber-band rectangle of a draw gesture, in view coordinates.
    pub fn draw_rect(&self) -> Option<(Coord<View>, Coord<View>)> {
        match self {
            Self::Drawing { start, current, .. } => Some((*start, *current)),
            _ => None,
        }
    }
}

/// Preview of a move: cumulative delta from the start point, then clamped.
pub(crate) fn moved_box(
    original: &BoundingBox,
    start: Coord<Image>,
    at: Coord<Image>,
    dims: ImageDims,
) -> BoundingBox {
    original
        .translated(at.x.saturating_sub(start.x), at.y.saturating_sub(start.y))
        .clamped(dims)
}

/// Preview of a resize: move the grabbed corner, swap inverted axes, clamp.
///
/// Always derived from the original box, so the corner opposite the handle
/// stays exactly where it started for the whole gesture.
pub(crate) fn resized_box(
    original: &BoundingBox,
    handle: Handle,
    at: Coord<Image>,
    dims: ImageDims,
) -> BoundingBox {
    original.with_corner(handle, at).normalized().clamped(dims)
}

/// True when a drawn rubber band is too small to become a box.
pub(crate) fn is_degenerate_draw(start: Coord<View>, end: Coord<View>) -> bool {
    (end.x - start.x).abs() < MIN_DRAW_EXTENT || (end.y - start.y).abs() < MIN_DRAW_EXTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moved_box_keeps_size_inside_bounds() {
        let dims = ImageDims::new(500, 500);
        let original = BoundingBox::new(0, 100, 100, 200, 150);
        let moved = moved_box(&original, Coord::new(120, 120), Coord::new(170, 100), dims);
        assert_eq!(moved, BoundingBox::new(0, 150, 80, 250, 130));
    }

    #[test]
    fn moved_box_truncates_at_edges() {
        let dims = ImageDims::new(500, 500);
        let original = BoundingBox::new(0, 100, 100, 200, 150);
        let moved = moved_box(&original, Coord::new(150, 120), Coord::new(499, 120), dims);
        assert_eq!(moved, BoundingBox::new(0, 449, 100, 499, 150));
    }

    #[test]
    fn resized_box_flips_past_opposite_corner() {
        let dims = ImageDims::new(500, 500);
        let original = BoundingBox::new(0, 100, 100, 200, 200);
        let resized = resized_box(&original, Handle::TopLeft, Coord::new(260, 240), dims);
        assert_eq!(resized, BoundingBox::new(0, 200, 200, 260, 240));
    }

    #[test]
    fn resized_box_is_relative_to_original() {
        let dims = ImageDims::new(500, 500);
        let original = BoundingBox::new(0, 100, 100, 200, 200);
        // Flip, then come back: the untouched corner never moved.
        let _ = resized_box(&original, Handle::BottomRight, Coord::new(50, 50), dims);
        let back = resized_box(&original, Handle::BottomRight, Coord::new(210, 220), dims);
        assert_eq!(back, BoundingBox::new(0, 100, 100, 210, 220));
    }

    #[test]
    fn degenerate_draw_uses_either_axis() {
        assert!(is_degenerate_draw(Coord::new(0, 0), Coord::new(4, 100)));
        assert!(is_degenerate_draw(Coord::new(0, 0), Coord::new(100, -4)));
        assert!(!is_degenerate_draw(Coord::new(10, 10), Coord::new(5, 5)));
    }
}
