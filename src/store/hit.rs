//! Hit-testing of pointer positions against boxes.
//!
//! Both tests work in image pixels. When several candidates match, the first
//! in a fixed order wins: corners in [`Handle::ALL`] order, boxes in stored
//! (insertion) order.

use crate::geometry::{BoundingBox, Coord, Handle, Image};

/// Returns the first corner of `bbox` within `radius` of `point`.
///
/// Distance is Chebyshev (max-axis), so each handle's grab area is a square.
pub fn hit_test_handle(point: Coord<Image>, bbox: &BoundingBox, radius: i32) -> Option<Handle> {
    let radius = i64::from(radius);
    Handle::ALL
        .into_iter()
        .find(|&handle| bbox.corner(handle).chebyshev_distance(&point) <= radius)
}

/// Inclusive membership test.
#[inline]
pub fn hit_test_box(point: Coord<Image>, bbox: &BoundingBox) -> bool {
    bbox.contains(point)
}

/// Index of the first box containing `point`.
pub fn first_box_at(boxes: &[BoundingBox], point: Coord<Image>) -> Option<usize> {
    boxes.iter().position(|b| hit_test_box(point, b))
}

/// First `(index, handle)` pair whose handle is within `radius` of `point`.
pub fn first_handle_at(
    boxes: &[BoundingBox],
    point: Coord<Image>,
    radius: i32,
) -> Option<(usize, Handle)> {
    boxes
        .iter()
        .enumerate()
        .find_map(|(index, b)| hit_test_handle(point, b, radius).map(|h| (index, h)))
}
