//! Bounding boxes in source-image pixel space, in XYXY corner form.

use serde::{Deserialize, Serialize};

use super::{Coord, Image, ImageDims};

/// One of the four corner grab points of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// All handles, in hit-testing priority order.
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];
}

/// An axis-aligned, class-labelled bounding box.
///
/// `class_index` is a position in the class registry, not the exported YOLO
/// id. Constructors do not enforce `x1 <= x2`; the store normalizes on every
/// write so readers never see inverted corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub class_index: usize,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Creates a box from explicit corner coordinates.
    #[inline]
    pub fn new(class_index: usize, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            class_index,
            x1,
            y1,
            x2,
            y2,
        }
    }

    /// Creates a normalized box spanning two arbitrary corner points.
    pub fn from_corners(class_index: usize, a: Coord<Image>, b: Coord<Image>) -> Self {
        Self::new(class_index, a.x, a.y, b.x, b.y).normalized()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }

    /// Returns true if the box is properly ordered (x1 <= x2 and y1 <= y2).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Returns a copy with inverted axes swapped back into order.
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.x1 > out.x2 {
            std::mem::swap(&mut out.x1, &mut out.x2);
        }
        if out.y1 > out.y2 {
            std::mem::swap(&mut out.y1, &mut out.y2);
        }
        out
    }

    /// Returns a copy with every coordinate clamped to the image bounds.
    pub fn clamped(self, dims: ImageDims) -> Self {
        Self {
            class_index: self.class_index,
            x1: dims.clamp_x(self.x1),
            y1: dims.clamp_y(self.y1),
            x2: dims.clamp_x(self.x2),
            y2: dims.clamp_y(self.y2),
        }
    }

    /// Returns a copy shifted by `(dx, dy)`.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            class_index: self.class_index,
            x1: self.x1.saturating_add(dx),
            y1: self.y1.saturating_add(dy),
            x2: self.x2.saturating_add(dx),
            y2: self.y2.saturating_add(dy),
        }
    }

    /// Position of the given corner.
    pub fn corner(&self, handle: Handle) -> Coord<Image> {
        match handle {
            Handle::TopLeft => Coord::new(self.x1, self.y1),
            Handle::TopRight => Coord::new(self.x2, self.y1),
            Handle::BottomLeft => Coord::new(self.x1, self.y2),
            Handle::BottomRight => Coord::new(self.x2, self.y2),
        }
    }

    /// Returns a copy with the given corner moved to `point`.
    ///
    /// Only the two coordinates owned by `handle` change; the result may be
    /// inverted and is not clamped.
    pub fn with_corner(self, handle: Handle, point: Coord<Image>) -> Self {
        let mut out = self;
        match handle {
            Handle::TopLeft => {
                out.x1 = point.x;
                out.y1 = point.y;
            }
            Handle::TopRight => {
                out.x2 = point.x;
                out.y1 = point.y;
            }
            Handle::BottomLeft => {
                out.x1 = point.x;
                out.y2 = point.y;
            }
            Handle::BottomRight => {
                out.x2 = point.x;
                out.y2 = point.y;
            }
        }
        out
    }

    /// Inclusive point membership.
    #[inline]
    pub fn contains(&self, point: Coord<Image>) -> bool {
        self.x1 <= point.x && point.x <= self.x2 && self.y1 <= point.y && point.y <= self.y2
    }
}
