//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to keep pointer
//! positions on the rendered canvas apart from positions in the source image.

use std::fmt;

/// Marker type for view coordinates.
///
/// View coordinates are the integer positions reported by the rendering
/// surface, including any letterbox margin around the scaled image. They may
/// be negative or exceed the viewport while a pointer is dragged outside it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {}

/// Marker type for source-image pixel coordinates.
///
/// `(0, 0)` is the top-left pixel of the unscaled image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Image {}

impl fmt::Debug for View {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
