//! Typed integer points using PhantomData for compile-time safety.

use std::marker::PhantomData;

/// A 2D integer point with a type-level marker for the coordinate space.
///
/// The `TSpace` parameter should be either [`View`](super::View) or
/// [`Image`](super::Image), so a raw pointer position can never be handed to
/// code expecting source-pixel coordinates without going through a
/// [`ViewTransform`](super::ViewTransform).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Coord<TSpace> {
    pub x: i32,
    pub y: i32,
    _space: PhantomData<TSpace>,
}

impl<TSpace> Coord<TSpace> {
    /// Creates a new point with the given x and y values.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Chebyshev (max-axis) distance to another point in the same space.
    #[inline]
    pub fn chebyshev_distance(&self, other: &Self) -> i64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).abs();
        dx.max(dy)
    }
}

impl<TSpace> std::fmt::Debug for Coord<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TSpace> Default for Coord<TSpace> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
