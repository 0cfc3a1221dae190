//! Geometry shared by every other module.
//!
//! Two coordinate spaces exist: [`View`] positions reported by the rendering
//! surface and [`Image`] positions in source-image pixels. Points carry their
//! space as a type parameter so the two cannot be mixed by accident, and the
//! only bridge between them is a [`ViewTransform`].
//!
//! # Example
//!
//! ```
//! use yoloedit::geometry::{fit_transform, to_image_coords, Coord, ImageDims};
//!
//! let dims = ImageDims::new(1600, 1200);
//! let transform = fit_transform(dims.width, dims.height, 800, 800);
//! let pixel = to_image_coords(Coord::new(400, 400), Some(&transform), Some(dims)).unwrap();
//! assert_eq!((pixel.x, pixel.y), (800, 600));
//! ```

mod bbox;
mod coord;
mod space;
mod transform;

pub use bbox::{BoundingBox, Handle};
pub use coord::Coord;
pub use space::{Image, View};
pub use transform::{
    fit_transform, handle_radius, to_image_coords, to_view_coords, ImageDims, ViewTransform,
    MIN_HANDLE_RADIUS,
};
