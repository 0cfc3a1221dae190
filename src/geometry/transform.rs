//! Mapping between the rendered view and source-image pixels.
//!
//! The renderer shows the image scaled down to fit its viewport (never
//! scaled up) and centered with a letterbox margin. Everything here is pure:
//! a [`ViewTransform`] is recomputed whenever the active image or the
//! viewport size changes and is never persisted.

use serde::Serialize;

use super::{Coord, Image, View};

/// Minimum grab radius for corner handles, in image pixels.
pub const MIN_HANDLE_RADIUS: i32 = 10;

/// Handle radius in view pixels before it is converted to image pixels.
const HANDLE_VIEW_RADIUS: f64 = 15.0;

/// Pixel dimensions of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamps an x coordinate to `[0, width - 1]`.
    #[inline]
    pub fn clamp_x(&self, x: i32) -> i32 {
        clamp_axis(x, self.width)
    }

    /// Clamps a y coordinate to `[0, height - 1]`.
    #[inline]
    pub fn clamp_y(&self, y: i32) -> i32 {
        clamp_axis(y, self.height)
    }

    /// Clamps both coordinates of a point to the image bounds.
    #[inline]
    pub fn clamp(&self, point: Coord<Image>) -> Coord<Image> {
        Coord::new(self.clamp_x(point.x), self.clamp_y(point.y))
    }
}

fn clamp_axis(value: i32, dim: u32) -> i32 {
    let max = i32::try_from(dim).unwrap_or(i32::MAX).saturating_sub(1).max(0);
    value.clamp(0, max)
}

/// Scale and letterbox offset of the rendered image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewTransform {
    /// View pixels per image pixel. Always in `(0, 1]`.
    pub scale: f64,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    /// A transform that maps view pixels one-to-one onto image pixels.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Maps a view point into the image, clamped to the image bounds.
    pub fn to_image(&self, view: Coord<View>, dims: ImageDims) -> Coord<Image> {
        let x = ((f64::from(view.x) - f64::from(self.offset_x)) / self.scale).round();
        let y = ((f64::from(view.y) - f64::from(self.offset_y)) / self.scale).round();
        // `as` saturates, so far off-canvas pointers still clamp to an edge.
        dims.clamp(Coord::new(x as i32, y as i32))
    }

    /// Maps an image point back onto the view. No clamping is applied.
    pub fn to_view(&self, point: Coord<Image>) -> Coord<View> {
        let x = (f64::from(point.x) * self.scale + f64::from(self.offset_x)).round();
        let y = (f64::from(point.y) * self.scale + f64::from(self.offset_y)).round();
        Coord::new(x as i32, y as i32)
    }

    /// Radius, in image pixels, within which a corner handle can be grabbed.
    pub fn handle_radius(&self) -> i32 {
        handle_radius(self.scale)
    }
}

/// Computes the transform that fits an image into a viewport.
///
/// `scale = min(viewport_w / image_w, viewport_h / image_h, 1.0)` and the
/// scaled image is centered, flooring the letterbox remainder. A zero-sized
/// image or viewport yields the identity transform.
pub fn fit_transform(image_w: u32, image_h: u32, viewport_w: u32, viewport_h: u32) -> ViewTransform {
    if image_w == 0 || image_h == 0 || viewport_w == 0 || viewport_h == 0 {
        return ViewTransform::identity();
    }

    let scale_w = f64::from(viewport_w) / f64::from(image_w);
    let scale_h = f64::from(viewport_h) / f64::from(image_h);
    let scale = scale_w.min(scale_h).min(1.0);

    let scaled_w = (f64::from(image_w) * scale).floor() as i64;
    let scaled_h = (f64::from(image_h) * scale).floor() as i64;

    ViewTransform {
        scale,
        offset_x: letterbox_offset(viewport_w, scaled_w),
        offset_y: letterbox_offset(viewport_h, scaled_h),
    }
}

fn letterbox_offset(viewport: u32, scaled: i64) -> i32 {
    let offset = (i64::from(viewport) - scaled).div_euclid(2);
    i32::try_from(offset).unwrap_or(i32::MAX)
}

/// Converts a view point to image pixels.
///
/// Returns `None` when no image is loaded, i.e. when either the transform or
/// the image dimensions are unavailable.
pub fn to_image_coords(
    view: Coord<View>,
    transform: Option<&ViewTransform>,
    dims: Option<ImageDims>,
) -> Option<Coord<Image>> {
    let transform = transform?;
    let dims = dims?;
    Some(transform.to_image(view, dims))
}

/// Converts an image point to view coordinates.
pub fn to_view_coords(point: Coord<Image>, transform: &ViewTransform) -> Coord<View> {
    transform.to_view(point)
}

/// `max(10, round(15 / scale))`: handles stay easy to grab when zoomed out.
pub fn handle_radius(scale: f64) -> i32 {
    let scaled = (HANDLE_VIEW_RADIUS / scale).round();
    if scaled.is_finite() {
        (scaled as i32).max(MIN_HANDLE_RADIUS)
    } else {
        MIN_HANDLE_RADIUS
    }
}
