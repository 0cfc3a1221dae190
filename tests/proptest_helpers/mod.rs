#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use yoloedit::geometry::{BoundingBox, ImageDims};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_dims() -> BoxedStrategy<ImageDims> {
    (1u32..=4096, 1u32..=4096)
        .prop_map(|(w, h)| ImageDims::new(w, h))
        .boxed()
}

/// An ordered box with every corner inside `[0, w-1] x [0, h-1]`.
pub fn arb_box_within(dims: ImageDims, max_class: usize) -> BoxedStrategy<BoundingBox> {
    let max_x = dims.width as i32 - 1;
    let max_y = dims.height as i32 - 1;
    (0..max_class, 0..=max_x, 0..=max_x, 0..=max_y, 0..=max_y)
        .prop_map(|(class_index, xa, xb, ya, yb)| {
            BoundingBox::new(class_index, xa.min(xb), ya.min(yb), xa.max(xb), ya.max(yb))
        })
        .boxed()
}

pub fn arb_dims_and_box(max_class: usize) -> BoxedStrategy<(ImageDims, BoundingBox)> {
    arb_dims()
        .prop_flat_map(move |dims| (Just(dims), arb_box_within(dims, max_class)))
        .boxed()
}

pub fn within_one(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.class_index == b.class_index
        && (a.x1 - b.x1).abs() <= 1
        && (a.y1 - b.y1).abs() <= 1
        && (a.x2 - b.x2).abs() <= 1
        && (a.y2 - b.y2).abs() <= 1
}
