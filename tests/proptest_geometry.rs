use proptest::prelude::*;
use yoloedit::geometry::{
    fit_transform, handle_radius, to_image_coords, BoundingBox, Coord, Handle, MIN_HANDLE_RADIUS,
};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn fit_never_scales_up(
        iw in 1u32..=10_000,
        ih in 1u32..=10_000,
        vw in 1u32..=4_000,
        vh in 1u32..=4_000,
    ) {
        let t = fit_transform(iw, ih, vw, vh);
        prop_assert!(t.scale > 0.0 && t.scale <= 1.0);
        prop_assert!(t.offset_x >= 0 && t.offset_y >= 0);
        prop_assert!(handle_radius(t.scale) >= MIN_HANDLE_RADIUS);
    }

    #[test]
    fn view_to_image_is_always_clamped(
        dims in proptest_helpers::arb_dims(),
        vw in 0u32..=4_000,
        vh in 0u32..=4_000,
        vx in any::<i32>(),
        vy in any::<i32>(),
    ) {
        let t = fit_transform(dims.width, dims.height, vw, vh);
        let p = to_image_coords(Coord::new(vx, vy), Some(&t), Some(dims)).expect("image loaded");
        prop_assert!(p.x >= 0 && p.x < dims.width as i32);
        prop_assert!(p.y >= 0 && p.y < dims.height as i32);
    }

    #[test]
    fn translated_then_clamped_box_stays_inside(
        (dims, bbox) in proptest_helpers::arb_dims_and_box(1),
        dx in any::<i32>(),
        dy in any::<i32>(),
    ) {
        let moved = bbox.translated(dx, dy).clamped(dims);
        prop_assert!(moved.x1 >= 0 && moved.x2 < dims.width as i32);
        prop_assert!(moved.y1 >= 0 && moved.y2 < dims.height as i32);
    }

    #[test]
    fn normalized_box_contains_all_corners(
        class_index in 0usize..4,
        x1 in -1000i32..1000,
        y1 in -1000i32..1000,
        x2 in -1000i32..1000,
        y2 in -1000i32..1000,
    ) {
        let bbox = BoundingBox::new(class_index, x1, y1, x2, y2).normalized();
        prop_assert!(bbox.is_ordered());
        for handle in Handle::ALL {
            prop_assert!(bbox.contains(bbox.corner(handle)));
        }
    }
}
