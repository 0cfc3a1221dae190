use proptest::prelude::*;
use yoloedit::classes::ClassRegistry;
use yoloedit::yolo::{decode_labels, decode_record, encode_boxes, encode_record};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn encode_then_decode_stays_within_one_pixel(
        (dims, bbox) in proptest_helpers::arb_dims_and_box(3)
    ) {
        let classes = ClassRegistry::with_defaults();
        let line = encode_record(&bbox, dims, &classes).expect("encode");
        let decoded = decode_record(&line, 1, dims, &classes)
            .expect("decode")
            .expect("non-blank line");

        prop_assert!(
            proptest_helpers::within_one(&bbox, &decoded),
            "{:?} decoded as {:?} via '{}'", bbox, decoded, line
        );
    }

    #[test]
    fn encoded_values_are_unit_fractions(
        (dims, bbox) in proptest_helpers::arb_dims_and_box(3)
    ) {
        let line = encode_record(&bbox, dims, &ClassRegistry::with_defaults()).expect("encode");
        let tokens: Vec<&str> = line.split(' ').collect();
        prop_assert_eq!(tokens.len(), 5);
        for token in &tokens[1..] {
            let value: f64 = token.parse().expect("float token");
            prop_assert!((0.0..=1.0).contains(&value), "{} out of range in '{}'", value, line);
            prop_assert_eq!(token.split('.').nth(1).map(str::len), Some(6));
        }
    }

    #[test]
    fn decoded_boxes_are_ordered_and_inside_image(
        dims in proptest_helpers::arb_dims(),
        id in 0i64..3,
        cx in -2.0f64..3.0,
        cy in -2.0f64..3.0,
        w in -1.0f64..3.0,
        h in -1.0f64..3.0,
    ) {
        let line = format!("{id} {cx} {cy} {w} {h}");
        let bbox = decode_record(&line, 1, dims, &ClassRegistry::with_defaults())
            .expect("decode")
            .expect("non-blank line");

        prop_assert!(bbox.is_ordered());
        prop_assert!(bbox.x1 >= 0 && bbox.x2 < dims.width as i32);
        prop_assert!(bbox.y1 >= 0 && bbox.y2 < dims.height as i32);
    }

    #[test]
    fn whole_file_round_trip_keeps_box_count(
        boxes in proptest_helpers::arb_dims().prop_flat_map(|dims| {
            (Just(dims), proptest::collection::vec(proptest_helpers::arb_box_within(dims, 3), 0..12))
        })
    ) {
        let (dims, boxes) = boxes;
        let classes = ClassRegistry::with_defaults();
        let text = encode_boxes(&boxes, dims, &classes).expect("encode");
        let decoded = decode_labels(&text, dims, &classes);

        prop_assert_eq!(decoded.dropped(), 0);
        prop_assert_eq!(decoded.boxes.len(), boxes.len());
        for (original, restored) in boxes.iter().zip(&decoded.boxes) {
            prop_assert!(proptest_helpers::within_one(original, restored));
        }
    }

    #[test]
    fn arbitrary_lines_never_panic(line in "\\PC{0,64}") {
        let _ = decode_record(&line, 1, yoloedit::geometry::ImageDims::new(640, 480), &ClassRegistry::with_defaults());
    }
}
