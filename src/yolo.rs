//! YOLO label record codec.
//!
//! A record is one line, `<export_id> <x_center> <y_center> <width> <height>`,
//! with the four spatial values normalized to the image dimensions. Boxes
//! in memory stay in integer pixel space; this module is the only place the
//! two representations meet.

use crate::classes::ClassRegistry;
use crate::error::YoloEditError;
use crate::geometry::{BoundingBox, ImageDims};

/// Extension of label files.
pub const LABEL_EXTENSION: &str = "txt";

/// A syntactically valid record, before class resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloRecord {
    pub export_id: i64,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Result of decoding a whole label file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedLabels {
    pub boxes: Vec<BoundingBox>,
    /// Lines that were not valid records.
    pub malformed: usize,
    /// Valid records whose export id matched no class.
    pub unknown_class: usize,
}

impl DecodedLabels {
    /// Number of non-blank lines that did not produce a box.
    pub fn dropped(&self) -> usize {
        self.malformed + self.unknown_class
    }
}

/// Encodes one box as a YOLO record.
///
/// The export id comes from the class at `bbox.class_index`; a box pointing
/// past the end of the registry is an [`YoloEditError::UnknownClass`].
pub fn encode_record(
    bbox: &BoundingBox,
    dims: ImageDims,
    classes: &ClassRegistry,
) -> Result<String, YoloEditError> {
    let class = classes.get(bbox.class_index).ok_or_else(|| {
        YoloEditError::UnknownClass(format!("class index {}", bbox.class_index))
    })?;

    let width = f64::from(dims.width);
    let height = f64::from(dims.height);

    let cx = (f64::from(bbox.x1) + f64::from(bbox.x2)) / 2.0;
    let cy = (f64::from(bbox.y1) + f64::from(bbox.y2)) / 2.0;
    let w = f64::from(bbox.width());
    let h = f64::from(bbox.height());

    Ok(format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        class.export_id,
        unit(cx / width),
        unit(cy / height),
        unit(w / width),
        unit(h / height),
    ))
}

/// Encodes every box, newline-joined, without a trailing newline.
pub fn encode_boxes(
    boxes: &[BoundingBox],
    dims: ImageDims,
    classes: &ClassRegistry,
) -> Result<String, YoloEditError> {
    let lines = boxes
        .iter()
        .map(|b| encode_record(b, dims, classes))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Decodes one line into a box.
///
/// Blank lines give `Ok(None)`. Lines that are not exactly five valid
/// tokens give [`YoloEditError::MalformedRecord`]; records whose class cannot
/// be resolved give [`YoloEditError::UnknownClass`].
pub fn decode_record(
    line: &str,
    line_num: usize,
    dims: ImageDims,
    classes: &ClassRegistry,
) -> Result<Option<BoundingBox>, YoloEditError> {
    let Some(record) = parse_record(line, line_num)? else {
        return Ok(None);
    };

    let class_index = resolve_class(record.export_id, classes).ok_or_else(|| {
        YoloEditError::UnknownClass(format!("export id {}", record.export_id))
    })?;

    Ok(Some(denormalize(&record, class_index, dims)))
}

/// Decodes a whole label file, skipping lines that do not yield a box.
pub fn decode_labels(content: &str, dims: ImageDims, classes: &ClassRegistry) -> DecodedLabels {
    let mut decoded = DecodedLabels::default();

    for (line_idx, line) in content.lines().enumerate() {
        match decode_record(line, line_idx + 1, dims, classes) {
            Ok(Some(bbox)) => decoded.boxes.push(bbox),
            Ok(None) => {}
            Err(YoloEditError::UnknownClass(what)) => {
                log::debug!("line {}: dropping record with unknown {}", line_idx + 1, what);
                decoded.unknown_class += 1;
            }
            Err(err) => {
                log::debug!("{err}");
                decoded.malformed += 1;
            }
        }
    }

    decoded
}

/// Maps an export id to a registry position.
///
/// The first class with a matching export id wins. Failing that, the raw
/// value is taken as a position if it is in range.
pub fn resolve_class(export_id: i64, classes: &ClassRegistry) -> Option<usize> {
    let by_export_id = u32::try_from(export_id)
        .ok()
        .and_then(|id| classes.position_of_export_id(id));

    by_export_id.or_else(|| {
        usize::try_from(export_id)
            .ok()
            .filter(|&index| index < classes.len())
    })
}

fn denormalize(record: &YoloRecord, class_index: usize, dims: ImageDims) -> BoundingBox {
    let width = f64::from(dims.width);
    let height = f64::from(dims.height);

    let cx = record.cx * width;
    let cy = record.cy * height;
    let half_w = record.w * width / 2.0;
    let half_h = record.h * height / 2.0;

    BoundingBox::new(
        class_index,
        (cx - half_w).round() as i32,
        (cy - half_h).round() as i32,
        (cx + half_w).round() as i32,
        (cy + half_h).round() as i32,
    )
    .normalized()
    .clamped(dims)
}

/// Parses the five tokens of a record without resolving its class.
pub fn parse_record(line: &str, line_num: usize) -> Result<Option<YoloRecord>, YoloEditError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        let found = if tokens.len() > 5 {
            "more than 5".to_string()
        } else {
            tokens.len().to_string()
        };
        return Err(YoloEditError::MalformedRecord {
            line: line_num,
            message: format!("expected 5 tokens, found {found}"),
        });
    }

    let export_id = tokens[0]
        .parse::<i64>()
        .map_err(|_| YoloEditError::MalformedRecord {
            line: line_num,
            message: format!("invalid class id '{}'; expected an integer", tokens[0]),
        })?;

    Ok(Some(YoloRecord {
        export_id,
        cx: parse_f64_token(tokens[1], "x_center", line_num)?,
        cy: parse_f64_token(tokens[2], "y_center", line_num)?,
        w: parse_f64_token(tokens[3], "width", line_num)?,
        h: parse_f64_token(tokens[4], "height", line_num)?,
    }))
}

fn parse_f64_token(raw: &str, field_name: &str, line_num: usize) -> Result<f64, YoloEditError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| YoloEditError::MalformedRecord {
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected a finite number"),
        })
}

/// Fuzz-only entrypoint for single-record decoding.
#[cfg(feature = "fuzzing")]
pub fn fuzz_decode_record(input: &str) {
    let classes = ClassRegistry::with_defaults();
    let _ = decode_record(input, 1, ImageDims::new(640, 480), &classes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_classes() -> ClassRegistry {
        ClassRegistry::with_defaults()
    }

    #[test]
    fn encode_matches_reference_record() {
        let classes = three_classes();
        let line = encode_record(
            &BoundingBox::new(0, 100, 100, 300, 400),
            ImageDims::new(800, 600),
            &classes,
        )
        .unwrap();
        assert_eq!(line, "0 0.250000 0.416667 0.250000 0.500000");
    }

    #[test]
    fn encode_uses_export_id_not_position() {
        let mut classes = three_classes();
        classes.set_export_id("car", 17).unwrap();
        let line = encode_record(
            &BoundingBox::new(1, 0, 0, 10, 10),
            ImageDims::new(100, 100),
            &classes,
        )
        .unwrap();
        assert!(line.starts_with("17 "));
    }

    #[test]
    fn encode_rejects_dangling_class_index() {
        let err = encode_record(
            &BoundingBox::new(9, 0, 0, 10, 10),
            ImageDims::new(100, 100),
            &three_classes(),
        )
        .unwrap_err();
        assert!(matches!(err, YoloEditError::UnknownClass(_)));
    }

    #[test]
    fn encode_clamps_normalized_values() {
        // A box that was never clamped still encodes inside [0, 1].
        let line = encode_record(
            &BoundingBox::new(0, -50, 0, 250, 10),
            ImageDims::new(200, 100),
            &three_classes(),
        )
        .unwrap();
        assert_eq!(line, "0 0.500000 0.050000 1.000000 0.100000");
    }

    #[test]
    fn decode_matches_reference_box() {
        let bbox = decode_record("2 0.5 0.5 0.2 0.2", 1, ImageDims::new(1000, 1000), &three_classes())
            .unwrap()
            .unwrap();
        assert_eq!(bbox, BoundingBox::new(2, 400, 400, 600, 600));
    }

    #[test]
    fn decode_resolves_first_matching_export_id() {
        let mut classes = three_classes();
        classes.set_export_id("person", 5).unwrap();
        classes.set_export_id("bicycle", 5).unwrap();
        let bbox = decode_record("5 0.5 0.5 0.1 0.1", 1, ImageDims::new(100, 100), &classes)
            .unwrap()
            .unwrap();
        assert_eq!(bbox.class_index, 0);
    }

    #[test]
    fn decode_falls_back_to_positional_index() {
        let mut classes = three_classes();
        classes.set_export_id("bicycle", 40).unwrap();
        // No class exports as 2 any more, but position 2 exists.
        let bbox = decode_record("2 0.5 0.5 0.1 0.1", 1, ImageDims::new(100, 100), &classes)
            .unwrap()
            .unwrap();
        assert_eq!(bbox.class_index, 2);
    }

    #[test]
    fn decode_drops_unknown_class() {
        let err = decode_record("7 0.5 0.5 0.1 0.1", 1, ImageDims::new(100, 100), &three_classes())
            .unwrap_err();
        assert!(matches!(err, YoloEditError::UnknownClass(_)));

        let err = decode_record("-1 0.5 0.5 0.1 0.1", 1, ImageDims::new(100, 100), &three_classes())
            .unwrap_err();
        assert!(matches!(err, YoloEditError::UnknownClass(_)));
    }

    #[test]
    fn decode_rejects_wrong_token_counts() {
        let dims = ImageDims::new(100, 100);
        for line in ["1 0.5 0.5", "0 0.1 0.2 0.3 0.4 0.5"] {
            let err = decode_record(line, 3, dims, &three_classes()).unwrap_err();
            assert!(matches!(err, YoloEditError::MalformedRecord { line: 3, .. }));
        }
    }

    #[test]
    fn decode_rejects_bad_numbers() {
        let dims = ImageDims::new(100, 100);
        for line in ["1.0 0.5 0.5 0.1 0.1", "1 abc 0.5 0.1 0.1", "1 NaN 0.5 0.1 0.1"] {
            let err = decode_record(line, 1, dims, &three_classes()).unwrap_err();
            assert!(matches!(err, YoloEditError::MalformedRecord { .. }));
        }
    }

    #[test]
    fn decode_clamps_to_image() {
        let bbox = decode_record("0 0.95 0.5 0.2 1.4", 1, ImageDims::new(100, 50), &three_classes())
            .unwrap()
            .unwrap();
        assert_eq!(bbox, BoundingBox::new(0, 85, 0, 99, 49));
    }

    #[test]
    fn decode_labels_counts_drops_and_skips_blanks() {
        let content = "0 0.5 0.5 0.2 0.2\n1 0.5 0.5\n\n9 0.5 0.5 0.1 0.1\n2 0.25 0.25 0.1 0.1\n";
        let decoded = decode_labels(content, ImageDims::new(1000, 1000), &three_classes());
        assert_eq!(decoded.boxes.len(), 2);
        assert_eq!(decoded.malformed, 1);
        assert_eq!(decoded.unknown_class, 1);
        assert_eq!(decoded.dropped(), 2);
    }

    #[test]
    fn encode_boxes_has_no_trailing_newline() {
        let boxes = [
            BoundingBox::new(0, 0, 0, 10, 10),
            BoundingBox::new(1, 10, 10, 20, 20),
        ];
        let text = encode_boxes(&boxes, ImageDims::new(100, 100), &three_classes()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.ends_with('\n'));
    }
}
