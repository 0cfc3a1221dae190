use std::fs;

use yoloedit::geometry::{BoundingBox, Coord};
use yoloedit::session::{OpenOptions, Session};
use yoloedit::store::EditKind;

mod common;

fn draw(session: &mut Session, from: (i32, i32), to: (i32, i32)) {
    session.pointer_down(Coord::new(from.0, from.1));
    session.pointer_drag(Coord::new(to.0, to.1));
    session
        .pointer_up(Coord::new(to.0, to.1))
        .expect("autosave")
        .expect("box created");
}

#[test]
fn annotations_survive_reopen() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = common::image_dir(temp.path(), &[("a.bmp", 800, 600), ("b.bmp", 320, 240)]);

    let mut session = Session::new();
    session.open(&images, OpenOptions::default()).expect("open");
    draw(&mut session, (100, 100), (300, 400));
    session.select_class(2);
    draw(&mut session, (500, 50), (700, 250));
    assert!(session.next_image());
    session.select_class(1);
    draw(&mut session, (10, 10), (60, 90));

    let report = session.save_all().expect("save all");
    assert_eq!((report.annotated, report.total, report.records), (2, 2, 3));
    assert!(report.is_ok());

    let label = fs::read_to_string(temp.path().join("labels/a.txt")).expect("read label");
    assert_eq!(
        label.lines().next(),
        Some("0 0.250000 0.416667 0.250000 0.500000")
    );
    assert!(images.join("classes.txt").is_file());

    let mut reopened = Session::new();
    let summary = reopened.open(&images, OpenOptions::default()).expect("reopen");
    assert_eq!(summary.classes_imported, Some(3));
    assert_eq!(summary.load.expect("load report").records, 3);
    assert_eq!(
        reopened.render_boxes(),
        vec![
            BoundingBox::new(0, 100, 100, 300, 400),
            BoundingBox::new(2, 500, 50, 700, 250),
        ]
    );
    assert_eq!(reopened.box_labels(), vec!["1. person", "2. bicycle"]);
}

#[test]
fn clearing_an_image_deletes_its_label_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = common::image_dir(temp.path(), &[("a.bmp", 100, 100)]);
    let label = common::write_label(temp.path(), "a", "0 0.5 0.5 0.2 0.2\n");

    let mut session = Session::new();
    session.open(&images, OpenOptions::default()).expect("open");
    assert_eq!(session.render_boxes().len(), 1);

    let edit = session.clear_current().expect("save").expect("edit");
    assert_eq!(edit.kind, EditKind::Cleared { removed: 1 });
    assert!(!label.exists());
}

#[test]
fn malformed_lines_are_dropped_and_load_continues() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = common::image_dir(temp.path(), &[("a.bmp", 1000, 1000), ("b.bmp", 50, 50)]);
    common::write_label(temp.path(), "a", "1 0.5 0.5\n2 0.5 0.5 0.2 0.2\n");
    common::write_label(temp.path(), "b", "0 0.5 0.5 0.5 0.5\n");

    let mut session = Session::new();
    let summary = session.open(&images, OpenOptions::default()).expect("open");
    let load = summary.load.expect("load report");

    assert_eq!(load.dropped, 1);
    assert_eq!((load.annotated, load.total), (2, 2));
    assert_eq!(
        session.render_boxes(),
        vec![BoundingBox::new(2, 400, 400, 600, 600)]
    );
    assert!(load.to_string().contains("Loaded annotations for 2 of 2 images"));
}

#[test]
fn importing_classes_drops_annotations() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = common::image_dir(temp.path(), &[("a.bmp", 100, 100)]);
    common::write_label(temp.path(), "a", "0 0.5 0.5 0.2 0.2\n");

    let mut session = Session::new();
    session
        .open(
            &images,
            OpenOptions {
                load_classes: false,
                load_annotations: true,
            },
        )
        .expect("open");
    assert_eq!(session.total_boxes(), 1);

    fs::write(images.join("classes.txt"), "\nboat\n").expect("write classes");
    assert_eq!(session.load_classes().expect("load classes"), Some(1));
    assert_eq!(session.total_boxes(), 0);
    assert_eq!(session.classes().get(0).map(|c| c.export_id), Some(1));
}

#[test]
fn removing_a_class_renumbers_saved_labels() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let images = common::image_dir(temp.path(), &[("a.bmp", 100, 100)]);
    common::write_label(
        temp.path(),
        "a",
        "0 0.5 0.5 0.2 0.2\n1 0.5 0.5 0.2 0.2\n2 0.5 0.5 0.2 0.2\n",
    );

    let mut session = Session::new();
    session.open(&images, OpenOptions::default()).expect("open");
    let cascade = session.remove_class("car").expect("remove");
    assert_eq!((cascade.removed, cascade.renumbered), (1, 1));

    session.save_all().expect("save all");
    let label = fs::read_to_string(temp.path().join("labels/a.txt")).expect("read label");
    let ids: Vec<&str> = label
        .lines()
        .filter_map(|line| line.split(' ').next())
        .collect();
    // bicycle keeps its export id even though its position moved.
    assert_eq!(ids, vec!["0", "2"]);
    assert_eq!(
        fs::read_to_string(images.join("classes.txt")).expect("read classes"),
        "person\nbicycle\n"
    );
}

#[test]
fn labels_dir_for_nested_images_dir_is_parent_level_sibling() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let train = temp.path().join("images/train");
    common::write_bmp(&train.join("x.bmp"), 64, 64);

    let mut session = Session::new();
    session.open(&train, OpenOptions::default()).expect("open");
    let expected = temp.path().join("images/labels");
    assert_eq!(session.labels_dir(), Some(expected.as_path()));
    assert!(expected.is_dir());
    assert!(!temp.path().join("labels").exists());
}
