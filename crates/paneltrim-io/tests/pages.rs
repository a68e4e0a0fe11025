//! Integration test: cut framed panels out of a synthetic page on disk,
//! trim them and check the files that land in the output directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use image::{Rgb, RgbImage};
use paneltrim_io::{
    BatchOptions, FsCodec, ImageCodec, IoError, OutputLayout, load_manifest, process_pages,
    process_panels,
};

/// 400x240 white page holding two 160x160 panels, each drawn with a
/// 4px black frame and a grey block inside.
fn framed_page() -> RgbImage {
    RgbImage::from_fn(400, 240, |x, y| {
        for x0 in [30, 210] {
            let y0 = 40;
            let (dx, dy) = (x.wrapping_sub(x0), y.wrapping_sub(y0));
            if dx < 160 && dy < 160 {
                let frame = dx < 4 || dy < 4 || dx >= 156 || dy >= 156;
                let block = (60..100).contains(&dx) && (60..100).contains(&dy);
                return if frame {
                    Rgb([0, 0, 0])
                } else if block {
                    Rgb([90, 90, 90])
                } else {
                    Rgb([255, 255, 255])
                };
            }
        }
        Rgb([255, 255, 255])
    })
}

fn write_fixture(dir: &Path) {
    FsCodec::default()
        .write(&dir.join("page_01.png"), &framed_page())
        .unwrap();
    let manifest = r#"[
        {"filename": "page_01.png", "size": [400, 240],
         "panels": [[20, 30, 180, 180], [200, 30, 180, 180]]},
        {"filename": "page_02.png", "panels": [[0, 0, 50, 50]]}
    ]"#;
    std::fs::write(dir.join("manifest.json"), manifest).unwrap();
}

#[test]
fn grouped_pages_with_border_removal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let pages = load_manifest(&input.path().join("manifest.json")).unwrap();
    let options = BatchOptions {
        layout: OutputLayout::Grouped,
        remove_borders: true,
        ..BatchOptions::default()
    };
    let summary = process_pages(
        &pages,
        input.path(),
        output.path(),
        &FsCodec::default(),
        &options,
    )
    .unwrap();

    assert_eq!(summary.inputs, 2);
    assert_eq!(summary.inputs_skipped, 1, "page_02.png does not exist");
    assert_eq!(summary.panels_written, 2);
    assert_eq!(summary.panels_trimmed, 2);

    let codec = FsCodec::default();
    for index in 0..2 {
        let path = output.path().join(format!("page_01/panel_{index}.jpg"));
        let panel = codec.read(&path).expect("panel file written");
        let (w, h) = panel.dimensions();
        assert!(w < 160 && h < 160, "frame not removed: {w}x{h}");
        assert!(w >= 100 && h >= 100, "panel over-trimmed: {w}x{h}");
    }
}

#[test]
fn flat_pages_without_border_removal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let pages = load_manifest(&input.path().join("manifest.json")).unwrap();
    let options = BatchOptions {
        layout: OutputLayout::Flat,
        ..BatchOptions::default()
    };
    let summary = process_pages(
        &pages,
        input.path(),
        output.path(),
        &FsCodec::default(),
        &options,
    )
    .unwrap();

    assert_eq!(summary.panels_written, 2);
    assert_eq!(summary.panels_trimmed, 0);
    let panel = FsCodec::default()
        .read(&output.path().join("page_01_panel_1.jpg"))
        .unwrap();
    assert_eq!(panel.dimensions(), (180, 180));
}

#[test]
fn standalone_panels_round_trip_through_disk() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let codec = FsCodec::default();

    let framed = image::imageops::crop_imm(&framed_page(), 20, 30, 180, 180).to_image();
    let tiny = RgbImage::new(12, 12);
    let framed_path = input.path().join("framed.png");
    let tiny_path = input.path().join("tiny.png");
    codec.write(&framed_path, &framed).unwrap();
    codec.write(&tiny_path, &tiny).unwrap();

    let summary = process_panels(
        &[framed_path, tiny_path],
        output.path(),
        &codec,
        &paneltrim_pipeline::BorderConfig::default(),
    )
    .unwrap();

    assert_eq!(summary.panels_written, 2);
    assert_eq!(summary.panels_trimmed, 1);
    let tiny_out = codec.read(&output.path().join("tiny.png")).unwrap();
    assert_eq!(tiny_out, tiny, "undersized panels are copied unchanged");
}

#[test]
fn missing_manifest_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_manifest(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, IoError::Read { .. }));
}
