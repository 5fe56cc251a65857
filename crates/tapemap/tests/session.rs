mod common;

use common::{bright_tape_config, floor_frame, taped_frame, tape_block_frame, PATCHES, PATCH_SIDE};
use image::ImageFormat;
use nalgebra::Point2;
use std::io::Cursor;
use std::sync::Arc;
use tapemap::{MemorySink, TapeMapConfig, TapeMapError, TapeMapSession};

fn session() -> TapeMapSession {
    TapeMapSession::new(bright_tape_config()).expect("valid config")
}

#[test]
fn scan_before_any_frame_is_not_initialized() {
    let s = session();
    s.on_tag_update(vec![("10".into(), Point2::new(5.0, 5.0))]);
    assert!(matches!(
        s.request_scan("10"),
        Err(TapeMapError::MapNotInitialized)
    ));
    assert!(s.map_snapshot().is_none());
}

#[test]
fn unknown_target_is_unresolved() {
    let s = session();
    s.on_frame(&floor_frame(64, 64)).unwrap();
    s.on_tag_update(vec![("10".into(), Point2::new(5.0, 5.0))]);

    match s.request_scan("11") {
        Err(TapeMapError::TargetUnresolved { target }) => assert_eq!(target, "11"),
        other => panic!("expected TargetUnresolved, got {other:?}"),
    }
    assert!(s.request_scan("10").is_ok());
}

#[test]
fn empty_frame_is_invalid_and_leaves_no_map() {
    let s = session();
    let err = s.on_frame(&image::RgbImage::new(0, 0)).unwrap_err();
    assert!(matches!(err, TapeMapError::InvalidInput { .. }));
    assert!(s.map_snapshot().is_none());
}

#[test]
fn first_frame_fixes_the_map_size() {
    let s = session();
    s.on_frame(&taped_frame()).unwrap();
    let before = s.map_snapshot().unwrap();

    let err = s.on_frame(&floor_frame(32, 64)).unwrap_err();
    assert!(matches!(err, TapeMapError::InvalidInput { .. }));
    assert_eq!(s.map_snapshot().unwrap(), before);
    assert_eq!(before.dimensions(), (64, 64));
}

#[test]
fn undecodable_bytes_are_invalid_input() {
    let s = session();
    let err = s.on_frame_encoded(b"definitely not an image").unwrap_err();
    assert!(matches!(err, TapeMapError::InvalidInput { .. }));
    assert!(s.map_snapshot().is_none());
}

#[test]
fn encoded_frames_go_through_the_same_pipeline() {
    let mut png = Vec::new();
    taped_frame()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let s = session();
    let report = s.on_frame_encoded(&png).unwrap();
    assert_eq!(report.stats.kept, report.regions.len());
    assert_eq!(s.map_snapshot().unwrap().dimensions(), (64, 64));
}

#[test]
fn repeated_tape_becomes_visible_to_scans() {
    let sink = Arc::new(MemorySink::new());
    let s = session().with_sink(sink.clone());

    let mut report = None;
    for _ in 0..10 {
        report = Some(s.on_frame(&taped_frame()).unwrap());
    }
    let report = report.unwrap();
    assert!(!report.regions.is_empty(), "stats={:?}", report.stats);
    assert_eq!(sink.published(), 10);

    let patch_centers: Vec<Point2<f32>> = PATCHES
        .iter()
        .map(|&(x, y)| {
            let half = (PATCH_SIDE as f32 - 1.0) * 0.5;
            Point2::new(x as f32 + half, y as f32 + half)
        })
        .collect();
    for r in &report.regions {
        let nearest = patch_centers
            .iter()
            .map(|c| (r.center - c).norm())
            .fold(f32::INFINITY, f32::min);
        assert!(nearest < 4.0, "region {r:?} is not near a tape patch");
    }

    // ray 3 points along -x; start 10 px right of a region center
    let c = report.regions[0].center;
    s.on_tag_update(vec![("robot".into(), Point2::new(c.x + 10.0, c.y))]);
    let scan = s.request_scan("robot").unwrap();
    assert!(scan.ranges[3] <= 11.0, "ranges={:?}", scan.ranges);

    let published = sink.last_map().unwrap();
    let px = published.get_pixel(c.x.round() as u32, c.y.round() as u32);
    assert!(px.0[0] > 250);
}

#[test]
fn large_tape_reaches_default_scans_through_the_mask() {
    let s = TapeMapSession::new(TapeMapConfig::default()).unwrap();
    for _ in 0..10 {
        let report = s.on_frame(&tape_block_frame()).unwrap();
        assert!(report.regions.is_empty(), "block should be too large: {report:?}");
        assert!(report.stats.too_large >= 1);
    }

    let map = s.map_snapshot().unwrap();
    assert!(map.get(32, 32).unwrap() > 250.0);
    // floor pixels are mask 0 and drift below neutral
    assert!(map.get(5, 5).unwrap() < 1.0);

    s.on_tag_update(vec![("robot".into(), Point2::new(32.0, 10.0))]);
    let scan = s.request_scan("robot").unwrap();
    assert!(scan.hits() >= 1, "ranges={:?}", scan.ranges);
    // ray 1 (60 degrees) reaches the block's top edge after about 16 steps
    assert!(scan.ranges[1] < 30.0, "ranges={:?}", scan.ranges);
}
