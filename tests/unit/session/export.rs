use super::*;
use crate::{
    EaselError,
    canvas::model::NewShape,
    foundation::core::{Point, Rect, Rgba8, ShapeId, Size},
    session::candidate::CandidateImage,
    test_support::{FlakyCanvas, canvas_with_frame, png},
};

#[test]
fn empty_region_exports_container_alone() {
    let (canvas, _, region) = canvas_with_frame();
    let snap = export_snapshot(&canvas, &region).unwrap().unwrap();
    assert_eq!(snap.shape_count(), 1);
    assert_eq!((snap.width(), snap.height()), (800, 600));
    assert!(snap.to_data_url().starts_with("data:image/png;base64,"));
}

#[test]
fn exported_set_is_unlocked_children_plus_container() {
    let (mut canvas, _, region) = canvas_with_frame();
    let f = region.container();
    for i in 0..3 {
        let x = f64::from(i) * 20.0;
        canvas
            .create_shape(NewShape::geo(&f, Rect::new(x, 0.0, x + 10.0, 10.0), Rgba8::BLACK))
            .unwrap();
    }
    canvas
        .create_shape(
            NewShape::geo(&f, Rect::new(0.0, 50.0, 10.0, 60.0), Rgba8::BLACK).locked(true),
        )
        .unwrap();

    let snap = export_snapshot(&canvas, &region).unwrap().unwrap();
    assert_eq!(snap.shape_count(), 4);
}

#[test]
fn export_reads_children_at_call_time() {
    let (mut canvas, _, region) = canvas_with_frame();
    let before = export_snapshot(&canvas, &region).unwrap().unwrap();
    let f = region.container();
    canvas
        .create_shape(NewShape::geo(&f, Rect::new(10.0, 10.0, 90.0, 90.0), Rgba8::BLACK))
        .unwrap();
    let after = export_snapshot(&canvas, &region).unwrap().unwrap();
    assert_ne!(before.png(), after.png());
    assert_eq!(after.shape_count(), 2);
}

#[test]
fn missing_container_exports_nothing() {
    let (canvas, _, _) = canvas_with_frame();
    let stale = Region::new(ShapeId::new("shape:deleted"));
    assert!(export_snapshot(&canvas, &stale).unwrap().is_none());
}

#[test]
fn encoder_failure_is_an_encoding_error() {
    let (canvas, _, region) = canvas_with_frame();
    let flaky = FlakyCanvas::new(canvas);
    flaky.fail_exports.set(true);
    assert!(matches!(
        export_snapshot(&flaky, &region),
        Err(EaselError::Encoding(_))
    ));
}

#[test]
fn oversized_image_child_is_clipped_to_the_frame() {
    let (mut canvas, _, region) = canvas_with_frame();
    let f = region.container();
    let asset = CandidateImage::from_bytes(png(1, 1, [0, 0, 255, 255]))
        .unwrap()
        .to_asset("huge.png")
        .unwrap();
    let asset = canvas.create_asset(asset).unwrap();
    canvas
        .create_shape(NewShape::image(
            &f,
            Point::ORIGIN,
            Size::new(1.0e6, 1.0e6),
            asset,
        ))
        .unwrap();

    let snap = export_snapshot(&canvas, &region).unwrap().unwrap();
    assert_eq!((snap.width(), snap.height()), (800, 600));
    let img = image::load_from_memory(snap.png()).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(400, 300).0, [0, 0, 255, 255]);
}
