use std::{cell::RefCell, sync::Arc};

use super::*;
use crate::foundation::{clock::ManualClock, core::Millis};

fn canvas() -> (MemoryCanvas, ManualClock) {
    let clock = ManualClock::new(Millis(0));
    let canvas = MemoryCanvas::new(Size::new(1000.0, 800.0), Rc::new(clock.clone()));
    (canvas, clock)
}

fn frame(canvas: &mut MemoryCanvas) -> ShapeId {
    canvas
        .create_shape(NewShape::frame(
            "Drawing Area",
            Rect::new(100.0, 100.0, 500.0, 400.0),
        ))
        .unwrap()
}

#[test]
fn children_are_ordered_by_creation() {
    let (mut c, _) = canvas();
    let f = frame(&mut c);
    let a = c
        .create_shape(NewShape::geo(&f, Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8::BLACK))
        .unwrap();
    let b = c
        .create_shape(NewShape::geo(&f, Rect::new(5.0, 5.0, 10.0, 10.0), Rgba8::BLACK))
        .unwrap();
    assert_eq!(c.sorted_child_ids(&f), vec![a, b]);
}

#[test]
fn create_rejects_missing_parent_and_asset() {
    let (mut c, _) = canvas();
    let ghost = ShapeId::new("shape:ghost");
    assert!(matches!(
        c.create_shape(NewShape::geo(&ghost, Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::BLACK)),
        Err(EaselError::NotReady(_))
    ));
    let f = frame(&mut c);
    let img = NewShape::image(
        &f,
        Point::ZERO,
        Size::new(1.0, 1.0),
        AssetId::new("asset:none"),
    );
    assert!(c.create_shape(img).is_err());
}

#[test]
fn deleting_a_frame_removes_its_subtree() {
    let (mut c, _) = canvas();
    let f = frame(&mut c);
    c.create_shape(NewShape::geo(&f, Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8::BLACK))
        .unwrap();
    c.delete_shapes(&[f]);
    assert!(c.page_shape_ids().is_empty());
}

#[test]
fn listeners_see_stamped_changes_until_unlistened() {
    let (mut c, clock) = canvas();
    let seen: Rc<RefCell<Vec<StoreChange>>> = Rc::default();
    let sink = seen.clone();
    let id = c.listen(Box::new(move |change| sink.borrow_mut().push(change.clone())));

    clock.set(Millis(42));
    let f = frame(&mut c);
    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source, ChangeSource::User);
        assert_eq!(seen[0].at, Millis(42));
        assert_eq!(seen[0].kind, ChangeKind::ShapeCreated(f.clone()));
    }

    c.unlisten(id);
    assert_eq!(c.listener_count(), 0);
    c.set_locked(&f, true).unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn load_remote_is_tagged_remote_and_replaces_document() {
    let (mut source, _) = canvas();
    frame(&mut source);
    let snapshot = source.serialize_document().unwrap();

    let (mut target, _) = canvas();
    let seen: Rc<RefCell<Vec<StoreChange>>> = Rc::default();
    let sink = seen.clone();
    target.listen(Box::new(move |change| sink.borrow_mut().push(change.clone())));
    target.load_remote(&snapshot).unwrap();

    assert_eq!(target.document(), source.document());
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].source, ChangeSource::Remote);
    assert_eq!(seen[0].kind, ChangeKind::DocumentLoaded);
}

#[test]
fn fresh_ids_skip_loaded_ones() {
    let (mut source, _) = canvas();
    let f = frame(&mut source);
    let snapshot = source.serialize_document().unwrap();

    let (mut target, _) = canvas();
    target.load_remote(&snapshot).unwrap();
    let g = target
        .create_shape(NewShape::geo(&f, Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::BLACK))
        .unwrap();
    assert_ne!(g, f);
}

#[test]
fn zoom_to_fit_centres_content_in_viewport() {
    let (mut c, _) = canvas();
    let f = frame(&mut c);
    c.zoom_to_fit();
    let b = c.page_bounds(&f).unwrap();
    let tl = c.page_to_screen(Point::new(b.x0, b.y0));
    let br = c.page_to_screen(Point::new(b.x1, b.y1));
    let mid_x = (tl.x + br.x) / 2.0;
    let mid_y = (tl.y + br.y) / 2.0;
    assert!((mid_x - 500.0).abs() < 1e-9);
    assert!((mid_y - 400.0).abs() < 1e-9);
    assert!(tl.x >= 0.0 && br.x <= 1000.0);
    assert!(tl.y >= 0.0 && br.y <= 800.0);
}

#[test]
fn assets_round_trip_and_delete() {
    let (mut c, _) = canvas();
    let id = c
        .create_asset(NewImageAsset {
            name: "x.png".to_string(),
            mime_type: "image/png".to_string(),
            width: 1,
            height: 1,
            bytes: Arc::new(vec![1, 2, 3]),
        })
        .unwrap();
    assert_eq!(c.asset(&id).unwrap().name, "x.png");
    c.delete_assets(&[id.clone()]);
    assert!(c.asset(&id).is_none());
}
