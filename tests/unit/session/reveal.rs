use super::*;
use crate::{
    canvas::memory::MemoryCanvas,
    test_support::{FlakyCanvas, canvas_with_frame, png},
};

const OVERLAY: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

fn candidate() -> CandidateImage {
    CandidateImage::from_bytes(png(400, 300, [0, 200, 0, 255])).unwrap()
}

fn controller(region: &Region) -> RevealController {
    let mut c = RevealController::new(
        region.clone(),
        RevealConfig::default(),
        StagingConfig::default(),
    );
    c.offer(candidate()).unwrap();
    c
}

fn revealing() -> (MemoryCanvas, RevealController) {
    let (mut canvas, _, region) = canvas_with_frame();
    let mut c = controller(&region);
    c.accept(&mut canvas, Millis(0)).unwrap();
    (canvas, c)
}

fn drag_release_at(x: f64) -> (MemoryCanvas, RevealController, Option<RevealEvent>) {
    let (mut canvas, mut c) = revealing();
    assert!(c.drag_start());
    assert_eq!(c.drag_to(Point::new(x, 50.0), OVERLAY), Some(x));
    let ev = c.drag_end(&mut canvas).unwrap();
    (canvas, c, ev)
}

#[test]
fn unassisted_sweep_is_monotonic_and_ends_at_exactly_100() {
    let (mut canvas, mut c) = revealing();
    let mut last = 0.0;
    for ms in (0..=300).step_by(10) {
        assert_eq!(c.tick(&mut canvas, Millis(ms)).unwrap(), None);
        let pos = c.overlay().unwrap().position;
        assert!(pos >= last, "position went backwards at {ms}ms");
        last = pos;
    }
    assert_eq!(last, 100.0);
    assert_eq!(c.phase(), RevealPhase::Revealing);
}

#[test]
fn sweep_completes_after_grace_delay() {
    let (mut canvas, mut c) = revealing();
    c.tick(&mut canvas, Millis(300)).unwrap();
    assert_eq!(c.tick(&mut canvas, Millis(599)).unwrap(), None);

    let ev = c.tick(&mut canvas, Millis(600)).unwrap();
    assert!(matches!(ev, Some(RevealEvent::Completed { .. })));
    assert_eq!(c.phase(), RevealPhase::Idle);
    assert!(!c.can_review());

    let f = c.region().container();
    let children = canvas.sorted_child_ids(&f);
    assert_eq!(children.len(), 1);
}

#[test]
fn releasing_at_threshold_completes() {
    for x in [95.0, 100.0] {
        let (_, c, ev) = drag_release_at(x);
        assert!(
            matches!(ev, Some(RevealEvent::Completed { .. })),
            "release at {x}"
        );
        assert_eq!(c.phase(), RevealPhase::Idle);
    }
}

#[test]
fn releasing_below_threshold_holds_position_without_resuming() {
    let (mut canvas, mut c, ev) = drag_release_at(94.0);
    assert_eq!(ev, None);
    assert_eq!(c.phase(), RevealPhase::Revealing);

    for ms in [100, 300, 600, 5_000] {
        assert_eq!(c.tick(&mut canvas, Millis(ms)).unwrap(), None);
        assert_eq!(c.overlay().unwrap().position, 94.0);
    }
    let f = c.region().container();
    assert!(canvas.sorted_child_ids(&f).is_empty());
}

#[test]
fn drag_position_is_clamped_to_overlay() {
    let (_, mut c) = revealing();
    c.drag_start();
    assert_eq!(c.drag_to(Point::new(-40.0, 0.0), OVERLAY), Some(0.0));
    assert_eq!(c.drag_to(Point::new(250.0, 0.0), OVERLAY), Some(100.0));
    let wide = Rect::new(100.0, 0.0, 300.0, 50.0);
    assert_eq!(c.drag_to(Point::new(150.0, 0.0), wide), Some(25.0));
}

#[test]
fn drag_during_grace_cancels_pending_completion() {
    let (mut canvas, mut c) = revealing();
    c.tick(&mut canvas, Millis(400)).unwrap();
    c.drag_start();
    c.drag_to(Point::new(50.0, 0.0), OVERLAY);
    assert_eq!(c.drag_end(&mut canvas).unwrap(), None);
    assert_eq!(c.tick(&mut canvas, Millis(10_000)).unwrap(), None);
    assert_eq!(c.phase(), RevealPhase::Revealing);
}

#[test]
fn cancel_during_staging_discards_late_result() {
    let (mut canvas, clock, region) = canvas_with_frame();
    let mut c = controller(&region);

    let pending = c.begin(&canvas).unwrap();
    assert_eq!(c.phase(), RevealPhase::Priming);
    assert!(c.overlay().unwrap().after.is_none());

    clock.advance(50);
    assert_eq!(
        c.cancel(),
        Some(RevealEvent::Cancelled {
            session: pending.session
        })
    );
    assert!(c.overlay().is_none());

    let staged = c.stage(&mut canvas, &pending);
    let err = c
        .complete_staging(pending.session, staged, clock.advance(50))
        .unwrap_err();
    assert!(matches!(err, EaselError::StaleSession(_)));
    assert!(err.user_message().is_none());
    assert!(c.overlay().is_none());
    assert!(canvas.sorted_child_ids(&region.container()).is_empty());
    assert!(c.can_review());
}

#[test]
fn before_capture_failure_creates_no_session() {
    let (canvas, _, region) = canvas_with_frame();
    let flaky = FlakyCanvas::new(canvas);
    flaky.fail_exports.set(true);
    let mut c = controller(&region);

    assert!(matches!(c.begin(&flaky), Err(EaselError::Encoding(_))));
    assert_eq!(c.phase(), RevealPhase::Idle);
    assert!(c.can_review());
}

#[test]
fn staging_failure_destroys_session() {
    let (mut canvas, _, region) = canvas_with_frame();
    let mut c = controller(&region);
    let pending = c.begin(&canvas).unwrap();
    let err = c
        .complete_staging(
            pending.session,
            Err(EaselError::encoding("boom")),
            Millis(10),
        )
        .unwrap_err();
    assert!(matches!(err, EaselError::Encoding(_)));
    assert_eq!(c.phase(), RevealPhase::Idle);
    assert!(c.overlay().is_none());
    assert_eq!(c.tick(&mut canvas, Millis(1_000)).unwrap(), None);
}

#[test]
fn before_image_is_shown_while_priming() {
    let (canvas, _, region) = canvas_with_frame();
    let mut c = controller(&region);
    c.begin(&canvas).unwrap();
    let overlay = c.overlay().unwrap();
    assert_eq!(overlay.phase, RevealPhase::Priming);
    assert_eq!(overlay.position, 0.0);
    assert_eq!(overlay.before.shape_count(), 1);
    let g = overlay.geometry.unwrap();
    assert!(g.width() > 0.0 && g.height() > 0.0);
}

#[test]
fn reject_hides_review_without_a_session() {
    let (_, _, region) = canvas_with_frame();
    let mut c = controller(&region);
    assert!(c.can_review());
    c.reject().unwrap();
    assert!(!c.can_review());
    assert_eq!(c.phase(), RevealPhase::Idle);
    assert!(c.candidate().is_some());
}

#[test]
fn offers_are_refused_mid_session() {
    let (_, mut c) = revealing();
    assert!(c.offer(candidate()).is_err());
    assert!(c.reject().is_err());
    c.cancel();
    assert!(c.offer(candidate()).is_ok());
    assert!(c.can_review());
}

#[test]
fn cancel_leaves_canvas_untouched() {
    let (canvas, mut c) = revealing();
    let shapes = canvas.document().shapes.clone();
    assert!(matches!(c.cancel(), Some(RevealEvent::Cancelled { .. })));
    assert_eq!(canvas.document().shapes, shapes);
    assert_eq!(c.cancel(), None);
}
