use super::*;
use crate::{
    canvas::model::NewShape,
    foundation::core::{Rect, Rgba8},
    test_support::canvas_with_frame,
};

fn session() -> PromptSession {
    PromptSession::new(&PromptConfig::default())
}

#[test]
fn mode_follows_region_content() {
    let (mut canvas, _, region) = canvas_with_frame();
    assert_eq!(PromptMode::for_region(&canvas, &region), PromptMode::Agent);
    let f = region.container();
    canvas
        .create_shape(NewShape::geo(&f, Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::BLACK).locked(true))
        .unwrap();
    // Locked shapes are background, not content.
    assert_eq!(PromptMode::for_region(&canvas, &region), PromptMode::Agent);
    canvas
        .create_shape(NewShape::geo(&f, Rect::new(2.0, 0.0, 3.0, 1.0), Rgba8::BLACK))
        .unwrap();
    assert_eq!(PromptMode::for_region(&canvas, &region), PromptMode::Ask);
}

#[test]
fn only_final_results_are_appended() {
    let mut s = session();
    s.start_listening(PromptMode::Ask, Millis(0));
    s.on_results(
        PromptMode::Ask,
        &[
            SpeechResult::final_("draw a"),
            SpeechResult::interim("ca"),
        ],
    );
    s.on_results(PromptMode::Ask, &[SpeechResult::final_("cat")]);
    assert_eq!(s.transcripts().get(PromptMode::Ask), "draw a cat ");
    assert_eq!(s.transcripts().get(PromptMode::Agent), "");
}

#[test]
fn starting_to_listen_clears_only_that_mode() {
    let mut s = session();
    s.transcripts().set(PromptMode::Agent, "old agent");
    s.transcripts().set(PromptMode::Ask, "old ask");
    s.start_listening(PromptMode::Ask, Millis(0));
    assert_eq!(s.transcripts().get(PromptMode::Ask), "");
    assert_eq!(s.transcripts().get(PromptMode::Agent), "old agent");
}

#[test]
fn auto_generate_reads_transcript_at_fire_time() {
    let mut s = session();
    let handle = s.transcripts().clone();
    s.start_listening(PromptMode::Agent, Millis(1_000));
    assert_eq!(s.poll_auto_generate(PromptMode::Agent, Millis(20_999)), None);

    handle.set(PromptMode::Agent, "a red barn");
    assert_eq!(
        s.poll_auto_generate(PromptMode::Agent, Millis(21_000)).as_deref(),
        Some("a red barn")
    );
    assert_eq!(s.poll_auto_generate(PromptMode::Agent, Millis(60_000)), None);
}

#[test]
fn blank_transcript_skips_auto_generate() {
    let mut s = session();
    s.start_listening(PromptMode::Agent, Millis(0));
    s.on_results(PromptMode::Agent, &[SpeechResult::interim("hm")]);
    assert_eq!(s.poll_auto_generate(PromptMode::Agent, Millis(20_000)), None);
}

#[test]
fn ask_mode_and_stopping_never_auto_generate() {
    let mut s = session();
    s.start_listening(PromptMode::Ask, Millis(0));
    s.transcripts().set(PromptMode::Ask, "make it blue");
    assert_eq!(s.poll_auto_generate(PromptMode::Ask, Millis(30_000)), None);

    s.start_listening(PromptMode::Agent, Millis(0));
    s.on_results(PromptMode::Agent, &[SpeechResult::final_("sunset")]);
    s.stop_listening();
    assert!(!s.is_listening());
    assert_eq!(s.poll_auto_generate(PromptMode::Agent, Millis(30_000)), None);
    assert_eq!(s.transcripts().get(PromptMode::Agent), "sunset ");
}
