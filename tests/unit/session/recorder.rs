use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::assets::decode::PreparedImage;
use crate::deck::slide::Slide;
use crate::encode::sink::InMemoryEncoder;
use crate::foundation::core::Canvas;
use crate::render::surface::RecordingSurface;
use crate::session::clock::FixedStepClock;

struct NoImages;

impl ImageLoader for NoImages {
    fn load(&mut self, url: &str) -> NewsreelResult<PreparedImage> {
        Err(NewsreelError::render(format!("no image for {url}")))
    }
}

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 36,
};

fn settings() -> SessionSettings {
    SessionSettings {
        sample_rate: 8_000,
        channels: 1,
        ..SessionSettings::default()
    }
}

fn controller(enc: InMemoryEncoder) -> RecordingController<RecordingSurface, InMemoryEncoder, NoImages> {
    RecordingController::new(RecordingSurface::new(CANVAS), enc, NoImages, settings())
}

fn short_deck() -> Deck {
    Deck::from_slides(vec![
        Slide::Title {
            text: "Hello".into(),
        },
        Slide::Outro {
            text: "Bye".into(),
        },
    ])
}

fn fps() -> Fps {
    Fps::new(10, 1).unwrap()
}

#[test]
fn progress_percent_floors_and_clamps() {
    assert_eq!(progress_percent(0.0, 14.5), 0);
    assert_eq!(progress_percent(7.25, 14.5), 50);
    assert_eq!(progress_percent(14.4, 14.5), 99);
    assert_eq!(progress_percent(20.0, 14.5), 100);
    assert_eq!(progress_percent(1.0, 0.0), 100);
}

#[test]
fn session_id_display() {
    assert_eq!(SessionId(3).to_string(), "session-3");
}

#[test]
fn tick_before_start_is_noop() {
    let mut c = controller(InMemoryEncoder::new());
    assert_eq!(c.tick(Duration::from_secs(1)), &SessionState::Idle);
    assert_eq!(c.surface().frames_completed(), 0);
}

#[test]
fn runs_short_deck_to_finished() {
    let mut c = controller(InMemoryEncoder::new());
    let deck = short_deck();
    let total = deck.total_duration_secs();
    c.start(&deck, SlideContext::default(), total, fps()).unwrap();
    assert!(c.state().is_recording());
    c.run(&mut FixedStepClock::for_fps(fps()));

    let artifact = c.state().artifact().expect("finished");
    assert_eq!(artifact.session, SessionId(1));
    assert_eq!(artifact.mime, "video/webm;codecs=vp9,opus");
    assert_eq!(artifact.file_name, "ai-tool-video.webm");
    assert_eq!(c.progress(), 100);
    assert_eq!(c.audio_releases(), 1);
    // 5.5s at 10 fps.
    assert_eq!(c.encoder().frames().len(), 55);
}

#[test]
fn audio_bed_is_wired_into_encoder() {
    let mut c = controller(InMemoryEncoder::new());
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    let audio = c
        .encoder()
        .config()
        .and_then(|cfg| cfg.audio.clone())
        .expect("audio input");
    assert_eq!(audio.sample_rate, 8_000);
    assert_eq!(audio.channels, 1);
    assert!(audio.path.exists());
    c.run(&mut FixedStepClock::for_fps(fps()));
    assert!(!audio.path.exists());
}

#[test]
fn no_supported_profile_fails_before_recording() {
    let enc = InMemoryEncoder::new().without_codecs(&["vp9", "vp8"]);
    let mut c = controller(enc);
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    let msg = c.state().error().expect("failed");
    assert!(msg.contains("no supported encoding profile"));
    assert!(c.encoder().config().is_none());
    assert_eq!(c.audio_releases(), 0);
    assert_eq!(c.progress(), 0);
}

#[test]
fn falls_back_to_vp8() {
    let enc = InMemoryEncoder::new().without_codecs(&["vp9"]);
    let mut c = controller(enc);
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    c.run(&mut FixedStepClock::for_fps(fps()));
    assert_eq!(
        c.state().artifact().map(|a| a.mime.as_str()),
        Some("video/webm;codecs=vp8,opus")
    );
}

#[test]
fn invalid_duration_fails() {
    let mut c = controller(InMemoryEncoder::new());
    c.start(&short_deck(), SlideContext::default(), f64::NAN, fps())
        .unwrap();
    assert!(c.state().error().is_some());
    c.start(&Deck::from_slides(Vec::new()), SlideContext::default(), 1.0, fps())
        .unwrap();
    assert!(c.state().error().is_some());
}

#[test]
fn observer_sees_monotonic_progress() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut c = controller(InMemoryEncoder::new());
    c.set_progress_observer(move |_, pct| sink.borrow_mut().push(pct));
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    c.run(&mut FixedStepClock::for_fps(fps()));

    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.iter().filter(|&&p| p == 100).count(), 1);
}

#[test]
fn failure_on_finish_releases_audio_and_keeps_progress() {
    let mut c = controller(InMemoryEncoder::new().failing_on_finish());
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    c.run(&mut FixedStepClock::for_fps(fps()));
    assert!(c.state().error().is_some());
    assert_eq!(c.progress(), 99);
    assert_eq!(c.audio_releases(), 1);
    assert_eq!(c.encoder().aborts(), 1);
}

#[test]
fn stalled_scheduler_fails_session() {
    let mut c = controller(InMemoryEncoder::new());
    c.start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    c.run(&mut FixedStepClock::with_steps(Vec::new()));
    assert_eq!(c.state().error(), Some("render error: frame scheduler stalled"));
    assert_eq!(c.audio_releases(), 1);
}

#[test]
fn restart_after_terminal_state_mints_new_session() {
    let mut c = controller(InMemoryEncoder::new());
    let a = c
        .start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    c.run(&mut FixedStepClock::for_fps(fps()));
    let b = c
        .start(&short_deck(), SlideContext::default(), 5.5, fps())
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(c.progress(), 0);
    assert!(c.state().is_recording());
    assert_eq!(c.start(&short_deck(), SlideContext::default(), 5.5, fps()), Err(StartError::Busy));
}
