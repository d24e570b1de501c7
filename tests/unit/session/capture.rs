use super::*;
use crate::encode::profile::VP9_OPUS;
use crate::encode::sink::{EncoderConfig, InMemoryEncoder};
use crate::foundation::core::Canvas;

const CANVAS: Canvas = Canvas {
    width: 2,
    height: 2,
};

fn encoder() -> InMemoryEncoder {
    let mut enc = InMemoryEncoder::new();
    enc.begin(EncoderConfig {
        canvas: CANVAS,
        fps: Fps::new(30, 1).unwrap(),
        profile: VP9_OPUS,
        video_bits_per_second: 1,
        audio_bits_per_second: 1,
        audio: None,
    })
    .unwrap();
    enc
}

fn tagged(tag: u8) -> FrameRGBA {
    let mut f = FrameRGBA::blank(CANVAS);
    f.data[0] = tag;
    f
}

#[test]
fn slow_tick_duplicates_fast_tick_skips() {
    let fps = Fps::new(30, 1).unwrap();
    let mut cap = CaptureStream::new(fps, 1.0);
    let mut enc = encoder();

    // t = 0.01 starts slot 0 only.
    assert_eq!(cap.sample(0.01, &tagged(1), &mut enc).unwrap(), 1);
    // Still inside slot 0.
    assert_eq!(cap.sample(0.02, &tagged(2), &mut enc).unwrap(), 0);
    // A 100ms stall: slots 1, 2 and 3 all get the current frame.
    assert_eq!(cap.sample(0.12, &tagged(3), &mut enc).unwrap(), 3);

    let tags: Vec<u8> = enc.frames().iter().map(|(_, px)| px[0]).collect();
    assert_eq!(tags, vec![1, 3, 3, 3]);
}

#[test]
fn finish_pads_to_ceil_of_duration() {
    let fps = Fps::new(30, 1).unwrap();
    let mut cap = CaptureStream::new(fps, 14.5);
    assert_eq!(cap.total_frames(), 435);
    let mut enc = encoder();
    cap.sample(1.0, &tagged(1), &mut enc).unwrap();
    assert_eq!(cap.emitted(), 31);
    cap.finish(&tagged(9), &mut enc).unwrap();
    assert_eq!(cap.emitted(), 435);
    assert_eq!(enc.frames().len(), 435);
    assert_eq!(enc.frames().last().map(|(i, _)| *i), Some(FrameIndex(434)));
}

#[test]
fn never_exceeds_total_frames() {
    let fps = Fps::new(10, 1).unwrap();
    let mut cap = CaptureStream::new(fps, 1.0);
    let mut enc = encoder();
    cap.sample(5.0, &tagged(1), &mut enc).unwrap();
    assert_eq!(cap.emitted(), 10);
    assert_eq!(cap.finish(&tagged(1), &mut enc).unwrap(), 0);
}
