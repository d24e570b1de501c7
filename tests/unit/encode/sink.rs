use super::*;
use crate::encode::profile::{VP8_OPUS, VP9_OPUS};

fn cfg() -> EncoderConfig {
    EncoderConfig {
        canvas: Canvas {
            width: 4,
            height: 2,
        },
        fps: Fps::new(30, 1).unwrap(),
        profile: VP9_OPUS,
        video_bits_per_second: 4_000_000,
        audio_bits_per_second: 128_000,
        audio: None,
    }
}

fn frame(tag: u8) -> FrameRGBA {
    let mut f = FrameRGBA::blank(cfg().canvas);
    f.data[0] = tag;
    f
}

#[test]
fn stream_concatenates_to_ordered_indices() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    let mut out = Vec::new();
    enc.push_frame(FrameIndex(0), &frame(1)).unwrap();
    out.extend(enc.poll_chunks().unwrap());
    assert!(enc.poll_chunks().unwrap().is_empty());
    enc.push_frame(FrameIndex(1), &frame(2)).unwrap();
    enc.push_frame(FrameIndex(2), &frame(3)).unwrap();
    out.extend(enc.poll_chunks().unwrap());
    out.extend(enc.finish().unwrap());

    let bytes = out.concat();
    assert_eq!(decode_in_memory_stream(&bytes), Some(vec![0, 1, 2]));
    assert_eq!(enc.frames()[2], (FrameIndex(2), [3, 0, 0, 0]));
    assert_eq!(enc.polls(), 3);
}

#[test]
fn rejects_out_of_order_and_wrong_size() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    enc.push_frame(FrameIndex(1), &frame(0)).unwrap();
    assert!(enc.push_frame(FrameIndex(1), &frame(0)).is_err());
    let big = FrameRGBA::blank(Canvas {
        width: 8,
        height: 8,
    });
    assert!(enc.push_frame(FrameIndex(2), &big).is_err());
}

#[test]
fn requires_begin() {
    let mut enc = InMemoryEncoder::new();
    assert!(enc.push_frame(FrameIndex(0), &frame(0)).is_err());
    assert!(enc.poll_chunks().is_err());
    assert!(enc.finish().is_err());
}

#[test]
fn injected_failures() {
    let mut enc = InMemoryEncoder::new().failing_at_frame(2);
    enc.begin(cfg()).unwrap();
    enc.push_frame(FrameIndex(0), &frame(0)).unwrap();
    enc.push_frame(FrameIndex(1), &frame(0)).unwrap();
    let err = enc.push_frame(FrameIndex(2), &frame(0)).unwrap_err();
    assert!(matches!(err, NewsreelError::Encode(_)));

    let mut enc = InMemoryEncoder::new().failing_on_finish();
    enc.begin(cfg()).unwrap();
    assert!(enc.finish().is_err());
    enc.abort();
    assert_eq!(enc.aborts(), 1);
    assert!(enc.config().is_none());
}

#[test]
fn codec_support_is_configurable() {
    let mut enc = InMemoryEncoder::new().without_codecs(&["vp9"]);
    assert!(!enc.supports(&VP9_OPUS));
    assert!(enc.supports(&VP8_OPUS));
}

#[test]
fn malformed_stream_does_not_decode() {
    assert_eq!(decode_in_memory_stream(b"garbage"), None);
    assert_eq!(decode_in_memory_stream(b"NRMEM1\x01END"), None);
    assert_eq!(decode_in_memory_stream(b"NRMEM1END"), Some(vec![]));
}
