use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap().as_f64(), 30.0);
}

#[test]
fn secs_to_frames_ceil_absorbs_float_noise() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(14.5), 435);
    assert_eq!(fps.secs_to_frames_ceil(17.5), 525);
    assert_eq!(fps.secs_to_frames_ceil(0.01), 1);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn rgba_hex_and_alpha() {
    let c = Rgba8::hex(0x93c5fd);
    assert_eq!((c.r, c.g, c.b, c.a), (0x93, 0xc5, 0xfd, 255));
    assert_eq!(Rgba8::hex(0x6366f1).with_alpha(0.18).a, 46);
}

#[test]
fn premul_scales_channels_by_alpha() {
    let c = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 0,
    };
    assert_eq!(c.to_premul(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::hex(0x102030).to_premul(), [0x10, 0x20, 0x30, 255]);
}
