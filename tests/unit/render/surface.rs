use super::*;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 32,
};

#[test]
fn recording_surface_measures_fixed_advance() {
    let mut s = RecordingSurface::new(CANVAS);
    let style = TextStyle::new(20.0, FontWeight::Bold, Rgba8::hex(0xffffff));
    assert_eq!(s.measure("abcd", &style).unwrap(), 40.0);
    assert_eq!(s.measure("", &style).unwrap(), 0.0);
}

#[test]
fn ops_become_visible_on_end_frame() {
    let mut s = RecordingSurface::new(CANVAS);
    s.begin_frame();
    s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::hex(0x000000))
        .unwrap();
    assert!(s.ops().is_empty());
    assert_eq!(s.pending_ops().len(), 1);
    s.end_frame().unwrap();
    assert_eq!(s.ops().len(), 1);
    assert_eq!(s.frames_completed(), 1);
}

#[test]
fn frame_stamp_changes_per_frame() {
    let mut s = RecordingSurface::new(CANVAS);
    s.begin_frame();
    s.end_frame().unwrap();
    let a = s.current_frame().pixel(0, 0).unwrap();
    s.begin_frame();
    s.end_frame().unwrap();
    let b = s.current_frame().pixel(0, 0).unwrap();
    assert_ne!(a, b);
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let f = FrameRGBA::blank(CANVAS);
    assert_eq!(f.data.len(), 64 * 32 * 4);
    assert!(f.pixel(64, 0).is_none());
    assert_eq!(f.pixel(63, 31), Some([0, 0, 0, 0]));
}
