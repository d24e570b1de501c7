use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use crate::render::surface::{DrawOp, FontWeight, RecordingSurface};

const STYLE: TextStyle = TextStyle::new(10.0, FontWeight::Regular, Rgba8::hex(0xffffff));

fn surface() -> RecordingSurface {
    // 5px per character at size 10.
    RecordingSurface::new(Canvas {
        width: 200,
        height: 100,
    })
}

#[test]
fn greedy_fill_breaks_before_overflow() {
    let mut s = surface();
    // "aaa bbb" = 7 chars = 35px fits in 40; adding " ccc" = 55px does not.
    let lines = wrap_lines(&mut s, "aaa bbb ccc ddd", 40.0, &STYLE).unwrap();
    assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
}

#[test]
fn overlong_word_is_kept_whole() {
    let mut s = surface();
    let lines = wrap_lines(&mut s, "a supercalifragilistic b", 30.0, &STYLE).unwrap();
    assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
}

#[test]
fn exact_fit_stays_on_line() {
    let mut s = surface();
    // "ab cd" = 25px == budget.
    let lines = wrap_lines(&mut s, "ab cd", 25.0, &STYLE).unwrap();
    assert_eq!(lines, vec!["ab cd"]);
}

#[test]
fn whitespace_runs_and_empty_text() {
    let mut s = surface();
    assert!(wrap_lines(&mut s, "   ", 100.0, &STYLE).unwrap().is_empty());
    assert_eq!(
        wrap_lines(&mut s, " one \n\t two ", 100.0, &STYLE).unwrap(),
        vec!["one two"]
    );
}

#[test]
fn draw_wrapped_advances_by_line_height() {
    let mut s = surface();
    s.begin_frame();
    let bottom =
        draw_wrapped(&mut s, "aaa bbb ccc", Point::new(7.0, 20.0), 40.0, 12.0, &STYLE).unwrap();
    s.end_frame().unwrap();

    let origins: Vec<_> = s
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { origin, .. } => Some(*origin),
            _ => None,
        })
        .collect();
    assert_eq!(origins, vec![Point::new(7.0, 20.0), Point::new(7.0, 32.0)]);
    assert_eq!(bottom, 44.0);
}
