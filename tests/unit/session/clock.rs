use super::*;

#[test]
fn fixed_step_advances_without_sleeping() {
    let mut c = FixedStepClock::new(Duration::from_millis(50));
    assert_eq!(c.next_frame(), Duration::from_millis(50));
    assert_eq!(c.next_frame(), Duration::from_millis(100));
    c.restart();
    assert_eq!(c.now(), Duration::ZERO);
    assert_eq!(c.next_frame(), Duration::from_millis(50));
}

#[test]
fn fixed_step_cycles_jitter_pattern() {
    let mut c = FixedStepClock::with_steps(vec![
        Duration::from_millis(10),
        Duration::from_millis(30),
    ]);
    let times: Vec<_> = (0..4).map(|_| c.next_frame().as_millis()).collect();
    assert_eq!(times, vec![10, 40, 50, 80]);
}

#[test]
fn empty_step_list_stays_put() {
    let mut c = FixedStepClock::with_steps(Vec::new());
    assert_eq!(c.next_frame(), Duration::ZERO);
}

#[test]
fn for_fps_uses_frame_period() {
    let mut c = FixedStepClock::for_fps(Fps::new(30, 1).unwrap());
    let t = c.next_frame().as_secs_f64();
    assert!((t - 1.0 / 30.0).abs() < 1e-9);
}

#[test]
fn paced_clock_waits_for_deadlines() {
    let mut c = PacedClock::new(Fps::new(100, 1).unwrap());
    c.restart();
    let a = c.next_frame();
    let b = c.next_frame();
    assert!(a >= Duration::from_millis(10));
    assert!(b >= Duration::from_millis(20));
    assert!(b > a);
}
