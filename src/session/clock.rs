use std::time::{Duration, Instant};

use crate::foundation::core::Fps;

/// Source of frame callbacks for a recording session.
///
/// Each call to `next_frame` blocks until the next frame is due and returns the wall time since
/// the last `restart`. Returned times never decrease.
pub trait FrameScheduler {
    /// Reset the session clock origin to now.
    fn restart(&mut self);
    /// Wait for the next frame; returns session-relative time.
    fn next_frame(&mut self) -> Duration;
}

/// Real-time pacing: sleeps until the next `1/fps` deadline.
///
/// Late wakeups are reported as-is, so a slow frame shows up as a larger time step.
#[derive(Debug)]
pub struct PacedClock {
    period: Duration,
    origin: Instant,
    frames: u32,
}

impl PacedClock {
    /// Clock paced at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            period: Duration::from_secs_f64(fps.frame_duration_secs()),
            origin: Instant::now(),
            frames: 0,
        }
    }
}

impl FrameScheduler for PacedClock {
    fn restart(&mut self) {
        self.origin = Instant::now();
        self.frames = 0;
    }

    fn next_frame(&mut self) -> Duration {
        self.frames = self.frames.saturating_add(1);
        let deadline = self.period * self.frames;
        let now = self.origin.elapsed();
        if now < deadline {
            std::thread::sleep(deadline - now);
        }
        self.origin.elapsed()
    }
}

/// Deterministic fake clock advancing by fixed steps without sleeping.
///
/// Used for offline rendering and tests. [`FixedStepClock::with_steps`] replays an explicit
/// sequence of steps (cycling), which models frame-rate jitter.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    steps: Vec<Duration>,
    next: usize,
    now: Duration,
}

impl FixedStepClock {
    /// Clock advancing by `step` per frame.
    pub fn new(step: Duration) -> Self {
        Self::with_steps(vec![step])
    }

    /// Clock advancing by one frame period of `fps` per frame.
    pub fn for_fps(fps: Fps) -> Self {
        Self::new(Duration::from_secs_f64(fps.frame_duration_secs()))
    }

    /// Clock cycling through `steps`. An empty list behaves like a zero step.
    pub fn with_steps(steps: Vec<Duration>) -> Self {
        Self {
            steps,
            next: 0,
            now: Duration::ZERO,
        }
    }

    /// Current fake time.
    pub fn now(&self) -> Duration {
        self.now
    }
}

impl FrameScheduler for FixedStepClock {
    fn restart(&mut self) {
        self.now = Duration::ZERO;
        self.next = 0;
    }

    fn next_frame(&mut self) -> Duration {
        if let Some(step) = self.steps.get(self.next % self.steps.len().max(1)) {
            self.now += *step;
        }
        self.next = self.next.wrapping_add(1);
        self.now
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
