//! Recording sessions: frame pacing, capture and the session state machine.

/// Surface capture at the target frame rate.
pub mod capture;
/// Frame schedulers.
pub mod clock;
/// The recording state machine.
pub mod recorder;
