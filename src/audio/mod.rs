//! Ambient audio bed.

/// Oscillator graph and session-scoped PCM stream.
pub mod ambient;
