//! Streaming encoders and the codec preference table.

/// `ffmpeg`-backed webm encoder.
pub mod ffmpeg;
/// Encoding profiles and capability negotiation.
pub mod profile;
/// Encoder contract and the in-memory encoder.
pub mod sink;
