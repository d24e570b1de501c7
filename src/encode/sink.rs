use std::path::PathBuf;

use crate::audio::ambient::AudioStream;
use crate::encode::profile::EncodingProfile;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`MediaEncoder`] when a session opens it.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Frame size.
    pub canvas: Canvas,
    /// Capture frame rate.
    pub fps: Fps,
    /// Negotiated container/codec profile.
    pub profile: EncodingProfile,
    /// Target video bitrate.
    pub video_bits_per_second: u32,
    /// Target audio bitrate.
    pub audio_bits_per_second: u32,
    /// Audio track source. `None` produces a video-only file.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for the encoder's audio track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

impl From<&AudioStream> for AudioInputConfig {
    fn from(stream: &AudioStream) -> Self {
        Self {
            path: stream.path.clone(),
            sample_rate: stream.sample_rate,
            channels: stream.channels,
        }
    }
}

/// Streaming encoder contract.
///
/// Call order: `begin`, then any interleaving of `push_frame` (strictly increasing indices) and
/// `poll_chunks`, then `finish` or `abort`. Chunks are returned in output order; concatenating
/// everything `poll_chunks` and `finish` return yields the complete file.
pub trait MediaEncoder {
    /// Whether this encoder can produce `profile` on this host.
    fn supports(&mut self, profile: &EncodingProfile) -> bool;
    /// Open the encoder.
    fn begin(&mut self, cfg: EncoderConfig) -> NewsreelResult<()>;
    /// Encode one captured frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()>;
    /// Output produced since the last poll, possibly empty.
    fn poll_chunks(&mut self) -> NewsreelResult<Vec<Vec<u8>>>;
    /// Finalize and return the remaining output.
    fn finish(&mut self) -> NewsreelResult<Vec<Vec<u8>>>;
    /// Tear down after a failure, discarding pending output.
    fn abort(&mut self) {}
}

/// Container header written by [`InMemoryEncoder`] at the start of every file.
pub const IN_MEMORY_HEADER: &[u8] = b"NRMEM1";
/// Trailer written by [`InMemoryEncoder`] on `finish`.
pub const IN_MEMORY_TRAILER: &[u8] = b"END";

/// Encoder that records frames and emits a synthetic byte stream, for tests and dry runs.
///
/// The stream is [`IN_MEMORY_HEADER`], then each frame index as little-endian `u64`, then
/// [`IN_MEMORY_TRAILER`].
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    cfg: Option<EncoderConfig>,
    unsupported: Vec<&'static str>,
    fail_at_frame: Option<u64>,
    fail_on_finish: bool,
    pending: Vec<u8>,
    frames: Vec<(FrameIndex, [u8; 4])>,
    last_idx: Option<FrameIndex>,
    polls: u64,
    aborts: u64,
}

impl InMemoryEncoder {
    /// Encoder that supports every profile and never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report profiles with any of these video codecs as unsupported.
    pub fn without_codecs(mut self, video_codecs: &[&'static str]) -> Self {
        self.unsupported.extend_from_slice(video_codecs);
        self
    }

    /// Fail when a frame with index `>= idx` is pushed.
    pub fn failing_at_frame(mut self, idx: u64) -> Self {
        self.fail_at_frame = Some(idx);
        self
    }

    /// Fail on `finish`.
    pub fn failing_on_finish(mut self) -> Self {
        self.fail_on_finish = true;
        self
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.cfg.as_ref()
    }

    /// Frame indices received, each with the first pixel of its frame.
    pub fn frames(&self) -> &[(FrameIndex, [u8; 4])] {
        &self.frames
    }

    /// Number of `poll_chunks` calls.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Number of `abort` calls.
    pub fn aborts(&self) -> u64 {
        self.aborts
    }

    fn started(&self) -> NewsreelResult<&EncoderConfig> {
        self.cfg
            .as_ref()
            .ok_or_else(|| NewsreelError::encode("in-memory encoder not started"))
    }
}

impl MediaEncoder for InMemoryEncoder {
    fn supports(&mut self, profile: &EncodingProfile) -> bool {
        !self.unsupported.contains(&profile.video_codec)
    }

    fn begin(&mut self, cfg: EncoderConfig) -> NewsreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.last_idx = None;
        self.pending = IN_MEMORY_HEADER.to_vec();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        let cfg = self.started()?;
        if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
            return Err(NewsreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(NewsreelError::encode("out-of-order frame index"));
        }
        if let Some(at) = self.fail_at_frame
            && idx.0 >= at
        {
            return Err(NewsreelError::encode(format!(
                "injected encoder failure at frame {}",
                idx.0
            )));
        }
        self.last_idx = Some(idx);

        let mut first = [0u8; 4];
        if let Some(px) = frame.data.get(..4) {
            first.copy_from_slice(px);
        }
        self.frames.push((idx, first));
        self.pending.extend_from_slice(&idx.0.to_le_bytes());
        Ok(())
    }

    fn poll_chunks(&mut self) -> NewsreelResult<Vec<Vec<u8>>> {
        self.started()?;
        self.polls += 1;
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![std::mem::take(&mut self.pending)])
    }

    fn finish(&mut self) -> NewsreelResult<Vec<Vec<u8>>> {
        self.started()?;
        if self.fail_on_finish {
            return Err(NewsreelError::encode("injected encoder failure on finish"));
        }
        self.cfg = None;
        let mut tail = std::mem::take(&mut self.pending);
        tail.extend_from_slice(IN_MEMORY_TRAILER);
        Ok(vec![tail])
    }

    fn abort(&mut self) {
        self.aborts += 1;
        self.cfg = None;
        self.pending.clear();
    }
}

/// Frame indices encoded in an [`InMemoryEncoder`] byte stream, or `None` if it is malformed.
pub fn decode_in_memory_stream(bytes: &[u8]) -> Option<Vec<u64>> {
    let body = bytes
        .strip_prefix(IN_MEMORY_HEADER)?
        .strip_suffix(IN_MEMORY_TRAILER)?;
    if !body.len().is_multiple_of(8) {
        return None;
    }
    Some(
        body.chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                u64::from_le_bytes(b)
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
