use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Bass tone pitch (A3).
pub const BASS_HZ: f64 = 220.0;
/// Harmony tone pitch (E4, a fifth above the bass).
pub const HARMONY_HZ: f64 = 329.63;
/// Wobble rate applied to the bass gain.
pub const LFO_HZ: f64 = 0.2;
/// Resting bass gain.
pub const BASS_GAIN: f64 = 0.02;
/// Harmony gain.
pub const HARMONY_GAIN: f64 = 0.01;
/// Peak deviation the LFO adds to the bass gain.
pub const LFO_DEPTH: f64 = 0.006;

/// One sample of the ambient pad at `t` seconds.
///
/// `bass * (BASS_GAIN + LFO_DEPTH * lfo) + harmony * HARMONY_GAIN`, all sine oscillators.
pub fn ambient_sample(t: f64) -> f32 {
    let lfo = (TAU * LFO_HZ * t).sin();
    let bass = (TAU * BASS_HZ * t).sin() * (BASS_GAIN + LFO_DEPTH * lfo);
    let harmony = (TAU * HARMONY_HZ * t).sin() * HARMONY_GAIN;
    (bass + harmony) as f32
}

/// Capturable output of a running synthesizer: interleaved `f32le` PCM on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioStream {
    /// Path of the PCM file.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Frames (samples per channel) in the file.
    pub frames: u64,
}

/// Lifecycle of an [`AmbientSynth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthState {
    /// Never started.
    Idle,
    /// Started and holding its stream.
    Running,
    /// Stopped; resources released.
    Stopped,
}

/// Fixed oscillator graph rendered into a session-scoped audio stream.
///
/// `start` and `stop` bracket exactly one recording session. `stop` is idempotent; only the call
/// that actually releases the stream counts towards [`AmbientSynth::releases`].
#[derive(Debug)]
pub struct AmbientSynth {
    sample_rate: u32,
    channels: u16,
    state: SynthState,
    stream: Option<AudioStream>,
    releases: u32,
}

impl AmbientSynth {
    /// Create an idle synthesizer.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            state: SynthState::Idle,
            stream: None,
            releases: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SynthState {
        self.state
    }

    /// Number of times resources were released.
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Interleaved samples for `frames` frames starting at frame `start`.
    pub fn render(&self, start: u64, frames: u64) -> Vec<f32> {
        let channels = usize::from(self.channels);
        let sr = f64::from(self.sample_rate);
        let mut out = Vec::with_capacity(frames as usize * channels);
        for i in start..start + frames {
            let s = ambient_sample(i as f64 / sr);
            out.extend(std::iter::repeat_n(s, channels));
        }
        out
    }

    /// Start the graph and expose `duration_secs` of it as a stream.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, duration_secs: f64) -> NewsreelResult<AudioStream> {
        if self.state == SynthState::Running {
            return Err(NewsreelError::validation("ambient synth is already running"));
        }
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(NewsreelError::validation(
                "audio sample_rate and channels must be non-zero",
            ));
        }
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(NewsreelError::validation(
                "audio duration must be finite and >= 0",
            ));
        }

        let frames = (duration_secs * f64::from(self.sample_rate)).ceil() as u64;
        let samples = self.render(0, frames);
        let path = std::env::temp_dir().join(format!(
            "newsreel_ambient_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        write_f32le_file(&samples, &path)?;

        let stream = AudioStream {
            path,
            sample_rate: self.sample_rate,
            channels: self.channels,
            frames,
        };
        self.stream = Some(stream.clone());
        self.state = SynthState::Running;
        tracing::debug!(frames, path = %stream.path.display(), "ambient bed started");
        Ok(stream)
    }

    /// Stop the graph and release its stream. Returns `true` when something was released.
    pub fn stop(&mut self) -> bool {
        if self.state != SynthState::Running {
            return false;
        }
        if let Some(stream) = self.stream.take()
            && let Err(e) = std::fs::remove_file(&stream.path)
        {
            tracing::warn!(path = %stream.path.display(), error = %e, "failed to remove audio bed");
        }
        self.state = SynthState::Stopped;
        self.releases += 1;
        true
    }
}

impl Drop for AmbientSynth {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> NewsreelResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        NewsreelError::capability(format!(
            "failed to write audio bed '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/ambient.rs"]
mod tests;
