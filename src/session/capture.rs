use crate::encode::sink::MediaEncoder;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::NewsreelResult;
use crate::render::surface::FrameRGBA;

/// Samples a surface at a fixed frame rate and feeds the samples to an encoder.
///
/// Frame slot `k` covers session time `k / fps`. After each tick every slot that has started is
/// filled with the surface's current frame: a slow tick fills several slots with the same frame,
/// a fast one may fill none. The stream never emits more than `ceil(total * fps)` frames, and
/// [`CaptureStream::finish`] pads up to exactly that many.
#[derive(Debug)]
pub struct CaptureStream {
    fps: Fps,
    total_frames: u64,
    emitted: u64,
}

impl CaptureStream {
    /// Capture for a session of `total_duration_secs`.
    pub fn new(fps: Fps, total_duration_secs: f64) -> Self {
        Self {
            fps,
            total_frames: fps.secs_to_frames_ceil(total_duration_secs),
            emitted: 0,
        }
    }

    /// Frames the finished stream will contain.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frames emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Emit `frame` into every slot started by `now_secs`. Returns the number of frames emitted.
    pub fn sample<E: MediaEncoder + ?Sized>(
        &mut self,
        now_secs: f64,
        frame: &FrameRGBA,
        encoder: &mut E,
    ) -> NewsreelResult<u64> {
        let started = (now_secs.max(0.0) * self.fps.as_f64() + 1e-9).floor() as u64 + 1;
        self.emit_until(started.min(self.total_frames), frame, encoder)
    }

    /// Pad the stream to its full length with `frame`.
    pub fn finish<E: MediaEncoder + ?Sized>(
        &mut self,
        frame: &FrameRGBA,
        encoder: &mut E,
    ) -> NewsreelResult<u64> {
        self.emit_until(self.total_frames, frame, encoder)
    }

    fn emit_until<E: MediaEncoder + ?Sized>(
        &mut self,
        target: u64,
        frame: &FrameRGBA,
        encoder: &mut E,
    ) -> NewsreelResult<u64> {
        let start = self.emitted;
        while self.emitted < target {
            encoder.push_frame(FrameIndex(self.emitted), frame)?;
            self.emitted += 1;
        }
        Ok(self.emitted - start)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/capture.rs"]
mod tests;
