use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;

use crate::encode::profile::EncodingProfile;
use crate::encode::sink::{EncoderConfig, MediaEncoder};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

const STDOUT_READ_BUF: usize = 64 * 1024;

/// Encoder that spawns the system `ffmpeg`, streams raw frames to its stdin and collects the
/// `webm` it writes to stdout.
///
/// Output is drained on a background thread and handed over through `poll_chunks`, so a slow
/// caller never stalls `ffmpeg` on a full pipe.
pub struct FfmpegEncoder {
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    bg_rgba: [u8; 4],
    encoders: Option<Vec<String>>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    chunks: Option<Receiver<Vec<u8>>>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    last_idx: Option<FrameIndex>,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEncoder {
    /// Create an idle encoder flattening over opaque black.
    pub fn new() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
            encoders: None,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            chunks: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Names of the encoders the local `ffmpeg` build offers; queried once and cached.
    fn available_encoders(&mut self) -> &[String] {
        self.encoders.get_or_insert_with(|| {
            let listing = Command::new("ffmpeg")
                .args(["-hide_banner", "-encoders"])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output();
            match listing {
                Ok(out) if out.status.success() => {
                    parse_encoder_list(&String::from_utf8_lossy(&out.stdout))
                }
                Ok(out) => {
                    tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
                    Vec::new()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ffmpeg not available");
                    Vec::new()
                }
            }
        })
    }

    fn teardown(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
        self.chunks = None;
        self.cfg = None;
    }
}

impl MediaEncoder for FfmpegEncoder {
    fn supports(&mut self, profile: &EncodingProfile) -> bool {
        let encoders = self.available_encoders();
        [profile.ffmpeg_video_encoder, profile.ffmpeg_audio_encoder]
            .iter()
            .all(|name| encoders.iter().any(|e| e == name))
    }

    #[tracing::instrument(skip(self, cfg), fields(profile = cfg.profile.mime))]
    fn begin(&mut self, cfg: EncoderConfig) -> NewsreelResult<()> {
        if self.child.is_some() {
            return Err(NewsreelError::encode("ffmpeg encoder is already running"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(NewsreelError::validation("fps must be non-zero"));
        }
        let (width, height) = (cfg.canvas.width, cfg.canvas.height);
        if width == 0 || height == 0 {
            return Err(NewsreelError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(NewsreelError::validation(
                "ffmpeg encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(NewsreelError::capability(
                "ffmpeg is required for webm encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw premultiplied RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{width}x{height}"),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(NewsreelError::validation(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args([
                "-c:a",
                cfg.profile.ffmpeg_audio_encoder,
                "-b:a",
                &cfg.audio_bits_per_second.to_string(),
                "-shortest",
            ]);
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v",
            cfg.profile.ffmpeg_video_encoder,
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &cfg.video_bits_per_second.to_string(),
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            cfg.profile.container,
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            NewsreelError::capability(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| NewsreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| NewsreelError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| NewsreelError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = std::sync::mpsc::channel::<Vec<u8>>();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_READ_BUF];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if tx.send(buf[..n].to_vec()).is_err() {
                    // Receiver gone: the session was aborted.
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            video = cfg.profile.ffmpeg_video_encoder,
            audio = cfg.audio.is_some(),
            "ffmpeg started"
        );
        self.scratch = vec![0u8; (width as usize) * (height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.chunks = Some(rx);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| NewsreelError::encode("ffmpeg encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(NewsreelError::encode(
                "ffmpeg encoder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
            return Err(NewsreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(NewsreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(NewsreelError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            NewsreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn poll_chunks(&mut self) -> NewsreelResult<Vec<Vec<u8>>> {
        let rx = self
            .chunks
            .as_ref()
            .ok_or_else(|| NewsreelError::encode("ffmpeg encoder not started"))?;
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(chunk) => out.push(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // stdout closed before finish: ffmpeg is gone.
                    let status = self
                        .child
                        .as_mut()
                        .and_then(|c| c.wait().ok())
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    return Err(NewsreelError::encode(format!(
                        "ffmpeg stopped producing output mid-session (status {status})"
                    )));
                }
            }
        }
        Ok(out)
    }

    fn finish(&mut self) -> NewsreelResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| NewsreelError::encode("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            NewsreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| NewsreelError::encode("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| NewsreelError::encode(format!("ffmpeg stdout read failed: {e}")))?;
        }
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| NewsreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| NewsreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            self.chunks = None;
            self.cfg = None;
            return Err(NewsreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let rest = self
            .chunks
            .take()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        self.cfg = None;
        Ok(rest)
    }

    fn abort(&mut self) {
        tracing::debug!("aborting ffmpeg");
        self.teardown();
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.teardown();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Encoder names from `ffmpeg -encoders` output (`" V....D libvpx-vp9   libvpx VP9"`).
fn parse_encoder_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip_while(|l| !l.trim_start().starts_with("------"))
        .skip(1)
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6).then(|| name.to_string())
        })
        .collect()
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> NewsreelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(NewsreelError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
