use crate::foundation::error::{NewsreelError, NewsreelResult};

/// One container/codec combination an encoder may support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EncodingProfile {
    /// Full MIME type including codecs parameter.
    pub mime: &'static str,
    /// Container name.
    pub container: &'static str,
    /// Video codec name.
    pub video_codec: &'static str,
    /// Audio codec name.
    pub audio_codec: &'static str,
    /// `ffmpeg` encoder used for the video track.
    pub ffmpeg_video_encoder: &'static str,
    /// `ffmpeg` encoder used for the audio track.
    pub ffmpeg_audio_encoder: &'static str,
}

impl EncodingProfile {
    /// MIME type without codec parameters (`video/webm`).
    pub fn base_mime(&self) -> &'static str {
        self.mime.split(';').next().unwrap_or(self.mime)
    }
}

/// VP9 video with Opus audio in webm.
pub const VP9_OPUS: EncodingProfile = EncodingProfile {
    mime: "video/webm;codecs=vp9,opus",
    container: "webm",
    video_codec: "vp9",
    audio_codec: "opus",
    ffmpeg_video_encoder: "libvpx-vp9",
    ffmpeg_audio_encoder: "libopus",
};

/// VP8 video with Opus audio in webm.
pub const VP8_OPUS: EncodingProfile = EncodingProfile {
    mime: "video/webm;codecs=vp8,opus",
    container: "webm",
    video_codec: "vp8",
    audio_codec: "opus",
    ffmpeg_video_encoder: "libvpx",
    ffmpeg_audio_encoder: "libopus",
};

/// Preference order: most modern first.
pub const PROFILES: &[EncodingProfile] = &[VP9_OPUS, VP8_OPUS];

/// First profile in `profiles` accepted by `supports`.
///
/// Returns a `Capability` error when none is supported.
pub fn negotiate(
    profiles: &[EncodingProfile],
    mut supports: impl FnMut(&EncodingProfile) -> bool,
) -> NewsreelResult<EncodingProfile> {
    profiles
        .iter()
        .find(|&p| supports(p))
        .copied()
        .ok_or_else(|| {
            let tried: Vec<&str> = profiles.iter().map(|p| p.mime).collect();
            NewsreelError::capability(format!(
                "no supported encoding profile (tried: {})",
                tried.join(", ")
            ))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/profile.rs"]
mod tests;
