//! Newsreel turns one news article into a short slideshow video with an ambient audio bed.
//!
//! The pipeline is:
//!
//! - Build a [`Deck`] of timed slides from a [`NewsItem`]
//! - Paint slides onto a [`Surface`] with the [`FrameRenderer`]
//! - Record a session with the [`RecordingController`], which paces frames, captures them into a
//!   [`MediaEncoder`] together with the [`AmbientSynth`] bed, and yields a webm [`Artifact`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Article records and feed listings.
pub mod article;
/// Thumbnail loading.
pub mod assets;
/// Ambient audio bed.
pub mod audio;
/// Video configuration.
pub mod config;
/// Slide decks.
pub mod deck;
/// Streaming encoders.
pub mod encode;
/// Drawing surfaces and frame rendering.
pub mod render;
/// Recording sessions.
pub mod session;
/// Text wrapping.
pub mod text;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8};
pub use crate::foundation::error::{NewsreelError, NewsreelResult};

pub use crate::article::feed::{FeedListing, load_listing, normalize_listing, search};
pub use crate::article::item::NewsItem;
pub use crate::assets::loader::{CachedImageLoader, HttpImageLoader, ImageLoader};
pub use crate::audio::ambient::{AmbientSynth, AudioStream};
pub use crate::config::VideoConfig;
pub use crate::deck::slide::{Deck, Slide, SlideKind, build_deck};
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::profile::{EncodingProfile, PROFILES, negotiate};
pub use crate::encode::sink::{AudioInputConfig, EncoderConfig, InMemoryEncoder, MediaEncoder};
pub use crate::render::cpu::{CpuSurface, FontSet};
pub use crate::render::frame::{FrameRenderer, SlideContext};
pub use crate::render::surface::{FrameRGBA, RecordingSurface, Surface, TextMeasure, TextStyle};
pub use crate::session::clock::{FixedStepClock, FrameScheduler, PacedClock};
pub use crate::session::recorder::{
    Artifact, RecordingController, SessionId, SessionSettings, SessionState, StartError,
};
