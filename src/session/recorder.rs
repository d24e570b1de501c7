use std::time::Duration;

use crate::article::item::NewsItem;
use crate::assets::loader::ImageLoader;
use crate::audio::ambient::AmbientSynth;
use crate::config::VideoConfig;
use crate::deck::slide::{Deck, DeckMemo};
use crate::encode::profile::{EncodingProfile, PROFILES, negotiate};
use crate::encode::sink::{AudioInputConfig, EncoderConfig, MediaEncoder};
use crate::foundation::core::Fps;
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::frame::{FrameRenderer, SlideContext};
use crate::render::surface::Surface;
use crate::session::capture::CaptureStream;
use crate::session::clock::FrameScheduler;

/// Consecutive zero-length frames after which [`RecordingController::run`] gives up.
const MAX_STALLED_FRAMES: u32 = 10_000;

/// Identifier minted for each `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Encoded video produced by a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Session that produced it.
    pub session: SessionId,
    /// Profile it was encoded with.
    pub profile: EncodingProfile,
    /// MIME type including codecs.
    pub mime: String,
    /// Suggested download filename.
    pub file_name: String,
    /// Complete file contents.
    pub bytes: Vec<u8>,
}

/// Recording lifecycle. `Finished` and `Failed` stay until the next `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No session has run yet.
    Idle,
    /// A session is capturing.
    Recording,
    /// The last session produced an artifact.
    Finished(Artifact),
    /// The last session failed with this message.
    Failed(String),
}

impl SessionState {
    /// `true` while a session is capturing.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Artifact of a finished session.
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Finished(a) => Some(a),
            _ => None,
        }
    }

    /// Error message of a failed session.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Why `start` refused to open a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// Another session is still recording.
    #[error("a recording session is already in progress")]
    Busy,
}

/// Per-controller encoding and audio parameters.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// How often encoder output is collected.
    pub chunk_interval: Duration,
    /// Target video bitrate.
    pub video_bits_per_second: u32,
    /// Target audio bitrate.
    pub audio_bits_per_second: u32,
    /// Ambient bed sample rate.
    pub sample_rate: u32,
    /// Ambient bed channels.
    pub channels: u16,
    /// Artifact filename.
    pub file_name: String,
    /// Corner badge text used by [`RecordingController::start_article`].
    pub badge_label: String,
    /// Encoding profiles in preference order.
    pub profiles: Vec<EncodingProfile>,
}

impl SessionSettings {
    /// Settings taken from a video configuration.
    pub fn from_config(cfg: &VideoConfig) -> Self {
        Self {
            chunk_interval: cfg.chunk_interval(),
            video_bits_per_second: cfg.video_bits_per_second,
            audio_bits_per_second: cfg.audio_bits_per_second,
            sample_rate: cfg.sample_rate,
            channels: cfg.channels,
            file_name: cfg.file_name.clone(),
            badge_label: cfg.badge_label.clone(),
            profiles: PROFILES.to_vec(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&VideoConfig::default())
    }
}

/// Counters owned by one session. A new `start` builds a fresh one.
struct ActiveSession {
    id: SessionId,
    deck: Deck,
    total_secs: f64,
    profile: EncodingProfile,
    synth: AmbientSynth,
    capture: CaptureStream,
    chunks: Vec<Vec<u8>>,
    last_now: Duration,
    last_poll: Duration,
    elapsed: f64,
    slide_index: usize,
    slide_elapsed: f64,
}

enum Step {
    Continue,
    Done,
}

type ProgressObserver = Box<dyn FnMut(SessionId, u8)>;

/// Drives one recording at a time: renders slides on the surface, captures frames into the
/// encoder alongside the ambient audio bed, and assembles the artifact.
///
/// Failures never escape `start`; they end the session in [`SessionState::Failed`]. Audio
/// resources are released exactly once per session on every exit path.
pub struct RecordingController<S, E, L> {
    surface: S,
    encoder: E,
    renderer: FrameRenderer<L>,
    decks: DeckMemo,
    settings: SessionSettings,
    state: SessionState,
    progress: u8,
    active: Option<ActiveSession>,
    sessions_started: u64,
    audio_releases: u32,
    observer: Option<ProgressObserver>,
}

impl<S: Surface, E: MediaEncoder, L: ImageLoader> RecordingController<S, E, L> {
    /// Controller owning `surface`, `encoder` and the image loader for its sessions.
    pub fn new(surface: S, encoder: E, loader: L, settings: SessionSettings) -> Self {
        Self {
            surface,
            encoder,
            renderer: FrameRenderer::new(SlideContext::default(), loader),
            decks: DeckMemo::new(),
            settings,
            state: SessionState::Idle,
            progress: 0,
            active: None,
            sessions_started: 0,
            audio_releases: 0,
            observer: None,
        }
    }

    /// Call `observer(session, percent)` whenever progress changes.
    pub fn set_progress_observer(&mut self, observer: impl FnMut(SessionId, u8) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Progress of the current or last session in percent.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Total audio-resource releases across all sessions.
    pub fn audio_releases(&self) -> u32 {
        self.audio_releases
    }

    /// Chunks collected by the running session.
    pub fn chunks_in_flight(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.chunks.len())
    }

    /// Decks built by [`RecordingController::start_article`] so far.
    pub fn decks_built(&self) -> u64 {
        self.decks.builds()
    }

    /// Index of the slide the running session is showing.
    pub fn current_slide(&self) -> Option<usize> {
        self.active.as_ref().map(|s| s.slide_index)
    }

    /// Seconds elapsed in the running session.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.active.as_ref().map(|s| s.elapsed)
    }

    /// Start a session for `item` and record its deck at `fps`.
    ///
    /// The deck is rebuilt only when `item` differs from the previous article.
    pub fn start_article(&mut self, item: &NewsItem, fps: Fps) -> Result<SessionId, StartError> {
        if self.state.is_recording() {
            return Err(StartError::Busy);
        }
        match self.decks.deck_for(item) {
            Ok(deck) => {
                let ctx = SlideContext::for_item(item, self.settings.badge_label.clone());
                let total = deck.total_duration_secs();
                self.start(&deck, ctx, total, fps)
            }
            Err(e) => {
                let id = self.mint_session();
                self.progress = 0;
                self.state = SessionState::Failed(e.to_string());
                tracing::warn!(session = %id, error = %e, "article rejected");
                Ok(id)
            }
        }
    }

    /// Open a recording session for `deck`.
    ///
    /// Returns [`StartError::Busy`] while another session is recording. Every other problem
    /// (no supported encoding profile, encoder or audio failure) is reported by moving to
    /// [`SessionState::Failed`].
    #[tracing::instrument(skip(self, deck, context), fields(slides = deck.len()))]
    pub fn start(
        &mut self,
        deck: &Deck,
        context: SlideContext,
        total_duration_secs: f64,
        fps: Fps,
    ) -> Result<SessionId, StartError> {
        if self.state.is_recording() {
            return Err(StartError::Busy);
        }
        let id = self.mint_session();
        self.progress = 0;

        match self.open(id, deck, context, total_duration_secs, fps) {
            Ok(session) => {
                tracing::info!(session = %id, profile = session.profile.mime, "recording started");
                self.active = Some(session);
                self.state = SessionState::Recording;
                self.notify(id);
            }
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "recording could not start");
                self.state = SessionState::Failed(e.to_string());
            }
        }
        Ok(id)
    }

    fn mint_session(&mut self) -> SessionId {
        self.sessions_started += 1;
        SessionId(self.sessions_started)
    }

    fn open(
        &mut self,
        id: SessionId,
        deck: &Deck,
        context: SlideContext,
        total_secs: f64,
        fps: Fps,
    ) -> NewsreelResult<ActiveSession> {
        if !total_secs.is_finite() || total_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "total duration must be finite and > 0",
            ));
        }
        if deck.is_empty() {
            return Err(NewsreelError::validation("deck has no slides"));
        }

        let encoder = &mut self.encoder;
        let profile = negotiate(&self.settings.profiles, |p| encoder.supports(p))?;

        self.renderer.begin_article(context);

        let mut synth = AmbientSynth::new(self.settings.sample_rate, self.settings.channels);
        let stream = synth.start(total_secs)?;

        let cfg = EncoderConfig {
            canvas: self.surface.canvas(),
            fps,
            profile,
            video_bits_per_second: self.settings.video_bits_per_second,
            audio_bits_per_second: self.settings.audio_bits_per_second,
            audio: Some(AudioInputConfig::from(&stream)),
        };
        if let Err(e) = self.encoder.begin(cfg) {
            self.audio_releases += u32::from(synth.stop());
            return Err(e);
        }

        Ok(ActiveSession {
            id,
            deck: deck.clone(),
            total_secs,
            profile,
            synth,
            capture: CaptureStream::new(fps, total_secs),
            chunks: Vec::new(),
            last_now: Duration::ZERO,
            last_poll: Duration::ZERO,
            elapsed: 0.0,
            slide_index: 0,
            slide_elapsed: 0.0,
        })
    }

    /// Advance the running session to session time `now`.
    ///
    /// No-op unless recording. Times earlier than the previous tick count as no elapsed time.
    pub fn tick(&mut self, now: Duration) -> &SessionState {
        let Some(mut session) = self.active.take() else {
            return &self.state;
        };
        match self.step(&mut session, now) {
            Ok(Step::Continue) => self.active = Some(session),
            Ok(Step::Done) => self.finalize(session),
            Err(e) => self.fail(session, e),
        }
        &self.state
    }

    fn step(&mut self, session: &mut ActiveSession, now: Duration) -> NewsreelResult<Step> {
        let now = now.max(session.last_now);
        let dt = (now - session.last_now).as_secs_f64();
        session.last_now = now;
        session.elapsed += dt;
        session.slide_elapsed += dt;

        if let Some(slide) = session.deck.get(session.slide_index) {
            self.renderer
                .render(&mut self.surface, slide, session.elapsed * 60.0)?;
            if session.slide_elapsed >= slide.duration_secs() {
                session.slide_index += 1;
                session.slide_elapsed = 0.0;
                tracing::debug!(
                    session = %session.id,
                    slide = session.slide_index,
                    elapsed = session.elapsed,
                    "slide advanced"
                );
            }
        }

        session
            .capture
            .sample(session.elapsed, self.surface.current_frame(), &mut self.encoder)?;

        if now.saturating_sub(session.last_poll) >= self.settings.chunk_interval {
            let chunks = self.encoder.poll_chunks()?;
            tracing::debug!(session = %session.id, chunks = chunks.len(), "encoder data available");
            session.chunks.extend(chunks.into_iter().filter(|c| !c.is_empty()));
            session.last_poll = now;
        }

        // 100 is reserved for Finished.
        let pct = progress_percent(session.elapsed, session.total_secs).min(99);
        if pct > self.progress {
            self.progress = pct;
            self.notify(session.id);
        }

        Ok(if session.elapsed >= session.total_secs {
            Step::Done
        } else {
            Step::Continue
        })
    }

    #[tracing::instrument(skip_all, fields(session = %session.id))]
    fn finalize(&mut self, mut session: ActiveSession) {
        let tail = session
            .capture
            .finish(self.surface.current_frame(), &mut self.encoder)
            .and_then(|_| self.encoder.finish());
        let tail = match tail {
            Ok(tail) => tail,
            Err(e) => return self.fail(session, e),
        };
        session.chunks.extend(tail.into_iter().filter(|c| !c.is_empty()));

        self.audio_releases += u32::from(session.synth.stop());

        let bytes = session.chunks.concat();
        tracing::info!(
            frames = session.capture.emitted(),
            chunks = session.chunks.len(),
            bytes = bytes.len(),
            "recording finished"
        );
        self.state = SessionState::Finished(Artifact {
            session: session.id,
            profile: session.profile,
            mime: session.profile.mime.to_string(),
            file_name: self.settings.file_name.clone(),
            bytes,
        });
        self.progress = 100;
        self.notify(session.id);
    }

    fn fail(&mut self, mut session: ActiveSession, err: NewsreelError) {
        self.encoder.abort();
        self.audio_releases += u32::from(session.synth.stop());
        tracing::warn!(
            session = %session.id,
            elapsed = session.elapsed,
            discarded_chunks = session.chunks.len(),
            error = %err,
            "recording failed"
        );
        self.state = SessionState::Failed(err.to_string());
    }

    fn notify(&mut self, id: SessionId) {
        let pct = self.progress;
        if let Some(observer) = self.observer.as_mut() {
            observer(id, pct);
        }
    }

    /// Tick the running session from `scheduler` until it finishes or fails.
    pub fn run<C: FrameScheduler + ?Sized>(&mut self, scheduler: &mut C) -> &SessionState {
        scheduler.restart();
        let mut stalled = 0u32;
        let mut last = Duration::ZERO;
        while self.state.is_recording() {
            let now = scheduler.next_frame();
            if now <= last {
                stalled += 1;
                if stalled >= MAX_STALLED_FRAMES {
                    if let Some(session) = self.active.take() {
                        self.fail(session, NewsreelError::render("frame scheduler stalled"));
                    }
                    break;
                }
            } else {
                stalled = 0;
                last = now;
            }
            self.tick(now);
        }
        &self.state
    }
}

/// `floor(100 * elapsed / total)` clamped to `0..=100`.
pub fn progress_percent(elapsed_secs: f64, total_secs: f64) -> u8 {
    if total_secs <= 0.0 {
        return 100;
    }
    ((elapsed_secs / total_secs) * 100.0).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/session/recorder.rs"]
mod tests;
