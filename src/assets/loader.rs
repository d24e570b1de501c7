use std::collections::HashMap;
use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::assets::decode::{PreparedImage, decode_image, ensure_drawable};
use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Largest thumbnail body accepted from the network or disk.
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Fetches and decodes an image referenced by a slide.
pub trait ImageLoader {
    /// Load `url`, returning the decoded image or an error describing why it is unavailable.
    fn load(&mut self, url: &str) -> NewsreelResult<PreparedImage>;
}

/// Loader for `http(s)` URLs (bounded by a timeout), `file://` URLs and plain paths.
pub struct HttpImageLoader {
    agent: ureq::Agent,
}

impl HttpImageLoader {
    /// Create a loader whose network requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("newsreel/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    fn fetch(&self, url: &str) -> NewsreelResult<Vec<u8>> {
        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| NewsreelError::render(format!("fetch image '{url}': {e}")))?;
        let mut bytes = Vec::new();
        resp.into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)
            .with_context(|| format!("read image body from '{url}'"))?;
        Ok(bytes)
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&mut self, url: &str) -> NewsreelResult<PreparedImage> {
        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url)?
        } else if url.starts_with("file://") {
            let path = url::Url::parse(url)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| NewsreelError::validation(format!("bad file url '{url}'")))?;
            read_limited(&path)?
        } else if url.contains("://") {
            return Err(NewsreelError::validation(format!(
                "unsupported image url scheme: '{url}'"
            )));
        } else {
            read_limited(Path::new(url))?
        };
        decode_image(&bytes)
    }
}

fn read_limited(path: &Path) -> NewsreelResult<Vec<u8>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    let mut bytes = Vec::new();
    file.take(MAX_IMAGE_BYTES)
        .read_to_end(&mut bytes)
        .with_context(|| format!("read image '{}'", path.display()))?;
    Ok(bytes)
}

/// Per-session memo in front of an [`ImageLoader`].
///
/// Each URL is attempted once; both the image and a failure are remembered, so a slide that is
/// redrawn every tick never re-fetches and a dead URL cannot stall later frames.
pub struct CachedImageLoader<L> {
    inner: L,
    entries: HashMap<String, Option<PreparedImage>>,
    attempts: u64,
}

impl<L: ImageLoader> CachedImageLoader<L> {
    /// Wrap `inner`.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            entries: HashMap::new(),
            attempts: 0,
        }
    }

    /// Image for `url`, or `None` when it could not be loaded.
    pub fn get(&mut self, url: &str) -> Option<PreparedImage> {
        if let Some(entry) = self.entries.get(url) {
            return entry.clone();
        }
        self.attempts += 1;
        let loaded = self
            .inner
            .load(url)
            .and_then(|img| ensure_drawable(&img).map(|()| img));
        let entry = match loaded {
            Ok(img) => {
                tracing::debug!(url, width = img.width, height = img.height, "image loaded");
                Some(img)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "image unavailable, drawing slide without it");
                None
            }
        };
        self.entries.insert(url.to_string(), entry.clone());
        entry
    }

    /// Forget everything; the next `get` per URL hits the inner loader again.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of loads forwarded to the inner loader.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
