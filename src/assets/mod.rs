//! Thumbnail loading and decoding.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// URL/path image loaders with per-session caching.
pub mod loader;
