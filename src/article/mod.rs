//! Article records and the feed listing that supplies them.

/// Feed listing normalization, search and loading.
pub mod feed;
/// The `NewsItem` record.
pub mod item;
