//! Slide decks derived from one article.

/// The `Slide` model, duration table and deck builder.
pub mod slide;
/// Sentence-fragment splitting for bullet slides.
pub mod summarize;
