use std::sync::Arc;

use crate::article::item::NewsItem;
use crate::deck::summarize::{DEFAULT_MAX_FRAGMENTS, summarize};
use crate::foundation::error::NewsreelResult;

/// One typed, timed unit of visual content.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Slide {
    /// Article headline.
    Title {
        /// Headline text.
        text: String,
    },
    /// Article thumbnail.
    Image {
        /// Image URL or local path.
        url: String,
    },
    /// One summary sentence.
    Bullet {
        /// Sentence text.
        text: String,
    },
    /// Closing call to action.
    Outro {
        /// `"{source} · {domain}"`.
        text: String,
    },
}

/// Discriminant of [`Slide`], used for the duration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    /// [`Slide::Title`]
    Title,
    /// [`Slide::Image`]
    Image,
    /// [`Slide::Bullet`]
    Bullet,
    /// [`Slide::Outro`]
    Outro,
}

impl SlideKind {
    /// Fixed on-screen duration in seconds.
    pub const fn duration_secs(self) -> f64 {
        match self {
            SlideKind::Title => 3.0,
            SlideKind::Image => 3.0,
            SlideKind::Bullet => 3.0,
            SlideKind::Outro => 2.5,
        }
    }
}

impl Slide {
    /// Kind of this slide.
    pub fn kind(&self) -> SlideKind {
        match self {
            Slide::Title { .. } => SlideKind::Title,
            Slide::Image { .. } => SlideKind::Image,
            Slide::Bullet { .. } => SlideKind::Bullet,
            Slide::Outro { .. } => SlideKind::Outro,
        }
    }

    /// Fixed on-screen duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.kind().duration_secs()
    }
}

/// Ordered, finite, immutable sequence of slides for one article.
///
/// Cloning is cheap; the slides are shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    slides: Arc<[Slide]>,
}

impl Deck {
    /// Wrap an explicit slide list.
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        Self {
            slides: slides.into(),
        }
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slide at `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<&Slide> {
        self.slides.get(idx)
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Return `true` when the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Sum of slide durations in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.slides.iter().map(Slide::duration_secs).sum()
    }
}

/// Build the deck for `item`.
///
/// Order: title, image (when the item has one), up to four bullets, outro.
#[tracing::instrument(skip(item), fields(link = %item.link))]
pub fn build_deck(item: &NewsItem) -> NewsreelResult<Deck> {
    let domain = item.display_domain()?;

    let mut slides = vec![Slide::Title {
        text: item.title.clone(),
    }];
    if let Some(url) = &item.image {
        slides.push(Slide::Image { url: url.clone() });
    }
    slides.extend(
        summarize(item.summary_source(), DEFAULT_MAX_FRAGMENTS)
            .into_iter()
            .map(|text| Slide::Bullet { text }),
    );
    slides.push(Slide::Outro {
        text: format!("{} · {}", item.source, domain),
    });

    tracing::debug!(slides = slides.len(), "built deck");
    Ok(Deck::from_slides(slides))
}

/// Deck cache keyed by the article it was built from.
///
/// Rebuilds only when a different article is presented.
#[derive(Debug, Default)]
pub struct DeckMemo {
    cached: Option<(NewsItem, Deck)>,
    builds: u64,
}

impl DeckMemo {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the deck for `item`, building it on first use or when the article changed.
    pub fn deck_for(&mut self, item: &NewsItem) -> NewsreelResult<Deck> {
        if let Some((cached_item, deck)) = &self.cached
            && cached_item == item
        {
            return Ok(deck.clone());
        }
        let deck = build_deck(item)?;
        self.builds += 1;
        self.cached = Some((item.clone(), deck.clone()));
        Ok(deck)
    }

    /// Decks built so far; cache hits do not count.
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
#[path = "../../tests/unit/deck/slide.rs"]
mod tests;
