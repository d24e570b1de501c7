#![allow(dead_code)]

use newsreel::assets::decode::PreparedImage;
use newsreel::{
    Canvas, ImageLoader, InMemoryEncoder, NewsItem, NewsreelError, NewsreelResult,
    RecordingController, RecordingSurface, SessionSettings,
};

pub const CANVAS: Canvas = Canvas {
    width: 128,
    height: 72,
};

/// Loader that serves a small solid image for every URL, or fails every URL.
pub struct StubImages {
    pub available: bool,
}

impl ImageLoader for StubImages {
    fn load(&mut self, url: &str) -> NewsreelResult<PreparedImage> {
        if self.available {
            Ok(PreparedImage::from_premul(4, 2, vec![255; 4 * 2 * 4]))
        } else {
            Err(NewsreelError::render(format!("unreachable: {url}")))
        }
    }
}

pub type TestController = RecordingController<RecordingSurface, InMemoryEncoder, StubImages>;

pub fn controller(encoder: InMemoryEncoder) -> TestController {
    let settings = SessionSettings {
        sample_rate: 8_000,
        channels: 1,
        ..SessionSettings::default()
    };
    RecordingController::new(
        RecordingSurface::new(CANVAS),
        encoder,
        StubImages { available: false },
        settings,
    )
}

/// Scenario A article: four summary sentences, no image.
pub fn openai_item() -> NewsItem {
    NewsItem {
        title: "OpenAI launches X".to_string(),
        link: "https://example.com/a".to_string(),
        source: "TechCrunch AI".to_string(),
        date: "2025-03-07T10:00:00Z".to_string(),
        summary: Some(
            "OpenAI launched X today. It does Y. Users say Z. Pricing starts at $10.".to_string(),
        ),
        image: None,
    }
}

/// Scenario B article: scenario A plus a thumbnail.
pub fn openai_item_with_image() -> NewsItem {
    NewsItem {
        image: Some("https://img.example/x.png".to_string()),
        ..openai_item()
    }
}
