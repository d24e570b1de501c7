use crate::article::item::NewsItem;
use crate::assets::loader::{CachedImageLoader, ImageLoader};
use crate::deck::slide::Slide;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::NewsreelResult;
use crate::render::surface::{FontWeight, Surface, TextStyle};
use crate::text::wrap::draw_wrapped;

pub(crate) const BG_TOP_LEFT: Rgba8 = Rgba8::hex(0x0b1220);
pub(crate) const BG_BOTTOM_RIGHT: Rgba8 = Rgba8::hex(0x0e1729);
pub(crate) const TEXT: Rgba8 = Rgba8::hex(0xeef2ff);
pub(crate) const ACCENT: Rgba8 = Rgba8::hex(0x93c5fd);
pub(crate) const BADGE_FILL: Rgba8 = Rgba8::hex(0x1f2a44);
const GRID_RGB: Rgba8 = Rgba8::hex(0x6366f1);
const GRID_ALPHA: f32 = 0.18;

/// Horizontal spacing of the drifting grid.
pub const GRID_SPACING_PX: f64 = 80.0;
const GRID_LINE_WIDTH_PX: f64 = 1.0;

/// Article fields that slides show besides their own text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideContext {
    /// Publisher label for the title caption.
    pub source: String,
    /// Display date for the title caption.
    pub date_label: String,
    /// Raw article URL, shown on the outro only.
    pub link: String,
    /// Corner badge text.
    pub badge_label: String,
}

impl SlideContext {
    /// Context for `item` with the given badge text.
    pub fn for_item(item: &NewsItem, badge_label: impl Into<String>) -> Self {
        Self {
            source: item.source.clone(),
            date_label: item.date_label(),
            link: item.link.clone(),
            badge_label: badge_label.into(),
        }
    }
}

/// Paints complete frames for slides.
///
/// Output depends only on the slide and the animation time, except that an image slide may be
/// drawn without its image when the image cannot be loaded.
pub struct FrameRenderer<L> {
    ctx: SlideContext,
    images: CachedImageLoader<L>,
}

impl<L: ImageLoader> FrameRenderer<L> {
    /// Create a renderer for one article.
    pub fn new(ctx: SlideContext, loader: L) -> Self {
        Self {
            ctx,
            images: CachedImageLoader::new(loader),
        }
    }

    /// Article context used for captions.
    pub fn context(&self) -> &SlideContext {
        &self.ctx
    }

    /// Switch to another article and drop cached images so they load afresh.
    pub fn begin_article(&mut self, ctx: SlideContext) {
        self.ctx = ctx;
        self.images.clear();
    }

    /// Image loads attempted since construction.
    pub fn image_attempts(&self) -> u64 {
        self.images.attempts()
    }

    /// Paint one complete frame of `slide` at `animation_time_ms`.
    ///
    /// `animation_time_ms` only shifts the background grid.
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        slide: &Slide,
        animation_time_ms: f64,
    ) -> NewsreelResult<()> {
        let canvas = surface.canvas();
        let (w, h) = (canvas.w(), canvas.h());

        surface.begin_frame();
        surface.fill_linear_gradient(
            Point::ORIGIN,
            Point::new(w, h),
            [BG_TOP_LEFT, BG_BOTTOM_RIGHT],
        )?;
        draw_grid(surface, animation_time_ms)?;

        let headline = TextStyle::new(52.0, FontWeight::Bold, TEXT);
        let caption = TextStyle::new(24.0, FontWeight::SemiBold, ACCENT);
        match slide {
            Slide::Title { text } => {
                draw_wrapped(surface, text, Point::new(60.0, 80.0), w - 120.0, 60.0, &headline)?;
                let line = format!("{} · {}", self.ctx.source, self.ctx.date_label);
                surface.draw_text(&line, Point::new(60.0, 60.0), &caption)?;
            }
            Slide::Bullet { text } => {
                let style = TextStyle::new(40.0, FontWeight::Bold, TEXT);
                draw_wrapped(surface, text, Point::new(80.0, 160.0), w - 160.0, 56.0, &style)?;
            }
            Slide::Outro { text } => {
                let heading = TextStyle::new(46.0, FontWeight::Bold, TEXT);
                surface.draw_text("Learn more", Point::new(60.0, 160.0), &heading)?;
                let body = TextStyle::new(36.0, FontWeight::SemiBold, TEXT);
                draw_wrapped(surface, text, Point::new(60.0, 220.0), w - 120.0, 48.0, &body)?;
                draw_wrapped(
                    surface,
                    &self.ctx.link,
                    Point::new(60.0, 300.0),
                    w - 120.0,
                    36.0,
                    &caption,
                )?;
            }
            Slide::Image { url } => {
                if let Some(img) = self.images.get(url)
                    && let Err(e) =
                        surface.draw_image(&img, image_rect(w, h, img.width, img.height))
                {
                    tracing::warn!(url, error = %e, "image not drawable, drawing slide without it");
                }
            }
        }

        draw_badge(surface, &self.ctx.badge_label)?;
        surface.end_frame()
    }
}

/// Vertical grid lines every [`GRID_SPACING_PX`], shifted right by `t mod spacing`.
fn draw_grid<S: Surface + ?Sized>(surface: &mut S, animation_time_ms: f64) -> NewsreelResult<()> {
    let canvas = surface.canvas();
    let offset = grid_offset(animation_time_ms);
    let color = GRID_RGB.with_alpha(GRID_ALPHA);
    let mut x = 0.0;
    while x < canvas.w() {
        let lx = x + offset;
        surface.fill_rect(
            Rect::new(
                lx - GRID_LINE_WIDTH_PX / 2.0,
                0.0,
                lx + GRID_LINE_WIDTH_PX / 2.0,
                canvas.h(),
            ),
            color,
        )?;
        x += GRID_SPACING_PX;
    }
    Ok(())
}

fn draw_badge<S: Surface + ?Sized>(surface: &mut S, label: &str) -> NewsreelResult<()> {
    let w = surface.canvas().w();
    surface.fill_rect(Rect::new(w - 200.0, 40.0, w - 60.0, 80.0), BADGE_FILL)?;
    let style = TextStyle::new(18.0, FontWeight::Bold, ACCENT);
    surface.draw_text(label, Point::new(w - 190.0, 50.0), &style)
}

/// Grid drift in pixels for an animation time.
pub fn grid_offset(animation_time_ms: f64) -> f64 {
    animation_time_ms.rem_euclid(GRID_SPACING_PX)
}

/// Destination for an image: 100px side insets, aspect preserved, vertically centered.
pub fn image_rect(w: f64, h: f64, img_w: u32, img_h: u32) -> Rect {
    let target_w = w - 200.0;
    let scale = target_w / f64::from(img_w);
    let target_h = f64::from(img_h) * scale;
    let y = (h - target_h) / 2.0;
    Rect::new(100.0, y, 100.0 + target_w, y + target_h)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
