use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::NewsreelResult;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame of the given size.
    pub fn blank(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; (canvas.width as usize) * (canvas.height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Font weight classes available to slide text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Body text.
    Regular,
    /// Captions and secondary headings (600).
    SemiBold,
    /// Headlines and the badge (700).
    Bold,
}

/// Style for one run of text. The origin passed with it is the top-left of the line box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Weight class.
    pub weight: FontWeight,
    /// Fill color.
    pub color: Rgba8,
}

impl TextStyle {
    /// Style with the given size, weight and color.
    pub const fn new(size_px: f32, weight: FontWeight, color: Rgba8) -> Self {
        Self {
            size_px,
            weight,
            color,
        }
    }

    /// Same style in another color.
    pub const fn with_color(self, color: Rgba8) -> Self {
        Self { color, ..self }
    }
}

/// Width measurement for the active font metrics.
pub trait TextMeasure {
    /// Advance width of `text` in pixels when drawn with `style`.
    fn measure(&mut self, text: &str, style: &TextStyle) -> NewsreelResult<f32>;
}

/// Drawing target for one frame at a time.
///
/// A frame is bracketed by [`Surface::begin_frame`] and [`Surface::end_frame`]; between them,
/// later draws land on top of earlier ones. [`Surface::current_frame`] always returns the last
/// completed frame, which is what a capture samples.
pub trait Surface: TextMeasure {
    /// Surface dimensions.
    fn canvas(&self) -> Canvas;
    /// Discard pending draw commands and start a new frame.
    fn begin_frame(&mut self);
    /// Fill the whole surface with a two-stop linear gradient running `from` -> `to`.
    fn fill_linear_gradient(
        &mut self,
        from: Point,
        to: Point,
        stops: [Rgba8; 2],
    ) -> NewsreelResult<()>;
    /// Fill `rect` with a solid color (alpha respected).
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> NewsreelResult<()>;
    /// Draw one line of text with its line box top-left at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> NewsreelResult<()>;
    /// Draw `image` scaled into `dst`.
    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> NewsreelResult<()>;
    /// Rasterize pending commands into the visible frame.
    fn end_frame(&mut self) -> NewsreelResult<()>;
    /// Last completed frame.
    fn current_frame(&self) -> &FrameRGBA;
}

/// One recorded draw call of a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// [`Surface::fill_linear_gradient`]
    Gradient {
        /// Gradient start.
        from: Point,
        /// Gradient end.
        to: Point,
        /// Color stops.
        stops: [Rgba8; 2],
    },
    /// [`Surface::fill_rect`]
    Rect {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// [`Surface::draw_text`]
    Text {
        /// Line text.
        text: String,
        /// Line box top-left.
        origin: Point,
        /// Style used.
        style: TextStyle,
    },
    /// [`Surface::draw_image`]
    Image {
        /// Source size in pixels.
        size: (u32, u32),
        /// Destination rectangle.
        dst: Rect,
    },
}

/// Surface that records draw calls instead of rasterizing, for tests and debugging.
///
/// Text is measured with a fixed advance of `advance_em * size_px` per character.
#[derive(Debug)]
pub struct RecordingSurface {
    canvas: Canvas,
    advance_em: f32,
    pending: Vec<DrawOp>,
    frames_completed: u64,
    last_ops: Arc<Vec<DrawOp>>,
    frame: FrameRGBA,
}

impl RecordingSurface {
    /// Create a recording surface with half-em character advances.
    pub fn new(canvas: Canvas) -> Self {
        Self::with_advance(canvas, 0.5)
    }

    /// Create a recording surface with a custom per-character advance (in em).
    pub fn with_advance(canvas: Canvas, advance_em: f32) -> Self {
        Self {
            canvas,
            advance_em,
            pending: Vec::new(),
            frames_completed: 0,
            last_ops: Arc::new(Vec::new()),
            frame: FrameRGBA::blank(canvas),
        }
    }

    /// Draw calls of the last completed frame.
    pub fn ops(&self) -> &[DrawOp] {
        &self.last_ops
    }

    /// Draw calls issued since the last `begin_frame`.
    pub fn pending_ops(&self) -> &[DrawOp] {
        &self.pending
    }

    /// Number of `end_frame` calls so far.
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Text of every line drawn in the last completed frame, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.last_ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSurface {
    fn measure(&mut self, text: &str, style: &TextStyle) -> NewsreelResult<f32> {
        Ok(text.chars().count() as f32 * style.size_px * self.advance_em)
    }
}

impl Surface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn begin_frame(&mut self) {
        self.pending.clear();
    }

    fn fill_linear_gradient(
        &mut self,
        from: Point,
        to: Point,
        stops: [Rgba8; 2],
    ) -> NewsreelResult<()> {
        self.pending.push(DrawOp::Gradient { from, to, stops });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> NewsreelResult<()> {
        self.pending.push(DrawOp::Rect { rect, color });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> NewsreelResult<()> {
        self.pending.push(DrawOp::Text {
            text: text.to_string(),
            origin,
            style: *style,
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> NewsreelResult<()> {
        self.pending.push(DrawOp::Image {
            size: (image.width, image.height),
            dst,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> NewsreelResult<()> {
        self.last_ops = Arc::new(std::mem::take(&mut self.pending));
        self.frames_completed += 1;
        // Stamp the frame counter into the first pixel so captures can tell frames apart.
        let stamp = self.frames_completed.to_le_bytes();
        self.frame.data[..4].copy_from_slice(&stamp[..4]);
        Ok(())
    }

    fn current_frame(&self) -> &FrameRGBA {
        &self.frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
