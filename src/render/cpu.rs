use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::lerp_u8;
use crate::render::surface::{FontWeight, FrameRGBA, Surface, TextMeasure, TextStyle};

/// Layouts kept before the cache is flushed. Slides redraw the same lines every tick.
const MAX_CACHED_LAYOUTS: usize = 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

struct Face {
    family: String,
    font: vello_cpu::peniko::FontData,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    bold: bool,
    size_bits: u32,
    brush: [u8; 4],
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    from: [u64; 2],
    to: [u64; 2],
    stops: [[u8; 4]; 2],
}

/// Regular and bold font files used for all slide text.
pub struct FontSet {
    regular: Vec<u8>,
    bold: Vec<u8>,
}

impl FontSet {
    /// Read the two font files from disk.
    pub fn from_paths(regular: &Path, bold: &Path) -> NewsreelResult<Self> {
        let regular_bytes = std::fs::read(regular)
            .with_context(|| format!("read font '{}'", regular.display()))?;
        let bold_bytes =
            std::fs::read(bold).with_context(|| format!("read font '{}'", bold.display()))?;
        Ok(Self::from_bytes(regular_bytes, bold_bytes))
    }

    /// Use in-memory font data.
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> Self {
        Self { regular, bold }
    }
}

/// CPU surface powered by `vello_cpu` for rasterization and `parley` for text shaping.
pub struct CpuSurface {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    frame: FrameRGBA,

    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular: Face,
    bold: Face,
    layouts: HashMap<LayoutKey, Arc<parley::Layout<TextBrushRgba8>>>,

    gradient_cache: Option<(GradientKey, vello_cpu::Image)>,
    // Only the thumbnail on screen; a new image replaces it.
    image_cache: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl CpuSurface {
    /// Create a surface of `canvas` size drawing text with `fonts`.
    pub fn new(canvas: Canvas, fonts: FontSet) -> NewsreelResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        let mut font_ctx = parley::FontContext::default();
        let regular = register_face(&mut font_ctx, fonts.regular)?;
        let bold = register_face(&mut font_ctx, fonts.bold)?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            frame: FrameRGBA::blank(canvas),
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular,
            bold,
            layouts: HashMap::new(),
            gradient_cache: None,
            image_cache: None,
        })
    }

    fn layout_for(
        &mut self,
        text: &str,
        style: &TextStyle,
    ) -> NewsreelResult<Arc<parley::Layout<TextBrushRgba8>>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(NewsreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let bold = style.weight != FontWeight::Regular;
        let brush = TextBrushRgba8 {
            r: style.color.r,
            g: style.color.g,
            b: style.color.b,
            a: style.color.a,
        };
        let key = LayoutKey {
            bold,
            size_bits: style.size_px.to_bits(),
            brush: [brush.r, brush.g, brush.b, brush.a],
            text: text.to_string(),
        };
        if let Some(layout) = self.layouts.get(&key) {
            return Ok(layout.clone());
        }

        let family = if bold {
            self.bold.family.clone()
        } else {
            self.regular.family.clone()
        };
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        if self.layouts.len() >= MAX_CACHED_LAYOUTS {
            self.layouts.clear();
        }
        let layout = Arc::new(layout);
        self.layouts.insert(key, layout.clone());
        Ok(layout)
    }

    fn gradient_paint(
        &mut self,
        from: Point,
        to: Point,
        stops: [Rgba8; 2],
    ) -> NewsreelResult<vello_cpu::Image> {
        let key = GradientKey {
            from: [from.x.to_bits(), from.y.to_bits()],
            to: [to.x.to_bits(), to.y.to_bits()],
            stops: [stops[0].to_premul(), stops[1].to_premul()],
        };
        if let Some((cached_key, img)) = &self.gradient_cache
            && *cached_key == key
        {
            return Ok(img.clone());
        }

        let (w, h) = (self.canvas.width, self.canvas.height);
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len2 = dx * dx + dy * dy;
        let [s, e] = key.stops;
        let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
        for y in 0..h {
            for x in 0..w {
                let px = f64::from(x) + 0.5 - from.x;
                let py = f64::from(y) + 0.5 - from.y;
                let t = if len2 <= 0.0 {
                    0.0
                } else {
                    ((px * dx + py * dy) / len2).clamp(0.0, 1.0) as f32
                };
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx] = lerp_u8(s[0], e[0], t);
                bytes[idx + 1] = lerp_u8(s[1], e[1], t);
                bytes[idx + 2] = lerp_u8(s[2], e[2], t);
                bytes[idx + 3] = lerp_u8(s[3], e[3], t);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache = Some((key, img.clone()));
        Ok(img)
    }

    fn image_paint(&mut self, image: &PreparedImage) -> NewsreelResult<vello_cpu::Image> {
        if let Some((pixels, paint)) = &self.image_cache
            && Arc::ptr_eq(pixels, &image.rgba8_premul)
        {
            return Ok(paint.clone());
        }
        let paint = rgba_premul_to_image(&image.rgba8_premul, image.width, image.height)?;
        self.image_cache = Some((image.rgba8_premul.clone(), paint.clone()));
        Ok(paint)
    }

    fn reset_paint_state(&mut self) {
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl TextMeasure for CpuSurface {
    fn measure(&mut self, text: &str, style: &TextStyle) -> NewsreelResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self.layout_for(text, style)?.width())
    }
}

impl Surface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn begin_frame(&mut self) {
        self.ctx.reset();
    }

    fn fill_linear_gradient(
        &mut self,
        from: Point,
        to: Point,
        stops: [Rgba8; 2],
    ) -> NewsreelResult<()> {
        let img = self.gradient_paint(from, to, stops)?;
        self.reset_paint_state();
        self.ctx.set_paint(img);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.canvas.w(),
            self.canvas.h(),
        ));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> NewsreelResult<()> {
        self.reset_paint_state();
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> NewsreelResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let layout = self.layout_for(text, style)?;
        let font = if style.weight == FontWeight::Regular {
            self.regular.font.clone()
        } else {
            self.bold.font.clone()
        };

        self.reset_paint_state();
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Positioned glyphs carry the run offset and baseline, so `origin` is the line top.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> NewsreelResult<()> {
        if image.width == 0 || image.height == 0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Ok(());
        }
        let paint = self.image_paint(image)?;
        let sx = dst.width() / f64::from(image.width);
        let sy = dst.height() / f64::from(image.height);

        self.reset_paint_state();
        self.ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
                * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
        );
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    fn end_frame(&mut self) -> NewsreelResult<()> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.frame
            .data
            .copy_from_slice(self.pixmap.data_as_u8_slice());
        Ok(())
    }

    fn current_frame(&self) -> &FrameRGBA {
        &self.frame
    }
}

fn register_face(font_ctx: &mut parley::FontContext, bytes: Vec<u8>) -> NewsreelResult<Face> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| NewsreelError::validation("no font families registered from font bytes"))?;
    let family = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| NewsreelError::validation("registered font family has no name"))?
        .to_string();
    let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
    Ok(Face { family, font })
}

fn canvas_u16(canvas: Canvas) -> NewsreelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| NewsreelError::validation("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| NewsreelError::validation("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(NewsreelError::validation("surface size must be non-zero"));
    }
    Ok((w, h))
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> NewsreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| NewsreelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| NewsreelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(NewsreelError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> NewsreelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
