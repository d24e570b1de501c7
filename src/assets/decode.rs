use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Largest width or height the raster backend can sample from.
pub const MAX_IMAGE_SIDE: u32 = u16::MAX as u32;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap already-premultiplied pixels.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> NewsreelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    let img = PreparedImage::from_premul(width, height, rgba8_premul);
    ensure_drawable(&img)?;
    Ok(img)
}

/// Reject images the surface cannot turn into a paint.
pub fn ensure_drawable(img: &PreparedImage) -> NewsreelResult<()> {
    if img.width == 0 || img.height == 0 {
        return Err(NewsreelError::validation("image has zero size"));
    }
    if img.width > MAX_IMAGE_SIDE || img.height > MAX_IMAGE_SIDE {
        return Err(NewsreelError::validation(format!(
            "image {}x{} exceeds {MAX_IMAGE_SIDE}px per side",
            img.width, img.height
        )));
    }
    let expected = (img.width as usize)
        .saturating_mul(img.height as usize)
        .saturating_mul(4);
    if img.rgba8_premul.len() != expected {
        return Err(NewsreelError::validation("image byte length mismatch"));
    }
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
