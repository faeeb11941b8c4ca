use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{CtaError, CtaResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster in premultiplied RGBA8 form.
///
/// Cloning is cheap; the pixel buffer is shared.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl RasterImage {
    /// Wrap already-premultiplied bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> CtaResult<Self> {
        if width == 0 || height == 0 {
            return Err(CtaError::validation("raster image must be non-empty"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if bytes.len() != expected {
            return Err(CtaError::validation(format!(
                "raster byte len mismatch: got {}, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }

    /// Premultiply straight-alpha bytes and wrap them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut bytes: Vec<u8>) -> CtaResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(width, height, bytes)
    }

    /// `width / height`.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Premultiplied pixel at `(x, y)`, clamped to the edges.
    pub(crate) fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        let d = &self.rgba8_premul;
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }

    /// Bilinear sample at continuous pixel coordinates (pixel centers at `+0.5`).
    pub(crate) fn sample_bilinear(&self, fx: f64, fy: f64) -> [u8; 4] {
        let x = fx - 0.5;
        let y = fy - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (ix, iy) = (x0 as i64, y0 as i64);

        let p00 = self.pixel_clamped(ix, iy);
        let p10 = self.pixel_clamped(ix + 1, iy);
        let p01 = self.pixel_clamped(ix, iy + 1);
        let p11 = self.pixel_clamped(ix + 1, iy + 1);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f64::from(p00[c]) + (f64::from(p10[c]) - f64::from(p00[c])) * tx;
            let bot = f64::from(p01[c]) + (f64::from(p11[c]) - f64::from(p01[c])) * tx;
            out[c] = (top + (bot - top) * ty).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/// Decode encoded image bytes (PNG, JPEG, GIF, WebP, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CtaResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> CtaResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(Arc::new(tree))
}

/// Rasterize an SVG tree stretched to `width x height`.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> CtaResult<RasterImage> {
    const MAX_DIM: u32 = 16_384;
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(CtaError::render(format!(
            "svg raster size out of range: {width}x{height}"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CtaError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    RasterImage::from_premul_rgba8(width, height, pixmap.take())
}

/// Decode either a raster image or, by extension, an SVG rasterized at its intrinsic size.
pub(crate) fn decode_any(bytes: &[u8], is_svg: bool) -> CtaResult<RasterImage> {
    if !is_svg {
        return decode_image(bytes);
    }
    let tree = parse_svg(bytes)?;
    let size = tree.size();
    let w = (size.width().ceil() as u32).max(1);
    let h = (size.height().ceil() as u32).max(1);
    rasterize_svg(&tree, w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
