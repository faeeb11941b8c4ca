//! Soft shadows, rasterized once on the CPU and drawn as images.

use crate::assets::decode::RasterImage;
use crate::foundation::error::CtaResult;
use crate::render::cpu::{blur_q16, gaussian_kernel_q16};

/// Shadow color alpha under the container box.
pub(crate) const BOX_SHADOW_ALPHA: f64 = 0.2;
/// Blur standard deviation under the container box, logical units.
pub(crate) const BOX_SHADOW_SIGMA: f64 = 15.0;
/// Vertical shadow offset under the container box, logical units.
pub(crate) const BOX_SHADOW_OFFSET_Y: f64 = 10.0;
/// Cursor drop-shadow alpha.
pub(crate) const CURSOR_SHADOW_ALPHA: f64 = 0.3;
/// Cursor drop-shadow blur and offset, logical units.
pub(crate) const CURSOR_SHADOW_SIGMA: f64 = 2.0;
pub(crate) const CURSOR_SHADOW_OFFSET: f64 = 2.0;

/// A blurred shadow raster and the padding added around the source shape on each side.
#[derive(Clone, Debug)]
pub(crate) struct Shadow {
    pub(crate) image: RasterImage,
    pub(crate) pad_px: u32,
}

fn pad_for(sigma_px: f64) -> u32 {
    (sigma_px * 3.0).ceil().max(0.0) as u32
}

fn alpha_to_black_premul(alpha: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; alpha.len() * 4];
    for (px, &a) in out.chunks_exact_mut(4).zip(alpha) {
        px[3] = a;
    }
    out
}

fn blur_alpha(alpha: &mut [u8], w: u32, h: u32, sigma_px: f64) -> CtaResult<()> {
    let k = gaussian_kernel_q16(pad_for(sigma_px), sigma_px as f32)?;
    blur_q16(alpha, w, h, 1, &k);
    Ok(())
}

/// Shadow of a `w x h` rounded rectangle with corner `radius`, at one pixel per unit.
pub(crate) fn rounded_rect_shadow(
    w: f64,
    h: f64,
    radius: f64,
    sigma: f64,
    alpha: f64,
) -> CtaResult<Shadow> {
    let pad = pad_for(sigma);
    let iw = (w.ceil().max(1.0) as u32) + 2 * pad;
    let ih = (h.ceil().max(1.0) as u32) + 2 * pad;
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    let (hx, hy) = (w / 2.0, h / 2.0);
    let (cx, cy) = (f64::from(pad) + hx, f64::from(pad) + hy);
    let a255 = alpha.clamp(0.0, 1.0) * 255.0;

    let mut mask = vec![0u8; (iw as usize) * (ih as usize)];
    for y in 0..ih {
        for x in 0..iw {
            let px = f64::from(x) + 0.5 - cx;
            let py = f64::from(y) + 0.5 - cy;
            let d = rounded_rect_sdf(px, py, hx, hy, r);
            let cov = (0.5 - d).clamp(0.0, 1.0);
            mask[(y * iw + x) as usize] = (cov * a255).round() as u8;
        }
    }
    blur_alpha(&mut mask, iw, ih, sigma)?;

    Ok(Shadow {
        image: RasterImage::from_premul_rgba8(iw, ih, alpha_to_black_premul(&mask))?,
        pad_px: pad,
    })
}

/// Signed distance from `(px, py)` to a centered rounded box with half extents `(hx, hy)`.
fn rounded_rect_sdf(px: f64, py: f64, hx: f64, hy: f64, r: f64) -> f64 {
    let qx = px.abs() - (hx - r);
    let qy = py.abs() - (hy - r);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

/// Drop shadow following the alpha of `src`, blurred with `sigma_px`.
pub(crate) fn drop_shadow(src: &RasterImage, sigma_px: f64, alpha: f64) -> CtaResult<Shadow> {
    let pad = pad_for(sigma_px);
    let iw = src.width + 2 * pad;
    let ih = src.height + 2 * pad;
    let k = alpha.clamp(0.0, 1.0);

    let mut mask = vec![0u8; (iw as usize) * (ih as usize)];
    for y in 0..src.height {
        for x in 0..src.width {
            let sa = src.rgba8_premul[((y * src.width + x) as usize) * 4 + 3];
            let di = ((y + pad) * iw + (x + pad)) as usize;
            mask[di] = (f64::from(sa) * k).round() as u8;
        }
    }
    blur_alpha(&mut mask, iw, ih, sigma_px)?;

    Ok(Shadow {
        image: RasterImage::from_premul_rgba8(iw, ih, alpha_to_black_premul(&mask))?,
        pad_px: pad,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/shadow.rs"]
mod tests;
