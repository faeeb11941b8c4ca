//! Glue between crate geometry/rasters and `vello_cpu`, plus the Q16 gaussian blur used for
//! soft shadows.

use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::decode::RasterImage;
use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::{CtaError, CtaResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CtaResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CtaError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CtaError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CtaError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn premul_bytes_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> CtaResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Image paint plus its pixel size, ready for `fill_rect(0, 0, w, h)`.
#[derive(Clone)]
pub(crate) struct ImagePaint {
    pub(crate) paint: vello_cpu::Image,
    pub(crate) w: u32,
    pub(crate) h: u32,
}

impl ImagePaint {
    pub(crate) fn from_raster(img: &RasterImage) -> CtaResult<Self> {
        Ok(Self {
            paint: premul_bytes_to_image(&img.rgba8_premul, img.width, img.height)?,
            w: img.width,
            h: img.height,
        })
    }
}

/// Normalized gaussian taps for `-radius..=radius` in Q16 fixed point; they sum to `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CtaResult<Vec<u32>> {
    const ONE: i64 = 1 << 16;
    if radius == 0 {
        return Ok(vec![ONE as u32]);
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(CtaError::validation("blur sigma must be finite and > 0"));
    }

    let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
    let r = i64::from(radius);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(CtaError::render("gaussian kernel sum is zero"));
    }

    let mut taps: Vec<i64> = raw
        .iter()
        .map(|w| ((w / total) * ONE as f64).round() as i64)
        .collect();
    // Rounding drift goes to the center tap.
    let drift = ONE - taps.iter().sum::<i64>();
    taps[radius as usize] = (taps[radius as usize] + drift).clamp(0, ONE);
    Ok(taps.into_iter().map(|t| t.clamp(0, ONE) as u32).collect())
}

/// Separable blur over interleaved 8-bit planes with `channels` components per pixel.
///
/// Samples outside the buffer count as zero, so content fades out toward the border instead
/// of smearing.
pub(crate) fn blur_q16(
    buf: &mut [u8],
    width: u32,
    height: u32,
    channels: usize,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() <= 1 || width == 0 || height == 0 {
        return;
    }
    let (w, h) = (width as usize, height as usize);
    let mut tmp = vec![0u8; buf.len()];
    let row = channels * w;
    blur_pass(buf, &mut tmp, (w, channels), (h, row), channels, kernel_q16);
    blur_pass(&tmp, buf, (h, row), (w, channels), channels, kernel_q16);
}

/// One 1-D pass. `along` is `(samples per line, bytes between samples)` and `across` is
/// `(line count, bytes between line starts)`.
fn blur_pass(
    src: &[u8],
    dst: &mut [u8],
    along: (usize, usize),
    across: (usize, usize),
    channels: usize,
    k: &[u32],
) {
    let ((len, step), (lines, line_step)) = (along, across);
    let radius = k.len() / 2;
    for line in 0..lines {
        let base = line * line_step;
        for i in 0..len {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(len - 1);
            for c in 0..channels {
                let acc: u64 = (lo..=hi)
                    .map(|j| {
                        u64::from(k[j + radius - i]) * u64::from(src[base + j * step + c])
                    })
                    .sum();
                dst[base + i * step + c] = ((acc + (1 << 15)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
