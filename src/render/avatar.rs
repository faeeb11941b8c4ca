use crate::assets::decode::RasterImage;
use crate::foundation::error::CtaResult;
use crate::scene::config::ImageTransform;

/// Avatar diameter in logical units.
pub(crate) const AVATAR_SIZE: f64 = 140.0;

/// Cover-fit rectangle `(x, y, w, h)` of an image with `aspect` inside a `size` square.
///
/// The short side fills the square and the long side is centered and cropped.
pub(crate) fn cover_rect(aspect: f64, size: f64) -> (f64, f64, f64, f64) {
    if aspect > 1.0 {
        let w = size * aspect;
        (-(w - size) / 2.0, 0.0, w, size)
    } else {
        let h = size / aspect.max(1e-9);
        (0.0, -(h - size) / 2.0, size, h)
    }
}

/// Render the avatar, cover-fitted, pan/zoomed around its center and clipped to a circle,
/// into a `side x side` premultiplied raster.
///
/// The manual transform maps image content as `translate(c)·scale(s)·translate(x, y)·translate(-c)`
/// where `c` is the avatar center; pixels are found by inverting it.
pub(crate) fn avatar_disc(
    src: &RasterImage,
    side: u32,
    transform: &ImageTransform,
) -> CtaResult<RasterImage> {
    let side = side.max(1);
    let unit = AVATAR_SIZE / f64::from(side);
    let c = AVATAR_SIZE / 2.0;
    let (ox, oy, dw, dh) = cover_rect(src.aspect(), AVATAR_SIZE);
    let s = if transform.scale.is_finite() && transform.scale > 0.0 {
        transform.scale
    } else {
        1.0
    };
    let kx = f64::from(src.width) / dw;
    let ky = f64::from(src.height) / dh;

    let mut out = vec![0u8; (side as usize) * (side as usize) * 4];
    for v in 0..side {
        for u in 0..side {
            let lx = (f64::from(u) + 0.5) * unit;
            let ly = (f64::from(v) + 0.5) * unit;

            let d = (lx - c).hypot(ly - c);
            let cov = ((c - d) / unit + 0.5).clamp(0.0, 1.0);
            if cov <= 0.0 {
                continue;
            }

            let qx = c + (lx - c) / s - transform.x;
            let qy = c + (ly - c) / s - transform.y;
            let ix = (qx - ox) * kx;
            let iy = (qy - oy) * ky;
            if ix < 0.0 || iy < 0.0 || ix >= f64::from(src.width) || iy >= f64::from(src.height) {
                continue;
            }

            let p = src.sample_bilinear(ix, iy);
            let i = ((v * side + u) as usize) * 4;
            for ch in 0..4 {
                out[i + ch] = (f64::from(p[ch]) * cov).round() as u8;
            }
        }
    }
    RasterImage::from_premul_rgba8(side, side, out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/avatar.rs"]
mod tests;
