use crate::assets::color::Color;
use crate::assets::decode::RasterImage;

/// Reusable scratch buffer for color-tinting the particle image.
///
/// Each call resizes the buffer to the particle's square pixel footprint, resamples the source
/// into it, multiplies by the tint color and masks the result by the source alpha.
#[derive(Default)]
pub(crate) struct TintScratch {
    buf: Vec<u8>,
}

impl TintScratch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Tint `src` into a `side x side` premultiplied buffer.
    ///
    /// Per pixel with source alpha `a` and straight source color `s`, the opaque tint `c` is
    /// composited with multiply over the image (`(1 - a)·c + a·c·s`) and then kept only where
    /// the image is (`· a`).
    pub(crate) fn tint(&mut self, src: &RasterImage, side: u32, color: Color) -> &[u8] {
        let side = side.max(1);
        let len = (side as usize) * (side as usize) * 4;
        self.buf.clear();
        self.buf.resize(len, 0);

        let c = [
            color.r.clamp(0.0, 1.0),
            color.g.clamp(0.0, 1.0),
            color.b.clamp(0.0, 1.0),
        ];
        let sx = f64::from(src.width) / f64::from(side);
        let sy = f64::from(src.height) / f64::from(side);

        for y in 0..side {
            for x in 0..side {
                let p = src.sample_bilinear((f64::from(x) + 0.5) * sx, (f64::from(y) + 0.5) * sy);
                let i = ((y * side + x) as usize) * 4;
                if p[3] == 0 {
                    continue;
                }
                let a = f64::from(p[3]) / 255.0;
                for ch in 0..3 {
                    let s = (f64::from(p[ch]) / 255.0 / a).min(1.0);
                    let v = a * ((1.0 - a) * c[ch] + a * c[ch] * s);
                    self.buf[i + ch] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                }
                self.buf[i + 3] = p[3];
            }
        }
        &self.buf
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tint.rs"]
mod tests;
