/// 64-bit FNV-1a over little-endian words.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.0 = v
            .to_le_bytes()
            .iter()
            .fold(self.0, |h, &b| (h ^ u64::from(b)).wrapping_mul(Self::PRIME));
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Hash an integer lattice point into 32 bits.
pub(crate) fn hash_lattice(seed: u64, x: i64, y: i64) -> u32 {
    let mut h = Fnv1a64::new(seed ^ Fnv1a64::OFFSET_BASIS);
    h.write_u64(x as u64);
    h.write_u64(y as u64);
    let v = h.finish();
    (v ^ (v >> 32)) as u32
}

/// SplitMix64 generator. Every random choice in a burst comes from one of these, so equal
/// seeds give equal output on every platform.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Generator starting from `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next 64 random bits.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * SCALE
    }

    /// Uniform in `[lo, hi)`; `lo` when the range is empty.
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64_01() * (hi - lo)
    }

    /// Uniform index below `len`, which must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f64_01() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// `round(c * a / 255)`.
pub(crate) fn mul_div255(c: u8, a: u8) -> u8 {
    ((u32::from(c) * u32::from(a) + 127) / 255) as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = mul_div255(*c, a);
        }
    }
}

/// Premultiplied to straight RGBA8; `dst` and `src` have equal length.
pub(crate) fn unpremultiply_rgba8(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        match s[3] {
            0 => d.fill(0),
            255 => d.copy_from_slice(s),
            a => {
                let a = u32::from(a);
                for (dc, &sc) in d[..3].iter_mut().zip(&s[..3]) {
                    *dc = ((u32::from(sc) * 255 + a / 2) / a).min(255) as u8;
                }
                d[3] = s[3];
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
