use crate::foundation::math::hash_lattice;

/// 2D value noise in `[-1, 1]`.
///
/// Lattice values come from hashing integer coordinates; cells are blended with a smoothstep
/// fade so the field is continuous. One unit of input is one lattice cell.
pub fn value_noise_2d(seed: u64, x: f64, y: f64) -> f64 {
    if !x.is_finite() || !y.is_finite() {
        return 0.0;
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (ix, iy) = (x0 as i64, y0 as i64);

    let v00 = lattice(seed, ix, iy);
    let v10 = lattice(seed, ix.wrapping_add(1), iy);
    let v01 = lattice(seed, ix, iy.wrapping_add(1));
    let v11 = lattice(seed, ix.wrapping_add(1), iy.wrapping_add(1));

    let sx = smoothstep(fx);
    let sy = smoothstep(fy);
    let top = lerp(v00, v10, sx);
    let bottom = lerp(v01, v11, sx);
    lerp(top, bottom, sy)
}

fn lattice(seed: u64, x: i64, y: i64) -> f64 {
    let h = hash_lattice(seed, x, y);
    (f64::from(h) / f64::from(u32::MAX)) * 2.0 - 1.0
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/particles/noise.rs"]
mod tests;
