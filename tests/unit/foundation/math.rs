use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn rng_ranges_stay_in_bounds() {
    let mut r = Rng64::new(7);
    for _ in 0..1000 {
        let v = r.range_f64(0.5, 1.5);
        assert!((0.5..1.5).contains(&v));
        assert!(r.index(5) < 5);
    }
}

#[test]
fn lattice_hash_depends_on_all_inputs() {
    let base = hash_lattice(1, 2, 3);
    assert_eq!(base, hash_lattice(1, 2, 3));
    assert_ne!(base, hash_lattice(2, 2, 3));
    assert_ne!(base, hash_lattice(1, 3, 3));
    assert_ne!(base, hash_lattice(1, 2, 4));
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(0, 255), 0);
    assert_eq!(mul_div255(128, 255), 128);
    assert_eq!(mul_div255(255, 128), 128);
    assert_eq!(mul_div255(128, 128), 64);
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_clear() {
    let mut px = vec![10u8, 20, 30, 255, 99, 99, 99, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    let mut out = vec![0u8; 8];
    unpremultiply_rgba8(&mut out, &px);
    assert_eq!(&out[..4], &[10, 20, 30, 255]);
    assert_eq!(&out[4..], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_half_alpha() {
    let src = [64u8, 0, 128, 128];
    let mut out = [0u8; 4];
    unpremultiply_rgba8(&mut out, &src);
    assert_eq!(out, [128, 0, 255, 128]);
}
