use super::*;

#[test]
fn kernel_sums_to_one_in_q16() {
    for (r, s) in [(1, 0.5), (6, 2.0), (45, 15.0)] {
        let k = gaussian_kernel_q16(r, s).unwrap();
        assert_eq!(k.len(), (2 * r + 1) as usize);
        assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
        assert!(k[r as usize] >= k[0]);
    }
    assert_eq!(gaussian_kernel_q16(0, 0.0).unwrap(), vec![65536]);
    assert!(gaussian_kernel_q16(3, 0.0).is_err());
}

#[test]
fn blur_spreads_a_single_pixel_symmetrically() {
    let (w, h) = (9u32, 9u32);
    let mut buf = vec![0u8; (w * h) as usize];
    buf[(4 * w + 4) as usize] = 255;
    let k = gaussian_kernel_q16(2, 1.0).unwrap();
    blur_q16(&mut buf, w, h, 1, &k);

    let at = |x: u32, y: u32| buf[(y * w + x) as usize];
    assert!(at(4, 4) < 255 && at(4, 4) > 0);
    assert_eq!(at(3, 4), at(5, 4));
    assert_eq!(at(4, 3), at(4, 5));
    assert_eq!(at(0, 0), 0);
}

#[test]
fn blur_fades_toward_zero_padded_edges() {
    let (w, h) = (8u32, 5u32);
    let mut buf = vec![200u8; (w * h) as usize];
    let k = gaussian_kernel_q16(2, 1.0).unwrap();
    blur_q16(&mut buf, w, h, 1, &k);
    let at = |x: u32, y: u32| buf[(y * w + x) as usize];
    assert!(at(0, 2) < at(4, 2));
    assert_eq!(at(3, 2), 200);
    assert!(at(3, 0) < 200);
}

#[test]
fn pixmap_conversion_checks_sizes() {
    assert!(pixmap_from_premul_bytes(&[0; 16], 2, 2).is_ok());
    assert!(pixmap_from_premul_bytes(&[0; 15], 2, 2).is_err());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 0).is_err());
}

#[test]
fn affine_round_trips_coefficients() {
    let a = Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(affine_to_cpu(a).as_coeffs(), a.as_coeffs());
}
