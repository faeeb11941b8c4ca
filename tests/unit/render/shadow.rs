use super::*;

fn alpha_at(s: &Shadow, x: u32, y: u32) -> u8 {
    s.image.rgba8_premul[((y * s.image.width + x) as usize) * 4 + 3]
}

#[test]
fn rounded_rect_shadow_is_padded_and_soft() {
    let s = rounded_rect_shadow(80.0, 20.0, 10.0, 3.0, 0.2).unwrap();
    assert_eq!(s.pad_px, 9);
    assert_eq!((s.image.width, s.image.height), (98, 38));

    let center = alpha_at(&s, 49, 19);
    assert!((50..=52).contains(&center), "{center}");
    assert_eq!(alpha_at(&s, 0, 0), 0);
    // Rounded corners hold less coverage than the straight edge midpoint.
    assert!(alpha_at(&s, 10, 10) < alpha_at(&s, 49, 10));
    // Color channels stay black.
    assert!(s.image.rgba8_premul.chunks_exact(4).all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
}

#[test]
fn sdf_signs() {
    assert!(rounded_rect_sdf(0.0, 0.0, 10.0, 5.0, 2.0) < 0.0);
    assert!((rounded_rect_sdf(10.0, 0.0, 10.0, 5.0, 2.0)).abs() < 1e-12);
    assert!(rounded_rect_sdf(20.0, 0.0, 10.0, 5.0, 2.0) > 0.0);
}

#[test]
fn drop_shadow_follows_source_alpha() {
    let mut bytes = vec![0u8; 4 * 4 * 4];
    for px in bytes.chunks_exact_mut(4).take(8) {
        px.copy_from_slice(&[255, 255, 255, 255]);
    }
    let src = RasterImage::from_premul_rgba8(4, 4, bytes).unwrap();
    let s = drop_shadow(&src, 1.0, 0.3).unwrap();
    assert_eq!(s.pad_px, 3);
    assert_eq!((s.image.width, s.image.height), (10, 10));
    let top = alpha_at(&s, 5, 3);
    let bottom = alpha_at(&s, 5, 6);
    assert!(top > bottom);
    assert!(top <= 77);
}
