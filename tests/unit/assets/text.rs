use super::*;

#[test]
fn empty_font_is_rejected() {
    assert!(FontAsset::from_bytes(Vec::new()).is_err());
}

#[test]
fn unparsable_font_fails_layout() {
    let font = FontAsset::from_bytes(b"definitely not a font".to_vec()).unwrap();
    let mut engine = TextLayoutEngine::new();
    let Err(err) = engine.layout_line("hi", &font, 12.0, false, TextBrushRgba8::default()) else {
        panic!("expected layout failure");
    };
    assert!(matches!(err, CtaError::Validation(_)));
}

#[test]
fn invalid_size_is_rejected_before_font_work() {
    let font = FontAsset::from_bytes(vec![0; 4]).unwrap();
    let mut engine = TextLayoutEngine::new();
    assert!(
        engine
            .layout_line("hi", &font, 0.0, false, TextBrushRgba8::default())
            .is_err()
    );
    assert!(
        engine
            .layout_line("hi", &font, f32::NAN, true, TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn brush_from_rgba8() {
    let b = TextBrushRgba8::from_rgba8([1, 2, 3, 4]);
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}
