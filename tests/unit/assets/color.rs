use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 1.0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    let c: Color = serde_json::from_value(json!("#ccc")).unwrap();
    assert_eq!(c.to_rgba8(), [0xcc, 0xcc, 0xcc, 255]);
}

#[test]
fn rejects_malformed_hex() {
    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#gg0000")).is_err());
    assert!(serde_json::from_value::<Color>(json!([1.0, 0.0])).is_err());
}

#[test]
fn parses_objects_and_arrays() {
    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));

    let c: Color = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 0.9));

    let c: Color = serde_json::from_value(json!({"h": 120.0, "s": 1.0, "l": 0.5})).unwrap();
    assert_eq!(c.to_rgba8(), [0, 255, 0, 255]);
}

#[test]
fn serializes_to_hex() {
    let c = Color::from_hex("#8B5CF6").unwrap();
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#8b5cf6"));

    let c = Color::rgba(0.0, 0.0, 0.0, 0.2);
    assert_eq!(c.to_hex(), "#00000033");
}

#[test]
fn premultiplies() {
    let p = Color::rgba(1.0, 0.5, 0.0, 0.5).to_rgba8_premul();
    assert_eq!(p, [128, 64, 0, 128]);
}
