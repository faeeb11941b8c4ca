use super::*;
use serde_json::json;

#[test]
fn defaults_match_the_stock_overlay() {
    let c = CtaConfig::default();
    assert_eq!(c.text.primary_text, "Subscribe");
    assert_eq!(c.text.under_text, "twitch.tv/mychannel");
    assert_eq!(c.text.subscribed_text, "SUBSCRIBED");
    assert_eq!(c.cta_colors.background.to_hex(), "#f3f4f6");
    assert_eq!(c.subscribed_colors.text.to_hex(), "#8b5cf6");
    assert_eq!(c.animation.curve, Ease::ElasticOut);
    assert_eq!(c.cursor.curve, Ease::ExpoOut);
    assert_eq!(c.particles.count, 50);
    assert_eq!(c.particles.colors.len(), 5);
    assert_eq!(c.particles.seed, 12345);
    assert_eq!(c.output.format, ExportFormat::Mov);
    c.validate().unwrap();
}

#[test]
fn partial_json_fills_in_defaults() {
    let c = CtaConfig::from_json_str(
        r#"{"animation": {"type": "bounce", "duration": 2.0}, "particles": {"shape": "circle"}}"#,
    )
    .unwrap();
    assert_eq!(c.animation.curve, Ease::BounceOut);
    assert!((c.animation.duration - 2.0).abs() < 1e-12);
    assert!(c.animation.opacity);
    assert_eq!(c.particles.shape, ParticleShape::Circle);
    assert_eq!(c.particles.count, 50);
    assert_eq!(c.text.primary_text, "Subscribe");
}

#[test]
fn json_round_trips() {
    let mut c = CtaConfig::default();
    c.format = LayoutFormat::Portrait;
    c.output.resolution = ResolutionTier::K4;
    let s = c.to_json_pretty().unwrap();
    let back = CtaConfig::from_json_str(&s).unwrap();
    assert_eq!(back, c);
    let v: serde_json::Value = serde_json::from_str(&s).unwrap();
    assert_eq!(v["output"]["resolution"], json!("4k"));
}

#[test]
fn physical_size_follows_tier_supersampling_and_format() {
    let mut c = CtaConfig::default();
    assert_eq!(
        c.physical_size(),
        Canvas {
            width: 1920,
            height: 1080
        }
    );
    c.format = LayoutFormat::Portrait;
    assert_eq!(
        c.physical_size(),
        Canvas {
            width: 1080,
            height: 1920
        }
    );
    c.output.supersampling = 2;
    assert_eq!(
        c.physical_size(),
        Canvas {
            width: 2160,
            height: 3840
        }
    );
    c.format = LayoutFormat::Landscape;
    assert_eq!(
        c.physical_size(),
        Canvas {
            width: 3840,
            height: 2160
        }
    );
    assert!((c.global_scale() - 2.0).abs() < 1e-12);
}

#[test]
fn global_scale_uses_reference_width() {
    let mut c = CtaConfig::default();
    c.output.resolution = ResolutionTier::P720;
    assert!((c.global_scale() - 1280.0 / 1920.0).abs() < 1e-12);
    c.format = LayoutFormat::Portrait;
    assert!((c.global_scale() - 720.0 / 1080.0).abs() < 1e-12);
}

#[test]
fn validate_rejects_bad_ranges() {
    let mut c = CtaConfig::default();
    c.animation.duration = 0.0;
    assert!(c.validate().is_err());

    let mut c = CtaConfig::default();
    c.particles.min_size = 20.0;
    assert!(c.validate().is_err());

    let mut c = CtaConfig::default();
    c.particles.life_min = 2.0;
    assert!(c.validate().is_err());

    let mut c = CtaConfig::default();
    c.particles.colors.clear();
    assert!(c.validate().is_err());
    c.particles.enabled = false;
    c.validate().unwrap();

    let mut c = CtaConfig::default();
    c.output.supersampling = 0;
    assert!(c.validate().is_err());

    let mut c = CtaConfig::default();
    c.particles.noise_scale = f64::NAN;
    assert!(c.validate().is_err());
}

#[test]
fn fade_modes_map_life_to_alpha_and_scale() {
    assert_eq!(FadeMode::Opacity.apply(0.25), (0.25, 1.0));
    assert_eq!(FadeMode::Scale.apply(0.25), (1.0, 0.25));
    assert_eq!(FadeMode::Both.apply(0.25), (0.25, 0.25));
    assert_eq!(FadeMode::None.apply(0.25), (1.0, 1.0));
    assert_eq!(FadeMode::Opacity.apply(1.5), (1.0, 1.0));
}

#[test]
fn export_format_from_extension() {
    assert_eq!(
        ExportFormat::from_extension(Path::new("a/b.MOV")),
        Some(ExportFormat::Mov)
    );
    assert_eq!(
        ExportFormat::from_extension(Path::new("x.webm")),
        Some(ExportFormat::Webm)
    );
    assert_eq!(
        ExportFormat::from_extension(Path::new("x.apng")),
        Some(ExportFormat::Apng)
    );
    assert_eq!(ExportFormat::from_extension(Path::new("x.mp4")), None);
}

#[test]
fn header_and_palette_swap_on_action() {
    let c = CtaConfig::default();
    assert_eq!(c.text.header(false).0, "Subscribe");
    assert_eq!(c.text.header(true).0, "SUBSCRIBED");
    assert_eq!(c.palette(true), &c.subscribed_colors);
    assert_eq!(c.palette(false), &c.cta_colors);
}
