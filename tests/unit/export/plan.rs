use super::*;
use crate::scene::config::LayoutFormat;

#[test]
fn frame_count_follows_duration_multiplier() {
    let mut cfg = CtaConfig::default();
    assert_eq!(ExportPlan::from_config(&cfg).unwrap().total_frames, 360);
    cfg.animation.duration = 2.0;
    assert_eq!(ExportPlan::from_config(&cfg).unwrap().total_frames, 720);
    cfg.animation.duration = 1.1;
    assert_eq!(ExportPlan::from_config(&cfg).unwrap().total_frames, 396);
}

#[test]
fn geometry_follows_tier_supersampling_and_orientation() {
    let mut cfg = CtaConfig::default();
    let p = ExportPlan::from_config(&cfg).unwrap();
    assert_eq!((p.canvas.width, p.canvas.height), (1920, 1080));
    assert_eq!(p.global_scale, 1.0);

    cfg.output.supersampling = 2;
    let p = ExportPlan::from_config(&cfg).unwrap();
    assert_eq!((p.canvas.width, p.canvas.height), (3840, 2160));
    assert_eq!(p.global_scale, 2.0);

    cfg.format = LayoutFormat::Portrait;
    let p = ExportPlan::from_config(&cfg).unwrap();
    assert_eq!((p.canvas.width, p.canvas.height), (2160, 3840));
    assert_eq!(p.global_scale, 2.0);
}

#[test]
fn frame_times_are_synthetic() {
    let p = ExportPlan::from_config(&CtaConfig::default()).unwrap();
    assert_eq!(p.frame_time_ms(0), 0.0);
    assert!((p.frame_time_ms(150) - 2500.0).abs() < 1e-9);
    assert!((p.frame_time_ms(359) - 5983.333_333).abs() < 1e-3);
}
