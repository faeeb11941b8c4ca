use super::*;

#[test]
fn suggested_names_carry_tier_time_and_extension() {
    assert_eq!(
        suggested_file_name(ResolutionTier::P1080, ExportFormat::Mov, 1_700_000_000_123),
        "cta-1080p-1700000000123.mov"
    );
    assert_eq!(
        suggested_file_name(ResolutionTier::K4, ExportFormat::Apng, 5),
        "cta-4k-5.png"
    );
    let req = SaveRequest::new(ExportFormat::Webm, ResolutionTier::P720);
    assert!(req.suggested_name.starts_with("cta-720p-"));
    assert!(req.suggested_name.ends_with(".webm"));
}

#[test]
fn destinations_resolve_paths() {
    let req = SaveRequest {
        suggested_name: "cta-480p-1.mov".into(),
        format: ExportFormat::Mov,
    };
    assert_eq!(
        FixedDestination::new("/tmp/x.mov").choose(&req).unwrap(),
        SaveChoice::Path(PathBuf::from("/tmp/x.mov"))
    );
    assert_eq!(
        DirectoryDestination::new("out").choose(&req).unwrap(),
        SaveChoice::Path(PathBuf::from("out/cta-480p-1.mov"))
    );

    let mut cancel = |_: &SaveRequest| -> CtaResult<SaveChoice> { Ok(SaveChoice::Cancelled) };
    assert_eq!(cancel.choose(&req).unwrap(), SaveChoice::Cancelled);
}
