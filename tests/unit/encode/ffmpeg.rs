use super::*;

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

fn fps60() -> Fps {
    Fps::new(60, 1).unwrap()
}

#[test]
fn mov_selects_prores_4444_with_alpha() {
    let args = strings(&ffmpeg_args(ExportFormat::Mov, fps60(), Path::new("out/a.mov"), true).unwrap());
    assert_eq!(
        args,
        [
            "-y", "-loglevel", "error", "-f", "image2pipe", "-c:v", "png", "-framerate", "60",
            "-i", "-", "-c:v", "prores_ks", "-profile:v", "4444", "-pix_fmt", "yuva444p10le",
            "-vendor", "apl0", "out/a.mov",
        ]
    );
    assert!(!args.iter().any(|a| a == "libvpx-vp9"));
}

#[test]
fn webm_selects_vp9_with_alpha() {
    let args = strings(&ffmpeg_args(ExportFormat::Webm, fps60(), Path::new("b.webm"), false).unwrap());
    assert_eq!(args[0], "-n");
    let tail = &args[11..];
    assert_eq!(
        tail,
        [
            "-c:v", "libvpx-vp9", "-pix_fmt", "yuva420p", "-b:v", "8M", "-auto-alt-ref", "0",
            "b.webm",
        ]
    );
    assert!(!args.iter().any(|a| a == "prores_ks"));
}

#[test]
fn fractional_rates_are_rational() {
    let args = strings(
        &ffmpeg_args(
            ExportFormat::Webm,
            Fps::new(30000, 1001).unwrap(),
            Path::new("c.webm"),
            true,
        )
        .unwrap(),
    );
    assert_eq!(args[8], "30000/1001");
}

#[test]
fn apng_has_no_ffmpeg_path() {
    assert!(ffmpeg_args(ExportFormat::Apng, fps60(), Path::new("d.png"), true).is_err());
}

#[test]
fn missing_binary_is_reported_on_begin() {
    let out = std::env::temp_dir().join(format!("ctaforge_ffmpeg_missing_{}.mov", std::process::id()));
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("ctaforge-no-such-encoder-binary"));
    let err = sink
        .begin(SinkConfig {
            width: 4,
            height: 4,
            fps: fps60(),
            total_frames: 1,
            format: ExportFormat::Mov,
            out_path: out.clone(),
            overwrite: true,
        })
        .unwrap_err();
    assert!(matches!(err, CtaError::MissingEncoderBinary(_)), "{err}");
    assert!(!out.exists());
    assert!(!is_encoder_on_path("ctaforge-no-such-encoder-binary"));
}

#[test]
fn unstarted_sink_rejects_frames_and_tolerates_abort() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
    sink.abort();
}
