use super::*;
use crate::foundation::core::Fps;
use crate::scene::config::ExportFormat;

fn temp_out(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ctaforge_apng_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("anim.png")
}

fn cfg(out: PathBuf, total_frames: u64) -> SinkConfig {
    SinkConfig {
        width: 3,
        height: 2,
        fps: Fps::new(60, 1).unwrap(),
        total_frames,
        format: ExportFormat::Apng,
        out_path: out,
        overwrite: true,
    }
}

fn frame(premul: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: 3,
        height: 2,
        data: premul.repeat(6),
        premultiplied: true,
    }
}

#[test]
fn writes_looping_animation_with_straight_alpha() {
    let out = temp_out("ok");
    let mut sink = ApngSink::new();
    sink.begin(cfg(out.clone(), 2)).unwrap();
    assert!(partial_path(&out).exists());
    sink.push_frame(FrameIndex(0), &frame([0, 0, 0, 0])).unwrap();
    sink.push_frame(FrameIndex(1), &frame([64, 0, 0, 128])).unwrap();
    sink.end().unwrap();

    assert!(out.exists());
    assert!(!partial_path(&out).exists());

    let decoder = png::Decoder::new(std::io::BufReader::new(std::fs::File::open(&out).unwrap()));
    let mut reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!((info.width, info.height), (3, 2));
    let actl = info.animation_control.unwrap();
    assert_eq!(actl.num_frames, 2);
    assert_eq!(actl.num_plays, 0);

    let mut buf = vec![0u8; reader.output_buffer_size().unwrap()];
    reader.next_frame(&mut buf).unwrap();
    assert_eq!(&buf[..4], &[0, 0, 0, 0]);
    reader.next_frame(&mut buf).unwrap();
    // 64 premultiplied at alpha 128 is ~127 straight.
    assert!((126..=128).contains(&buf[0]), "{}", buf[0]);
    assert_eq!(buf[3], 128);
}

#[test]
fn abort_discards_partial_output() {
    let out = temp_out("abort");
    let _ = std::fs::remove_file(&out);
    let mut sink = ApngSink::new();
    sink.begin(cfg(out.clone(), 3)).unwrap();
    sink.push_frame(FrameIndex(0), &frame([0, 0, 0, 255])).unwrap();
    sink.abort();
    assert!(!out.exists());
    assert!(!partial_path(&out).exists());
}

#[test]
fn short_streams_fail_on_end() {
    let out = temp_out("short");
    let _ = std::fs::remove_file(&out);
    let mut sink = ApngSink::new();
    sink.begin(cfg(out.clone(), 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame([0, 0, 0, 255])).unwrap();
    assert!(sink.end().is_err());
    assert!(!out.exists());
}

#[test]
fn refuses_to_overwrite_when_disabled() {
    let out = temp_out("exists");
    std::fs::write(&out, b"keep").unwrap();
    let mut c = cfg(out.clone(), 1);
    c.overwrite = false;
    assert!(ApngSink::new().begin(c).is_err());
    assert_eq!(std::fs::read(&out).unwrap(), b"keep");
}
