use std::ffi::{OsStr, OsString};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::encode::sink::{
    FrameSink, SinkConfig, check_frame, check_overwrite, ensure_parent_dir,
};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CtaError, CtaResult};
use crate::render::surface::FrameRGBA;
use crate::scene::config::ExportFormat;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Encoder executable, looked up on `PATH` when not a path.
    pub binary: PathBuf,
}

impl FfmpegSinkOpts {
    /// Use `binary` as the encoder executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Command-line arguments for encoding a PNG stream on stdin into `out`.
///
/// `mov` selects ProRes 4444 with 10-bit alpha; `webm` selects VP9 with a `yuva420p` alpha
/// plane. `apng` is encoded in-process and has no `ffmpeg` arguments.
pub fn ffmpeg_args(
    format: ExportFormat,
    fps: Fps,
    out: &Path,
    overwrite: bool,
) -> CtaResult<Vec<OsString>> {
    let codec: &[&str] = match format {
        ExportFormat::Mov => &[
            "-c:v",
            "prores_ks",
            "-profile:v",
            "4444",
            "-pix_fmt",
            "yuva444p10le",
            "-vendor",
            "apl0",
        ],
        ExportFormat::Webm => &[
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuva420p",
            "-b:v",
            "8M",
            "-auto-alt-ref",
            "0",
        ],
        ExportFormat::Apng => {
            return Err(CtaError::validation(
                "apng output is encoded in-process, not through ffmpeg",
            ));
        }
    };

    let rate = if fps.den == 1 {
        fps.num.to_string()
    } else {
        format!("{}/{}", fps.num, fps.den)
    };

    let mut args: Vec<OsString> = Vec::with_capacity(20);
    args.push(if overwrite { "-y" } else { "-n" }.into());
    for a in [
        "-loglevel",
        "error",
        "-f",
        "image2pipe",
        "-c:v",
        "png",
        "-framerate",
    ] {
        args.push(a.into());
    }
    args.push(rate.into());
    args.push("-i".into());
    args.push("-".into());
    args.extend(codec.iter().map(OsString::from));
    args.push(out.as_os_str().to_owned());
    Ok(args)
}

/// Whether `bin -version` runs successfully.
pub fn is_encoder_on_path(bin: impl AsRef<OsStr>) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Sink that spawns `ffmpeg` and streams one PNG per frame into its stdin.
///
/// Writes to the pipe block while `ffmpeg` is busy, which is the backpressure signal for the
/// export loop.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    png: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            png: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Wait for the child and collect whatever it wrote to stderr.
    fn reap(&mut self) -> (Option<std::process::ExitStatus>, String) {
        drop(self.stdin.take());
        let status = self.child.take().and_then(|mut c| c.wait().ok());
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .and_then(Result::ok)
            .map(|b| String::from_utf8_lossy(&b).trim().to_owned())
            .unwrap_or_default();
        (status, stderr)
    }

    fn closed_error(&mut self, cause: std::io::Error) -> CtaError {
        let (status, stderr) = self.reap();
        let status = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into());
        CtaError::encoder_closed(format!(
            "write to ffmpeg stdin failed ({cause}); ffmpeg exited with {status}: {stderr}"
        ))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> CtaResult<()> {
        cfg.validate()?;
        let args = ffmpeg_args(cfg.format, cfg.fps, &cfg.out_path, cfg.overwrite)?;
        ensure_parent_dir(&cfg.out_path)?;
        check_overwrite(&cfg.out_path, cfg.overwrite)?;

        tracing::debug!(
            binary = %self.opts.binary.display(),
            out = %cfg.out_path.display(),
            format = ?cfg.format,
            "spawning ffmpeg"
        );
        let mut child = Command::new(&self.opts.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                tracing::debug!(error = %e, "ffmpeg spawn failed");
                CtaError::MissingEncoderBinary(self.opts.binary.display().to_string())
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CtaError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CtaError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CtaResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CtaError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(CtaError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        check_frame(cfg, frame)?;
        self.last_idx = Some(idx);

        let straight = frame.to_straight_rgba8();
        self.png.clear();
        PngEncoder::new_with_quality(&mut self.png, CompressionType::Fast, FilterType::Adaptive)
            .write_image(
                &straight,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| CtaError::encode(format!("png encode of frame {} failed: {e}", idx.0)))?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CtaError::encode("ffmpeg sink is already finalized"));
        };
        if let Err(e) = stdin.write_all(&self.png) {
            return Err(self.closed_error(e));
        }
        tracing::trace!(frame = idx.0, bytes = self.png.len(), "frame piped to ffmpeg");
        Ok(())
    }

    fn end(&mut self) -> CtaResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| CtaError::encode("ffmpeg sink not started"))?;
        if let Some(stdin) = self.stdin.as_mut()
            && let Err(e) = stdin.flush()
        {
            return Err(self.closed_error(e));
        }

        let (status, stderr) = self.reap();
        match status {
            Some(s) if s.success() => {
                tracing::debug!(out = %cfg.out_path.display(), "ffmpeg finished");
                Ok(())
            }
            Some(s) => {
                let _ = std::fs::remove_file(&cfg.out_path);
                Err(CtaError::encode(format!("ffmpeg exited with status {s}: {stderr}")))
            }
            None => Err(CtaError::encode("failed to wait for ffmpeg to finish")),
        }
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
        }
        let _ = self.reap();
        if let Some(cfg) = self.cfg.take() {
            let _ = std::fs::remove_file(&cfg.out_path);
            tracing::debug!(out = %cfg.out_path.display(), "ffmpeg sink aborted");
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
