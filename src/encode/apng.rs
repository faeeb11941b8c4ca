use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::encode::sink::{
    FrameSink, SinkConfig, check_frame, check_overwrite, ensure_parent_dir,
};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{CtaError, CtaResult};
use crate::render::surface::FrameRGBA;

type ApngWriter = png::Writer<BufWriter<File>>;

/// In-process encoder and muxer producing a looping animated PNG with straight alpha.
///
/// This is the in-process counterpart of the `ffmpeg` sinks and takes the place of an
/// in-process WebM writer: APNG keeps the alpha channel without an external binary. The
/// output is lossless, so there is no bitrate or quality setting; codec and container are
/// fixed and only the dimensions and frame rate from [`SinkConfig`] are used.
///
/// Frames stream into `<destination>.partial`, which is renamed onto the destination only
/// after the last frame is written.
#[derive(Default)]
pub struct ApngSink {
    writer: Option<ApngWriter>,
    partial: Option<PathBuf>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl ApngSink {
    /// Create an idle sink.
    pub fn new() -> Self {
        Self::default()
    }
}

fn partial_path(out: &std::path::Path) -> PathBuf {
    let mut s = out.as_os_str().to_owned();
    s.push(".partial");
    PathBuf::from(s)
}

fn png_err(e: png::EncodingError) -> CtaError {
    CtaError::encode(format!("apng: {e}"))
}

impl FrameSink for ApngSink {
    fn begin(&mut self, cfg: SinkConfig) -> CtaResult<()> {
        cfg.validate()?;
        let frames = u32::try_from(cfg.total_frames)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| CtaError::validation("apng needs 1..=u32::MAX frames"))?;
        let (delay_num, delay_den) = match (u16::try_from(cfg.fps.den), u16::try_from(cfg.fps.num)) {
            (Ok(n), Ok(d)) => (n, d),
            _ => return Err(CtaError::validation("apng frame rate must fit in u16/u16")),
        };

        ensure_parent_dir(&cfg.out_path)?;
        check_overwrite(&cfg.out_path, cfg.overwrite)?;

        let partial = partial_path(&cfg.out_path);
        let file = File::create(&partial).map_err(|e| {
            CtaError::encode(format!("failed to create '{}': {e}", partial.display()))
        })?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), cfg.width, cfg.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_animated(frames, 0).map_err(png_err)?;
        encoder.set_frame_delay(delay_num, delay_den).map_err(png_err)?;
        let writer = match encoder.write_header() {
            Ok(w) => w,
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                return Err(png_err(e));
            }
        };

        tracing::debug!(
            out = %cfg.out_path.display(),
            frames,
            "apng sink started"
        );
        self.writer = Some(writer);
        self.partial = Some(partial);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CtaResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CtaError::encode("apng sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(CtaError::encode("apng sink received out-of-order frame index"));
        }
        check_frame(cfg, frame)?;
        if self.frames_written >= cfg.total_frames {
            return Err(CtaError::encode(format!(
                "apng sink declared {} frames but received more",
                cfg.total_frames
            )));
        }
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CtaError::encode("apng sink is already finalized"))?;

        writer
            .write_image_data(&frame.to_straight_rgba8())
            .map_err(png_err)?;
        self.last_idx = Some(idx);
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> CtaResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| CtaError::encode("apng sink not started"))?;
        let partial = self
            .partial
            .take()
            .ok_or_else(|| CtaError::encode("apng sink has no partial file"))?;
        let writer = self
            .writer
            .take()
            .ok_or_else(|| CtaError::encode("apng sink is already finalized"))?;

        if self.frames_written != cfg.total_frames {
            drop(writer);
            let _ = std::fs::remove_file(&partial);
            return Err(CtaError::encode(format!(
                "apng sink received {} of {} frames",
                self.frames_written, cfg.total_frames
            )));
        }
        if let Err(e) = writer.finish() {
            let _ = std::fs::remove_file(&partial);
            return Err(png_err(e));
        }
        std::fs::rename(&partial, &cfg.out_path).map_err(|e| {
            CtaError::encode(format!(
                "failed to move '{}' to '{}': {e}",
                partial.display(),
                cfg.out_path.display()
            ))
        })?;
        tracing::debug!(out = %cfg.out_path.display(), frames = self.frames_written, "apng written");
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.writer.take());
        if let Some(partial) = self.partial.take() {
            let _ = std::fs::remove_file(&partial);
        }
        self.cfg = None;
    }
}

impl Drop for ApngSink {
    fn drop(&mut self) {
        if self.partial.is_some() {
            self.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/apng.rs"]
mod tests;
