use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CtaError, CtaResult};
use crate::render::surface::FrameRGBA;
use crate::scene::config::ExportFormat;

/// Configuration provided to a [`FrameSink`] at the start of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub total_frames: u64,
    /// Container/codec requested by the configuration.
    pub format: ExportFormat,
    /// Destination file.
    pub out_path: PathBuf,
    /// Replace an existing destination file.
    pub overwrite: bool,
}

impl SinkConfig {
    /// Reject zero sizes and frame rates.
    pub fn validate(&self) -> CtaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CtaError::validation("sink width/height must be non-zero"));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(CtaError::validation("sink fps must be non-zero"));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered frames in export order.
///
/// `push_frame` is called with strictly increasing [`FrameIndex`] values between one `begin`
/// and either `end` (success) or `abort` (failure or cancellation).
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CtaResult<()>;
    /// Push one frame. Blocks while the encoder is not ready for more input.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CtaResult<()>;
    /// Flush, finalize the container and make the destination file visible.
    fn end(&mut self) -> CtaResult<()>;
    /// Stop encoding and discard partial output. Must be safe to call in any state.
    fn abort(&mut self);
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> CtaResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CtaResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> CtaResult<()> {
        (**self).end()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether `abort` was called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CtaResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CtaResult<()> {
        if self.cfg.is_none() {
            return Err(CtaError::encode("in-memory sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(CtaError::encode("in-memory sink received out-of-order frame"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CtaResult<()> {
        if self.cfg.is_none() {
            return Err(CtaError::encode("in-memory sink not started"));
        }
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

/// Create the destination's parent directory if needed.
pub(crate) fn ensure_parent_dir(path: &Path) -> CtaResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Refuse to clobber an existing file unless overwriting is enabled.
pub(crate) fn check_overwrite(path: &Path, overwrite: bool) -> CtaResult<()> {
    if !overwrite && path.exists() {
        return Err(CtaError::validation(format!(
            "output file '{}' already exists",
            path.display()
        )));
    }
    Ok(())
}

/// Check frame geometry against the sink configuration.
pub(crate) fn check_frame(cfg: &SinkConfig, frame: &FrameRGBA) -> CtaResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(CtaError::encode(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != (frame.width as usize) * (frame.height as usize) * 4 {
        return Err(CtaError::encode(
            "frame data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
