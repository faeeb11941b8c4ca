use crate::animation::timeline::CycleTiming;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{CtaError, CtaResult};
use crate::scene::config::{CtaConfig, ExportFormat, ResolutionTier};

/// Frame rate of every export.
pub const EXPORT_FPS: u32 = 60;

/// Everything the export loop needs to know before the first frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportPlan {
    /// Physical frame size (tier x supersampling, oriented by layout format).
    pub canvas: Canvas,
    /// Logical-to-physical scale.
    pub global_scale: f64,
    /// Export frame rate.
    pub fps: Fps,
    /// `ceil(cycle_ms * fps / 1000)`.
    pub total_frames: u64,
    /// One animation cycle in milliseconds.
    pub cycle_ms: f64,
    /// Requested container/codec.
    pub format: ExportFormat,
    /// Requested resolution tier.
    pub resolution: ResolutionTier,
    /// Replace an existing destination file.
    pub overwrite: bool,
}

impl ExportPlan {
    /// Resolve output geometry and frame count from a configuration.
    pub fn from_config(config: &CtaConfig) -> CtaResult<Self> {
        let canvas = config.physical_size();
        if canvas.width == 0 || canvas.height == 0 {
            return Err(CtaError::validation("export size must be non-zero"));
        }
        let fps = Fps::new(EXPORT_FPS, 1)?;
        let cycle_ms = CycleTiming::new(config.animation.duration).cycle_ms();
        let total_frames = fps.frames_for_duration_ms(cycle_ms);
        if total_frames == 0 {
            return Err(CtaError::validation("export would produce no frames"));
        }
        Ok(Self {
            canvas,
            global_scale: config.global_scale(),
            fps,
            total_frames,
            cycle_ms,
            format: config.output.format,
            resolution: config.output.resolution,
            overwrite: config.output.overwrite,
        })
    }

    /// Synthetic timestamp of frame `i`: `i * 1000 / fps`.
    pub fn frame_time_ms(&self, i: u64) -> f64 {
        self.fps.frame_time_ms(FrameIndex(i))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/plan.rs"]
mod tests;
