use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use crate::animation::timeline::CycleTiming;
use crate::assets::store::RenderAssets;
use crate::encode::apng::ApngSink;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::export::destination::{SaveChoice, SaveDestination, SaveRequest};
use crate::export::observer::{ExportObserver, ExportOutcome, ExportState};
use crate::export::plan::ExportPlan;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CtaError, CtaResult};
use crate::particles::system::ParticleSystem;
use crate::render::scene::{SceneRenderer, advance_particles};
use crate::render::surface::{FrameRGBA, Surface};
use crate::scene::config::{CtaConfig, ExportFormat, OutputSpec};

/// Frames between cancellation checks and scheduler yields.
pub const YIELD_EVERY_FRAMES: u64 = 5;
/// Rendered frames allowed in flight to the encoder thread.
pub const ENCODER_QUEUE_FRAMES: usize = 4;

/// Shared flag that stops an export at its next yield point.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sink implied by `format`: `ffmpeg` for `mov`/`webm`, the in-process encoder for `apng`.
pub fn default_sink_for(format: ExportFormat, output: &OutputSpec) -> Box<dyn FrameSink> {
    match format {
        ExportFormat::Mov | ExportFormat::Webm => {
            Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&output.ffmpeg_path)))
        }
        ExportFormat::Apng => Box::new(ApngSink::new()),
    }
}

struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

enum Produced {
    All,
    EncoderStopped,
}

/// Render one full animation cycle and encode it.
///
/// The destination is chosen first; a cancelled save resolves through
/// [`ExportObserver::on_complete`] without rendering. Frames are rendered on the calling thread
/// at synthetic times `i * 1000 / 60` into one reused [`Surface`] and handed to `sink` on a
/// scoped encoder thread through a bounded queue, so a slow encoder throttles rendering.
/// Every [`YIELD_EVERY_FRAMES`] frames the loop checks `cancel` and yields the thread.
///
/// Any failure stops the loop, aborts the sink (discarding partial output) and is reported
/// through [`ExportObserver::on_error`] as well as the return value.
#[tracing::instrument(
    skip_all,
    fields(format = ?config.output.format, resolution = ?config.output.resolution)
)]
pub fn export_video(
    config: &CtaConfig,
    assets: &RenderAssets,
    destination: &mut dyn SaveDestination,
    sink: &mut dyn FrameSink,
    observer: &mut dyn ExportObserver,
    cancel: &CancelToken,
) -> CtaResult<ExportOutcome> {
    observer.on_state(ExportState::Initializing);
    match run_export(config, assets, destination, sink, observer, cancel) {
        Ok(outcome) => {
            observer.on_state(ExportState::Complete);
            match &outcome {
                ExportOutcome::Completed { frames, path } => {
                    tracing::info!(frames, path = %path.display(), "export complete");
                }
                ExportOutcome::SaveCancelled => tracing::info!("save cancelled; nothing rendered"),
            }
            observer.on_complete(&outcome);
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!(error = %e, "export failed");
            observer.on_state(ExportState::Failed);
            observer.on_error(&e);
            Err(e)
        }
    }
}

fn run_export(
    config: &CtaConfig,
    assets: &RenderAssets,
    destination: &mut dyn SaveDestination,
    sink: &mut dyn FrameSink,
    observer: &mut dyn ExportObserver,
    cancel: &CancelToken,
) -> CtaResult<ExportOutcome> {
    config.validate()?;
    let plan = ExportPlan::from_config(config)?;

    let request = SaveRequest::new(plan.format, plan.resolution);
    let out_path: PathBuf = match destination.choose(&request)? {
        SaveChoice::Path(p) => p,
        SaveChoice::Cancelled => return Ok(ExportOutcome::SaveCancelled),
    };

    tracing::info!(
        width = plan.canvas.width,
        height = plan.canvas.height,
        frames = plan.total_frames,
        out = %out_path.display(),
        "export starting"
    );

    let sink_cfg = SinkConfig {
        width: plan.canvas.width,
        height: plan.canvas.height,
        fps: plan.fps,
        total_frames: plan.total_frames,
        format: plan.format,
        out_path: out_path.clone(),
        overwrite: plan.overwrite,
    };
    let mut surface = Surface::new(plan.canvas.width, plan.canvas.height)?;
    let mut renderer = SceneRenderer::new();
    let mut particles = ParticleSystem::new();
    let total = plan.total_frames;

    std::thread::scope(|scope| -> CtaResult<ExportOutcome> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(ENCODER_QUEUE_FRAMES);

        let enc = scope.spawn(move || -> CtaResult<()> {
            sink.begin(sink_cfg)?;
            let mut received = 0u64;
            let mut push_all = || -> CtaResult<()> {
                while received < total {
                    let Ok(msg) = rx.recv() else {
                        return Err(CtaError::encode(format!(
                            "rendering stopped after {received} of {total} frames"
                        )));
                    };
                    sink.push_frame(msg.idx, &msg.frame)?;
                    received += 1;
                }
                Ok(())
            };
            let pushed = push_all();
            drop(rx);
            match pushed.and_then(|()| sink.end()) {
                Ok(()) => Ok(()),
                Err(e) => {
                    sink.abort();
                    Err(e)
                }
            }
        });

        observer.on_state(ExportState::Rendering { frame: 0, total });
        let produced = (|| -> CtaResult<Produced> {
            for i in 0..total {
                if i % YIELD_EVERY_FRAMES == 0 {
                    if cancel.is_cancelled() {
                        tracing::info!(frames_rendered = i, "export cancelled");
                        return Err(CtaError::Cancelled { frames_rendered: i });
                    }
                    std::thread::yield_now();
                }

                let t = plan.frame_time_ms(i);
                renderer.render(
                    &mut surface,
                    t,
                    config,
                    assets,
                    &mut particles,
                    plan.global_scale,
                )?;
                tracing::trace!(frame = i, time_ms = t, "frame queued");
                if tx
                    .send(FrameMsg {
                        idx: FrameIndex(i),
                        frame: surface.to_frame(),
                    })
                    .is_err()
                {
                    return Ok(Produced::EncoderStopped);
                }
                observer.on_progress(i + 1, total);
            }
            Ok(Produced::All)
        })();

        if matches!(produced, Ok(Produced::All)) {
            observer.on_state(ExportState::Finalizing);
        }
        drop(tx);
        let encoded = enc
            .join()
            .map_err(|_| CtaError::encode("encoder thread panicked"))?;

        match (produced, encoded) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(Produced::All), Ok(())) => Ok(ExportOutcome::Completed {
                frames: total,
                path: out_path,
            }),
            (Ok(Produced::EncoderStopped), Ok(())) => {
                Err(CtaError::encode("encoder thread stopped accepting frames"))
            }
        }
    })
}

/// Render the frame at `time_ms` the way an export at `fps` would, without encoding.
///
/// The particle simulation is replayed from the start of the enclosing cycle at the export
/// frame cadence so bursts look the same as in a full export.
pub fn render_still(
    config: &CtaConfig,
    assets: &RenderAssets,
    time_ms: f64,
    fps: Fps,
) -> CtaResult<FrameRGBA> {
    if !time_ms.is_finite() || time_ms < 0.0 {
        return Err(CtaError::validation("still time must be finite and >= 0"));
    }
    let canvas = config.physical_size();
    let global_scale = config.global_scale();
    let mut surface = Surface::new(canvas.width, canvas.height)?;
    let mut particles = ParticleSystem::new();

    let cycle_ms = CycleTiming::new(config.animation.duration).cycle_ms();
    let cycle_start = (time_ms / cycle_ms).floor() * cycle_ms;
    let logical = (
        f64::from(canvas.width) / global_scale,
        f64::from(canvas.height) / global_scale,
    );
    let mut k = 0u64;
    loop {
        let t = cycle_start + fps.frame_time_ms(FrameIndex(k));
        if t >= time_ms {
            break;
        }
        advance_particles(config, t, logical, &mut particles);
        k += 1;
    }

    SceneRenderer::new().render(
        &mut surface,
        time_ms,
        config,
        assets,
        &mut particles,
        global_scale,
    )?;
    Ok(surface.to_frame())
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
