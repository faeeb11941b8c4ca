//! ctaforge renders an animated "subscribe" call-to-action overlay and exports it as video.
//!
//! The core is a deterministic scene evaluator: a [`CtaConfig`] plus an absolute time fully
//! determine one frame. On top of it:
//!
//! - [`export_video`] / [`ExportJob`] drive the evaluator over synthetic frame times and
//!   stream the frames into a [`FrameSink`] (`ffmpeg` for `mov`/`webm`, in-process APNG)
//! - [`PreviewDriver`] drives it from the wall clock for interactive feedback
//! - [`ParticleSystem`] holds the seeded particle burst between frames
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod animation;
/// Frame sinks (`ffmpeg` process, in-process APNG, in-memory).
pub mod encode;
pub(crate) mod export;
pub(crate) mod particles;
pub(crate) mod preview;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Vec2};
pub use crate::foundation::error::{CtaError, CtaResult};
pub use crate::foundation::math::Rng64;

pub use crate::animation::ease::Ease;
pub use crate::animation::timeline::{
    BoxEnvelope, CLICK_BUMP_AMPLITUDE, CLICK_BUMP_MS, CURSOR_EXIT_DX, CURSOR_TARGET_OFFSET,
    CursorPose, CycleTiming, ENTER_OFFSET, ENTER_SCALE, EXIT_OFFSET, EXIT_SCALE_DROP,
    PRESS_HALF_WIDTH_MS, PRESS_SCALE, RESET_WINDOW_MS, SPAWN_WINDOW_MS, box_envelope,
    cursor_pose,
};

pub use crate::assets::color::Color;
pub use crate::assets::cursor::{CursorGlyph, DEFAULT_CURSOR_SVG, default_cursor};
pub use crate::assets::decode::{RasterImage, decode_image, parse_svg, rasterize_svg};
pub use crate::assets::store::RenderAssets;
pub use crate::assets::text::{FontAsset, TextBrushRgba8};

pub use crate::scene::config::{
    AnimationSpec, CtaConfig, CursorSpec, ExportFormat, FadeMode, ImageTransform, LayoutFormat,
    OutputSpec, Palette, ParticleShape, ParticleSpec, ResolutionTier, TextContent,
};

pub use crate::particles::noise::value_noise_2d;
pub use crate::particles::system::{
    LIFE_DECAY_PER_STEP, NOISE_ACCEL_FACTOR, Particle, ParticleSystem,
};

pub use crate::render::scene::{BOX_HEIGHT, CURSOR_SIZE, SceneRenderer, advance_particles};
pub use crate::render::surface::{FrameRGBA, Surface};

pub use crate::encode::apng::ApngSink;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ffmpeg_args, is_encoder_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};

pub use crate::export::destination::{
    DirectoryDestination, FixedDestination, SaveChoice, SaveDestination, SaveRequest,
    suggested_file_name,
};
pub use crate::export::job::{ExportHandle, ExportJob};
pub use crate::export::observer::{
    ChannelObserver, ExportEvent, ExportObserver, ExportOutcome, ExportState, NoopObserver,
};
pub use crate::export::pipeline::{
    CancelToken, ENCODER_QUEUE_FRAMES, YIELD_EVERY_FRAMES, default_sink_for, export_video,
    render_still,
};
pub use crate::export::plan::{EXPORT_FPS, ExportPlan};

pub use crate::preview::driver::{
    PreviewClock, PreviewDriver, PreviewPresenter, checkerboard_0rgb,
};
#[cfg(feature = "preview")]
pub use crate::preview::window::MinifbPresenter;
