use std::time::{Duration, Instant};

use crate::assets::store::RenderAssets;
use crate::foundation::error::CtaResult;
use crate::particles::system::ParticleSystem;
use crate::render::scene::SceneRenderer;
use crate::render::surface::Surface;
use crate::scene::config::{CtaConfig, global_scale_for};

/// Maps wall-clock time to animation milliseconds since the clock started.
#[derive(Clone, Copy, Debug)]
pub struct PreviewClock {
    start: Instant,
}

impl Default for PreviewClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewClock {
    /// Clock starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart from zero.
    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    /// Milliseconds elapsed at `now`.
    pub fn time_ms_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64() * 1000.0
    }

    /// Milliseconds elapsed so far.
    pub fn now_ms(&self) -> f64 {
        self.time_ms_at(Instant::now())
    }
}

/// Where preview frames go.
pub trait PreviewPresenter {
    /// Show one frame.
    fn present(&mut self, surface: &Surface) -> CtaResult<()>;
    /// `false` once the user closed the preview.
    fn is_open(&self) -> bool;
}

/// Drives the scene renderer from a [`PreviewClock`].
///
/// The driver owns its own surface and particle set, so it never shares state with an export.
pub struct PreviewDriver {
    config: CtaConfig,
    assets: RenderAssets,
    surface: Surface,
    renderer: SceneRenderer,
    particles: ParticleSystem,
    clock: PreviewClock,
    global_scale: f64,
}

impl PreviewDriver {
    /// Refresh interval used by [`PreviewDriver::run`].
    pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

    /// Preview at `width x height` pixels; the layout scales to fit the width.
    pub fn new(config: CtaConfig, assets: RenderAssets, width: u32, height: u32) -> CtaResult<Self> {
        let surface = Surface::new(width, height)?;
        Ok(Self {
            global_scale: global_scale_for(width, config.format),
            config,
            assets,
            surface,
            renderer: SceneRenderer::new(),
            particles: ParticleSystem::new(),
            clock: PreviewClock::new(),
        })
    }

    /// Swap in an edited configuration; the animation keeps running.
    pub fn set_config(&mut self, config: CtaConfig) {
        self.global_scale = global_scale_for(self.surface.width(), config.format);
        self.config = config;
    }

    /// Current configuration.
    pub fn config(&self) -> &CtaConfig {
        &self.config
    }

    /// Live particles.
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Render the frame for `time_ms`.
    pub fn tick_at(&mut self, time_ms: f64) -> CtaResult<&Surface> {
        self.renderer.render(
            &mut self.surface,
            time_ms,
            &self.config,
            &self.assets,
            &mut self.particles,
            self.global_scale,
        )?;
        Ok(&self.surface)
    }

    /// Render the frame for the clock's current time.
    pub fn tick(&mut self) -> CtaResult<&Surface> {
        let t = self.clock.now_ms();
        self.tick_at(t)
    }

    /// Render and present frames until the presenter closes; returns the frame count.
    pub fn run(&mut self, presenter: &mut dyn PreviewPresenter) -> CtaResult<u64> {
        self.clock.restart();
        let mut frames = 0u64;
        tracing::info!(
            width = self.surface.width(),
            height = self.surface.height(),
            "preview started"
        );
        while presenter.is_open() {
            let started = Instant::now();
            let surface = self.tick()?;
            presenter.present(surface)?;
            frames += 1;
            if let Some(rest) = Self::FRAME_INTERVAL.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        tracing::info!(frames, "preview closed");
        Ok(frames)
    }
}

/// Composite a premultiplied surface over a grey checkerboard into `0RGB` words.
pub fn checkerboard_0rgb(surface: &Surface, cell: u32, out: &mut Vec<u32>) {
    let (w, h) = (surface.width(), surface.height());
    let cell = cell.max(1);
    out.clear();
    out.reserve((w as usize) * (h as usize));
    for (i, px) in surface.data().chunks_exact(4).enumerate() {
        let x = (i as u32) % w;
        let y = (i as u32) / w;
        let bg: u32 = if ((x / cell) + (y / cell)) % 2 == 0 { 0xcc } else { 0x99 };
        let inv = 255 - u32::from(px[3]);
        let ch = |c: u8| (u32::from(c) + (bg * inv + 127) / 255).min(255);
        out.push((ch(px[0]) << 16) | (ch(px[1]) << 8) | ch(px[2]));
    }
    debug_assert_eq!(out.len(), (w as usize) * (h as usize));
}

#[cfg(test)]
#[path = "../../tests/unit/preview/driver.rs"]
mod tests;
