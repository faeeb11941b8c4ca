use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::animation::timeline::{BoxEnvelope, CycleTiming, box_envelope, cursor_pose};
use crate::assets::color::Color;
use crate::assets::cursor::CursorGlyph;
use crate::assets::decode::RasterImage;
use crate::assets::store::RenderAssets;
use crate::assets::text::{FontAsset, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{CtaError, CtaResult};
use crate::particles::system::ParticleSystem;
use crate::render::avatar::{AVATAR_SIZE, avatar_disc};
use crate::render::cpu::{
    ImagePaint, affine_to_cpu, bezpath_to_cpu, color_to_cpu, premul_bytes_to_image,
};
use crate::render::shadow::{
    BOX_SHADOW_ALPHA, BOX_SHADOW_OFFSET_Y, BOX_SHADOW_SIGMA, CURSOR_SHADOW_ALPHA,
    CURSOR_SHADOW_OFFSET, CURSOR_SHADOW_SIGMA, drop_shadow, rounded_rect_shadow,
};
use crate::render::surface::Surface;
use crate::render::tint::TintScratch;
use crate::scene::config::{CtaConfig, ParticleShape};

/// Container height in logical units.
pub const BOX_HEIGHT: f64 = 200.0;
/// Avatar inset from the container's left edge.
const AVATAR_INSET: f64 = 30.0;
/// Text column offset from the container's left edge.
const TEXT_X: f64 = 200.0;
/// Horizontal text shift once actioned.
const TEXT_ACTION_SHIFT: f64 = 10.0;
/// Line height as a fraction of font size.
const LINE_HEIGHT_FACTOR: f64 = 0.72;
/// Gap between header and sub-header.
const TEXT_GAP: f64 = 15.0;
/// Cursor glyph edge in logical units.
pub const CURSOR_SIZE: f64 = 32.0;
/// Placeholder disc color when no avatar is loaded.
const AVATAR_PLACEHOLDER: Color = Color::rgba(0.8, 0.8, 0.8, 1.0);
const MAX_TINT_SIDE: f64 = 4096.0;
const PATH_TOLERANCE: f64 = 0.1;

/// Everything about one frame that follows from configuration and time alone.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameLayout {
    pub(crate) timing: CycleTiming,
    pub(crate) t_ms: f64,
    pub(crate) cycle: u64,
    pub(crate) actioned: bool,
    pub(crate) env: BoxEnvelope,
    pub(crate) global_scale: f64,
    pub(crate) logical: (f64, f64),
    pub(crate) center: Point,
    pub(crate) box_x: f64,
    pub(crate) box_y: f64,
    pub(crate) box_w: f64,
    /// Logical units to physical pixels.
    pub(crate) base: Affine,
    /// `base` plus the container's scale and click bump around its center.
    pub(crate) box_tr: Affine,
}

impl FrameLayout {
    pub(crate) fn evaluate(
        config: &CtaConfig,
        time_ms: f64,
        width: u32,
        height: u32,
        global_scale: f64,
    ) -> Self {
        let timing = CycleTiming::new(config.animation.duration);
        let t_ms = timing.cycle_time_ms(time_ms);
        let env = box_envelope(timing, &config.animation, t_ms);

        let logical = (
            f64::from(width) / global_scale,
            f64::from(height) / global_scale,
        );
        let box_w = config.format.box_width();
        let center = Point::new(logical.0 / 2.0, logical.1 / 2.0 + env.y_offset);

        let base = Affine::scale(global_scale);
        let box_tr = base
            * Affine::translate(center.to_vec2())
            * Affine::scale(env.total_scale())
            * Affine::translate(-center.to_vec2());

        Self {
            timing,
            t_ms,
            cycle: timing.cycle_index(time_ms),
            actioned: timing.is_actioned(t_ms),
            env,
            global_scale,
            logical,
            center,
            box_x: center.x - box_w / 2.0,
            box_y: center.y - BOX_HEIGHT / 2.0,
            box_w,
            base,
            box_tr,
        }
    }
}

/// Run the particle spawn policy and one simulation step for `time_ms`.
///
/// This is the only place the live set is mutated during rendering; warm-up code calls it
/// directly to replay the simulation without painting.
pub fn advance_particles(
    config: &CtaConfig,
    time_ms: f64,
    logical_size: (f64, f64),
    particles: &mut ParticleSystem,
) {
    let timing = CycleTiming::new(config.animation.duration);
    let t_ms = timing.cycle_time_ms(time_ms);
    let env = box_envelope(timing, &config.animation, t_ms);
    let origin = Point::new(logical_size.0 / 2.0, logical_size.1 / 2.0 + env.y_offset);
    particles.apply_spawn_policy(
        timing,
        t_ms,
        timing.cycle_index(time_ms),
        origin,
        &config.particles,
    );
    particles.step(&config.particles);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ShadowKey {
    w_bits: u64,
    radius_bits: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AvatarKey {
    image: usize,
    side: u32,
    scale_bits: u64,
    x_bits: u64,
    y_bits: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CursorKey {
    glyph: usize,
    px: u32,
}

#[derive(Clone)]
struct CursorPaints {
    glyph: ImagePaint,
    shadow: ImagePaint,
    shadow_pad: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u32,
    bold: bool,
}

struct TextState {
    font: Arc<Vec<u8>>,
    font_data: vello_cpu::peniko::FontData,
    layouts: HashMap<TextKey, Arc<parley::Layout<TextBrushRgba8>>>,
}

/// Scene evaluator: paints one complete overlay frame for a configuration and absolute time.
///
/// A renderer keeps only caches between calls (raster context, text layouts, shadow, avatar
/// and cursor rasters, tint scratch); every frame is fully determined by its inputs. Particle
/// state lives in the caller's [`ParticleSystem`].
pub struct SceneRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    text_engine: TextLayoutEngine,
    text: Option<TextState>,
    box_shadow: Option<(ShadowKey, ImagePaint, f64)>,
    avatar: Option<(AvatarKey, ImagePaint)>,
    cursor: Option<(CursorKey, CursorPaints)>,
    tint: TintScratch,
    warned_missing_font: bool,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer {
    /// Create a renderer with empty caches.
    pub fn new() -> Self {
        Self {
            ctx: None,
            text_engine: TextLayoutEngine::new(),
            text: None,
            box_shadow: None,
            avatar: None,
            cursor: None,
            tint: TintScratch::new(),
            warned_missing_font: false,
        }
    }

    /// Repaint `surface` for absolute time `time_ms`.
    ///
    /// Logical layout coordinates are authored against the layout's reference width and
    /// multiplied by `global_scale`. Steps `particles` exactly once.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        time_ms: f64,
        config: &CtaConfig,
        assets: &RenderAssets,
        particles: &mut ParticleSystem,
        global_scale: f64,
    ) -> CtaResult<()> {
        if !time_ms.is_finite() || time_ms < 0.0 {
            return Err(CtaError::render(format!(
                "frame time must be finite and >= 0, got {time_ms}"
            )));
        }
        if !global_scale.is_finite() || global_scale <= 0.0 {
            return Err(CtaError::render(format!(
                "global scale must be finite and > 0, got {global_scale}"
            )));
        }

        let width = surface.width();
        let height = surface.height();
        let frame = FrameLayout::evaluate(config, time_ms, width, height, global_scale);
        advance_particles(config, time_ms, frame.logical, particles);

        surface.clear();
        let w16 = u16::try_from(width).map_err(|_| CtaError::render("surface width exceeds u16"))?;
        let h16 =
            u16::try_from(height).map_err(|_| CtaError::render("surface height exceeds u16"))?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w16 && ctx.height() == h16 => ctx,
            _ => vello_cpu::RenderContext::new(w16, h16),
        };
        ctx.reset();

        let painted = self
            .paint_box(&mut ctx, &frame, config, assets)
            .and_then(|()| self.paint_particles(&mut ctx, &frame, config, assets, particles))
            .and_then(|()| self.paint_cursor(&mut ctx, &frame, config, assets));
        if painted.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(surface.pixmap_mut());
        }
        self.ctx = Some(ctx);

        tracing::trace!(
            time_ms,
            t_ms = frame.t_ms,
            actioned = frame.actioned,
            particles = particles.len(),
            "frame rendered"
        );
        painted
    }

    fn paint_box(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        f: &FrameLayout,
        config: &CtaConfig,
        assets: &RenderAssets,
    ) -> CtaResult<()> {
        if f.env.opacity <= 0.0 {
            return Ok(());
        }
        let palette = config.palette(f.actioned);
        let radius = config.roundness.clamp(0.0, f.box_w.min(BOX_HEIGHT) / 2.0);

        let layered = f.env.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(f.env.opacity as f32);
        }

        let (shadow, pad) = self.box_shadow_paint(f.box_w, radius)?;
        ctx.set_transform(affine_to_cpu(
            f.box_tr * Affine::translate((f.box_x - pad, f.box_y - pad + BOX_SHADOW_OFFSET_Y)),
        ));
        ctx.set_paint(shadow.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(shadow.w),
            f64::from(shadow.h),
        ));

        let body = kurbo::RoundedRect::new(
            f.box_x,
            f.box_y,
            f.box_x + f.box_w,
            f.box_y + BOX_HEIGHT,
            radius,
        );
        ctx.set_transform(affine_to_cpu(f.box_tr));
        ctx.set_paint(color_to_cpu(palette.background));
        ctx.fill_path(&bezpath_to_cpu(&body.to_path(PATH_TOLERANCE)));

        let ax = f.box_x + AVATAR_INSET;
        let ay = f.box_y + (BOX_HEIGHT - AVATAR_SIZE) / 2.0;
        match &assets.avatar {
            Some(img) => {
                let side = (AVATAR_SIZE * f.global_scale).ceil().clamp(1.0, 8192.0) as u32;
                let disc = self.avatar_paint(img, side, config)?;
                ctx.set_transform(affine_to_cpu(
                    f.box_tr
                        * Affine::translate((ax, ay))
                        * Affine::scale(AVATAR_SIZE / f64::from(side)),
                ));
                ctx.set_paint(disc.paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(disc.w),
                    f64::from(disc.h),
                ));
            }
            None => {
                let r = AVATAR_SIZE / 2.0;
                let disc = kurbo::Circle::new((ax + r, ay + r), r);
                ctx.set_transform(affine_to_cpu(f.box_tr));
                ctx.set_paint(color_to_cpu(AVATAR_PLACEHOLDER));
                ctx.fill_path(&bezpath_to_cpu(&disc.to_path(PATH_TOLERANCE)));
            }
        }

        match &assets.font {
            Some(font) => {
                let (header, header_size) = config.text.header(f.actioned);
                let under_size = config.text.under_text_size;
                let header_h = header_size * LINE_HEIGHT_FACTOR;
                let under_h = under_size * LINE_HEIGHT_FACTOR;
                let block_top = f.box_y + BOX_HEIGHT / 2.0 - (header_h + TEXT_GAP + under_h) / 2.0;
                let shift = if f.actioned { TEXT_ACTION_SHIFT } else { 0.0 };
                let x = f.box_x + TEXT_X + shift;

                self.draw_text(
                    ctx,
                    font,
                    header,
                    header_size,
                    true,
                    palette.text,
                    f.box_tr * Affine::translate((x, block_top)),
                )?;
                self.draw_text(
                    ctx,
                    font,
                    &config.text.under_text,
                    under_size,
                    false,
                    palette.under_text,
                    f.box_tr * Affine::translate((x, block_top + header_h + TEXT_GAP)),
                )?;
            }
            None => {
                if !self.warned_missing_font {
                    tracing::warn!("no font loaded; overlay text is skipped");
                    self.warned_missing_font = true;
                }
            }
        }

        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn paint_particles(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        f: &FrameLayout,
        config: &CtaConfig,
        assets: &RenderAssets,
        particles: &ParticleSystem,
    ) -> CtaResult<()> {
        let spec = &config.particles;
        for p in particles.iter() {
            let (alpha, scale) = spec.fade_mode.apply(p.life_fraction());
            if alpha <= 0.0 || scale <= 0.0 {
                continue;
            }
            let tr = f.base
                * Affine::translate((p.x, p.y))
                * Affine::rotate(p.rotation.to_radians())
                * Affine::scale(scale);

            match (spec.shape, &assets.particle_shape) {
                (ParticleShape::Image, Some(img)) => {
                    let size = p.size * 2.0;
                    let side = (size * scale * f.global_scale)
                        .ceil()
                        .clamp(1.0, MAX_TINT_SIDE) as u32;
                    let tinted = self.tint.tint(img, side, p.color);
                    let paint = premul_bytes_to_image(tinted, side, side)?;

                    ctx.set_transform(affine_to_cpu(
                        tr * Affine::translate((-size / 2.0, -size / 2.0))
                            * Affine::scale(size / f64::from(side)),
                    ));
                    ctx.set_paint(paint);
                    let layered = alpha < 1.0;
                    if layered {
                        ctx.push_opacity_layer(alpha as f32);
                    }
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(side),
                        f64::from(side),
                    ));
                    if layered {
                        ctx.pop_layer();
                    }
                }
                (ParticleShape::Circle, _) => {
                    ctx.set_transform(affine_to_cpu(tr));
                    ctx.set_paint(color_to_cpu(p.color.with_alpha_mul(alpha)));
                    let c = kurbo::Circle::new((0.0, 0.0), p.size);
                    ctx.fill_path(&bezpath_to_cpu(&c.to_path(PATH_TOLERANCE)));
                }
                _ => {
                    let h = p.size / 2.0;
                    ctx.set_transform(affine_to_cpu(tr));
                    ctx.set_paint(color_to_cpu(p.color.with_alpha_mul(alpha)));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-h, -h, h, h));
                }
            }
        }
        Ok(())
    }

    fn paint_cursor(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        f: &FrameLayout,
        config: &CtaConfig,
        assets: &RenderAssets,
    ) -> CtaResult<()> {
        if !config.cursor.visible {
            return Ok(());
        }
        let Some(glyph) = &assets.cursor else {
            return Ok(());
        };
        let Some(pose) = cursor_pose(f.timing, config.cursor.curve, f.t_ms, f.logical, f.center)
        else {
            return Ok(());
        };

        let px = (CURSOR_SIZE * f.global_scale).ceil().clamp(1.0, 2048.0) as u32;
        let paints = self.cursor_paints(glyph, px)?;
        let kx = CURSOR_SIZE / f64::from(paints.glyph.w);
        let ky = CURSOR_SIZE / f64::from(paints.glyph.h);
        let at = f.base * Affine::translate((pose.x, pose.y)) * Affine::scale(pose.scale);

        ctx.set_transform(affine_to_cpu(
            at * Affine::translate((CURSOR_SHADOW_OFFSET, CURSOR_SHADOW_OFFSET))
                * Affine::scale_non_uniform(kx, ky)
                * Affine::translate((-paints.shadow_pad, -paints.shadow_pad)),
        ));
        ctx.set_paint(paints.shadow.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(paints.shadow.w),
            f64::from(paints.shadow.h),
        ));

        ctx.set_transform(affine_to_cpu(at * Affine::scale_non_uniform(kx, ky)));
        ctx.set_paint(paints.glyph.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(paints.glyph.w),
            f64::from(paints.glyph.h),
        ));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        font: &FontAsset,
        text: &str,
        size: f64,
        bold: bool,
        color: Color,
        transform: Affine,
    ) -> CtaResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let layout = self.layout_for(font, text, size, bold)?;
        let Some(state) = &self.text else {
            return Ok(());
        };

        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(color_to_cpu(color));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&state.font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn layout_for(
        &mut self,
        font: &FontAsset,
        text: &str,
        size: f64,
        bold: bool,
    ) -> CtaResult<Arc<parley::Layout<TextBrushRgba8>>> {
        let stale = self
            .text
            .as_ref()
            .is_none_or(|t| !Arc::ptr_eq(&t.font, font.bytes()));
        if stale {
            self.text = Some(TextState {
                font: Arc::clone(font.bytes()),
                font_data: vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes().as_ref().clone()),
                    0,
                ),
                layouts: HashMap::new(),
            });
        }

        let key = TextKey {
            text: text.to_owned(),
            size_bits: (size as f32).to_bits(),
            bold,
        };
        if let Some(layout) = self.text.as_ref().and_then(|t| t.layouts.get(&key)) {
            return Ok(Arc::clone(layout));
        }

        let layout = Arc::new(self.text_engine.layout_line(
            text,
            font,
            size as f32,
            bold,
            TextBrushRgba8::default(),
        )?);
        if let Some(state) = &mut self.text {
            if state.layouts.len() >= 16 {
                state.layouts.clear();
            }
            state.layouts.insert(key, Arc::clone(&layout));
        }
        Ok(layout)
    }

    fn box_shadow_paint(&mut self, box_w: f64, radius: f64) -> CtaResult<(ImagePaint, f64)> {
        let key = ShadowKey {
            w_bits: box_w.to_bits(),
            radius_bits: radius.to_bits(),
        };
        if let Some((k, paint, pad)) = &self.box_shadow
            && *k == key
        {
            return Ok((paint.clone(), *pad));
        }
        let shadow = rounded_rect_shadow(
            box_w,
            BOX_HEIGHT,
            radius,
            BOX_SHADOW_SIGMA,
            BOX_SHADOW_ALPHA,
        )?;
        let paint = ImagePaint::from_raster(&shadow.image)?;
        let pad = f64::from(shadow.pad_px);
        self.box_shadow = Some((key, paint.clone(), pad));
        Ok((paint, pad))
    }

    fn avatar_paint(
        &mut self,
        img: &RasterImage,
        side: u32,
        config: &CtaConfig,
    ) -> CtaResult<ImagePaint> {
        let t = &config.image_transform;
        let key = AvatarKey {
            image: Arc::as_ptr(&img.rgba8_premul) as usize,
            side,
            scale_bits: t.scale.to_bits(),
            x_bits: t.x.to_bits(),
            y_bits: t.y.to_bits(),
        };
        if let Some((k, paint)) = &self.avatar
            && *k == key
        {
            return Ok(paint.clone());
        }
        let paint = ImagePaint::from_raster(&avatar_disc(img, side, t)?)?;
        self.avatar = Some((key, paint.clone()));
        Ok(paint)
    }

    fn cursor_paints(&mut self, glyph: &CursorGlyph, px: u32) -> CtaResult<CursorPaints> {
        let key = CursorKey {
            glyph: glyph.identity(),
            px,
        };
        if let Some((k, paints)) = &self.cursor
            && *k == key
        {
            return Ok(paints.clone());
        }
        let raster = glyph.rasterize(px)?;
        let sigma_px = CURSOR_SHADOW_SIGMA * f64::from(raster.width) / CURSOR_SIZE;
        let shadow = drop_shadow(&raster, sigma_px, CURSOR_SHADOW_ALPHA)?;
        let paints = CursorPaints {
            glyph: ImagePaint::from_raster(&raster)?,
            shadow: ImagePaint::from_raster(&shadow.image)?,
            shadow_pad: f64::from(shadow.pad_px),
        };
        self.cursor = Some((key, paints.clone()));
        Ok(paints)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
