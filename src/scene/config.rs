use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::assets::color::Color;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CtaError, CtaResult};

/// Immutable configuration snapshot for one overlay animation.
///
/// Every section carries `#[serde(default)]`, so a partial JSON document only needs to name
/// the fields it changes. The renderer and exporter only ever borrow this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaConfig {
    /// Header and sub-header strings plus their sizes.
    pub text: TextContent,
    /// Palette used before the action instant.
    pub cta_colors: Palette,
    /// Palette used after the action instant.
    pub subscribed_colors: Palette,
    /// Corner radius of the container box, in logical units.
    pub roundness: f64,
    /// Manual avatar pan/zoom, applied around the avatar center.
    pub image_transform: ImageTransform,
    /// Container envelope settings.
    pub animation: AnimationSpec,
    /// Cursor sub-timeline settings.
    pub cursor: CursorSpec,
    /// Particle burst settings.
    pub particles: ParticleSpec,
    /// Export target settings.
    pub output: OutputSpec,
    /// Landscape or portrait layout.
    pub format: LayoutFormat,
    /// Optional avatar image path, relative to the configuration file.
    pub avatar_path: Option<String>,
    /// Optional cursor glyph path; the built-in arrow is used when absent.
    pub cursor_path: Option<String>,
    /// Optional font file used for both text lines.
    pub font_path: Option<String>,
}

impl Default for CtaConfig {
    fn default() -> Self {
        Self {
            text: TextContent::default(),
            cta_colors: Palette {
                background: Color::rgb8(0xf3, 0xf4, 0xf6),
                text: Color::rgb8(0x00, 0x00, 0x00),
                under_text: Color::rgb8(0x66, 0x66, 0x66),
            },
            subscribed_colors: Palette {
                background: Color::rgb8(0xff, 0xff, 0xff),
                text: Color::rgb8(0x8b, 0x5c, 0xf6),
                under_text: Color::rgb8(0x66, 0x66, 0x66),
            },
            roundness: 100.0,
            image_transform: ImageTransform::default(),
            animation: AnimationSpec::default(),
            cursor: CursorSpec::default(),
            particles: ParticleSpec::default(),
            output: OutputSpec::default(),
            format: LayoutFormat::default(),
            avatar_path: None,
            cursor_path: None,
            font_path: None,
        }
    }
}

impl CtaConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> CtaResult<Self> {
        serde_json::from_str(s).map_err(|e| CtaError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CtaResult<Self> {
        serde_json::from_reader(r).map_err(|e| CtaError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CtaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CtaError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> CtaResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CtaError::serde(format!("serialize config JSON: {e}")))
    }

    /// Palette active for the given action state.
    pub fn palette(&self, actioned: bool) -> &Palette {
        if actioned {
            &self.subscribed_colors
        } else {
            &self.cta_colors
        }
    }

    /// Physical output size for the configured tier, supersampling and layout.
    pub fn physical_size(&self) -> Canvas {
        self.output.physical_size(self.format)
    }

    /// Uniform scale from logical layout units to physical pixels.
    pub fn global_scale(&self) -> f64 {
        global_scale_for(self.physical_size().width, self.format)
    }

    /// Check numeric ranges the renderer relies on.
    pub fn validate(&self) -> CtaResult<()> {
        fn finite(name: &str, v: f64) -> CtaResult<()> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(CtaError::validation(format!("{name} must be finite")))
            }
        }
        fn positive(name: &str, v: f64) -> CtaResult<()> {
            finite(name, v)?;
            if v > 0.0 {
                Ok(())
            } else {
                Err(CtaError::validation(format!("{name} must be > 0")))
            }
        }
        fn non_negative(name: &str, v: f64) -> CtaResult<()> {
            finite(name, v)?;
            if v >= 0.0 {
                Ok(())
            } else {
                Err(CtaError::validation(format!("{name} must be >= 0")))
            }
        }

        positive("animation.duration", self.animation.duration)?;
        positive("text.primary_text_size", self.text.primary_text_size)?;
        positive("text.under_text_size", self.text.under_text_size)?;
        positive("text.subscribed_text_size", self.text.subscribed_text_size)?;
        non_negative("roundness", self.roundness)?;
        positive("image_transform.scale", self.image_transform.scale)?;
        finite("image_transform.x", self.image_transform.x)?;
        finite("image_transform.y", self.image_transform.y)?;

        let p = &self.particles;
        if p.count > ParticleSpec::MAX_COUNT {
            return Err(CtaError::validation(format!(
                "particles.count must be <= {}",
                ParticleSpec::MAX_COUNT
            )));
        }
        non_negative("particles.speed", p.speed)?;
        non_negative("particles.min_size", p.min_size)?;
        non_negative("particles.max_size", p.max_size)?;
        if p.min_size > p.max_size {
            return Err(CtaError::validation(
                "particles.min_size must be <= particles.max_size",
            ));
        }
        finite("particles.gravity", p.gravity)?;
        finite("particles.rotation_speed", p.rotation_speed)?;
        positive("particles.life_min", p.life_min)?;
        positive("particles.life_max", p.life_max)?;
        if p.life_min > p.life_max {
            return Err(CtaError::validation(
                "particles.life_min must be <= particles.life_max",
            ));
        }
        non_negative("particles.noise_strength", p.noise_strength)?;
        positive("particles.noise_scale", p.noise_scale)?;
        finite("particles.damping", p.damping)?;
        if !(0.0..=1.0).contains(&p.damping) {
            return Err(CtaError::validation("particles.damping must be in [0, 1]"));
        }
        if p.enabled && p.count > 0 && p.colors.is_empty() {
            return Err(CtaError::validation(
                "particles.colors must not be empty when particles are enabled",
            ));
        }

        if !(1..=OutputSpec::MAX_SUPERSAMPLING).contains(&self.output.supersampling) {
            return Err(CtaError::validation(format!(
                "output.supersampling must be in 1..={}",
                OutputSpec::MAX_SUPERSAMPLING
            )));
        }
        if self.output.ffmpeg_path.trim().is_empty() {
            return Err(CtaError::validation("output.ffmpeg_path must not be empty"));
        }
        Ok(())
    }
}

/// `physical_width / reference_width` for a layout.
pub(crate) fn global_scale_for(physical_width: u32, format: LayoutFormat) -> f64 {
    f64::from(physical_width) / format.reference_width()
}

/// Header, sub-header and post-action header strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    /// Header shown before the action instant.
    pub primary_text: String,
    /// Header font size in logical units.
    pub primary_text_size: f64,
    /// Sub-header, shown throughout.
    pub under_text: String,
    /// Sub-header font size in logical units.
    pub under_text_size: f64,
    /// Header shown after the action instant.
    pub subscribed_text: String,
    /// Post-action header font size in logical units.
    pub subscribed_text_size: f64,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            primary_text: "Subscribe".to_owned(),
            primary_text_size: 72.0,
            under_text: "twitch.tv/mychannel".to_owned(),
            under_text_size: 36.0,
            subscribed_text: "SUBSCRIBED".to_owned(),
            subscribed_text_size: 72.0,
        }
    }
}

impl TextContent {
    /// Header string and size for the given action state.
    pub fn header(&self, actioned: bool) -> (&str, f64) {
        if actioned {
            (&self.subscribed_text, self.subscribed_text_size)
        } else {
            (&self.primary_text, self.primary_text_size)
        }
    }
}

/// Background and text colors for one action state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Container fill.
    pub background: Color,
    /// Header color.
    pub text: Color,
    /// Sub-header color.
    pub under_text: Color,
}

/// Manual avatar pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTransform {
    /// Zoom factor.
    pub scale: f64,
    /// Horizontal pan in logical units (pre-zoom).
    pub x: f64,
    /// Vertical pan in logical units (pre-zoom).
    pub y: f64,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Container envelope settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSpec {
    /// Enter curve family.
    #[serde(alias = "type")]
    pub curve: Ease,
    /// Duration multiplier `D`; one cycle lasts `6000·D` ms.
    pub duration: f64,
    /// Animate the vertical offset.
    pub position: bool,
    /// Animate the scale.
    pub scale: bool,
    /// Animate the opacity.
    pub opacity: bool,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            curve: Ease::ElasticOut,
            duration: 1.0,
            position: true,
            scale: true,
            opacity: true,
        }
    }
}

/// Cursor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSpec {
    /// Draw the cursor at all.
    pub visible: bool,
    /// Enter curve family.
    #[serde(alias = "animation_type")]
    pub curve: Ease,
}

impl Default for CursorSpec {
    fn default() -> Self {
        Self {
            visible: true,
            curve: Ease::ExpoOut,
        }
    }
}

/// How a particle's remaining life maps onto its paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeMode {
    /// Alpha follows life.
    #[default]
    Opacity,
    /// Size follows life.
    Scale,
    /// Alpha and size follow life.
    Both,
    /// No fade.
    None,
}

impl FadeMode {
    /// Map normalized remaining life to `(alpha, scale)`.
    pub fn apply(self, life_fraction: f64) -> (f64, f64) {
        let f = life_fraction.clamp(0.0, 1.0);
        match self {
            Self::Opacity => (f, 1.0),
            Self::Scale => (1.0, f),
            Self::Both => (f, f),
            Self::None => (1.0, 1.0),
        }
    }
}

/// Particle paint shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    /// Filled square with side `size`.
    #[default]
    Square,
    /// Filled circle with radius `size`.
    Circle,
    /// Tinted copy of the particle image, `2·size` across; squares when no image is loaded.
    Image,
}

/// Particle burst settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSpec {
    /// Spawn a burst at the action instant.
    pub enabled: bool,
    /// Particles per burst.
    pub count: u32,
    /// Mean launch speed in logical units per step.
    pub speed: f64,
    /// Smallest particle size.
    pub min_size: f64,
    /// Largest particle size.
    pub max_size: f64,
    /// Added to vertical velocity every step.
    pub gravity: f64,
    /// Spread of angular velocity, degrees per step.
    pub rotation_speed: f64,
    /// Shortest lifetime.
    pub life_min: f64,
    /// Longest lifetime.
    pub life_max: f64,
    /// Fade rule.
    #[serde(alias = "fade")]
    pub fade_mode: FadeMode,
    /// Noise acceleration strength; 0 disables the noise field.
    pub noise_strength: f64,
    /// Spatial period of the noise field in logical units.
    pub noise_scale: f64,
    /// Paint shape.
    pub shape: ParticleShape,
    /// Optional particle image path.
    pub image_path: Option<String>,
    /// Colors picked uniformly per particle.
    pub colors: Vec<Color>,
    /// Seed for the spawn generator.
    pub seed: u64,
    /// Per-step velocity multiplier; 1 leaves velocity untouched.
    pub damping: f64,
}

impl ParticleSpec {
    /// Upper bound accepted by [`CtaConfig::validate`].
    pub const MAX_COUNT: u32 = 10_000;
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 50,
            speed: 10.0,
            min_size: 5.0,
            max_size: 15.0,
            gravity: 0.5,
            rotation_speed: 0.0,
            life_min: 0.5,
            life_max: 1.5,
            fade_mode: FadeMode::Opacity,
            noise_strength: 0.0,
            noise_scale: 100.0,
            shape: ParticleShape::Square,
            image_path: None,
            colors: vec![
                Color::rgb8(0xff, 0x00, 0x00),
                Color::rgb8(0x00, 0xff, 0x00),
                Color::rgb8(0x00, 0x00, 0xff),
                Color::rgb8(0xff, 0xff, 0x00),
                Color::rgb8(0x8b, 0x5c, 0xf6),
            ],
            seed: 12345,
            damping: 1.0,
        }
    }
}

/// Layout orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutFormat {
    /// 16:9, reference width 1920.
    #[default]
    Landscape,
    /// 9:16, reference width 1080.
    Portrait,
}

impl LayoutFormat {
    /// Logical width that layout coordinates are authored against.
    pub fn reference_width(self) -> f64 {
        match self {
            Self::Landscape => 1920.0,
            Self::Portrait => 1080.0,
        }
    }

    /// Logical container width.
    pub fn box_width(self) -> f64 {
        match self {
            Self::Landscape => 800.0,
            Self::Portrait => 700.0,
        }
    }
}

/// Nominal output resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionTier {
    /// 854x480.
    #[serde(rename = "480p")]
    P480,
    /// 1280x720.
    #[serde(rename = "720p")]
    P720,
    /// 1920x1080.
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    /// 2560x1440.
    #[serde(rename = "2k")]
    K2,
    /// 3840x2160.
    #[serde(rename = "4k")]
    K4,
}

impl ResolutionTier {
    /// Landscape dimensions of this tier.
    pub fn landscape_size(self) -> (u32, u32) {
        match self {
            Self::P480 => (854, 480),
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
            Self::K2 => (2560, 1440),
            Self::K4 => (3840, 2160),
        }
    }

    /// Short label used in suggested file names.
    pub fn label(self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::K2 => "2k",
            Self::K4 => "4k",
        }
    }
}

/// Container/codec choice for an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// QuickTime with ProRes 4444 (external encoder).
    #[default]
    Mov,
    /// WebM with VP9 + alpha (external encoder).
    Webm,
    /// Animated PNG (in-process encoder).
    Apng,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mov => "mov",
            Self::Webm => "webm",
            Self::Apng => "png",
        }
    }

    /// Guess the format from a destination path's extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mov" => Some(Self::Mov),
            "webm" => Some(Self::Webm),
            "png" | "apng" => Some(Self::Apng),
            _ => None,
        }
    }
}

/// Export target settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSpec {
    /// Nominal resolution tier.
    pub resolution: ResolutionTier,
    /// Integer supersampling factor.
    #[serde(alias = "super_sampling")]
    pub supersampling: u32,
    /// Container/codec.
    #[serde(alias = "export_format")]
    pub format: ExportFormat,
    /// External encoder executable.
    pub ffmpeg_path: String,
    /// Overwrite an existing destination file.
    pub overwrite: bool,
}

impl OutputSpec {
    /// Upper bound accepted by [`CtaConfig::validate`].
    pub const MAX_SUPERSAMPLING: u32 = 4;

    /// Physical pixel size: tier dimensions times supersampling, axes swapped for portrait.
    pub fn physical_size(&self, format: LayoutFormat) -> Canvas {
        let (w, h) = self.resolution.landscape_size();
        let ss = self.supersampling.max(1);
        let (w, h) = (w * ss, h * ss);
        match format {
            LayoutFormat::Landscape => Canvas {
                width: w,
                height: h,
            },
            LayoutFormat::Portrait => Canvas {
                width: h,
                height: w,
            },
        }
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            resolution: ResolutionTier::P1080,
            supersampling: 1,
            format: ExportFormat::Mov,
            ffmpeg_path: "ffmpeg".to_owned(),
            overwrite: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
