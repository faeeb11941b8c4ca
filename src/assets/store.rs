use std::path::{Path, PathBuf};

use crate::assets::cursor::{CursorGlyph, default_cursor};
use crate::assets::decode::{RasterImage, decode_any, parse_svg};
use crate::assets::text::FontAsset;
use crate::foundation::error::{CtaError, CtaResult};
use crate::scene::config::CtaConfig;

/// Decoded, read-only inputs to the scene renderer.
///
/// The renderer only samples these; ownership stays with the caller and one set may be shared
/// by several renders.
#[derive(Clone, Debug, Default)]
pub struct RenderAssets {
    /// Avatar image; a grey disc is painted when absent.
    pub avatar: Option<RasterImage>,
    /// Cursor glyph; no cursor is painted when absent.
    pub cursor: Option<CursorGlyph>,
    /// Particle shape image for the `image` shape.
    pub particle_shape: Option<RasterImage>,
    /// Font for both text lines; text is skipped when absent.
    pub font: Option<FontAsset>,
}

impl RenderAssets {
    /// Assets with only the built-in cursor.
    pub fn builtin() -> CtaResult<Self> {
        Ok(Self {
            cursor: Some(default_cursor()?),
            ..Self::default()
        })
    }

    /// Load every path named by `config`, resolving relative paths under `base_dir`.
    ///
    /// The built-in cursor is used when `cursor_path` is unset.
    pub fn load(config: &CtaConfig, base_dir: impl AsRef<Path>) -> CtaResult<Self> {
        let base = base_dir.as_ref();
        let mut out = Self::builtin()?;

        if let Some(p) = &config.avatar_path {
            out.avatar = Some(load_raster(base, p)?);
        }
        if let Some(p) = &config.particles.image_path {
            out.particle_shape = Some(load_raster(base, p)?);
        }
        if let Some(p) = &config.cursor_path {
            let path = resolve_asset_path(base, p)?;
            let bytes = read_bytes(&path)?;
            out.cursor = Some(if is_svg(&path) {
                CursorGlyph::Vector(parse_svg(&bytes)?)
            } else {
                CursorGlyph::Raster(decode_any(&bytes, false)?)
            });
        }
        if let Some(p) = &config.font_path {
            let path = resolve_asset_path(base, p)?;
            out.font = Some(FontAsset::from_bytes(read_bytes(&path)?)?);
        }

        tracing::debug!(
            avatar = out.avatar.is_some(),
            particle_shape = out.particle_shape.is_some(),
            font = out.font.is_some(),
            "render assets loaded"
        );
        Ok(out)
    }
}

fn load_raster(base: &Path, source: &str) -> CtaResult<RasterImage> {
    let path = resolve_asset_path(base, source)?;
    let bytes = read_bytes(&path)?;
    decode_any(&bytes, is_svg(&path))
}

fn read_bytes(path: &Path) -> CtaResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        CtaError::validation(format!("failed to read asset '{}': {e}", path.display()))
    })
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Resolve an asset path: absolute paths are used as-is, relative ones are normalized and
/// joined onto `base`.
pub(crate) fn resolve_asset_path(base: &Path, source: &str) -> CtaResult<PathBuf> {
    let p = Path::new(source);
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    Ok(base.join(normalize_rel_path(source)?))
}

/// Normalize a configuration-relative asset path.
///
/// The result uses `/` separators, drops `.` segments, and rejects leading `/` or parent
/// traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> CtaResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CtaError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CtaError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CtaError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CtaError::validation("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
