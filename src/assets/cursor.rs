use std::sync::Arc;

use crate::assets::decode::{RasterImage, parse_svg, rasterize_svg};
use crate::foundation::error::CtaResult;

/// Built-in arrow cursor, 32x32 logical units.
pub const DEFAULT_CURSOR_SVG: &str = r##"<svg width="32" height="32" viewBox="0 0 32 32" fill="none" xmlns="http://www.w3.org/2000/svg"><g fill="none" fill-rule="evenodd"><path fill="#FFF" d="M0 0l11.372 29.956 3.867-8.094 9.464 8.094 3.255-3.804-9.462-8.095 9.546-1.445z"/><path stroke="#000" stroke-width="1.5" d="M0 0l11.372 29.956 3.867-8.094 9.464 8.094 3.255-3.804-9.462-8.095 9.546-1.445z"/></g></svg>"##;

/// Cursor glyph source. Vector glyphs are rasterized at the exact physical size they are
/// painted at; raster glyphs are resampled.
#[derive(Clone, Debug)]
pub enum CursorGlyph {
    /// Decoded bitmap.
    Raster(RasterImage),
    /// Parsed SVG.
    Vector(Arc<usvg::Tree>),
}

impl CursorGlyph {
    /// Rasterize the glyph for a `px x px` footprint.
    pub fn rasterize(&self, px: u32) -> CtaResult<RasterImage> {
        match self {
            Self::Raster(img) => Ok(img.clone()),
            Self::Vector(tree) => rasterize_svg(tree, px.max(1), px.max(1)),
        }
    }

    /// Address of the shared glyph data; equal for clones of the same glyph.
    pub(crate) fn identity(&self) -> usize {
        match self {
            Self::Raster(img) => Arc::as_ptr(&img.rgba8_premul) as usize,
            Self::Vector(tree) => Arc::as_ptr(tree) as usize,
        }
    }
}

/// The built-in arrow cursor.
pub fn default_cursor() -> CtaResult<CursorGlyph> {
    Ok(CursorGlyph::Vector(parse_svg(DEFAULT_CURSOR_SVG.as_bytes())?))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cursor.rs"]
mod tests;
