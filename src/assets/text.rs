use std::sync::Arc;

use crate::foundation::error::{CtaError, CtaResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Build from straight-alpha channels.
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Raw font file bytes (TTF/OTF).
#[derive(Clone, Debug)]
pub struct FontAsset {
    bytes: Arc<Vec<u8>>,
}

impl FontAsset {
    /// Wrap font bytes. Emptiness is rejected; parsing happens at registration.
    pub fn from_bytes(bytes: Vec<u8>) -> CtaResult<Self> {
        if bytes.is_empty() {
            return Err(CtaError::validation("font file is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    /// Shared font bytes.
    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }
}

/// Parley contexts plus the single registered font family used for all overlay text.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: Option<(Arc<Vec<u8>>, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family: None,
        }
    }

    /// Register `font` unless the same bytes are already registered; returns the family name.
    fn ensure_family(&mut self, font: &FontAsset) -> CtaResult<String> {
        if let Some((bytes, name)) = &self.family
            && Arc::ptr_eq(bytes, font.bytes())
        {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes().as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| CtaError::validation("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CtaError::validation("registered font family has no name"))?
            .to_string();

        self.family = Some((Arc::clone(font.bytes()), name.clone()));
        Ok(name)
    }

    /// Shape one unwrapped line of text.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &FontAsset,
        size_px: f32,
        bold: bool,
        brush: TextBrushRgba8,
    ) -> CtaResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CtaError::validation("text size must be finite and > 0"));
        }
        let family = self.ensure_family(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
