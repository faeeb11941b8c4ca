use crate::foundation::error::{CtaError, CtaResult};
use crate::foundation::math::unpremultiply_rgba8;

/// A rendered frame as RGBA8 pixels.
///
/// Frames leave the renderer **premultiplied**; the `premultiplied` flag keeps this explicit
/// at sink boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = vec![0u8; self.data.len()];
        unpremultiply_rgba8(&mut out, &self.data);
        out
    }
}

/// Caller-owned render target: a premultiplied RGBA8 pixel buffer with alpha.
///
/// The export pipeline allocates one per export and reuses it for every frame.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    /// Largest supported edge; `vello_cpu` pixmaps address pixels with `u16`.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> CtaResult<Self> {
        if width == 0 || height == 0 {
            return Err(CtaError::validation("surface dimensions must be non-zero"));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(CtaError::validation(format!(
                "surface {width}x{height} exceeds {}x{}",
                Self::MAX_DIM,
                Self::MAX_DIM
            )));
        }
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(width as u16, height as u16),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Copy the current contents into an owned frame.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
