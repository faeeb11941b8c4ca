use minifb::{Key, Window, WindowOptions};

use crate::foundation::error::{CtaError, CtaResult};
use crate::preview::driver::{PreviewPresenter, checkerboard_0rgb};
use crate::render::surface::Surface;

/// Desktop window presenter backed by `minifb`. Escape or closing the window ends the preview.
pub struct MinifbPresenter {
    window: Window,
    buffer: Vec<u32>,
}

impl MinifbPresenter {
    /// Open a `width x height` window.
    pub fn new(title: &str, width: usize, height: usize) -> CtaResult<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| CtaError::Other(anyhow::anyhow!("failed to open preview window: {e}")))?;
        Ok(Self {
            window,
            buffer: Vec::new(),
        })
    }
}

impl PreviewPresenter for MinifbPresenter {
    fn present(&mut self, surface: &Surface) -> CtaResult<()> {
        checkerboard_0rgb(surface, 16, &mut self.buffer);
        self.window
            .update_with_buffer(
                &self.buffer,
                surface.width() as usize,
                surface.height() as usize,
            )
            .map_err(|e| CtaError::Other(anyhow::anyhow!("preview window update failed: {e}")))
    }

    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }
}
