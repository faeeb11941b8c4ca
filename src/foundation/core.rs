use crate::foundation::error::{CtaError, CtaResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Position of a frame in an export, counted from 0.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frame rate as the exact ratio `num / den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Frames per `den` seconds.
    pub num: u32,
    /// Seconds per `num` frames.
    pub den: u32,
}

impl Fps {
    /// Both parts must be non-zero.
    pub fn new(num: u32, den: u32) -> CtaResult<Self> {
        if num == 0 || den == 0 {
            return Err(CtaError::validation(format!(
                "frame rate {num}/{den} needs non-zero parts"
            )));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Milliseconds between two frames.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp of frame `idx` in milliseconds; frame 0 is at 0.
    pub fn frame_time_ms(self, idx: FrameIndex) -> f64 {
        idx.0 as f64 * self.frame_duration_ms()
    }

    /// Frames needed to cover `duration_ms`, rounded up.
    ///
    /// Exact multiples stay exact: `6600ms` at 60 fps is 396 frames even though the float
    /// product lands a hair above 396.
    pub fn frames_for_duration_ms(self, duration_ms: f64) -> u64 {
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            return 0;
        }
        let frames = duration_ms * self.as_f64() / 1000.0;
        (frames - 1e-9).ceil().max(0.0) as u64
    }
}

/// Pixel size of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Pixels per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
