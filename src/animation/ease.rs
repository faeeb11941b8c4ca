use std::f64::consts::PI;

/// Easing curve families used to map normalized animation progress.
///
/// Configuration files may also use the short tags `smooth`, `elastic` and `bounce`, which
/// select [`Ease::ExpoOut`], [`Ease::ElasticOut`] and [`Ease::BounceOut`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Exponential ease-out (snappy).
    #[default]
    #[serde(alias = "smooth")]
    ExpoOut,
    /// Elastic ease-out; overshoots and rings before settling.
    #[serde(alias = "elastic")]
    ElasticOut,
    /// Cubic ease-in/out.
    CubicInOut,
    /// Back ease-out; overshoots past 1 before settling.
    BackOut,
    /// Quadratic ease-in.
    QuadIn,
    /// Bounce ease-out.
    #[serde(alias = "bounce")]
    BounceOut,
}

impl Ease {
    /// Every supported family, in declaration order.
    pub const ALL: [Ease; 7] = [
        Ease::Linear,
        Ease::ExpoOut,
        Ease::ElasticOut,
        Ease::CubicInOut,
        Ease::BackOut,
        Ease::QuadIn,
        Ease::BounceOut,
    ];

    /// Apply this easing function to normalized progress `t`.
    ///
    /// `t` is clamped to `[0, 1]`; the output is not, so overshooting families keep their
    /// overshoot.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::ElasticOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::BackOut => {
                if t >= 1.0 {
                    return 1.0;
                }
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Self::QuadIn => t * t,
            Self::BounceOut => bounce_out(t),
        }
    }

    /// Return `true` for families whose output leaves `[0, 1]` mid-curve.
    pub fn overshoots(self) -> bool {
        matches!(self, Self::ElasticOut | Self::BackOut)
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
