//! Cycle breakpoints and the pure envelope functions evaluated once per frame.
//!
//! All times are milliseconds relative to the start of the current cycle (`t_ms`), except
//! [`CycleTiming::cycle_time_ms`] and [`CycleTiming::cycle_index`] which take absolute time.

use std::f64::consts::PI;

use crate::animation::ease::Ease;
use crate::foundation::core::Point;
use crate::scene::config::AnimationSpec;

/// Vertical offset at the start of the enter phase.
pub const ENTER_OFFSET: f64 = 100.0;
/// Vertical offset at the end of the exit phase.
pub const EXIT_OFFSET: f64 = 50.0;
/// Container scale at the start of the enter phase.
pub const ENTER_SCALE: f64 = 0.8;
/// Container scale lost over the exit phase.
pub const EXIT_SCALE_DROP: f64 = 0.1;
/// Length of the click bump after the action instant.
pub const CLICK_BUMP_MS: f64 = 200.0;
/// Peak relative growth of the click bump.
pub const CLICK_BUMP_AMPLITUDE: f64 = 0.05;
/// Width of the particle spawn window after the action instant.
pub const SPAWN_WINDOW_MS: f64 = 50.0;
/// Live particles are dropped while the cycle is younger than this.
pub const RESET_WINDOW_MS: f64 = 100.0;
/// Half-width of the cursor press pulse around the action instant.
pub const PRESS_HALF_WIDTH_MS: f64 = 100.0;
/// Cursor scale during the press pulse.
pub const PRESS_SCALE: f64 = 0.8;
/// Cursor target relative to the container center.
pub const CURSOR_TARGET_OFFSET: (f64, f64) = (200.0, 50.0);
/// Horizontal drift of the cursor over its exit.
pub const CURSOR_EXIT_DX: f64 = -100.0;

/// Breakpoints of one animation cycle, derived from the duration multiplier `D`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleTiming {
    d: f64,
}

impl CycleTiming {
    /// Timing for duration multiplier `d`. Non-positive or non-finite values fall back to 1.
    pub fn new(d: f64) -> Self {
        let d = if d.is_finite() && d > 0.0 { d } else { 1.0 };
        Self { d }
    }

    /// Duration multiplier.
    pub fn multiplier(self) -> f64 {
        self.d
    }

    /// Cycle length, `6000·D`.
    pub fn cycle_ms(self) -> f64 {
        6000.0 * self.d
    }

    /// End of the enter phase, `1000·D`.
    pub fn enter_end_ms(self) -> f64 {
        1000.0 * self.d
    }

    /// Action instant, `2500·D`.
    pub fn action_ms(self) -> f64 {
        2500.0 * self.d
    }

    /// Cursor exit start, `3000·D`.
    pub fn cursor_exit_ms(self) -> f64 {
        3000.0 * self.d
    }

    /// Container exit start, `5000·D`.
    pub fn exit_start_ms(self) -> f64 {
        5000.0 * self.d
    }

    /// Time into the current cycle.
    pub fn cycle_time_ms(self, time_ms: f64) -> f64 {
        time_ms.rem_euclid(self.cycle_ms())
    }

    /// Zero-based index of the cycle containing `time_ms`.
    pub fn cycle_index(self, time_ms: f64) -> u64 {
        (time_ms / self.cycle_ms()).floor().max(0.0) as u64
    }

    /// Post-action state: palette, header and text offset switch once `t_ms > 2500·D`.
    pub fn is_actioned(self, t_ms: f64) -> bool {
        t_ms > self.action_ms()
    }

    /// `t_ms ∈ [2500·D, 2500·D + 50)`.
    pub fn in_spawn_window(self, t_ms: f64) -> bool {
        let a = self.action_ms();
        t_ms >= a && t_ms < a + SPAWN_WINDOW_MS
    }

    /// The cycle just restarted; live particles must be cleared.
    pub fn should_reset_particles(self, t_ms: f64) -> bool {
        t_ms < RESET_WINDOW_MS
    }
}

/// Container transform/opacity at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxEnvelope {
    /// Vertical offset added to the container center, logical units.
    pub y_offset: f64,
    /// Container opacity.
    pub opacity: f64,
    /// Container scale around its center.
    pub scale: f64,
    /// Extra click-bump scale, applied after `scale`.
    pub click_bump: f64,
}

impl BoxEnvelope {
    /// Rest values.
    pub const REST: Self = Self {
        y_offset: 0.0,
        opacity: 1.0,
        scale: 1.0,
        click_bump: 1.0,
    };

    /// Combined scale factor.
    pub fn total_scale(&self) -> f64 {
        self.scale * self.click_bump
    }
}

/// Evaluate the container envelope at cycle time `t_ms`.
pub fn box_envelope(timing: CycleTiming, spec: &AnimationSpec, t_ms: f64) -> BoxEnvelope {
    let mut env = BoxEnvelope::REST;

    if t_ms < timing.enter_end_ms() {
        let e = spec.curve.apply(t_ms / timing.enter_end_ms());
        if spec.position {
            env.y_offset = ENTER_OFFSET * (1.0 - e);
        }
        if spec.opacity {
            env.opacity = e;
        }
        if spec.scale {
            env.scale = ENTER_SCALE + (1.0 - ENTER_SCALE) * e;
        }
    } else if t_ms > timing.exit_start_ms() {
        let e = Ease::ExpoOut.apply((t_ms - timing.exit_start_ms()) / (1000.0 * timing.d));
        if spec.opacity {
            env.opacity = 1.0 - e;
        }
        if spec.scale {
            env.scale = 1.0 - EXIT_SCALE_DROP * e;
        }
        if spec.position {
            env.y_offset = EXIT_OFFSET * e;
        }
    }

    let a = timing.action_ms();
    if t_ms > a && t_ms < a + CLICK_BUMP_MS {
        let u = (t_ms - a) / CLICK_BUMP_MS;
        env.click_bump = 1.0 + (u * PI).sin() * CLICK_BUMP_AMPLITUDE;
    }

    env.opacity = env.opacity.clamp(0.0, 1.0);
    env
}

/// Cursor placement at one instant, in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorPose {
    /// Hot-spot x.
    pub x: f64,
    /// Hot-spot y.
    pub y: f64,
    /// Press scale around the hot-spot.
    pub scale: f64,
}

/// Evaluate the cursor sub-timeline.
///
/// `logical_size` is the canvas size in logical units and `box_center` the container center
/// (including its vertical offset). Returns `None` while the cursor is not painted: before
/// `1000·D` (inclusive) and from `5000·D` on.
pub fn cursor_pose(
    timing: CycleTiming,
    curve: Ease,
    t_ms: f64,
    logical_size: (f64, f64),
    box_center: Point,
) -> Option<CursorPose> {
    if t_ms <= timing.enter_end_ms() || t_ms >= timing.exit_start_ms() {
        return None;
    }

    let (lw, lh) = logical_size;
    let target = Point::new(
        box_center.x + CURSOR_TARGET_OFFSET.0,
        box_center.y + CURSOR_TARGET_OFFSET.1,
    );
    let action = timing.action_ms();

    let (x, y) = if t_ms < action {
        let e = curve.apply((t_ms - timing.enter_end_ms()) / (1500.0 * timing.d));
        (lw * (1.0 - e) + target.x * e, lh * (1.0 - e) + target.y * e)
    } else if t_ms > timing.cursor_exit_ms() {
        let e = Ease::QuadIn.apply((t_ms - timing.cursor_exit_ms()) / (1000.0 * timing.d));
        (target.x + CURSOR_EXIT_DX * e, target.y + (lh / 2.0) * e)
    } else {
        (target.x, target.y)
    };

    let pressed = t_ms > action - PRESS_HALF_WIDTH_MS && t_ms < action + PRESS_HALF_WIDTH_MS;
    Some(CursorPose {
        x,
        y,
        scale: if pressed { PRESS_SCALE } else { 1.0 },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
