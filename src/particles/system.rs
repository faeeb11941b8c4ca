use std::f64::consts::TAU;

use crate::animation::timeline::CycleTiming;
use crate::assets::color::Color;
use crate::foundation::core::Point;
use crate::foundation::math::{Fnv1a64, Rng64};
use crate::particles::noise::value_noise_2d;
use crate::scene::config::ParticleSpec;

/// Life removed from every particle per simulation step.
pub const LIFE_DECAY_PER_STEP: f64 = 0.02;
/// Scale applied to `noise_strength` before it is added to velocity.
pub const NOISE_ACCEL_FACTOR: f64 = 0.1;

/// One live particle. Positions and sizes are in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x, units per step.
    pub vx: f64,
    /// Velocity y, units per step.
    pub vy: f64,
    /// Remaining life.
    pub life: f64,
    /// Life at spawn.
    pub max_life: f64,
    /// Paint color.
    pub color: Color,
    /// Shape size.
    pub size: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Angular velocity, degrees per step.
    pub v_rotation: f64,
}

impl Particle {
    /// Remaining life normalized by the spawn life.
    pub fn life_fraction(&self) -> f64 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// The live particle set bound to one render target.
///
/// One instance must not be shared between concurrent renders; every export and preview
/// owns its own.
#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    last_burst_cycle: Option<u64>,
}

impl ParticleSystem {
    /// Empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every live particle and forget which cycle last burst.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.last_burst_cycle = None;
    }

    /// Cycle index of the most recent policy-driven burst.
    pub fn last_burst_cycle(&self) -> Option<u64> {
        self.last_burst_cycle
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// `true` when no particle is alive.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live particles in spawn order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Iterate live particles.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Apply the once-per-cycle spawn policy and the cycle-restart reset.
    ///
    /// A burst is spawned only while `t_ms` lies in the spawn window, the set is empty and no
    /// burst has fired yet for `cycle`. Particles that die inside the window therefore do not
    /// trigger a second burst. Returns `true` when a burst was spawned.
    pub fn apply_spawn_policy(
        &mut self,
        timing: CycleTiming,
        t_ms: f64,
        cycle: u64,
        origin: Point,
        spec: &ParticleSpec,
    ) -> bool {
        let mut spawned = false;
        if spec.enabled
            && timing.in_spawn_window(t_ms)
            && self.particles.is_empty()
            && self.last_burst_cycle != Some(cycle)
        {
            self.spawn_burst(origin, spec, cycle);
            self.last_burst_cycle = Some(cycle);
            spawned = true;
        }
        if timing.should_reset_particles(t_ms) {
            self.particles.clear();
        }
        spawned
    }

    /// Spawn `spec.count` particles at `origin`.
    ///
    /// The generator is seeded from `spec.seed` and `cycle`, so a burst is a pure function of
    /// configuration and cycle index.
    pub fn spawn_burst(&mut self, origin: Point, spec: &ParticleSpec, cycle: u64) {
        if spec.colors.is_empty() || spec.count == 0 {
            return;
        }
        let mut rng = Rng64::new(burst_seed(spec.seed, cycle));
        self.particles.reserve(spec.count as usize);

        for _ in 0..spec.count {
            let angle = rng.next_f64_01() * TAU;
            let speed = spec.speed * 0.5 + rng.next_f64_01() * spec.speed;
            let life = rng.range_f64(spec.life_min, spec.life_max);
            let color = spec.colors[rng.index(spec.colors.len())];
            let size = rng.range_f64(spec.min_size, spec.max_size);
            let rotation = rng.next_f64_01() * 360.0;
            let v_rotation = (rng.next_f64_01() - 0.5) * spec.rotation_speed;

            self.particles.push(Particle {
                x: origin.x,
                y: origin.y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life,
                max_life: life,
                color,
                size,
                rotation,
                v_rotation,
            });
        }
        tracing::trace!(count = spec.count, cycle, "particle burst spawned");
    }

    /// Advance every particle by one frame and drop the ones whose life ran out.
    ///
    /// Per particle: noise acceleration, damping, position integration, gravity, rotation,
    /// life decay.
    pub fn step(&mut self, spec: &ParticleSpec) {
        let noise_on = spec.noise_strength > 0.0 && spec.noise_scale > 0.0;
        let accel = spec.noise_strength * NOISE_ACCEL_FACTOR;

        for p in &mut self.particles {
            if noise_on {
                let n = value_noise_2d(spec.seed, p.x / spec.noise_scale, p.y / spec.noise_scale);
                let a = n * TAU;
                p.vx += a.cos() * accel;
                p.vy += a.sin() * accel;
            }
            p.vx *= spec.damping;
            p.vy *= spec.damping;

            p.x += p.vx;
            p.y += p.vy;
            p.vy += spec.gravity;
            p.rotation += p.v_rotation;
            p.life -= LIFE_DECAY_PER_STEP;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}

fn burst_seed(seed: u64, cycle: u64) -> u64 {
    let mut h = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    h.write_u64(seed);
    h.write_u64(cycle);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/particles/system.rs"]
mod tests;
