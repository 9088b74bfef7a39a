//! Sparks rising from held keys.
//!
//! Emission runs on its own fixed clock: every [`EMISSION_INTERVAL`] of
//! accumulated time spawns one particle per source, independent of frame
//! rate. A long frame emits several rounds, a short one may emit none.

use std::time::Duration;

use pianofall_types::{hsv_to_rgb, Color, DrawCommand, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const EMISSION_INTERVAL: Duration = Duration::from_millis(10);

/// Downward acceleration in pixels/s².
pub const GRAVITY: f32 = 500.0;

/// Every particle starts with this much life and dies below zero.
pub const INITIAL_LIFE: f32 = 1.0;

/// Alpha of a fresh particle.
pub const MAX_ALPHA: f32 = 200.0;

pub const DEFAULT_MAX_PARTICLES: usize = 4096;

const SPREAD_X: f32 = 60.0;
const LAUNCH_SPEED: f32 = 600.0;
const LAUNCH_JITTER: f32 = 20.0;
const MIN_SIZE: f32 = 2.0;
const MAX_SIZE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub life: f32,
}

impl Particle {
    /// Semi-implicit Euler step.
    pub fn step(&mut self, dt: f32) {
        self.vy += GRAVITY * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.life -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life >= 0.0
    }

    /// Hue drifts from cyan toward magenta while fading out.
    pub fn color(&self) -> (Color, u8) {
        let v = self.life / INITIAL_LIFE;
        let color = hsv_to_rgb(0.5 + (1.0 - v) / 3.0, 1.0, 1.0);
        let alpha = (MAX_ALPHA * v).round().clamp(0.0, 255.0) as u8;
        (color, alpha)
    }
}

/// A spawn point, valid for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSource {
    pub x: f32,
    pub y: f32,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    sources: Vec<EmissionSource>,
    accumulator: Duration,
    max_particles: usize,
    /// Emissions skipped because the ceiling was reached.
    skipped: u64,
    rng: StdRng,
}

impl ParticleSystem {
    /// `seed` makes spawning reproducible; `None` seeds from the OS.
    pub fn new(max_particles: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            particles: Vec::new(),
            sources: Vec::new(),
            accumulator: Duration::ZERO,
            max_particles,
            skipped: 0,
            rng,
        }
    }

    /// Replace all emission sources.
    pub fn set_sources(&mut self, sources: Vec<EmissionSource>) {
        self.sources = sources;
    }

    pub fn sources(&self) -> &[EmissionSource] {
        &self.sources
    }

    pub fn update(&mut self, dt: Duration) {
        self.accumulator += dt;
        while self.accumulator >= EMISSION_INTERVAL {
            self.accumulator -= EMISSION_INTERVAL;
            self.emit();
        }

        let dt = dt.as_secs_f32();
        for particle in &mut self.particles {
            particle.step(dt);
        }
        self.particles.retain(Particle::is_alive);
    }

    fn emit(&mut self) {
        for i in 0..self.sources.len() {
            if self.particles.len() >= self.max_particles {
                let skipped = self.sources.len() - i;
                if self.skipped == 0 {
                    log::debug!(target: "particles", "particle ceiling {} reached", self.max_particles);
                }
                self.skipped += skipped as u64;
                return;
            }
            let source = self.sources[i];
            let vx = self.rng.gen_range(-1.0f32..=1.0) * SPREAD_X;
            let vy = -LAUNCH_SPEED - LAUNCH_JITTER * self.rng.gen_range(-1.0f32..=1.0);
            let size = self.rng.gen_range(MIN_SIZE..=MAX_SIZE);
            self.particles.push(Particle {
                x: source.x,
                y: source.y,
                vx,
                vy,
                size,
                life: INITIAL_LIFE,
            });
        }
    }

    /// Snapshot of the live particles as circles, oldest first.
    pub fn draw(&self) -> impl Iterator<Item = DrawCommand> + '_ {
        self.particles.iter().map(|p| {
            let (color, alpha) = p.color();
            DrawCommand::FilledCircle {
                center: Point::new(p.x, p.y),
                radius: p.size,
                color,
                alpha,
            }
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> ParticleSystem {
        ParticleSystem::new(DEFAULT_MAX_PARTICLES, Some(7))
    }

    fn one_source() -> Vec<EmissionSource> {
        vec![EmissionSource { x: 100.0, y: 500.0 }]
    }

    #[test]
    fn fifty_ms_emits_five() {
        let mut ps = system();
        ps.set_sources(one_source());
        ps.update(Duration::from_millis(50));
        assert_eq!(ps.len(), 5);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut ps = system();
        ps.set_sources(one_source());
        ps.update(Duration::from_millis(4));
        assert_eq!(ps.len(), 0);
        ps.update(Duration::from_millis(4));
        assert_eq!(ps.len(), 0);
        ps.update(Duration::from_millis(4));
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn one_particle_per_source_per_round() {
        let mut ps = system();
        ps.set_sources(vec![
            EmissionSource { x: 0.0, y: 0.0 },
            EmissionSource { x: 10.0, y: 0.0 },
            EmissionSource { x: 20.0, y: 0.0 },
        ]);
        ps.update(Duration::from_millis(20));
        assert_eq!(ps.len(), 6);
    }

    #[test]
    fn spawn_ranges() {
        let mut ps = system();
        ps.set_sources(one_source());
        ps.update(Duration::from_millis(10));
        let mut ps_fresh = system();
        ps_fresh.set_sources(one_source());
        ps_fresh.update(Duration::from_millis(1000));
        for p in ps_fresh.particles() {
            assert!(p.size >= MIN_SIZE && p.size <= MAX_SIZE);
        }
        let p = ps.particles()[0];
        // One 10ms step after launch
        let dt = 0.01f32;
        let launch_vx = p.vx;
        let launch_vy = p.vy - GRAVITY * dt;
        assert!(launch_vx.abs() <= SPREAD_X);
        assert!(launch_vy >= -LAUNCH_SPEED - LAUNCH_JITTER - 1e-3);
        assert!(launch_vy <= -LAUNCH_SPEED + LAUNCH_JITTER + 1e-3);
        assert!((p.x - (100.0 + launch_vx * dt)).abs() < 1e-3);
        assert!((p.life - 0.99).abs() < 1e-6);
    }

    #[test]
    fn life_decreases_and_particles_die_below_zero() {
        let mut ps = system();
        ps.set_sources(one_source());
        ps.update(Duration::from_millis(250));
        assert_eq!(ps.len(), 25);
        ps.set_sources(Vec::new());

        let mut last: Vec<f32> = ps.particles().iter().map(|p| p.life).collect();
        for _ in 0..3 {
            ps.update(Duration::from_millis(250));
            let now: Vec<f32> = ps.particles().iter().map(|p| p.life).collect();
            assert_eq!(now.len(), last.len());
            for (a, b) in now.iter().zip(&last) {
                assert!(a < b);
            }
            last = now;
        }
        // life is exactly zero now: still alive
        assert!(ps.particles().iter().all(|p| p.life == 0.0));
        assert_eq!(ps.len(), 25);

        ps.update(Duration::from_millis(1));
        assert!(ps.is_empty());
    }

    #[test]
    fn survivors_keep_their_order() {
        let mut ps = system();
        ps.set_sources(one_source());
        for _ in 0..10 {
            ps.update(Duration::from_millis(50));
        }
        ps.set_sources(Vec::new());
        let before: Vec<f32> = ps.particles().iter().map(|p| p.vx).collect();
        assert_eq!(before.len(), 50);
        // The three oldest batches fall below zero
        ps.update(Duration::from_millis(620));
        let after: Vec<f32> = ps.particles().iter().map(|p| p.vx).collect();
        assert_eq!(after.len(), 35);
        assert_eq!(&before[15..], &after[..]);
    }

    #[test]
    fn ceiling_skips_new_emissions() {
        let mut ps = ParticleSystem::new(3, Some(1));
        ps.set_sources(vec![
            EmissionSource { x: 0.0, y: 0.0 },
            EmissionSource { x: 1.0, y: 0.0 },
        ]);
        ps.update(Duration::from_millis(20));
        assert_eq!(ps.len(), 3);
        assert_eq!(ps.skipped(), 1);
    }

    #[test]
    fn color_fades_with_life() {
        let fresh = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            size: 3.0,
            life: 1.0,
        };
        let (color, alpha) = fresh.color();
        assert_eq!(color, Color::new(0, 255, 255));
        assert_eq!(alpha, 200);

        let dying = Particle { life: 0.0, ..fresh };
        let (color, alpha) = dying.color();
        assert_eq!(alpha, 0);
        // hue 5/6: magenta
        assert_eq!(color, Color::new(255, 0, 255));
    }

    #[test]
    fn seeded_systems_are_reproducible() {
        let mut a = system();
        let mut b = system();
        a.set_sources(one_source());
        b.set_sources(one_source());
        a.update(Duration::from_millis(30));
        b.update(Duration::from_millis(30));
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn draw_emits_one_circle_per_particle() {
        let mut ps = system();
        ps.set_sources(one_source());
        ps.update(Duration::from_millis(30));
        let cmds: Vec<DrawCommand> = ps.draw().collect();
        assert_eq!(cmds.len(), 3);
        assert!(cmds
            .iter()
            .all(|c| matches!(c, DrawCommand::FilledCircle { alpha, .. } if *alpha > 190)));
    }
}
