//! Intensity-driven particle simulation.
//!
//! Particles are spawned along the vertical center of the viewport, drift
//! upward with random velocity and fade out over a fixed lifespan.

use glam::Vec2;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::ParticleConfig;
use crate::surface::RenderSurface;
use crate::visualizer::Rgb;

/// One particle, owned by its [`ParticleSystem`]
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Rgb,
    /// Ticks left; the particle is dead at 0 or below
    lifespan: i32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, color: Rgb, lifespan: i32) -> Self {
        Self {
            position,
            velocity,
            color,
            lifespan,
        }
    }

    /// Advance one tick: move by velocity, lose one tick of life
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.lifespan -= 1;
    }

    pub fn is_alive(&self) -> bool {
        self.lifespan > 0
    }

    pub fn lifespan(&self) -> i32 {
        self.lifespan
    }

    /// Opacity proportional to remaining life: 255 at spawn, 0 when dead
    pub fn alpha(&self, initial_lifespan: u32) -> u8 {
        let fraction = self.lifespan.max(0) as f32 / initial_lifespan.max(1) as f32;
        (255.0 * fraction.min(1.0)) as u8
    }
}

/// Live particle set with spawn/update/render per tick
pub struct ParticleSystem {
    particles: Vec<Particle>,
    config: ParticleConfig,
    rng: StdRng,
    /// Set while the cap is limiting spawns (warn once per episode)
    saturated: bool,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic system for reproducible runs
    pub fn seeded(config: ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            config,
            rng,
            saturated: false,
        }
    }

    /// Particles a given mean magnitude asks for, before any cap.
    ///
    /// `floor(intensity / intensity_divisor * spawn_rate)`; non-decreasing in
    /// `intensity`, 0 for silence or non-finite input.
    pub fn spawn_count(&self, intensity: f32) -> usize {
        let count = (intensity / self.config.intensity_divisor * self.config.spawn_rate).floor();
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    /// Spawn particles for this tick's mean intensity. Returns how many were added.
    ///
    /// Each particle starts at a random x in `[0, width)` on the vertical
    /// center line with a random drift and an upward vertical velocity.
    pub fn spawn(&mut self, intensity: f32, width: u32, height: u32, color: Rgb) -> usize {
        let wanted = self.spawn_count(intensity);
        let count = match self.config.cap() {
            Some(cap) => {
                let headroom = cap.saturating_sub(self.particles.len());
                if wanted > headroom {
                    if !self.saturated {
                        warn!(
                            "Particle cap {} reached, limiting spawns ({} requested)",
                            cap, wanted
                        );
                    }
                    self.saturated = true;
                } else {
                    self.saturated = false;
                }
                wanted.min(headroom)
            }
            None => wanted,
        };

        let width = (width as f32).max(1.0);
        let origin_y = height as f32 / 2.0;
        let (vx_min, vx_max) = self.config.vx_range;
        let (vy_min, vy_max) = self.config.vy_range;
        let lifespan = self.config.lifespan_ticks as i32;

        self.particles.reserve(count);
        for _ in 0..count {
            let position = Vec2::new(self.rng.gen_range(0.0..width), origin_y);
            let velocity = Vec2::new(
                self.rng.gen_range(vx_min..vx_max),
                self.rng.gen_range(vy_min..vy_max),
            );
            self.particles
                .push(Particle::new(position, velocity, color, lifespan));
        }

        count
    }

    /// Advance every particle, then drop the expired ones in place
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.advance();
        }
        self.particles.retain(Particle::is_alive);
        debug!("Live particles: {}", self.particles.len());
    }

    /// Draw each particle as a circle faded by remaining life
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        for particle in &self.particles {
            surface.fill_circle(
                particle.position,
                self.config.radius_px,
                particle.color,
                particle.alpha(self.config.lifespan_ticks),
            );
        }
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

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}
