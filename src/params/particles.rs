//! Particle spawning and lifecycle parameters.

use crate::error::ConfigError;

/// Particle simulation parameters
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// Ticks a particle lives after spawning
    pub lifespan_ticks: u32,

    /// Particles spawned per unit of calibrated intensity
    pub spawn_rate: f32,

    /// Calibration divisor for mean raw magnitude.
    /// Tuned to an unnormalized FFT of full-scale i16 samples; a transform
    /// with a different amplitude scale needs a different value.
    pub intensity_divisor: f32,

    /// Horizontal velocity range (pixels per tick)
    pub vx_range: (f32, f32),

    /// Vertical velocity range (pixels per tick, negative = upward)
    pub vy_range: (f32, f32),

    /// Drawn radius (pixels)
    pub radius_px: f32,

    /// Live-set ceiling; 0 = unbounded
    pub max_particles: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            lifespan_ticks: 50,
            spawn_rate: 5.0,
            intensity_divisor: 50_000.0,
            vx_range: (-2.0, 2.0),
            vy_range: (-5.0, -1.0),
            radius_px: 3.0,
            max_particles: 4096,
        }
    }
}

impl ParticleConfig {
    /// Live-set ceiling, `None` when unbounded
    pub fn cap(&self) -> Option<usize> {
        (self.max_particles > 0).then_some(self.max_particles)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lifespan_ticks == 0 {
            return Err(ConfigError::NonPositive("lifespan_ticks"));
        }
        if self.intensity_divisor <= 0.0 {
            return Err(ConfigError::NonPositive("intensity_divisor"));
        }
        if self.spawn_rate < 0.0 {
            return Err(ConfigError::NonPositive("spawn_rate"));
        }
        for (name, (min, max)) in [("vx_range", self.vx_range), ("vy_range", self.vy_range)] {
            if min >= max {
                return Err(ConfigError::Range { name, min, max });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_zero_is_unbounded() {
        let config = ParticleConfig {
            max_particles: 0,
            ..Default::default()
        };
        assert_eq!(config.cap(), None);
        assert_eq!(ParticleConfig::default().cap(), Some(4096));
    }

    #[test]
    fn test_rejects_empty_velocity_range() {
        let config = ParticleConfig {
            vy_range: (-1.0, -1.0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Range {
                name: "vy_range",
                ..
            })
        ));
    }
}
