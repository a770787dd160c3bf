//! Audio analysis configuration and constants.

use crate::error::ConfigError;

/// What the extractor derives from each block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Magnitude of each positive-frequency bin (block_size / 2 values)
    #[default]
    Spectrum,

    /// Mean absolute sample value as a single-element vector
    Amplitude,
}

/// Window applied to the block before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// No windowing; magnitudes keep the raw transform scale
    #[default]
    Rectangular,

    /// Hann taper, reduces leakage at the cost of ~half the energy
    Hann,
}

/// Spectrum extraction and smoothing configuration
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Samples per block after downmix (must be a power of 2)
    pub block_size: usize,

    /// EMA weight of the previous smoothed value (dimensionless, [0, 1))
    /// 0.8 = new frame contributes 20%
    pub smoothing_factor: f32,

    pub mode: AnalysisMode,

    pub window: WindowFunction,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            block_size: 1024,
            smoothing_factor: 0.8,
            mode: AnalysisMode::Spectrum,
            window: WindowFunction::Rectangular,
        }
    }
}

impl SpectrumConfig {
    /// Number of bins the extractor produces per block
    pub fn bin_count(&self) -> usize {
        match self.mode {
            AnalysisMode::Spectrum => self.block_size / 2,
            AnalysisMode::Amplitude => 1,
        }
    }

    /// Frequency resolution of one bin (Hz)
    pub fn bin_width_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / self.block_size as f32
    }

    /// Validate configuration (block size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 2 || !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::SampleRate);
        }
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err(ConfigError::SmoothingFactor(self.smoothing_factor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SpectrumConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 512);

        // 44100 Hz / 1024 samples ≈ 43.07 Hz per bin
        assert!((config.bin_width_hz() - 43.07).abs() < 0.01);
    }

    #[test]
    fn test_amplitude_mode_has_one_bin() {
        let config = SpectrumConfig {
            mode: AnalysisMode::Amplitude,
            ..Default::default()
        };
        assert_eq!(config.bin_count(), 1);
    }

    #[test]
    fn test_rejects_bad_values() {
        let odd = SpectrumConfig {
            block_size: 1000,
            ..Default::default()
        };
        assert!(matches!(odd.validate(), Err(ConfigError::BlockSize(1000))));

        let frozen = SpectrumConfig {
            smoothing_factor: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            frozen.validate(),
            Err(ConfigError::SmoothingFactor(_))
        ));
    }
}
