//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::info;

use crate::audio::{AudioSource, BufferSource, CaptureSource, WavFileSource};
use crate::error::{AudioError, ConfigError};
use crate::params::{
    AnalysisMode, KeyBindings, ParticleConfig, RecordingConfig, RenderConfig, SpectrumConfig,
    WindowFunction,
};
use crate::visualizer::{Rgb, ShapeMode};

/// Analysis mode as typed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Spectrum,
    Amplitude,
}

/// Window function as typed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowArg {
    Rectangular,
    Hann,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Pulsewave")]
#[command(about = "Audio-reactive spectrum visualizer", long_about = None)]
pub struct Args {
    /// 16-bit PCM WAV file to visualize (default: live capture)
    #[arg(long, value_name = "WAV")]
    pub file: Option<PathBuf>,

    /// Synthetic sine tone instead of a file or device (Hz)
    #[arg(long, value_name = "HZ", conflicts_with = "file")]
    pub tone: Option<f32>,

    /// Length of the synthetic tone (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub tone_secs: f32,

    /// What each block is reduced to
    #[arg(long, value_enum, default_value = "spectrum")]
    pub mode: ModeArg,

    /// Window applied before the FFT
    #[arg(long, value_enum, default_value = "rectangular")]
    pub window: WindowArg,

    /// Samples per block (power of two)
    #[arg(long, value_name = "SAMPLES", default_value = "1024")]
    pub block_size: usize,

    /// EMA weight of the previous frame, in [0, 1)
    #[arg(long, value_name = "ALPHA", default_value = "0.8")]
    pub smoothing: f32,

    /// Horizontal slots across the window
    #[arg(long, value_name = "N", default_value = "60")]
    pub slots: usize,

    /// Tick rate
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Initial shape: bars, circles, diamonds, octagons
    #[arg(long, default_value = "bars")]
    pub shape: ShapeMode,

    /// Initial color: palette name or #rrggbb
    #[arg(long, default_value = "white")]
    pub color: Rgb,

    /// Live particle cap (0 = unbounded)
    #[arg(long, value_name = "N", default_value = "4096")]
    pub max_particles: usize,

    /// TOML file with key bindings layered over the defaults
    #[arg(long, value_name = "TOML")]
    pub bindings: Option<PathBuf>,

    /// Don't play the file audibly
    #[arg(long)]
    pub no_playback: bool,

    /// How long to wait for a captured block before giving up (ms)
    #[arg(long, value_name = "MS", default_value = "2000")]
    pub capture_timeout_ms: u64,

    /// Run without a window, rendering into an in-memory draw list
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many ticks (headless mode)
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Record frames to PNG (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Spectrum configuration from the analysis flags
    pub fn spectrum_config(&self) -> Result<SpectrumConfig, ConfigError> {
        let config = SpectrumConfig {
            block_size: self.block_size,
            smoothing_factor: self.smoothing,
            mode: match self.mode {
                ModeArg::Spectrum => AnalysisMode::Spectrum,
                ModeArg::Amplitude => AnalysisMode::Amplitude,
            },
            window: match self.window {
                WindowArg::Rectangular => WindowFunction::Rectangular,
                WindowArg::Hann => WindowFunction::Hann,
            },
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn particle_config(&self) -> Result<ParticleConfig, ConfigError> {
        let config = ParticleConfig {
            max_particles: self.max_particles,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        let config = RenderConfig {
            fps: self.fps,
            slot_count: self.slots,
            initial_color: self.color,
            initial_shape: self.shape,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Default bindings, or the `--bindings` file layered over them
    pub fn key_bindings(&self) -> Result<KeyBindings, ConfigError> {
        match &self.bindings {
            Some(path) => {
                let bindings = KeyBindings::load(path)?;
                info!("Key bindings loaded from {}", path.display());
                Ok(bindings)
            }
            None => Ok(KeyBindings::default()),
        }
    }

    /// Open the audio source the flags select (file, tone, or live capture)
    pub fn open_source(&self, spectrum: &SpectrumConfig) -> Result<Box<dyn AudioSource>, AudioError> {
        if let Some(path) = &self.file {
            return Ok(Box::new(WavFileSource::open(path, spectrum.block_size)?));
        }
        if let Some(freq_hz) = self.tone {
            info!("Tone: {}Hz for {}s", freq_hz, self.tone_secs);
            return Ok(Box::new(BufferSource::sine(
                freq_hz,
                i16::MAX / 2,
                self.tone_secs,
                spectrum.block_size,
                spectrum.sample_rate_hz,
            )));
        }
        Ok(Box::new(CaptureSource::open(
            spectrum.block_size,
            Duration::from_millis(self.capture_timeout_ms),
        )?))
    }

    /// Create recording configuration (and its output directories) if recording mode is enabled
    pub fn create_recording_config(&self) -> std::io::Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        let config = RecordingConfig::new(duration, self.fps);

        // Create output directories
        std::fs::create_dir_all(config.frames_dir())?;
        std::fs::create_dir_all(&config.output_dir)?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pulsewave").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let spectrum = args.spectrum_config().unwrap();
        assert_eq!(spectrum.block_size, 1024);
        assert_eq!(spectrum.mode, AnalysisMode::Spectrum);

        let render = args.render_config().unwrap();
        assert_eq!(render.slot_count, 60);
        assert_eq!(render.initial_shape, ShapeMode::Bars);
        assert_eq!(render.initial_color, Rgb::WHITE);
        assert_eq!(args.particle_config().unwrap().max_particles, 4096);
        assert!(args.key_bindings().unwrap().lookup("Space").is_some());
    }

    #[test]
    fn test_flags_flow_into_configs() {
        let args = parse(&[
            "--mode",
            "amplitude",
            "--window",
            "hann",
            "--shape",
            "diamonds",
            "--color",
            "#ff8800",
            "--slots",
            "32",
            "--max-particles",
            "0",
        ]);
        let spectrum = args.spectrum_config().unwrap();
        assert_eq!(spectrum.mode, AnalysisMode::Amplitude);
        assert_eq!(spectrum.window, WindowFunction::Hann);

        let render = args.render_config().unwrap();
        assert_eq!(render.initial_shape, ShapeMode::Diamonds);
        assert_eq!(render.initial_color, Rgb::new(0xff, 0x88, 0x00));
        assert_eq!(render.slot_count, 32);
        assert_eq!(args.particle_config().unwrap().cap(), None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Args::try_parse_from(["pulsewave", "--shape", "hexagons"]).is_err());
        assert!(Args::try_parse_from(["pulsewave", "--color", "ultraviolet"]).is_err());
        assert!(matches!(
            parse(&["--block-size", "1000"]).spectrum_config(),
            Err(ConfigError::BlockSize(1000))
        ));
        assert!(matches!(
            parse(&["--smoothing", "1.0"]).spectrum_config(),
            Err(ConfigError::SmoothingFactor(_))
        ));
        assert!(parse(&["--fps", "0"]).render_config().is_err());
    }

    #[test]
    fn test_tone_source() {
        let args = parse(&["--tone", "440", "--tone-secs", "0.5"]);
        let spectrum = args.spectrum_config().unwrap();
        let mut source = args.open_source(&spectrum).unwrap();
        assert_eq!(source.block_size(), 1024);
        assert!(source.next_block().unwrap().is_some());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let args = parse(&["--file", "/nonexistent/input.wav"]);
        let spectrum = args.spectrum_config().unwrap();
        assert!(matches!(
            args.open_source(&spectrum),
            Err(AudioError::File { .. })
        ));
    }
}
