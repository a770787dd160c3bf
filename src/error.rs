//! Error types for the audio, configuration, input and rendering layers.

use thiserror::Error;

/// Errors raised while opening or reading an audio source
#[derive(Error, Debug)]
pub enum AudioError {
    /// Audio file could not be opened or decoded
    #[error("Failed to read audio file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: hound::Error,
    },

    /// File or device delivers samples we cannot treat as 16-bit PCM
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// No capture or playback device available
    #[error("No audio {0} device found")]
    NoDevice(&'static str),

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    Config(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Failed to start or pause a stream
    #[error("Audio stream control failed: {0}")]
    StreamControl(String),

    /// Capture device produced no block within the receive timeout
    #[error("No audio block received within {0} ms")]
    CaptureTimeout(u64),
}

/// Errors raised by parameter validation and binding tables
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Block size must be an even power of two >= 2, got {0}")]
    BlockSize(usize),

    #[error("Sample rate must be > 0")]
    SampleRate,

    #[error("Smoothing factor must lie in [0, 1), got {0}")]
    SmoothingFactor(f32),

    #[error("{0} must be > 0")]
    NonPositive(&'static str),

    #[error("Invalid range for {name}: [{min}, {max}]")]
    Range {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("Unknown action '{0}' in key bindings")]
    UnknownAction(String),

    #[error("Failed to read key bindings file {path}: {source}")]
    BindingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse key bindings: {0}")]
    BindingsParse(#[from] toml::de::Error),
}

/// Rejected input at a visualizer setter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown shape mode '{0}'")]
    UnknownShape(String),

    #[error("Unknown color '{0}'")]
    UnknownColor(String),
}

/// GPU presenter failures
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Surface frame unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("Failed to save frame {path}: {source}")]
    Capture {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
