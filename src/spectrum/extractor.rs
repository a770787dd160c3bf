//! Block → magnitude vector extraction.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::AudioBlock;
use crate::params::{AnalysisMode, SpectrumConfig, WindowFunction};

/// Transform provider: real block in, positive-frequency magnitudes out
pub trait Transform {
    /// Write `input.len() / 2` magnitudes into `out` (resized as needed)
    fn magnitudes(&mut self, input: &[f32], out: &mut Vec<f32>);
}

/// Forward FFT planned once for a fixed size
pub struct RustFftTransform {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl RustFftTransform {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }
}

impl Transform for RustFftTransform {
    fn magnitudes(&mut self, input: &[f32], out: &mut Vec<f32>) {
        debug_assert_eq!(input.len(), self.buffer.len());
        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Negative-frequency half mirrors the positive half for real input
        let half = self.buffer.len() / 2;
        out.clear();
        out.extend(self.buffer[..half].iter().map(|c| c.norm()));
    }
}

/// Converts audio blocks into raw magnitude vectors
pub struct SpectrumExtractor {
    mode: AnalysisMode,
    block_size: usize,
    window: Option<Vec<f32>>,
    transform: Box<dyn Transform>,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl SpectrumExtractor {
    /// Extractor backed by rustfft
    pub fn new(config: &SpectrumConfig) -> Self {
        Self::with_transform(config, Box::new(RustFftTransform::new(config.block_size)))
    }

    pub fn with_transform(config: &SpectrumConfig, transform: Box<dyn Transform>) -> Self {
        let window = match config.window {
            WindowFunction::Rectangular => None,
            WindowFunction::Hann => Some(
                (0..config.block_size)
                    .map(|i| hann_window(i, config.block_size))
                    .collect(),
            ),
        };

        Self {
            mode: config.mode,
            block_size: config.block_size,
            window,
            transform,
            input: Vec::with_capacity(config.block_size),
            output: Vec::with_capacity(config.bin_count()),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Magnitude vector for `block`, or `None` at end of stream.
    ///
    /// A missing block or one with the wrong frame count ends the stream.
    /// Multi-channel blocks are decimated to their first channel first.
    pub fn extract(&mut self, block: Option<&AudioBlock>) -> Option<&[f32]> {
        let block = block.filter(|b| b.frames() == self.block_size)?;

        self.input.clear();
        self.input.extend(block.decimated().map(f32::from));

        match self.mode {
            AnalysisMode::Spectrum => {
                if let Some(window) = &self.window {
                    for (x, w) in self.input.iter_mut().zip(window) {
                        *x *= w;
                    }
                }
                self.transform.magnitudes(&self.input, &mut self.output);
            }
            AnalysisMode::Amplitude => {
                let mean_abs =
                    self.input.iter().map(|x| x.abs()).sum::<f32>() / self.input.len() as f32;
                self.output.clear();
                self.output.push(mean_abs);
            }
        }

        Some(&self.output)
    }
}

/// Mean of a magnitude vector (0 for an empty one)
pub fn mean_intensity(magnitudes: &[f32]) -> f32 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    magnitudes.iter().sum::<f32>() / magnitudes.len() as f32
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
