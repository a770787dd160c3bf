//! Temporal smoothing and peak normalization of magnitude vectors.

/// Exponential moving average across ticks, normalized to a peak of 1.
///
/// Holds the only cross-tick numeric state of the pipeline: the running
/// average (in raw magnitude units) and its normalized copy that is drawn.
#[derive(Debug, Clone)]
pub struct SpectrumSmoother {
    /// Weight of the previous average
    alpha: f32,

    /// Running average, raw units
    average: Vec<f32>,

    /// Displayable vector: components in [0, 1], peak 1 unless silent
    smoothed: Vec<f32>,
}

impl SpectrumSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            average: Vec::new(),
            smoothed: Vec::new(),
        }
    }

    /// Blend `raw` into the average and return the normalized result.
    ///
    /// The first call (or a call whose length differs from the previous one)
    /// starts from a zero vector shaped like `raw`. When the blended peak is 0
    /// normalization is skipped and the zero vector is returned.
    pub fn update(&mut self, raw: &[f32]) -> &[f32] {
        if self.average.len() != raw.len() {
            self.reset(raw.len());
        }

        let alpha = self.alpha;
        for (avg, &r) in self.average.iter_mut().zip(raw) {
            *avg = alpha * *avg + (1.0 - alpha) * r.max(0.0);
        }

        let peak = self.average.iter().copied().fold(0.0f32, f32::max);
        if peak > 0.0 {
            for (out, &avg) in self.smoothed.iter_mut().zip(&self.average) {
                *out = (avg / peak).clamp(0.0, 1.0);
            }
        } else {
            self.smoothed.fill(0.0);
        }

        &self.smoothed
    }

    /// Last normalized vector (empty before the first update)
    pub fn smoothed(&self) -> &[f32] {
        &self.smoothed
    }

    /// Running average in raw magnitude units
    pub fn average(&self) -> &[f32] {
        &self.average
    }

    /// Zero the state for a new stream of `len` bins
    pub fn reset(&mut self, len: usize) {
        self.average.clear();
        self.average.resize(len, 0.0);
        self.smoothed.clear();
        self.smoothed.resize(len, 0.0);
    }
}
