//! Audio sources: blocks of 16-bit PCM pulled once per tick.
//!
//! A source hands out [`AudioBlock`]s of a fixed frame count. Interleaved
//! multi-channel blocks are kept as-is; the spectrum extractor downmixes by
//! decimation.

mod capture;
mod file;
mod playback;

pub use capture::CaptureSource;
pub use file::WavFileSource;
pub use playback::{CpalPlayback, PlaybackController};

use crate::error::AudioError;

/// Fixed-length block of interleaved signed 16-bit samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlock {
    samples: Vec<i16>,
    channels: u16,
}

impl AudioBlock {
    /// `samples` must hold a whole number of frames
    pub fn new(samples: Vec<i16>, channels: u16) -> Self {
        let channels = channels.max(1);
        debug_assert_eq!(samples.len() % channels as usize, 0);
        Self { samples, channels }
    }

    pub fn mono(samples: Vec<i16>) -> Self {
        Self::new(samples, 1)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn interleaved(&self) -> &[i16] {
        &self.samples
    }

    /// First channel of every frame: stereo keeps even-indexed samples.
    /// Channels are dropped, not averaged.
    pub fn decimated(&self) -> impl Iterator<Item = i16> + '_ {
        self.samples.iter().step_by(self.channels as usize).copied()
    }
}

/// Producer of audio blocks (live device or decoded file)
pub trait AudioSource {
    /// Wait for the next full block.
    ///
    /// `Ok(None)` is end of stream, a normal termination. A short final block
    /// is never returned; it ends the stream instead.
    fn next_block(&mut self) -> Result<Option<AudioBlock>, AudioError>;

    /// Frames per block
    fn block_size(&self) -> usize;

    fn sample_rate(&self) -> u32;
}

/// Finite source over samples already in memory
#[derive(Debug, Clone)]
pub struct BufferSource {
    samples: Vec<i16>,
    channels: u16,
    block_size: usize,
    sample_rate: u32,
    cursor: usize,
}

impl BufferSource {
    pub fn new(samples: Vec<i16>, channels: u16, block_size: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            block_size,
            sample_rate,
            cursor: 0,
        }
    }

    /// Mono sine tone, `seconds` long
    pub fn sine(freq_hz: f32, amplitude: i16, seconds: f32, block_size: usize, sample_rate: u32) -> Self {
        let count = (seconds * sample_rate as f32) as usize;
        let samples = (0..count)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                ((2.0 * std::f32::consts::PI * freq_hz * t).sin() * amplitude as f32) as i16
            })
            .collect();
        Self::new(samples, 1, block_size, sample_rate)
    }

    /// Blocks left before end of stream
    pub fn remaining_blocks(&self) -> usize {
        (self.samples.len() - self.cursor) / (self.block_size * self.channels as usize)
    }
}

impl AudioSource for BufferSource {
    fn next_block(&mut self) -> Result<Option<AudioBlock>, AudioError> {
        let len = self.block_size * self.channels as usize;
        if self.samples.len() - self.cursor < len {
            return Ok(None);
        }
        let block = self.samples[self.cursor..self.cursor + len].to_vec();
        self.cursor += len;
        Ok(Some(AudioBlock::new(block, self.channels)))
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimation_keeps_even_samples() {
        let block = AudioBlock::new(vec![1, -1, 2, -2, 3, -3], 2);
        assert_eq!(block.frames(), 3);
        assert_eq!(block.decimated().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_buffer_source_drops_short_tail() {
        // 2.5 blocks of 4 frames
        let mut source = BufferSource::new(vec![0; 10], 1, 4, 44100);
        assert_eq!(source.remaining_blocks(), 2);
        assert!(source.next_block().unwrap().is_some());
        assert!(source.next_block().unwrap().is_some());
        assert!(source.next_block().unwrap().is_none());
        // End of stream is sticky
        assert!(source.next_block().unwrap().is_none());
    }

    #[test]
    fn test_buffer_source_stereo_block_length() {
        let mut source = BufferSource::new(vec![7; 16], 2, 4, 44100);
        let block = source.next_block().unwrap().unwrap();
        assert_eq!(block.interleaved().len(), 8);
        assert_eq!(block.frames(), 4);
    }
}
