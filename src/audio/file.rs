//! WAV file playback source (16-bit PCM).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};

use super::{AudioBlock, AudioSource};
use crate::error::AudioError;

/// Streams fixed-size blocks out of a 16-bit PCM WAV file
pub struct WavFileSource {
    reader: hound::WavReader<BufReader<File>>,
    channels: u16,
    sample_rate: u32,
    block_size: usize,
    finished: bool,
}

impl WavFileSource {
    /// Open a WAV file. Fails up front if the file is missing or not 16-bit integer PCM.
    pub fn open(path: &Path, block_size: usize) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path).map_err(|source| AudioError::File {
            path: path.display().to_string(),
            source,
        })?;

        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?} {}-bit (only 16-bit integer PCM is read)",
                spec.sample_format, spec.bits_per_sample
            )));
        }

        info!(
            "Audio file: {} ({} ch @ {}Hz, {:.1}s)",
            path.display(),
            spec.channels,
            spec.sample_rate,
            reader.duration() as f32 / spec.sample_rate as f32
        );
        if spec.channels > 1 {
            info!("Multi-channel input: keeping first channel only (decimation)");
        }

        Ok(Self {
            reader,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            block_size,
            finished: false,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl AudioSource for WavFileSource {
    fn next_block(&mut self) -> Result<Option<AudioBlock>, AudioError> {
        if self.finished {
            return Ok(None);
        }

        let len = self.block_size * self.channels as usize;
        let mut samples = Vec::with_capacity(len);
        for sample in self.reader.samples::<i16>().take(len) {
            match sample {
                Ok(s) => samples.push(s),
                Err(e) => {
                    warn!("Truncated audio data, ending stream: {}", e);
                    break;
                }
            }
        }

        if samples.len() < len {
            self.finished = true;
            return Ok(None);
        }
        Ok(Some(AudioBlock::new(samples, self.channels)))
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

    fn write_wav(path: &Path, channels: u16, bits: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as usize {
            if bits == 16 {
                writer.write_sample((i % 100) as i16).unwrap();
            } else {
                writer.write_sample((i % 100) as i32).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_reads_full_blocks_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 1, 16, 2500);

        let mut source = WavFileSource::open(&path, 1024).unwrap();
        assert_eq!(source.sample_rate(), 8000);
        assert_eq!(source.next_block().unwrap().unwrap().frames(), 1024);
        assert_eq!(source.next_block().unwrap().unwrap().frames(), 1024);
        // 452 frames left: short final block ends the stream
        assert!(source.next_block().unwrap().is_none());
        assert!(source.next_block().unwrap().is_none());
    }

    #[test]
    fn test_stereo_blocks_are_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 16, 64);

        let mut source = WavFileSource::open(&path, 32).unwrap();
        let block = source.next_block().unwrap().unwrap();
        assert_eq!(block.channels(), 2);
        assert_eq!(block.interleaved().len(), 64);
        assert_eq!(block.decimated().take(3).collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = WavFileSource::open(Path::new("/nonexistent/nothing.wav"), 1024);
        assert!(matches!(result, Err(AudioError::File { .. })));
    }

    #[test]
    fn test_rejects_24_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.wav");
        write_wav(&path, 1, 24, 16);

        let result = WavFileSource::open(&path, 8);
        assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
    }
}
