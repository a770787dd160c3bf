//! Live capture from the default input device.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{info, warn};

use super::{AudioBlock, AudioSource};
use crate::error::AudioError;

/// Blocks buffered between the device callback and the frame loop
const CHANNEL_DEPTH: usize = 8;

/// Collects callback-sized chunks into whole blocks
struct BlockAssembler {
    pending: Vec<i16>,
    block_len: usize,
    channels: u16,
    tx: Sender<AudioBlock>,
}

impl BlockAssembler {
    fn push(&mut self, samples: impl Iterator<Item = i16>) {
        for sample in samples {
            self.pending.push(sample);
            if self.pending.len() == self.block_len {
                let block = AudioBlock::new(
                    std::mem::replace(&mut self.pending, Vec::with_capacity(self.block_len)),
                    self.channels,
                );
                // The callback must never wait; a slow consumer loses blocks
                if let Err(TrySendError::Full(_)) = self.tx.try_send(block) {
                    log::debug!("Capture queue full, dropping block");
                }
            }
        }
    }
}

/// Live microphone / line-in source
pub struct CaptureSource {
    rx: Receiver<AudioBlock>,
    block_size: usize,
    sample_rate: u32,
    timeout: Duration,

    /// Input stream (kept alive)
    _stream: cpal::Stream,
}

impl CaptureSource {
    /// Open the default input device and start capturing.
    ///
    /// `timeout` bounds how long [`AudioSource::next_block`] waits for a block.
    pub fn open(block_size: usize, timeout: Duration) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoDevice("input"))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        let sample_format = config.sample_format();
        let channels = config.channels();
        let sample_rate = config.sample_rate().0;

        info!(
            "Capture: {} @ {}Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            sample_format
        );

        let (tx, rx) = crossbeam_channel::bounded(CHANNEL_DEPTH);
        let mut assembler = BlockAssembler {
            pending: Vec::with_capacity(block_size * channels as usize),
            block_len: block_size * channels as usize,
            channels,
            tx,
        };

        let stream_config: cpal::StreamConfig = config.into();
        let err_fn = |err| warn!("Capture stream error: {}", err);

        let stream = match sample_format {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    assembler.push(data.iter().copied());
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    assembler.push(data.iter().map(|&s| f32_to_i16(s)));
                },
                err_fn,
                None,
            ),
            cpal::SampleFormat::U16 => device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    assembler.push(data.iter().map(|&s| u16_to_i16(s)));
                },
                err_fn,
                None,
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }
        .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamControl(e.to_string()))?;

        Ok(Self {
            rx,
            block_size,
            sample_rate,
            timeout,
            _stream: stream,
        })
    }
}

impl AudioSource for CaptureSource {
    fn next_block(&mut self) -> Result<Option<AudioBlock>, AudioError> {
        match self.rx.recv_timeout(self.timeout) {
            Ok(block) => Ok(Some(block)),
            Err(RecvTimeoutError::Timeout) => {
                Err(AudioError::CaptureTimeout(self.timeout.as_millis() as u64))
            }
            // Device callback gone: the stream has ended
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn u16_to_i16(sample: u16) -> i16 {
    (sample as i32 - 32768) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_conversions() {
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-2.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(u16_to_i16(32768), 0);
        assert_eq!(u16_to_i16(0), i16::MIN);
        assert_eq!(u16_to_i16(u16::MAX), i16::MAX);
    }

    #[test]
    fn test_assembler_emits_whole_blocks() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut assembler = BlockAssembler {
            pending: Vec::new(),
            block_len: 6,
            channels: 2,
            tx,
        };

        assembler.push((0..4).map(|s| s as i16));
        assert!(rx.try_recv().is_err());

        assembler.push((4..10).map(|s| s as i16));
        let block = rx.try_recv().unwrap();
        assert_eq!(block.interleaved(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(block.frames(), 3);
        assert_eq!(assembler.pending, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_assembler_drops_when_queue_full() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut assembler = BlockAssembler {
            pending: Vec::new(),
            block_len: 2,
            channels: 1,
            tx,
        };

        assembler.push([1, 2, 3, 4].into_iter());
        assert_eq!(rx.try_recv().unwrap().interleaved(), &[1, 2]);
        assert!(rx.try_recv().is_err());
    }
}
