//! Audible playback of a WAV file alongside the visuals.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};

use crate::error::AudioError;

/// Pause/resume hook driven by the frame loop's Playing/Paused transitions
pub trait PlaybackController {
    fn pause(&mut self) -> Result<(), AudioError>;
    fn resume(&mut self) -> Result<(), AudioError>;
}

/// Plays decoded samples on the default output device
pub struct CpalPlayback {
    /// Next frame to play (shared with the output callback)
    cursor: Arc<AtomicUsize>,

    total_frames: usize,

    /// Audio output stream (kept alive)
    stream: cpal::Stream,
}

impl CpalPlayback {
    /// Decode `path` and start playing it immediately
    pub fn from_wav(path: &Path) -> Result<Self, AudioError> {
        let mut reader = hound::WavReader::open(path).map_err(|source| AudioError::File {
            path: path.display().to_string(),
            source,
        })?;
        let spec = reader.spec();
        let samples: Vec<f32> = reader
            .samples::<i16>()
            .map_while(Result::ok)
            .map(|s| s as f32 / 32768.0)
            .collect();

        Self::from_samples(Arc::new(samples), spec.channels, spec.sample_rate)
    }

    /// Play interleaved `samples` (-1.0..=1.0) with `channels` channels
    pub fn from_samples(
        samples: Arc<Vec<f32>>,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice("output"))?;

        let default_config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        if default_config.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "output device format {:?}",
                default_config.sample_format()
            )));
        }

        let out_channels = default_config.channels() as usize;
        let config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        info!(
            "Playback: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate
        );

        let in_channels = channels.max(1) as usize;
        let total_frames = samples.len() / in_channels;
        let cursor = Arc::new(AtomicUsize::new(0));
        let cursor_cb = Arc::clone(&cursor);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut frame = cursor_cb.load(Ordering::Relaxed);
                    for out in data.chunks_mut(out_channels) {
                        if frame >= total_frames {
                            out.fill(0.0);
                            continue;
                        }
                        let input = &samples[frame * in_channels..(frame + 1) * in_channels];
                        for (ch, sample) in out.iter_mut().enumerate() {
                            // Extra output channels repeat the first input channel
                            *sample = input.get(ch).copied().unwrap_or(input[0]);
                        }
                        frame += 1;
                    }
                    cursor_cb.store(frame, Ordering::Relaxed);
                },
                |err| warn!("Playback stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamControl(e.to_string()))?;

        Ok(Self {
            cursor,
            total_frames,
            stream,
        })
    }

    /// Playback position as a fraction of the file
    pub fn progress(&self) -> f32 {
        if self.total_frames == 0 {
            return 1.0;
        }
        self.cursor.load(Ordering::Relaxed) as f32 / self.total_frames as f32
    }
}

impl PlaybackController for CpalPlayback {
    fn pause(&mut self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamControl(e.to_string()))
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::StreamControl(e.to_string()))
    }
}
