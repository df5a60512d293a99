use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleRate;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use voicepipe_core::PlaybackError;

use crate::sink::AudioSink;

const FEED_BUFFER_SAMPLES: usize = 8192;

/// Plays WAV segments on the default output device. Each segment is decoded
/// and played to completion before `deliver` returns, which keeps segments
/// strictly ordered.
pub struct LocalSink {
    opened: bool,
}

impl LocalSink {
    pub fn new() -> Self {
        Self { opened: false }
    }
}

impl Default for LocalSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSink for LocalSink {
    fn name(&self) -> &str {
        "local"
    }

    async fn open(&mut self) -> Result<(), PlaybackError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            PlaybackError::ConnectionUnavailable("no default output device".to_string())
        })?;
        tracing::info!(device = device.name().unwrap_or_default(), "local playback ready");
        self.opened = true;
        Ok(())
    }

    async fn deliver(&mut self, segment: &[u8]) -> Result<(), PlaybackError> {
        if !self.opened {
            return Err(PlaybackError::DeliverFailed("sink not open".to_string()));
        }
        let (samples, sample_rate) = decode_wav(segment)?;
        if samples.is_empty() {
            return Ok(());
        }
        tokio::task::spawn_blocking(move || play_samples(samples, sample_rate))
            .await
            .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?
    }

    async fn close(&mut self) {
        self.opened = false;
    }
}

/// Decode a WAV segment into mono f32 samples.
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), PlaybackError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| PlaybackError::Decode(e.to_string()))?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| PlaybackError::Decode(e.to_string()))?,
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

/// Blocking playback: feed samples through a ring buffer into the output
/// callback and wait until every sample has been consumed.
fn play_samples(samples: Vec<f32>, sample_rate: u32) -> Result<(), PlaybackError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or_else(|| {
        PlaybackError::ConnectionUnavailable("no default output device".to_string())
    })?;

    let supported = device
        .supported_output_configs()
        .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?
        .find(|c| {
            c.channels() >= 1
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .ok_or_else(|| {
            PlaybackError::DeliverFailed(format!("no output config for {sample_rate} Hz"))
        })?;
    let config = supported.with_sample_rate(SampleRate(sample_rate)).config();
    let channels = config.channels as usize;

    let total = samples.len();
    let played = Arc::new(AtomicUsize::new(0));
    let played_cb = Arc::clone(&played);

    let (mut producer, mut consumer) = HeapRb::<f32>::new(FEED_BUFFER_SAMPLES).split();

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = match consumer.try_pop() {
                        Some(s) => {
                            played_cb.fetch_add(1, Ordering::Relaxed);
                            s
                        }
                        None => 0.0,
                    };
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            |err| tracing::error!(error = %err, "output stream error"),
            None,
        )
        .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?;

    for sample in samples {
        while producer.try_push(sample).is_err() {
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    // Segment duration plus slack for driver latency.
    let deadline = Instant::now()
        + Duration::from_millis((total as u64 * 1000) / u64::from(sample_rate) + 500);
    while played.load(Ordering::Relaxed) < total && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }

    drop(stream);
    Ok(())
}
