//! Microphone capture over cpal. Chunks of mono samples are delivered through
//! a bounded channel from the audio callback thread to whoever polls.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::error;

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub device_name: Option<String>,
    pub latency_ms: RangeInclusive<u32>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            latency_ms: 100..=200,
        }
    }
}

/// An open input stream delivering mono chunks until stopped.
pub struct LiveCapture {
    stream: Stream,
    receiver: Receiver<Vec<f32>>,
    finished: Arc<AtomicBool>,
    sample_rate: u32,
}

impl LiveCapture {
    pub fn start(config: &CaptureConfig) -> Result<Self> {
        let device = select_device(config)?;
        let capture = build_capture(&device, config)?;
        capture
            .stream
            .play()
            .context("failed to start capture stream")?;
        Ok(capture)
    }

    pub fn recv_chunk(&self, timeout: Duration) -> Option<Vec<f32>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(chunk) => Some(chunk),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn stop(&self) {
        self.finished.store(true, Ordering::SeqCst);
        let _ = self.stream.pause();
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn select_device(config: &CaptureConfig) -> Result<Device> {
    let host = cpal::default_host();
    if let Some(name) = config.device_name.as_deref() {
        for device in host
            .input_devices()
            .context("listing input devices failed")?
        {
            if device.name().map(|n| n == name).unwrap_or(false) {
                return Ok(device);
            }
        }
        return Err(anyhow!("input device '{}' not found", name));
    }
    host.default_input_device()
        .context("no default input device available")
}

fn build_capture(device: &Device, config: &CaptureConfig) -> Result<LiveCapture> {
    let supported = device
        .default_input_config()
        .context("failed to query default input config")?;
    let stream_config = StreamConfig {
        channels: supported.channels(),
        sample_rate: supported.sample_rate(),
        buffer_size: BufferSize::Default,
    };
    let sample_rate = stream_config.sample_rate.0;
    let capacity = channel_capacity(sample_rate, &config.latency_ms);
    let (sender, receiver) = mpsc::sync_channel::<Vec<f32>>(capacity);
    let finished = Arc::new(AtomicBool::new(false));
    let stream = match supported.sample_format() {
        SampleFormat::F32 => {
            open_stream(device, &stream_config, sender, finished.clone(), |s: f32| s)
        }
        SampleFormat::I16 => open_stream(device, &stream_config, sender, finished.clone(), {
            |s: i16| s as f32 / i16::MAX as f32
        }),
        SampleFormat::U16 => open_stream(device, &stream_config, sender, finished.clone(), {
            |s: u16| (s as f32 / u16::MAX as f32) * 2.0 - 1.0
        }),
        other => Err(anyhow!("unsupported input sample format {:?}", other)),
    }?;
    Ok(LiveCapture {
        stream,
        receiver,
        finished,
        sample_rate,
    })
}

fn open_stream<T, F>(
    device: &Device,
    config: &StreamConfig,
    sender: SyncSender<Vec<f32>>,
    finished: Arc<AtomicBool>,
    convert: F,
) -> Result<Stream>
where
    T: SizedSample,
    F: Fn(T) -> f32 + Send + 'static,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!(error = %err, "audio input stream error");
    device
        .build_input_stream(
            config,
            move |data: &[T], _| {
                if finished.load(Ordering::Relaxed) || channels == 0 {
                    return;
                }
                let mono = downmix(data, channels, &convert);
                // Dropping a chunk under backpressure beats blocking the
                // audio callback.
                let _ = sender.try_send(mono);
            },
            err_fn,
            None,
        )
        .map_err(|err| anyhow!(err))
        .context("failed to build input stream")
}

fn downmix<T: Copy>(data: &[T], channels: usize, convert: &impl Fn(T) -> f32) -> Vec<f32> {
    let mut mono = Vec::with_capacity(data.len() / channels.max(1));
    for frame in data.chunks(channels.max(1)) {
        let sum: f32 = frame.iter().map(|&sample| convert(sample)).sum();
        mono.push(sum / frame.len() as f32);
    }
    mono
}

fn channel_capacity(sample_rate: u32, latency_ms: &RangeInclusive<u32>) -> usize {
    let max_latency = (*latency_ms.end()).max(*latency_ms.start());
    let frames = (sample_rate as u64 * max_latency as u64) / 1000;
    let approx_chunks = (frames / 1024).max(2);
    approx_chunks as usize
}

#[cfg(test)]
mod tests {
    use super::{channel_capacity, downmix};

    #[test]
    fn downmix_averages_samples_in_frame() {
        let mono = downmix(&[0.8_f32, 0.2, -0.4, 0.4], 2, &|s| s);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn downmix_applies_conversion() {
        let mono = downmix(&[i16::MAX], 1, &|s: i16| s as f32 / i16::MAX as f32);
        assert!((mono[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn capacity_scales_with_latency() {
        let short = channel_capacity(48_000, &(100..=100));
        let long = channel_capacity(48_000, &(100..=400));
        assert!(long > short);
        assert!(channel_capacity(8_000, &(1..=1)) >= 2);
    }
}
