//! Audio output using cpal
//!
//! The output context is opened once per process (see `SpeechController`)
//! and shared behind an `Arc<dyn OutputDevice>`. Each submitted buffer gets
//! its own output stream on a dedicated OS thread; the thread owns the
//! `cpal::Stream` until the buffer is exhausted and then fires the
//! buffer's `Completion`. Concurrent submissions play independently.

use crate::audio::{resampler, AudioBuffer};
use crate::error::{Error, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Extra time allowed past the expected length before a stalled stream is abandoned
const DRAIN_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// Grace period after the last sample is handed to the device
const HARDWARE_TAIL: Duration = Duration::from_millis(100);

/// Output device collaborator.
///
/// `submit` starts playback immediately and returns a signal that resolves
/// once the buffer has played out (or the stream failed).
#[async_trait]
pub trait OutputDevice: Send + Sync {
    async fn submit(&self, buffer: AudioBuffer) -> Result<Completion>;
}

/// Opens the process-wide output context on first use.
pub trait DeviceOpener: Send + Sync {
    fn open(&self) -> Result<Arc<dyn OutputDevice>>;
}

/// Completion signal for one submitted buffer
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Result<()>>,
}

impl Completion {
    /// Create a completion signal and the sender that fires it
    pub fn channel() -> (oneshot::Sender<Result<()>>, Completion) {
        let (tx, rx) = oneshot::channel();
        (tx, Completion { rx })
    }

    /// Wait for playback to end.
    ///
    /// A dropped sender counts as a device failure.
    pub async fn wait(self) -> Result<()> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::PlaybackDevice(
                "Playback ended without completion signal".to_string(),
            )),
        }
    }
}

/// Audio output context backed by a cpal device.
pub struct CpalOutput {
    device: Device,
    device_name: String,
}

impl CpalOutput {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::PlaybackDevice(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an output device.
    ///
    /// A named device that cannot be found falls back to the default device.
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices = host.output_devices().map_err(|e| {
                    Error::PlaybackDevice(format!("Failed to enumerate devices: {}", e))
                })?;

                match devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                    Some(dev) => {
                        info!("Found requested audio device: {}", name);
                        dev
                    }
                    None => {
                        warn!("Requested device '{}' not found, falling back to default device", name);
                        host.default_output_device().ok_or_else(|| {
                            Error::PlaybackDevice(format!(
                                "Device '{}' not found and no default device available",
                                name
                            ))
                        })?
                    }
                }
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::PlaybackDevice("No default output device found".to_string()))?,
        };

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using audio output device: {}", device_name);

        Ok(Self {
            device,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

#[async_trait]
impl OutputDevice for CpalOutput {
    async fn submit(&self, buffer: AudioBuffer) -> Result<Completion> {
        let device = self.device.clone();

        // Config queries and resampling block
        let (device, config, sample_format, samples, expected) =
            tokio::task::spawn_blocking(move || -> Result<_> {
                let (config, sample_format) =
                    best_config(&device, buffer.sample_rate(), buffer.channel_count())?;

                let buffer = if config.sample_rate.0 != buffer.sample_rate() {
                    resampler::resample(&buffer, config.sample_rate.0)?
                } else {
                    buffer
                };

                debug!(
                    "Submitting {} frames: device rate={}, channels={}, format={:?}",
                    buffer.frame_count(),
                    config.sample_rate.0,
                    config.channels,
                    sample_format
                );

                let samples = map_channels(&buffer, config.channels);
                let expected = Duration::from_millis(buffer.duration_ms());
                Ok((device, config, sample_format, samples, expected))
            })
            .await
            .map_err(|e| Error::PlaybackDevice(format!("Stream preparation task failed: {}", e)))??;

        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();
        let (done_tx, completion) = Completion::channel();

        thread::Builder::new()
            .name("speech-playback".into())
            .spawn(move || {
                play_thread(device, config, sample_format, samples, expected, ready_tx, done_tx)
            })
            .map_err(|e| Error::PlaybackDevice(format!("Failed to spawn playback thread: {}", e)))?;

        ready_rx.await.map_err(|_| {
            Error::PlaybackDevice("Playback thread exited before starting".to_string())
        })??;

        Ok(completion)
    }
}

/// Opens a `CpalOutput` for the configured device name
pub struct CpalOpener {
    device_name: Option<String>,
}

impl CpalOpener {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

impl DeviceOpener for CpalOpener {
    fn open(&self) -> Result<Arc<dyn OutputDevice>> {
        let output = CpalOutput::open(self.device_name.as_deref())?;
        info!("Speech output context ready on {}", output.device_name());
        Ok(Arc::new(output))
    }
}

/// Pick a stream config for the buffer.
///
/// Prefers the buffer's own rate and channel count in f32; otherwise any
/// config covering the rate; otherwise the device default.
fn best_config(
    device: &Device,
    sample_rate: u32,
    channels: u16,
) -> Result<(StreamConfig, SampleFormat)> {
    let supported: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| Error::PlaybackDevice(format!("Failed to get device configs: {}", e)))?
        .collect();

    let covers_rate = |c: &cpal::SupportedStreamConfigRange| {
        c.min_sample_rate().0 <= sample_rate && c.max_sample_rate().0 >= sample_rate
    };

    let preferred = supported
        .iter()
        .find(|c| {
            c.channels() == channels && covers_rate(c) && c.sample_format() == SampleFormat::F32
        })
        .or_else(|| supported.iter().find(|c| covers_rate(c)));

    if let Some(range) = preferred {
        let range = range.clone();
        let sample_format = range.sample_format();
        let config = range.with_sample_rate(cpal::SampleRate(sample_rate)).config();
        return Ok((config, sample_format));
    }

    let default = device
        .default_output_config()
        .map_err(|e| Error::PlaybackDevice(format!("Failed to get default config: {}", e)))?;

    Ok((default.config(), default.sample_format()))
}

/// Interleave the buffer for a device with `device_channels` channels.
///
/// Mono is copied to every device channel; source channels beyond the
/// device's count are dropped; missing ones are silent.
pub fn map_channels(buffer: &AudioBuffer, device_channels: u16) -> Vec<f32> {
    let device_channels = device_channels as usize;
    let source = buffer.planar();
    let mut out = Vec::with_capacity(buffer.frame_count() * device_channels);

    for frame in 0..buffer.frame_count() {
        for ch in 0..device_channels {
            let sample = if source.len() == 1 {
                source[0][frame]
            } else {
                source.get(ch).map(|c| c[frame]).unwrap_or(0.0)
            };
            out.push(sample);
        }
    }
    out
}

/// How a stream's playback ended
enum StreamEnd {
    Drained,
    Failed(String),
}

/// Owns one output stream from start to drain.
fn play_thread(
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    samples: Vec<f32>,
    expected: Duration,
    ready_tx: oneshot::Sender<Result<()>>,
    done_tx: oneshot::Sender<Result<()>>,
) {
    let (end_tx, end_rx) = std_mpsc::channel::<StreamEnd>();

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, end_tx),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, end_tx),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, end_tx),
        other => Err(Error::PlaybackDevice(format!("Unsupported sample format: {:?}", other))),
    };

    let stream = match stream.and_then(|s| {
        s.play()
            .map_err(|e| Error::PlaybackDevice(format!("Failed to start stream: {}", e)))?;
        Ok(s)
    }) {
        Ok(s) => s,
        Err(e) => {
            error!("Speech playback failed to start: {}", e);
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let _ = ready_tx.send(Ok(()));
    debug!("Speech stream started, expecting {:?}", expected);

    let result = match end_rx.recv_timeout(expected + DRAIN_TIMEOUT_MARGIN) {
        Ok(StreamEnd::Drained) => {
            thread::sleep(HARDWARE_TAIL);
            Ok(())
        }
        Ok(StreamEnd::Failed(msg)) => Err(Error::PlaybackDevice(msg)),
        Err(_) => {
            warn!("Speech stream did not drain within {:?}, abandoning", expected + DRAIN_TIMEOUT_MARGIN);
            Err(Error::PlaybackDevice("Playback stalled".to_string()))
        }
    };

    drop(stream);
    let _ = done_tx.send(result);
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Vec<f32>,
    end_tx: std_mpsc::Sender<StreamEnd>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let mut position = 0usize;
    let mut drained = false;
    let data_end_tx = end_tx.clone();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for out in data.iter_mut() {
                    let value = samples.get(position).copied().unwrap_or(0.0);
                    *out = T::from_sample(value.clamp(-1.0, 1.0));
                    position += 1;
                }
                if !drained && position >= samples.len() {
                    drained = true;
                    let _ = data_end_tx.send(StreamEnd::Drained);
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
                let _ = end_tx.send(StreamEnd::Failed(err.to_string()));
            },
            None,
        )
        .map_err(|e| Error::PlaybackDevice(format!("Failed to build stream: {}", e)))
}
