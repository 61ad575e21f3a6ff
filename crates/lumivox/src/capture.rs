//! Microphone capture
//!
//! A cpal input stream pushes sample chunks into a bounded channel; the
//! control thread drains them at tick time. Capture failure is degraded
//! mode, not fatal: the pipeline still runs for cue playback and safety.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{info, warn};

use crate::config::CaptureConfig;

/// A running microphone capture stream
pub struct MicCapture {
    // Held so the stream stays alive; dropping stops capture
    _stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl MicCapture {
    /// Open the default input device and start capturing
    pub fn start(config: &CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no input device available"))?;
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (sender, receiver): (Sender<Vec<f32>>, Receiver<Vec<f32>>) = bounded(16);
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // A full channel means the control thread is behind;
                    // dropping the chunk is cheaper than blocking the
                    // audio callback
                    let _ = sender.try_send(data.to_vec());
                },
                move |err| {
                    warn!("input stream error: {err}");
                },
                None,
            )
            .context("failed to build input stream")?;
        stream.play().context("failed to start input stream")?;

        info!(device = %name, sample_rate = config.sample_rate, "microphone capture started");

        Ok(Self {
            _stream: stream,
            receiver,
            sample_rate: config.sample_rate,
        })
    }

    /// The stream's sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Drain all pending chunks into `window`, keeping only the newest
    /// `window_size` samples
    pub fn drain_into(&self, window: &mut std::collections::VecDeque<f32>, window_size: usize) {
        while let Ok(chunk) = self.receiver.try_recv() {
            for sample in chunk {
                if window.len() == window_size {
                    window.pop_front();
                }
                window.push_back(sample);
            }
        }
    }
}
