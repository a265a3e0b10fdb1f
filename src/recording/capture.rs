//! Microphone capture session.
//!
//! Owns the audio input stream and the buffer of samples observed between
//! `start()` and `stop()`. Samples arrive through the device callback in
//! order and are appended without gaps; `stop()` assembles them into one
//! in-memory WAV payload ready for upload. The input stream is owned by the
//! session, so the device is released whenever the session is dropped, on
//! every exit path.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use crate::audio::AudioContext;

/// Captures audio from a configured input device into memory.
///
/// Multi-channel input is converted to mono by averaging channels. The
/// session records at the device's native sample rate, which may differ from
/// the requested one.
pub struct CaptureSession {
    /// Device name, index, or "default"
    device_spec: String,
    /// Actual recording sample rate from device
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono), in arrival order
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
}

impl CaptureSession {
    /// Creates a new capture session with requested sample rate and device.
    ///
    /// The actual recording sample rate may differ based on device
    /// capabilities; call `sample_rate()` after `start()` for the real rate.
    pub fn new(requested_sample_rate: u32, device_spec: String) -> Self {
        Self {
            device_spec,
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        }
    }

    /// Requests exclusive access to the input device and begins capturing.
    ///
    /// # Errors
    /// - If a session is already active
    /// - If no input device exists or access is refused
    /// - If device configuration or stream creation fails
    pub fn start(&mut self, ctx: &AudioContext) -> Result<()> {
        if self.stream.is_some() {
            return Err(anyhow!("Capture session already active"));
        }

        let device = ctx.input_device(&self.device_spec)?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;
        self.samples.lock().unwrap().clear();

        let samples_arc = Arc::clone(&self.samples);
        let callback_channels = num_channels;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                append_chunk(data, &samples_arc, callback_channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops capturing, releases the device, and returns the assembled
    /// payload.
    ///
    /// Returns `Ok(None)` when no session is active (stop is a no-op then).
    /// A stop immediately after start yields a valid zero-sample payload
    /// which the caller may still upload.
    ///
    /// # Errors
    /// - If the WAV payload cannot be assembled
    pub fn stop(&mut self) -> Result<Option<Vec<u8>>> {
        if self.stream.is_none() {
            tracing::debug!("Stop requested with no active capture session");
            return Ok(None);
        }

        // Dropping the stream halts capture and releases the device
        self.stream = None;

        let samples = self.samples.lock().unwrap().clone();
        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            samples.len(),
            self.sample_rate
        );

        let payload = encode_wav_payload(&samples, self.sample_rate)?;
        Ok(Some(payload))
    }

    /// Returns a clone of all samples captured so far.
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    /// Returns the number of captured samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Returns the actual sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns whether a capture is currently running.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

/// Appends a device callback chunk, mixing multi-channel audio down to mono.
fn append_chunk(data: &[i16], samples_arc: &Arc<Mutex<Vec<i16>>>, num_channels: usize) {
    let mut samples = samples_arc.lock().unwrap();

    match num_channels {
        1 => {
            samples.extend_from_slice(data);
        }
        2 => {
            for chunk in data.chunks_exact(2) {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                samples.push(((left + right) / 2) as i16);
            }
        }
        _ => {
            for chunk in data.chunks_exact(num_channels) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                samples.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Assembles mono i16 samples into an in-memory WAV payload.
///
/// # Errors
/// - If WAV encoding fails
pub fn encode_wav_payload(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let wav_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, wav_spec)?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;

    let payload = cursor.into_inner();
    tracing::debug!("Assembled WAV payload: {} bytes", payload.len());
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_payload() {
        let samples: Vec<i16> = (0..160).map(|i| (i * 100) as i16).collect();
        let payload = encode_wav_payload(&samples, 16000).unwrap();

        // RIFF header plus 2 bytes per sample
        assert!(payload.len() >= 44 + samples.len() * 2);
        assert_eq!(&payload[0..4], b"RIFF");
        assert_eq!(&payload[8..12], b"WAVE");
    }

    #[test]
    fn test_encode_empty_payload_is_valid_wav() {
        let payload = encode_wav_payload(&[], 16000).unwrap();
        assert!(payload.len() >= 44);
        assert_eq!(&payload[0..4], b"RIFF");
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut session = CaptureSession::new(16000, "default".to_string());
        assert!(!session.is_active());
        assert!(session.stop().unwrap().is_none());
    }

    #[test]
    fn test_append_chunk_mixes_stereo_to_mono() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        append_chunk(&[100, 300, -200, -400], &samples, 2);
        assert_eq!(*samples.lock().unwrap(), vec![200, -300]);
    }

    #[test]
    fn test_append_chunk_preserves_arrival_order() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        append_chunk(&[1, 2, 3], &samples, 1);
        append_chunk(&[4, 5], &samples, 1);
        assert_eq!(*samples.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
