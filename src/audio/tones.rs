//! Notification tone synthesis and playback.
//!
//! Generates the three short interface sounds (recording start, recording
//! stop, typewriter keystroke) from oscillators and filtered noise instead of
//! shipping audio assets. Playback is fire-and-forget: each tone is rendered
//! into a sample buffer and pushed through a short-lived cpal output stream
//! on a background thread.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};

use super::AudioContext;

/// Which notification tone to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Recording started: muffled mechanical thud, square wave 150→40 Hz
    Start,
    /// Recording stopped: latch release, triangle wave 200→50 Hz
    Stop,
    /// Typewriter keystroke: 15 ms noise burst through a 2 kHz bandpass
    Key,
}

/// Plays notification tones on the default output device.
///
/// Holds the output device resolved from the injected [`AudioContext`].
/// If no output device exists, playback requests are silently dropped.
pub struct ToneGenerator {
    device: Option<cpal::Device>,
    enabled: bool,
}

impl ToneGenerator {
    /// Creates a tone generator bound to the context's default output device.
    pub fn new(ctx: &AudioContext, enabled: bool) -> Self {
        let device = if enabled { ctx.output_device() } else { None };
        if enabled && device.is_none() {
            tracing::warn!("No audio output device found, notification tones disabled");
        }
        Self { device, enabled }
    }

    /// Plays a tone without blocking. Errors are logged, never surfaced.
    pub fn play(&self, tone: Tone) {
        if !self.enabled {
            return;
        }
        let Some(device) = self.device.clone() else {
            return;
        };
        std::thread::spawn(move || {
            if let Err(e) = play_blocking(&device, tone) {
                tracing::warn!("Tone playback failed: {e}");
            }
        });
    }
}

fn play_blocking(
    device: &cpal::Device,
    tone: Tone,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let samples = Arc::new(render_tone(tone, sample_rate));
    let total = samples.len();
    let duration_ms = (total as f32 / sample_rate * 1000.0) as u64;

    let sample_idx = Arc::new(AtomicUsize::new(0));
    let idx_clone = Arc::clone(&sample_idx);
    let samples_clone = Arc::clone(&samples);

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut idx = idx_clone.load(Ordering::Relaxed);
            for frame in data.chunks_mut(channels) {
                let value = if idx < total { samples_clone[idx] } else { 0.0 };
                for sample in frame.iter_mut() {
                    *sample = value;
                }
                idx += 1;
            }
            idx_clone.store(idx, Ordering::Relaxed);
        },
        |err| tracing::warn!("Audio output error: {err}"),
        None,
    )?;

    stream.play()?;

    // Let the buffer drain plus a small margin before tearing the stream down
    std::thread::sleep(std::time::Duration::from_millis(duration_ms + 60));

    drop(stream);
    Ok(())
}

/// Renders a tone into a mono f32 sample buffer at the given rate.
pub fn render_tone(tone: Tone, sample_rate: f32) -> Vec<f32> {
    match tone {
        Tone::Start => render_sweep(sample_rate, 0.10, 150.0, 40.0, Wave::Square, 400.0, 0.3),
        Tone::Stop => render_sweep(sample_rate, 0.15, 200.0, 50.0, Wave::Triangle, 600.0, 0.3),
        Tone::Key => render_key_click(sample_rate),
    }
}

#[derive(Clone, Copy)]
enum Wave {
    Square,
    Triangle,
}

/// Oscillator with an exponential frequency ramp, one-pole lowpass, and an
/// exponential decay envelope. Matches the "muffled mechanical click" shape:
/// the lowpass removes the upper harmonics, the envelope kills the tail fast.
fn render_sweep(
    sample_rate: f32,
    duration_secs: f32,
    freq_start: f32,
    freq_end: f32,
    wave: Wave,
    lowpass_hz: f32,
    gain: f32,
) -> Vec<f32> {
    let total = (sample_rate * duration_secs) as usize;
    let mut samples = Vec::with_capacity(total);

    let alpha = 1.0 - (-2.0 * PI * lowpass_hz / sample_rate).exp();
    let mut lp_state = 0.0f32;
    let mut phase = 0.0f32;

    for i in 0..total {
        let progress = i as f32 / total as f32;
        let freq = freq_start * (freq_end / freq_start).powf(progress);
        phase += 2.0 * PI * freq / sample_rate;

        let raw = match wave {
            Wave::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Wave::Triangle => (2.0 / PI) * phase.sin().asin(),
        };

        lp_state += alpha * (raw - lp_state);

        // Volume decays exponentially toward silence over the tone duration
        let envelope = gain * (0.001f32 / gain).powf(progress);
        samples.push(lp_state * envelope);
    }

    samples
}

/// 15 ms white-noise burst through a bandpass centered at 2 kHz (Q = 1),
/// sounding like a key switch.
fn render_key_click(sample_rate: f32) -> Vec<f32> {
    let total = (sample_rate * 0.015) as usize;
    let mut samples = Vec::with_capacity(total);

    let mut rng = XorShift32::from_clock();
    let mut bandpass = Biquad::bandpass(2000.0, 1.0, sample_rate);

    for _ in 0..total {
        let noise = rng.next_f32() * 2.0 - 1.0;
        samples.push(bandpass.process(noise) * 0.15);
    }

    samples
}

/// Minimal xorshift PRNG for noise synthesis. Audio noise needs no
/// cryptographic quality, only a full-range uniform-ish stream.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0x9e3779b9);
        Self {
            state: nanos | 1,
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Direct-form-I biquad filter (RBJ cookbook coefficients).
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn bandpass(center_hz: f32, q: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * center_hz / sample_rate;
        let alpha = omega.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * omega.cos() / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 48000.0;

    #[test]
    fn test_tone_durations() {
        assert_eq!(render_tone(Tone::Start, RATE).len(), (RATE * 0.10) as usize);
        assert_eq!(render_tone(Tone::Stop, RATE).len(), (RATE * 0.15) as usize);
        assert_eq!(render_tone(Tone::Key, RATE).len(), (RATE * 0.015) as usize);
    }

    #[test]
    fn test_tones_stay_in_range() {
        for tone in [Tone::Start, Tone::Stop, Tone::Key] {
            for sample in render_tone(tone, RATE) {
                assert!(sample.abs() <= 1.0, "sample out of range for {tone:?}");
            }
        }
    }

    #[test]
    fn test_sweep_envelope_decays() {
        let samples = render_tone(Tone::Start, RATE);
        let head_peak = samples[..samples.len() / 4]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        let tail_peak = samples[samples.len() * 3 / 4..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head_peak > tail_peak * 4.0);
    }

    #[test]
    fn test_key_click_is_not_silence() {
        let samples = render_tone(Tone::Key, RATE);
        assert!(samples.iter().any(|s| s.abs() > 0.001));
    }
}
