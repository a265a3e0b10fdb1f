//! Shared audio device access.
//!
//! All audio I/O (microphone capture, notification tones) goes through one
//! [`AudioContext`] owned by the command handler. The context is created at
//! startup and handed to whichever component needs a device, so there is no
//! lazily-initialized global audio state.

pub mod tones;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

pub use tones::ToneGenerator;

/// Process-wide audio host handle.
///
/// Wraps the cpal host and resolves input/output devices for capture and
/// tone playback. Lives for the duration of the command that created it.
pub struct AudioContext {
    host: cpal::Host,
}

impl AudioContext {
    /// Creates a new audio context on the default host.
    pub fn new() -> Self {
        let host = suppress_alsa_warnings(|| Ok(cpal::default_host()))
            .unwrap_or_else(|_| cpal::default_host());
        Self { host }
    }

    /// Resolves an input device by spec: "default", a numeric index, or a name.
    ///
    /// # Errors
    /// - If no input device exists or the requested device is not found
    pub fn input_device(&self, device_spec: &str) -> Result<cpal::Device> {
        suppress_alsa_warnings(|| {
            if device_spec == "default" {
                self.host
                    .default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_input_device(&self.host, device_spec)
            }
        })
    }

    /// Returns the default output device, if any.
    pub fn output_device(&self) -> Option<cpal::Device> {
        suppress_alsa_warnings(|| Ok(self.host.default_output_device()))
            .ok()
            .flatten()
    }

    /// Enumerates input devices that can be queried without errors.
    ///
    /// # Errors
    /// - If device enumeration fails at the host level
    pub fn input_devices(&self) -> Result<Vec<cpal::Device>> {
        suppress_alsa_warnings(|| {
            let devices = self
                .host
                .input_devices()
                .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
                .filter(|d| d.name().is_ok())
                .collect();
            Ok(devices)
        })
    }

    /// Returns the name of the default input device, if resolvable.
    pub fn default_input_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }
}

/// Finds an audio input device by name or numeric index.
fn find_input_device(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'voxlog list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
