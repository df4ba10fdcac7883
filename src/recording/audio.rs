//! Audio capture and format conversion.
//!
//! Captures PCM samples from an input device via cpal, downmixes to mono, and
//! encodes the result with ffmpeg when the recording stops. The device's
//! native sample rate wins over the requested one; callers should read
//! `sample_rate()` after `start()`.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use super::ffmpeg::find_ffmpeg;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Records mono audio from a configured or default input device.
pub struct AudioRecorder {
    /// Actual recording sample rate, updated once the device is opened
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    /// Whether recording is currently paused
    paused: Arc<Mutex<bool>>,
    /// Device name, index, or "default"
    device_spec: String,
}

impl AudioRecorder {
    /// Creates a recorder for the given device spec and requested rate.
    pub fn new(requested_sample_rate: u32, device_spec: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            paused: Arc::new(Mutex::new(false)),
            device_spec,
        }
    }

    /// Opens the input device and starts capturing.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration or stream creation fails
    pub fn start(&mut self) -> Result<()> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_spec == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device(&host, &self.device_spec)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }
        self.sample_rate = device_sample_rate;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            channels
        );

        let samples = Arc::clone(&self.samples);
        let paused = Arc::clone(&self.paused);

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if !*paused.lock().unwrap() {
                    push_mono(&mut samples.lock().unwrap(), data, channels);
                }
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

    /// Stops capturing and encodes the recording to the output path.
    ///
    /// The samples are written to a temporary WAV file and converted to the
    /// requested format with ffmpeg; the temp file is removed afterwards.
    ///
    /// # Arguments
    /// * `output_path` - Where the encoded audio lands; `None` discards it
    /// * `format` - ffmpeg codec and options, e.g., "mp3 -ab 16k -ar 12000"
    ///
    /// # Errors
    /// - If temporary WAV creation fails
    /// - If ffmpeg conversion fails
    pub fn stop(&mut self, output_path: Option<PathBuf>, format: &str) -> Result<()> {
        self.stream = None;

        let samples = self.samples.lock().unwrap().clone();
        if samples.is_empty() {
            tracing::warn!("Recording stopped with no samples captured");
            return Ok(());
        }

        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            self.duration_seconds(),
            samples.len(),
            self.sample_rate
        );

        if let Some(output_file) = output_path {
            let temp_wav =
                std::env::temp_dir().join(format!("medscribe_{}.wav", std::process::id()));

            self.write_wav(&samples, &temp_wav)?;
            self.encode(&temp_wav, &output_file, format)?;

            if let Err(e) = std::fs::remove_file(&temp_wav) {
                tracing::debug!("Failed to remove temp file: {}", e);
            }

            let file_size = std::fs::metadata(&output_file)?.len();
            tracing::info!(
                "Audio saved: {} ({} bytes, format: {})",
                output_file.display(),
                file_size,
                format
            );
        }

        Ok(())
    }

    /// Returns a snapshot of all recorded samples.
    pub fn samples(&self) -> Vec<i16> {
        self.samples.lock().unwrap().clone()
    }

    /// Number of recorded samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    /// Actual sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Recorded duration based on captured samples.
    pub fn duration_seconds(&self) -> f64 {
        self.sample_count() as f64 / self.sample_rate as f64
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap()
    }

    /// Toggles between paused and recording states.
    pub fn toggle_pause(&self) {
        let mut paused = self.paused.lock().unwrap();
        *paused = !*paused;
        tracing::debug!(
            "Recording {}",
            if *paused { "paused" } else { "resumed" }
        );
    }

    /// Writes samples to an intermediate PCM WAV file for ffmpeg.
    fn write_wav(&self, samples: &[i16], path: &Path) -> Result<()> {
        let wav_spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, wav_spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        tracing::debug!("Temporary WAV created: {}", path.display());
        Ok(())
    }

    /// Converts the intermediate WAV using ffmpeg.
    ///
    /// The format string is "codec [options]"; mono output is always
    /// enforced.
    fn encode(&self, input_wav: &Path, output_path: &Path, format: &str) -> Result<()> {
        let mut parts = format.split_whitespace();
        let codec = parts
            .next()
            .ok_or_else(|| anyhow!("Invalid format string: empty"))?;

        let ffmpeg_path = find_ffmpeg()?;

        let mut cmd = Command::new(&ffmpeg_path);
        cmd.arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(input_wav)
            .arg("-acodec")
            .arg(codec)
            .arg("-ac")
            .arg("1")
            .arg("-y");
        for option in parts {
            cmd.arg(option);
        }
        cmd.arg(output_path);

        let output = cmd.output()?;
        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            tracing::error!("ffmpeg conversion failed: {}", error_msg);
            return Err(anyhow!("Audio encoding failed: {error_msg}"));
        }

        tracing::debug!("Audio converted to {} format", codec);
        Ok(())
    }
}

/// Appends captured frames as mono samples, averaging channels.
fn push_mono(samples: &mut Vec<i16>, data: &[i16], channels: usize) {
    match channels {
        0 | 1 => samples.extend_from_slice(data),
        _ => {
            for frame in data.chunks_exact(channels) {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                samples.push((sum / channels as i32) as i16);
            }
        }
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
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
        if device.name().is_ok_and(|name| name == device_spec) {
            return Ok(device);
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'medscribe list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
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
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through() {
        let mut samples = Vec::new();
        push_mono(&mut samples, &[1, 2, 3], 1);
        assert_eq!(samples, vec![1, 2, 3]);
    }

    #[test]
    fn stereo_averages_channel_pairs() {
        let mut samples = Vec::new();
        push_mono(&mut samples, &[100, 200, -50, 50], 2);
        assert_eq!(samples, vec![150, 0]);
    }

    #[test]
    fn multichannel_averages_all_channels() {
        let mut samples = Vec::new();
        push_mono(&mut samples, &[30, 60, 90], 3);
        assert_eq!(samples, vec![60]);
    }
}
