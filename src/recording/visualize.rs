//! Live audio visualizations for the recording display.
//!
//! Two views over the same sample stream: a scrolling time-domain waveform
//! and an FFT frequency spectrum focused on the human voice range. Both
//! produce 0-100 column values for a sparkline the width of the terminal.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::VisualizationType;

/// Stateful volume view selected by configuration.
pub enum VolumeView {
    /// Scrolling history of volume values, newest at the right edge.
    Waveform { history: Vec<u64> },
    /// Smoothed FFT magnitudes across the voice band.
    Spectrum {
        planner: FftPlanner<f32>,
        bins: Vec<u64>,
    },
}

impl VolumeView {
    pub fn new(kind: VisualizationType, width: usize) -> Self {
        match kind {
            VisualizationType::Waveform => VolumeView::Waveform {
                history: vec![0; width],
            },
            VisualizationType::Spectrum => VolumeView::Spectrum {
                planner: FftPlanner::new(),
                bins: vec![0; width],
            },
        }
    }

    /// Feeds one frame of state into the view.
    ///
    /// The waveform consumes the precomputed volume percentage; the spectrum
    /// recomputes from raw samples and smooths against the previous frame to
    /// reduce jitter.
    pub fn update(
        &mut self,
        samples: &[i16],
        current_volume: u8,
        sample_rate: u32,
        reference_level_db: i8,
    ) {
        match self {
            VolumeView::Waveform { history } => {
                // Scroll one column per update, holding the width constant.
                let width = history.len();
                history.push(current_volume as u64);
                if history.len() > width {
                    history.remove(0);
                }
            }
            VolumeView::Spectrum { planner, bins } => {
                let fresh =
                    compute_spectrum(samples, sample_rate, bins.len(), reference_level_db, planner);
                for (old, new) in bins.iter_mut().zip(fresh.iter()) {
                    *old = (*old + *new) / 2;
                }
            }
        }
    }

    /// Adjusts the view to a new terminal width.
    pub fn resize(&mut self, width: usize) {
        match self {
            VolumeView::Waveform { history } => {
                if history.len() > width {
                    history.drain(..history.len() - width);
                } else {
                    while history.len() < width {
                        history.insert(0, 0);
                    }
                }
            }
            VolumeView::Spectrum { bins, .. } => {
                bins.resize(width, 0);
            }
        }
    }

    /// Current column values for rendering.
    pub fn data(&self) -> &[u64] {
        match self {
            VolumeView::Waveform { history } => history,
            VolumeView::Spectrum { bins, .. } => bins,
        }
    }
}

/// Calculates the frequency spectrum of the most recent samples.
///
/// Returns magnitudes normalized to 0-100, matching the volume meter scale.
/// Focuses on 100-1500 Hz (voice fundamentals and low harmonics). A Hanning
/// window is applied to reduce spectral leakage.
fn compute_spectrum(
    samples: &[i16],
    sample_rate: u32,
    num_bins: usize,
    reference_level_db: i8,
    planner: &mut FftPlanner<f32>,
) -> Vec<u64> {
    if samples.is_empty() || num_bins == 0 {
        return vec![0u64; num_bins];
    }

    let fft_size = 2048;
    let sample_count = samples.len().min(fft_size);
    let recent = &samples[samples.len() - sample_count..];

    let mut buffer: Vec<Complex<f32>> = recent
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let window =
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / sample_count as f32).cos());
            Complex::new(s as f32 * window / 32768.0, 0.0)
        })
        .collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    let freq_resolution = sample_rate as f32 / fft_size as f32;

    // Core human voice range
    let min_freq = 100.0;
    let max_freq = 1500.0;

    let min_bin = (min_freq / freq_resolution) as usize;
    let max_bin = (max_freq / freq_resolution).min((fft_size / 2) as f32) as usize;
    let useful_bins = max_bin.saturating_sub(min_bin).max(1);

    let noise_gate_db = reference_level_db as f32 - 35.0;

    let mut result = vec![0u64; num_bins];
    for (display_idx, result_bin) in result.iter_mut().enumerate() {
        let start_bin = min_bin + (display_idx * useful_bins) / num_bins;
        let end_bin = (min_bin + ((display_idx + 1) * useful_bins) / num_bins)
            .min(max_bin)
            .max(start_bin + 1);

        if start_bin >= max_bin {
            break;
        }

        let mut sum = 0.0;
        let mut count = 0;
        for bin_idx in start_bin..end_bin {
            if bin_idx < buffer.len() / 2 {
                sum += buffer[bin_idx].norm();
                count += 1;
            }
        }
        if count == 0 {
            continue;
        }

        let avg_magnitude = sum / count as f32;
        let db = if avg_magnitude > 1e-10 {
            20.0 * avg_magnitude.log10()
        } else {
            -100.0
        };

        // FFT energy concentrates relative to RMS volume; align the scales
        let adjusted_db = db - 20.0;

        if adjusted_db >= noise_gate_db {
            let db_range = reference_level_db as f32 - noise_gate_db;
            let normalized = ((adjusted_db - noise_gate_db) / db_range * 100.0).clamp(0.0, 100.0);
            *result_bin = normalized as u64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_scrolls_at_fixed_width() {
        let mut view = VolumeView::new(VisualizationType::Waveform, 4);
        for v in [10, 20, 30, 40, 50] {
            view.update(&[], v, 16000, -20);
        }
        assert_eq!(view.data(), &[20, 30, 40, 50]);
    }

    #[test]
    fn waveform_resize_preserves_recent_values() {
        let mut view = VolumeView::new(VisualizationType::Waveform, 4);
        for v in [10, 20, 30, 40] {
            view.update(&[], v, 16000, -20);
        }
        view.resize(2);
        assert_eq!(view.data(), &[30, 40]);
        view.resize(4);
        assert_eq!(view.data(), &[0, 0, 30, 40]);
    }

    #[test]
    fn silence_produces_empty_spectrum() {
        let mut view = VolumeView::new(VisualizationType::Spectrum, 8);
        view.update(&vec![0i16; 4096], 0, 16000, -20);
        assert!(view.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn tone_registers_energy_in_spectrum() {
        // 440 Hz sine at close to full scale
        let sample_rate = 16000u32;
        let samples: Vec<i16> = (0..4096)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                ((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 30000.0) as i16
            })
            .collect();

        let mut view = VolumeView::new(VisualizationType::Spectrum, 16);
        view.update(&samples, 0, sample_rate, -20);
        assert!(view.data().iter().any(|&v| v > 0));
    }
}
