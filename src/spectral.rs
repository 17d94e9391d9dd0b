//! Spectral processing utilities (STFT, novelty curve)

use ndarray::Array2;
use rustfft::{num_complex::Complex32, FftPlanner};

/// STFT of a mono signal
#[derive(Debug, Clone)]
pub struct StftData {
    /// Positive-frequency bins, shape (n_fft / 2 + 1, n_frames)
    pub s: Array2<Complex32>,
    pub freqs: Vec<f32>,
    pub times: Vec<f32>,
}

/// Compute a Hann-windowed STFT.
///
/// Returns zero frames when the signal is shorter than one FFT window.
pub fn stft(y: &[f32], n_fft: usize, hop_length: usize, sample_rate: u32) -> StftData {
    let n_bins = n_fft / 2 + 1;
    let n_frames = if y.len() >= n_fft {
        (y.len() - n_fft) / hop_length + 1
    } else {
        0
    };

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann_window(n_fft);

    let mut s = Array2::<Complex32>::zeros((n_bins, n_frames));
    let mut frame = vec![Complex32::new(0.0, 0.0); n_fft];

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_length;
        for (i, slot) in frame.iter_mut().enumerate() {
            *slot = Complex32::new(y[start + i] * window[i], 0.0);
        }
        fft.process(&mut frame);
        for (i, &bin) in frame[..n_bins].iter().enumerate() {
            s[[i, frame_idx]] = bin;
        }
    }

    let freqs = (0..n_bins)
        .map(|i| i as f32 * sample_rate as f32 / n_fft as f32)
        .collect();
    let times = (0..n_frames)
        .map(|i| i as f32 * hop_length as f32 / sample_rate as f32)
        .collect();

    StftData { s, freqs, times }
}

fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

/// Compute the magnitude spectrogram
pub fn magnitude_spectrogram(stft_data: &StftData) -> Array2<f32> {
    stft_data.s.map(|c| c.norm())
}

/// Spectral flux novelty curve: per-frame sum of positive magnitude
/// increases across bins. Index-aligned with the STFT frames; flux[0] is 0.
pub fn spectral_flux(mag: &Array2<f32>) -> Vec<f32> {
    let n_frames = mag.shape()[1];
    let mut flux = vec![0.0; n_frames];

    for t in 1..n_frames {
        let mut frame_flux = 0.0;
        for f in 0..mag.shape()[0] {
            let diff = mag[[f, t]] - mag[[f, t - 1]];
            if diff > 0.0 {
                frame_flux += diff;
            }
        }
        flux[t] = frame_flux;
    }

    flux
}
