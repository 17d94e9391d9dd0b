//! Stage 5: onset detection
//!
//! Peaks of the spectral-flux novelty curve, gated by a rolling
//! mean-plus-k-sigma threshold and a refractory period, become note-attack
//! timestamps. This is the single source of timing for the pipeline and is
//! computed independently of the pitch/segmentation strand.

use crate::audio::ClipState;
use crate::config::Config;
use crate::error::Result;
use crate::spectral;
use tracing::info;

pub fn run(state: &mut ClipState, config: &Config) -> Result<()> {
    state.onsets = detect_onsets(&state.y, state.sr, config);
    info!(onsets = state.onsets.len(), "onset detection complete");
    Ok(())
}

/// Detect note attacks, returning ascending timestamps in seconds
pub fn detect_onsets(y: &[f32], sr: u32, config: &Config) -> Vec<f32> {
    let cfg = &config.onset;
    if y.len() < cfg.n_fft {
        return Vec::new();
    }

    let stft_data = spectral::stft(y, cfg.n_fft, cfg.hop_length, sr);
    let mag = spectral::magnitude_spectrogram(&stft_data);
    let flux = spectral::spectral_flux(&mag);

    let thresholds = adaptive_threshold(&flux, cfg.threshold_window_sec, sr, cfg.hop_length, cfg.k);
    let refractory_frames =
        ((cfg.refractory_ms / 1000.0) * sr as f32 / cfg.hop_length as f32).round() as usize;
    let peaks = pick_peaks(&flux, &thresholds, refractory_frames.max(1));

    peaks
        .into_iter()
        .map(|frame| frame as f32 * cfg.hop_length as f32 / sr as f32)
        .collect()
}

/// Rolling mean + k·std threshold over a window of `window_sec` each side
fn adaptive_threshold(signal: &[f32], window_sec: f32, sr: u32, hop: usize, k: f32) -> Vec<f32> {
    let window_frames = (window_sec * sr as f32 / hop as f32) as usize;
    let mut thresholds = vec![0.0; signal.len()];

    for i in 0..signal.len() {
        let start = i.saturating_sub(window_frames);
        let end = signal.len().min(i + window_frames + 1);
        let window = &signal[start..end];

        let mean = window.iter().sum::<f32>() / window.len() as f32;
        let variance =
            window.iter().map(|&x| (x - mean).powi(2)).sum::<f32>() / window.len() as f32;
        thresholds[i] = mean + k * variance.sqrt();
    }

    thresholds
}

/// Local maxima above threshold, at least `min_distance` frames apart
fn pick_peaks(signal: &[f32], thresholds: &[f32], min_distance: usize) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;

    for i in 1..signal.len().saturating_sub(1) {
        if let Some(last) = last_peak {
            if i < last + min_distance {
                continue;
            }
        }
        if signal[i] > signal[i - 1] && signal[i] > signal[i + 1] && signal[i] > thresholds[i] {
            peaks.push(i);
            last_peak = Some(i);
        }
    }

    peaks
}
