//! Stage 7: global tempo estimation
//!
//! Autocorrelation of the onset-strength curve, scored against a log-normal
//! tempo prior centered on 120 BPM to break octave ties. The estimate is a
//! pass-through: degenerate signals produce 0.0, and correction to the
//! fallback tempo happens at MIDI assembly, not here.

use crate::audio::ClipState;
use crate::config::Config;
use crate::error::Result;
use crate::spectral;
use tracing::info;

pub fn run(state: &mut ClipState, config: &Config) -> Result<()> {
    let bpm = estimate_tempo(&state.y, state.sr, config);
    info!(bpm, "tempo estimation complete");
    state.tempo_bpm = Some(bpm);
    Ok(())
}

/// Estimate the clip's tempo in BPM; returns 0.0 when the signal carries no
/// usable novelty (silence, sub-window input)
pub fn estimate_tempo(y: &[f32], sr: u32, config: &Config) -> f32 {
    let cfg = &config.tempo;
    let onset_cfg = &config.onset;
    if y.len() < onset_cfg.n_fft {
        return 0.0;
    }

    let stft_data = spectral::stft(y, onset_cfg.n_fft, onset_cfg.hop_length, sr);
    let mag = spectral::magnitude_spectrogram(&stft_data);
    let flux = spectral::spectral_flux(&mag);

    let mean = flux.iter().sum::<f32>() / flux.len().max(1) as f32;
    if mean <= f32::EPSILON {
        return 0.0;
    }
    let detrended: Vec<f32> = flux.iter().map(|&v| v - mean).collect();

    let frame_rate = sr as f32 / onset_cfg.hop_length as f32;
    let min_lag = ((60.0 * frame_rate / cfg.max_bpm).ceil() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / cfg.min_bpm).floor() as usize)
        .min(detrended.len().saturating_sub(1));
    if min_lag >= max_lag {
        return 0.0;
    }

    let mut best_bpm = 0.0;
    let mut best_score = 0.0;
    for lag in min_lag..=max_lag {
        let mut acc = 0.0;
        for t in 0..detrended.len() - lag {
            acc += detrended[t] * detrended[t + lag];
        }
        let correlation = acc / (detrended.len() - lag) as f32;
        if correlation <= 0.0 {
            continue;
        }

        let bpm = 60.0 * frame_rate / lag as f32;
        let octaves_off = (bpm / cfg.prior_bpm).log2();
        let prior = (-0.5 * (octaves_off / cfg.prior_spread_octaves).powi(2)).exp();
        let score = correlation * prior;
        if score > best_score {
            best_score = score;
            best_bpm = bpm;
        }
    }

    best_bpm
}
