//! Stage 6: onset-driven duration estimation
//!
//! An RMS amplitude envelope is scanned forward from each onset; the note
//! ends at the first hop where the envelope drops below the energy
//! threshold, bounded by the next onset (or the end of the waveform for the
//! final onset). Every duration is floored so it can never be zero even
//! when the envelope is already quiet at the onset sample.

use crate::audio::ClipState;
use crate::config::{Config, EnvelopeConfig};
use crate::error::Result;
use tracing::info;

pub fn run(state: &mut ClipState, config: &Config) -> Result<()> {
    state.durations = estimate_durations(&state.onsets, &state.y, state.sr, &config.envelope);
    info!(
        durations = state.durations.len(),
        "duration estimation complete"
    );
    Ok(())
}

/// Per-frame RMS amplitude envelope, one value per hop position
pub fn amplitude_envelope(y: &[f32], frame_size: usize, hop_length: usize) -> Vec<f32> {
    let mut envelope = Vec::with_capacity(y.len() / hop_length.max(1) + 1);
    let mut start = 0;
    while start < y.len() {
        let frame = &y[start..(start + frame_size).min(y.len())];
        let rms = (frame.iter().map(|&x| x * x).sum::<f32>() / frame.len() as f32).sqrt();
        envelope.push(rms);
        start += hop_length;
    }
    envelope
}

/// Estimate one duration per onset. Output length always equals the onset
/// count; empty onsets yield empty durations.
pub fn estimate_durations(
    onsets: &[f32],
    y: &[f32],
    sr: u32,
    cfg: &EnvelopeConfig,
) -> Vec<f32> {
    if onsets.is_empty() {
        return Vec::new();
    }

    let envelope = amplitude_envelope(y, cfg.frame_size, cfg.hop_length);
    let mut durations = Vec::with_capacity(onsets.len());

    for (i, &onset) in onsets.iter().enumerate() {
        let onset_sample = (onset * sr as f32) as usize;
        let bound_sample = if i + 1 < onsets.len() {
            (onsets[i + 1] * sr as f32) as usize
        } else {
            y.len()
        };

        let mut end_sample = bound_sample;
        let mut pos = onset_sample;
        while pos < bound_sample {
            let level = envelope.get(pos / cfg.hop_length).copied().unwrap_or(0.0);
            if level < cfg.energy_threshold {
                end_sample = pos;
                break;
            }
            pos += cfg.hop_length;
        }

        let duration = end_sample.saturating_sub(onset_sample) as f32 / sr as f32;
        durations.push(duration.max(cfg.min_duration_sec));
    }

    durations
}
