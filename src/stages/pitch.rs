//! Stage 2: confidence-gated pitch tracking
//!
//! The waveform is split into fixed-size contiguous chunks and each chunk is
//! handed to the pitch model under a deadline. Model frame times are
//! chunk-relative; they are offset into the clip timeline here, and the
//! concatenated sequence is explicitly re-sorted by time so downstream
//! stages can rely on ordering regardless of model timestamp conventions.

use crate::analysis::PitchFrame;
use crate::audio::ClipState;
use crate::config::Config;
use crate::deadline::{self, DeadlineError};
use crate::error::{Result, TranscribeError};
use crate::model::{ModelFrames, PitchModel};
use crate::note;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub fn run(state: &mut ClipState, config: &Config, model: &Arc<dyn PitchModel>) -> Result<()> {
    state.pitch_frames = track(&state.y, state.sr, config, model)?;
    info!(
        frames = state.pitch_frames.len(),
        samples = state.n_samples(),
        "pitch tracking complete"
    );
    Ok(())
}

/// Run the chunked pitch-tracking pass over a waveform
pub fn track(
    y: &[f32],
    sr: u32,
    config: &Config,
    model: &Arc<dyn PitchModel>,
) -> Result<Vec<PitchFrame>> {
    let cfg = &config.pitch;
    if y.is_empty() {
        debug!("empty waveform, no pitch frames");
        return Ok(Vec::new());
    }

    let timeout = Duration::from_millis(cfg.model_timeout_ms);
    let mut frames = Vec::new();

    for (chunk_idx, start) in (0..y.len()).step_by(cfg.chunk_size).enumerate() {
        let end = (start + cfg.chunk_size).min(y.len());
        let chunk = &y[start..end];
        // Model times are chunk-relative; lift them onto the clip timeline
        let chunk_offset_sec = start as f32 / sr as f32;

        let output = predict_chunk(model, chunk, sr, timeout, chunk_idx)?;
        for i in 0..output.len() {
            let confidence = output.confidences[i];
            if confidence < cfg.confidence_threshold {
                continue;
            }
            let frequency = output.frequencies[i];
            frames.push(PitchFrame {
                time_sec: chunk_offset_sec + output.times[i],
                frequency_hz: frequency,
                confidence: (confidence * 100.0).round() / 100.0,
                note: note::frequency_to_note_name(frequency),
            });
        }
    }

    frames.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
    Ok(frames)
}

/// Invoke the model under a deadline, retrying a single expiry
fn predict_chunk(
    model: &Arc<dyn PitchModel>,
    chunk: &[f32],
    sr: u32,
    timeout: Duration,
    chunk_idx: usize,
) -> Result<ModelFrames> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let worker_model = Arc::clone(model);
        let samples = chunk.to_vec();
        let outcome = deadline::run(timeout, move || worker_model.predict(&samples, sr));

        match outcome {
            Ok(Ok(frames)) => return Ok(frames),
            Ok(Err(e)) => {
                return Err(TranscribeError::ModelFailure {
                    stage: "pitch",
                    detail: format!(
                        "{} failed on chunk {} ({} samples): {}",
                        model.name(),
                        chunk_idx,
                        chunk.len(),
                        e
                    ),
                })
            }
            Err(DeadlineError::Expired) if attempts == 1 => {
                warn!(
                    chunk = chunk_idx,
                    timeout_ms = timeout.as_millis() as u64,
                    "pitch model deadline expired, retrying once"
                );
            }
            Err(DeadlineError::Expired) => {
                return Err(TranscribeError::ModelTimeout {
                    stage: "pitch",
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(DeadlineError::WorkerDied) => {
                return Err(TranscribeError::ModelFailure {
                    stage: "pitch",
                    detail: format!(
                        "{} worker died on chunk {} ({} samples)",
                        model.name(),
                        chunk_idx,
                        chunk.len()
                    ),
                })
            }
        }
    }
}
