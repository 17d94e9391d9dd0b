//! Stage 3: sliding-window pitch smoothing
//!
//! A centered majority vote suppresses single-frame jitter in the tracked
//! note sequence. Windows are clipped at the sequence boundaries, so edge
//! windows are simply smaller; output length always equals input length.

use crate::analysis::{PitchFrame, SmoothedFrame};
use crate::audio::ClipState;
use crate::config::Config;
use crate::error::Result;
use tracing::info;

pub fn run(state: &mut ClipState, config: &Config) -> Result<()> {
    state.smoothed_frames = smooth(&state.pitch_frames, config.smoothing.window_size);
    info!(frames = state.smoothed_frames.len(), "pitch smoothing complete");
    Ok(())
}

/// Smooth a pitch-frame sequence with a centered window of `window_size`
pub fn smooth(frames: &[PitchFrame], window_size: usize) -> Vec<SmoothedFrame> {
    let half = window_size.max(1) / 2;
    let mut smoothed = Vec::with_capacity(frames.len());

    for i in 0..frames.len() {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(frames.len());
        let window = &frames[start..end];

        let avg_time = window.iter().map(|f| f.time_sec).sum::<f32>() / window.len() as f32;
        smoothed.push(SmoothedFrame {
            time_sec: avg_time,
            note: majority_note(window),
        });
    }

    smoothed
}

/// Mode of the window's notes with a deterministic tie-break: counts are
/// kept in first-occurrence order and only a strictly greater count
/// displaces the leader, so the first note to reach the maximum wins.
fn majority_note(window: &[PitchFrame]) -> Option<String> {
    let mut counts: Vec<(&Option<String>, usize)> = Vec::new();
    for frame in window {
        match counts.iter_mut().find(|(note, _)| *note == &frame.note) {
            Some(entry) => entry.1 += 1,
            None => counts.push((&frame.note, 1)),
        }
    }

    let mut leader: Option<(&Option<String>, usize)> = None;
    for &(note, count) in &counts {
        if leader.map_or(true, |(_, best)| count > best) {
            leader = Some((note, count));
        }
    }

    leader.and_then(|(note, _)| note.clone())
}
