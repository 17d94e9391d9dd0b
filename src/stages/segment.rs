//! Stage 4: run-length note segmentation
//!
//! Consecutive identical smoothed notes collapse into a single event. Only
//! the note identity survives; timing is reattached later from the
//! independent onset analysis. Runs of "no note" are segmented like any
//! other run and then dropped, so absence never becomes a label.

use crate::analysis::{NoteEvent, SmoothedFrame};
use crate::audio::ClipState;
use crate::config::Config;
use crate::error::Result;
use tracing::info;

pub fn run(state: &mut ClipState, _config: &Config) -> Result<()> {
    state.note_events = segment(&state.smoothed_frames);
    info!(events = state.note_events.len(), "note segmentation complete");
    Ok(())
}

/// Collapse maximal runs of identical notes into discrete events
pub fn segment(frames: &[SmoothedFrame]) -> Vec<NoteEvent> {
    let mut runs: Vec<&Option<String>> = Vec::new();
    let mut last: Option<&Option<String>> = None;

    for frame in frames {
        if last != Some(&frame.note) {
            runs.push(&frame.note);
            last = Some(&frame.note);
        }
    }

    runs.into_iter()
        .filter_map(|note| note.clone())
        .map(|note| NoteEvent { note })
        .collect()
}
