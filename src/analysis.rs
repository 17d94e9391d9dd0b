//! Pipeline data model and notes-data export

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A confident pitch observation from the tracker.
///
/// Serializes to the `{time, note, confidence}` record shape consumed by
/// downstream clients; the raw frequency is an internal detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchFrame {
    #[serde(rename = "time")]
    pub time_sec: f32,
    #[serde(skip)]
    pub frequency_hz: f32,
    pub note: Option<String>,
    pub confidence: f32,
}

/// One smoothed frame per tracked frame: window-averaged time, majority note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedFrame {
    #[serde(rename = "time")]
    pub time_sec: f32,
    pub note: Option<String>,
}

/// A maximal run of identical smoothed notes.
///
/// Timing is intentionally absent; start and duration are reattached from
/// the independent onset analysis during MIDI assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub note: String,
}

/// Fully timed note record, ready for MIDI serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub pitch: u8,
    pub velocity: u8,
    pub start_sec: f32,
    pub end_sec: f32,
}

/// Write the ordered notes data as JSON
pub fn export_notes_json(frames: &[PitchFrame], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        crate::error::TranscribeError::AnalysisExportError(format!(
            "cannot create {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::to_writer_pretty(file, frames)?;
    Ok(())
}
