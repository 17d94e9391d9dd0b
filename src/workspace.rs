//! Per-request artifact isolation
//!
//! Every incoming clip gets a UUID-keyed scope so concurrent requests never
//! collide on intermediate files. The scope owns a temp directory that is
//! removed on drop, success or failure.

use crate::error::{Result, TranscribeError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// External transcoding collaborator: turns an arbitrary container
/// (e.g. browser-recorded WebM) into a canonical WAV file.
pub trait AudioDecoder {
    fn decode(&self, input: &Path, output_wav: &Path) -> anyhow::Result<()>;
}

/// Scoped identity and scratch space for one transcription request
#[derive(Debug)]
pub struct RequestScope {
    id: Uuid,
    temp: TempDir,
}

impl RequestScope {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()
            .map_err(|e| TranscribeError::WorkspaceError(format!("temp dir: {}", e)))?;
        Ok(RequestScope {
            id: Uuid::new_v4(),
            temp,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Where the external decoder should place the canonical waveform
    pub fn decoded_wav_path(&self) -> PathBuf {
        self.temp.path().join(format!("decoded_{}.wav", self.id))
    }
}

/// Output filename for a request's MIDI artifact
pub fn midi_filename(id: Uuid) -> String {
    format!("transcription_{}.mid", id)
}

/// Output filename for a request's notes-data artifact
pub fn notes_filename(id: Uuid) -> String {
    format!("notes_{}.json", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_are_unique() {
        let a = RequestScope::new().unwrap();
        let b = RequestScope::new().unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.decoded_wav_path(), b.decoded_wav_path());
    }

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let scope = RequestScope::new().unwrap();
        let dir = scope.decoded_wav_path().parent().unwrap().to_path_buf();
        std::fs::write(scope.decoded_wav_path(), b"scratch").unwrap();
        assert!(dir.exists());
        drop(scope);
        assert!(!dir.exists());
    }

    #[test]
    fn test_artifact_names_carry_request_id() {
        let id = Uuid::new_v4();
        assert!(midi_filename(id).contains(&id.to_string()));
        assert!(notes_filename(id).contains(&id.to_string()));
    }
}
