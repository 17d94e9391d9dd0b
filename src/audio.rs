//! Audio I/O and per-clip pipeline state

use crate::analysis::{NoteEvent, PitchFrame, SmoothedFrame};
use crate::config::Config;
use crate::error::{Result, TranscribeError};
use hound::WavReader;
use std::path::Path;

/// Per-clip state threaded through the pipeline stages.
///
/// Stages 2-4 fill the pitch-identity fields, stages 5-6 the timing fields,
/// stage 7 the tempo; MIDI assembly fuses them. Built fresh per request.
#[derive(Debug, Clone)]
pub struct ClipState {
    /// Audio samples (mono, normalized to [-1, 1])
    pub y: Vec<f32>,
    /// Sample rate in Hz
    pub sr: u32,

    /// Confidence-gated pitch observations, sorted by time
    pub pitch_frames: Vec<PitchFrame>,
    /// Majority-vote smoothed frames, one per pitch frame
    pub smoothed_frames: Vec<SmoothedFrame>,
    /// Run-length collapsed note identities
    pub note_events: Vec<NoteEvent>,
    /// Ascending note-attack timestamps in seconds
    pub onsets: Vec<f32>,
    /// One duration per onset, floored at the configured minimum
    pub durations: Vec<f32>,
    /// Raw tempo estimate; may be degenerate until MIDI assembly
    pub tempo_bpm: Option<f32>,
}

impl ClipState {
    /// Create state from an already-decoded waveform
    pub fn from_samples(y: Vec<f32>, sr: u32) -> Self {
        ClipState {
            y,
            sr,
            pitch_frames: Vec::new(),
            smoothed_frames: Vec::new(),
            note_events: Vec::new(),
            onsets: Vec::new(),
            durations: Vec::new(),
            tempo_bpm: None,
        }
    }

    /// Audio duration in seconds
    pub fn duration_sec(&self) -> f32 {
        if self.sr == 0 {
            return 0.0;
        }
        self.y.len() as f32 / self.sr as f32
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }
}

/// Load a canonical (WAV) audio file, returning mono samples and sample rate.
///
/// Container formats (WebM etc.) are not handled here; they go through the
/// external transcoding collaborator first.
pub fn load_audio_file<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "wav" {
        return Err(TranscribeError::InvalidAudioFormat(format!(
            "expected canonical WAV input, got {:?}",
            extension
        )));
    }

    let mut reader =
        WavReader::open(path).map_err(|e| TranscribeError::AudioFileError(e.to_string()))?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.channels > 2 {
        return Err(TranscribeError::InvalidAudioFormat(format!(
            "unsupported channel count {}",
            spec.channels
        )));
    }
    if spec.bits_per_sample > 32 {
        return Err(TranscribeError::InvalidAudioFormat(format!(
            "unsupported bit depth: {}",
            spec.bits_per_sample
        )));
    }

    let mut samples: Vec<f32> = Vec::with_capacity(reader.len() as usize);
    match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            for sample in reader.samples::<i32>() {
                let sample =
                    sample.map_err(|e| TranscribeError::AudioFileError(e.to_string()))? as f32;
                samples.push(sample / max_value);
            }
        }
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                samples.push(sample.map_err(|e| TranscribeError::AudioFileError(e.to_string()))?);
            }
        }
    }

    // A hummed clip carries the same melody on both channels; averaging is
    // the right downmix
    let samples = if spec.channels == 2 {
        samples.chunks_exact(2).map(|c| (c[0] + c[1]) / 2.0).collect()
    } else {
        samples
    };

    Ok((samples, spec.sample_rate))
}

/// Validate that a file exists, decodes, and has a usable sample rate.
///
/// Silent and empty waveforms are deliberately accepted: they flow through
/// the pipeline to an empty MIDI track instead of failing the request.
pub fn validate_audio_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TranscribeError::InputValidationError(format!(
            "audio file does not exist: {}",
            path.display()
        )));
    }

    let (_, sr) = load_audio_file(path)?;
    if sr < config.audio.min_sample_rate || sr > config.audio.max_sample_rate {
        return Err(TranscribeError::UnsupportedSampleRate(sr));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples() {
        let state = ClipState::from_samples(vec![0.0; 44_100], 44_100);
        assert_eq!(state.n_samples(), 44_100);
        assert!((state.duration_sec() - 1.0).abs() < 1e-6);
        assert!(state.pitch_frames.is_empty());
        assert!(state.tempo_bpm.is_none());
    }

    #[test]
    fn test_empty_state() {
        let state = ClipState::from_samples(Vec::new(), 44_100);
        assert_eq!(state.n_samples(), 0);
        assert_eq!(state.duration_sec(), 0.0);
    }

    #[test]
    fn test_non_wav_extension_rejected() {
        let err = load_audio_file("clip.webm").unwrap_err();
        assert!(matches!(err, TranscribeError::InvalidAudioFormat(_)));
    }

    #[test]
    fn test_missing_file_fails_validation() {
        let config = Config::default();
        let err = validate_audio_file("/nonexistent/clip.wav", &config).unwrap_err();
        assert!(matches!(err, TranscribeError::InputValidationError(_)));
    }
}
