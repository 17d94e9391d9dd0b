//! Error types for the transcription pipeline

use std::fmt;

/// Custom error type for clip-to-MIDI transcription
#[derive(Debug, Clone)]
pub enum TranscribeError {
    /// E001: Invalid audio format (e.g., non-PCM WAV, unsupported container)
    InvalidAudioFormat(String),
    /// E002: Sample rate outside the supported window
    UnsupportedSampleRate(u32),
    /// E003: Configuration validation failed
    ConfigValidationFailed(String),
    /// E004: Invalid configuration parameter
    InvalidConfigParameter(String),
    /// E005: Audio file I/O error
    AudioFileError(String),
    /// E006: Input validation error
    InputValidationError(String),
    /// E007: External transcoding step failed
    DecodeFailed(String),
    /// E008: External model invocation failed
    ModelFailure {
        stage: &'static str,
        detail: String,
    },
    /// E009: External model did not respond within the deadline
    ModelTimeout {
        stage: &'static str,
        timeout_ms: u64,
    },
    /// E010: MIDI serialization error
    MidiExportError(String),
    /// E011: Notes-data export error
    AnalysisExportError(String),
    /// E012: Request workspace (temp artifacts) error
    WorkspaceError(String),
}

impl fmt::Display for TranscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscribeError::InvalidAudioFormat(msg) => {
                write!(f, "E001: Invalid audio format - {}", msg)
            }
            TranscribeError::UnsupportedSampleRate(sr) => {
                write!(f, "E002: Unsupported sample rate {} Hz", sr)
            }
            TranscribeError::ConfigValidationFailed(msg) => {
                write!(f, "E003: Configuration validation failed - {}", msg)
            }
            TranscribeError::InvalidConfigParameter(msg) => {
                write!(f, "E004: Invalid configuration parameter - {}", msg)
            }
            TranscribeError::AudioFileError(msg) => {
                write!(f, "E005: Audio file I/O error - {}", msg)
            }
            TranscribeError::InputValidationError(msg) => {
                write!(f, "E006: Input validation error - {}", msg)
            }
            TranscribeError::DecodeFailed(msg) => {
                write!(f, "E007: Audio decode failed - {}", msg)
            }
            TranscribeError::ModelFailure { stage, detail } => {
                write!(f, "E008: {} model invocation failed - {}", stage, detail)
            }
            TranscribeError::ModelTimeout { stage, timeout_ms } => {
                write!(
                    f,
                    "E009: {} model did not respond within {} ms",
                    stage, timeout_ms
                )
            }
            TranscribeError::MidiExportError(msg) => {
                write!(f, "E010: MIDI export error - {}", msg)
            }
            TranscribeError::AnalysisExportError(msg) => {
                write!(f, "E011: Notes-data export error - {}", msg)
            }
            TranscribeError::WorkspaceError(msg) => {
                write!(f, "E012: Request workspace error - {}", msg)
            }
        }
    }
}

impl std::error::Error for TranscribeError {}

// From implementations for common error types
impl From<std::io::Error> for TranscribeError {
    fn from(err: std::io::Error) -> Self {
        TranscribeError::AudioFileError(format!("File I/O error: {}", err))
    }
}

impl From<serde_json::Error> for TranscribeError {
    fn from(err: serde_json::Error) -> Self {
        TranscribeError::AnalysisExportError(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for transcription operations
pub type Result<T> = std::result::Result<T, TranscribeError>;
