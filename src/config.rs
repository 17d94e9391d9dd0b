//! Configuration system for the clip-to-MIDI transcriber

use crate::error::{Result, TranscribeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub audio: AudioConfig,
    pub pitch: PitchConfig,
    pub smoothing: SmoothingConfig,
    pub onset: OnsetConfig,
    pub envelope: EnvelopeConfig,
    pub tempo: TempoConfig,
    pub midi: MidiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            audio: AudioConfig::default(),
            pitch: PitchConfig::default(),
            smoothing: SmoothingConfig::default(),
            onset: OnsetConfig::default(),
            envelope: EnvelopeConfig::default(),
            tempo: TempoConfig::default(),
            midi: MidiConfig::default(),
        }
    }
}

/// Audio input constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            min_sample_rate: 8_000,
            max_sample_rate: 192_000,
        }
    }
}

/// Pitch tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Samples handed to the pitch model per invocation
    pub chunk_size: usize,
    /// Frames below this model confidence are discarded
    pub confidence_threshold: f32,
    /// Deadline for a single model invocation
    pub model_timeout_ms: u64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_240,
            confidence_threshold: 0.74,
            model_timeout_ms: 30_000,
        }
    }
}

/// Pitch smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Centered majority-vote window, clipped at sequence boundaries
    pub window_size: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

/// Onset detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    /// Rolling window for the adaptive novelty threshold
    pub threshold_window_sec: f32,
    /// Std-dev multiplier on top of the rolling mean
    pub k: f32,
    /// Minimum spacing between reported onsets
    pub refractory_ms: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            threshold_window_sec: 1.0,
            k: 1.5,
            refractory_ms: 30.0,
        }
    }
}

/// Amplitude envelope / duration estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub frame_size: usize,
    pub hop_length: usize,
    /// RMS level under which a note is considered decayed
    pub energy_threshold: f32,
    /// Floor applied to every estimated duration
    pub min_duration_sec: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            hop_length: 512,
            energy_threshold: 0.025,
            min_duration_sec: 0.05,
        }
    }
}

/// Tempo estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub min_bpm: f32,
    pub max_bpm: f32,
    /// Center of the log-normal tempo prior
    pub prior_bpm: f32,
    /// Prior spread in octaves
    pub prior_spread_octaves: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 240.0,
            prior_bpm: 120.0,
            prior_spread_octaves: 1.0,
        }
    }
}

/// MIDI assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    pub velocity: u8,
    /// General MIDI program (0 = Acoustic Grand Piano)
    pub program: u8,
    /// Pulses per quarter note
    pub ppq: u16,
    /// Substituted when the tempo estimate is non-positive
    pub fallback_bpm: f32,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            velocity: 100,
            program: 0,
            ppq: 960,
            fallback_bpm: 120.0,
        }
    }
}

/// Load configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        TranscribeError::ConfigValidationFailed(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))
    })?;
    let config: Config = serde_json::from_str(&text).map_err(|e| {
        TranscribeError::ConfigValidationFailed(format!(
            "cannot parse {}: {}",
            path.display(),
            e
        ))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration parameter ranges
pub fn validate_config(config: &Config) -> Result<()> {
    if config.audio.min_sample_rate == 0 || config.audio.min_sample_rate >= config.audio.max_sample_rate {
        return Err(TranscribeError::InvalidConfigParameter(
            "audio sample rate window is empty".to_string(),
        ));
    }
    if config.pitch.chunk_size == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "pitch.chunk_size must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.pitch.confidence_threshold) {
        return Err(TranscribeError::InvalidConfigParameter(format!(
            "pitch.confidence_threshold must be in [0, 1], got {}",
            config.pitch.confidence_threshold
        )));
    }
    if config.pitch.model_timeout_ms == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "pitch.model_timeout_ms must be positive".to_string(),
        ));
    }
    if config.smoothing.window_size == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "smoothing.window_size must be at least 1".to_string(),
        ));
    }
    if config.onset.n_fft == 0 || config.onset.hop_length == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "onset.n_fft and onset.hop_length must be positive".to_string(),
        ));
    }
    if config.onset.hop_length > config.onset.n_fft {
        return Err(TranscribeError::InvalidConfigParameter(format!(
            "onset.hop_length ({}) exceeds onset.n_fft ({})",
            config.onset.hop_length, config.onset.n_fft
        )));
    }
    if config.envelope.frame_size == 0 || config.envelope.hop_length == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "envelope.frame_size and envelope.hop_length must be positive".to_string(),
        ));
    }
    if config.envelope.energy_threshold < 0.0 {
        return Err(TranscribeError::InvalidConfigParameter(format!(
            "envelope.energy_threshold must be non-negative, got {}",
            config.envelope.energy_threshold
        )));
    }
    if config.envelope.min_duration_sec <= 0.0 {
        return Err(TranscribeError::InvalidConfigParameter(format!(
            "envelope.min_duration_sec must be positive, got {}",
            config.envelope.min_duration_sec
        )));
    }
    if config.tempo.min_bpm <= 0.0 || config.tempo.min_bpm >= config.tempo.max_bpm {
        return Err(TranscribeError::InvalidConfigParameter(
            "tempo BPM window is empty".to_string(),
        ));
    }
    if config.midi.velocity > 127 || config.midi.program > 127 {
        return Err(TranscribeError::InvalidConfigParameter(
            "midi.velocity and midi.program must be 0-127".to_string(),
        ));
    }
    if config.midi.ppq == 0 {
        return Err(TranscribeError::InvalidConfigParameter(
            "midi.ppq must be positive".to_string(),
        ));
    }
    if config.midi.fallback_bpm <= 0.0 {
        return Err(TranscribeError::InvalidConfigParameter(format!(
            "midi.fallback_bpm must be positive, got {}",
            config.midi.fallback_bpm
        )));
    }
    Ok(())
}
