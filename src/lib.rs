//! Clip-to-MIDI Transcription
//!
//! Turns a short monophonic voice or instrument recording into a MIDI
//! track. Pitch identity (tracking → smoothing → segmentation) and timing
//! (onset detection → duration estimation) are derived in two independent
//! strands over the same waveform, fused with a global tempo estimate at
//! MIDI assembly.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod deadline;
pub mod error;
pub mod midi;
pub mod model;
pub mod note;
pub mod spectral;
pub mod stages;
pub mod workspace;

pub use analysis::{MidiNote, NoteEvent, PitchFrame, SmoothedFrame};
pub use audio::ClipState;
pub use config::Config;
pub use error::{Result, TranscribeError};
pub use model::{PitchModel, YinModel};
pub use workspace::{AudioDecoder, RequestScope};

use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Complete result of one transcription request
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Request identifier keying every produced artifact
    pub request_id: Uuid,
    /// Ordered `{time, note, confidence}` records (pre-segmentation); an
    /// independently useful output, serializable to JSON
    pub notes_data: Vec<PitchFrame>,
    /// Run-length collapsed note identities
    pub note_events: Vec<NoteEvent>,
    /// Detected note-attack timestamps in seconds
    pub onsets: Vec<f32>,
    /// One duration per onset
    pub durations: Vec<f32>,
    /// Raw tempo estimate (may be 0.0 for degenerate input; the MIDI track
    /// itself always carries a positive tempo)
    pub tempo_bpm: f32,
    /// Serialized single-track MIDI file
    pub midi_bytes: Vec<u8>,
    /// UUID-keyed output filename for the MIDI artifact
    pub midi_filename: String,
}

impl Transcription {
    /// UUID-keyed output filename for the notes-data artifact
    pub fn notes_filename(&self) -> String {
        workspace::notes_filename(self.request_id)
    }
}

/// Main transcription pipeline
pub struct Transcriber {
    config: Config,
    model: Arc<dyn PitchModel>,
}

impl Transcriber {
    /// Create a transcriber with the bundled YIN pitch model
    pub fn new(config: Config) -> Self {
        Self::with_model(config, Arc::new(YinModel::default()))
    }

    /// Create a transcriber with a custom pitch model
    pub fn with_model(config: Config, model: Arc<dyn PitchModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transcribe an already-decoded waveform
    pub fn transcribe(&self, samples: Vec<f32>, sample_rate: u32) -> Result<Transcription> {
        self.transcribe_with_id(samples, sample_rate, Uuid::new_v4())
    }

    /// Transcribe a canonical (WAV) audio file
    pub fn transcribe_file<P: AsRef<Path>>(&self, path: P) -> Result<Transcription> {
        let (samples, sample_rate) = audio::load_audio_file(path)?;
        self.transcribe(samples, sample_rate)
    }

    /// Transcribe an arbitrary container by first running it through the
    /// external transcoding collaborator.
    ///
    /// The decoded waveform lives in a UUID-keyed scratch directory that is
    /// removed on every exit path.
    pub fn transcribe_container<P: AsRef<Path>>(
        &self,
        input: P,
        decoder: &dyn AudioDecoder,
    ) -> Result<Transcription> {
        let scope = RequestScope::new()?;
        let wav_path = scope.decoded_wav_path();

        decoder
            .decode(input.as_ref(), &wav_path)
            .map_err(|e| TranscribeError::DecodeFailed(e.to_string()))?;

        let (samples, sample_rate) = audio::load_audio_file(&wav_path)?;
        self.transcribe_with_id(samples, sample_rate, scope.id())
    }

    fn transcribe_with_id(
        &self,
        samples: Vec<f32>,
        sample_rate: u32,
        request_id: Uuid,
    ) -> Result<Transcription> {
        info!(
            request = %request_id,
            samples = samples.len(),
            sample_rate,
            "starting transcription"
        );

        let mut state = ClipState::from_samples(samples, sample_rate);

        // Pitch-identity strand
        stages::pitch::run(&mut state, &self.config, &self.model)?;
        stages::smoothing::run(&mut state, &self.config)?;
        stages::segment::run(&mut state, &self.config)?;

        // Timing strand, independent of the above
        stages::onset::run(&mut state, &self.config)?;
        stages::duration::run(&mut state, &self.config)?;

        stages::tempo::run(&mut state, &self.config)?;

        let tempo_bpm = state.tempo_bpm.unwrap_or(0.0);
        let midi_bytes = midi::assemble(
            &state.note_events,
            &state.onsets,
            &state.durations,
            tempo_bpm,
            &self.config,
        )?;

        info!(
            request = %request_id,
            notes = state.note_events.len(),
            onsets = state.onsets.len(),
            bpm = tempo_bpm,
            midi_bytes = midi_bytes.len(),
            "transcription complete"
        );

        Ok(Transcription {
            request_id,
            notes_data: state.pitch_frames,
            note_events: state.note_events,
            onsets: state.onsets,
            durations: state.durations,
            tempo_bpm,
            midi_bytes,
            midi_filename: workspace::midi_filename(request_id),
        })
    }
}

/// Smooth then segment a tracked note sequence; the pitch-identity half of
/// the pipeline, usable on its own
pub fn process_notes(frames: &[PitchFrame], config: &Config) -> Vec<NoteEvent> {
    let smoothed = stages::smoothing::smooth(frames, config.smoothing.window_size);
    stages::segment::segment(&smoothed)
}

/// Validate an input file and configuration before processing
pub fn validate_input<P: AsRef<Path>>(input_path: P, config: &Config) -> Result<()> {
    config::validate_config(config)?;
    audio::validate_audio_file(input_path, config)?;
    Ok(())
}
