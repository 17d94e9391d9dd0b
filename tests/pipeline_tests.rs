//! End-to-end pipeline scenarios

use hum2midi::analysis::PitchFrame;
use hum2midi::workspace::AudioDecoder;
use hum2midi::{process_notes, Config, TranscribeError, Transcriber};
use midly::{MetaMessage, Smf, TrackEventKind};
use std::f32::consts::PI;
use std::path::Path;

const SR: u32 = 22_050;

fn sine_burst(audio: &mut [f32], sr: u32, start_sec: f32, duration_sec: f32, frequency: f32) {
    let start = (start_sec * sr as f32) as usize;
    let len = (duration_sec * sr as f32) as usize;
    let fade = (sr as f32 * 0.008) as usize;
    for i in 0..len.min(audio.len().saturating_sub(start)) {
        let t = i as f32 / sr as f32;
        let edge = (i.min(len - 1 - i).min(fade)) as f32 / fade as f32;
        audio[start + i] = (2.0 * PI * frequency * t).sin() * 0.6 * edge;
    }
}

fn track_bpm(bytes: &[u8]) -> f32 {
    let smf = Smf::parse(bytes).unwrap();
    for event in &smf.tracks[0] {
        if let TrackEventKind::Meta(MetaMessage::Tempo(uspq)) = &event.kind {
            return 60_000_000.0 / uspq.as_int() as f32;
        }
    }
    panic!("no tempo event in track");
}

fn note_on_pitches(bytes: &[u8]) -> Vec<u8> {
    let smf = Smf::parse(bytes).unwrap();
    let mut pitches = Vec::new();
    for event in &smf.tracks[0] {
        if let TrackEventKind::Midi {
            message: midly::MidiMessage::NoteOn { key, vel },
            ..
        } = &event.kind
        {
            if vel.as_int() > 0 {
                pitches.push(key.as_int());
            }
        }
    }
    pitches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_clip_yields_empty_midi_at_default_tempo() {
        let transcriber = Transcriber::new(Config::default());
        let result = transcriber.transcribe(vec![0.0; SR as usize * 2], SR).unwrap();

        assert!(result.notes_data.is_empty());
        assert!(result.note_events.is_empty());
        assert!(result.onsets.is_empty());
        assert!(result.durations.is_empty());
        assert_eq!(result.tempo_bpm, 0.0);

        assert!(note_on_pitches(&result.midi_bytes).is_empty());
        assert!((track_bpm(&result.midi_bytes) - 120.0).abs() < 0.1);
    }

    #[test]
    fn test_empty_waveform_is_not_an_error() {
        let transcriber = Transcriber::new(Config::default());
        let result = transcriber.transcribe(Vec::new(), SR).unwrap();
        assert!(result.notes_data.is_empty());
        assert!(!result.midi_bytes.is_empty());
    }

    #[test]
    fn test_smooth_then_segment_absorbs_minority_note() {
        let config = Config::default();
        let frames: Vec<PitchFrame> = [
            ("C", 0.1f32),
            ("C", 0.2),
            ("D", 0.3),
            ("E", 0.4),
            ("E", 0.5),
        ]
        .iter()
        .map(|&(note, time_sec)| PitchFrame {
            time_sec,
            frequency_hz: 440.0,
            note: Some(note.to_string()),
            confidence: 0.9,
        })
        .collect();

        let events = process_notes(&frames, &config);
        let names: Vec<&str> = events.iter().map(|e| e.note.as_str()).collect();
        assert_eq!(names, vec!["C", "E"]);
    }

    #[test]
    fn test_two_tone_clip_transcribes_both_pitches() {
        // two clearly separated tones, slightly sharp of A4 and E4 so the
        // truncating name mapping stays on the intended note
        let mut audio = vec![0.0f32; SR as usize * 2];
        sine_burst(&mut audio, SR, 0.25, 0.5, 446.0);
        sine_burst(&mut audio, SR, 1.25, 0.5, 335.0);

        let transcriber = Transcriber::new(Config::default());
        let result = transcriber.transcribe(audio, SR).unwrap();

        assert!(!result.notes_data.is_empty());
        let names: Vec<&str> = result
            .note_events
            .iter()
            .map(|e| e.note.as_str())
            .collect();
        assert_eq!(names, vec!["A4", "E4"]);

        assert_eq!(result.onsets.len(), 2);
        assert!((result.onsets[0] - 0.25).abs() < 0.06);
        assert!((result.onsets[1] - 1.25).abs() < 0.06);
        assert_eq!(result.durations.len(), 2);

        assert_eq!(note_on_pitches(&result.midi_bytes), vec![69, 64]);
    }

    #[test]
    fn test_request_artifacts_are_uuid_keyed() {
        let transcriber = Transcriber::new(Config::default());
        let a = transcriber.transcribe(vec![0.0; SR as usize], SR).unwrap();
        let b = transcriber.transcribe(vec![0.0; SR as usize], SR).unwrap();

        assert!(a.midi_filename.starts_with("transcription_"));
        assert!(a.midi_filename.ends_with(".mid"));
        assert_ne!(a.midi_filename, b.midi_filename);
        assert!(a.notes_filename().contains(&a.request_id.to_string()));
    }

    #[test]
    fn test_transcribe_container_runs_the_external_decoder() {
        struct WavWritingDecoder;
        impl AudioDecoder for WavWritingDecoder {
            fn decode(&self, _input: &Path, output_wav: &Path) -> anyhow::Result<()> {
                let spec = hound::WavSpec {
                    channels: 1,
                    sample_rate: SR,
                    bits_per_sample: 32,
                    sample_format: hound::SampleFormat::Float,
                };
                let mut writer = hound::WavWriter::create(output_wav, spec)?;
                let mut audio = vec![0.0f32; SR as usize];
                sine_burst(&mut audio, SR, 0.2, 0.4, 446.0);
                for sample in audio {
                    writer.write_sample(sample)?;
                }
                writer.finalize()?;
                Ok(())
            }
        }

        let transcriber = Transcriber::new(Config::default());
        let result = transcriber
            .transcribe_container("recording.webm", &WavWritingDecoder)
            .unwrap();
        assert!(!result.midi_bytes.is_empty());
        assert_eq!(
            result.midi_filename,
            format!("transcription_{}.mid", result.request_id)
        );
    }

    #[test]
    fn test_failed_decode_is_a_bad_input_error() {
        struct BrokenDecoder;
        impl AudioDecoder for BrokenDecoder {
            fn decode(&self, _input: &Path, _output_wav: &Path) -> anyhow::Result<()> {
                anyhow::bail!("transcoder exited with status 1")
            }
        }

        let transcriber = Transcriber::new(Config::default());
        let err = transcriber
            .transcribe_container("recording.webm", &BrokenDecoder)
            .unwrap_err();
        assert!(matches!(err, TranscribeError::DecodeFailed(_)));
    }
}
