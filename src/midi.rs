//! Stage 8: MIDI assembly
//!
//! Fuses the three analysis strands — note identities, onsets, durations —
//! with the global tempo into a single-instrument MIDI track. The three
//! sequences are zipped positionally and truncate to the shortest; a
//! cardinality mismatch is expected occasionally (the onset detector is
//! independent of the segmenter) and is logged rather than failed.

use crate::analysis::{MidiNote, NoteEvent};
use crate::config::Config;
use crate::error::{Result, TranscribeError};
use crate::note;
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tracing::warn;

/// Assemble and serialize the MIDI track.
///
/// A non-positive tempo is replaced by the configured fallback; that is a
/// degenerate-data condition, never an error. An empty note list still
/// produces a valid (silent) file.
pub fn assemble(
    notes: &[NoteEvent],
    onsets: &[f32],
    durations: &[f32],
    tempo_bpm: f32,
    config: &Config,
) -> Result<Vec<u8>> {
    let cfg = &config.midi;

    let tempo_bpm = if tempo_bpm <= 0.0 {
        warn!(
            estimate = tempo_bpm,
            fallback = cfg.fallback_bpm,
            "non-positive tempo estimate, substituting fallback"
        );
        cfg.fallback_bpm
    } else {
        tempo_bpm
    };

    let kept = notes.len().min(onsets.len()).min(durations.len());
    if notes.len() != onsets.len() || onsets.len() != durations.len() {
        warn!(
            notes = notes.len(),
            onsets = onsets.len(),
            durations = durations.len(),
            kept,
            "sequence cardinality mismatch, positional zip truncates"
        );
    }

    let mut midi_notes = Vec::with_capacity(kept);
    for i in 0..kept {
        let pitch = note::note_name_to_number(&notes[i].note).ok_or_else(|| {
            TranscribeError::MidiExportError(format!("unmappable note name {:?}", notes[i].note))
        })?;
        midi_notes.push(MidiNote {
            pitch,
            velocity: cfg.velocity,
            start_sec: onsets[i],
            end_sec: onsets[i] + durations[i],
        });
    }

    serialize_track(&midi_notes, tempo_bpm, config)
}

/// Serialize timed notes into single-track MIDI bytes
pub fn serialize_track(notes: &[MidiNote], tempo_bpm: f32, config: &Config) -> Result<Vec<u8>> {
    let cfg = &config.midi;
    let ppq = cfg.ppq;
    let ticks_per_sec = ppq as f32 * tempo_bpm / 60.0;
    let tempo_uspq = (60_000_000.0 / tempo_bpm) as u32;

    // Absolute-tick events; at equal ticks note-offs sort before note-ons
    const OFF: u8 = 0;
    const ON: u8 = 1;
    let mut absolute: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::with_capacity(notes.len() * 2);
    for n in notes {
        let start_tick = (n.start_sec * ticks_per_sec).round() as u32;
        let end_tick = (n.end_sec * ticks_per_sec).round() as u32;
        absolute.push((
            start_tick,
            ON,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(n.pitch),
                    vel: u7::new(n.velocity),
                },
            },
        ));
        absolute.push((
            end_tick,
            OFF,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(n.pitch),
                    vel: u7::new(0),
                },
            },
        ));
    }
    absolute.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut track = Vec::with_capacity(absolute.len() + 3);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_uspq))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::ProgramChange {
                program: u7::new(cfg.program),
            },
        },
    });

    let mut last_tick = 0u32;
    for (tick, _, kind) in absolute {
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(ppq)),
        },
        tracks: vec![track],
    };

    let mut bytes = Vec::new();
    smf.write_std(&mut std::io::Cursor::new(&mut bytes))
        .map_err(|e| TranscribeError::MidiExportError(format!("failed to write MIDI: {}", e)))?;
    Ok(bytes)
}
