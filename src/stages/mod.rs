//! Pipeline stages
//!
//! Stages 2-4 (pitch, smoothing, segment) derive WHICH notes occurred;
//! stages 5-6 (onset, duration) derive WHEN they start and how long they
//! last; stage 7 (tempo) runs once over the whole clip. The MIDI assembler
//! fuses the three strands.

pub mod duration;
pub mod onset;
pub mod pitch;
pub mod segment;
pub mod smoothing;
pub mod tempo;
