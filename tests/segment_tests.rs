//! Validation tests for run-length note segmentation

use hum2midi::analysis::{NoteEvent, SmoothedFrame};
use hum2midi::stages::segment::segment;

fn frame(time_sec: f32, note: Option<&str>) -> SmoothedFrame {
    SmoothedFrame {
        time_sec,
        note: note.map(|n| n.to_string()),
    }
}

fn event(note: &str) -> NoteEvent {
    NoteEvent {
        note: note.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs() {
        let frames = vec![
            frame(0.0, Some("C4")),
            frame(0.1, Some("C4")),
            frame(0.2, Some("C4")),
            frame(0.3, Some("D4")),
            frame(0.4, Some("D4")),
            frame(0.5, Some("E4")),
        ];
        assert_eq!(segment(&frames), vec![event("C4"), event("D4"), event("E4")]);
    }

    #[test]
    fn test_idempotent_on_segmented_input() {
        let frames = vec![
            frame(0.0, Some("C4")),
            frame(0.1, Some("D4")),
            frame(0.2, Some("C4")),
            frame(0.3, Some("E4")),
        ];
        let events = segment(&frames);
        assert_eq!(events.len(), 4);

        // re-segmenting the already collapsed sequence changes nothing
        let round_two: Vec<SmoothedFrame> = events
            .iter()
            .enumerate()
            .map(|(i, e)| frame(i as f32 * 0.1, Some(&e.note)))
            .collect();
        assert_eq!(segment(&round_two), events);
    }

    #[test]
    fn test_single_run_emits_one_event() {
        let frames = vec![
            frame(0.0, Some("A4")),
            frame(0.1, Some("A4")),
            frame(0.2, Some("A4")),
        ];
        assert_eq!(segment(&frames), vec![event("A4")]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn test_absent_note_runs_are_dropped() {
        let frames = vec![
            frame(0.0, Some("C4")),
            frame(0.1, None),
            frame(0.2, None),
            frame(0.3, Some("D4")),
        ];
        assert_eq!(segment(&frames), vec![event("C4"), event("D4")]);
    }

    #[test]
    fn test_all_absent_yields_empty() {
        let frames = vec![frame(0.0, None), frame(0.1, None)];
        assert!(segment(&frames).is_empty());
    }
}
