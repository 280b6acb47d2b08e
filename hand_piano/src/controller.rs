//! Playback controller — the monophonic Silent/Sounding state machine.
//!
//! Evaluated once per landmark frame: classify, gate, map, transition.
//! The controller owns the single currently-sounding note and emits
//! attack/release events; it performs no I/O itself, the caller forwards
//! events to the synthesizer and the display.

use hand_frame::{is_hand_open, is_index_finger_pointing, HandFrame, Handedness};
use note_grid::{Note, NoteGrid};

// ════════════════════════════════════════════════════════════════════════════
// PlaybackEvent
// ════════════════════════════════════════════════════════════════════════════

/// Transition side effect to forward to the synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Attack(Note),
    Release(Note),
}

// ════════════════════════════════════════════════════════════════════════════
// PlaybackController
// ════════════════════════════════════════════════════════════════════════════

/// Monophonic playback state machine.
///
/// States: `Silent` (`current == None`) and `Sounding(note)`.  The gate
/// is hand-present ∧ hand-open ∧ index-pointing; while it holds, the
/// index fingertip's grid note is the target.  A held, unchanged note
/// emits nothing — no retriggering on a stable position.
pub struct PlaybackController {
    grid: NoteGrid,
    handedness: Handedness,
    current: Option<Note>,
}

impl PlaybackController {
    pub fn new(grid: NoteGrid, handedness: Handedness) -> Self {
        PlaybackController { grid, handedness, current: None }
    }

    /// The currently-sounding note, if any.
    pub fn current(&self) -> Option<Note> {
        self.current
    }

    /// Process one frame observation (`None` = no hand detected).
    ///
    /// Returns the events this transition emits, in order: at most one
    /// release followed by at most one attack.
    pub fn observe(&mut self, frame: Option<&HandFrame>) -> Vec<PlaybackEvent> {
        let Some(frame) = frame else {
            return self.silence();
        };
        if !(is_hand_open(frame, self.handedness) && is_index_finger_pointing(frame)) {
            return self.silence();
        }

        let tip = frame.index_tip();
        let note = self.grid.note_at(tip.x, tip.y);

        match self.current {
            None => {
                self.current = Some(note);
                vec![PlaybackEvent::Attack(note)]
            }
            Some(prev) if prev != note => {
                self.current = Some(note);
                vec![PlaybackEvent::Release(prev), PlaybackEvent::Attack(note)]
            }
            Some(_) => Vec::new(),
        }
    }

    /// Force the `Silent` state, releasing anything sounding.  Also the
    /// external-stop path: no partial state survives.
    pub fn silence(&mut self) -> Vec<PlaybackEvent> {
        match self.current.take() {
            Some(prev) => vec![PlaybackEvent::Release(prev)],
            None => Vec::new(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::synthetic_frame;
    use note_grid::NoteName;

    fn controller() -> PlaybackController {
        PlaybackController::new(NoteGrid::default(), Handedness::Right)
    }

    /// Camera-space position whose mirrored x lands on E and whose y
    /// lands in the octave-4 row: E4.
    const E4_POS: (f32, f32) = (0.60, 0.30);

    fn playing_at(x: f32, y: f32) -> HandFrame {
        synthetic_frame(x, y, true, true)
    }

    #[test]
    fn position_maps_to_e4() {
        let grid = NoteGrid::default();
        let n = grid.note_at(E4_POS.0, E4_POS.1);
        assert_eq!(n, Note::new(NoteName::E, 4));
    }

    #[test]
    fn silent_to_sounding_emits_attack() {
        let mut c = controller();
        let f = playing_at(E4_POS.0, E4_POS.1);
        let events = c.observe(Some(&f));
        assert_eq!(events, vec![PlaybackEvent::Attack(Note::new(NoteName::E, 4))]);
        assert_eq!(c.current(), Some(Note::new(NoteName::E, 4)));
    }

    #[test]
    fn held_note_is_not_retriggered() {
        let mut c = controller();
        let f = playing_at(E4_POS.0, E4_POS.1);
        c.observe(Some(&f));
        // Same gate, same note, several frames: nothing new.
        for _ in 0..5 {
            assert!(c.observe(Some(&f)).is_empty());
        }
        assert_eq!(c.current(), Some(Note::new(NoteName::E, 4)));
    }

    #[test]
    fn moving_the_hand_releases_then_attacks() {
        let mut c = controller();
        c.observe(Some(&playing_at(E4_POS.0, E4_POS.1)));
        // Move to the octave-5 row, same column.
        let events = c.observe(Some(&playing_at(E4_POS.0, 0.60)));
        assert_eq!(
            events,
            vec![
                PlaybackEvent::Release(Note::new(NoteName::E, 4)),
                PlaybackEvent::Attack(Note::new(NoteName::E, 5)),
            ]
        );
    }

    #[test]
    fn gate_failure_releases() {
        let mut c = controller();
        c.observe(Some(&playing_at(E4_POS.0, E4_POS.1)));
        // Hand still visible but no longer pointing.
        let f = synthetic_frame(E4_POS.0, E4_POS.1, true, false);
        let events = c.observe(Some(&f));
        assert_eq!(events, vec![PlaybackEvent::Release(Note::new(NoteName::E, 4))]);
        assert_eq!(c.current(), None);
    }

    #[test]
    fn hand_disappearing_releases() {
        let mut c = controller();
        c.observe(Some(&playing_at(E4_POS.0, E4_POS.1)));
        let events = c.observe(None);
        assert_eq!(events, vec![PlaybackEvent::Release(Note::new(NoteName::E, 4))]);
    }

    #[test]
    fn silence_while_silent_is_a_no_op() {
        let mut c = controller();
        assert!(c.silence().is_empty());
        assert!(c.observe(None).is_empty());
    }

    #[test]
    fn closed_fist_never_attacks() {
        let mut c = controller();
        let f = synthetic_frame(E4_POS.0, E4_POS.1, false, false);
        assert!(c.observe(Some(&f)).is_empty());
        assert_eq!(c.current(), None);
    }

    #[test]
    fn full_transition_scenario() {
        // Silent → attack E4 → hold → gate false → release.
        let mut c = controller();
        let playing = playing_at(E4_POS.0, E4_POS.1);
        let e4 = Note::new(NoteName::E, 4);

        assert_eq!(c.observe(Some(&playing)), vec![PlaybackEvent::Attack(e4)]);
        assert!(c.observe(Some(&playing)).is_empty());

        let fist = synthetic_frame(E4_POS.0, E4_POS.1, false, false);
        assert_eq!(c.observe(Some(&fist)), vec![PlaybackEvent::Release(e4)]);
        assert_eq!(c.current(), None);
    }
}
