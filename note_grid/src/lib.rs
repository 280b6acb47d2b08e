//! # note_grid
//!
//! Chromatic note model and the 2D coordinate → note pitch mapper.
//!
//! The playing surface is a grid: pitch class along the horizontal axis
//! (the 12 chromatic names starting at C), octave band along the vertical
//! axis.  A normalized hand position alone therefore addresses one of
//! `12 × octaves` notes — no gesture complexity needed.
//!
//! ## Quick start
//!
//! ```rust
//! use note_grid::{NoteGrid, NoteName};
//!
//! let grid = NoteGrid::default();          // octaves 3–6, 48 notes
//! let note = grid.note_at(0.0, 0.0);       // top-left of the camera image
//! assert_eq!(note.name, NoteName::B);      // x is mirrored: x'=1 → last class
//! assert_eq!(note.octave, 3);              // lowest band at the top
//! assert_eq!(note.to_string(), "B3");
//! ```

use std::fmt;

/// Pitch classes per octave.
pub const NOTES_PER_OCTAVE: usize = 12;

// ════════════════════════════════════════════════════════════════════════════
// NoteName — the 12 chromatic pitch classes
// ════════════════════════════════════════════════════════════════════════════

/// One of the 12 chromatic pitch classes, in fixed order starting at C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum NoteName {
    C = 0,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl NoteName {
    /// All 12 names in chromatic order.
    pub const ALL: [NoteName; NOTES_PER_OCTAVE] = [
        NoteName::C,
        NoteName::Cs,
        NoteName::D,
        NoteName::Ds,
        NoteName::E,
        NoteName::F,
        NoteName::Fs,
        NoteName::G,
        NoteName::Gs,
        NoteName::A,
        NoteName::As,
        NoteName::B,
    ];

    /// Semitone offset from C (0–11).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name by chromatic index; wraps modulo 12.
    pub fn from_index(i: usize) -> NoteName {
        Self::ALL[i % NOTES_PER_OCTAVE]
    }

    /// Display label, e.g. `"C#"`.
    pub fn label(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::B => "B",
        }
    }

    /// True for the sharps — the black keys of a piano.
    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            NoteName::Cs | NoteName::Ds | NoteName::Fs | NoteName::Gs | NoteName::As
        )
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Note — the atomic playable unit
// ════════════════════════════════════════════════════════════════════════════

/// A pitch class plus an octave: the atomic playable unit.
///
/// Displays as `"<Name><Octave>"`, e.g. `"C#4"` — the identity used by
/// both the synthesizer and the key-highlight lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    pub name: NoteName,
    pub octave: i8,
}

impl Note {
    pub fn new(name: NoteName, octave: i8) -> Self {
        Note { name, octave }
    }

    /// MIDI note number, clamped to 0–127.  C4 (middle C) is 60.
    pub fn midi(self) -> u8 {
        let n = (self.octave as i32 + 1) * 12 + self.name.index() as i32;
        n.clamp(0, 127) as u8
    }

    /// Equal-temperament frequency in Hz, A4 = 440.
    pub fn frequency(self) -> f32 {
        440.0 * 2f32.powf((self.midi() as f32 - 69.0) / 12.0)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name.label(), self.octave)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteGrid — the 2D playing surface
// ════════════════════════════════════════════════════════════════════════════

/// The 2D pitch grid: chromatic classes along x, an ascending octave
/// band along y.
///
/// Mapping is deterministic and total: coordinates are clamped to the
/// unit square, never indexed out of bounds.  The horizontal axis is
/// mirrored (`x' = 1 − x`) to compensate for a front-facing camera
/// presenting a mirror image.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteGrid {
    octaves: Vec<i8>,
}

impl Default for NoteGrid {
    /// Octaves 3–6: the 48-note surface of the original layout.
    fn default() -> Self {
        NoteGrid { octaves: vec![3, 4, 5, 6] }
    }
}

impl NoteGrid {
    /// Grid over the given ascending octave band.
    ///
    /// Returns `None` for an empty band — a grid must address at least
    /// one octave row.
    pub fn new(octaves: Vec<i8>) -> Option<Self> {
        if octaves.is_empty() {
            return None;
        }
        Some(NoteGrid { octaves })
    }

    /// The octave band, lowest row first.
    pub fn octaves(&self) -> &[i8] {
        &self.octaves
    }

    /// Number of octave rows.
    pub fn rows(&self) -> usize {
        self.octaves.len()
    }

    /// Total notes on the surface.
    pub fn note_count(&self) -> usize {
        self.rows() * NOTES_PER_OCTAVE
    }

    /// Map a normalized camera-space point to a note.
    ///
    /// `x` is mirrored, both axes are clamped to `[0, 1]`, and the
    /// resulting indices are clamped into range, so any finite input
    /// yields a valid note.
    pub fn note_at(&self, x: f32, y: f32) -> Note {
        let mirrored = 1.0 - x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);

        let note_idx =
            ((mirrored * NOTES_PER_OCTAVE as f32) as usize).min(NOTES_PER_OCTAVE - 1);
        let row = ((y * self.rows() as f32) as usize).min(self.rows() - 1);

        Note::new(NoteName::from_index(note_idx), self.octaves[row])
    }

    /// All notes in row-major order: lowest octave row first, chromatic
    /// within each row.  The order the on-screen keys are generated in.
    pub fn notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.octaves
            .iter()
            .flat_map(|&oct| NoteName::ALL.iter().map(move |&name| Note::new(name, oct)))
    }

    /// Row-major position of `note` on the grid, if its octave is in the
    /// band.  Used for key highlighting.
    pub fn key_index(&self, note: Note) -> Option<usize> {
        let row = self.octaves.iter().position(|&o| o == note.octave)?;
        Some(row * NOTES_PER_OCTAVE + note.name.index())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn note_display_matches_synth_encoding() {
        assert_eq!(Note::new(NoteName::Cs, 4).to_string(), "C#4");
        assert_eq!(Note::new(NoteName::C, 3).to_string(), "C3");
        assert_eq!(Note::new(NoteName::B, 6).to_string(), "B6");
    }

    #[test]
    fn midi_numbers() {
        assert_eq!(Note::new(NoteName::C, 4).midi(), 60); // middle C
        assert_eq!(Note::new(NoteName::A, 4).midi(), 69);
        assert_eq!(Note::new(NoteName::B, 6).midi(), 95);
    }

    #[test]
    fn frequencies() {
        assert_relative_eq!(Note::new(NoteName::A, 4).frequency(), 440.0, epsilon = 0.01);
        assert_relative_eq!(Note::new(NoteName::C, 4).frequency(), 261.63, epsilon = 0.01);
        assert_relative_eq!(Note::new(NoteName::A, 3).frequency(), 220.0, epsilon = 0.01);
    }

    #[test]
    fn empty_band_rejected() {
        assert!(NoteGrid::new(vec![]).is_none());
        assert!(NoteGrid::new(vec![4]).is_some());
    }

    #[test]
    fn mapping_is_total_over_the_unit_square() {
        let grid = NoteGrid::default();
        for xi in 0..=20 {
            for yi in 0..=20 {
                let x = xi as f32 / 20.0;
                let y = yi as f32 / 20.0;
                let n = grid.note_at(x, y);
                assert!(NoteName::ALL.contains(&n.name));
                assert!(grid.octaves().contains(&n.octave));
            }
        }
    }

    #[test]
    fn mirroring() {
        let grid = NoteGrid::default();
        for xi in 0..=12 {
            let x = xi as f32 / 12.0;
            let expected = (((1.0 - x) * 12.0) as usize).min(11);
            assert_eq!(grid.note_at(x, 0.0).name.index(), expected, "x = {x}");
        }
    }

    #[test]
    fn boundary_corners() {
        let grid = NoteGrid::default();
        // Top-left of the image: x'=1 → last class, lowest octave.
        let tl = grid.note_at(0.0, 0.0);
        assert_eq!(tl.name.index(), 11);
        assert_eq!(tl.octave, 3);
        // Near bottom-right: x'≈0 → first class, highest octave.
        let br = grid.note_at(0.999, 0.999);
        assert_eq!(br.name.index(), 0);
        assert_eq!(br.octave, 6);
    }

    #[test]
    fn out_of_range_coordinates_clamp() {
        let grid = NoteGrid::default();
        assert_eq!(grid.note_at(-3.0, -1.0), grid.note_at(0.0, 0.0));
        assert_eq!(grid.note_at(7.5, 42.0), grid.note_at(1.0, 1.0));
    }

    #[test]
    fn notes_iterator_is_row_major() {
        let grid = NoteGrid::default();
        let all: Vec<Note> = grid.notes().collect();
        assert_eq!(all.len(), 48);
        assert_eq!(all[0].to_string(), "C3");
        assert_eq!(all[11].to_string(), "B3");
        assert_eq!(all[12].to_string(), "C4");
        assert_eq!(all[47].to_string(), "B6");
    }

    #[test]
    fn key_index_round_trips_the_iterator() {
        let grid = NoteGrid::default();
        for (i, note) in grid.notes().enumerate() {
            assert_eq!(grid.key_index(note), Some(i));
        }
        assert_eq!(grid.key_index(Note::new(NoteName::C, 7)), None);
    }
}
