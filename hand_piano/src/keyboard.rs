//! On-screen keyboard state.
//!
//! One `Key` per grid note, laid out row-major (lowest octave row at the
//! top, chromatic within each row).  The visual state tracks the single
//! active key and a flash value that decays each frame so a fresh attack
//! reads as a pulse rather than a static highlight.

use note_grid::{Note, NoteGrid, NOTES_PER_OCTAVE};

// ════════════════════════════════════════════════════════════════════════════
// Key — a single cell of the keyboard
// ════════════════════════════════════════════════════════════════════════════

/// One on-screen key.
#[derive(Clone, Debug)]
pub struct Key {
    pub note: Note,
    /// Sharps render as black keys.
    pub is_black: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardState — the data behind the keyboard
// ════════════════════════════════════════════════════════════════════════════

/// Visual state for the whole keyboard.
#[derive(Debug)]
pub struct KeyboardState {
    pub keys: Vec<Key>,
    active: Option<usize>,
    /// 1.0 right after an attack, decaying toward 0 each tick.
    pub flash: f32,
}

impl KeyboardState {
    /// Generate the keys for `grid`, row-major.
    pub fn new(grid: &NoteGrid) -> Self {
        let keys = grid
            .notes()
            .map(|note| Key { note, is_black: note.name.is_sharp() })
            .collect();
        KeyboardState { keys, active: None, flash: 0.0 }
    }

    /// Number of octave rows.
    pub fn rows(&self) -> usize {
        self.keys.len() / NOTES_PER_OCTAVE
    }

    /// Row-major index of the highlighted key, if any.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Move the highlight.  A change to a new key restarts the flash;
    /// re-setting the same key is a no-op (a held note stays lit without
    /// pulsing).
    pub fn set_active(&mut self, index: Option<usize>) {
        if index == self.active {
            return;
        }
        self.active = index;
        self.flash = if index.is_some() { 1.0 } else { 0.0 };
    }

    /// Per-frame animation: decay the attack flash.
    pub fn tick(&mut self) {
        self.flash *= 0.88;
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_one_key_per_grid_note() {
        let grid = NoteGrid::default();
        let kb = KeyboardState::new(&grid);
        assert_eq!(kb.keys.len(), 48);
        assert_eq!(kb.rows(), 4);
        assert_eq!(kb.keys[0].note.to_string(), "C3");
        assert_eq!(kb.keys[47].note.to_string(), "B6");
    }

    #[test]
    fn sharps_are_black_keys() {
        let grid = NoteGrid::default();
        let kb = KeyboardState::new(&grid);
        let blacks: usize = kb.keys.iter().filter(|k| k.is_black).count();
        assert_eq!(blacks, 5 * 4); // 5 sharps per octave row
        assert!(kb.keys[1].is_black); // C#3
        assert!(!kb.keys[0].is_black); // C3
    }

    #[test]
    fn activation_flashes_once() {
        let grid = NoteGrid::default();
        let mut kb = KeyboardState::new(&grid);

        kb.set_active(Some(16));
        assert_eq!(kb.active(), Some(16));
        assert_eq!(kb.flash, 1.0);

        kb.tick();
        let decayed = kb.flash;
        assert!(decayed < 1.0 && decayed > 0.0);

        // Re-setting the same key must not restart the pulse.
        kb.set_active(Some(16));
        assert_eq!(kb.flash, decayed);
    }

    #[test]
    fn deactivation_clears_flash() {
        let grid = NoteGrid::default();
        let mut kb = KeyboardState::new(&grid);
        kb.set_active(Some(3));
        kb.set_active(None);
        assert_eq!(kb.active(), None);
        assert_eq!(kb.flash, 0.0);
    }

    #[test]
    fn flash_decays_to_zero() {
        let grid = NoteGrid::default();
        let mut kb = KeyboardState::new(&grid);
        kb.set_active(Some(0));
        for _ in 0..100 {
            kb.tick();
        }
        assert_eq!(kb.flash, 0.0);
    }
}
