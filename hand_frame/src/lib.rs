//! # hand_frame
//!
//! Data model for a single tracked hand — 21 skeletal landmarks in
//! normalized image space — plus the pure gesture classifier built on it.
//!
//! The landmark topology follows the MediaPipe hand-skeleton convention:
//!
//! ```text
//! 0  WRIST
//! 1–4   thumb   (CMC, MCP, IP, TIP)
//! 5–8   index   (MCP, PIP, DIP, TIP)
//! 9–12  middle  (MCP, PIP, DIP, TIP)
//! 13–16 ring    (MCP, PIP, DIP, TIP)
//! 17–20 pinky   (MCP, PIP, DIP, TIP)
//! ```
//!
//! Coordinates are normalized to the camera image: `x`, `y` in `[0, 1]`
//! with `y` growing **downward** (image space), `z` a relative depth the
//! classifier ignores.
//!
//! ## Input policy
//!
//! Malformed input is rejected at the boundary: [`HandFrame::from_points`]
//! refuses anything other than exactly 21 finite landmarks.  Every
//! classifier function is therefore total over a `HandFrame` — no
//! per-call validation, no panics.  Finite coordinates outside `[0, 1]`
//! are accepted here and clamped by the note mapper downstream.

use thiserror::Error;

/// Number of landmarks in one hand frame.
pub const LANDMARK_COUNT: usize = 21;

/// Minimum number of extended fingers for the hand to count as "open".
pub const OPEN_HAND_THRESHOLD: usize = 3;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (MediaPipe hand-skeleton convention)
// ════════════════════════════════════════════════════════════════════════════

/// Named landmark indices into a [`HandFrame`].
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Fingertips, thumb first.
    pub const FINGER_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

    /// Reference joint per finger for the extension heuristic: the
    /// thumb's IP joint, the PIP joint of every other finger.
    pub const FINGER_PIPS: [usize; 5] = [THUMB_IP, INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP];
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single tracked skeletal point in normalized image space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    /// Horizontal coordinate, 0.0 (left edge) to 1.0 (right edge).
    pub x: f32,
    /// Vertical coordinate, 0.0 (top edge) to 1.0 (bottom edge).
    pub y: f32,
    /// Relative depth; unused by the classifier.
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameError
// ════════════════════════════════════════════════════════════════════════════

/// Rejection reasons for a malformed landmark frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("expected 21 landmarks, got {0}")]
    WrongLength(usize),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// One camera frame's worth of hand landmarks: exactly
/// [`LANDMARK_COUNT`] points, immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Build a frame from a landmark slice.
    ///
    /// Rejects slices that are not exactly 21 points long and points
    /// with NaN or infinite coordinates.
    pub fn from_points(points: &[Landmark]) -> Result<Self, FrameError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongLength(points.len()));
        }
        for (i, p) in points.iter().enumerate() {
            if !p.is_finite() {
                return Err(FrameError::NonFinite(i));
            }
        }
        let mut arr = [Landmark::default(); LANDMARK_COUNT];
        arr.copy_from_slice(points);
        Ok(HandFrame { points: arr })
    }

    /// Landmark at `index` (0–20).  Indices come from the
    /// [`landmarks`] module; anything else is a caller bug.
    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    /// The index fingertip — the point the piano grid is addressed with.
    pub fn index_tip(&self) -> Landmark {
        self.points[landmarks::INDEX_TIP]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Hand chirality.
///
/// The thumb-extension heuristic compares horizontal coordinates and is
/// therefore chirality-dependent; the caller states which hand it is
/// tracking rather than the classifier guessing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture classifier — pure, frame-local functions
// ════════════════════════════════════════════════════════════════════════════

/// Gesture facts derived from a single frame.  Recomputed every frame;
/// carries no identity across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureState {
    pub hand_open: bool,
    pub index_pointing: bool,
    /// Landmark indices of the fingertips that count as extended.
    pub extended: Vec<usize>,
}

/// Fingertip landmark indices of the extended fingers.
///
/// A finger is extended when its tip is above its reference joint in
/// image space (`tip.y < pip.y`).  The thumb extends sideways instead:
/// for a right hand its tip must be left of the IP joint on the mirrored
/// camera image (`tip.x > ip.x`), for a left hand the reverse.
///
/// Known limitation: with the wrong `handedness` the thumb test inverts,
/// so an open hand may count only 4 of 5 — still enough to pass
/// [`is_hand_open`], but [`GestureState::extended`] will omit the thumb.
pub fn extended_fingertips(frame: &HandFrame, handedness: Handedness) -> Vec<usize> {
    let mut extended = Vec::with_capacity(5);
    for (i, (&tip_idx, &pip_idx)) in landmarks::FINGER_TIPS
        .iter()
        .zip(landmarks::FINGER_PIPS.iter())
        .enumerate()
    {
        let tip = frame.point(tip_idx);
        let pip = frame.point(pip_idx);
        let is_extended = if i == 0 {
            match handedness {
                Handedness::Right => tip.x > pip.x,
                Handedness::Left => tip.x < pip.x,
            }
        } else {
            tip.y < pip.y
        };
        if is_extended {
            extended.push(tip_idx);
        }
    }
    extended
}

/// True when at least [`OPEN_HAND_THRESHOLD`] of the 5 fingers are
/// extended.
pub fn is_hand_open(frame: &HandFrame, handedness: Handedness) -> bool {
    extended_fingertips(frame, handedness).len() >= OPEN_HAND_THRESHOLD
}

/// True when the index finger points up/out rather than curling: TIP,
/// PIP and MCP form a strictly ascending chain toward the tip
/// (`tip.y < pip.y < mcp.y` in image space).
pub fn is_index_finger_pointing(frame: &HandFrame) -> bool {
    let tip = frame.point(landmarks::INDEX_TIP);
    let pip = frame.point(landmarks::INDEX_PIP);
    let mcp = frame.point(landmarks::INDEX_MCP);
    tip.y < pip.y && pip.y < mcp.y
}

/// Classify one frame: all gesture facts in a single pass.
pub fn classify(frame: &HandFrame, handedness: Handedness) -> GestureState {
    let extended = extended_fingertips(frame, handedness);
    GestureState {
        hand_open: extended.len() >= OPEN_HAND_THRESHOLD,
        index_pointing: is_index_finger_pointing(frame),
        extended,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::landmarks::*;
    use super::*;

    /// A flat right hand, palm toward the camera, all fingers up:
    /// every tip above its PIP, thumb tip to the right of its IP.
    fn open_right_hand() -> Vec<Landmark> {
        let mut pts = vec![Landmark::default(); LANDMARK_COUNT];
        pts[WRIST] = Landmark::new(0.50, 0.90, 0.0);

        // Thumb runs rightward.
        pts[THUMB_CMC] = Landmark::new(0.55, 0.80, 0.0);
        pts[THUMB_MCP] = Landmark::new(0.60, 0.75, 0.0);
        pts[THUMB_IP] = Landmark::new(0.65, 0.72, 0.0);
        pts[THUMB_TIP] = Landmark::new(0.70, 0.70, 0.0);

        // Four fingers run upward, evenly spread.
        for (f, base_x) in [(INDEX_MCP, 0.42), (MIDDLE_MCP, 0.48), (RING_MCP, 0.54), (PINKY_MCP, 0.60)] {
            pts[f] = Landmark::new(base_x, 0.60, 0.0); // MCP
            pts[f + 1] = Landmark::new(base_x, 0.45, 0.0); // PIP
            pts[f + 2] = Landmark::new(base_x, 0.35, 0.0); // DIP
            pts[f + 3] = Landmark::new(base_x, 0.25, 0.0); // TIP
        }
        pts
    }

    fn curl_finger(pts: &mut [Landmark], tip: usize, pip: usize) {
        // Tip drops below the reference joint.
        pts[tip].y = pts[pip].y + 0.10;
    }

    fn frame(pts: &[Landmark]) -> HandFrame {
        HandFrame::from_points(pts).unwrap()
    }

    #[test]
    fn rejects_wrong_length() {
        let pts = vec![Landmark::default(); 20];
        assert_eq!(
            HandFrame::from_points(&pts),
            Err(FrameError::WrongLength(20))
        );
    }

    #[test]
    fn rejects_non_finite() {
        let mut pts = open_right_hand();
        pts[INDEX_TIP].y = f32::NAN;
        assert_eq!(
            HandFrame::from_points(&pts),
            Err(FrameError::NonFinite(INDEX_TIP))
        );
    }

    #[test]
    fn open_hand_all_five_extended() {
        let f = frame(&open_right_hand());
        let ext = extended_fingertips(&f, Handedness::Right);
        assert_eq!(ext, vec![THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP]);
        assert!(is_hand_open(&f, Handedness::Right));
    }

    #[test]
    fn three_curled_fingers_close_the_hand() {
        let mut pts = open_right_hand();
        curl_finger(&mut pts, INDEX_TIP, INDEX_PIP);
        curl_finger(&mut pts, MIDDLE_TIP, MIDDLE_PIP);
        curl_finger(&mut pts, RING_TIP, RING_PIP);
        let f = frame(&pts);
        // Only thumb + pinky remain: 2 < 3.
        assert!(!is_hand_open(&f, Handedness::Right));
    }

    #[test]
    fn two_curled_fingers_keep_the_hand_open() {
        let mut pts = open_right_hand();
        curl_finger(&mut pts, RING_TIP, RING_PIP);
        curl_finger(&mut pts, PINKY_TIP, PINKY_PIP);
        let f = frame(&pts);
        assert!(is_hand_open(&f, Handedness::Right));
    }

    #[test]
    fn thumb_heuristic_flips_with_handedness() {
        let f = frame(&open_right_hand());
        let right = extended_fingertips(&f, Handedness::Right);
        let left = extended_fingertips(&f, Handedness::Left);
        assert!(right.contains(&THUMB_TIP));
        assert!(!left.contains(&THUMB_TIP));
    }

    #[test]
    fn index_pointing_requires_ascending_chain() {
        let f = frame(&open_right_hand());
        assert!(is_index_finger_pointing(&f));

        // Curl the index: tip below PIP breaks the chain.
        let mut pts = open_right_hand();
        curl_finger(&mut pts, INDEX_TIP, INDEX_PIP);
        assert!(!is_index_finger_pointing(&frame(&pts)));

        // PIP at MCP height breaks it too (chain must be strict).
        let mut pts = open_right_hand();
        pts[INDEX_PIP].y = pts[INDEX_MCP].y;
        assert!(!is_index_finger_pointing(&frame(&pts)));
    }

    #[test]
    fn classify_bundles_all_facts() {
        let f = frame(&open_right_hand());
        let g = classify(&f, Handedness::Right);
        assert!(g.hand_open);
        assert!(g.index_pointing);
        assert_eq!(g.extended.len(), 5);
    }
}
