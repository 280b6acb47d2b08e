//! Landmark frame sources — LeapMotion hardware and mouse/keyboard
//! simulation.
//!
//! The public interface is [`FrameEvent`] delivered over a `mpsc`
//! channel.  Consumers don't need to know whether frames came from real
//! hardware or the simulator; both produce the same 21-point topology
//! and go through the same classifier.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use hand_frame::landmarks::*;
use hand_frame::{HandFrame, Landmark, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// FrameEvent
// ════════════════════════════════════════════════════════════════════════════

/// Per-camera-frame observation emitted by a source.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// A hand is visible; here are its landmarks.
    Hand(HandFrame),
    /// No hand in this frame.
    NoHand,
    /// The source (or the user) requested shutdown.
    Stop,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`FrameEvent`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<FrameEvent>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<FrameEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimInput — raw pose from the simulation window
// ════════════════════════════════════════════════════════════════════════════

/// Pose description sent by the visualizer's input polling, one per
/// rendered frame.  Coordinates are camera space (mirrored once,
/// matching what a front-facing camera would report).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pose {
        x: f32,
        y: f32,
        open: bool,
        pointing: bool,
    },
    NoHand,
    Stop,
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Frame source driven by [`SimInput`] poses from the visualizer's
/// window.
///
/// Each pose is expanded into a full synthetic right-hand skeleton, so
/// the classifier runs on the same input shape it would see from real
/// tracking — the gate logic is exercised, not bypassed.
pub struct SimFrameSource {
    pub rx: Receiver<SimInput>,
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, tx: Sender<FrameEvent>) {
        for input in self.rx {
            let event = match input {
                SimInput::Pose { x, y, open, pointing } => {
                    FrameEvent::Hand(synthetic_frame(x, y, open, pointing))
                }
                SimInput::NoHand => FrameEvent::NoHand,
                SimInput::Stop => {
                    let _ = tx.send(FrameEvent::Stop);
                    return;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// synthetic_frame — posed right-hand skeleton
// ════════════════════════════════════════════════════════════════════════════

/// Build a plausible right-hand frame anchored at `(x, y)` — the index
/// fingertip position in camera space.
///
/// Pose flags:
/// * `open` — thumb, middle, ring and pinky extended (tip above joint,
///   thumb tip beyond its IP joint); curled otherwise.
/// * `pointing` — index TIP < PIP < MCP ascending chain; curled
///   otherwise.  `open` without `pointing` still passes the open-hand
///   test (4 of 5 extended) but fails the gate, exactly like a real
///   open hand with a dropped index finger.
pub fn synthetic_frame(x: f32, y: f32, open: bool, pointing: bool) -> HandFrame {
    let mut pts = [Landmark::default(); LANDMARK_COUNT];

    pts[WRIST] = Landmark::new(x + 0.06, y + 0.45, 0.0);

    // Thumb runs rightward from the palm.
    pts[THUMB_CMC] = Landmark::new(x + 0.09, y + 0.38, 0.0);
    pts[THUMB_MCP] = Landmark::new(x + 0.12, y + 0.33, 0.0);
    pts[THUMB_IP] = Landmark::new(x + 0.15, y + 0.30, 0.0);
    let thumb_tip_x = if open { x + 0.19 } else { x + 0.11 };
    pts[THUMB_TIP] = Landmark::new(thumb_tip_x, y + 0.28, 0.0);

    // The four fingers run upward; tips drop below the PIP when curled.
    let fingers = [
        (INDEX_MCP, 0.00, pointing),
        (MIDDLE_MCP, 0.04, open),
        (RING_MCP, 0.08, open),
        (PINKY_MCP, 0.12, open),
    ];
    for (mcp, dx, extended) in fingers {
        let fx = x + dx;
        pts[mcp] = Landmark::new(fx, y + 0.30, 0.0);
        pts[mcp + 1] = Landmark::new(fx, y + 0.20, 0.0); // PIP
        pts[mcp + 2] = Landmark::new(fx, y + 0.10, 0.0); // DIP
        let tip_y = if extended { y } else { y + 0.26 };
        pts[mcp + 3] = Landmark::new(fx, tip_y, 0.0); // TIP
    }

    // All coordinates are finite by construction.
    HandFrame::from_points(&pts).expect("synthetic frame is well-formed")
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library
/// installed.  Each tracking frame, the first visible hand's bone
/// skeleton is converted to the 21-point topology and its millimeter
/// coordinates normalized into the camera unit square (y inverted so
/// "up" is numerically smaller, x mirrored to the front-facing-camera
/// convention the note mapper expects).
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<FrameEvent>) {
        use leaprs::*;

        // Interaction box (empirically tuned, millimeters).
        const X_MIN: f32 = -250.0;
        const X_MAX: f32 = 250.0;
        const Y_MIN: f32 = 100.0;
        const Y_MAX: f32 = 450.0;

        let norm_x = |mm: f32| 1.0 - (mm - X_MIN) / (X_MAX - X_MIN); // mirror
        let norm_y = |mm: f32| 1.0 - (mm - Y_MIN) / (Y_MAX - Y_MIN); // invert
        let norm_z = |mm: f32| mm / 400.0;

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let Some(hand) = hands.first() else {
                    if tx.send(FrameEvent::NoHand).is_err() {
                        return;
                    }
                    continue;
                };

                let mut pts = [Landmark::default(); LANDMARK_COUNT];
                macro_rules! lm {
                    ($v:expr) => {{
                        let v = $v;
                        Landmark::new(norm_x(v.x), norm_y(v.y), norm_z(v.z))
                    }};
                }

                pts[WRIST] = lm!(hand.palm().position());

                // LeapC digit order matches the topology: thumb first.
                for (d, digit) in hand.digits().take(5).enumerate() {
                    let base = 1 + d * 4;
                    if d == 0 {
                        // Thumb: CMC, MCP, IP, TIP
                        pts[base] = lm!(digit.metacarpal().prev_joint());
                        pts[base + 1] = lm!(digit.proximal().prev_joint());
                        pts[base + 2] = lm!(digit.distal().prev_joint());
                    } else {
                        // Fingers: MCP, PIP, DIP, TIP
                        pts[base] = lm!(digit.proximal().prev_joint());
                        pts[base + 1] = lm!(digit.intermediate().prev_joint());
                        pts[base + 2] = lm!(digit.distal().prev_joint());
                    }
                    pts[base + 3] = lm!(digit.distal().next_joint());
                }

                // A frame the tracker mangled (non-finite joints) is
                // dropped; the controller holds its previous state.
                let event = match HandFrame::from_points(&pts) {
                    Ok(f) => FrameEvent::Hand(f),
                    Err(_) => continue,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_frame::{classify, is_hand_open, is_index_finger_pointing, Handedness};

    #[test]
    fn open_pointing_pose_passes_the_gate() {
        let f = synthetic_frame(0.5, 0.5, true, true);
        assert!(is_hand_open(&f, Handedness::Right));
        assert!(is_index_finger_pointing(&f));
    }

    #[test]
    fn fist_pose_fails_both_tests() {
        let f = synthetic_frame(0.5, 0.5, false, false);
        assert!(!is_hand_open(&f, Handedness::Right));
        assert!(!is_index_finger_pointing(&f));
    }

    #[test]
    fn open_without_pointing_keeps_four_fingers() {
        let f = synthetic_frame(0.5, 0.5, true, false);
        let g = classify(&f, Handedness::Right);
        assert!(g.hand_open);
        assert!(!g.index_pointing);
        assert_eq!(g.extended.len(), 4);
    }

    #[test]
    fn fingertip_anchors_the_pose() {
        let f = synthetic_frame(0.25, 0.75, true, true);
        let tip = f.index_tip();
        assert_eq!((tip.x, tip.y), (0.25, 0.75));
    }

    #[test]
    fn sim_source_translates_poses() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_frame_source(SimFrameSource { rx: in_rx });

        in_tx
            .send(SimInput::Pose { x: 0.5, y: 0.5, open: true, pointing: true })
            .unwrap();
        in_tx.send(SimInput::NoHand).unwrap();
        in_tx.send(SimInput::Stop).unwrap();

        assert!(matches!(rx.recv().unwrap(), FrameEvent::Hand(_)));
        assert_eq!(rx.recv().unwrap(), FrameEvent::NoHand);
        assert_eq!(rx.recv().unwrap(), FrameEvent::Stop);
    }
}
