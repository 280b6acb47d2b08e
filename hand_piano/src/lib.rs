//! # hand_piano
//!
//! A hand-tracked virtual piano: one tracked hand's index fingertip
//! addresses a 12 × 4 chromatic grid (pitch class along x, octave band
//! along y), with real-time MIDI playback and a software-rendered
//! on-screen keyboard.
//!
//! ## Gesture → action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Hand open + index pointing | Play the note under the index fingertip |
//! | Move the hand while playing | Release the old note, attack the new one |
//! | Curl the index / close the fist | Release the sounding note |
//! | Hand leaves the frame | Release the sounding note |
//!
//! Playback is monophonic: at most one note sounds at any instant, and a
//! held, unchanged position never retriggers.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: mouse + keyboard drive a synthetic
//!   21-point hand through the real classifier.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC and converts its skeleton to the same 21-point topology.
//!
//! ### Simulation controls
//!
//! | Input | Meaning |
//! |---|---|
//! | Mouse | Index fingertip position |
//! | `Space` (hold) | Open hand, index pointing — plays |
//! | `C` (hold) | Closed fist — releases |
//! | `H` | Toggle hand visibility |
//! | `↑` / `↓` | Volume up / down |
//! | `Q` | Quit |

pub mod app;
pub mod controller;
pub mod keyboard;
pub mod source;
pub mod synth;
pub mod visualizer;
