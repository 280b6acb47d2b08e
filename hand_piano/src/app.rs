//! Top-level application state.
//!
//! `AppState` is the session object: it owns the playback controller,
//! the synthesizer handle, the keyboard visual state, and the status
//! readouts.  It is created by [`run`], processes one [`FrameEvent`] at
//! a time to completion, and is shut down exactly once on exit — there
//! is no module-level mutable state anywhere.

use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use hand_frame::Handedness;
use note_grid::NoteGrid;

use crate::controller::{PlaybackController, PlaybackEvent};
use crate::keyboard::KeyboardState;
#[cfg(not(feature = "leap"))]
use crate::source::SimFrameSource;
use crate::source::{spawn_frame_source, FrameEvent};
use crate::synth::Synth;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    /// Ascending octave band of the grid (vertical axis).
    pub octaves: Vec<i8>,
    /// Which hand the classifier's thumb heuristic assumes.
    pub handedness: Handedness,
    /// GM instrument program (0–127).
    pub program: u8,
    /// MIDI channel (0–15).
    pub channel: u8,
    /// MIDI attack velocity (0–127).
    pub velocity: u8,
    /// Initial channel volume, 0.0–1.0.
    pub volume: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            octaves: vec![3, 4, 5, 6],
            handedness: Handedness::Right,
            program: 0, // acoustic grand piano
            channel: 0,
            velocity: 100,
            volume: 0.5,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    grid: NoteGrid,
    controller: PlaybackController,
    synth: Synth,
    keyboard: KeyboardState,

    // ── per-frame presentation state ─────────────────────────────────────
    /// Index fingertip in camera space, when a hand is visible.
    cursor: Option<(f32, f32)>,
    pub status: String,
    volume: f32,

    // ── fps counter ──────────────────────────────────────────────────────
    frames: u32,
    fps: u32,
    fps_window: Instant,

    stopped: bool,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        let grid = NoteGrid::new(cfg.octaves).unwrap_or_default();
        let controller = PlaybackController::new(grid.clone(), cfg.handedness);
        let synth = Synth::spawn(cfg.program, cfg.channel, cfg.velocity, cfg.volume);
        let keyboard = KeyboardState::new(&grid);

        AppState {
            grid,
            controller,
            synth,
            keyboard,
            cursor: None,
            status: "Show your hand — open palm, index finger up".to_string(),
            volume: cfg.volume,
            frames: 0,
            fps: 0,
            fps_window: Instant::now(),
            stopped: false,
        }
    }

    // ── process one FrameEvent ───────────────────────────────────────────

    pub fn handle_frame(&mut self, event: FrameEvent) {
        if self.stopped {
            return;
        }
        let events = match event {
            FrameEvent::Stop => {
                self.shutdown();
                return;
            }
            FrameEvent::NoHand => {
                self.cursor = None;
                self.status = "No hand detected".to_string();
                self.controller.observe(None)
            }
            FrameEvent::Hand(frame) => {
                let tip = frame.index_tip();
                self.cursor = Some((tip.x, tip.y));
                let events = self.controller.observe(Some(&frame));
                self.status = match self.controller.current() {
                    Some(note) => format!("Hand detected — playing {}", note),
                    None => "Hand detected — not pointing".to_string(),
                };
                events
            }
        };
        self.apply(&events);
    }

    fn apply(&mut self, events: &[PlaybackEvent]) {
        for event in events {
            match event {
                PlaybackEvent::Attack(note) => self.synth.attack(*note),
                PlaybackEvent::Release(_) => self.synth.release(),
            }
        }
        // Highlight follows the controller, not the event order.
        let active = self.controller.current().and_then(|n| self.grid.key_index(n));
        self.keyboard.set_active(active);
    }

    // ── volume ───────────────────────────────────────────────────────────

    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.synth.set_volume(self.volume);
        self.status = format!("Volume {}%", (self.volume * 100.0).round() as u32);
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self) {
        self.keyboard.tick();

        self.frames += 1;
        if self.fps_window.elapsed().as_secs() >= 1 {
            self.fps = self.frames;
            self.frames = 0;
            self.fps_window = Instant::now();
        }
    }

    // ── shutdown (external stop) ─────────────────────────────────────────

    /// Force `Silent`, release the synth, and stop processing frames.
    /// Idempotent; called at most effectively once.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.controller.silence();
        self.keyboard.set_active(None);
        self.cursor = None;
        self.synth.release();
        self.synth.quit();
        self.status = "Stopped".to_string();
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }
    pub fn fps(&self) -> u32 {
        self.fps
    }
    pub fn volume(&self) -> f32 {
        self.volume
    }
    pub fn is_playing(&self) -> bool {
        self.controller.current().is_some()
    }
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Now-playing readout: note name, octave and frequency.
    pub fn readout(&self) -> String {
        match self.controller.current() {
            Some(note) => format!(
                "{}  octave {}  {} Hz",
                note,
                note.octave,
                note.frequency().round() as u32
            ),
            None => "None".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the
/// visualizer, the frame source (simulation by default, hardware with
/// `--features leap`), and drives the event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── Sim input channel (visualizer → frame source) ─────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(feature = "leap")]
    let frame_rx = {
        // Hardware frames; the visualizer's poses go nowhere.
        drop(sim_rx);
        spawn_frame_source(crate::source::LeapFrameSource)
    };
    #[cfg(not(feature = "leap"))]
    let frame_rx = spawn_frame_source(SimFrameSource { rx: sim_rx });

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg);

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → SimInput poses / volume keys
        if !vis.poll_input() {
            break;
        }
        let dv = vis.take_volume_delta();
        if dv != 0.0 {
            app.adjust_volume(dv);
        }

        // 2. Drain frame events — each processed to completion before
        //    the next is taken.
        loop {
            match frame_rx.try_recv() {
                Ok(FrameEvent::Stop) => {
                    app.shutdown();
                    return Ok(());
                }
                Ok(event) => app.handle_frame(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app.shutdown();
                    return Ok(());
                }
            }
        }

        // 3. Per-frame logic
        app.tick();

        // 4. Render
        vis.render(
            app.keyboard(),
            app.cursor(),
            &app.status,
            &app.readout(),
            app.fps(),
            app.volume(),
            app.is_playing(),
        );
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
