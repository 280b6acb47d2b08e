//! Real-time MIDI synthesizer thread.
//!
//! Attack/release commands from the UI loop are sent to a thread owning
//! the MIDI connection.  Monophony is enforced at the wire level too: an
//! attack while a note is on releases it first, so a stuck note can
//! never survive a missed release.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use note_grid::Note;

// ════════════════════════════════════════════════════════════════════════════
// SynthCommand — sent to the synth thread
// ════════════════════════════════════════════════════════════════════════════

pub enum SynthCommand {
    /// Begin sounding `note` (releases any previous note first).
    Attack(Note),
    /// Stop the sounding note, if any.
    Release,
    /// Channel volume, 0.0–1.0 (sent as MIDI CC 7).
    SetVolume(f32),
    /// Release and terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        let _ = self.conn.send(&[0xB0 | (channel & 0x0F), controller, value]);
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8) {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8) {}
    fn control_change(&mut self, _ch: u8, _c: u8, _v: u8) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick first available
// ════════════════════════════════════════════════════════════════════════════

/// Try to open the first available MIDI output port.
/// Falls back to `NullOut` with a warning if none found.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("hand_piano_synth") {
        Ok(m) => m,
        Err(e) => {
            eprintln!("[synth] MIDI init error: {} — using null output", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        eprintln!("[synth] No MIDI output ports found — using null output.");
        eprintln!("[synth] Install a MIDI synthesiser such as:");
        eprintln!("        • macOS: built-in CoreMIDI (always available)");
        eprintln!("        • Linux: `timidity -iA` or `fluidsynth`");
        eprintln!("        • Windows: built-in GS Wavetable Synth");
        return Box::new(NullOut);
    }

    // Prefer a softsynth if visible
    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid")
                        || n.contains("timidity")
                        || n.contains("microsoft")
                        || n.contains("gm")
                        || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    eprintln!("[synth] Opening MIDI port: {}", name);

    match midi_out.connect(port, "hand-piano") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            eprintln!("[synth] Failed to connect: {} — using null output", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Voice — monophonic note bookkeeping
// ════════════════════════════════════════════════════════════════════════════

/// Tracks the single note currently on the wire.
struct Voice {
    channel: u8,
    velocity: u8,
    on: Option<u8>,
}

impl Voice {
    fn new(channel: u8, velocity: u8) -> Self {
        Voice { channel, velocity, on: None }
    }

    fn attack(&mut self, midi: &mut dyn MidiOut, note: Note) {
        if let Some(prev) = self.on.take() {
            midi.note_off(self.channel, prev);
        }
        let n = note.midi();
        midi.note_on(self.channel, n, self.velocity);
        self.on = Some(n);
    }

    fn release(&mut self, midi: &mut dyn MidiOut) {
        if let Some(prev) = self.on.take() {
            midi.note_off(self.channel, prev);
        }
    }
}

/// Volume 0.0–1.0 → MIDI CC 7 value 0–127.
fn volume_to_cc(volume: f32) -> u8 {
    (volume.clamp(0.0, 1.0) * 127.0).round() as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Synth — handle to the synthesizer thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the MIDI synthesizer thread.
pub struct Synth {
    cmd_tx: Sender<SynthCommand>,
}

impl Synth {
    /// Spawn the synthesizer thread.
    ///
    /// `program` is the GM instrument (0–127), `volume` the initial
    /// channel volume 0.0–1.0.
    pub fn spawn(program: u8, channel: u8, velocity: u8, volume: f32) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SynthCommand>();
        thread::spawn(move || synth_thread(program, channel, velocity, volume, cmd_rx));
        Synth { cmd_tx }
    }

    pub fn attack(&self, note: Note) {
        let _ = self.cmd_tx.send(SynthCommand::Attack(note));
    }
    pub fn release(&self) {
        let _ = self.cmd_tx.send(SynthCommand::Release);
    }
    pub fn set_volume(&self, volume: f32) {
        let _ = self.cmd_tx.send(SynthCommand::SetVolume(volume));
    }
    pub fn quit(&self) {
        let _ = self.cmd_tx.send(SynthCommand::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// synth_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn synth_thread(
    program: u8,
    channel: u8,
    velocity: u8,
    volume: f32,
    cmd_rx: Receiver<SynthCommand>,
) {
    let mut midi = open_midi_output();
    let mut voice = Voice::new(channel, velocity);

    midi.program_change(channel, program);
    midi.control_change(channel, 7, volume_to_cc(volume));

    loop {
        match cmd_rx.recv() {
            Ok(SynthCommand::Attack(note)) => voice.attack(midi.as_mut(), note),
            Ok(SynthCommand::Release) => voice.release(midi.as_mut()),
            Ok(SynthCommand::SetVolume(v)) => {
                midi.control_change(channel, 7, volume_to_cc(v));
            }
            // Quit or UI hung up: leave nothing sounding.
            Ok(SynthCommand::Quit) | Err(_) => {
                voice.release(midi.as_mut());
                return;
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
    use note_grid::NoteName;

    #[derive(Debug, PartialEq)]
    enum Msg {
        On(u8, u8, u8),
        Off(u8, u8),
        Cc(u8, u8, u8),
        Prog(u8, u8),
    }

    #[derive(Default)]
    struct RecordingOut {
        msgs: Vec<Msg>,
    }

    impl MidiOut for RecordingOut {
        fn program_change(&mut self, ch: u8, p: u8) {
            self.msgs.push(Msg::Prog(ch, p));
        }
        fn note_on(&mut self, ch: u8, n: u8, v: u8) {
            self.msgs.push(Msg::On(ch, n, v));
        }
        fn note_off(&mut self, ch: u8, n: u8) {
            self.msgs.push(Msg::Off(ch, n));
        }
        fn control_change(&mut self, ch: u8, c: u8, v: u8) {
            self.msgs.push(Msg::Cc(ch, c, v));
        }
    }

    #[test]
    fn volume_to_cc_bounds() {
        assert_eq!(volume_to_cc(0.0), 0);
        assert_eq!(volume_to_cc(1.0), 127);
        assert_eq!(volume_to_cc(0.5), 64);
        // Out-of-range input clamps.
        assert_eq!(volume_to_cc(-1.0), 0);
        assert_eq!(volume_to_cc(2.0), 127);
    }

    #[test]
    fn voice_attack_and_release() {
        let mut out = RecordingOut::default();
        let mut voice = Voice::new(0, 100);
        let e4 = Note::new(NoteName::E, 4);

        voice.attack(&mut out, e4);
        voice.release(&mut out);
        assert_eq!(out.msgs, vec![Msg::On(0, 64, 100), Msg::Off(0, 64)]);
    }

    #[test]
    fn voice_is_monophonic_on_the_wire() {
        let mut out = RecordingOut::default();
        let mut voice = Voice::new(0, 100);

        voice.attack(&mut out, Note::new(NoteName::E, 4));
        // Second attack without an intervening release.
        voice.attack(&mut out, Note::new(NoteName::F, 4));
        assert_eq!(
            out.msgs,
            vec![Msg::On(0, 64, 100), Msg::Off(0, 64), Msg::On(0, 65, 100)]
        );
    }

    #[test]
    fn release_is_idempotent() {
        let mut out = RecordingOut::default();
        let mut voice = Voice::new(0, 100);

        voice.release(&mut out);
        voice.attack(&mut out, Note::new(NoteName::C, 4));
        voice.release(&mut out);
        voice.release(&mut out);
        assert_eq!(out.msgs, vec![Msg::On(0, 60, 100), Msg::Off(0, 60)]);
    }
}
