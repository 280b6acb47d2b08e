//! hand_piano — interactive entry point.

use hand_frame::Handedness;
use hand_piano::app::{run, AppConfig};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Piano — Gesture-Tracked Virtual Keyboard         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse/keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: piano, octaves 3–6, right hand, volume 50%\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening visualizer window…");
    println!("  Open palm + index finger up plays the note under the fingertip.");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let octaves = pick_octave_band();
    let program = pick_instrument();
    let handedness = pick_handedness();

    let volume: f32 = {
        let v = read_line("  Volume 0–100% (default 50): ")
            .trim()
            .parse::<u32>()
            .unwrap_or(50)
            .min(100);
        v as f32 / 100.0
    };

    AppConfig {
        octaves,
        handedness,
        program,
        channel: 0,
        velocity: 100,
        volume,
    }
}

fn pick_octave_band() -> Vec<i8> {
    println!("  Octave band (vertical axis of the grid):");
    println!("    1. 3–6 (48 notes, default)  2. 4–5 (24 notes)  3. custom");
    match read_line("  Choice (1–3, default 1): ").trim() {
        "2" => vec![4, 5],
        "3" => {
            let lo = read_line("    Lowest octave (default 3): ")
                .trim()
                .parse::<i8>()
                .unwrap_or(3)
                .clamp(0, 8);
            let hi = read_line("    Highest octave (default 6): ")
                .trim()
                .parse::<i8>()
                .unwrap_or(6)
                .clamp(lo, 8);
            (lo..=hi).collect()
        }
        _ => vec![3, 4, 5, 6],
    }
}

fn pick_instrument() -> u8 {
    println!("  Instrument (GM program 0–127):");
    println!("    0=Grand Piano  11=Vibraphone  24=Nylon Guitar  40=Violin");
    println!("    56=Trumpet  73=Flute  80=Lead Square  88=Pad New Age");
    read_line("  Program (default 0): ")
        .trim()
        .parse::<u8>()
        .unwrap_or(0)
        .min(127)
}

fn pick_handedness() -> Handedness {
    match read_line("  Tracked hand, l/r (default r): ")
        .trim()
        .to_lowercase()
        .as_str()
    {
        "l" | "left" => Handedness::Left,
        _ => Handedness::Right,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
