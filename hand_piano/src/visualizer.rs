//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  HAND PIANO                        fps / volume     │
//! ├────┬────┬────┬────┬────┬────┬────┬────┬────┬────────┤
//! │ C3 │ C#3│ D3 │ …  12 columns (pitch classes)  … │B3 │
//! ├────┼────┼────┼─  4 rows (octave band)  ─┼────┼──────┤
//! │ …  │    │    │   [cursor dot at fingertip]   │      │
//! ├────┴────┴────┴────┴────┴────┴────┴────┴────┴────────┤
//! │  status line · now-playing readout                  │
//! │  key legend                                         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The grid is drawn in screen space, which is the mirrored camera view:
//! the cursor appears where the user's hand appears, and the mapper's
//! `1 − x` mirror puts the addressed note in the same cell.

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::keyboard::KeyboardState;
use crate::source::SimInput;

use std::sync::mpsc::Sender;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 540;
const COLS: usize = 12;
const CELL_W: usize = WIN_W / COLS;
const HEADER_H: usize = 34;
const STATUS_H: usize = 56;
const GRID_Y0: usize = HEADER_H;
const GRID_Y1: usize = WIN_H - STATUS_H;
const GRID_H: usize = GRID_Y1 - GRID_Y0;

const BG_COLOR: u32 = 0xFF1A1A2E;
const TEXT_BG: u32 = 0xFF0F3460;
const WHITE_KEY: u32 = 0xFFE9E9F2;
const BLACK_KEY: u32 = 0xFF23233C;
const ACTIVE_COLOR: u32 = 0xFFFFD700; // gold
const CURSOR_COLOR: u32 = 0xFF00FFAA;
const KEY_BORDER: u32 = 0xFF000000;

const VOLUME_STEP: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,
    hand_visible: bool,
    volume_delta: f32,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Hand Piano — Gesture-Tracked Keyboard",
            WIN_W,
            WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            hand_visible: true,
            volume_delta: 0.0,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Volume change requested since the last call (±[`VOLUME_STEP`] per
    /// key repeat).
    pub fn take_volume_delta(&mut self) -> f32 {
        std::mem::take(&mut self.volume_delta)
    }

    /// Poll keyboard/mouse input and emit one [`SimInput`] pose.
    /// Returns false when the user quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);
        let repeating = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(&self.window, Key::Q) {
            let _ = self.sim_tx.send(SimInput::Stop);
            return false;
        }
        if one_shot(&self.window, Key::H) {
            self.hand_visible = !self.hand_visible;
        }
        if repeating(&self.window, Key::Up) {
            self.volume_delta += VOLUME_STEP;
        }
        if repeating(&self.window, Key::Down) {
            self.volume_delta -= VOLUME_STEP;
        }

        if !self.hand_visible {
            let _ = self.sim_tx.send(SimInput::NoHand);
            return true;
        }

        let (mx, my) = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .unwrap_or((WIN_W as f32 / 2.0, WIN_H as f32 / 2.0));
        let screen_x = (mx / WIN_W as f32).clamp(0.0, 1.0);
        let screen_y = ((my - GRID_Y0 as f32) / GRID_H as f32).clamp(0.0, 1.0);

        // The window shows the mirrored camera view; convert the pointer
        // back to camera space so the mapper's mirror lands on the cell
        // under the cursor.
        let cam_x = 1.0 - screen_x;

        let fist = self.window.is_key_down(Key::C);
        let pointing = self.window.is_key_down(Key::Space) && !fist;

        let _ = self.sim_tx.send(SimInput::Pose {
            x: cam_x,
            y: screen_y,
            open: !fist,
            pointing,
        });

        true
    }

    /// Render one frame.
    ///
    /// `cursor` is the tracked index fingertip in camera space.
    pub fn render(
        &mut self,
        keyboard: &KeyboardState,
        cursor: Option<(f32, f32)>,
        status: &str,
        readout: &str,
        fps: u32,
        volume: f32,
        playing: bool,
    ) {
        self.buf.fill(BG_COLOR);

        // ── Header ────────────────────────────────────────────────────────
        self.draw_label("HAND PIANO", 10, 12, 0xFFEEEEEE);
        let meter = format!("fps:{}  vol:{}%", fps, (volume * 100.0).round() as u32);
        self.draw_label(&meter, WIN_W - 10 - meter.len() * 4, 12, 0xFF888888);

        // ── Key grid ──────────────────────────────────────────────────────
        self.draw_keys(keyboard, playing);

        // ── Hand cursor ───────────────────────────────────────────────────
        if let Some((cx, cy)) = cursor {
            let sx = ((1.0 - cx.clamp(0.0, 1.0)) * (WIN_W - 1) as f32) as usize;
            let sy = GRID_Y0 + (cy.clamp(0.0, 1.0) * (GRID_H - 1) as f32) as usize;
            self.draw_diamond(sx, sy, 6, CURSOR_COLOR);
            self.draw_diamond(sx, sy, 3, 0xFFFFFFFF);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, GRID_Y1, WIN_W, STATUS_H, TEXT_BG);
        self.draw_label(status, 10, GRID_Y1 + 8, 0xFFEEEEEE);
        self.draw_label(readout, 10, GRID_Y1 + 22, 0xFFFFD700);
        self.draw_label(
            "mouse=aim  Space=play  C=fist  H=hide hand  Up/Down=volume  Q=quit",
            10,
            WIN_H - 12,
            0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Key grid ──────────────────────────────────────────────────────────

    fn draw_keys(&mut self, keyboard: &KeyboardState, playing: bool) {
        let rows = keyboard.rows().max(1);
        let cell_h = GRID_H / rows;

        for (i, key) in keyboard.keys.iter().enumerate() {
            let row = i / COLS;
            // Screen shows the mirrored camera view: chromatic index c
            // lands in column c (the mapper's mirror already happened).
            let col = i % COLS;
            let x = col * CELL_W;
            let y = GRID_Y0 + row * cell_h;

            let base = if key.is_black { BLACK_KEY } else { WHITE_KEY };
            let (fill, label_color) = if keyboard.active() == Some(i) {
                let t = 0.55 + 0.35 * keyboard.flash;
                (blend(base, ACTIVE_COLOR, t), 0xFF000000)
            } else if key.is_black {
                (base, 0xFFCCCCDD)
            } else {
                (base, 0xFF222238)
            };

            self.fill_rect(x, y, CELL_W, cell_h, fill);
            self.draw_border(x, y, CELL_W, cell_h, KEY_BORDER);

            let label = key.note.to_string();
            let lx = x + (CELL_W.saturating_sub(label.len() * 4)) / 2;
            let ly = y + cell_h / 2 - 2;
            self.draw_label(&label, lx, ly, label_color);
        }

        // Pulse the grid border while a note sounds.
        if playing {
            self.draw_border(0, GRID_Y0, WIN_W, GRID_H, ACTIVE_COLOR);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(WIN_W) {
            if y < WIN_H {
                self.buf[y * WIN_W + col] = color;
            }
            if y + h - 1 < WIN_H {
                self.buf[(y + h - 1) * WIN_W + col] = color;
            }
        }
        for row in y..(y + h).min(WIN_H) {
            if x < WIN_W {
                self.buf[row * WIN_W + x] = color;
            }
            if x + w - 1 < WIN_W {
                self.buf[row * WIN_W + x + w - 1] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let dx = r as isize - dy;
            for &(sx, sy) in &[
                (cx as isize + dx, cy as isize + dy),
                (cx as isize - dx, cy as isize + dy),
                (cx as isize + dx, cy as isize - dy),
                (cx as isize - dx, cy as isize - dy),
            ] {
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters for label rendering.
    /// Each character is encoded as 5 rows × 3 bits.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > WIN_W {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}
