//! Software-rendered overlay using `minifb`.
//!
//! Layout (640×480 by default, the camera frame size):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  event log (newest last)                    status line  │
//! │  ┌──┐                                                    │
//! │  │  │ volume bar        hand skeletons                   │
//! │  │██│                   thumb–index line (right hand)    │
//! │  └──┘                                                    │
//! │  NN %                                                    │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes through [`Canvas`], a plain ARGB buffer, so it can be tested
//! without opening a window.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use hand_gesture::{
    FrameOutput, HandObservation, Handedness, LandmarkFrame, LandmarkId, PalmState, Point,
    HAND_CONNECTIONS,
};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const BAR_X0:      usize = 50;
pub const BAR_X1:      usize = 85;
pub const BAR_TOP:     usize = 150;
pub const BAR_BOTTOM:  usize = 400;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const BAR_FRAME:       u32   = 0xFF4060C0;
pub const BAR_FILL:    u32   = 0xFF3C78FF;
const LEFT_COLOR:      u32   = 0xFF40E0D0;
const RIGHT_COLOR:     u32   = 0xFFFFA040;
const JOINT_COLOR:     u32   = 0xFFFFFFFF;
pub const PINCH_COLOR: u32   = 0xFFFF40FF;
const LOG_COLOR:       u32   = 0xFFFFD700;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const LEGEND_COLOR:    u32   = 0xFF888888;
const TEXT_SCALE:      usize = 2;

const LEGEND: &str = "MOUSE=left hand  ARROWS=jump/pinch  C=fist  L/R=hide  Q=quit";

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf:    Vec<u32>,
    pub width:  usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; width * height], width, height }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self) { self.buf.fill(BG_COLOR); }

    /// Draw a whole frame: skeletons, pinch line, volume bar, text.
    pub fn draw_frame(
        &mut self,
        frame:  Option<&LandmarkFrame>,
        output: Option<&FrameOutput>,
        log:    &[String],
        status: &str,
    ) {
        self.clear();

        if let Some(frame) = frame {
            for hand in frame.hands() {
                self.draw_hand(hand);
            }
            if let Some(right) = frame.right() {
                let thumb = right.point(LandmarkId::THUMB_TIP);
                let index = right.point(LandmarkId::INDEX_TIP);
                self.draw_line(thumb, index, PINCH_COLOR);
                self.draw_dot(thumb, 4, PINCH_COLOR);
                self.draw_dot(index, 4, PINCH_COLOR);
            }
        }

        let percent = output.map(|o| o.volume_percent).unwrap_or(0.0);
        self.draw_volume_bar(percent);

        for (i, line) in log.iter().enumerate() {
            self.draw_label(line, 10, 10 + i * 6 * TEXT_SCALE, LOG_COLOR);
        }
        let status_x = self.width.saturating_sub(status.len() * 4 * TEXT_SCALE + 10);
        self.draw_label(status, status_x, 10, TEXT_COLOR);
        self.draw_label(LEGEND, 10, self.height.saturating_sub(6 * TEXT_SCALE + 4), LEGEND_COLOR);
    }

    fn draw_hand(&mut self, hand: &HandObservation) {
        let color = match hand.handedness() {
            Handedness::Left  => LEFT_COLOR,
            Handedness::Right => RIGHT_COLOR,
        };
        for &(a, b) in HAND_CONNECTIONS.iter() {
            self.draw_line(hand.point(a), hand.point(b), color);
        }
        for p in hand.points() {
            self.draw_dot(*p, 2, JOINT_COLOR);
        }
    }

    /// Outline plus a fill rising from the bottom in proportion to `percent`.
    pub fn draw_volume_bar(&mut self, percent: f32) {
        let span = (BAR_BOTTOM - BAR_TOP) as f32;
        let fill = (percent.clamp(0.0, 100.0) / 100.0 * span).round() as usize;
        self.fill_rect(BAR_X0, BAR_BOTTOM - fill, BAR_X1 - BAR_X0, fill, BAR_FILL);
        self.draw_border(BAR_X0, BAR_TOP, BAR_X1 - BAR_X0, BAR_BOTTOM - BAR_TOP, BAR_FRAME);
        let label = format!("{} %", percent.round() as i32);
        self.draw_label(&label, BAR_X0 - 10, BAR_BOTTOM + 20, TEXT_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..x + w {
            self.set_pixel(col as isize, y as isize, color);
            self.set_pixel(col as isize, (y + h - 1) as isize, color);
        }
        for row in y..y + h {
            self.set_pixel(x as isize, row as isize, color);
            self.set_pixel((x + w - 1) as isize, row as isize, color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn draw_dot(&mut self, c: Point, r: isize, color: u32) {
        let (cx, cy) = (c.x.round() as isize, c.y.round() as isize);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx.saturating_add(dx), cy.saturating_add(dy), color);
                }
            }
        }
    }

    /// Bresenham line, clipped per pixel.
    fn draw_line(&mut self, a: Point, b: Point, color: u32) {
        const LIMIT: f32 = 1.0e5;
        if [a.x, a.y, b.x, b.y].iter().any(|v| !(v.abs() < LIMIT)) { return; }
        let (mut x0, mut y0) = (a.x.round() as isize, a.y.round() as isize);
        let (x1, y1) = (b.x.round() as isize, b.y.round() as isize);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    /// Minimal bitmap font, 3×5 glyphs scaled by `TEXT_SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * TEXT_SCALE > self.width { break; }
            for (row, &bits) in glyph_rows(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(
                            cx + col * TEXT_SCALE,
                            y + row * TEXT_SCALE,
                            TEXT_SCALE,
                            TEXT_SCALE,
                            color,
                        );
                    }
                }
            }
            cx += 4 * TEXT_SCALE;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Overlay {
    window:     Window,
    canvas:     Canvas,
    /// Present in simulate mode; keyboard and mouse drive the sim hands.
    sim_tx:     Option<Sender<SimInput>>,
    fist_held:  bool,
    last_mouse: Option<(f32, f32)>,
}

impl Overlay {
    pub fn new(width: u32, height: u32, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let (w, h) = (width as usize, height as usize);
        let mut window = Window::new(
            "Gesture Media Control",
            w, h,
            WindowOptions { resize: false, ..WindowOptions::default() },
        ).map_err(|e| anyhow!("cannot open overlay window: {e}"))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Overlay {
            window,
            canvas: Canvas::new(w, h),
            sim_tx,
            fist_held: false,
            last_mouse: None,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  In simulate mode they become `SimInput`s,
    /// followed by one `Tick`.  Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let quit = one_shot(Key::Q) || one_shot(Key::Escape);

        let Some(tx) = &self.sim_tx else { return !quit; };
        let mut inputs = Vec::new();

        if quit {
            let _ = tx.send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }
        if one_shot(Key::L)     { inputs.push(SimInput::KeyDown(SimKey::ToggleLeft)); }
        if one_shot(Key::R)     { inputs.push(SimInput::KeyDown(SimKey::ToggleRight)); }
        if one_shot(Key::Left)  { inputs.push(SimInput::KeyDown(SimKey::JumpLeft)); }
        if one_shot(Key::Right) { inputs.push(SimInput::KeyDown(SimKey::JumpRight)); }

        // Keys that repeat while held
        if self.window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            inputs.push(SimInput::KeyDown(SimKey::PinchWider));
        }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            inputs.push(SimInput::KeyDown(SimKey::PinchNarrower));
        }

        let fist = self.window.is_key_down(Key::C);
        if fist != self.fist_held {
            inputs.push(if fist {
                SimInput::KeyDown(SimKey::Fist)
            } else {
                SimInput::KeyUp(SimKey::Fist)
            });
            self.fist_held = fist;
        }

        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        if mouse.is_some() && mouse != self.last_mouse {
            if let Some((x, y)) = mouse {
                inputs.push(SimInput::Pointer { x, y });
            }
            self.last_mouse = mouse;
        }

        inputs.push(SimInput::Tick);
        for input in inputs {
            if tx.send(input).is_err() { return false; }
        }
        true
    }

    /// Render one frame and present it.
    pub fn render(
        &mut self,
        frame:  Option<&LandmarkFrame>,
        output: Option<&FrameOutput>,
        log:    &[String],
    ) -> Result<()> {
        let status = status_line(output);
        self.canvas.draw_frame(frame, output, log, &status);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)
            .map_err(|e| anyhow!("cannot update overlay window: {e}"))
    }
}

/// Short status text: volume in range units and palm state.
pub fn status_line(output: Option<&FrameOutput>) -> String {
    let Some(o) = output else { return "waiting".to_string(); };
    let palm = match o.palm {
        Some(PalmState::Open)   => "open",
        Some(PalmState::Closed) => "closed",
        None                    => "-",
    };
    format!("vol {:.1}  palm {palm}", o.volume)
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyphs packed row-major into 15 bits, top row in the high bits.
/// Letters are stored upper-case only.
const GLYPHS: &[(char, u16)] = &[
    ('0', 0x7B6F), ('1', 0x2C97), ('2', 0x73E7), ('3', 0x73CF), ('4', 0x5BC9), ('5', 0x79CF),
    ('6', 0x79EF), ('7', 0x7249), ('8', 0x7BEF), ('9', 0x7BCF), ('A', 0x7BED), ('B', 0x6BAE),
    ('C', 0x7927), ('D', 0x6B6E), ('E', 0x79E7), ('F', 0x79E4), ('G', 0x796F), ('H', 0x5BED),
    ('I', 0x7497), ('J', 0x126F), ('K', 0x5BAD), ('L', 0x4927), ('M', 0x5F6D), ('N', 0x7B6D),
    ('O', 0x7B6F), ('P', 0x7BE4), ('Q', 0x7B79), ('R', 0x6BAD), ('S', 0x79CF), ('T', 0x7492),
    ('U', 0x5B6F), ('V', 0x5B52), ('W', 0x5B7D), ('X', 0x5AAD), ('Y', 0x5BD2), ('Z', 0x72A7),
    ('%', 0x52A5), ('/', 0x12A4), ('-', 0x01C0), ('.', 0x0002), (',', 0x0014), (':', 0x0410),
    ('=', 0x0E38), ('+', 0x05D0), (' ', 0x0000),
];

const UNKNOWN_GLYPH: u16 = 0x0080;

fn glyph_rows(c: char) -> [u8; 5] {
    let c = c.to_ascii_uppercase();
    let bits = GLYPHS.iter()
        .find(|&&(g, _)| g == c)
        .map_or(UNKNOWN_GLYPH, |&(_, b)| b);
    std::array::from_fn(|row| ((bits >> (3 * (4 - row))) & 0b111) as u8)
}
