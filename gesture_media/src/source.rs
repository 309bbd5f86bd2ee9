//! Landmark sources — recorded sessions and keyboard/mouse simulation.
//!
//! The public interface is [`LandmarkFrame`] delivered over a `mpsc`
//! channel.  Consumers don't need to know whether frames came from a
//! recording or the simulator; the channel preserves capture order.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use hand_gesture::{HandObservation, Handedness, LandmarkFrame, Point, LANDMARK_COUNT};
use tracing::{error, info};

use crate::recording::{self, Coordinates};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for replay and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`LandmarkFrame`]s over a channel.
///
/// Returning from `run` drops the sender, which the frame loop sees as the
/// end of the stream.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<LandmarkFrame>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<LandmarkFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — recorded JSON-lines sessions
// ════════════════════════════════════════════════════════════════════════════

/// Replays a recording in file order.
///
/// With `realtime` set, frames are released at their recorded offsets from
/// the first frame; otherwise as fast as the consumer takes them.
pub struct ReplaySource {
    pub path:     PathBuf,
    pub coords:   Coordinates,
    pub realtime: bool,
}

impl LandmarkSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<LandmarkFrame>) {
        let frames = match recording::open_recording(&self.path, self.coords) {
            Ok(f)  => f,
            Err(e) => {
                error!("replay aborted: {e:#}");
                return;
            }
        };
        info!(frames = frames.len(), path = %self.path.display(), "replaying recording");

        let start = Instant::now();
        let first_t = frames.first().map(|f| f.timestamp()).unwrap_or_default();
        for frame in frames {
            if self.realtime {
                let due = frame.timestamp().saturating_sub(first_t);
                if let Some(wait) = due.checked_sub(start.elapsed()) {
                    thread::sleep(wait);
                }
            }
            if tx.send(frame).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the overlay window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
    /// Pointer moved inside the window (pixels).
    Pointer { x: f32, y: f32 },
    /// One camera tick: emit a frame for the current pose.
    Tick,
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleLeft,     // L
    ToggleRight,    // R
    Fist,           // C (held)
    PinchWider,     // Up
    PinchNarrower,  // Down
    JumpLeft,       // Left arrow
    JumpRight,      // Right arrow
    Quit,           // Q / Escape
}

const PINCH_STEP: f32 = 6.0;
const MAX_SPREAD: f32 = 260.0;
const JUMP_PX:    f32 = 160.0;

/// Pose of the two simulated hands.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHands {
    pub width:         f32,
    pub height:        f32,
    pub left_visible:  bool,
    pub right_visible: bool,
    /// Left-hand wrist position; follows the pointer.
    pub left_wrist:    Point,
    pub fist:          bool,
    pub right_wrist:   Point,
    /// Right-hand thumb-tip to index-tip distance.
    pub spread:        f32,
}

impl SimHands {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        SimHands {
            width:         w,
            height:        h,
            left_visible:  true,
            right_visible: true,
            left_wrist:    Point::new(w * 0.3, h * 0.8),
            fist:          false,
            right_wrist:   Point::new(w * 0.75, h * 0.8),
            spread:        100.0,
        }
    }

    /// Apply one input.  Returns false on quit.
    pub fn apply(&mut self, input: &SimInput) -> bool {
        match *input {
            SimInput::KeyDown(SimKey::Quit)          => return false,
            SimInput::KeyDown(SimKey::ToggleLeft)    => self.left_visible  = !self.left_visible,
            SimInput::KeyDown(SimKey::ToggleRight)   => self.right_visible = !self.right_visible,
            SimInput::KeyDown(SimKey::Fist)          => self.fist = true,
            SimInput::KeyUp(SimKey::Fist)            => self.fist = false,
            SimInput::KeyDown(SimKey::PinchWider)    =>
                self.spread = (self.spread + PINCH_STEP).min(MAX_SPREAD),
            SimInput::KeyDown(SimKey::PinchNarrower) =>
                self.spread = (self.spread - PINCH_STEP).max(0.0),
            SimInput::KeyDown(SimKey::JumpLeft)      =>
                self.left_wrist.x = (self.left_wrist.x - JUMP_PX).max(0.0),
            SimInput::KeyDown(SimKey::JumpRight)     =>
                self.left_wrist.x = (self.left_wrist.x + JUMP_PX).min(self.width),
            SimInput::Pointer { x, y }               => {
                self.left_wrist = Point::new(x.clamp(0.0, self.width), y.clamp(0.0, self.height));
            }
            SimInput::KeyUp(_) | SimInput::Tick      => {}
        }
        true
    }

    pub fn frame(&self, timestamp: Duration) -> LandmarkFrame {
        let mut hands = Vec::with_capacity(2);
        if self.left_visible {
            hands.push(synth_hand(Handedness::Left, self.left_wrist, None, self.fist));
        }
        if self.right_visible {
            hands.push(synth_hand(Handedness::Right, self.right_wrist, Some(self.spread), false));
        }
        LandmarkFrame::from_hands(timestamp, hands)
    }
}

/// Gesture source driven by [`SimInput`] events from the overlay window.
///
/// The overlay sends raw input here; this thread owns the simulated pose and
/// turns every `Tick` into a frame stamped on a monotonic clock.
pub struct SimLandmarkSource {
    pub rx:    Receiver<SimInput>,
    pub hands: SimHands,
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<LandmarkFrame>) {
        let SimLandmarkSource { rx, mut hands } = *self;
        let origin = Instant::now();
        for input in rx {
            if !hands.apply(&input) {
                return;
            }
            if input == SimInput::Tick && tx.send(hands.frame(origin.elapsed())).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Skeleton synthesis
// ════════════════════════════════════════════════════════════════════════════

/// Build a plausible upright 21-point hand around `wrist`.
///
/// `pinch` places the thumb tip exactly that far from the index tip.
/// `closed` curls the four fingers so each tip sits below its PIP joint.
pub fn synth_hand(
    handedness: Handedness,
    wrist:      Point,
    pinch:      Option<f32>,
    closed:     bool,
) -> HandObservation {
    // Thumb side of the image: mirrored selfie view puts a Left hand's thumb
    // towards +x.
    let side = match handedness {
        Handedness::Left  =>  1.0,
        Handedness::Right => -1.0,
    };
    let at = |dx: f32, dy: f32| Point::new(wrist.x + side * dx, wrist.y + dy);

    let mut p = [wrist; LANDMARK_COUNT];
    p[1] = at(18.0, -15.0);
    p[2] = at(35.0, -35.0);
    p[3] = at(48.0, -55.0);

    // (x offset, finger length scale) for index, middle, ring, pinky.
    let fingers = [(22.0, 1.0), (2.0, 1.08), (-18.0, 1.0), (-34.0, 0.82)];
    for (f, &(dx, len)) in fingers.iter().enumerate() {
        let base = 5 + f * 4;
        let rows: [f32; 4] = if closed {
            [-70.0, -95.0, -80.0, -68.0]
        } else {
            [-70.0, -105.0, -125.0, -142.0]
        };
        for (j, dy) in rows.iter().enumerate() {
            let scaled = if j == 0 { *dy } else { -70.0 + (dy + 70.0) * len };
            p[base + j] = at(dx, scaled);
        }
    }

    p[4] = match (pinch, closed) {
        (Some(d), _) => {
            let tip = p[8];
            Point::new(tip.x + side * d * 0.6, tip.y + d * 0.8)
        }
        (None, true)  => at(20.0, -60.0),
        (None, false) => at(58.0, -75.0),
    };

    HandObservation::from_points(handedness, p)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{palm, pinch, PalmState};
    use std::io::Write;

    #[test]
    fn synthetic_fist_classifies_closed() {
        let hand = synth_hand(Handedness::Left, Point::new(200.0, 400.0), None, true);
        assert_eq!(palm::classify(&hand), PalmState::Closed);
    }

    #[test]
    fn synthetic_open_hand_classifies_open() {
        let hand = synth_hand(Handedness::Left, Point::new(200.0, 400.0), None, false);
        assert_eq!(palm::classify(&hand), PalmState::Open);
    }

    #[test]
    fn synthetic_pinch_has_requested_spread() {
        for spread in [0.0, 30.0, 115.0, 240.0] {
            let hand = synth_hand(Handedness::Right, Point::new(480.0, 400.0), Some(spread), false);
            assert!((pinch::pinch_distance(&hand) - spread).abs() < 0.01);
        }
    }

    #[test]
    fn keys_move_the_simulated_pose() {
        let mut hands = SimHands::new(640, 480);
        let x0 = hands.left_wrist.x;
        assert!(hands.apply(&SimInput::KeyDown(SimKey::JumpRight)));
        assert_eq!(hands.left_wrist.x, x0 + JUMP_PX);
        hands.apply(&SimInput::KeyDown(SimKey::Fist));
        assert!(hands.fist);
        hands.apply(&SimInput::KeyUp(SimKey::Fist));
        assert!(!hands.fist);
        for _ in 0..100 { hands.apply(&SimInput::KeyDown(SimKey::PinchWider)); }
        assert_eq!(hands.spread, MAX_SPREAD);
        assert!(!hands.apply(&SimInput::KeyDown(SimKey::Quit)));
    }

    #[test]
    fn hidden_hands_are_left_out_of_frames() {
        let mut hands = SimHands::new(640, 480);
        hands.apply(&SimInput::KeyDown(SimKey::ToggleRight));
        let frame = hands.frame(Duration::from_millis(10));
        assert!(frame.left().is_some());
        assert!(frame.right().is_none());
    }

    #[test]
    fn sim_source_emits_one_frame_per_tick() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_landmark_source(SimLandmarkSource {
            rx:    sim_rx,
            hands: SimHands::new(640, 480),
        });
        sim_tx.send(SimInput::Tick).unwrap();
        sim_tx.send(SimInput::Pointer { x: 10.0, y: 10.0 }).unwrap();
        sim_tx.send(SimInput::Tick).unwrap();
        sim_tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();

        let frames: Vec<_> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].timestamp() <= frames[1].timestamp());
        assert_eq!(frames[1].left().unwrap().point(hand_gesture::LandmarkId::WRIST), Point::new(10.0, 10.0));
    }

    #[test]
    fn replay_source_preserves_file_order() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for t in [0.0, 0.1, 0.2, 0.3] {
            writeln!(f, "{{\"t\":{t},\"hands\":[]}}").unwrap();
        }
        let rx = spawn_landmark_source(ReplaySource {
            path:     f.path().to_path_buf(),
            coords:   Coordinates::Pixels,
            realtime: false,
        });
        let stamps: Vec<_> = rx.iter().map(|fr| fr.timestamp()).collect();
        assert_eq!(stamps.len(), 4);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn realtime_replay_waits_for_recorded_offsets() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for t in [0.0, 0.15, 0.05] {
            writeln!(f, "{{\"t\":{t},\"hands\":[]}}").unwrap();
        }
        let rx = spawn_landmark_source(ReplaySource {
            path:     f.path().to_path_buf(),
            coords:   Coordinates::Pixels,
            realtime: true,
        });

        let millis = |fr: LandmarkFrame| (fr.timestamp().as_secs_f64() * 1000.0).round() as u64;

        assert_eq!(millis(rx.recv().unwrap()), 0);
        let first = Instant::now();
        assert_eq!(millis(rx.recv().unwrap()), 150);
        let second = Instant::now();
        assert!(second - first >= Duration::from_millis(120));

        // Already overdue: released without sleeping.
        assert_eq!(millis(rx.recv().unwrap()), 50);
        assert!(second.elapsed() < Duration::from_millis(100));
        assert!(rx.recv().is_err());
    }

    #[test]
    fn missing_recording_ends_stream() {
        let rx = spawn_landmark_source(ReplaySource {
            path:     PathBuf::from("/nonexistent/session.jsonl"),
            coords:   Coordinates::Pixels,
            realtime: false,
        });
        assert!(rx.iter().next().is_none());
    }
}
