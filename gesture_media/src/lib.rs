//! # gesture_media
//!
//! Hand-gesture media controller built on the `hand_gesture` engine, with
//! MIDI control output and a software-rendered overlay.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Thumb–index spread | Right | Volume (MIDI CC 7 by default) |
//! | Fast swipe towards the left | Left | Next track (CC 102) |
//! | Fast swipe towards the right | Left | Previous track (CC 103) |
//! | Closed palm | Left | Play/pause (CC 104) |
//!
//! ## Landmark sources
//!
//! * (default) **Simulation**: the overlay window's mouse and keyboard pose
//!   two synthetic hands.
//! * `--replay <file>`: a JSON-lines recording, optionally `--headless`.
//!
//! Any session can be captured with `--record <file>` and replayed later.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Move the left hand |
//! | `Left` / `Right` | Jump the left hand (a swipe) |
//! | `C` (hold) | Close the left hand |
//! | `Up` / `Down` (hold) | Widen / narrow the right-hand pinch |
//! | `L` / `R` | Hide or show a hand |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod config;
pub mod overlay;
pub mod recording;
pub mod sink;
pub mod source;
