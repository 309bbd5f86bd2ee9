//! # hand_gesture
//!
//! Gesture interpretation engine for hand-skeleton streams.  Each frame
//! carries up to one Left and one Right hand, 21 landmarks each, in pixel
//! coordinates.  The engine turns that stream into a smoothed volume level
//! and debounced media events.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Thumb–index spread | Right | Volume level (calibrated, exponentially smoothed) |
//! | Fast right-to-left index motion | Left | `NextTrack` |
//! | Fast left-to-right index motion | Left | `PreviousTrack` |
//! | Closed palm (four fingertips at/below their PIP joints) | Left | `PlayPauseToggle` |
//!
//! Swipes and toggles each have their own cooldown; volume has none.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use hand_gesture::{EngineConfig, GestureEngine, LandmarkFrame};
//!
//! let mut engine = GestureEngine::new(EngineConfig::default()).unwrap();
//! let out = engine.process(&LandmarkFrame::empty(Duration::ZERO));
//! assert!(out.events.is_empty());
//! assert_eq!(out.volume, engine.output_range().min);
//! ```
//!
//! The engine does no I/O.  Capture, landmark detection and the volume /
//! media-key side effects belong to the caller, which feeds frames strictly
//! in capture order.

pub mod config;
pub mod engine;
pub mod error;
pub mod landmark;
pub mod palm;
pub mod pinch;
pub mod smoother;
pub mod swipe;
pub mod toggle;

pub use config::EngineConfig;
pub use engine::{FrameOutput, GestureEngine, MediaEvent};
pub use error::GestureError;
pub use landmark::{
    HandObservation, Handedness, Landmark, LandmarkFrame, LandmarkId, Point,
    HAND_CONNECTIONS, LANDMARK_COUNT,
};
pub use palm::PalmState;
pub use pinch::{Calibration, OutputRange};
pub use smoother::SmootherState;
pub use swipe::{SwipeDirection, SwipeState};
pub use toggle::{Toggle, ToggleMode, ToggleState};
