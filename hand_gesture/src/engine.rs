//! The gesture engine: one landmark frame in, one [`FrameOutput`] out.
//!
//! State is split by handedness and the two slices never interact:
//!
//! * **Right** — pinch distance → calibrated target → exponential smoother.
//! * **Left**  — index-tip swipe detector and closed-palm toggle detector.
//!
//! A slice whose hand is absent from a frame is left untouched: the volume
//! holds, cooldown timers and the previous swipe x persist indefinitely.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::GestureError;
use crate::landmark::{HandObservation, LandmarkFrame, LandmarkId};
use crate::palm::{self, PalmState};
use crate::pinch::{self, Calibration, OutputRange};
use crate::smoother::SmootherState;
use crate::swipe::{SwipeDirection, SwipeState};
use crate::toggle::{Toggle, ToggleState};

// ════════════════════════════════════════════════════════════════════════════
// MediaEvent
// ════════════════════════════════════════════════════════════════════════════

/// Discrete control tokens for the media-key sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    NextTrack,
    PreviousTrack,
    PlayPauseToggle,
}

impl MediaEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaEvent::NextTrack       => "next-track",
            MediaEvent::PreviousTrack   => "previous-track",
            MediaEvent::PlayPauseToggle => "play-pause",
        }
    }

    /// Human-readable line for logs and the overlay.
    pub fn describe(&self) -> &'static str {
        match self {
            MediaEvent::NextTrack       => "Swiped right-to-left: next track",
            MediaEvent::PreviousTrack   => "Swiped left-to-right: previous track",
            MediaEvent::PlayPauseToggle => "Closed palm: play/pause toggled",
        }
    }
}

impl From<SwipeDirection> for MediaEvent {
    fn from(dir: SwipeDirection) -> Self {
        match dir {
            SwipeDirection::Left  => MediaEvent::NextTrack,
            SwipeDirection::Right => MediaEvent::PreviousTrack,
        }
    }
}

impl From<Toggle> for MediaEvent {
    fn from(_: Toggle) -> Self { MediaEvent::PlayPauseToggle }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameOutput
// ════════════════════════════════════════════════════════════════════════════

/// Result of processing one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub timestamp:      Duration,
    /// Current smoothed level, in the configured output range.  Reported on
    /// every frame; unchanged when no Right hand was present.
    pub volume:         f32,
    /// True when the smoother ran on this frame.
    pub volume_updated: bool,
    /// `volume` as 0–100 of the output range.
    pub volume_percent: f32,
    /// Left-hand palm classification, if a Left hand was present.
    pub palm:           Option<PalmState>,
    /// Fired events; swipe before toggle.
    pub events:         Vec<MediaEvent>,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct GestureEngine {
    calibration:    Calibration,
    output_range:   OutputRange,
    smoother:       SmootherState,
    swipe:          SwipeState,
    toggle:         ToggleState,
    last_timestamp: Option<Duration>,
}

impl GestureEngine {
    /// Validate `config` and build an engine with fresh state.  The smoother
    /// starts at the bottom of the output range.
    pub fn new(config: EngineConfig) -> Result<Self, GestureError> {
        config.validate()?;
        Ok(GestureEngine {
            calibration:    config.calibration,
            output_range:   config.output_range,
            smoother:       SmootherState::new(config.output_range.min, config.alpha)?,
            swipe:          SwipeState::new(config.swipe_threshold, config.swipe_cooldown()),
            toggle:         ToggleState::new(config.toggle_cooldown(), config.toggle_mode),
            last_timestamp: None,
        })
    }

    /// Advance all state by exactly one frame.
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameOutput {
        let now = frame.timestamp();
        if let Some(prev) = self.last_timestamp {
            if now < prev {
                warn!(
                    now = now.as_secs_f64(),
                    prev = prev.as_secs_f64(),
                    "frame timestamp went backwards"
                );
            }
        }
        self.last_timestamp = Some(now);

        let volume_updated = match frame.right() {
            Some(hand) => { self.update_volume(hand); true }
            None       => false,
        };

        let mut events = Vec::new();
        let palm = frame.left().map(|hand| self.update_media(now, hand, &mut events));

        let volume = self.smoother.value();
        FrameOutput {
            timestamp: now,
            volume,
            volume_updated,
            volume_percent: self.output_range.percent(volume),
            palm,
            events,
        }
    }

    fn update_volume(&mut self, hand: &HandObservation) {
        let goal = pinch::map_distance(hand, self.calibration, self.output_range);
        let smoothed = self.smoother.update(goal);
        debug!(goal, smoothed, "volume update");
    }

    fn update_media(
        &mut self,
        now:    Duration,
        hand:   &HandObservation,
        events: &mut Vec<MediaEvent>,
    ) -> PalmState {
        let x = hand.point(LandmarkId::INDEX_TIP).x;
        if let Some(dir) = self.swipe.detect(now, x) {
            let event = MediaEvent::from(dir);
            info!(t = now.as_secs_f64(), event = event.as_str(), "{}", event.describe());
            events.push(event);
        }

        let palm = palm::classify(hand);
        if let Some(toggle) = self.toggle.detect(now, palm) {
            let event = MediaEvent::from(toggle);
            info!(t = now.as_secs_f64(), event = event.as_str(), "{}", event.describe());
            events.push(event);
        }
        palm
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn volume(&self)         -> f32          { self.smoother.value() }
    pub fn volume_percent(&self) -> f32          { self.output_range.percent(self.smoother.value()) }
    pub fn output_range(&self)   -> OutputRange  { self.output_range }
    pub fn calibration(&self)    -> Calibration  { self.calibration }
    pub fn swipe_state(&self)    -> &SwipeState  { &self.swipe }
    pub fn toggle_state(&self)   -> &ToggleState { &self.toggle }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
