//! Thumb–index pinch distance → calibrated control value.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::landmark::{HandObservation, LandmarkId};

// ════════════════════════════════════════════════════════════════════════════
// Calibration
// ════════════════════════════════════════════════════════════════════════════

/// Pixel distances treated as "fully pinched" (`near`) and "fully spread"
/// (`far`).  Depends on camera resolution and how far the hand is from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub near: f32,
    pub far:  f32,
}

impl Calibration {
    pub fn new(near: f32, far: f32) -> Result<Self, GestureError> {
        let cal = Calibration { near, far };
        cal.validate()?;
        Ok(cal)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if !self.near.is_finite() || !self.far.is_finite() || self.near >= self.far {
            return Err(GestureError::OutOfRangeCalibration { near: self.near, far: self.far });
        }
        Ok(())
    }
}

impl Default for Calibration {
    fn default() -> Self { Calibration { near: 30.0, far: 200.0 } }
}

// ════════════════════════════════════════════════════════════════════════════
// OutputRange
// ════════════════════════════════════════════════════════════════════════════

/// The sink's native level range, e.g. a master volume in dB.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRange {
    pub min: f32,
    pub max: f32,
}

impl OutputRange {
    pub fn new(min: f32, max: f32) -> Result<Self, GestureError> {
        let range = OutputRange { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(GestureError::InvalidOutputRange { min: self.min, max: self.max });
        }
        Ok(())
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Level as a 0–100 percentage of the range.
    pub fn percent(&self, value: f32) -> f32 {
        interpolate(value, (self.min, self.max), (0.0, 100.0))
    }
}

impl Default for OutputRange {
    /// A common master-volume range in dB.
    fn default() -> Self { OutputRange { min: -65.25, max: 0.0 } }
}

// ════════════════════════════════════════════════════════════════════════════
// Mapping
// ════════════════════════════════════════════════════════════════════════════

/// Linear interpolation of `value` from `from` onto `to`, clamped at both
/// ends.  A degenerate `from` interval acts as a step at its start.
pub fn interpolate(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (a, b) = from;
    let (c, d) = to;
    if value <= a {
        return c;
    }
    if value >= b {
        return d;
    }
    c + (value - a) * (d - c) / (b - a)
}

/// Pixel distance between thumb tip (4) and index tip (8).
pub fn pinch_distance(hand: &HandObservation) -> f32 {
    hand.point(LandmarkId::THUMB_TIP).distance(hand.point(LandmarkId::INDEX_TIP))
}

/// Map the hand's pinch distance through `calib` into `out_range`.
///
/// Distances at or below `near` give `out_range.min`, at or above `far`
/// give `out_range.max`; monotonic in between.
pub fn map_distance(hand: &HandObservation, calib: Calibration, out_range: OutputRange) -> f32 {
    map_length(pinch_distance(hand), calib, out_range)
}

/// [`map_distance`] on an already-measured length.
pub fn map_length(length: f32, calib: Calibration, out_range: OutputRange) -> f32 {
    // max/min rather than clamp: no panic on an unvalidated calibration.
    let clamped = length.max(calib.near).min(calib.far);
    interpolate(clamped, (calib.near, calib.far), (out_range.min, out_range.max))
}
