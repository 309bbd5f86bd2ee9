//! Single-pole exponential low-pass filter for the volume level.

use crate::error::GestureError;

/// Smoothed value plus its blending coefficient.
///
/// No clamp is applied here: when every target lies in a range, the output
/// stays in that range because each step is a convex blend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmootherState {
    value: f32,
    alpha: f32,
}

impl SmootherState {
    /// `alpha` must lie in (0, 1); smaller is slower and smoother.
    pub fn new(initial: f32, alpha: f32) -> Result<Self, GestureError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(GestureError::InvalidSmoothing { alpha });
        }
        Ok(SmootherState { value: initial, alpha })
    }

    /// `value = α·target + (1−α)·value`; returns the new value.
    ///
    /// Evaluated as `value + α·(target − value)` so a target equal to the
    /// current value leaves it bit-for-bit unchanged.
    pub fn update(&mut self, target: f32) -> f32 {
        self.value += self.alpha * (target - self.value);
        self.value
    }

    pub fn value(&self) -> f32 { self.value }
    pub fn alpha(&self) -> f32 { self.alpha }
}
