//! Error taxonomy for the gesture core.
//!
//! The engine has no I/O of its own, so every variant is either a rejected
//! observation at the frame-construction boundary or a configuration error
//! reported once at startup.

use thiserror::Error;

/// Errors produced while building observations or validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// A hand observation did not carry exactly the 21 landmarks 0..=20.
    #[error("malformed hand observation: {reason}")]
    MalformedObservation { reason: String },

    /// Pinch calibration with `near >= far` (or a non-finite bound).
    #[error("pinch calibration out of range: near={near} must be below far={far}")]
    OutOfRangeCalibration { near: f32, far: f32 },

    /// Output range with `min > max` (or a non-finite bound).
    #[error("invalid output range: min={min} must not exceed max={max}")]
    InvalidOutputRange { min: f32, max: f32 },

    /// Smoothing coefficient outside the open interval (0, 1).
    #[error("smoothing coefficient {alpha} must lie strictly between 0 and 1")]
    InvalidSmoothing { alpha: f32 },

    /// Any other configuration field that failed validation.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl GestureError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GestureError::MalformedObservation { reason: reason.into() }
    }
}
