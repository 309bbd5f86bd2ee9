//! Engine tuning, loadable from the `[engine]` table of a TOML file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::pinch::{Calibration, OutputRange};
use crate::toggle::ToggleMode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Smoothing coefficient in (0, 1); smaller is slower.
    pub alpha:                f32,
    /// Pinch distances (pixels) mapped to the ends of `output_range`.
    pub calibration:          Calibration,
    /// Native range of the volume sink.
    pub output_range:         OutputRange,
    /// Minimum single-frame horizontal displacement (pixels) for a swipe.
    pub swipe_threshold:      f32,
    pub swipe_cooldown_secs:  f64,
    pub toggle_cooldown_secs: f64,
    pub toggle_mode:          ToggleMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            alpha:                0.15,
            calibration:          Calibration::default(),
            output_range:         OutputRange::default(),
            swipe_threshold:      120.0,
            swipe_cooldown_secs:  1.0,
            toggle_cooldown_secs: 1.0,
            toggle_mode:          ToggleMode::Repeat,
        }
    }
}

impl EngineConfig {
    /// Check every constraint; the first violation is returned.
    pub fn validate(&self) -> Result<(), GestureError> {
        self.calibration.validate()?;
        self.output_range.validate()?;
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(GestureError::InvalidSmoothing { alpha: self.alpha });
        }
        if !self.swipe_threshold.is_finite() || self.swipe_threshold < 0.0 {
            return Err(GestureError::InvalidConfig {
                field:  "swipe_threshold",
                reason: format!("{} is not a non-negative pixel distance", self.swipe_threshold),
            });
        }
        check_cooldown("swipe_cooldown_secs", self.swipe_cooldown_secs)?;
        check_cooldown("toggle_cooldown_secs", self.toggle_cooldown_secs)?;
        Ok(())
    }

    pub fn swipe_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.swipe_cooldown_secs)
    }

    pub fn toggle_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.toggle_cooldown_secs)
    }
}

fn check_cooldown(field: &'static str, secs: f64) -> Result<(), GestureError> {
    // Duration::from_secs_f64 panics on negative, NaN or overflowing input.
    if !secs.is_finite() || secs < 0.0 || secs > u32::MAX as f64 {
        return Err(GestureError::InvalidConfig {
            field,
            reason: format!("{secs} is not a valid number of seconds"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let c = EngineConfig::default();
        assert_eq!(c.alpha, 0.15);
        assert_eq!(c.calibration, Calibration { near: 30.0, far: 200.0 });
        assert_eq!(c.swipe_threshold, 120.0);
        assert_eq!(c.swipe_cooldown(), Duration::from_secs(1));
        assert_eq!(c.toggle_cooldown(), Duration::from_secs(1));
        assert_eq!(c.toggle_mode, ToggleMode::Repeat);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: EngineConfig = toml::from_str(
            r#"
            alpha = 0.3
            toggle_mode = "edge"
            [calibration]
            near = 20.0
            far = 180.0
            "#,
        )
        .unwrap();
        assert_eq!(c.alpha, 0.3);
        assert_eq!(c.calibration.near, 20.0);
        assert_eq!(c.toggle_mode, ToggleMode::Edge);
        assert_eq!(c.swipe_threshold, 120.0);
        assert_eq!(c.output_range, OutputRange::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<EngineConfig>("alhpa = 0.3").is_err());
    }

    #[test]
    fn inverted_calibration_is_fatal() {
        let c = EngineConfig {
            calibration: Calibration { near: 200.0, far: 30.0 },
            ..EngineConfig::default()
        };
        assert!(matches!(c.validate(), Err(GestureError::OutOfRangeCalibration { .. })));
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let c = EngineConfig { toggle_cooldown_secs: -1.0, ..EngineConfig::default() };
        assert!(matches!(
            c.validate(),
            Err(GestureError::InvalidConfig { field: "toggle_cooldown_secs", .. })
        ));
    }

    #[test]
    fn bad_alpha_is_rejected() {
        let c = EngineConfig { alpha: 1.0, ..EngineConfig::default() };
        assert!(matches!(c.validate(), Err(GestureError::InvalidSmoothing { .. })));
    }
}
