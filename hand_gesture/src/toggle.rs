//! Closed-palm play/pause toggle, with a cooldown.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::palm::PalmState;

/// A fired toggle (play/pause for the consumer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggle;

/// When a held fist fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Fire whenever the palm is closed and the cooldown has elapsed, so a
    /// fist held past the cooldown fires again every interval.
    #[default]
    Repeat,
    /// Fire only on an open → closed transition, still gated by the cooldown.
    Edge,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToggleState {
    cooldown:   Duration,
    mode:       ToggleMode,
    last_fire:  Option<Duration>,
    prev_palm:  PalmState,
}

impl ToggleState {
    pub fn new(cooldown: Duration, mode: ToggleMode) -> Self {
        ToggleState { cooldown, mode, last_fire: None, prev_palm: PalmState::Open }
    }

    pub fn detect(&mut self, now: Duration, palm: PalmState) -> Option<Toggle> {
        let armed = match self.mode {
            ToggleMode::Repeat => true,
            ToggleMode::Edge   => self.prev_palm == PalmState::Open,
        };
        self.prev_palm = palm;

        if palm == PalmState::Closed && armed && self.cooled_down(now) {
            self.last_fire = Some(now);
            return Some(Toggle);
        }
        None
    }

    fn cooled_down(&self, now: Duration) -> bool {
        match self.last_fire {
            None       => true,
            Some(last) => now.saturating_sub(last) >= self.cooldown,
        }
    }

    pub fn last_fire(&self) -> Option<Duration> { self.last_fire }
    pub fn mode(&self)      -> ToggleMode       { self.mode }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PalmState::{Closed, Open};

    fn secs(s: f64) -> Duration { Duration::from_secs_f64(s) }

    #[test]
    fn open_palm_never_fires() {
        let mut t = ToggleState::new(Duration::from_secs(1), ToggleMode::Repeat);
        for i in 0..10 {
            assert_eq!(t.detect(secs(i as f64), Open), None);
        }
        assert_eq!(t.last_fire(), None);
    }

    #[test]
    fn closed_fires_then_cooldown_then_fires_again() {
        let mut t = ToggleState::new(Duration::from_secs(1), ToggleMode::Repeat);
        assert_eq!(t.detect(secs(0.0), Closed), Some(Toggle));
        assert_eq!(t.detect(secs(0.5), Closed), None);
        assert_eq!(t.detect(secs(1.1), Closed), Some(Toggle));
    }

    #[test]
    fn repeat_mode_refires_while_held() {
        let mut t = ToggleState::new(Duration::from_secs(1), ToggleMode::Repeat);
        let fired = (0..40)
            .filter(|&i| t.detect(secs(i as f64 * 0.1), Closed).is_some())
            .count();
        // t = 0.0, ~1.0, ~2.0, ~3.0 (float stepping may land just after).
        assert!(fired >= 3 && fired <= 4, "fired {fired} times");
    }

    #[test]
    fn edge_mode_needs_release_between_fires() {
        let mut t = ToggleState::new(Duration::from_secs(1), ToggleMode::Edge);
        assert_eq!(t.detect(secs(0.0), Closed), Some(Toggle));
        assert_eq!(t.detect(secs(2.0), Closed), None);
        assert_eq!(t.detect(secs(3.0), Closed), None);
        assert_eq!(t.detect(secs(3.1), Open), None);
        assert_eq!(t.detect(secs(3.2), Closed), Some(Toggle));
    }

    #[test]
    fn edge_mode_still_honours_cooldown() {
        let mut t = ToggleState::new(Duration::from_secs(1), ToggleMode::Edge);
        assert!(t.detect(secs(0.0), Closed).is_some());
        t.detect(secs(0.2), Open);
        assert_eq!(t.detect(secs(0.4), Closed), None);
        // The release was consumed by the blocked attempt.
        assert_eq!(t.detect(secs(1.5), Closed), None);
    }

    #[test]
    fn mode_parses_from_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrap { mode: ToggleMode }
        let w: Wrap = toml::from_str("mode = \"edge\"").unwrap();
        assert_eq!(w.mode, ToggleMode::Edge);
        assert_eq!(ToggleMode::default(), ToggleMode::Repeat);
    }
}
