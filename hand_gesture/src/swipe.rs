//! Horizontal swipe detection on a tracked point, with a cooldown.

use std::time::Duration;

/// Direction the hand moved across the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Right-to-left motion (dx < 0).
    Left,
    /// Left-to-right motion (dx > 0).
    Right,
}

/// Swipe detector state: previous x, last firing time, tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeState {
    threshold: f32,
    cooldown:  Duration,
    prev_x:    Option<f32>,
    last_fire: Option<Duration>,
}

impl SwipeState {
    pub fn new(threshold: f32, cooldown: Duration) -> Self {
        SwipeState { threshold, cooldown, prev_x: None, last_fire: None }
    }

    /// Feed the tracked x for this frame.
    ///
    /// The displacement is frame-to-frame: `prev_x` is overwritten on every
    /// call whether or not a swipe fires.  The first call only seeds it.
    /// A swipe needs `|dx| > threshold` and at least `cooldown` since the
    /// previous swipe in either direction.
    pub fn detect(&mut self, now: Duration, x: f32) -> Option<SwipeDirection> {
        let mut fired = None;
        if let Some(prev_x) = self.prev_x {
            if self.cooled_down(now) {
                let dx = x - prev_x;
                if dx.abs() > self.threshold {
                    fired = Some(if dx < 0.0 { SwipeDirection::Left } else { SwipeDirection::Right });
                    self.last_fire = Some(now);
                }
            }
        }
        self.prev_x = Some(x);
        fired
    }

    fn cooled_down(&self, now: Duration) -> bool {
        match self.last_fire {
            None       => true,
            Some(last) => now.saturating_sub(last) >= self.cooldown,
        }
    }

    pub fn prev_x(&self)    -> Option<f32>      { self.prev_x }
    pub fn last_fire(&self) -> Option<Duration> { self.last_fire }
    pub fn threshold(&self) -> f32              { self.threshold }
    pub fn cooldown(&self)  -> Duration         { self.cooldown }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration { Duration::from_secs_f64(s) }

    fn detector() -> SwipeState { SwipeState::new(120.0, Duration::from_secs(1)) }

    #[test]
    fn first_call_only_seeds() {
        let mut s = detector();
        assert_eq!(s.detect(secs(0.0), 500.0), None);
        assert_eq!(s.prev_x(), Some(500.0));
        assert_eq!(s.last_fire(), None);
    }

    #[test]
    fn left_to_right_then_cooldown_blocks() {
        let mut s = detector();
        assert_eq!(s.detect(secs(0.0), 200.0), None);
        assert_eq!(s.detect(secs(0.2), 340.0), Some(SwipeDirection::Right));
        // Within the cooldown: nothing fires, but prev_x still moves.
        assert_eq!(s.detect(secs(0.3), 480.0), None);
        assert_eq!(s.prev_x(), Some(480.0));
        assert_eq!(s.last_fire(), Some(secs(0.2)));
    }

    #[test]
    fn right_to_left_is_left_swipe() {
        let mut s = detector();
        s.detect(secs(0.0), 400.0);
        assert_eq!(s.detect(secs(0.1), 250.0), Some(SwipeDirection::Left));
    }

    #[test]
    fn threshold_is_strict() {
        let mut s = detector();
        s.detect(secs(0.0), 100.0);
        assert_eq!(s.detect(secs(0.1), 220.0), None);
        assert_eq!(s.detect(secs(0.2), 340.5), Some(SwipeDirection::Right));
    }

    #[test]
    fn cooldown_is_shared_by_both_directions() {
        let mut s = detector();
        s.detect(secs(0.0), 100.0);
        assert_eq!(s.detect(secs(0.1), 300.0), Some(SwipeDirection::Right));
        assert_eq!(s.detect(secs(0.5), 100.0), None);
        assert_eq!(s.detect(secs(1.2), 300.0), Some(SwipeDirection::Right));
    }

    #[test]
    fn cooldown_boundary_is_inclusive() {
        let mut s = detector();
        s.detect(Duration::from_millis(0), 0.0);
        assert!(s.detect(Duration::from_millis(500), 200.0).is_some());
        assert!(s.detect(Duration::from_millis(1499), 0.0).is_none());
        assert!(s.detect(Duration::from_millis(1500), 200.0).is_some());
    }

    #[test]
    fn displacement_is_frame_to_frame() {
        let mut s = detector();
        s.detect(secs(0.0), 0.0);
        // Many small steps add up to far more than the threshold but no
        // single step crosses it.
        for i in 1..=10 {
            assert_eq!(s.detect(secs(i as f64 * 0.03), i as f32 * 50.0), None);
        }
    }

    #[test]
    fn fired_swipes_respect_cooldown() {
        let mut s = detector();
        let mut fired_at = Vec::new();
        for i in 0..200 {
            let t = secs(i as f64 * 0.05);
            let x = if i % 2 == 0 { 0.0 } else { 300.0 };
            if s.detect(t, x).is_some() { fired_at.push(t); }
        }
        assert!(fired_at.len() > 1);
        for pair in fired_at.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }
}
