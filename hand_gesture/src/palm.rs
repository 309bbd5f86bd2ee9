//! Open/closed palm classification from a single frame.

use crate::landmark::{HandObservation, LandmarkId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PalmState {
    Open,
    Closed,
}

/// (fingertip, PIP joint) for index, middle, ring and pinky.  Thumb excluded.
const FINGER_PAIRS: [(LandmarkId, LandmarkId); 4] = [
    (LandmarkId::INDEX_TIP,  LandmarkId::INDEX_PIP),
    (LandmarkId::MIDDLE_TIP, LandmarkId::MIDDLE_PIP),
    (LandmarkId::RING_TIP,   LandmarkId::RING_PIP),
    (LandmarkId::PINKY_TIP,  LandmarkId::PINKY_PIP),
];

/// A finger is curled when its tip is at or below its PIP joint (image Y
/// grows downward).  The hand is closed only when all four are curled.
///
/// Uses the current frame only, so the result may flicker between frames.
pub fn classify(hand: &HandObservation) -> PalmState {
    let all_curled = FINGER_PAIRS
        .iter()
        .all(|&(tip, pip)| hand.point(tip).y >= hand.point(pip).y);
    if all_curled { PalmState::Closed } else { PalmState::Open }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Handedness, Point, LANDMARK_COUNT};

    /// Tips offset vertically from their PIP joints; positive is below.
    fn hand_with_tip_offsets(offsets: [f32; 4]) -> HandObservation {
        let mut points = [Point::new(100.0, 200.0); LANDMARK_COUNT];
        for (&(tip, pip), dy) in FINGER_PAIRS.iter().zip(offsets) {
            points[pip.index()] = Point::new(100.0, 200.0);
            points[tip.index()] = Point::new(100.0, 200.0 + dy);
        }
        HandObservation::from_points(Handedness::Left, points)
    }

    #[test]
    fn all_tips_below_joints_is_closed() {
        let hand = hand_with_tip_offsets([10.0, 12.0, 8.0, 5.0]);
        assert_eq!(classify(&hand), PalmState::Closed);
    }

    #[test]
    fn tip_level_with_joint_counts_as_curled() {
        let hand = hand_with_tip_offsets([0.0, 0.0, 0.0, 0.0]);
        assert_eq!(classify(&hand), PalmState::Closed);
    }

    #[test]
    fn one_extended_finger_is_open() {
        let hand = hand_with_tip_offsets([10.0, -30.0, 8.0, 5.0]);
        assert_eq!(classify(&hand), PalmState::Open);
    }

    #[test]
    fn thumb_position_is_ignored() {
        let mut hand = hand_with_tip_offsets([10.0, 10.0, 10.0, 10.0]);
        let mut points = *hand.points();
        points[LandmarkId::THUMB_TIP.index()] = Point::new(0.0, -500.0);
        hand = HandObservation::from_points(Handedness::Left, points);
        assert_eq!(classify(&hand), PalmState::Closed);
    }

    #[test]
    fn classify_is_deterministic() {
        let hand = hand_with_tip_offsets([3.0, -1.0, 4.0, 1.0]);
        assert_eq!(classify(&hand), classify(&hand));
    }
}
