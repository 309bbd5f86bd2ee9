//! Per-frame input model: landmarks, hand observations and frames.
//!
//! A [`HandObservation`] always carries all 21 landmarks; anything less is
//! rejected at construction.  A [`LandmarkFrame`] holds at most one hand per
//! [`Handedness`] and is consumed by the engine once, then dropped.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::GestureError;

/// Number of skeletal points reported per hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2-D position in image pixels (Y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkId — fixed anatomical numbering
// ════════════════════════════════════════════════════════════════════════════

/// Anatomical landmark index, 0–20.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LandmarkId(u8);

impl LandmarkId {
    pub const WRIST:      LandmarkId = LandmarkId(0);
    pub const THUMB_CMC:  LandmarkId = LandmarkId(1);
    pub const THUMB_MCP:  LandmarkId = LandmarkId(2);
    pub const THUMB_IP:   LandmarkId = LandmarkId(3);
    pub const THUMB_TIP:  LandmarkId = LandmarkId(4);
    pub const INDEX_MCP:  LandmarkId = LandmarkId(5);
    pub const INDEX_PIP:  LandmarkId = LandmarkId(6);
    pub const INDEX_DIP:  LandmarkId = LandmarkId(7);
    pub const INDEX_TIP:  LandmarkId = LandmarkId(8);
    pub const MIDDLE_MCP: LandmarkId = LandmarkId(9);
    pub const MIDDLE_PIP: LandmarkId = LandmarkId(10);
    pub const MIDDLE_DIP: LandmarkId = LandmarkId(11);
    pub const MIDDLE_TIP: LandmarkId = LandmarkId(12);
    pub const RING_MCP:   LandmarkId = LandmarkId(13);
    pub const RING_PIP:   LandmarkId = LandmarkId(14);
    pub const RING_DIP:   LandmarkId = LandmarkId(15);
    pub const RING_TIP:   LandmarkId = LandmarkId(16);
    pub const PINKY_MCP:  LandmarkId = LandmarkId(17);
    pub const PINKY_PIP:  LandmarkId = LandmarkId(18);
    pub const PINKY_DIP:  LandmarkId = LandmarkId(19);
    pub const PINKY_TIP:  LandmarkId = LandmarkId(20);

    /// Checked constructor; `None` outside 0–20.
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < LANDMARK_COUNT).then_some(LandmarkId(index))
    }

    pub fn index(self) -> usize { self.0 as usize }
}

/// Bone connections between landmarks, for drawing a skeleton.
pub const HAND_CONNECTIONS: [(LandmarkId, LandmarkId); 21] = [
    (LandmarkId::WRIST,      LandmarkId::THUMB_CMC),
    (LandmarkId::THUMB_CMC,  LandmarkId::THUMB_MCP),
    (LandmarkId::THUMB_MCP,  LandmarkId::THUMB_IP),
    (LandmarkId::THUMB_IP,   LandmarkId::THUMB_TIP),
    (LandmarkId::WRIST,      LandmarkId::INDEX_MCP),
    (LandmarkId::INDEX_MCP,  LandmarkId::INDEX_PIP),
    (LandmarkId::INDEX_PIP,  LandmarkId::INDEX_DIP),
    (LandmarkId::INDEX_DIP,  LandmarkId::INDEX_TIP),
    (LandmarkId::INDEX_MCP,  LandmarkId::MIDDLE_MCP),
    (LandmarkId::MIDDLE_MCP, LandmarkId::MIDDLE_PIP),
    (LandmarkId::MIDDLE_PIP, LandmarkId::MIDDLE_DIP),
    (LandmarkId::MIDDLE_DIP, LandmarkId::MIDDLE_TIP),
    (LandmarkId::MIDDLE_MCP, LandmarkId::RING_MCP),
    (LandmarkId::RING_MCP,   LandmarkId::RING_PIP),
    (LandmarkId::RING_PIP,   LandmarkId::RING_DIP),
    (LandmarkId::RING_DIP,   LandmarkId::RING_TIP),
    (LandmarkId::RING_MCP,   LandmarkId::PINKY_MCP),
    (LandmarkId::WRIST,      LandmarkId::PINKY_MCP),
    (LandmarkId::PINKY_MCP,  LandmarkId::PINKY_PIP),
    (LandmarkId::PINKY_PIP,  LandmarkId::PINKY_DIP),
    (LandmarkId::PINKY_DIP,  LandmarkId::PINKY_TIP),
];

/// A single tracked point: identifier plus pixel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub id:       LandmarkId,
    pub position: Point,
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Handedness::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Handedness::Right)
        } else {
            Err(GestureError::malformed(format!("unknown handedness label {s:?}")))
        }
    }
}

/// Accepts the same labels as [`FromStr`], in any case.
impl<'de> Deserialize<'de> for Handedness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand with all 21 landmarks, indexed by [`LandmarkId`].
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    handedness: Handedness,
    points:     [Point; LANDMARK_COUNT],
}

impl HandObservation {
    /// Build from landmarks in any order.  Every id 0–20 must appear once.
    pub fn new(handedness: Handedness, landmarks: &[Landmark]) -> Result<Self, GestureError> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(GestureError::malformed(format!(
                "expected {LANDMARK_COUNT} landmarks, got {}",
                landmarks.len()
            )));
        }
        let mut slots: [Option<Point>; LANDMARK_COUNT] = [None; LANDMARK_COUNT];
        for lm in landmarks {
            let slot = &mut slots[lm.id.index()];
            if slot.is_some() {
                return Err(GestureError::malformed(format!(
                    "landmark {} reported twice",
                    lm.id.index()
                )));
            }
            *slot = Some(lm.position);
        }
        let mut points = [Point::default(); LANDMARK_COUNT];
        for (i, slot) in slots.iter().enumerate() {
            points[i] = slot.ok_or_else(|| GestureError::malformed(format!("landmark {i} missing")))?;
        }
        Ok(HandObservation { handedness, points })
    }

    /// Build from a complete, id-ordered point array.
    pub fn from_points(handedness: Handedness, points: [Point; LANDMARK_COUNT]) -> Self {
        HandObservation { handedness, points }
    }

    /// Convert normalized detector output (0–1 per axis) into pixel space.
    ///
    /// Coordinates are truncated to whole pixels, matching how landmark
    /// lists are usually built from a detector's normalized output.
    pub fn from_normalized(
        handedness: Handedness,
        normalized: &[(f32, f32)],
        width:      u32,
        height:     u32,
    ) -> Result<Self, GestureError> {
        if normalized.len() != LANDMARK_COUNT {
            return Err(GestureError::malformed(format!(
                "expected {LANDMARK_COUNT} normalized landmarks, got {}",
                normalized.len()
            )));
        }
        let mut points = [Point::default(); LANDMARK_COUNT];
        for (p, &(nx, ny)) in points.iter_mut().zip(normalized) {
            if !nx.is_finite() || !ny.is_finite() {
                return Err(GestureError::malformed("non-finite landmark coordinate"));
            }
            *p = Point::new((nx * width as f32).trunc(), (ny * height as f32).trunc());
        }
        Ok(HandObservation { handedness, points })
    }

    pub fn handedness(&self) -> Handedness { self.handedness }

    /// Position of landmark `id`.
    pub fn point(&self, id: LandmarkId) -> Point { self.points[id.index()] }

    pub fn landmark(&self, id: LandmarkId) -> Landmark {
        Landmark { id, position: self.point(id) }
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] { &self.points }

    /// All landmarks in id order.
    pub fn landmarks(&self) -> impl Iterator<Item = Landmark> + '_ {
        self.points.iter().enumerate().map(|(i, &position)| Landmark {
            id: LandmarkId(i as u8),
            position,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// One camera tick: a monotonic timestamp plus up to one hand per side.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    timestamp: Duration,
    left:      Option<HandObservation>,
    right:     Option<HandObservation>,
}

impl LandmarkFrame {
    pub fn empty(timestamp: Duration) -> Self {
        LandmarkFrame { timestamp, left: None, right: None }
    }

    /// Slot hands by handedness.  When two hands share a handedness the
    /// first one seen is kept and later ones are dropped.
    pub fn from_hands<I>(timestamp: Duration, hands: I) -> Self
    where
        I: IntoIterator<Item = HandObservation>,
    {
        let mut frame = LandmarkFrame::empty(timestamp);
        for hand in hands {
            let slot = match hand.handedness {
                Handedness::Left  => &mut frame.left,
                Handedness::Right => &mut frame.right,
            };
            if slot.is_some() {
                warn!(
                    handedness = %hand.handedness,
                    t = timestamp.as_secs_f64(),
                    "duplicate hand in frame; keeping the first one"
                );
                continue;
            }
            *slot = Some(hand);
        }
        frame
    }

    pub fn timestamp(&self) -> Duration { self.timestamp }

    pub fn hand(&self, handedness: Handedness) -> Option<&HandObservation> {
        match handedness {
            Handedness::Left  => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }

    pub fn left(&self)  -> Option<&HandObservation> { self.left.as_ref() }
    pub fn right(&self) -> Option<&HandObservation> { self.right.as_ref() }

    /// Present hands, Left first.
    pub fn hands(&self) -> impl Iterator<Item = &HandObservation> {
        self.left.iter().chain(self.right.iter())
    }

    pub fn is_empty(&self) -> bool { self.left.is_none() && self.right.is_none() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// A hand with every landmark at `(x, y)` offset by its index.
    fn flat_hand(handedness: Handedness, x: f32, y: f32) -> HandObservation {
        let mut points = [Point::default(); LANDMARK_COUNT];
        for (i, p) in points.iter_mut().enumerate() {
            *p = Point::new(x + i as f32, y);
        }
        HandObservation::from_points(handedness, points)
    }

    fn landmarks_in_reverse() -> Vec<Landmark> {
        (0..LANDMARK_COUNT as u8)
            .rev()
            .map(|i| Landmark {
                id:       LandmarkId::new(i).unwrap(),
                position: Point::new(i as f32 * 10.0, 5.0),
            })
            .collect()
    }

    #[test]
    fn new_accepts_any_order() {
        let hand = HandObservation::new(Handedness::Right, &landmarks_in_reverse()).unwrap();
        assert_eq!(hand.point(LandmarkId::INDEX_TIP), Point::new(80.0, 5.0));
        assert_eq!(hand.landmarks().count(), LANDMARK_COUNT);
    }

    #[test]
    fn new_rejects_missing_landmark() {
        let mut lms = landmarks_in_reverse();
        lms.pop();
        let err = HandObservation::new(Handedness::Left, &lms).unwrap_err();
        assert!(matches!(err, GestureError::MalformedObservation { .. }));
    }

    #[test]
    fn new_rejects_duplicate_id() {
        let mut lms = landmarks_in_reverse();
        lms[0].id = LandmarkId::WRIST;
        assert!(HandObservation::new(Handedness::Left, &lms).is_err());
    }

    #[test]
    fn landmark_id_bounds() {
        assert!(LandmarkId::new(20).is_some());
        assert!(LandmarkId::new(21).is_none());
    }

    #[test]
    fn normalized_coordinates_truncate_to_pixels() {
        let pts = vec![(0.5_f32, 0.2501_f32); LANDMARK_COUNT];
        let hand = HandObservation::from_normalized(Handedness::Left, &pts, 640, 480).unwrap();
        assert_eq!(hand.point(LandmarkId::WRIST), Point::new(320.0, 120.0));
    }

    #[test]
    fn normalized_rejects_short_list() {
        let pts = vec![(0.5_f32, 0.5_f32); 20];
        assert!(HandObservation::from_normalized(Handedness::Left, &pts, 640, 480).is_err());
    }

    #[test]
    fn handedness_parses_detector_labels() {
        assert_eq!("Left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert_eq!("right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!("both".parse::<Handedness>().is_err());
    }

    #[test]
    fn handedness_deserializes_in_any_case() {
        #[derive(Deserialize)]
        struct Labelled { hand: Handedness }

        let lower: Labelled = toml::from_str("hand = \"left\"").unwrap();
        assert_eq!(lower.hand, Handedness::Left);
        let upper: Labelled = toml::from_str("hand = \"RIGHT\"").unwrap();
        assert_eq!(upper.hand, Handedness::Right);
        assert!(toml::from_str::<Labelled>("hand = \"both\"").is_err());
    }

    #[test]
    fn duplicate_handedness_keeps_first_seen() {
        let first  = flat_hand(Handedness::Left, 10.0, 10.0);
        let second = flat_hand(Handedness::Left, 99.0, 99.0);
        let frame = LandmarkFrame::from_hands(Duration::ZERO, vec![first.clone(), second]);
        assert_eq!(frame.left(), Some(&first));
        assert!(frame.right().is_none());
        assert_eq!(frame.hands().count(), 1);
    }

    #[test]
    fn frame_slots_by_handedness() {
        let l = flat_hand(Handedness::Left, 0.0, 0.0);
        let r = flat_hand(Handedness::Right, 0.0, 0.0);
        let frame = LandmarkFrame::from_hands(Duration::from_millis(5), vec![r, l]);
        assert_eq!(frame.hand(Handedness::Left).unwrap().handedness(), Handedness::Left);
        assert_eq!(frame.hand(Handedness::Right).unwrap().handedness(), Handedness::Right);
        assert!(!frame.is_empty());
        assert!(LandmarkFrame::empty(Duration::ZERO).is_empty());
    }

    #[test]
    fn point_distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
