//! JSON-lines landmark recordings.
//!
//! One frame per line:
//!
//! ```text
//! {"t":0.033,"hands":[{"handedness":"Left","landmarks":[[312.0,240.0], ... 21 pairs]}]}
//! ```
//!
//! `t` is seconds on a monotonic clock.  Coordinates are pixels, or 0–1 when
//! the reader is told the recording is normalized.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use hand_gesture::{GestureError, HandObservation, Handedness, LandmarkFrame, Point, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub handedness: Handedness,
    pub landmarks:  Vec<[f32; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub t:     f64,
    #[serde(default)]
    pub hands: Vec<HandRecord>,
}

/// Coordinate space of a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coordinates {
    Pixels,
    Normalized { width: u32, height: u32 },
}

impl HandRecord {
    /// Store a hand in the given coordinate space.
    pub fn from_hand(hand: &HandObservation, coords: Coordinates) -> Self {
        let (sx, sy) = match coords {
            Coordinates::Pixels                      => (1.0, 1.0),
            Coordinates::Normalized { width, height } => (width as f32, height as f32),
        };
        HandRecord {
            handedness: hand.handedness(),
            landmarks:  hand.points().iter().map(|p| [p.x / sx, p.y / sy]).collect(),
        }
    }

    pub fn to_hand(&self, coords: Coordinates) -> Result<HandObservation, GestureError> {
        match coords {
            Coordinates::Pixels => {
                if self.landmarks.len() != LANDMARK_COUNT {
                    return Err(GestureError::MalformedObservation {
                        reason: format!(
                            "expected {LANDMARK_COUNT} landmarks, got {}",
                            self.landmarks.len()
                        ),
                    });
                }
                let mut points = [Point::default(); LANDMARK_COUNT];
                for (p, &[x, y]) in points.iter_mut().zip(&self.landmarks) {
                    *p = Point::new(x, y);
                }
                Ok(HandObservation::from_points(self.handedness, points))
            }
            Coordinates::Normalized { width, height } => {
                let pairs: Vec<(f32, f32)> = self.landmarks.iter().map(|&[x, y]| (x, y)).collect();
                HandObservation::from_normalized(self.handedness, &pairs, width, height)
            }
        }
    }
}

impl FrameRecord {
    pub fn from_frame(frame: &LandmarkFrame, coords: Coordinates) -> Self {
        FrameRecord {
            t:     frame.timestamp().as_secs_f64(),
            hands: frame.hands().map(|h| HandRecord::from_hand(h, coords)).collect(),
        }
    }

    /// Build a frame, dropping malformed hands and keeping the rest.
    pub fn into_frame(self, coords: Coordinates) -> Result<LandmarkFrame> {
        let timestamp = match Duration::try_from_secs_f64(self.t) {
            Ok(d)  => d,
            Err(e) => anyhow::bail!("invalid frame timestamp {}: {e}", self.t),
        };
        let hands = self.hands.iter().filter_map(|h| match h.to_hand(coords) {
            Ok(hand) => Some(hand),
            Err(e) => {
                warn!(t = self.t, handedness = %h.handedness, "dropping hand: {e}");
                None
            }
        });
        Ok(LandmarkFrame::from_hands(timestamp, hands.collect::<Vec<_>>()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reading
// ════════════════════════════════════════════════════════════════════════════

/// Parse every frame of a recording.  Blank lines are ignored; lines that
/// fail to parse are skipped with a warning.
pub fn read_recording<R: BufRead>(reader: R, coords: Coordinates) -> Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read error at line {}", lineno + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<FrameRecord>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|rec| rec.into_frame(coords));
        match parsed {
            Ok(frame) => frames.push(frame),
            Err(e)    => warn!(line = lineno + 1, "skipping frame: {e:#}"),
        }
    }
    Ok(frames)
}

pub fn open_recording(path: &Path, coords: Coordinates) -> Result<Vec<LandmarkFrame>> {
    let file = File::open(path)
        .with_context(|| format!("cannot open recording {}", path.display()))?;
    read_recording(BufReader::new(file), coords)
}

// ════════════════════════════════════════════════════════════════════════════
// Writing
// ════════════════════════════════════════════════════════════════════════════

/// Appends frames to a recording file, one JSON object per line.
///
/// Frames are written in pixels unless [`with_coordinates`] says otherwise,
/// so a session can be replayed with the same `[source]` settings it was
/// captured under.
///
/// [`with_coordinates`]: RecordingWriter::with_coordinates
pub struct RecordingWriter<W: Write> {
    out:    W,
    coords: Coordinates,
}

impl RecordingWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("cannot create recording {}", path.display()))?;
        Ok(RecordingWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordingWriter<W> {
    pub fn new(out: W) -> Self { RecordingWriter { out, coords: Coordinates::Pixels } }

    pub fn with_coordinates(mut self, coords: Coordinates) -> Self {
        self.coords = coords;
        self
    }

    pub fn write_frame(&mut self, frame: &LandmarkFrame) -> Result<()> {
        serde_json::to_writer(&mut self.out, &FrameRecord::from_frame(frame, self.coords))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W { self.out }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(handedness: &str, n: usize, scale: f32) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!("[{},{}]", i as f32 * scale, 0.5 * scale))
            .collect();
        format!(r#"{{"handedness":"{handedness}","landmarks":[{}]}}"#, pts.join(","))
    }

    #[test]
    fn reads_pixel_frames_in_order() {
        let text = format!(
            "{{\"t\":0.0,\"hands\":[{}]}}\n\n{{\"t\":0.5,\"hands\":[]}}\n",
            hand_json("Left", 21, 10.0)
        );
        let frames = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].left().unwrap().point(hand_gesture::LandmarkId::INDEX_TIP).x, 80.0);
        assert!(frames[1].is_empty());
        assert_eq!(frames[1].timestamp(), Duration::from_millis(500));
    }

    #[test]
    fn short_hand_is_dropped_but_frame_kept() {
        let text = format!(
            "{{\"t\":1.0,\"hands\":[{},{}]}}\n",
            hand_json("Left", 20, 1.0),
            hand_json("Right", 21, 1.0)
        );
        let frames = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].left().is_none());
        assert!(frames[0].right().is_some());
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let text = "not json\n{\"t\":2.0}\n{\"t\":-1.0}\n{\"t\":1e300,\"hands\":[]}\n";
        let frames = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].timestamp(), Duration::from_secs(2));
    }

    #[test]
    fn normalized_coordinates_are_scaled() {
        let text = format!("{{\"t\":0.0,\"hands\":[{}]}}\n", hand_json("Right", 21, 0.5));
        let coords = Coordinates::Normalized { width: 1000, height: 400 };
        let frames = read_recording(text.as_bytes(), coords).unwrap();
        let wrist = frames[0].right().unwrap().point(hand_gesture::LandmarkId::WRIST);
        assert_eq!(wrist, Point::new(0.0, 100.0));
    }

    #[test]
    fn lowercase_handedness_is_accepted() {
        let text = format!("{{\"t\":0.0,\"hands\":[{}]}}\n", hand_json("left", 21, 1.0));
        let frames = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].left().is_some());
    }

    #[test]
    fn normalized_writer_matches_normalized_reader() {
        let coords = Coordinates::Normalized { width: 512, height: 256 };
        let text = format!("{{\"t\":0.5,\"hands\":[{}]}}\n", hand_json("Right", 21, 8.0));
        let original = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();

        let mut writer = RecordingWriter::new(Vec::new()).with_coordinates(coords);
        for f in &original { writer.write_frame(f).unwrap(); }
        let bytes = writer.into_inner();

        let first = std::str::from_utf8(&bytes).unwrap().lines().next().unwrap();
        let line: FrameRecord = serde_json::from_str(first).unwrap();
        assert!(line.hands[0].landmarks.iter().all(|&[x, y]| x <= 1.0 && y <= 1.0));
        let replayed = read_recording(bytes.as_slice(), coords).unwrap();
        assert_eq!(replayed, original);
    }

    #[test]
    fn written_session_replays_identically() {
        let text = format!(
            "{{\"t\":0.25,\"hands\":[{},{}]}}\n",
            hand_json("Left", 21, 3.0),
            hand_json("Right", 21, 7.0)
        );
        let original = read_recording(text.as_bytes(), Coordinates::Pixels).unwrap();

        let mut writer = RecordingWriter::new(Vec::new());
        for f in &original { writer.write_frame(f).unwrap(); }
        let bytes = writer.into_inner();

        let replayed = read_recording(bytes.as_slice(), Coordinates::Pixels).unwrap();
        assert_eq!(replayed, original);
    }

    #[test]
    fn file_writer_creates_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let mut w = RecordingWriter::create(&path).unwrap();
        w.write_frame(&LandmarkFrame::empty(Duration::from_millis(40))).unwrap();
        w.flush().unwrap();
        drop(w);
        let frames = open_recording(&path, Coordinates::Pixels).unwrap();
        assert_eq!(frames, vec![LandmarkFrame::empty(Duration::from_millis(40))]);
    }
}
