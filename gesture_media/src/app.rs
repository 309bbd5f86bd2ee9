//! Top-level application state and frame loop.
//!
//! `AppState` owns the `GestureEngine`, the output sink, an optional
//! recorder and the overlay's event log.  It processes `LandmarkFrame`s in
//! arrival order and hands the results to the overlay each frame.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use anyhow::{Context, Result};
use hand_gesture::{FrameOutput, GestureEngine, LandmarkFrame};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::overlay::Overlay;
use crate::recording::{Coordinates, RecordingWriter};
use crate::sink::{LogSink, MediaKeySink, MidiSink, OutputSink, VolumeSink};
use crate::source::{spawn_landmark_source, ReplaySource, SimHands, SimInput, SimLandmarkSource};

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Overlay window driving the simulated hands.
    Simulate,
    /// Feed a recording; `headless` skips the window.
    Replay { path: PathBuf, headless: bool },
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    engine:      GestureEngine,
    sink:        Box<dyn OutputSink>,
    recorder:    Option<RecordingWriter<BufWriter<File>>>,

    // ── overlay state ─────────────────────────────────────────────────────
    log:         Vec<String>,
    log_lines:   usize,
    last_frame:  Option<LandmarkFrame>,
    last_output: Option<FrameOutput>,

    // ── session counters ──────────────────────────────────────────────────
    frames:      u64,
    events:      u64,
}

impl AppState {
    pub fn new(cfg: &AppConfig, sink: Box<dyn OutputSink>) -> Result<Self> {
        let engine = GestureEngine::new(cfg.engine.clone())
            .context("cannot build gesture engine")?;
        Ok(AppState {
            engine,
            sink,
            recorder:    None,
            log:         Vec::new(),
            log_lines:   cfg.overlay.log_lines,
            last_frame:  None,
            last_output: None,
            frames:      0,
            events:      0,
        })
    }

    /// Record every subsequent frame to `path`, in the same coordinate space
    /// replays of it will be read in.
    pub fn start_recording(&mut self, path: &Path, coords: Coordinates) -> Result<()> {
        self.recorder = Some(RecordingWriter::create(path)?.with_coordinates(coords));
        info!(path = %path.display(), ?coords, "recording frames");
        Ok(())
    }

    // ── process one LandmarkFrame ────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: &LandmarkFrame) -> FrameOutput {
        if let Some(rec) = self.recorder.as_mut() {
            if let Err(e) = rec.write_frame(frame) {
                warn!("recording stopped: {e:#}");
                self.recorder = None;
            }
        }

        let out = self.engine.process(frame);

        if out.volume_updated {
            self.sink.set_volume(out.volume, out.volume_percent);
        }
        for &event in &out.events {
            self.sink.send(event);
            self.push_log(format!("{:.2}s {}", out.timestamp.as_secs_f32(), event.describe()));
        }

        self.frames += 1;
        self.events += out.events.len() as u64;
        self.last_frame = Some(frame.clone());
        self.last_output = Some(out.clone());
        out
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > self.log_lines {
            let excess = self.log.len() - self.log_lines;
            self.log.drain(..excess);
        }
    }

    /// Flush the recorder and report the session.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(rec) = self.recorder.as_mut() {
            rec.flush().context("cannot flush recording")?;
        }
        info!(frames = self.frames, events = self.events, "session finished");
        Ok(())
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn log(&self)         -> &[String]             { &self.log }
    pub fn last_frame(&self)  -> Option<&LandmarkFrame> { self.last_frame.as_ref() }
    pub fn last_output(&self) -> Option<&FrameOutput>  { self.last_output.as_ref() }
    pub fn frames(&self)      -> u64                   { self.frames }
    pub fn events(&self)      -> u64                   { self.events }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the application until the source ends or the user quits.
///
/// MIDI output is opened when enabled in `cfg`; otherwise outputs are only
/// logged.  With `record`, every frame processed is also written to that
/// file.
pub fn run(cfg: AppConfig, mode: Mode, record: Option<PathBuf>) -> Result<()> {
    cfg.validate()?;

    let sink: Box<dyn OutputSink> = if cfg.midi.enabled {
        Box::new(MidiSink::open(cfg.midi.clone()))
    } else {
        Box::new(LogSink)
    };
    let (w, h) = (cfg.source.frame_width, cfg.source.frame_height);
    let coords = if cfg.source.normalized {
        Coordinates::Normalized { width: w, height: h }
    } else {
        Coordinates::Pixels
    };

    let mut app = AppState::new(&cfg, sink)?;
    if let Some(path) = record {
        app.start_recording(&path, coords)?;
    }

    match mode {
        Mode::Replay { path, headless } => {
            let rx = spawn_landmark_source(ReplaySource {
                path,
                coords,
                realtime: cfg.source.realtime,
            });
            if headless {
                for frame in rx {
                    app.handle_frame(&frame);
                }
            } else {
                let mut overlay = Overlay::new(w, h, None)?;
                window_loop(&mut app, &mut overlay, &rx, false)?;
            }
        }
        Mode::Simulate => {
            let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
            let rx = spawn_landmark_source(SimLandmarkSource {
                rx:    sim_rx,
                hands: SimHands::new(w, h),
            });
            let mut overlay = Overlay::new(w, h, Some(sim_tx))?;
            window_loop(&mut app, &mut overlay, &rx, true)?;
        }
    }

    app.finish()
}

/// Poll input, drain frames, render; ~60 fps via the window's rate limit.
/// A replay keeps its last frame on screen after the stream ends.
fn window_loop(
    app:           &mut AppState,
    overlay:       &mut Overlay,
    rx:            &Receiver<LandmarkFrame>,
    stop_on_end:   bool,
) -> Result<()> {
    let mut stream_open = true;
    while overlay.is_open() {
        if !overlay.poll_input() { break; }

        while stream_open {
            match rx.try_recv() {
                Ok(frame) => { app.handle_frame(&frame); }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    stream_open = false;
                    info!("landmark stream ended");
                }
            }
        }
        if !stream_open && stop_on_end { break; }

        overlay.render(app.last_frame(), app.last_output(), app.log())?;
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
