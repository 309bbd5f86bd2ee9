//! Output sinks for volume levels and media events.
//!
//! The engine only produces values; these traits are where they leave the
//! process.  `MidiSink` drives a MIDI output port (a softsynth, a DAW or a
//! controller-mapping daemon); `LogSink` just logs.

use hand_gesture::MediaEvent;
use tracing::{info, warn};

use crate::config::MidiConfig;

// ════════════════════════════════════════════════════════════════════════════
// Sink traits
// ════════════════════════════════════════════════════════════════════════════

/// Receives the smoothed volume whenever it is updated.
pub trait VolumeSink {
    /// `level` is in output-range units; `percent` is the same level 0–100.
    fn set_volume(&mut self, level: f32, percent: f32);
}

/// Receives discrete media-control events.
pub trait MediaKeySink {
    fn send(&mut self, event: MediaEvent);
}

/// One object taking both kinds of output, as the app holds it.
pub trait OutputSink: VolumeSink + MediaKeySink + Send {}

impl<T: VolumeSink + MediaKeySink + Send> OutputSink for T {}

// ════════════════════════════════════════════════════════════════════════════
// LogSink
// ════════════════════════════════════════════════════════════════════════════

/// Logs every output; used headless and when MIDI is disabled.
#[derive(Default)]
pub struct LogSink;

impl VolumeSink for LogSink {
    fn set_volume(&mut self, level: f32, percent: f32) {
        tracing::debug!(level, percent, "volume");
    }
}

impl MediaKeySink for LogSink {
    fn send(&mut self, event: MediaEvent) {
        info!(event = event.as_str(), "media key");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        if let Err(e) = self.conn.send(&[0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F]) {
            warn!("MIDI send failed: {e}");
        }
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullOut;

impl MidiOut for NullOut {
    fn control_change(&mut self, _ch: u8, _cc: u8, _v: u8) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick one
// ════════════════════════════════════════════════════════════════════════════

/// Pick a port name: the first containing `wanted` (case-insensitive), else
/// the first softsynth-looking one, else the first.  `None` when `wanted` is
/// set and nothing matches.
pub fn choose_port(names: &[String], wanted: Option<&str>) -> Option<usize> {
    if let Some(w) = wanted {
        let w = w.to_lowercase();
        return names.iter().position(|n| n.to_lowercase().contains(&w));
    }
    if names.is_empty() {
        return None;
    }
    let synth = names.iter().position(|n| {
        let n = n.to_lowercase();
        n.contains("fluid") || n.contains("timidity") ||
        n.contains("microsoft") || n.contains("synth")
    });
    Some(synth.unwrap_or(0))
}

/// Try to open a MIDI output port.
/// Falls back to `NullOut` with a warning if none can be opened.
pub fn open_midi_output(wanted: Option<&str>) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("gesture_media") {
        Ok(m)  => m,
        Err(e) => {
            warn!("MIDI init error: {e}; using null output");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let Some(idx) = choose_port(&names, wanted) else {
        match wanted {
            Some(w) => warn!(available = ?names, "no MIDI output port matches {w:?}; using null output"),
            None    => warn!("no MIDI output ports found; using null output"),
        }
        return Box::new(NullOut);
    };

    info!(port = %names[idx], "opening MIDI output");
    match midi_out.connect(&ports[idx], "gesture-media") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e)   => {
            warn!("failed to connect MIDI port: {e}; using null output");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiSink
// ════════════════════════════════════════════════════════════════════════════

/// Volume as a continuous controller, media events as momentary CC presses
/// (127 then 0).
pub struct MidiSink {
    out:      Box<dyn MidiOut>,
    cfg:      MidiConfig,
    /// Last CC value sent for volume; identical values are not resent.
    last_cc:  Option<u8>,
}

impl MidiSink {
    pub fn new(out: Box<dyn MidiOut>, cfg: MidiConfig) -> Self {
        MidiSink { out, cfg, last_cc: None }
    }

    pub fn open(cfg: MidiConfig) -> Self {
        let out = open_midi_output(cfg.port.as_deref());
        MidiSink::new(out, cfg)
    }

    fn event_cc(&self, event: MediaEvent) -> u8 {
        match event {
            MediaEvent::NextTrack       => self.cfg.next_cc,
            MediaEvent::PreviousTrack   => self.cfg.prev_cc,
            MediaEvent::PlayPauseToggle => self.cfg.play_pause_cc,
        }
    }
}

/// 0–100 percent to a 7-bit controller value.
pub fn percent_to_cc(percent: f32) -> u8 {
    if !percent.is_finite() {
        return 0;
    }
    (percent.clamp(0.0, 100.0) / 100.0 * 127.0).round() as u8
}

impl VolumeSink for MidiSink {
    fn set_volume(&mut self, _level: f32, percent: f32) {
        let cc = percent_to_cc(percent);
        if self.last_cc == Some(cc) {
            return;
        }
        self.out.control_change(self.cfg.channel, self.cfg.volume_cc, cc);
        self.last_cc = Some(cc);
    }
}

impl MediaKeySink for MidiSink {
    fn send(&mut self, event: MediaEvent) {
        let cc = self.event_cc(event);
        self.out.control_change(self.cfg.channel, cc, 127);
        self.out.control_change(self.cfg.channel, cc, 0);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
