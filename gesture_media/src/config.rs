//! Application configuration, loaded from TOML.
//!
//! ```toml
//! [engine]
//! alpha = 0.15
//! swipe_threshold = 120.0
//!
//! [source]
//! frame_width = 640
//! frame_height = 480
//!
//! [midi]
//! port = "fluid"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hand_gesture::EngineConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine:  EngineConfig,
    pub source:  SourceConfig,
    pub midi:    MidiConfig,
    pub overlay: OverlayConfig,
}

/// How landmark coordinates arrive and how replays are paced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Camera frame size in pixels; also the overlay window size.
    pub frame_width:  u32,
    pub frame_height: u32,
    /// Recorded coordinates are 0–1 and must be scaled by the frame size.
    pub normalized:   bool,
    /// Replay frames at their recorded pace instead of as fast as possible.
    pub realtime:     bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig { frame_width: 640, frame_height: 480, normalized: false, realtime: false }
    }
}

/// MIDI control output.  Transport controllers default to the undefined
/// block 102–119.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MidiConfig {
    pub enabled:       bool,
    /// Case-insensitive substring of the output port name.
    pub port:          Option<String>,
    pub channel:       u8,
    pub volume_cc:     u8,
    pub next_cc:       u8,
    pub prev_cc:       u8,
    pub play_pause_cc: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        MidiConfig {
            enabled:       true,
            port:          None,
            channel:       0,
            volume_cc:     7,
            next_cc:       102,
            prev_cc:       103,
            play_pause_cc: 104,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Event lines kept on screen.
    pub log_lines: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self { OverlayConfig { log_lines: 6 } }
}

impl AppConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&text)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("invalid [engine] configuration")?;

        if self.source.frame_width == 0 || self.source.frame_height == 0 {
            bail!(
                "invalid [source] frame size {}x{}",
                self.source.frame_width,
                self.source.frame_height
            );
        }

        let m = &self.midi;
        if m.channel > 15 {
            bail!("invalid [midi] channel {} (0–15)", m.channel);
        }
        for (name, cc) in [
            ("volume_cc", m.volume_cc),
            ("next_cc", m.next_cc),
            ("prev_cc", m.prev_cc),
            ("play_pause_cc", m.play_pause_cc),
        ] {
            if cc > 127 {
                bail!("invalid [midi] {name} {cc} (0–127)");
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("cannot serialize configuration")
    }
}
