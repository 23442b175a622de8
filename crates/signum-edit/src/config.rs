//! Read-only numeric ceilings shared by every transform

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Channel type, decides the pitch ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelKind {
    #[default]
    Pitched,
    Percussion,
}

/// Song-wide limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Highest pitch on a pitched channel
    pub max_pitch: i32,
    /// Number of drum pitches on a percussion channel
    pub drum_count: i32,
    /// Loudest pin size
    pub note_size_max: i32,
    /// Pattern width in parts
    pub parts_per_pattern: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pitch: 84,
            drum_count: 12,
            note_size_max: 3,
            // 8 beats of 24 parts
            parts_per_pattern: 192,
        }
    }
}

impl Limits {
    pub fn new(max_pitch: i32, drum_count: i32, note_size_max: i32, parts_per_pattern: i32) -> Self {
        Self {
            max_pitch,
            drum_count,
            note_size_max,
            parts_per_pattern,
        }
    }

    /// Highest pitch any transform may produce on this channel
    pub fn pitch_ceiling(&self, channel: ChannelKind) -> i32 {
        match channel {
            ChannelKind::Pitched => self.max_pitch,
            ChannelKind::Percussion => self.drum_count - 1,
        }
    }

    /// Parse limits from TOML, missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
