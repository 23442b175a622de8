//! Fill the gaps between notes

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::note::{Note, NotePin};
use crate::pattern::Pattern;

/// Insert a two-pin note into every gap between notes in the range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAcross {
    /// Bend each bridge toward the next note's opening pitch and volume
    #[serde(default)]
    pub do_bends: bool,
    /// Copy the left note's start and end volumes onto the bridge
    #[serde(default)]
    pub copy_ends: bool,
    #[serde(skip)]
    inserted: Vec<Note>,
}

impl BridgeAcross {
    pub fn new(do_bends: bool, copy_ends: bool) -> Self {
        Self {
            do_bends,
            copy_ends,
            inserted: Vec::new(),
        }
    }

    /// Bridges inserted by the last run, left to right
    pub fn inserted(&self) -> impl Iterator<Item = &Note> + '_ {
        self.inserted.iter()
    }
}

impl super::NoteTransform for BridgeAcross {
    fn name(&self) -> &'static str {
        "Bridge Across"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        self.inserted = bridge_across(pass.pattern, pass.range.x1, pass.range.x2, self, pass.pitch_limit);
        !self.inserted.is_empty()
    }
}

fn bridge_across(pattern: &mut Pattern, x1: i32, x2: i32, opts: &BridgeAcross, pitch_limit: i32) -> Vec<Note> {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);

    let bridges: Vec<Note> = pattern.notes[range]
        .windows(2)
        .filter(|pair| pair[1].start > pair[0].end)
        .map(|pair| bridge(&pair[0], &pair[1], opts, pitch_limit))
        .collect();

    pattern.insert_notes(bridges.clone());
    bridges
}

fn bridge(left: &Note, right: &Note, opts: &BridgeAcross, pitch_limit: i32) -> Note {
    let pitches = left.ending_pitches();
    let length = right.start - left.end;
    let held = left.last_pin().size;

    let (start_size, mut end_size) = if opts.copy_ends {
        (left.first_pin().size, held)
    } else {
        (held, held)
    };

    let mut end_interval = 0;
    if opts.do_bends {
        let lowest = pitches.iter().copied().min().unwrap_or(0);
        let highest = pitches.iter().copied().max().unwrap_or(0);
        let target = right.pitches[0] + right.first_pin().interval;
        end_interval = (target - pitches[0]).max(-lowest).min(pitch_limit - highest);
        if !opts.copy_ends {
            end_size = right.first_pin().size;
        }
    }

    Note {
        pitches,
        start: left.end,
        end: right.start,
        pins: vec![NotePin::new(0, 0, start_size), NotePin::new(end_interval, length, end_size)],
        continues_last_pattern: false,
    }
}
