//! Random one-part nudges

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::pattern::Pattern;

/// Nudge each note one part left or right at random where there is room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapNotes;

impl super::NoteTransform for TapNotes {
    fn name(&self) -> &'static str {
        "Tap Notes"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        tap_notes(pass.pattern, pass.range.x1, pass.range.x2, pass.limits.parts_per_pattern, pass.rng)
    }
}

fn tap_notes(pattern: &mut Pattern, x1: i32, x2: i32, parts_per_pattern: i32, rng: &mut fastrand::Rng) -> bool {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);

    let mut moved = false;
    for i in range {
        let prev_end = if i > 0 { pattern.notes[i - 1].end } else { 0 };
        let next_start = pattern.notes.get(i + 1).map_or(parts_per_pattern, |n| n.start);
        let note = &mut pattern.notes[i];

        let can_left = note.start > x1 && note.start > prev_end;
        let can_right = note.end < x2 && note.end < next_start;
        let mut offset = 0;
        if can_left && rng.bool() {
            offset -= 1;
        }
        if can_right && rng.bool() {
            offset += 1;
        }
        if offset == 0 {
            continue;
        }

        note.translate(offset);
        if note.start != 0 {
            note.continues_last_pattern = false;
        }
        moved = true;
    }
    moved
}
