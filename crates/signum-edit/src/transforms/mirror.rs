//! Time reversal of notes in a range

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::note::{Note, NotePin};
use crate::pattern::Pattern;

/// Reverse every note's curve, and unless `in_place`, reflect note
/// positions around the middle of the range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorHorizontal {
    #[serde(default)]
    pub in_place: bool,
}

impl MirrorHorizontal {
    pub fn new(in_place: bool) -> Self {
        Self { in_place }
    }
}

impl super::NoteTransform for MirrorHorizontal {
    fn name(&self) -> &'static str {
        "Mirror Horizontal"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        mirror_horizontal(pass.pattern, pass.range.x1, pass.range.x2, self.in_place)
    }
}

pub(crate) fn mirror_horizontal(pattern: &mut Pattern, x1: i32, x2: i32, in_place: bool) -> bool {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);
    if range.is_empty() {
        return false;
    }

    let first = &pattern.notes[range.start];
    let tied_start = (first.start == 0 && first.continues_last_pattern).then(|| first.starting_pitches());

    let mut mirrored: Vec<Note> = pattern.notes[range.clone()]
        .iter()
        .map(|n| mirror_note(n, in_place, x1 + x2))
        .collect();
    mirrored.sort_by_key(|n| n.start);

    if let (Some(pitches), Some(first)) = (tied_start, mirrored.first_mut()) {
        if first.start == 0 && first.starting_pitches() == pitches {
            first.continues_last_pattern = true;
        }
    }

    pattern.apply_batch(range, mirrored);
    true
}

/// `axis` is `x1 + x2`, twice the mirror centre
fn mirror_note(note: &Note, in_place: bool, axis: i32) -> Note {
    let last = note.last_pin().time;
    let pins: Vec<NotePin> = note
        .pins
        .iter()
        .rev()
        .map(|p| NotePin::new(p.interval, (p.time - last).abs(), p.size))
        .collect();

    let keeps_tie = in_place && pins[0].interval == note.first_pin().interval;
    let (start, end) = if in_place {
        (note.start, note.end)
    } else {
        (axis - note.end, axis - note.start)
    };

    Note {
        pitches: note.pitches.clone(),
        start,
        end,
        pins,
        continues_last_pattern: note.continues_last_pattern && keeps_tie,
    }
}
