//! Merge transforms

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::note::{Note, NotePin, prune_redundant_pins};
use crate::pattern::Pattern;

/// Force every note overlapping the range into one note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeAcross;

impl super::NoteTransform for MergeAcross {
    fn name(&self) -> &'static str {
        "Merge Across"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        merge_across(pass.pattern, pass.range.x1, pass.range.x2, pass.pitch_limit)
    }
}

/// Merge touching neighbours whose pitches carry straight on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeAdjacent;

impl super::NoteTransform for MergeAdjacent {
    fn name(&self) -> &'static str {
        "Merge Adjacent"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        merge_adjacent(pass.pattern, pass.range.x1, pass.range.x2, pass.pitch_limit)
    }
}

/// The merged note keeps the first note's chord, so borrowed intervals are
/// clamped back under `pitch_limit`
pub(crate) fn merge_across(pattern: &mut Pattern, x1: i32, x2: i32, pitch_limit: i32) -> bool {
    let range = pattern.overlapping(x1, x2);
    if range.len() < 2 {
        return false;
    }

    let notes = &pattern.notes[range.clone()];
    let first = &notes[0];
    let first_pitch = first.pitches[0];
    let mut pins = first.pins.clone();
    for note in &notes[1..] {
        let offset = note.start - first.start;
        for pin in &note.pins {
            let moved = NotePin::new(note.pitches[0] + pin.interval - first_pitch, offset + pin.time, pin.size);
            push_reconciled(&mut pins, moved);
        }
    }

    let mut merged = Note {
        pitches: first.pitches.clone(),
        start: first.start,
        end: first.start + pins[pins.len() - 1].time,
        pins,
        continues_last_pattern: first.continues_last_pattern,
    };
    merged.clamp_intervals(pitch_limit);
    prune_redundant_pins(&mut merged.pins);
    pattern.apply_batch(range, vec![merged]);
    true
}

/// Append a pin, settling a time collision with the current last pin
fn push_reconciled(pins: &mut Vec<NotePin>, pin: NotePin) {
    if let Some(&last) = pins.last() {
        if last.time >= pin.time {
            let crowded = pins.len() < 2 || pins[pins.len() - 2].time >= last.time - 1;
            if last == pin || crowded {
                pins.pop();
            } else if let Some(last) = pins.last_mut() {
                last.time -= 1;
            }
        }
    }
    pins.push(pin);
}

/// Pitches at the end of `a` include every starting pitch of `b`
fn continues_into(a: &Note, b: &Note) -> bool {
    if a.end != b.start || a.pitches.len() != b.pitches.len() {
        return false;
    }
    let ending = a.ending_pitches();
    b.pitches.iter().all(|p| ending.contains(p))
}

pub(crate) fn merge_adjacent(pattern: &mut Pattern, x1: i32, x2: i32, pitch_limit: i32) -> bool {
    let mut changed = false;
    let mut i = pattern.inside(x1, x2).start;
    while i + 1 < pattern.notes.len() {
        let (a, b) = (&pattern.notes[i], &pattern.notes[i + 1]);
        if b.end > x2 {
            break;
        }
        if continues_into(a, b) {
            let (start, end) = (a.start, b.end);
            merge_across(pattern, start, end, pitch_limit);
            changed = true;
        } else {
            i += 1;
        }
    }
    changed
}
