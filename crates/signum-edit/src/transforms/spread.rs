//! Even out the spacing of notes in time or pitch

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::pattern::{Pattern, PitchBounds, vertical_bounds};

use super::stack::stack_left;

/// Spread notes evenly across the range in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadHorizontal;

impl super::NoteTransform for SpreadHorizontal {
    fn name(&self) -> &'static str {
        "Spread Horizontal"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        spread_horizontal(pass.pattern, pass.range.x1, pass.range.x2)
    }
}

/// Spread notes evenly across their combined pitch span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadVertical;

impl super::NoteTransform for SpreadVertical {
    fn name(&self) -> &'static str {
        "Spread Vertical"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        spread_vertical(pass.pattern, pass.range.x1, pass.range.x2, pass.pitch_limit)
    }
}

fn spread_horizontal(pattern: &mut Pattern, x1: i32, x2: i32) -> bool {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);
    if range.is_empty() {
        return false;
    }

    let before: Vec<i32> = pattern.notes[range.clone()].iter().map(|n| n.start).collect();
    let used: i32 = pattern.notes[range.clone()].iter().map(|n| n.length()).sum();
    let space = (x2 - x1) - used;

    if range.len() == 1 {
        let note = &mut pattern.notes[range.start];
        let offset = x1 + space / 2 - note.start;
        note.translate(offset);
        if offset != 0 && note.start != 0 {
            note.continues_last_pattern = false;
        }
    } else {
        stack_left(pattern, x1, x2);
        let between = space as f64 / (range.len() - 1) as f64;
        for (k, note) in pattern.notes[range.clone()].iter_mut().enumerate() {
            note.translate((between * k as f64).floor() as i32);
        }
    }

    pattern.notes[range].iter().map(|n| n.start).ne(before)
}

/// Which part of a note's own span is pinned to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Bottom,
    Center,
    Top,
}

impl Anchor {
    /// Edge of the overall span the target sits closest to
    fn nearest(target: f64, overall: &PitchBounds) -> Self {
        let bottom = (target - overall.min as f64).abs();
        let top = (target - overall.max as f64).abs();
        let center = (target - overall.center()).abs();
        if bottom <= center && bottom <= top {
            Self::Bottom
        } else if top <= center {
            Self::Top
        } else {
            Self::Center
        }
    }

    fn of(self, bounds: &PitchBounds) -> f64 {
        match self {
            Self::Bottom => bounds.min as f64,
            Self::Center => bounds.center(),
            Self::Top => bounds.max as f64,
        }
    }
}

/// Shift that keeps `bounds` inside `overall`
fn clamp_shift(shift: i32, bounds: &PitchBounds, overall: &PitchBounds) -> i32 {
    if bounds.max + shift > overall.max {
        overall.max - bounds.max
    } else if bounds.min + shift < overall.min {
        overall.min - bounds.min
    } else {
        shift
    }
}

fn spread_vertical(pattern: &mut Pattern, x1: i32, x2: i32, pitch_limit: i32) -> bool {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);
    if range.len() < 2 {
        return false;
    }

    let bounds: Vec<PitchBounds> = pattern.notes[range.clone()]
        .iter()
        .filter_map(|n| vertical_bounds(std::slice::from_ref(n), n.start, n.end))
        .collect();
    let Some(overall) = vertical_bounds(&pattern.notes[range.clone()], x1, x2) else {
        return false;
    };
    if overall.span() == 0 {
        return false;
    }

    let trend: f64 = bounds.windows(2).map(|w| w[1].center() - w[0].center()).sum();
    let ascending = trend >= 0.0;
    let step = overall.span() as f64 / (bounds.len() - 1) as f64;

    let mut shifts: Vec<i32> = bounds
        .iter()
        .enumerate()
        .map(|(k, b)| {
            let target = if ascending {
                overall.min as f64 + step * k as f64
            } else {
                overall.max as f64 - step * k as f64
            };
            let anchor = Anchor::nearest(target, &overall);
            let shift = (target - anchor.of(b)).round() as i32;
            clamp_shift(shift, b, &overall)
        })
        .collect();

    // Measure where the clamped notes landed and pull the group back by the
    // average overshoot. Repeated runs can still drift.
    let new_min = bounds.iter().zip(&shifts).map(|(b, s)| b.min + s).min().unwrap_or(overall.min);
    let new_max = bounds.iter().zip(&shifts).map(|(b, s)| b.max + s).max().unwrap_or(overall.max);
    let drift = (((overall.min - new_min) + (overall.max - new_max)) as f64 / 2.0).round() as i32;
    if drift != 0 {
        for (shift, b) in shifts.iter_mut().zip(&bounds) {
            *shift = clamp_shift(*shift + drift, b, &overall);
        }
    }

    let mut changed = false;
    for (note, shift) in pattern.notes[range].iter_mut().zip(shifts) {
        if shift == 0 {
            continue;
        }
        for pitch in &mut note.pitches {
            *pitch = (*pitch + shift).clamp(0, pitch_limit);
        }
        note.dedup_pitches();
        note.clamp_intervals(pitch_limit);
        changed = true;
    }
    changed
}
