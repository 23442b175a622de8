//! Stretch notes onto a new time range or pitch range

use serde::{Deserialize, Serialize};

use crate::editor::{EditPass, TimeRange};
use crate::note::{Note, NotePin};
use crate::pattern::{Pattern, PitchBounds, vertical_bounds};

use super::mirror::mirror_horizontal;

/// Map the notes of the range onto `[x1b, x2b)`
///
/// A destination given backwards (`x2b < x1b`) is swapped, and each
/// stretched note is then mirrored in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StretchHorizontal {
    pub x1b: i32,
    pub x2b: i32,
}

impl StretchHorizontal {
    pub fn new(x1b: i32, x2b: i32) -> Self {
        Self { x1b, x2b }
    }
}

impl super::NoteTransform for StretchHorizontal {
    fn name(&self) -> &'static str {
        "Stretch Horizontal"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        stretch_horizontal(
            pass.pattern,
            pass.range,
            self.x1b,
            self.x2b,
            pass.limits.parts_per_pattern,
        )
    }
}

fn stretch_horizontal(pattern: &mut Pattern, source: TimeRange, x1b: i32, x2b: i32, parts_per_pattern: i32) -> bool {
    let TimeRange { x1, x2 } = source;
    if x1 == x1b && x2 == x2b {
        return false;
    }
    let (x1b, x2b, flip) = if x2b < x1b { (x2b, x1b, true) } else { (x1b, x2b, false) };
    let target = TimeRange::new(x1b, x2b);
    if !target.is_valid(parts_per_pattern) {
        return false;
    }

    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);
    if range.is_empty() {
        return false;
    }

    let min_width: usize = pattern.notes[range.clone()].iter().map(|n| n.pins.len() - 1).sum();
    if min_width as i32 > target.width() {
        return false;
    }

    let scale = target.width() as f64 / source.width() as f64;
    let mut prev_end = x1b;
    let mut stretched = Vec::with_capacity(range.len());
    for note in &pattern.notes[range] {
        let mut pins: Vec<NotePin> = Vec::with_capacity(note.pins.len());
        for pin in &note.pins {
            let mut time = (pin.time as f64 * scale).round() as i32;
            if let Some(prev) = pins.last() {
                time = time.max(prev.time + 1);
            }
            pins.push(NotePin::new(pin.interval, time, pin.size));
        }

        let start = (x1b + ((note.start - x1) as f64 * scale).round() as i32).max(prev_end);
        let mut moved = Note::with_pins(note.pitches.clone(), start, pins);
        moved.continues_last_pattern = note.continues_last_pattern && start == 0;
        prev_end = moved.end;
        stretched.push(moved);
    }
    if prev_end > x2b {
        return false;
    }

    pattern.split_at_edges(x1b, x2b);
    let removed: Vec<usize> = pattern.inside(x1, x2).chain(pattern.inside(x1b, x2b)).collect();
    pattern.apply_batch(removed, stretched);
    if flip {
        mirror_horizontal(pattern, x1b, x2b, true);
    }
    true
}

/// Map the pitch range `original` onto `[y_min, y_max]`
///
/// Without `original` the bounds of the notes in range are used. A
/// destination with `y_max < y_min` turns the notes upside down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StretchVertical {
    #[serde(default)]
    pub original: Option<PitchBounds>,
    pub y_min: i32,
    pub y_max: i32,
}

impl StretchVertical {
    pub fn new(y_min: i32, y_max: i32) -> Self {
        Self {
            original: None,
            y_min,
            y_max,
        }
    }

    pub fn from_bounds(original: PitchBounds, y_min: i32, y_max: i32) -> Self {
        Self {
            original: Some(original),
            y_min,
            y_max,
        }
    }
}

impl super::NoteTransform for StretchVertical {
    fn name(&self) -> &'static str {
        "Stretch Vertical"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        let TimeRange { x1, x2 } = pass.range;
        pass.pattern.split_at_edges(x1, x2);
        let range = pass.pattern.inside(x1, x2);
        let notes = &mut pass.pattern.notes[range];
        let original = match self.original {
            Some(bounds) => bounds,
            None => match vertical_bounds(notes, x1, x2) {
                Some(bounds) => bounds,
                None => return false,
            },
        };
        stretch_notes(notes, original, self.y_min as f64, self.y_max as f64, pass.pitch_limit)
    }
}

/// Scale pitches around their own center and shift them
///
/// A negative `multiply` mirrors the notes about that center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StretchVerticalRelative {
    #[serde(default = "one")]
    pub multiply: f64,
    #[serde(default)]
    pub shift: i32,
    #[serde(default)]
    pub per_note: bool,
}

fn one() -> f64 {
    1.0
}

impl Default for StretchVerticalRelative {
    fn default() -> Self {
        Self {
            multiply: 1.0,
            shift: 0,
            per_note: false,
        }
    }
}

impl StretchVerticalRelative {
    pub fn new(multiply: f64, shift: i32, per_note: bool) -> Self {
        Self { multiply, shift, per_note }
    }

    fn target(&self, bounds: &PitchBounds) -> (f64, f64) {
        let half = bounds.span() as f64 / 2.0 * self.multiply;
        let center = bounds.center() + self.shift as f64;
        (center - half, center + half)
    }
}

impl super::NoteTransform for StretchVerticalRelative {
    fn name(&self) -> &'static str {
        "Stretch Vertical Relative"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        let TimeRange { x1, x2 } = pass.range;
        pass.pattern.split_at_edges(x1, x2);
        let range = pass.pattern.inside(x1, x2);
        let notes = &mut pass.pattern.notes[range];

        if !self.per_note {
            let Some(bounds) = vertical_bounds(notes, x1, x2) else {
                return false;
            };
            let (y_min, y_max) = self.target(&bounds);
            return stretch_notes(notes, bounds, y_min, y_max, pass.pitch_limit);
        }

        let mut changed = false;
        for note in notes.iter_mut() {
            let notes = std::slice::from_mut(note);
            let Some(bounds) = vertical_bounds(notes, x1, x2) else {
                continue;
            };
            let (y_min, y_max) = self.target(&bounds);
            changed |= stretch_notes(notes, bounds, y_min, y_max, pass.pitch_limit);
        }
        changed
    }
}

/// Linearly map pitches from `original` onto `[y_min, y_max]`, scaling pin
/// intervals by the same ratio
///
/// An original span of zero only transposes.
fn stretch_notes(notes: &mut [Note], original: PitchBounds, y_min: f64, y_max: f64, pitch_limit: i32) -> bool {
    let (old_span, new_span) = if original.span() == 0 {
        (1.0, 1.0)
    } else {
        (original.span() as f64, y_max - y_min)
    };
    let ratio = new_span / old_span;

    let mut changed = false;
    for note in notes.iter_mut() {
        let before = note.clone();
        for pin in &mut note.pins {
            pin.interval = (pin.interval as f64 * ratio).round() as i32;
        }
        for pitch in &mut note.pitches {
            let mapped = y_min + (*pitch - original.min) as f64 / old_span * new_span;
            *pitch = (mapped.round() as i32).clamp(0, pitch_limit);
        }
        note.dedup_pitches();
        note.clamp_intervals(pitch_limit);
        changed |= *note != before;
    }
    changed
}
