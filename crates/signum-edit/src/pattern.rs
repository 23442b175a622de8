//! Pattern note list and the structural primitives transforms are built from

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::note::{Note, NotePin};

/// Absolute pitch range covered by a set of notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchBounds {
    pub min: i32,
    pub max: i32,
}

impl PitchBounds {
    pub fn span(&self) -> i32 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) as f64 / 2.0
    }
}

/// Notes straddling the two edges of a range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intersects {
    /// Note with `start < x1 < end`
    pub left: Option<usize>,
    /// Note with `start < x2 < end`
    pub right: Option<usize>,
}

/// Notes of one channel position, sorted by start and non-overlapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub notes: Vec<Note>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern, sorting notes by start
    pub fn with_notes(mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.start);
        Self { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Indices of notes overlapping `[x1, x2)`
    pub fn overlapping(&self, x1: i32, x2: i32) -> Range<usize> {
        let first = self.notes.partition_point(|n| n.end <= x1);
        let last = self.notes.partition_point(|n| n.start < x2);
        first..last.max(first)
    }

    /// Indices of notes lying entirely inside `[x1, x2)`
    pub fn inside(&self, x1: i32, x2: i32) -> Range<usize> {
        let first = self.notes.partition_point(|n| n.start < x1);
        let last = self.notes.partition_point(|n| n.end <= x2);
        first..last.max(first)
    }

    /// Index of the note strictly straddling `part`
    pub fn note_at(&self, part: i32) -> Option<usize> {
        let idx = self.notes.partition_point(|n| n.end <= part);
        let note = self.notes.get(idx)?;
        (note.start < part && part < note.end).then_some(idx)
    }

    /// Remove notes by index, then insert new ones in start order
    ///
    /// Either side may be empty.
    pub fn apply_batch(&mut self, remove: impl IntoIterator<Item = usize>, insert: Vec<Note>) {
        let mut remove: Vec<usize> = remove.into_iter().collect();
        remove.sort_unstable();
        remove.dedup();
        for idx in remove.into_iter().rev() {
            if idx < self.notes.len() {
                self.notes.remove(idx);
            }
        }
        for note in insert {
            let idx = self.notes.partition_point(|n| n.start <= note.start);
            self.notes.insert(idx, note);
        }
    }

    /// Insert notes without removing any
    pub fn insert_notes(&mut self, notes: Vec<Note>) {
        self.apply_batch(std::iter::empty::<usize>(), notes);
    }

    /// Cut the note spanning `part` into two notes meeting at `part`
    ///
    /// The right half is re-based so its first pin has interval 0: its
    /// pitches take the interpolated interval at the cut. Returns the
    /// indices of the left and right halves, or `None` if nothing spans
    /// `part`.
    pub fn split_at(&mut self, part: i32) -> Option<(usize, usize)> {
        let idx = self.note_at(part)?;
        let note = &self.notes[idx];
        let rel = part - note.start;
        let cut = note.pin_at(rel);

        let mut left_pins: Vec<NotePin> = note.pins.iter().copied().filter(|p| p.time < rel).collect();
        left_pins.push(cut);

        let mut right_pins = vec![NotePin::new(0, 0, cut.size)];
        right_pins.extend(
            note.pins
                .iter()
                .filter(|p| p.time > rel)
                .map(|p| NotePin::new(p.interval - cut.interval, p.time - rel, p.size)),
        );

        let right = Note {
            pitches: note.pitches.iter().map(|p| p + cut.interval).collect(),
            start: part,
            end: note.end,
            pins: right_pins,
            continues_last_pattern: false,
        };

        let left = &mut self.notes[idx];
        left.end = part;
        left.pins = left_pins;
        self.notes.insert(idx + 1, right);
        Some((idx, idx + 1))
    }

    /// Find the notes straddling `x1` and `x2`, optionally cutting them
    ///
    /// When `split` is set both cuts are made and `right` is adjusted for the
    /// note inserted by the first cut, so it names the left half of the cut
    /// at `x2`.
    pub fn intersects(&mut self, x1: i32, x2: i32, split: bool) -> Intersects {
        let left = self.note_at(x1);
        let mut right = self.note_at(x2);
        if !split {
            return Intersects { left, right };
        }
        if let Some(l) = left {
            self.split_at(x1);
            if let Some(r) = right.as_mut() {
                if *r >= l {
                    *r += 1;
                }
            }
        }
        if right.is_some() {
            self.split_at(x2);
        }
        Intersects { left, right }
    }

    /// Cut notes crossing either edge of `[x1, x2)`
    pub fn split_at_edges(&mut self, x1: i32, x2: i32) -> Intersects {
        self.intersects(x1, x2, true)
    }

    /// Sorted, non-overlapping, and every note valid
    pub fn is_well_formed(&self, pitch_limit: i32) -> bool {
        self.notes.windows(2).all(|w| w[0].end <= w[1].start)
            && self.notes.iter().all(|n| n.is_well_formed(pitch_limit))
    }
}

/// Absolute pitch bounds of the notes overlapping `[x1, x2)`
pub fn vertical_bounds(notes: &[Note], x1: i32, x2: i32) -> Option<PitchBounds> {
    notes
        .iter()
        .filter(|n| n.end > x1 && n.start < x2)
        .flat_map(|n| {
            let (lo, hi) = n.interval_span();
            n.pitches.iter().map(move |p| (p + lo, p + hi))
        })
        .fold(None, |acc, (lo, hi)| match acc {
            None => Some(PitchBounds { min: lo, max: hi }),
            Some(b) => Some(PitchBounds {
                min: b.min.min(lo),
                max: b.max.max(hi),
            }),
        })
}
