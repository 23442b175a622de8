//! Even cuts across a range

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::note::Note;
use crate::pattern::Pattern;

/// A cut that landed inside a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cut {
    pub part: i32,
    pub left: Note,
    pub right: Note,
}

/// Cut notes at `num_cuts` evenly spaced interior positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAcross {
    pub num_cuts: i32,
    #[serde(skip)]
    cuts: Vec<Cut>,
    #[serde(skip)]
    fragments: Vec<Note>,
}

impl Default for SplitAcross {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SplitAcross {
    pub fn new(num_cuts: i32) -> Self {
        Self {
            num_cuts,
            cuts: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Cuts made by the last run, left to right
    pub fn cuts(&self) -> impl Iterator<Item = &Cut> + '_ {
        self.cuts.iter()
    }

    /// Every note touched by a cut, each once
    pub fn fragments(&self) -> impl Iterator<Item = &Note> + '_ {
        self.fragments.iter()
    }
}

impl super::NoteTransform for SplitAcross {
    fn name(&self) -> &'static str {
        "Split Across"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        let (cuts, fragments) = split_across(pass.pattern, pass.range.x1, pass.range.x2, self.num_cuts);
        self.cuts = cuts;
        self.fragments = fragments;
        !self.cuts.is_empty()
    }
}

/// Interior cut positions, never on the range edges
pub(crate) fn cut_positions(x1: i32, x2: i32, num_cuts: i32) -> Vec<i32> {
    let width = x2 - x1;
    if width < 2 {
        return Vec::new();
    }
    let count = num_cuts.clamp(1, width - 1);
    if count == 1 {
        return vec![x1 + width / 2];
    }
    let mut cuts: Vec<i32> = (1..=count)
        .map(|k| x1 + (width as f64 * k as f64 / (count + 1) as f64).round() as i32)
        .collect();
    cuts.dedup();
    cuts
}

fn split_across(pattern: &mut Pattern, x1: i32, x2: i32, num_cuts: i32) -> (Vec<Cut>, Vec<Note>) {
    let made: Vec<i32> = cut_positions(x1, x2, num_cuts)
        .into_iter()
        .filter(|&part| pattern.split_at(part).is_some())
        .collect();

    let mut touched = Vec::with_capacity(made.len() * 2);
    let cuts: Vec<Cut> = made
        .into_iter()
        .map(|part| {
            let right = pattern.notes.partition_point(|n| n.start < part);
            touched.extend([right - 1, right]);
            Cut {
                part,
                left: pattern.notes[right - 1].clone(),
                right: pattern.notes[right].clone(),
            }
        })
        .collect();

    touched.sort_unstable();
    touched.dedup();
    let fragments: Vec<Note> = touched.into_iter().map(|idx| pattern.notes[idx].clone()).collect();
    (cuts, fragments)
}
