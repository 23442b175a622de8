//! Data-driven volume and pitch reshaping
//!
//! A step array is a list of numbers or formulas sampled at a ratio in
//! `[0, 1]`. Each pin (for volume) or pitch (for pitch) picks its ratio from
//! the array's basis, samples a multiplier and an addend, and applies them.

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::error::Result;
use crate::formula::{Formula, Vars};
use crate::note::{Note, NotePin, prune_redundant_pins};
use crate::pattern::Pattern;

use super::merge::merge_across;

/// How an array is read between its entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Linear interpolation between neighbouring entries
    #[default]
    Normal,
    /// Nearest entry below, no interpolation
    Step,
    /// Entries in turn, wrapping around
    Cycle,
}

/// What the sampling ratio measures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepBasis {
    /// Position among the notes in range
    #[default]
    Note,
    /// Position among a note's pins (volume) or pitches (pitch)
    Pin,
    /// Elapsed time across the affected notes
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Number(f64),
    Formula(String),
}

impl From<f64> for StepValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for StepValue {
    fn from(source: &str) -> Self {
        Self::Formula(source.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepArray {
    pub values: Vec<StepValue>,
    #[serde(rename = "type", default)]
    pub kind: StepKind,
    #[serde(default)]
    pub per: StepBasis,
}

impl StepArray {
    pub fn new(values: impl IntoIterator<Item = impl Into<StepValue>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            kind: StepKind::Normal,
            per: StepBasis::Note,
        }
    }

    pub fn kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn per(mut self, per: StepBasis) -> Self {
        self.per = per;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepData {
    pub vol_add: Option<StepArray>,
    pub vol_mult: Option<StepArray>,
    pub pitch_add: Option<StepArray>,
    pub pitch_mult: Option<StepArray>,
    /// Insert an interpolated pin at every multiple of this many parts
    pub insert_pins_every: i32,
}

impl StepData {
    pub fn is_empty(&self) -> bool {
        self.vol_add.is_none()
            && self.vol_mult.is_none()
            && self.pitch_add.is_none()
            && self.pitch_mult.is_none()
            && self.insert_pins_every <= 0
    }

    /// Compile every formula, reporting the first one that fails
    ///
    /// Applying the data never fails; a bad formula just samples as 0.
    pub fn validate(&self) -> Result<()> {
        let arrays = [&self.vol_add, &self.vol_mult, &self.pitch_add, &self.pitch_mult];
        for array in arrays.into_iter().flatten() {
            for value in &array.values {
                if let StepValue::Formula(source) = value {
                    Formula::parse(source)?;
                }
            }
        }
        Ok(())
    }

    fn touches_volume(&self) -> bool {
        self.vol_add.is_some() || self.vol_mult.is_some()
    }

    fn touches_pitch(&self) -> bool {
        self.pitch_add.is_some() || self.pitch_mult.is_some()
    }
}

/// Apply step arrays to every note in the range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepAcross {
    pub data: StepData,
}

impl StepAcross {
    pub fn new(data: StepData) -> Self {
        Self { data }
    }
}

impl super::NoteTransform for StepAcross {
    fn name(&self) -> &'static str {
        "Step Across"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        if self.data.is_empty() {
            return false;
        }
        step_across(
            pass.pattern,
            pass.range.x1,
            pass.range.x2,
            &self.data,
            pass.limits.note_size_max,
            pass.pitch_limit,
        )
    }
}

/// Position of one value within its basis dimensions
#[derive(Debug, Clone, Copy)]
struct Position {
    note: usize,
    notes: usize,
    /// Pin or pitch index within the note
    item: usize,
    items: usize,
    /// Parts since the start of the affected span
    elapsed: i32,
    span: i32,
}

impl Position {
    /// Ratio in `[0, 1]`, cycle index and basis length
    fn basis(&self, per: StepBasis) -> (f64, usize, usize) {
        fn ratio(k: usize, n: usize) -> f64 {
            if n > 1 { k as f64 / (n - 1) as f64 } else { 0.0 }
        }
        match per {
            StepBasis::Note => (ratio(self.note, self.notes), self.note, self.notes),
            StepBasis::Pin => (ratio(self.item, self.items), self.item, self.items),
            StepBasis::Time => {
                let r = if self.span > 0 { self.elapsed as f64 / self.span as f64 } else { 0.0 };
                (r.clamp(0.0, 1.0), self.elapsed.max(0) as usize, self.span.max(0) as usize)
            }
        }
    }
}

enum Entry {
    Number(f64),
    Formula(Option<Formula>),
}

impl Entry {
    fn eval(&self, vars: Vars) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Formula(Some(f)) => f.eval(vars),
            Self::Formula(None) => 0.0,
        }
    }
}

/// A step array with its formulas compiled
struct Sampler {
    entries: Vec<Entry>,
    kind: StepKind,
    per: StepBasis,
}

impl Sampler {
    fn compile(array: &StepArray) -> Self {
        let entries = array
            .values
            .iter()
            .map(|value| match value {
                StepValue::Number(n) => Entry::Number(*n),
                StepValue::Formula(source) => match Formula::parse(source) {
                    Ok(formula) => Entry::Formula(Some(formula)),
                    Err(e) => {
                        tracing::warn!("step formula {:?} evaluates to 0: {}", source, e);
                        Entry::Formula(None)
                    }
                },
            })
            .collect();
        Self {
            entries,
            kind: array.kind,
            per: array.per,
        }
    }

    /// Sample at `pos`; `None` for an empty array
    fn sample(&self, pos: &Position, x: f64) -> Option<f64> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }
        let (ratio, cycle, len) = pos.basis(self.per);
        let vars = Vars::new(x, cycle as f64, len as f64);
        let value = match self.kind {
            StepKind::Cycle => self.entries[cycle % n].eval(vars),
            StepKind::Step => self.entries[((ratio * (n - 1) as f64).floor() as usize).min(n - 1)].eval(vars),
            StepKind::Normal => {
                let at = ratio * (n - 1) as f64;
                let lo = (at.floor() as usize).min(n - 1);
                let hi = (lo + 1).min(n - 1);
                let a = self.entries[lo].eval(vars);
                let b = self.entries[hi].eval(vars);
                a + (b - a) * (at - lo as f64)
            }
        };
        Some(value)
    }
}

struct Samplers {
    vol_add: Option<Sampler>,
    vol_mult: Option<Sampler>,
    pitch_add: Option<Sampler>,
    pitch_mult: Option<Sampler>,
}

impl Samplers {
    fn compile(data: &StepData) -> Self {
        Self {
            vol_add: data.vol_add.as_ref().map(Sampler::compile),
            vol_mult: data.vol_mult.as_ref().map(Sampler::compile),
            pitch_add: data.pitch_add.as_ref().map(Sampler::compile),
            pitch_mult: data.pitch_mult.as_ref().map(Sampler::compile),
        }
    }
}

fn sample(sampler: &Option<Sampler>, pos: &Position, x: f64) -> Option<f64> {
    sampler.as_ref().and_then(|s| s.sample(pos, x))
}

/// Insert an interpolated pin at every multiple of `every` between existing pins
fn insert_pins(note: &mut Note, every: i32) {
    let mut pins = Vec::with_capacity(note.pins.len());
    for pair in note.pins.windows(2) {
        pins.push(pair[0]);
        let first = (pair[0].time / every + 1) * every;
        pins.extend(
            (first..pair[1].time)
                .step_by(every as usize)
                .map(|t| NotePin::lerp(&pair[0], &pair[1], t)),
        );
    }
    pins.push(*note.last_pin());
    note.pins = pins;
}

fn step_across(pattern: &mut Pattern, x1: i32, x2: i32, data: &StepData, size_max: i32, pitch_limit: i32) -> bool {
    let hits = pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);
    if range.is_empty() {
        return false;
    }
    let before = pattern.notes.clone();

    let samplers = Samplers::compile(data);
    let span_start = pattern.notes[range.start].start;
    let span = pattern.notes[range.end - 1].end - span_start;
    let notes = range.len();
    let size_max_f = size_max as f64;

    for (k, note) in pattern.notes[range].iter_mut().enumerate() {
        let pins_before = note.pins.clone();
        if data.insert_pins_every > 0 {
            insert_pins(note, data.insert_pins_every);
        }

        if data.touches_volume() {
            let items = note.pins.len();
            let start = note.start;
            for (j, pin) in note.pins.iter_mut().enumerate() {
                let pos = Position {
                    note: k,
                    notes,
                    item: j,
                    items,
                    elapsed: start + pin.time - span_start,
                    span,
                };
                let x = pin.size as f64;
                let mult = sample(&samplers.vol_mult, &pos, x).unwrap_or(1.0);
                let add = sample(&samplers.vol_add, &pos, x).unwrap_or(0.0);
                pin.size = ((x * mult + add * size_max_f).round() as i32).clamp(0, size_max);
            }
        }

        if data.touches_pitch() {
            let items = note.pitches.len();
            let elapsed = note.start - span_start;
            for (j, pitch) in note.pitches.iter_mut().enumerate() {
                let pos = Position {
                    note: k,
                    notes,
                    item: j,
                    items,
                    elapsed,
                    span,
                };
                let x = *pitch as f64;
                let scale = sample(&samplers.pitch_mult, &pos, x).map_or(1.0, |m| m * size_max_f);
                let add = sample(&samplers.pitch_add, &pos, x).unwrap_or(0.0);
                *pitch = ((x * scale + add * size_max_f).round() as i32).clamp(0, pitch_limit);
            }
            note.dedup_pitches();
            note.clamp_intervals(pitch_limit);
        }

        if note.pins != pins_before {
            prune_redundant_pins(&mut note.pins);
        }
    }

    if !data.touches_pitch() {
        if hits.right.is_some() {
            remerge_at(pattern, x2, pitch_limit);
        }
        if hits.left.is_some() {
            remerge_at(pattern, x1, pitch_limit);
        }
    }

    pattern.notes != before
}

/// Merge the two notes meeting at `part` back into one
fn remerge_at(pattern: &mut Pattern, part: i32, pitch_limit: i32) {
    let idx = pattern.notes.partition_point(|n| n.start < part);
    if idx == 0 || idx >= pattern.notes.len() {
        return;
    }
    let (a, b) = (&pattern.notes[idx - 1], &pattern.notes[idx]);
    if a.end == part && b.start == part {
        let (start, end) = (a.start, b.end);
        merge_across(pattern, start, end, pitch_limit);
    }
}
