//! Pinned notes: piecewise-linear pitch and volume curves

use serde::{Deserialize, Serialize};

/// A control point on a note's curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePin {
    /// Pitch offset from the note's pitches
    pub interval: i32,
    /// Offset from the note start in parts
    pub time: i32,
    /// Volume (0 to note_size_max)
    pub size: i32,
}

impl NotePin {
    pub fn new(interval: i32, time: i32, size: i32) -> Self {
        Self { interval, time, size }
    }

    /// Linear interpolation between two pins at `time`
    pub fn lerp(a: &NotePin, b: &NotePin, time: i32) -> NotePin {
        if b.time == a.time {
            return NotePin::new(a.interval, time, a.size);
        }
        let t = (time - a.time) as f64 / (b.time - a.time) as f64;
        NotePin {
            interval: (a.interval as f64 + (b.interval - a.interval) as f64 * t).round() as i32,
            time,
            size: (a.size as f64 + (b.size - a.size) as f64 * t).round() as i32,
        }
    }
}

/// A note spanning `[start, end)` in parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique pitches sounding together
    pub pitches: Vec<i32>,
    pub start: i32,
    pub end: i32,
    /// At least two pins; first at time 0, last at `end - start`
    pub pins: Vec<NotePin>,
    /// Ties into a note ending at the same pitch in the previous pattern
    #[serde(default)]
    pub continues_last_pattern: bool,
}

impl Note {
    /// Flat note with a single pitch
    pub fn new(pitch: i32, start: i32, end: i32, size: i32) -> Self {
        Self {
            pitches: vec![pitch],
            start,
            end,
            pins: vec![NotePin::new(0, 0, size), NotePin::new(0, end - start, size)],
            continues_last_pattern: false,
        }
    }

    /// Note whose end follows from its last pin
    pub fn with_pins(pitches: Vec<i32>, start: i32, pins: Vec<NotePin>) -> Self {
        let end = start + pins.last().map_or(0, |p| p.time);
        Self {
            pitches,
            start,
            end,
            pins,
            continues_last_pattern: false,
        }
    }

    pub fn length(&self) -> i32 {
        self.end - self.start
    }

    pub fn first_pin(&self) -> &NotePin {
        &self.pins[0]
    }

    pub fn last_pin(&self) -> &NotePin {
        &self.pins[self.pins.len() - 1]
    }

    /// Lowest and highest pin interval
    pub fn interval_span(&self) -> (i32, i32) {
        self.pins.iter().fold((i32::MAX, i32::MIN), |(lo, hi), p| {
            (lo.min(p.interval), hi.max(p.interval))
        })
    }

    pub fn lowest_pitch(&self) -> i32 {
        self.pitches.iter().copied().min().unwrap_or(0)
    }

    pub fn highest_pitch(&self) -> i32 {
        self.pitches.iter().copied().max().unwrap_or(0)
    }

    /// Pitches sounding at the start of the note
    pub fn starting_pitches(&self) -> Vec<i32> {
        let offset = self.first_pin().interval;
        self.pitches.iter().map(|p| p + offset).collect()
    }

    /// Pitches sounding at the end of the note
    pub fn ending_pitches(&self) -> Vec<i32> {
        let offset = self.last_pin().interval;
        self.pitches.iter().map(|p| p + offset).collect()
    }

    /// Interpolated pin at an offset from the note start
    pub fn pin_at(&self, time: i32) -> NotePin {
        let time = time.clamp(0, self.last_pin().time);
        for pair in self.pins.windows(2) {
            if pair[1].time >= time {
                return NotePin::lerp(&pair[0], &pair[1], time);
            }
        }
        NotePin { time, ..*self.last_pin() }
    }

    /// Shift the note in time, keeping its length
    pub fn translate(&mut self, offset: i32) {
        self.start += offset;
        self.end += offset;
    }

    /// Sort pitches and drop duplicates
    pub fn dedup_pitches(&mut self) {
        self.pitches.sort_unstable();
        self.pitches.dedup();
    }

    /// Keep every pitch plus every pin interval inside `[0, pitch_limit]`
    pub fn clamp_intervals(&mut self, pitch_limit: i32) -> bool {
        let (lowest, highest) = (self.lowest_pitch(), self.highest_pitch());
        let mut changed = false;
        for pin in &mut self.pins {
            let clamped = pin.interval.max(-lowest).min(pitch_limit - highest);
            changed |= clamped != pin.interval;
            pin.interval = clamped;
        }
        changed
    }

    /// Check pin and pitch invariants against a pitch ceiling
    pub fn is_well_formed(&self, pitch_limit: i32) -> bool {
        if self.end <= self.start || self.pins.len() < 2 || self.pitches.is_empty() {
            return false;
        }
        if self.first_pin().time != 0 || self.last_pin().time != self.length() {
            return false;
        }
        if self.pins.windows(2).any(|w| w[1].time <= w[0].time) {
            return false;
        }
        let mut sorted = self.pitches.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.pitches.len() || !sorted.iter().all(|p| (0..=pitch_limit).contains(p)) {
            return false;
        }
        let (lowest, highest) = (self.lowest_pitch(), self.highest_pitch());
        self.pins
            .iter()
            .all(|pin| lowest + pin.interval >= 0 && highest + pin.interval <= pitch_limit)
    }
}

/// Remove pins that their neighbours already predict
///
/// A middle pin goes when it shares its predecessor's time, or when the
/// interval and size slopes on both of its sides are identical.
pub fn prune_redundant_pins(pins: &mut Vec<NotePin>) {
    let mut i = 1;
    while i + 1 < pins.len() {
        let (prev, pin, next) = (pins[i - 1], pins[i], pins[i + 1]);
        let before = pin.time - prev.time;
        let after = next.time - pin.time;
        let collinear = (pin.interval - prev.interval) * after == (next.interval - pin.interval) * before
            && (pin.size - prev.size) * after == (next.size - pin.size) * before;
        if before == 0 || collinear {
            pins.remove(i);
        } else {
            i += 1;
        }
    }
    while pins.len() > 2 && pins[pins.len() - 1].time == pins[pins.len() - 2].time {
        let idx = pins.len() - 2;
        pins.remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_at_interpolates() {
        let note = Note::with_pins(
            vec![60],
            0,
            vec![NotePin::new(0, 0, 0), NotePin::new(4, 8, 2)],
        );
        assert_eq!(note.pin_at(4), NotePin::new(2, 4, 1));
        assert_eq!(note.pin_at(8), NotePin::new(4, 8, 2));
        assert_eq!(note.end, 8);
    }

    #[test]
    fn test_prune_collinear() {
        let mut pins = vec![
            NotePin::new(0, 0, 3),
            NotePin::new(0, 4, 3),
            NotePin::new(0, 8, 3),
            NotePin::new(2, 10, 3),
            NotePin::new(4, 12, 3),
        ];
        prune_redundant_pins(&mut pins);
        assert_eq!(pins, vec![NotePin::new(0, 0, 3), NotePin::new(0, 8, 3), NotePin::new(4, 12, 3)]);
    }

    #[test]
    fn test_prune_keeps_two_pins() {
        let mut pins = vec![NotePin::new(0, 0, 3), NotePin::new(0, 4, 3)];
        prune_redundant_pins(&mut pins);
        assert_eq!(pins.len(), 2);
    }

    #[test]
    fn test_prune_duplicate_time() {
        let mut pins = vec![NotePin::new(0, 0, 3), NotePin::new(1, 0, 2), NotePin::new(5, 4, 1)];
        prune_redundant_pins(&mut pins);
        assert_eq!(pins, vec![NotePin::new(0, 0, 3), NotePin::new(5, 4, 1)]);
    }

    #[test]
    fn test_well_formed() {
        let mut note = Note::new(60, 0, 4, 3);
        assert!(note.is_well_formed(84));
        note.pitches.push(60);
        assert!(!note.is_well_formed(84));
    }

    #[test]
    fn test_well_formed_bounds_sounding_pitch() {
        let mut note = Note::with_pins(vec![60, 80], 0, vec![NotePin::new(0, 0, 3), NotePin::new(4, 4, 3)]);
        assert!(note.is_well_formed(84));
        note.pins[1].interval = 5;
        assert!(!note.is_well_formed(84));
        note.pins[1].interval = -61;
        assert!(!note.is_well_formed(84));
        assert!(note.clamp_intervals(84));
        assert!(note.is_well_formed(84));
    }
}
