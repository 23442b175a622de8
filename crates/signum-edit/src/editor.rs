//! Runs transforms against a pattern as single atomic edits

use serde::{Deserialize, Serialize};

use crate::config::{ChannelKind, Limits};
use crate::pattern::Pattern;
use crate::transforms::NoteTransform;

/// Half-open time interval `[x1, x2)` in parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub x1: i32,
    pub x2: i32,
}

impl TimeRange {
    pub fn new(x1: i32, x2: i32) -> Self {
        Self { x1, x2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// `0 <= x1 < x2 <= parts_per_pattern`
    pub fn is_valid(&self, parts_per_pattern: i32) -> bool {
        0 <= self.x1 && self.x1 < self.x2 && self.x2 <= parts_per_pattern
    }
}

/// Range argument of a transform, resolved once by the editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditRange {
    Explicit { x1: i32, x2: i32 },
    /// Active selection if any, otherwise the whole pattern
    #[default]
    SelectionOrFull,
}

/// Told once per completed transform that the document changed
pub trait ChangeSink {
    fn document_changed(&mut self);
}

impl ChangeSink for () {
    fn document_changed(&mut self) {}
}

/// Counts notifications
impl ChangeSink for usize {
    fn document_changed(&mut self) {
        *self += 1;
    }
}

/// One completed transform, as undo history sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub name: &'static str,
    pub range: TimeRange,
    pub before: Pattern,
    pub after: Pattern,
}

impl Transaction {
    pub fn undo(&self, pattern: &mut Pattern) {
        *pattern = self.before.clone();
    }

    pub fn redo(&self, pattern: &mut Pattern) {
        *pattern = self.after.clone();
    }
}

/// Everything a transform may touch while it runs
pub struct EditPass<'a> {
    /// Working copy; only swapped in if the transform succeeds
    pub pattern: &'a mut Pattern,
    pub range: TimeRange,
    pub limits: &'a Limits,
    /// Highest pitch allowed on this channel
    pub pitch_limit: i32,
    pub rng: &'a mut fastrand::Rng,
}

/// Applies transforms for one channel of a song
pub struct Editor<S: ChangeSink = ()> {
    limits: Limits,
    channel: ChannelKind,
    selection: Option<TimeRange>,
    rng: fastrand::Rng,
    sink: S,
}

impl Editor<()> {
    pub fn new(limits: Limits) -> Self {
        Self::with_sink(limits, ())
    }
}

impl<S: ChangeSink> Editor<S> {
    pub fn with_sink(limits: Limits, sink: S) -> Self {
        Self {
            limits,
            channel: ChannelKind::Pitched,
            selection: None,
            rng: fastrand::Rng::new(),
            sink,
        }
    }

    pub fn with_channel(mut self, channel: ChannelKind) -> Self {
        self.channel = channel;
        self
    }

    /// Reproducible coin flips
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn pitch_limit(&self) -> i32 {
        self.limits.pitch_ceiling(self.channel)
    }

    pub fn selection(&self) -> Option<TimeRange> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<TimeRange>) {
        self.selection = selection;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Resolve a range argument, `None` if it violates `0 <= x1 < x2 <= width`
    pub fn resolve(&self, range: EditRange) -> Option<TimeRange> {
        let resolved = match range {
            EditRange::Explicit { x1, x2 } => TimeRange::new(x1, x2),
            EditRange::SelectionOrFull => self
                .selection
                .unwrap_or(TimeRange::new(0, self.limits.parts_per_pattern)),
        };
        resolved.is_valid(self.limits.parts_per_pattern).then_some(resolved)
    }

    /// Run a transform as one atomic edit
    ///
    /// The transform works on a copy of the pattern. The copy replaces the
    /// original only if the transform reports a change and the notes really
    /// differ; otherwise the pattern is untouched and `None` is returned.
    pub fn apply<T>(&mut self, pattern: &mut Pattern, transform: &mut T, range: EditRange) -> Option<Transaction>
    where
        T: NoteTransform + ?Sized,
    {
        let name = transform.name();
        let Some(range) = self.resolve(range) else {
            tracing::trace!("{}: rejected range {:?}", name, range);
            return None;
        };

        let pitch_limit = self.pitch_limit();
        let mut working = pattern.clone();
        let changed = transform.apply(&mut EditPass {
            pattern: &mut working,
            range,
            limits: &self.limits,
            pitch_limit,
            rng: &mut self.rng,
        });

        if !changed || working == *pattern {
            tracing::trace!("{}: nothing changed in {}..{}", name, range.x1, range.x2);
            return None;
        }
        debug_assert!(working.is_well_formed(pitch_limit), "{name} left the pattern malformed");

        tracing::debug!(
            "{}: applied to {}..{} ({} -> {} notes)",
            name,
            range.x1,
            range.x2,
            pattern.len(),
            working.len()
        );
        let before = std::mem::replace(pattern, working);
        self.sink.document_changed();
        Some(Transaction {
            name,
            range,
            before,
            after: pattern.clone(),
        })
    }
}
