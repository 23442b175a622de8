//! Note transforms over a time range of a pattern

mod bridge;
mod merge;
mod mirror;
mod split;
mod spread;
mod stack;
mod step;
mod stretch;
mod tap;

pub use bridge::BridgeAcross;
pub use merge::{MergeAcross, MergeAdjacent};
pub use mirror::MirrorHorizontal;
pub use split::{Cut, SplitAcross};
pub use spread::{SpreadHorizontal, SpreadVertical};
pub use stack::StackLeft;
pub use step::{StepAcross, StepArray, StepBasis, StepData, StepKind, StepValue};
pub use stretch::{StretchHorizontal, StretchVertical, StretchVerticalRelative};
pub use tap::TapNotes;

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;

/// Trait for note transforms
///
/// `apply` mutates the pass's working pattern and returns whether it did
/// anything. A transform that finds its preconditions unmet returns `false`
/// and the editor throws the working copy away.
pub trait NoteTransform {
    fn name(&self) -> &'static str;
    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool;
}

/// Enum wrapper for all transforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    MergeAdjacent(MergeAdjacent),
    MergeAcross(MergeAcross),
    BridgeAcross(BridgeAcross),
    SplitAcross(SplitAcross),
    StackLeft(StackLeft),
    StepAcross(StepAcross),
    SpreadHorizontal(SpreadHorizontal),
    SpreadVertical(SpreadVertical),
    TapNotes(TapNotes),
    MirrorHorizontal(MirrorHorizontal),
    StretchHorizontal(StretchHorizontal),
    StretchVertical(StretchVertical),
    StretchVerticalRelative(StretchVerticalRelative),
}

impl NoteTransform for Transform {
    fn name(&self) -> &'static str {
        match self {
            Self::MergeAdjacent(t) => t.name(),
            Self::MergeAcross(t) => t.name(),
            Self::BridgeAcross(t) => t.name(),
            Self::SplitAcross(t) => t.name(),
            Self::StackLeft(t) => t.name(),
            Self::StepAcross(t) => t.name(),
            Self::SpreadHorizontal(t) => t.name(),
            Self::SpreadVertical(t) => t.name(),
            Self::TapNotes(t) => t.name(),
            Self::MirrorHorizontal(t) => t.name(),
            Self::StretchHorizontal(t) => t.name(),
            Self::StretchVertical(t) => t.name(),
            Self::StretchVerticalRelative(t) => t.name(),
        }
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        match self {
            Self::MergeAdjacent(t) => t.apply(pass),
            Self::MergeAcross(t) => t.apply(pass),
            Self::BridgeAcross(t) => t.apply(pass),
            Self::SplitAcross(t) => t.apply(pass),
            Self::StackLeft(t) => t.apply(pass),
            Self::StepAcross(t) => t.apply(pass),
            Self::SpreadHorizontal(t) => t.apply(pass),
            Self::SpreadVertical(t) => t.apply(pass),
            Self::TapNotes(t) => t.apply(pass),
            Self::MirrorHorizontal(t) => t.apply(pass),
            Self::StretchHorizontal(t) => t.apply(pass),
            Self::StretchVertical(t) => t.apply(pass),
            Self::StretchVerticalRelative(t) => t.apply(pass),
        }
    }
}
