//! signum-edit: Note transforms for pattern editing

mod config;
pub mod editor;
mod error;
pub mod formula;
mod note;
pub mod pattern;
pub mod transforms;

pub use config::{ChannelKind, Limits};
pub use editor::{ChangeSink, EditPass, EditRange, Editor, TimeRange, Transaction};
pub use error::{EditError, Result};
pub use formula::{Formula, FormulaError, Vars};
pub use note::{Note, NotePin, prune_redundant_pins};
pub use pattern::{Intersects, Pattern, PitchBounds, vertical_bounds};
pub use transforms::{NoteTransform, Transform};
pub use transforms::{BridgeAcross, MergeAcross, MergeAdjacent, MirrorHorizontal, SplitAcross, StackLeft, TapNotes};
pub use transforms::{Cut, StepAcross, StepArray, StepBasis, StepData, StepKind, StepValue};
pub use transforms::{SpreadHorizontal, SpreadVertical, StretchHorizontal, StretchVertical, StretchVerticalRelative};
