//! Close the gaps between notes by pushing them left

use serde::{Deserialize, Serialize};

use crate::editor::EditPass;
use crate::pattern::Pattern;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackLeft;

impl super::NoteTransform for StackLeft {
    fn name(&self) -> &'static str {
        "Stack Left"
    }

    fn apply(&mut self, pass: &mut EditPass<'_>) -> bool {
        stack_left(pass.pattern, pass.range.x1, pass.range.x2)
    }
}

/// Place each note flush against its predecessor, the first against `x1`
pub(crate) fn stack_left(pattern: &mut Pattern, x1: i32, x2: i32) -> bool {
    pattern.split_at_edges(x1, x2);
    let range = pattern.inside(x1, x2);

    let mut cursor = x1;
    let mut moved = false;
    for note in &mut pattern.notes[range] {
        let length = note.last_pin().time;
        moved |= note.start != cursor;
        note.start = cursor;
        note.end = cursor + length;
        cursor = note.end;
    }
    moved
}
