use signum_edit::{
    BridgeAcross, EditRange, Editor, Limits, MergeAcross, MergeAdjacent, MirrorHorizontal, Note, NotePin,
    NoteTransform, Pattern, PitchBounds, SplitAcross, SpreadHorizontal, SpreadVertical, StackLeft, StepAcross,
    StepData, StretchHorizontal, StretchVertical, StretchVerticalRelative, TapNotes, Transform,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn range(x1: i32, x2: i32) -> EditRange {
    EditRange::Explicit { x1, x2 }
}

fn bend(pitch: i32, start: i32, end: i32, to: i32) -> Note {
    Note::with_pins(
        vec![pitch],
        start,
        vec![NotePin::new(0, 0, 3), NotePin::new(to, (end - start) / 2, 2), NotePin::new(to, end - start, 1)],
    )
}

fn busy_pattern() -> Pattern {
    let mut chord = Note::new(64, 14, 20, 3);
    chord.pitches = vec![64, 67, 71];
    Pattern::with_notes(vec![
        bend(60, 0, 6, 2),
        Note::new(62, 6, 9, 2),
        chord,
        bend(55, 22, 30, -3),
        Note::new(72, 33, 40, 1),
    ])
}

fn every_transform() -> Vec<Transform> {
    vec![
        Transform::MergeAdjacent(MergeAdjacent),
        Transform::MergeAcross(MergeAcross),
        Transform::BridgeAcross(BridgeAcross::new(true, false)),
        Transform::SplitAcross(SplitAcross::new(5)),
        Transform::StackLeft(StackLeft),
        Transform::StepAcross(StepAcross::new(StepData {
            vol_mult: Some(signum_edit::StepArray::new(["1 - i / len"])),
            pitch_add: Some(signum_edit::StepArray::new([0.0, 1.0])),
            insert_pins_every: 3,
            ..Default::default()
        })),
        Transform::SpreadHorizontal(SpreadHorizontal),
        Transform::SpreadVertical(SpreadVertical),
        Transform::TapNotes(TapNotes),
        Transform::MirrorHorizontal(MirrorHorizontal::new(false)),
        Transform::StretchHorizontal(StretchHorizontal::new(3, 44)),
        Transform::StretchVertical(StretchVertical::new(40, 80)),
        Transform::StretchVerticalRelative(StretchVerticalRelative::new(-1.5, 2, true)),
    ]
}

#[test]
fn test_every_transform_keeps_pattern_well_formed() {
    init_tracing();
    let limits = Limits::default();
    for (x1, x2) in [(0, 48), (3, 25), (5, 17), (10, 36)] {
        for mut transform in every_transform() {
            let mut editor = Editor::new(limits.clone()).with_seed(42);
            let mut pattern = busy_pattern();
            editor.apply(&mut pattern, &mut transform, range(x1, x2));
            assert!(
                pattern.is_well_formed(limits.max_pitch),
                "{} over {x1}..{x2} left {:?}",
                transform.name(),
                pattern
            );
        }
    }
}

/// Sorted, non-overlapping notes with chords, bends and gaps
fn random_pattern(rng: &mut fastrand::Rng, limits: &Limits) -> Pattern {
    let mut notes = Vec::new();
    let mut start = rng.i32(0..4);
    loop {
        let length = rng.i32(1..=10);
        if start + length > limits.parts_per_pattern {
            break;
        }

        let mut pitches: Vec<i32> = (0..rng.usize(1..=3)).map(|_| rng.i32(0..=limits.max_pitch)).collect();
        pitches.sort_unstable();
        pitches.dedup();
        let (lowest, highest) = (pitches[0], pitches[pitches.len() - 1]);

        let mut times: Vec<i32> = (0..rng.usize(0..3)).map(|_| rng.i32(1..=length)).collect();
        times.extend([0, length]);
        times.sort_unstable();
        times.dedup();
        let pins = times
            .into_iter()
            .map(|time| {
                let interval = if time == 0 { 0 } else { rng.i32(-7..=7) };
                let interval = interval.max(-lowest).min(limits.max_pitch - highest);
                NotePin::new(interval, time, rng.i32(0..=limits.note_size_max))
            })
            .collect();

        let mut note = Note::with_pins(pitches, start, pins);
        note.continues_last_pattern = start == 0 && rng.bool();
        notes.push(note);
        start += length + if rng.bool() { 0 } else { rng.i32(1..6) };
    }
    Pattern::with_notes(notes)
}

fn random_range(rng: &mut fastrand::Rng, limits: &Limits) -> (i32, i32) {
    let x1 = rng.i32(0..limits.parts_per_pattern);
    (x1, rng.i32(x1 + 1..=limits.parts_per_pattern))
}

fn random_transform(rng: &mut fastrand::Rng, limits: &Limits) -> Transform {
    let ppp = limits.parts_per_pattern;
    match rng.u8(0..13) {
        0 => Transform::MergeAdjacent(MergeAdjacent),
        1 => Transform::MergeAcross(MergeAcross),
        2 => Transform::BridgeAcross(BridgeAcross::new(rng.bool(), rng.bool())),
        3 => Transform::SplitAcross(SplitAcross::new(rng.i32(1..8))),
        4 => Transform::StackLeft(StackLeft),
        5 => {
            let formulas = ["x * 2 - i", "sin(i / len * pi)", "len - i", "-x"];
            Transform::StepAcross(StepAcross::new(StepData {
                vol_add: rng.bool().then(|| signum_edit::StepArray::new([formulas[rng.usize(..formulas.len())]])),
                vol_mult: rng.bool().then(|| signum_edit::StepArray::new([0.0, 2.0]).per(signum_edit::StepBasis::Pin)),
                pitch_add: rng.bool().then(|| signum_edit::StepArray::new([rng.f64() * 8.0 - 4.0])),
                pitch_mult: rng.bool().then(|| signum_edit::StepArray::new([formulas[rng.usize(..formulas.len())]])),
                insert_pins_every: rng.i32(0..4),
            }))
        }
        6 => Transform::SpreadHorizontal(SpreadHorizontal),
        7 => Transform::SpreadVertical(SpreadVertical),
        8 => Transform::TapNotes(TapNotes),
        9 => Transform::MirrorHorizontal(MirrorHorizontal::new(rng.bool())),
        10 => Transform::StretchHorizontal(StretchHorizontal::new(rng.i32(0..=ppp), rng.i32(0..=ppp))),
        11 => Transform::StretchVertical(StretchVertical::new(
            rng.i32(-8..=limits.max_pitch + 8),
            rng.i32(-8..=limits.max_pitch + 8),
        )),
        _ => Transform::StretchVerticalRelative(StretchVerticalRelative::new(
            rng.f64() * 4.0 - 2.0,
            rng.i32(-24..=24),
            rng.bool(),
        )),
    }
}

#[test]
fn test_random_edits_keep_pattern_well_formed() {
    init_tracing();
    let limits = Limits::new(84, 12, 3, 64);
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for round in 0..500 {
        let mut pattern = random_pattern(&mut rng, &limits);
        assert!(pattern.is_well_formed(limits.max_pitch), "generated {pattern:?}");
        let mut editor = Editor::new(limits.clone()).with_seed(round);
        for _ in 0..6 {
            let mut transform = random_transform(&mut rng, &limits);
            let (x1, x2) = random_range(&mut rng, &limits);
            let before = pattern.clone();
            editor.apply(&mut pattern, &mut transform, range(x1, x2));
            assert!(
                pattern.is_well_formed(limits.max_pitch),
                "round {round}: {} over {x1}..{x2} turned {before:?} into {pattern:?}",
                transform.name(),
            );
        }
    }
}

#[test]
fn test_rejected_range_leaves_pattern_alone() {
    let mut editor = Editor::with_sink(Limits::default(), 0usize);
    let mut pattern = busy_pattern();
    for mut transform in every_transform() {
        assert!(editor.apply(&mut pattern, &mut transform, range(8, 8)).is_none());
        assert!(editor.apply(&mut pattern, &mut transform, range(-1, 8)).is_none());
        assert!(editor.apply(&mut pattern, &mut transform, range(0, 500)).is_none());
    }
    assert_eq!(pattern, busy_pattern());
    assert_eq!(*editor.sink(), 0);
}

#[test]
fn test_merge_across_round_trip() {
    let original = bend(60, 0, 12, 5);
    let mut pattern = Pattern::with_notes(vec![original.clone()]);
    pattern.split_at(6);
    let mut editor = Editor::new(Limits::default());
    assert!(editor.apply(&mut pattern, &mut MergeAcross, range(0, 12)).is_some());
    assert_eq!(pattern.notes, vec![original]);
}

#[test]
fn test_merge_adjacent_touching_notes() {
    let mut pattern = Pattern::with_notes(vec![Note::new(60, 0, 4, 3), Note::new(60, 4, 8, 3)]);
    let mut editor = Editor::new(Limits::default());
    assert!(editor.apply(&mut pattern, &mut MergeAdjacent, range(0, 8)).is_some());
    assert_eq!(pattern.notes, vec![Note::new(60, 0, 8, 3)]);
}

#[test]
fn test_stack_left_idempotent() {
    let mut pattern = busy_pattern();
    let mut editor = Editor::new(Limits::default());
    assert!(editor.apply(&mut pattern, &mut StackLeft, range(0, 48)).is_some());
    let stacked = pattern.clone();
    assert!(editor.apply(&mut pattern, &mut StackLeft, range(0, 48)).is_none());
    assert_eq!(pattern, stacked);
}

#[test]
fn test_stretch_identity_is_noop() {
    let mut pattern = busy_pattern();
    let mut editor = Editor::new(Limits::default());
    let mut stretch = StretchHorizontal::new(0, 48);
    assert!(editor.apply(&mut pattern, &mut stretch, range(0, 48)).is_none());
    assert_eq!(pattern, busy_pattern());
}

#[test]
fn test_mirror_twice_restores() {
    let mut pattern = busy_pattern();
    let mut editor = Editor::new(Limits::default());
    let mut mirror = MirrorHorizontal::new(false);
    assert!(editor.apply(&mut pattern, &mut mirror, range(0, 48)).is_some());
    assert_ne!(pattern, busy_pattern());
    assert!(editor.apply(&mut pattern, &mut mirror, range(0, 48)).is_some());
    assert_eq!(pattern, busy_pattern());
}

#[test]
fn test_step_empty_is_noop() {
    let mut pattern = busy_pattern();
    let mut editor = Editor::with_sink(Limits::default(), 0usize);
    let mut step = StepAcross::default();
    assert!(editor.apply(&mut pattern, &mut step, range(3, 25)).is_none());
    assert_eq!(pattern, busy_pattern());
    assert_eq!(*editor.sink(), 0);
}

#[test]
fn test_split_into_four() {
    let mut pattern = Pattern::with_notes(vec![Note::new(60, 0, 12, 3)]);
    let mut editor = Editor::new(Limits::default());
    let mut split = SplitAcross::new(3);
    assert!(editor.apply(&mut pattern, &mut split, range(0, 12)).is_some());
    assert_eq!(split.cuts().map(|c| c.part).collect::<Vec<_>>(), vec![3, 6, 9]);
    assert_eq!(split.fragments().count(), 4);
    assert_eq!(pattern.len(), 4);
}

#[test]
fn test_stretch_vertical_bounds() {
    let mut pattern = Pattern::with_notes(vec![
        Note::new(60, 0, 4, 3),
        Note::new(63, 4, 8, 3),
        Note::new(72, 8, 12, 3),
    ]);
    let mut editor = Editor::new(Limits::default());
    let mut stretch = StretchVertical::from_bounds(PitchBounds { min: 60, max: 72 }, 48, 60);
    assert!(editor.apply(&mut pattern, &mut stretch, range(0, 12)).is_some());
    let pitches: Vec<_> = pattern.notes.iter().map(|n| n.pitches[0]).collect();
    assert_eq!(pitches, vec![48, 51, 60]);
}

#[test]
fn test_undo_redo_and_notifications() {
    let mut pattern = busy_pattern();
    let mut editor = Editor::with_sink(Limits::default(), 0usize);
    let mut bridge = BridgeAcross::new(false, false);
    let tx = editor.apply(&mut pattern, &mut bridge, range(0, 48)).unwrap();
    assert_eq!(*editor.sink(), 1);
    assert_eq!(tx.name, "Bridge Across");
    assert_eq!(bridge.inserted().count(), 3);

    let bridged = pattern.clone();
    tx.undo(&mut pattern);
    assert_eq!(pattern, busy_pattern());
    tx.redo(&mut pattern);
    assert_eq!(pattern, bridged);
}

#[test]
fn test_selection_default_range() {
    let mut pattern = Pattern::with_notes(vec![Note::new(60, 2, 4, 3), Note::new(60, 20, 22, 3)]);
    let mut editor = Editor::new(Limits::default());
    editor.set_selection(Some(signum_edit::TimeRange::new(0, 10)));
    assert!(editor.apply(&mut pattern, &mut StackLeft, EditRange::SelectionOrFull).is_some());
    let starts: Vec<_> = pattern.notes.iter().map(|n| n.start).collect();
    assert_eq!(starts, vec![0, 20]);
}

#[test]
fn test_tap_is_reproducible() {
    let run = |seed| {
        let mut editor = Editor::new(Limits::default()).with_seed(seed);
        let mut pattern = busy_pattern();
        editor.apply(&mut pattern, &mut TapNotes, range(0, 48));
        pattern
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn test_transforms_from_json() {
    init_tracing();
    let batch: Vec<Transform> = serde_json::from_str(
        r#"[
            { "BridgeAcross": { "do_bends": true } },
            { "SplitAcross": { "num_cuts": 3 } },
            { "StretchVerticalRelative": { "shift": -12 } },
            { "StepAcross": { "data": { "vol_add": { "values": [0, "-x / 3"], "per": "time" } } } },
            { "StackLeft": null }
        ]"#,
    )
    .unwrap();
    let names: Vec<_> = batch.iter().map(|t| t.name()).collect();
    assert_eq!(
        names,
        vec!["Bridge Across", "Split Across", "Stretch Vertical Relative", "Step Across", "Stack Left"]
    );

    let mut pattern = Pattern::with_notes(vec![Note::new(60, 0, 6, 3), Note::new(62, 8, 12, 3)]);
    let mut editor = Editor::new(Limits::default());
    for mut transform in batch {
        editor.apply(&mut pattern, &mut transform, range(0, 12));
        assert!(pattern.is_well_formed(84));
    }
    assert!(pattern.notes.iter().all(|n| n.pitches.iter().all(|&p| p < 60)));
}
