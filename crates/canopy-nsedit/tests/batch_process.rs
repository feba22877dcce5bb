// SPDX-License-Identifier: Apache-2.0
//! End-to-end batch validation scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;
use std::collections::BTreeSet;

use canopy_nsedit::{
    BatchEditError, BatchNamespaceEdit, EditIndex, EditResult, NamespaceEdit, ProcessOutcome,
};
use canopy_path::ScenePath;

fn p(s: &str) -> ScenePath {
    s.parse().expect("valid test path")
}

fn allow_all(_: &NamespaceEdit) -> Result<(), String> {
    Ok(())
}

/// A store hook backed by an explicit path set. The root always exists.
fn store(paths: &[&str]) -> impl Fn(&ScenePath) -> bool {
    let set: BTreeSet<ScenePath> = paths.iter().map(|s| p(s)).collect();
    move |path| path.is_root() || set.contains(path)
}

fn failure_reason(outcome: &ProcessOutcome) -> &BatchEditError {
    assert!(!outcome.ok);
    assert!(outcome.processed_edits.is_empty(), "failed batches commit nothing");
    let last = outcome.details.last().expect("a failing batch reports its aborting edit");
    assert_eq!(last.result, EditResult::Error);
    last.reason.as_ref().expect("error details carry a reason")
}

#[test]
fn rename_validates_against_the_original_store() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::rename(p("/World/Ball"), "Sphere").unwrap());

    let outcome = batch.process(store(&["/World", "/World/Ball"]), allow_all, true);
    assert!(outcome.ok);
    assert_eq!(outcome.processed_edits, batch.edits());
    assert_eq!(outcome.details.len(), 1);
    assert_eq!(outcome.details[0].result, EditResult::Okay);
    assert_eq!(outcome.details[0].reason, None);
}

#[test]
fn removing_inside_removed_namespace_is_dropped() {
    // The prim goes first, then one of its properties; the second edit is
    // already covered by the first and must vanish without a report entry.
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/A")));
    batch.add(NamespaceEdit::remove(p("/A.x")));

    let outcome = batch.process(store(&["/A", "/A.x"]), allow_all, true);
    assert!(outcome.ok);
    assert_eq!(outcome.processed_edits.len(), 1);
    assert_eq!(outcome.details.len(), 1);
    assert_eq!(outcome.processed_edits[0], NamespaceEdit::remove(p("/A")));
}

#[test]
fn removing_property_then_prim_keeps_both_edits() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/A.x")));
    batch.add(NamespaceEdit::remove(p("/A")));

    let outcome = batch.process(store(&["/A", "/A.x"]), allow_all, true);
    assert!(outcome.ok);
    assert_eq!(outcome.processed_edits.len(), 2);
}

#[test]
fn object_cannot_become_a_descendant_of_itself() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::new(p("/A"), Some(p("/A/B")), EditIndex::AtEnd));

    let outcome = batch.process(store(&["/A", "/A/B"]), allow_all, true);
    assert_eq!(
        failure_reason(&outcome),
        &BatchEditError::CannotMakeDescendantOfSelf
    );
}

#[test]
fn object_cannot_become_an_ancestor_of_itself() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::new(p("/A/B"), Some(p("/A")), EditIndex::AtEnd));

    let outcome = batch.process(store(&["/A", "/A/B"]), allow_all, true);
    assert_eq!(
        failure_reason(&outcome),
        &BatchEditError::CannotMakeAncestorOfSelf
    );
}

#[test]
fn sibling_swap_needs_a_temporary() {
    let exists = store(&["/A", "/B"]);

    // The direct two-edit swap collides at its first step.
    let mut direct = BatchNamespaceEdit::new();
    direct.add(NamespaceEdit::new(p("/A"), Some(p("/B")), EditIndex::Same));
    direct.add(NamespaceEdit::new(p("/B"), Some(p("/A")), EditIndex::Same));
    let outcome = direct.process(&exists, allow_all, true);
    assert_eq!(failure_reason(&outcome), &BatchEditError::DestinationOccupied);

    // Routing one side through an unoccupied path succeeds.
    let mut via_temp = BatchNamespaceEdit::new();
    via_temp.add(NamespaceEdit::new(p("/A"), Some(p("/Temp")), EditIndex::Same));
    via_temp.add(NamespaceEdit::new(p("/B"), Some(p("/A")), EditIndex::Same));
    via_temp.add(NamespaceEdit::new(p("/Temp"), Some(p("/B")), EditIndex::Same));
    let outcome = via_temp.process(&exists, allow_all, true);
    assert!(outcome.ok, "{:?}", outcome.details);
    assert_eq!(outcome.processed_edits.len(), 3);
}

#[test]
fn later_edits_are_validated_in_original_space() {
    // After /A moves to /B, the object the caller knows as /B/C is still
    // /A/C to the store; existence and permission checks must see /A/C.
    let asked: RefCell<Vec<ScenePath>> = RefCell::new(Vec::new());
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::new(p("/A"), Some(p("/B")), EditIndex::Same));
    batch.add(NamespaceEdit::rename(p("/B/C"), "D").unwrap());

    let outcome = batch.process(store(&["/A", "/A/C"]), |edit| {
        asked.borrow_mut().push(edit.current_path.clone());
        Ok(())
    }, true);

    assert!(outcome.ok, "{:?}", outcome.details);
    assert_eq!(asked.borrow().as_slice(), &[p("/A"), p("/A/C")]);
}

#[test]
fn failure_aborts_and_reports_the_committed_prefix() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/A")));
    batch.add(NamespaceEdit::rename(p("/Missing"), "Renamed").unwrap());

    let outcome = batch.process(store(&["/A"]), allow_all, true);
    assert!(!outcome.ok);
    assert!(outcome.processed_edits.is_empty());
    assert_eq!(outcome.details.len(), 2);
    assert_eq!(outcome.details[0].result, EditResult::Okay);
    assert_eq!(outcome.details[1].result, EditResult::Error);
    assert_eq!(
        outcome.details[1].reason,
        Some(BatchEditError::ObjectDoesNotExist)
    );
}

#[test]
fn editing_removed_namespace_fails() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/A")));
    batch.add(NamespaceEdit::rename(p("/A/B"), "C").unwrap());

    let outcome = batch.process(store(&["/A", "/A/B"]), allow_all, true);
    assert_eq!(failure_reason(&outcome), &BatchEditError::ObjectRemoved);
}

#[test]
fn moving_under_a_removed_parent_fails() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/B")));
    batch.add(NamespaceEdit::reparent(p("/A"), &p("/B"), EditIndex::Same).unwrap());

    let outcome = batch.process(store(&["/A", "/B"]), allow_all, true);
    assert_eq!(failure_reason(&outcome), &BatchEditError::NewParentRemoved);
}

#[test]
fn moving_under_a_missing_parent_fails() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::reparent(p("/A"), &p("/Missing"), EditIndex::Same).unwrap());

    let outcome = batch.process(store(&["/A"]), allow_all, true);
    assert_eq!(
        failure_reason(&outcome),
        &BatchEditError::NewParentDoesNotExist
    );
}

#[test]
fn kind_mismatch_and_unsupported_kinds_fail() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::new(p("/A"), Some(p("/B.x")), EditIndex::Same));
    let outcome = batch.process(store(&["/A", "/B"]), allow_all, true);
    assert_eq!(failure_reason(&outcome), &BatchEditError::PathTypeMismatch);

    // A bare target sub-key is not an editable object.
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/Rig.targets[/World/Ball]")));
    let outcome = batch.process(|_: &ScenePath| true, allow_all, true);
    assert_eq!(
        failure_reason(&outcome),
        &BatchEditError::UnsupportedObjectType
    );
}

#[test]
fn permission_hook_can_veto_with_a_reason() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::rename(p("/A"), "B").unwrap());

    let outcome = batch.process(
        store(&["/A"]),
        |_| Err("object is locked".to_owned()),
        true,
    );
    assert_eq!(
        failure_reason(&outcome),
        &BatchEditError::PermissionDenied("object is locked".to_owned())
    );
}

#[test]
fn noop_reorders_are_dropped_but_real_reorders_commit() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::reorder(p("/A"), EditIndex::Same));
    batch.add(NamespaceEdit::reorder(p("/A"), EditIndex::At(0)));

    let outcome = batch.process(store(&["/A"]), allow_all, true);
    assert!(outcome.ok);
    assert_eq!(outcome.processed_edits.len(), 1);
    assert_eq!(outcome.processed_edits[0].index, EditIndex::At(0));
}

#[test]
fn target_keys_follow_moved_objects_when_fixing_backpointers() {
    // /World/Ball moves; the caller then edits a relational attribute whose
    // target key already reflects the move. Validation must map the key back
    // to /World/Ball when talking to the store.
    let asked: RefCell<Vec<ScenePath>> = RefCell::new(Vec::new());
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::new(
        p("/World/Ball"),
        Some(p("/World/Sphere")),
        EditIndex::Same,
    ));
    batch.add(NamespaceEdit::rename(p("/Rig.targets[/World/Sphere].weight"), "mass").unwrap());

    let outcome = batch.process(
        store(&[
            "/World",
            "/World/Ball",
            "/Rig",
            "/Rig.targets",
            "/Rig.targets[/World/Ball]",
            "/Rig.targets[/World/Ball].weight",
        ]),
        |edit: &NamespaceEdit| {
            asked.borrow_mut().push(edit.current_path.clone());
            Ok(())
        },
        true,
    );

    assert!(outcome.ok, "{:?}", outcome.details);
    assert_eq!(
        asked.borrow().as_slice(),
        &[p("/World/Ball"), p("/Rig.targets[/World/Ball].weight")]
    );
}

#[test]
fn reoccupied_targets_are_rejected_without_backpointer_fixing() {
    // /World/Ball is vacated and a different object moves in; a target key
    // still spelled /World/Ball now names the wrong object.
    let swap_in_cube = vec![
        NamespaceEdit::remove(p("/World/Ball")),
        NamespaceEdit::new(p("/World/Cube"), Some(p("/World/Ball")), EditIndex::Same),
    ];

    // The edited object's own path carries the reoccupied target key.
    let mut batch = BatchNamespaceEdit::from(swap_in_cube.clone());
    batch.add(NamespaceEdit::rename(p("/Rig.targets[/World/Ball].weight"), "mass").unwrap());
    let outcome = batch.process(
        store(&[
            "/World",
            "/World/Ball",
            "/World/Cube",
            "/Rig",
            "/Rig.targets[/World/Cube]",
            "/Rig.targets[/World/Cube].weight",
        ]),
        allow_all,
        false,
    );
    assert_eq!(failure_reason(&outcome), &BatchEditError::StaleCurrentTarget);

    // The destination path carries the reoccupied target key.
    let mut batch = BatchNamespaceEdit::from(swap_in_cube);
    batch.add(NamespaceEdit::new(
        p("/Rig.other"),
        Some(p("/Rig.targets[/World/Ball].weight")),
        EditIndex::Same,
    ));
    let outcome = batch.process(
        store(&[
            "/World",
            "/World/Ball",
            "/World/Cube",
            "/Rig",
            "/Rig.other",
            "/Rig.targets[/World/Cube]",
        ]),
        allow_all,
        false,
    );
    assert_eq!(failure_reason(&outcome), &BatchEditError::StaleNewTarget);
}

#[test]
fn removed_targets_are_not_stale() {
    // A target key pointing into vacated namespace translates to nothing,
    // which is not a conflict: the edit goes through even without
    // backpointer fixing.
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/World/Ball")));
    batch.add(NamespaceEdit::rename(p("/Rig.targets[/World/Ball].weight"), "mass").unwrap());

    let outcome = batch.process(
        store(&[
            "/World",
            "/World/Ball",
            "/Rig",
            "/Rig.targets[/World/Ball]",
            "/Rig.targets[/World/Ball].weight",
        ]),
        allow_all,
        false,
    );
    assert!(outcome.ok, "{:?}", outcome.details);
    assert_eq!(outcome.processed_edits.len(), 2);
}

#[test]
fn vacated_destination_can_be_reoccupied() {
    let mut batch = BatchNamespaceEdit::new();
    batch.add(NamespaceEdit::remove(p("/B")));
    batch.add(NamespaceEdit::new(p("/A"), Some(p("/B")), EditIndex::Same));

    let outcome = batch.process(store(&["/A", "/B"]), allow_all, true);
    assert!(outcome.ok, "{:?}", outcome.details);
    assert_eq!(outcome.processed_edits.len(), 2);
}

#[test]
fn empty_batch_is_trivially_valid() {
    let outcome = BatchNamespaceEdit::new().process(store(&[]), allow_all, true);
    assert!(outcome.ok);
    assert!(outcome.processed_edits.is_empty());
    assert!(outcome.details.is_empty());
}
