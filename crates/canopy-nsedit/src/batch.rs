// SPDX-License-Identifier: Apache-2.0
//! Batch validation of namespace edits against a simulated namespace.

use canopy_path::ScenePath;
use tracing::{debug, trace};

use crate::detail::{BatchEditError, EditDetail};
use crate::edit::{EditIndex, NamespaceEdit};
use crate::namespace::Namespace;

/// Result of [`BatchNamespaceEdit::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `true` when every edit validated and simulated cleanly.
    pub ok: bool,
    /// The cleaned edit sequence, safe to apply to the real store in order.
    /// Empty unless `ok`.
    pub processed_edits: Vec<NamespaceEdit>,
    /// One entry per edit that was not silently dropped (committed edits as
    /// `Okay`, the aborting edit as `Error`). Repeat removals and pure
    /// no-ops get no entry.
    pub details: Vec<EditDetail>,
}

/// An ordered batch of namespace edits awaiting validation.
///
/// The batch itself is plain data; [`Self::process`] checks the whole
/// sequence against a caller-described real store without mutating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchNamespaceEdit {
    edits: Vec<NamespaceEdit>,
}

impl BatchNamespaceEdit {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `edit` to the batch.
    pub fn add(&mut self, edit: NamespaceEdit) {
        self.edits.push(edit);
    }

    /// The edits in submission order.
    pub fn edits(&self) -> &[NamespaceEdit] {
        &self.edits
    }

    /// Validates the whole batch against the real store described by the
    /// caller hooks, without mutating anything.
    ///
    /// `has_object_at_path` and `can_edit` are queried with *original*
    /// (pre-batch) paths; `can_edit` may veto an edit with a reason. With
    /// `fix_backpointers` enabled, target sub-keys pointing at moved
    /// objects are rewritten in the simulation; disabled, edits touching a
    /// previously-edited target are rejected instead.
    ///
    /// The first invalid edit aborts the batch: no partial sequence is ever
    /// reported as applicable. On success the returned
    /// [`ProcessOutcome::processed_edits`] is guaranteed legal when applied
    /// in order.
    pub fn process<H, C>(
        &self,
        has_object_at_path: H,
        can_edit: C,
        fix_backpointers: bool,
    ) -> ProcessOutcome
    where
        H: Fn(&ScenePath) -> bool,
        C: Fn(&NamespaceEdit) -> Result<(), String>,
    {
        debug!(edits = self.edits.len(), fix_backpointers, "processing batch");

        let mut ns = Namespace::new(fix_backpointers);
        let mut processed_edits: Vec<NamespaceEdit> = Vec::new();
        let mut details: Vec<EditDetail> = Vec::new();

        for edit in &self.edits {
            match Self::check_edit(
                &mut ns,
                edit,
                &has_object_at_path,
                &can_edit,
                fix_backpointers,
            ) {
                Ok(Verdict::Commit) => {
                    processed_edits.push(edit.clone());
                    details.push(EditDetail::okay(edit.clone()));
                }
                Ok(Verdict::Skip) => {
                    trace!(%edit, "dropping edit with no effect");
                }
                Err(reason) => {
                    debug!(%edit, %reason, "batch aborted");
                    details.push(EditDetail::error(edit.clone(), reason));
                    return ProcessOutcome {
                        ok: false,
                        processed_edits: Vec::new(),
                        details,
                    };
                }
            }
        }

        ProcessOutcome {
            ok: true,
            processed_edits,
            details,
        }
    }

    /// Validates a single edit and, when it holds, applies it to the
    /// simulation.
    fn check_edit<H, C>(
        ns: &mut Namespace,
        edit: &NamespaceEdit,
        has_object_at_path: &H,
        can_edit: &C,
        fix_backpointers: bool,
    ) -> Result<Verdict, BatchEditError>
    where
        H: Fn(&ScenePath) -> bool,
        C: Fn(&NamespaceEdit) -> Result<(), String>,
    {
        // Both paths must be the same structural kind of object.
        let kinds_match = if edit.current_path.is_prim_path() {
            edit.new_path.as_ref().is_none_or(ScenePath::is_prim_path)
        } else if edit.current_path.is_property_path() {
            edit.new_path
                .as_ref()
                .is_none_or(ScenePath::is_property_path)
        } else {
            return Err(BatchEditError::UnsupportedObjectType);
        };
        if !kinds_match {
            return Err(BatchEditError::PathTypeMismatch);
        }

        // Where did the object now at current_path start out?
        let from = match ns.find_or_create_original_path(&edit.current_path)? {
            Some(from) => from,
            None => {
                // Removing from removed namespace already happened (say, a
                // prim removed before its properties); drop the repeat.
                // Anything else is an error.
                if edit.is_removal() {
                    return Ok(Verdict::Skip);
                }
                return Err(BatchEditError::ObjectRemoved);
            }
        };

        if !has_object_at_path(&from) {
            return Err(BatchEditError::ObjectDoesNotExist);
        }

        let mut to = None;
        if let Some(new_path) = &edit.new_path {
            // A no-op reorder changes nothing; drop it. An index that is
            // not `Same` but has the same effect is not detected here.
            if *new_path == edit.current_path && edit.index == EditIndex::Same {
                return Ok(Verdict::Skip);
            }

            let new_parent = new_path
                .parent()
                .ok_or(BatchEditError::UnsupportedObjectType)?;
            let to_parent = ns
                .find_or_create_original_path(&new_parent)?
                .ok_or(BatchEditError::NewParentRemoved)?;
            if !has_object_at_path(&to_parent) {
                return Err(BatchEditError::NewParentDoesNotExist);
            }

            if *new_path == edit.current_path {
                // Reordering in place; structure is unaffected.
            } else if edit.current_path.has_prefix(new_path) {
                return Err(BatchEditError::CannotMakeAncestorOfSelf);
            } else if new_path.has_prefix(&edit.current_path) {
                return Err(BatchEditError::CannotMakeDescendantOfSelf);
            } else if let Some(existing) = ns.get_original_path(new_path) {
                if has_object_at_path(&existing) {
                    return Err(BatchEditError::DestinationOccupied);
                }
            }

            // Without backpointer fixing, a target key now naming a
            // different object than it did pre-batch would silently point
            // at the wrong thing; reject instead. A target in vacated
            // namespace translates to nothing and is left alone.
            if !fix_backpointers {
                for target in edit.current_path.all_target_paths() {
                    if ns
                        .get_original_path(&target)
                        .is_some_and(|original| original != target)
                    {
                        return Err(BatchEditError::StaleCurrentTarget);
                    }
                }
                for target in new_path.all_target_paths() {
                    if ns
                        .get_original_path(&target)
                        .is_some_and(|original| original != target)
                    {
                        return Err(BatchEditError::StaleNewTarget);
                    }
                }
            }

            to = Some(new_path.replace_prefix(&new_parent, &to_parent));
        }

        // Ask the store whether the edit, phrased in original paths, is
        // allowed at all.
        let original_space = NamespaceEdit::new(from, to, edit.index);
        can_edit(&original_space).map_err(BatchEditError::PermissionDenied)?;

        ns.apply(edit)?;
        Ok(Verdict::Commit)
    }
}

impl From<Vec<NamespaceEdit>> for BatchNamespaceEdit {
    fn from(edits: Vec<NamespaceEdit>) -> Self {
        Self { edits }
    }
}

impl FromIterator<NamespaceEdit> for BatchNamespaceEdit {
    fn from_iter<I: IntoIterator<Item = NamespaceEdit>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// Per-edit decision of [`BatchNamespaceEdit::check_edit`].
enum Verdict {
    /// The edit validated and was applied to the simulation.
    Commit,
    /// The edit has no effect and is dropped without record.
    Skip,
}
