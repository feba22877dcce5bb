// SPDX-License-Identifier: Apache-2.0
//! Per-edit outcome reporting and the batch error taxonomy.

use std::fmt;

use thiserror::Error;

use crate::edit::NamespaceEdit;
use crate::namespace::SimulationError;

/// How an edit fared during batch validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EditResult {
    /// The edit is invalid and aborted the batch.
    Error,
    /// The edit is valid on its own but cannot be applied as part of this
    /// batch. `process` never produces this; it is reserved for callers
    /// that layer batch-splitting on top of the validator.
    Unbatched,
    /// The edit validated and was simulated cleanly.
    Okay,
}

/// Why an edit was rejected.
///
/// Everything here is a user-facing batch error except [`Self::Simulation`],
/// which wraps violated internal invariants (implementation bugs surfaced
/// defensively rather than by panicking).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatchEditError {
    /// The edited path is neither a prim path nor a property path.
    #[error("unsupported object type")]
    UnsupportedObjectType,
    /// `current_path` and `new_path` are different structural kinds.
    #[error("path type mismatch")]
    PathTypeMismatch,
    /// The object at `current_path` was removed earlier in the batch.
    #[error("object was removed")]
    ObjectRemoved,
    /// The real store has no object at the edit's source path.
    #[error("object does not exist")]
    ObjectDoesNotExist,
    /// The destination parent was removed earlier in the batch.
    #[error("new parent was removed")]
    NewParentRemoved,
    /// The real store has no object at the destination parent path.
    #[error("new parent does not exist")]
    NewParentDoesNotExist,
    /// The move would make the object an ancestor of itself.
    #[error("object cannot be an ancestor of itself")]
    CannotMakeAncestorOfSelf,
    /// The move would make the object a descendant of itself.
    #[error("object cannot be a descendant of itself")]
    CannotMakeDescendantOfSelf,
    /// An object already exists at the destination path.
    #[error("object already exists")]
    DestinationOccupied,
    /// A target path under `current_path` was edited earlier in the batch
    /// and backpointer fixing is disabled.
    #[error("current target was edited")]
    StaleCurrentTarget,
    /// A target path under `new_path` was edited earlier in the batch and
    /// backpointer fixing is disabled.
    #[error("new target was edited")]
    StaleNewTarget,
    /// The caller's `can_edit` hook rejected the edit.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The simulation tree violated an internal invariant.
    #[error("namespace simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// One entry of the per-edit report produced by
/// [`BatchNamespaceEdit::process`](crate::BatchNamespaceEdit::process).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EditDetail {
    /// Outcome class.
    pub result: EditResult,
    /// The edit this entry describes, as submitted.
    pub edit: NamespaceEdit,
    /// The rejection reason; `None` for `Okay` entries.
    pub reason: Option<BatchEditError>,
}

impl EditDetail {
    /// A successful entry.
    pub fn okay(edit: NamespaceEdit) -> Self {
        Self {
            result: EditResult::Okay,
            edit,
            reason: None,
        }
    }

    /// A failing entry.
    pub fn error(edit: NamespaceEdit, reason: BatchEditError) -> Self {
        Self {
            result: EditResult::Error,
            edit,
            reason: Some(reason),
        }
    }
}

impl fmt::Display for EditDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.result {
            EditResult::Error => "error",
            EditResult::Unbatched => "unbatched",
            EditResult::Okay => "okay",
        };
        match &self.reason {
            Some(reason) => write!(f, "{class} {}: {reason}", self.edit),
            None => write!(f, "{class} {}", self.edit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditIndex;
    use canopy_path::ScenePath;

    #[test]
    fn error_messages_name_the_failure() {
        assert_eq!(BatchEditError::ObjectRemoved.to_string(), "object was removed");
        assert_eq!(
            BatchEditError::PermissionDenied("prim is locked".into()).to_string(),
            "permission denied: prim is locked"
        );
    }

    #[test]
    fn detail_constructors_set_the_result_class() {
        let edit = NamespaceEdit::new(ScenePath::root(), None, EditIndex::Same);
        assert_eq!(EditDetail::okay(edit.clone()).result, EditResult::Okay);
        let detail = EditDetail::error(edit, BatchEditError::PathTypeMismatch);
        assert_eq!(detail.result, EditResult::Error);
        assert_eq!(detail.reason, Some(BatchEditError::PathTypeMismatch));
    }
}
