// SPDX-License-Identifier: Apache-2.0
//! The namespace edit record: one proposed move/rename/reorder/remove.

use std::fmt;

use canopy_path::ScenePath;

/// Ordering hint for an edit.
///
/// The validator interprets this only for no-op detection (`Same` on an
/// identity move); the real store is free to give position markers whatever
/// meaning it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EditIndex {
    /// Keep the object at its current position among its siblings.
    Same,
    /// Place the object after all existing siblings.
    AtEnd,
    /// Place the object at the given sibling position.
    At(usize),
}

impl fmt::Display for EditIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same => f.write_str("same"),
            Self::AtEnd => f.write_str("end"),
            Self::At(position) => write!(f, "{position}"),
        }
    }
}

/// One proposed structural edit of the scene namespace.
///
/// `new_path == None` removes the object at `current_path`. Equal paths with
/// an ordering index describe a pure reorder. Everything else is a move
/// (reparent and/or rename).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceEdit {
    /// Where the object lives when this edit runs (in batch-relative space).
    pub current_path: ScenePath,
    /// Where the object should end up; `None` removes it.
    pub new_path: Option<ScenePath>,
    /// Sibling ordering hint.
    pub index: EditIndex,
}

impl NamespaceEdit {
    /// A fully explicit edit.
    pub fn new(current_path: ScenePath, new_path: Option<ScenePath>, index: EditIndex) -> Self {
        Self {
            current_path,
            new_path,
            index,
        }
    }

    /// Removes the object at `path`.
    pub fn remove(path: ScenePath) -> Self {
        Self::new(path, None, EditIndex::Same)
    }

    /// Renames the object at `path` in place.
    ///
    /// Returns `None` when `path` has no name to replace (the root, or a
    /// target sub-key).
    pub fn rename(path: ScenePath, name: &str) -> Option<Self> {
        let renamed = path.replace_name(name)?;
        Some(Self::new(path, Some(renamed), EditIndex::Same))
    }

    /// Reorders the object at `path` among its siblings.
    pub fn reorder(path: ScenePath, index: EditIndex) -> Self {
        Self::new(path.clone(), Some(path), index)
    }

    /// Moves the object at `path` under `new_parent`, keeping its name.
    ///
    /// Returns `None` for the root, which has no parent to change.
    pub fn reparent(path: ScenePath, new_parent: &ScenePath, index: EditIndex) -> Option<Self> {
        let old_parent = path.parent()?;
        let moved = path.replace_prefix_literal(&old_parent, new_parent);
        Some(Self::new(path, Some(moved), index))
    }

    /// Moves the object at `path` under `new_parent` with a new name.
    pub fn reparent_and_rename(
        path: ScenePath,
        new_parent: &ScenePath,
        name: &str,
        index: EditIndex,
    ) -> Option<Self> {
        let old_parent = path.parent()?;
        let moved = path
            .replace_prefix_literal(&old_parent, new_parent)
            .replace_name(name)?;
        Some(Self::new(path, Some(moved), index))
    }

    /// Returns `true` when this edit removes its object.
    pub fn is_removal(&self) -> bool {
        self.new_path.is_none()
    }
}

impl fmt::Display for NamespaceEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.new_path {
            Some(new_path) => write!(f, "({}, {}, {})", self.current_path, new_path, self.index),
            None => write!(f, "({}, <removed>, {})", self.current_path, self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap_or_else(|_| unreachable!("bad test path {s}"))
    }

    #[test]
    fn constructors_build_the_expected_edits() {
        let remove = NamespaceEdit::remove(p("/A/B"));
        assert!(remove.is_removal());

        let rename = NamespaceEdit::rename(p("/A/B"), "C");
        assert_eq!(
            rename.and_then(|e| e.new_path).map(|p| p.to_string()).as_deref(),
            Some("/A/C")
        );
        assert_eq!(NamespaceEdit::rename(ScenePath::root(), "C"), None);

        let reparent = NamespaceEdit::reparent(p("/A/B"), &p("/Q"), EditIndex::AtEnd);
        assert_eq!(
            reparent.and_then(|e| e.new_path).map(|p| p.to_string()).as_deref(),
            Some("/Q/B")
        );

        let both = NamespaceEdit::reparent_and_rename(p("/A/B"), &p("/Q"), "C", EditIndex::AtEnd);
        assert_eq!(
            both.and_then(|e| e.new_path).map(|p| p.to_string()).as_deref(),
            Some("/Q/C")
        );

        let reorder = NamespaceEdit::reorder(p("/A/B"), EditIndex::At(0));
        assert_eq!(reorder.current_path, reorder.new_path.unwrap_or_else(ScenePath::root));
    }

    #[test]
    fn display_is_compact() {
        let edit = NamespaceEdit::reorder(p("/A"), EditIndex::At(2));
        assert_eq!(edit.to_string(), "(/A, /A, 2)");
        assert_eq!(NamespaceEdit::remove(p("/A")).to_string(), "(/A, <removed>, same)");
    }
}
