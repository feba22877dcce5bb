// SPDX-License-Identifier: Apache-2.0
//! Tracking of namespace regions known to host no live object.
//!
//! Removals punch holes in the simulated namespace. The tracker keeps the
//! hole set prefix-minimal: a removed ancestor subsumes removed descendants,
//! so no entry is ever a strict prefix of another. Containment is a single
//! ordered lookup plus a prefix test, relying on `ScenePath`'s ordering
//! placing every ancestor before its descendants.

use std::collections::BTreeSet;

use canopy_path::ScenePath;

/// The prefix-minimal set of removed-and-not-reoccupied paths.
#[derive(Debug, Default)]
pub(crate) struct DeadspaceTracker {
    paths: BTreeSet<ScenePath>,
}

impl DeadspaceTracker {
    /// Marks `path` (and thereby its whole subtree) as dead.
    ///
    /// A path already covered by a dead ancestor is absorbed, and entries
    /// at or under `path` become redundant and are pruned first, keeping
    /// the set prefix-minimal. The namespace root is never dead; asking
    /// for it is a caller bug.
    pub(crate) fn add(&mut self, path: &ScenePath) {
        debug_assert!(!path.is_root(), "the namespace root cannot become deadspace");
        if path.is_root() || self.contains(path) {
            return;
        }
        self.remove(path);
        self.paths.insert(path.clone());
    }

    /// Revives `path`: drops it and every entry under it.
    ///
    /// Re-occupying a path revives its whole previously-dead subtree.
    pub(crate) fn remove(&mut self, path: &ScenePath) {
        let doomed: Vec<ScenePath> = self
            .paths
            .range(path.clone()..)
            .take_while(|entry| entry.has_prefix(path))
            .cloned()
            .collect();
        for entry in doomed {
            self.paths.remove(&entry);
        }
    }

    /// Returns `true` when `path` sits at or under a dead entry.
    pub(crate) fn contains(&self, path: &ScenePath) -> bool {
        // The greatest entry <= path is the only candidate ancestor: any
        // other entry ordered between it and path would have to descend
        // from it, and the set is prefix-minimal.
        self.paths
            .range(..=path.clone())
            .next_back()
            .is_some_and(|entry| path.has_prefix(entry))
    }

    /// Number of entries; exposed for invariant checks in tests.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.paths.len()
    }

    /// Iterates entries in path order; exposed for invariant checks in tests.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &ScenePath> {
        self.paths.iter()
    }
}
