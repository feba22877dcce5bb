// SPDX-License-Identifier: Apache-2.0
//! Reverse index from target paths to the simulation nodes keyed by them.
//!
//! Relationship/connection targets hold a path as a sub-key. When the object
//! at that path moves, every node keyed by it (or by a descendant of it) has
//! to be re-keyed, and its index entry relocated under the new prefix. The
//! index is an ordered map so "all entries at or under prefix P" is a range
//! scan; the per-entry node sets are unordered because re-keying each node
//! is independent of the others.

use std::collections::BTreeMap;

use canopy_path::ScenePath;
use rustc_hash::FxHashSet;

use crate::namespace::NodeIndex;

/// Ordered map from a target path to the nodes keyed by it.
#[derive(Debug, Default)]
pub(crate) struct BackpointerIndex {
    nodes_with_path: BTreeMap<ScenePath, FxHashSet<NodeIndex>>,
}

impl BackpointerIndex {
    /// Records that `node` is keyed by `path`.
    pub(crate) fn add(&mut self, path: ScenePath, node: NodeIndex) {
        self.nodes_with_path.entry(path).or_default().insert(node);
    }

    /// Drops every entry recorded at or under `path`.
    pub(crate) fn remove_subtree(&mut self, path: &ScenePath) {
        let doomed: Vec<ScenePath> = self.subtree_keys(path);
        for key in doomed {
            self.nodes_with_path.remove(&key);
        }
    }

    /// Detaches and returns every entry recorded at or under `path`, for
    /// relocation under a rewritten prefix.
    pub(crate) fn take_subtree(&mut self, path: &ScenePath) -> Vec<(ScenePath, FxHashSet<NodeIndex>)> {
        let keys = self.subtree_keys(path);
        keys.into_iter()
            .filter_map(|key| {
                let nodes = self.nodes_with_path.remove(&key)?;
                Some((key, nodes))
            })
            .collect()
    }

    /// Re-files `nodes` under `path`, merging with any set already there.
    pub(crate) fn merge(&mut self, path: ScenePath, nodes: FxHashSet<NodeIndex>) {
        if nodes.is_empty() {
            return;
        }
        self.nodes_with_path.entry(path).or_default().extend(nodes);
    }

    /// Returns `true` when any entry is recorded at or under `path`.
    pub(crate) fn has_subtree(&self, path: &ScenePath) -> bool {
        self.nodes_with_path
            .range(path.clone()..)
            .next()
            .is_some_and(|(key, _)| key.has_prefix(path))
    }

    fn subtree_keys(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.nodes_with_path
            .range(path.clone()..)
            .take_while(|(key, _)| key.has_prefix(path))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap_or_else(|_| unreachable!("bad test path {s}"))
    }

    #[test]
    fn subtree_operations_cover_exactly_the_prefix_range() {
        let mut index = BackpointerIndex::default();
        index.add(p("/A"), NodeIndex(1));
        index.add(p("/A/B"), NodeIndex(2));
        index.add(p("/AB"), NodeIndex(3));

        assert!(index.has_subtree(&p("/A")));
        let taken = index.take_subtree(&p("/A"));
        assert_eq!(taken.len(), 2, "/AB must not be swept up under /A");
        assert!(index.has_subtree(&p("/AB")));
        assert!(!index.has_subtree(&p("/A")));

        index.remove_subtree(&p("/AB"));
        assert!(!index.has_subtree(&p("/AB")));
    }

    #[test]
    fn merge_unions_with_existing_entries() {
        let mut index = BackpointerIndex::default();
        index.add(p("/A"), NodeIndex(1));
        let mut incoming = FxHashSet::default();
        incoming.insert(NodeIndex(2));
        index.merge(p("/A"), incoming);
        let taken = index.take_subtree(&p("/A"));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].1.len(), 2);
    }
}
