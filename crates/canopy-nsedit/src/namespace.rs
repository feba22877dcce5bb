// SPDX-License-Identifier: Apache-2.0
//! The virtual namespace tree: a scratch simulation of the real namespace.
//!
//! [`Namespace`] mirrors the hypothetical state of the scene namespace after
//! some prefix of a batch has been applied, without touching the real store.
//! Nodes live in an append-only arena and carry immutable provenance (the
//! pre-batch path of the object now at their position); reparenting is a
//! detach-then-attach of a handle, never a copy, so each live node has
//! exactly one parent at all times.
//!
//! Arena slots are never reused. Backpointer entries can outlive the nodes
//! they were filed for (a subtree removal does not chase every key pointing
//! out of it); a vacant slot is how such stale handles are recognised and
//! dropped.

use std::collections::BTreeMap;

use canopy_path::ScenePath;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::trace;

use crate::backpointer::BackpointerIndex;
use crate::deadspace::DeadspaceTracker;
use crate::edit::NamespaceEdit;

/// Violated internal invariant of the simulation tree.
///
/// These indicate implementation bugs rather than user error; they surface
/// as values so a corrupted simulation aborts the batch instead of taking
/// the process down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimulationError {
    /// No simulated object exists at the path.
    #[error("no simulated object at {path}")]
    NodeNotFound {
        /// The path that failed to resolve.
        path: ScenePath,
    },
    /// No simulated object exists at the destination parent path.
    #[error("no simulated object at new parent {path}")]
    ParentNotFound {
        /// The destination parent path that failed to resolve.
        path: ScenePath,
    },
    /// The destination key is already taken in the new parent.
    #[error("simulated object at {path} already exists")]
    DestinationOccupied {
        /// The occupied destination path.
        path: ScenePath,
    },
    /// The node was already detached from the tree.
    #[error("simulated object at {path} was already removed")]
    NodeDetached {
        /// The path whose node turned out to be detached.
        path: ScenePath,
    },
    /// The namespace root cannot be moved or removed.
    #[error("the namespace root cannot be moved or removed")]
    RootEdit,
    /// The arena and a child map disagree.
    #[error("simulation tree out of sync near {path}")]
    Desync {
        /// The path being edited when the desync was noticed.
        path: ScenePath,
    },
    /// Rewriting a target key would collide with a sibling target node
    /// already keyed by the rewritten path.
    #[error("target key {path} is already present under the same parent")]
    TargetKeyCollision {
        /// The rewritten target path that was already taken.
        path: ScenePath,
    },
}

/// Stable handle to a node in the simulation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeIndex(pub(crate) usize);

/// Sort key of a node within its parent's child map.
///
/// A tagged union compared by (discriminant, payload): the root marker, a
/// name token for prim/property children, or a whole path for target
/// sub-keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NodeKey {
    Root,
    Name(String),
    Target(ScenePath),
}

impl NodeKey {
    /// The key a node for `path` sorts under: its last component's name, or
    /// the target path if the last component is a target sub-key.
    fn for_path(path: &ScenePath) -> Self {
        if let Some(target) = path.target_path() {
            Self::Target(target.clone())
        } else {
            match path.name() {
                Some(name) => Self::Name(name.to_owned()),
                None => Self::Root,
            }
        }
    }
}

/// One node of the simulated namespace.
#[derive(Debug)]
struct Node {
    /// Sort key within the parent's child map.
    key: NodeKey,
    /// Non-owning back-reference; `None` for the root and for detached nodes.
    parent: Option<NodeIndex>,
    /// Owned children, ordered by key.
    children: BTreeMap<NodeKey, NodeIndex>,
    /// Pre-batch path of the object now at this node. Never changes.
    original_path: ScenePath,
}

const ROOT: NodeIndex = NodeIndex(0);

/// In-memory simulation of the scene namespace under a batch of edits.
///
/// Created empty (root only); nodes appear lazily as paths are queried and
/// move around as edits are applied. The tree, its deadspace set, and its
/// backpointer index are scratch state for a single validation pass.
#[derive(Debug)]
pub struct Namespace {
    fix_backpointers: bool,
    arena: Vec<Option<Node>>,
    backpointers: BackpointerIndex,
    deadspace: DeadspaceTracker,
}

impl Namespace {
    /// Creates a fresh simulation holding only the namespace root.
    ///
    /// With `fix_backpointers` enabled, target sub-key nodes are indexed so
    /// that moves rewrite the targets pointing at the moved subtree;
    /// disabled, the batch processor instead rejects edits touching stale
    /// targets.
    pub fn new(fix_backpointers: bool) -> Self {
        Self {
            fix_backpointers,
            arena: vec![Some(Node {
                key: NodeKey::Root,
                parent: None,
                children: BTreeMap::new(),
                original_path: ScenePath::root(),
            })],
            backpointers: BackpointerIndex::default(),
            deadspace: DeadspaceTracker::default(),
        }
    }

    /// Returns the pre-batch path of the object currently at `path`,
    /// creating simulation nodes along the way as needed.
    ///
    /// `Ok(None)` means `path` lies in deadspace (nothing is ever created
    /// there). A path untouched by earlier edits maps to itself.
    pub fn find_or_create_original_path(
        &mut self,
        path: &ScenePath,
    ) -> Result<Option<ScenePath>, SimulationError> {
        if self.deadspace.contains(path) {
            return Ok(None);
        }
        let mut cur = ROOT;
        for prefix in path.prefixes() {
            cur = if let Some(target) = prefix.target_path() {
                let original_target = self.unedit_path(target);
                let (child, created) =
                    self.find_or_create_target_child(cur, target, original_target)?;
                if created && self.fix_backpointers {
                    self.backpointers.add(target.clone(), child);
                }
                child
            } else {
                self.find_or_create_named_child(cur, &prefix)?
            };
        }
        let node = self
            .node(cur)
            .ok_or_else(|| SimulationError::Desync { path: path.clone() })?;
        Ok(Some(node.original_path.clone()))
    }

    /// Read-only variant of [`Self::find_or_create_original_path`]: returns
    /// the pre-batch path of the object currently at `path`, or `None` if
    /// `path` lies in deadspace. Creates nothing.
    pub fn get_original_path(&self, path: &ScenePath) -> Option<ScenePath> {
        if self.deadspace.contains(path) {
            None
        } else {
            Some(self.unedit_path(path))
        }
    }

    /// Returns `true` when `path` sits in removed, un-reoccupied namespace.
    pub fn is_deadspace(&self, path: &ScenePath) -> bool {
        self.deadspace.contains(path)
    }

    /// Applies `edit` to the simulation: removal when `new_path` is `None`,
    /// a move when the paths differ, and a no-op for a pure reorder (sibling
    /// order is not modeled).
    ///
    /// `edit` is expected to be phrased in the namespace produced by all
    /// previous `apply` calls. Rejected edits leave the tree untouched,
    /// except for a `TargetKeyCollision` during backpointer fixing, after
    /// which the simulation must be discarded.
    pub fn apply(&mut self, edit: &NamespaceEdit) -> Result<(), SimulationError> {
        match &edit.new_path {
            None => self.remove(&edit.current_path),
            Some(new_path) if *new_path != edit.current_path => {
                self.move_object(&edit.current_path, new_path)
            }
            Some(_) => Ok(()),
        }
    }

    fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.arena.get(idx.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.arena.get_mut(idx.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.arena.len());
        self.arena.push(Some(node));
        idx
    }

    /// Walks from the root to the node at `path`, if the tree has one.
    fn get_node_at_path(&self, path: &ScenePath) -> Option<NodeIndex> {
        let mut cur = ROOT;
        for prefix in path.prefixes() {
            let key = NodeKey::for_path(&prefix);
            cur = *self.node(cur)?.children.get(&key)?;
        }
        Some(cur)
    }

    /// Translates `path` to the pre-batch namespace by walking as deep as
    /// the tree goes and re-basing the untouched remainder onto the deepest
    /// node's provenance.
    fn unedit_path(&self, path: &ScenePath) -> ScenePath {
        let mut cur = ROOT;
        for prefix in path.prefixes() {
            let key = NodeKey::for_path(&prefix);
            let child = self.node(cur).and_then(|node| node.children.get(&key)).copied();
            match child {
                Some(next) => cur = next,
                None => {
                    let base = self
                        .node(cur)
                        .map_or_else(ScenePath::root, |node| node.original_path.clone());
                    let walked = prefix.parent().unwrap_or_else(ScenePath::root);
                    return path.replace_prefix(&walked, &base);
                }
            }
        }
        self.node(cur)
            .map_or_else(ScenePath::root, |node| node.original_path.clone())
    }

    fn find_or_create_named_child(
        &mut self,
        parent: NodeIndex,
        prefix: &ScenePath,
    ) -> Result<NodeIndex, SimulationError> {
        let key = NodeKey::for_path(prefix);
        let (existing, parent_original) = {
            let parent_node = self
                .node(parent)
                .ok_or_else(|| SimulationError::Desync { path: prefix.clone() })?;
            (
                parent_node.children.get(&key).copied(),
                parent_node.original_path.clone(),
            )
        };
        if let Some(child) = existing {
            return Ok(child);
        }
        let walked = prefix.parent().unwrap_or_else(ScenePath::root);
        let original_path = prefix.replace_prefix(&walked, &parent_original);
        let child = self.alloc(Node {
            key: key.clone(),
            parent: Some(parent),
            children: BTreeMap::new(),
            original_path,
        });
        self.node_mut(parent)
            .ok_or_else(|| SimulationError::Desync { path: prefix.clone() })?
            .children
            .insert(key, child);
        Ok(child)
    }

    /// Find-or-create for a target sub-key child. `original_target` must be
    /// `target` translated to the pre-batch namespace. The boolean reports
    /// whether the node was created.
    fn find_or_create_target_child(
        &mut self,
        parent: NodeIndex,
        target: &ScenePath,
        original_target: ScenePath,
    ) -> Result<(NodeIndex, bool), SimulationError> {
        let key = NodeKey::Target(target.clone());
        let (existing, parent_original) = {
            let parent_node = self
                .node(parent)
                .ok_or_else(|| SimulationError::Desync { path: target.clone() })?;
            (
                parent_node.children.get(&key).copied(),
                parent_node.original_path.clone(),
            )
        };
        if let Some(child) = existing {
            return Ok((child, false));
        }
        let child = self.alloc(Node {
            key: key.clone(),
            parent: Some(parent),
            children: BTreeMap::new(),
            original_path: parent_original.append_target(original_target),
        });
        self.node_mut(parent)
            .ok_or_else(|| SimulationError::Desync { path: target.clone() })?
            .children
            .insert(key, child);
        Ok((child, true))
    }

    fn remove(&mut self, path: &ScenePath) -> Result<(), SimulationError> {
        trace!(%path, "simulate remove");
        let idx = self
            .get_node_at_path(path)
            .ok_or_else(|| SimulationError::NodeNotFound { path: path.clone() })?;
        self.detach(idx, path)?;
        self.destroy_subtree(idx);
        if self.fix_backpointers {
            self.backpointers.remove_subtree(path);
        }
        self.deadspace.add(path);
        Ok(())
    }

    fn move_object(&mut self, current: &ScenePath, new: &ScenePath) -> Result<(), SimulationError> {
        trace!(from = %current, to = %new, "simulate move");
        let idx = self
            .get_node_at_path(current)
            .ok_or_else(|| SimulationError::NodeNotFound {
                path: current.clone(),
            })?;
        let new_parent_path = new.parent().ok_or(SimulationError::RootEdit)?;
        let parent_idx =
            self.get_node_at_path(&new_parent_path)
                .ok_or(SimulationError::ParentNotFound {
                    path: new_parent_path,
                })?;
        self.reparent(idx, parent_idx, current, new)?;
        if self.fix_backpointers {
            self.fix_backpointers_for(current, new)?;
        }
        // Add before remove so a move into the vacated space nets out.
        self.deadspace.add(current);
        self.deadspace.remove(new);
        Ok(())
    }

    /// Detaches the node from its parent. On failure nothing is changed.
    fn detach(&mut self, idx: NodeIndex, path: &ScenePath) -> Result<(), SimulationError> {
        let (parent_idx, key) = {
            let node = self
                .node(idx)
                .ok_or_else(|| SimulationError::Desync { path: path.clone() })?;
            match node.parent {
                Some(parent) => (parent, node.key.clone()),
                None => {
                    return Err(if matches!(node.key, NodeKey::Root) {
                        SimulationError::RootEdit
                    } else {
                        SimulationError::NodeDetached { path: path.clone() }
                    });
                }
            }
        };
        let parent = self
            .node_mut(parent_idx)
            .ok_or_else(|| SimulationError::Desync { path: path.clone() })?;
        match parent.children.remove(&key) {
            Some(found) if found == idx => {}
            Some(other) => {
                // Found the wrong node under this key; restore it and report.
                parent.children.insert(key, other);
                return Err(SimulationError::Desync { path: path.clone() });
            }
            None => return Err(SimulationError::Desync { path: path.clone() }),
        }
        if let Some(node) = self.node_mut(idx) {
            node.parent = None;
        }
        Ok(())
    }

    /// Clears the arena slots of `idx` and everything under it. Slots are
    /// never reused, so any handle into the destroyed subtree turns vacant
    /// and is recognised as stale by later lookups.
    fn destroy_subtree(&mut self, idx: NodeIndex) {
        let mut stack = vec![idx];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.arena.get_mut(cur.0).and_then(Option::take) {
                stack.extend(node.children.values().copied());
            }
        }
    }

    /// Detach-then-attach of `idx` under `parent_idx` with the key derived
    /// from `new`. Never copies nodes.
    fn reparent(
        &mut self,
        idx: NodeIndex,
        parent_idx: NodeIndex,
        current: &ScenePath,
        new: &ScenePath,
    ) -> Result<(), SimulationError> {
        let key = NodeKey::for_path(new);
        {
            let parent = self
                .node(parent_idx)
                .ok_or_else(|| SimulationError::Desync { path: new.clone() })?;
            if parent.children.contains_key(&key) {
                return Err(SimulationError::DestinationOccupied { path: new.clone() });
            }
        }
        {
            let node = self.node(idx).ok_or_else(|| SimulationError::Desync {
                path: current.clone(),
            })?;
            if node.parent.is_none() && !matches!(node.key, NodeKey::Root) {
                return Err(SimulationError::NodeDetached {
                    path: current.clone(),
                });
            }
        }
        self.detach(idx, current)?;
        if let Some(node) = self.node_mut(idx) {
            node.key = key.clone();
            node.parent = Some(parent_idx);
        }
        self.node_mut(parent_idx)
            .ok_or_else(|| SimulationError::Desync { path: new.clone() })?
            .children
            .insert(key, idx);
        Ok(())
    }

    /// Rewrites target-node keys recorded at or under `current` by literal
    /// prefix substitution and re-files the index entries under `new`.
    ///
    /// A key collision aborts with `TargetKeyCollision`; the simulation is
    /// left partially rewritten and must be discarded.
    fn fix_backpointers_for(
        &mut self,
        current: &ScenePath,
        new: &ScenePath,
    ) -> Result<(), SimulationError> {
        let taken = self.backpointers.take_subtree(current);
        for (key_path, nodes) in taken {
            let new_key_path = key_path.replace_prefix(current, new);
            let mut alive = FxHashSet::default();
            for node_idx in nodes {
                if self.rekey_target_node(node_idx, current, new)? {
                    alive.insert(node_idx);
                }
            }
            self.backpointers.merge(new_key_path, alive);
        }
        Ok(())
    }

    /// Rewrites one target node's key. `Ok(false)` means the handle was
    /// stale (node destroyed earlier) and the caller drops it from the
    /// index. A sibling already keyed by the rewritten target is a
    /// collision, never a silent overwrite.
    fn rekey_target_node(
        &mut self,
        idx: NodeIndex,
        current: &ScenePath,
        new: &ScenePath,
    ) -> Result<bool, SimulationError> {
        let Some(node) = self.node(idx) else {
            return Ok(false);
        };
        let NodeKey::Target(old_target) = node.key.clone() else {
            debug_assert!(false, "backpointer filed for a non-target node");
            return Ok(false);
        };
        let new_target = old_target.replace_prefix_literal(current, new);
        if new_target == old_target {
            return Ok(true);
        }
        let new_key = NodeKey::Target(new_target.clone());
        // Re-file in the parent's child map so later lookups see the new key.
        if let Some(parent_idx) = self.node(idx).and_then(|node| node.parent) {
            let occupied = self
                .node(parent_idx)
                .is_some_and(|parent| parent.children.contains_key(&new_key));
            if occupied {
                return Err(SimulationError::TargetKeyCollision { path: new_target });
            }
            let old_key = NodeKey::Target(old_target);
            if let Some(parent) = self.node_mut(parent_idx) {
                if let Some(child) = parent.children.remove(&old_key) {
                    debug_assert!(child == idx, "child map desync while re-keying a target");
                    parent.children.insert(new_key.clone(), child);
                }
            }
        }
        if let Some(node) = self.node_mut(idx) {
            node.key = new_key;
        }
        Ok(true)
    }
}
