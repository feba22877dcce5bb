// SPDX-License-Identifier: Apache-2.0
//! The [`ScenePath`] type: an absolute path into the scene namespace.

use std::fmt;

use crate::PathComponent;

/// An absolute path into a hierarchical scene namespace.
///
/// The root path has no components and prints as `/`. All other paths are
/// built from prim, property, and target components (see [`PathComponent`]).
/// There is no "empty path" value; APIs that can fail to produce a path
/// return `Option<ScenePath>`.
///
/// The derived `Ord` is lexicographic over the component list, which makes
/// subtrees contiguous in ordered containers (see the crate docs).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenePath {
    components: Vec<PathComponent>,
}

impl ScenePath {
    /// The namespace root, `/`.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub(crate) fn from_components(components: Vec<PathComponent>) -> Self {
        Self { components }
    }

    /// Returns `true` for the namespace root.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The component list, root-to-leaf.
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// The final component, if this is not the root.
    pub fn last_component(&self) -> Option<&PathComponent> {
        self.components.last()
    }

    /// The name of the final component (prim and property paths).
    pub fn name(&self) -> Option<&str> {
        self.components.last().and_then(PathComponent::name)
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.components.is_empty() {
            return None;
        }
        Some(Self {
            components: self.components[..self.components.len() - 1].to_vec(),
        })
    }

    /// Iterates the non-root prefixes of this path, shortest first, ending
    /// with the path itself. The root yields nothing.
    pub fn prefixes(&self) -> impl Iterator<Item = Self> + '_ {
        (1..=self.components.len()).map(move |n| Self {
            components: self.components[..n].to_vec(),
        })
    }

    /// Returns `true` when `prefix` is a (non-strict) prefix of this path.
    ///
    /// Every path has itself and the root as prefixes.
    pub fn has_prefix(&self, prefix: &Self) -> bool {
        self.components.len() >= prefix.components.len()
            && self.components[..prefix.components.len()] == prefix.components[..]
    }

    /// Appends a prim component.
    pub fn append_prim(&self, name: &str) -> Self {
        self.append(PathComponent::Prim(name.to_owned()))
    }

    /// Appends a property component.
    pub fn append_property(&self, name: &str) -> Self {
        self.append(PathComponent::Property(name.to_owned()))
    }

    /// Appends a target component keyed by `target`.
    pub fn append_target(&self, target: Self) -> Self {
        self.append(PathComponent::Target(target))
    }

    fn append(&self, component: PathComponent) -> Self {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend_from_slice(&self.components);
        components.push(component);
        Self { components }
    }

    /// Replaces the name of the final component, keeping its kind.
    ///
    /// Returns `None` for the root and for target paths, which have no name
    /// to replace.
    pub fn replace_name(&self, name: &str) -> Option<Self> {
        let replaced = match self.components.last()? {
            PathComponent::Prim(_) => PathComponent::Prim(name.to_owned()),
            PathComponent::Property(_) => PathComponent::Property(name.to_owned()),
            PathComponent::Target(_) => return None,
        };
        let mut components = self.components.clone();
        if let Some(slot) = components.last_mut() {
            *slot = replaced;
        }
        Some(Self { components })
    }

    /// Rewrites this path, substituting `new` for the leading `old` prefix
    /// and fixing up any target sub-keys that themselves start with `old`.
    ///
    /// Paths that do not start with `old` keep their outer components but
    /// still get their target sub-keys fixed.
    pub fn replace_prefix(&self, old: &Self, new: &Self) -> Self {
        let fix = |component: &PathComponent| match component {
            PathComponent::Target(target) => {
                PathComponent::Target(target.replace_prefix(old, new))
            }
            other => other.clone(),
        };
        if self.has_prefix(old) {
            let mut components = new.components.clone();
            components.extend(self.components[old.components.len()..].iter().map(fix));
            Self { components }
        } else {
            Self {
                components: self.components.iter().map(fix).collect(),
            }
        }
    }

    /// Rewrites only the outer prefix, leaving target sub-keys untouched.
    ///
    /// Returns the path unchanged when it does not start with `old`.
    pub fn replace_prefix_literal(&self, old: &Self, new: &Self) -> Self {
        if !self.has_prefix(old) {
            return self.clone();
        }
        let mut components = new.components.clone();
        components.extend_from_slice(&self.components[old.components.len()..]);
        Self { components }
    }

    /// Collects every target path reachable from this path, recursively:
    /// target sub-keys, targets inside those targets, and so on.
    pub fn all_target_paths(&self) -> Vec<Self> {
        let mut out = Vec::new();
        self.collect_target_paths(&mut out);
        out
    }

    fn collect_target_paths(&self, out: &mut Vec<Self>) {
        for component in &self.components {
            if let PathComponent::Target(target) = component {
                out.push(target.clone());
                target.collect_target_paths(out);
            }
        }
    }

    /// Returns `true` for non-root paths made entirely of prim components.
    pub fn is_prim_path(&self) -> bool {
        !self.components.is_empty() && self.components.iter().all(PathComponent::is_prim)
    }

    /// Returns `true` when the final component is a property.
    pub fn is_property_path(&self) -> bool {
        self.components
            .last()
            .is_some_and(PathComponent::is_property)
    }

    /// Returns `true` when the final component is a target sub-key.
    pub fn is_target_path(&self) -> bool {
        self.components.last().is_some_and(PathComponent::is_target)
    }

    /// The target path of the final component, when this is a target path.
    pub fn target_path(&self) -> Option<&Self> {
        self.components.last().and_then(PathComponent::target)
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}
