// SPDX-License-Identifier: Apache-2.0
//! Path components: the tagged-union element of a [`ScenePath`].

use std::fmt;

use crate::ScenePath;

/// One element of a scene path.
///
/// The derived ordering is lexicographic over (discriminant, payload):
/// all prim components sort before all property components, which sort
/// before all target components. This single total order is what keeps
/// subtrees contiguous in ordered containers keyed by paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathComponent {
    /// A named prim child (`/Name`).
    Prim(String),
    /// A named property of a prim or of a relationship target (`.name`).
    Property(String),
    /// A target sub-key: another path held as a key (`[/path]`), used for
    /// relationship/connection target lists.
    Target(ScenePath),
}

impl PathComponent {
    /// The component's name, when it has one (prim and property components).
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Prim(name) | Self::Property(name) => Some(name),
            Self::Target(_) => None,
        }
    }

    /// The target path, when this is a target component.
    pub fn target(&self) -> Option<&ScenePath> {
        match self {
            Self::Target(path) => Some(path),
            Self::Prim(_) | Self::Property(_) => None,
        }
    }

    /// Returns `true` for prim components.
    pub fn is_prim(&self) -> bool {
        matches!(self, Self::Prim(_))
    }

    /// Returns `true` for property components.
    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(_))
    }

    /// Returns `true` for target components.
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target(_))
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prim(name) => write!(f, "/{name}"),
            Self::Property(name) => write!(f, ".{name}"),
            Self::Target(path) => write!(f, "[{path}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_order_is_discriminant_then_payload() {
        let prim = PathComponent::Prim("zebra".into());
        let prop = PathComponent::Property("aardvark".into());
        let target = PathComponent::Target(ScenePath::root());
        assert!(prim < prop, "prims sort before properties regardless of name");
        assert!(prop < target, "properties sort before targets");
        assert!(PathComponent::Prim("a".into()) < PathComponent::Prim("b".into()));
    }
}
