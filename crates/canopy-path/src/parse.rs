// SPDX-License-Identifier: Apache-2.0
//! Text form parsing for [`ScenePath`].
//!
//! The grammar is the slash/dot/bracket syntax used throughout canopy's
//! diagnostics: `/` for the root, `/Name` prim components, `.name` property
//! components, and `[/path]` target sub-keys (which nest). Identifiers are
//! ASCII `[A-Za-z_][A-Za-z0-9_]*`.

use thiserror::Error;

use crate::{PathComponent, ScenePath};

/// Error produced when parsing a path from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathParseError {
    /// The input was empty.
    #[error("path is empty")]
    Empty,
    /// The input did not start with `/`.
    #[error("path must be absolute (expected '/' at byte {0})")]
    NotAbsolute(usize),
    /// An identifier was missing or started with an invalid character.
    #[error("invalid identifier at byte {0}")]
    InvalidIdentifier(usize),
    /// A prim component appeared after a property or target component.
    #[error("prim component after property at byte {0}")]
    PrimAfterProperty(usize),
    /// A property component appeared somewhere it cannot attach.
    #[error("property component must follow a prim or target at byte {0}")]
    MisplacedProperty(usize),
    /// A target sub-key appeared without a preceding property.
    #[error("target component must follow a property at byte {0}")]
    TargetWithoutProperty(usize),
    /// A `[` was never closed.
    #[error("unclosed target bracket at byte {0}")]
    UnclosedBracket(usize),
    /// Trailing or unexpected input.
    #[error("unexpected character at byte {0}")]
    UnexpectedCharacter(usize),
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn identifier(&mut self) -> Result<String, PathParseError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(PathParseError::InvalidIdentifier(start)),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Identifier bytes were checked ASCII above, so the slice is valid UTF-8.
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    /// Parses one absolute path. In a nested (bracketed) position the walk
    /// stops at the closing `]` without consuming it.
    fn path(&mut self) -> Result<ScenePath, PathParseError> {
        if self.peek() != Some(b'/') {
            return Err(PathParseError::NotAbsolute(self.pos));
        }
        let mut components: Vec<PathComponent> = Vec::new();
        loop {
            match self.peek() {
                Some(b'/') => {
                    let at = self.pos;
                    self.pos += 1;
                    // A bare `/` is the root path.
                    if components.is_empty() && matches!(self.peek(), None | Some(b']')) {
                        break;
                    }
                    match components.last() {
                        None | Some(PathComponent::Prim(_)) => {
                            components.push(PathComponent::Prim(self.identifier()?));
                        }
                        Some(_) => return Err(PathParseError::PrimAfterProperty(at)),
                    }
                }
                Some(b'.') => {
                    let at = self.pos;
                    self.pos += 1;
                    match components.last() {
                        Some(PathComponent::Prim(_) | PathComponent::Target(_)) => {
                            components.push(PathComponent::Property(self.identifier()?));
                        }
                        _ => return Err(PathParseError::MisplacedProperty(at)),
                    }
                }
                Some(b'[') => {
                    let at = self.pos;
                    self.pos += 1;
                    if !matches!(components.last(), Some(PathComponent::Property(_))) {
                        return Err(PathParseError::TargetWithoutProperty(at));
                    }
                    let target = self.path()?;
                    if self.peek() != Some(b']') {
                        return Err(PathParseError::UnclosedBracket(at));
                    }
                    self.pos += 1;
                    components.push(PathComponent::Target(target));
                }
                Some(b']') | None => break,
                Some(_) => return Err(PathParseError::UnexpectedCharacter(self.pos)),
            }
        }
        Ok(ScenePath::from_components(components))
    }
}

impl std::str::FromStr for ScenePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }
        let mut parser = Parser::new(s);
        let path = parser.path()?;
        if parser.pos != parser.bytes.len() {
            return Err(PathParseError::UnexpectedCharacter(parser.pos));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn roundtrip(s: &str) {
        let path = ScenePath::from_str(s).unwrap_or_else(|e| unreachable!("parse {s}: {e}"));
        assert_eq!(path.to_string(), s);
    }

    #[test]
    fn parse_display_roundtrip() {
        roundtrip("/");
        roundtrip("/World");
        roundtrip("/World/Ball");
        roundtrip("/World/Ball.radius");
        roundtrip("/Rig.targets[/World/Ball]");
        roundtrip("/Rig.targets[/World/Ball].weight");
        roundtrip("/A.r[/B.s[/C].t].u");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(ScenePath::from_str(""), Err(PathParseError::Empty));
        assert_eq!(
            ScenePath::from_str("World"),
            Err(PathParseError::NotAbsolute(0))
        );
        assert_eq!(
            ScenePath::from_str("/World/"),
            Err(PathParseError::InvalidIdentifier(7))
        );
        assert_eq!(
            ScenePath::from_str("/World.a.b"),
            Err(PathParseError::MisplacedProperty(8))
        );
        assert_eq!(
            ScenePath::from_str("/A.x/B"),
            Err(PathParseError::PrimAfterProperty(4))
        );
        assert_eq!(
            ScenePath::from_str("/A[/B]"),
            Err(PathParseError::TargetWithoutProperty(2))
        );
        assert_eq!(
            ScenePath::from_str("/A.x[/B"),
            Err(PathParseError::UnclosedBracket(4))
        );
        assert_eq!(
            ScenePath::from_str("/A.x]"),
            Err(PathParseError::UnexpectedCharacter(4))
        );
        assert_eq!(
            ScenePath::from_str("/9abc"),
            Err(PathParseError::InvalidIdentifier(1))
        );
    }

    #[test]
    fn root_inside_target_brackets() {
        let path = ScenePath::from_str("/A.x[/]").unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(path.to_string(), "/A.x[/]");
        assert!(path.target_path().is_some_and(ScenePath::is_root));
    }
}
