//! Hierarchical prim paths
//!
//! A [`PrimPath`] is an absolute, `/`-separated address such as
//! `/MyScene/shape0`. Every element must be a valid identifier (ASCII
//! letter or underscore first, then letters, digits or underscores).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// An absolute path to a prim
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimPath(String);

impl PrimPath {
    /// Parse and validate an absolute prim path
    pub fn new(path: impl Into<String>) -> Result<Self, StageError> {
        let path = path.into();
        let Some(rest) = path.strip_prefix('/') else {
            return Err(StageError::InvalidPath(path));
        };
        if rest.is_empty() || !rest.split('/').all(is_identifier) {
            return Err(StageError::InvalidPath(path));
        }
        Ok(Self(path))
    }

    /// Path of a root-level prim named `name`
    pub fn root_child(name: &str) -> Result<Self, StageError> {
        Self::new(format!("/{}", name))
    }

    /// Path of the child `name` under this path
    pub fn child(&self, name: &str) -> Result<Self, StageError> {
        if !is_identifier(name) {
            return Err(StageError::InvalidPath(format!("{}/{}", self.0, name)));
        }
        Ok(Self(format!("{}/{}", self.0, name)))
    }

    /// Append a relative path (`"A/B"`); an empty string returns `self`
    pub fn join(&self, relative: &str) -> Result<Self, StageError> {
        if relative.is_empty() {
            return Ok(self.clone());
        }
        Self::new(format!("{}/{}", self.0, relative))
    }

    /// The final path element
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The parent path, or `None` for a root-level prim
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            None
        } else {
            Some(Self(self.0[..idx].to_string()))
        }
    }

    /// Number of path elements (`/A` is 1, `/A/B` is 2)
    pub fn depth(&self) -> usize {
        self.0.matches('/').count()
    }

    /// True when `self` equals `ancestor` or lies beneath it
    pub fn has_prefix(&self, ancestor: &PrimPath) -> bool {
        self.relative_to(ancestor).is_some()
    }

    /// The relative path from `ancestor` to `self`
    ///
    /// Returns `Some("")` when the paths are equal and `None` when
    /// `ancestor` is not an ancestor of `self`.
    pub fn relative_to(&self, ancestor: &PrimPath) -> Option<&str> {
        let rest = self.0.strip_prefix(ancestor.0.as_str())?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix('/')
        }
    }

    /// Self followed by every ancestor, nearest first
    pub fn ancestors_inclusive(&self) -> Vec<PrimPath> {
        let mut out = vec![self.clone()];
        let mut current = self.parent();
        while let Some(p) = current {
            current = p.parent();
            out.push(p);
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PrimPath {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PrimPath {
    type Error = StageError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PrimPath> for String {
    fn from(p: PrimPath) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    #[test]
    fn test_valid_paths() {
        assert!(PrimPath::new("/MyScene").is_ok());
        assert!(PrimPath::new("/MyScene/shape0").is_ok());
        assert!(PrimPath::new("/_private/Mesh_1").is_ok());
    }

    #[test]
    fn test_invalid_paths() {
        for bad in ["", "/", "MyScene", "/MyScene/", "/My Scene", "/0abc", "//A"] {
            assert!(
                matches!(PrimPath::new(bad), Err(StageError::InvalidPath(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_name_and_parent() {
        let p = path("/MySphere/MeshData");
        assert_eq!(p.name(), "MeshData");
        assert_eq!(p.parent(), Some(path("/MySphere")));
        assert_eq!(path("/MySphere").parent(), None);
        assert_eq!(p.depth(), 2);
    }

    #[test]
    fn test_child_and_join() {
        let root = path("/MyScene");
        assert_eq!(root.child("shape3").unwrap(), path("/MyScene/shape3"));
        assert!(root.child("bad name").is_err());
        assert_eq!(root.join("").unwrap(), root);
        assert_eq!(root.join("a/b").unwrap(), path("/MyScene/a/b"));
    }

    #[test]
    fn test_relative_to() {
        let p = path("/MyScene/shape1/MeshData");
        assert_eq!(p.relative_to(&path("/MyScene")), Some("shape1/MeshData"));
        assert_eq!(p.relative_to(&p), Some(""));
        assert_eq!(p.relative_to(&path("/Other")), None);
        // Shared string prefix is not a path prefix
        assert_eq!(path("/MyScene/shape10").relative_to(&path("/MyScene/shape1")), None);
    }

    #[test]
    fn test_ancestors_inclusive() {
        let p = path("/A/B/C");
        assert_eq!(p.ancestors_inclusive(), vec![path("/A/B/C"), path("/A/B"), path("/A")]);
    }

    #[test]
    fn test_serde_as_string() {
        let p = path("/MyCube");
        let s = ron::to_string(&p).unwrap();
        assert_eq!(s, "\"/MyCube\"");
        let back: PrimPath = ron::from_str(&s).unwrap();
        assert_eq!(back, p);
        assert!(ron::from_str::<PrimPath>("\"relative\"").is_err());
    }
}
