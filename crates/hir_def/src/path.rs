//! Path types.
//!
//! Two distinct shapes show up under the name "path" in this crate:
//!
//! - [`UsePath`]: the syntactic path written in a `use` item or a macro call,
//!   relative to whatever `kind` says it's relative to (`self`, `super`,
//!   `crate`, an absolute `::` root, `$crate` from macro hygiene, or nothing
//!   at all — a plain path). This is what the collector hands to path
//!   resolution.
//! - [`ModPath`]: the resolved, crate-anchored path a binding ultimately
//!   points at — a flat `(crate_id, segments)` pair with no notion of
//!   "relative to". This is what ends up in a [`crate::visibility::VisItem`].

use std::fmt;

use crate::ids::{CrateId, Name};

/// What a [`UsePath`]'s first segment is relative to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PathKind {
    /// No leading keyword or `::` — resolved per-edition.
    Plain,
    /// Leading `::` — 2018+ extern-prelude-only, 2015 crate-root-or-extern-prelude.
    Abs,
    /// Leading `crate`.
    Crate,
    /// Leading `self`.
    SelfModule,
    /// Leading `super` repeated `n` times (`super::super::x` has `n == 2`).
    Super(u32),
    /// `$crate` substituted by macro hygiene to name a specific crate.
    DollarCrate(CrateId),
}

/// A syntactic path as written in a `use` item or macro call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UsePath {
    pub kind: PathKind,
    pub segments: Vec<Name>,
}

impl UsePath {
    pub fn plain(segments: Vec<Name>) -> UsePath {
        UsePath { kind: PathKind::Plain, segments }
    }

    pub fn kind(kind: PathKind, segments: Vec<Name>) -> UsePath {
        UsePath { kind, segments }
    }

    /// The single segment this path consists of, if it has no prefix and
    /// exactly one segment (`extern crate` paths are always of this shape).
    pub fn as_ident(&self) -> Option<&Name> {
        if self.kind != PathKind::Plain || self.segments.len() != 1 {
            return None;
        }
        self.segments.first()
    }

    pub fn is_ident(&self) -> bool {
        self.kind == PathKind::Plain && self.segments.len() == 1
    }
}

/// A resolved, crate-anchored path: where a binding ultimately lives.
///
/// Two `ModPath`s are equal iff both the crate and the segments match.
/// Empty segments denote the crate root, which displays as `"crate"`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ModPath {
    crate_id: CrateId,
    segments: Vec<Name>,
}

impl ModPath {
    pub fn new(crate_id: CrateId, segments: Vec<Name>) -> ModPath {
        ModPath { crate_id, segments }
    }

    pub fn crate_root(crate_id: CrateId) -> ModPath {
        ModPath { crate_id, segments: Vec::new() }
    }

    pub fn krate(&self) -> CrateId {
        self.crate_id
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    /// The last segment, or `None` for the crate root.
    pub fn name(&self) -> Option<&Name> {
        self.segments.last()
    }

    /// The path one level up, or `None` if this already is the crate root.
    pub fn parent(&self) -> Option<ModPath> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(ModPath { crate_id: self.crate_id, segments })
    }

    pub fn push(&self, segment: Name) -> ModPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        ModPath { crate_id: self.crate_id, segments }
    }

    /// Holds iff `self` and `other` name the same crate and `self`'s
    /// segments are a prefix of `other`'s (the crate root is a sub-path of
    /// everything in its own crate, including itself).
    pub fn is_sub_path_of(&self, other: &ModPath) -> bool {
        self.crate_id == other.crate_id
            && other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Debug for ModPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for ModPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "crate");
        }
        write!(f, "crate")?;
        for segment in &self.segments {
            write!(f, "::{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> ModPath {
        ModPath::new(CrateId(0), segments.iter().map(|s| Name::new(s)).collect())
    }

    #[test]
    fn root_displays_as_crate() {
        assert_eq!(format!("{}", ModPath::crate_root(CrateId(0))), "crate");
    }

    #[test]
    fn display_joins_with_double_colon() {
        assert_eq!(format!("{}", path(&["a", "b"])), "crate::a::b");
    }

    #[test]
    fn sub_path_prefix_in_same_crate() {
        assert!(path(&["a"]).is_sub_path_of(&path(&["a", "b"])));
        assert!(!path(&["a", "b"]).is_sub_path_of(&path(&["a"])));
        assert!(!path(&["x"]).is_sub_path_of(&path(&["a", "b"])));
    }

    #[test]
    fn different_crate_never_subpath() {
        let a = ModPath::new(CrateId(0), vec![Name::new("a")]);
        let b = ModPath::new(CrateId(1), vec![Name::new("a"), Name::new("b")]);
        assert!(!a.is_sub_path_of(&b));
    }

    #[test]
    fn parent_and_name() {
        let p = path(&["a", "b"]);
        assert_eq!(p.name().unwrap().as_str(), "b");
        let parent = p.parent().unwrap();
        assert_eq!(parent.name().unwrap().as_str(), "a");
        assert!(parent.parent().unwrap().name().is_none());
    }
}
