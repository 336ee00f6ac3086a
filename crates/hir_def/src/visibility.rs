//! Visibility and the binding of a name to an item ([`VisItem`]).

use std::cmp::Ordering;

use crate::ids::{CrateId, ModuleId};
use crate::path::ModPath;

/// How visible a binding is from some other module.
///
/// Ordered, from least to most permissive: `CfgDisabled < Invisible <
/// Restricted(inner) < Restricted(outer of same crate) < Public`. Two
/// `Restricted` visibilities in different crates are incomparable.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Visibility {
    /// Visible everywhere.
    Public,
    /// Visible only from modules whose path has `in_mod`'s path as a prefix.
    /// An ordinary private item is `Restricted` to its enclosing module.
    Restricted { in_mod: ModPath },
    /// An import pointing at something private to the importer: not in
    /// scope for resolution, but retained so completion can still see it.
    Invisible,
    /// Disabled by a `#[cfg(..)]` the host evaluated to false.
    CfgDisabled,
}

impl Visibility {
    pub fn private(in_mod: ModPath) -> Visibility {
        Visibility::Restricted { in_mod }
    }

    /// Total order rank used to compare visibilities that aren't both
    /// `Restricted` (where the comparison needs the module tree instead).
    fn rank(&self) -> u8 {
        match self {
            Visibility::CfgDisabled => 0,
            Visibility::Invisible => 1,
            Visibility::Restricted { .. } => 2,
            Visibility::Public => 3,
        }
    }

    /// Is `self` strictly more permissive than `other`?
    ///
    /// For two `Restricted` visibilities in the same crate, the one
    /// restricted to the shallower (more-ancestral) module is the more
    /// permissive one: its reach — the set of modules whose path has
    /// `in_mod`'s path as a prefix — is a superset of the deeper module's
    /// reach. Restricted visibilities in different crates are incomparable.
    pub fn is_strictly_more_permissive_than(&self, other: &Visibility) -> bool {
        match (self, other) {
            (Visibility::Restricted { in_mod: a }, Visibility::Restricted { in_mod: b }) => {
                a.krate() == b.krate() && a != b && a.is_sub_path_of(b)
            }
            _ => self.rank() > other.rank(),
        }
    }

    /// Can a module whose path is `from` see a binding with this visibility?
    /// `Restricted` in a different crate than `from` is never visible —
    /// there is no path from another crate into a `pub(in ..)` scope.
    pub fn is_visible_from(&self, from: &ModPath) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Restricted { in_mod } => in_mod.is_sub_path_of(from),
            Visibility::Invisible | Visibility::CfgDisabled => false,
        }
    }

    /// `None` when the two are incomparable (different-crate `Restricted`
    /// values); otherwise the usual three-way comparison.
    pub fn partial_cmp(&self, other: &Visibility) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        if self.is_strictly_more_permissive_than(other) {
            return Some(Ordering::Greater);
        }
        if other.is_strictly_more_permissive_than(self) {
            return Some(Ordering::Less);
        }
        None
    }
}

/// The binding of a name to an item: where it points, how visible that
/// binding is, and — if the target can host child items (a module, or an
/// enum represented as a [`crate::mod_data::ModData`] with `is_enum` set) —
/// which one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VisItem {
    pub path: ModPath,
    pub visibility: Visibility,
    pub module: Option<ModuleId>,
}

impl VisItem {
    pub fn new(path: ModPath, visibility: Visibility, module: Option<ModuleId>) -> VisItem {
        VisItem { path, visibility, module }
    }

    pub fn krate(&self) -> CrateId {
        self.path.krate()
    }

    pub fn is_mod_or_enum(&self) -> bool {
        self.module.is_some()
    }

    pub fn with_visibility(&self, visibility: Visibility) -> VisItem {
        VisItem { path: self.path.clone(), visibility, module: self.module }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Name;

    fn path(segs: &[&str]) -> ModPath {
        ModPath::new(CrateId(0), segs.iter().map(|s| Name::new(s)).collect())
    }

    #[test]
    fn public_beats_everything() {
        assert!(Visibility::Public.is_strictly_more_permissive_than(&Visibility::Invisible));
        assert!(Visibility::Public
            .is_strictly_more_permissive_than(&Visibility::Restricted { in_mod: path(&["a"]) }));
        assert!(Visibility::Public.is_strictly_more_permissive_than(&Visibility::CfgDisabled));
    }

    #[test]
    fn outer_restricted_beats_inner_restricted() {
        let outer = Visibility::Restricted { in_mod: path(&["a"]) };
        let inner = Visibility::Restricted { in_mod: path(&["a", "b"]) };
        assert!(outer.is_strictly_more_permissive_than(&inner));
        assert!(!inner.is_strictly_more_permissive_than(&outer));
    }

    #[test]
    fn unrelated_restricted_incomparable() {
        let a = Visibility::Restricted { in_mod: path(&["a"]) };
        let b = Visibility::Restricted { in_mod: path(&["b"]) };
        assert!(!a.is_strictly_more_permissive_than(&b));
        assert!(!b.is_strictly_more_permissive_than(&a));
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn invisible_beats_cfg_disabled_only() {
        assert!(Visibility::Invisible.is_strictly_more_permissive_than(&Visibility::CfgDisabled));
        assert!(!Visibility::Invisible
            .is_strictly_more_permissive_than(&Visibility::Restricted { in_mod: path(&["a"]) }));
    }
}
