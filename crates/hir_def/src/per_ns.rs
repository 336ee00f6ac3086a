//! [`PerNs`]: one slot per namespace.

use crate::visibility::{Visibility, VisItem};

/// A binding's presence in each of the three namespaces. A name can be bound
/// to a different item in each namespace at once (`struct Foo` plus `fn
/// Foo()` plus `macro_rules! Foo` would all coexist).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PerNs {
    pub types: Option<VisItem>,
    pub values: Option<VisItem>,
    pub macros: Option<VisItem>,
}

impl PerNs {
    pub fn none() -> PerNs {
        PerNs::default()
    }

    pub fn types(item: VisItem) -> PerNs {
        PerNs { types: Some(item), values: None, macros: None }
    }

    pub fn values(item: VisItem) -> PerNs {
        PerNs { types: None, values: Some(item), macros: None }
    }

    pub fn macros(item: VisItem) -> PerNs {
        PerNs { types: None, values: None, macros: Some(item) }
    }

    pub fn both(types: VisItem, values: VisItem) -> PerNs {
        PerNs { types: Some(types), values: Some(values), macros: None }
    }

    pub fn is_none(&self) -> bool {
        self.types.is_none() && self.values.is_none() && self.macros.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.types.is_some() && self.values.is_some() && self.macros.is_some()
    }

    /// How many of the three slots are populated — the collector uses this
    /// to tell a fully-resolved import (3) from one that's only partly there
    /// and might still gain a namespace on a later pass (1 or 2).
    pub fn populated_count(&self) -> u8 {
        self.types.is_some() as u8 + self.values.is_some() as u8 + self.macros.is_some() as u8
    }

    /// Componentwise fallback: `self`'s slot wins wherever it is populated,
    /// `other`'s fills in the rest.
    pub fn or(self, other: PerNs) -> PerNs {
        PerNs {
            types: self.types.or(other.types),
            values: self.values.or(other.values),
            macros: self.macros.or(other.macros),
        }
    }

    /// Componentwise merge: where both sides populate a namespace, the more
    /// permissive visibility wins; ties keep `self`'s item.
    pub fn update(self, other: PerNs) -> PerNs {
        PerNs {
            types: merge_slot(self.types, other.types),
            values: merge_slot(self.values, other.values),
            macros: merge_slot(self.macros, other.macros),
        }
    }

    pub fn filter_visibility(self, mut predicate: impl FnMut(&Visibility) -> bool) -> PerNs {
        PerNs {
            types: self.types.filter(|it| predicate(&it.visibility)),
            values: self.values.filter(|it| predicate(&it.visibility)),
            macros: self.macros.filter(|it| predicate(&it.visibility)),
        }
    }

    pub fn with_visibility(self, visibility: Visibility) -> PerNs {
        PerNs {
            types: self.types.map(|it| it.with_visibility(visibility.clone())),
            values: self.values.map(|it| it.with_visibility(visibility.clone())),
            macros: self.macros.map(|it| it.with_visibility(visibility)),
        }
    }

    pub fn map_items(self, mut f: impl FnMut(VisItem) -> VisItem) -> PerNs {
        PerNs { types: self.types.map(&mut f), values: self.values.map(&mut f), macros: self.macros.map(&mut f) }
    }

    pub fn take_types(&self) -> Option<&VisItem> {
        self.types.as_ref()
    }

    pub fn take_macros(&self) -> Option<&VisItem> {
        self.macros.as_ref()
    }
}

fn merge_slot(a: Option<VisItem>, b: Option<VisItem>) -> Option<VisItem> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if b.visibility.is_strictly_more_permissive_than(&a.visibility) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CrateId, Name};
    use crate::path::ModPath;

    fn item(vis: Visibility) -> VisItem {
        VisItem::new(ModPath::new(CrateId(0), vec![Name::new("x")]), vis, None)
    }

    #[test]
    fn or_prefers_self() {
        let a = PerNs::types(item(Visibility::Public));
        let b = PerNs::values(item(Visibility::Invisible));
        let merged = a.or(b);
        assert!(merged.types.is_some());
        assert!(merged.values.is_some());
    }

    #[test]
    fn update_keeps_more_permissive() {
        let a = PerNs::types(item(Visibility::Invisible));
        let b = PerNs::types(item(Visibility::Public));
        let merged = a.update(b);
        assert_eq!(merged.types.unwrap().visibility, Visibility::Public);
    }

    #[test]
    fn empty_per_ns_is_none() {
        assert!(PerNs::none().is_none());
        assert!(!PerNs::types(item(Visibility::Public)).is_none());
    }
}
