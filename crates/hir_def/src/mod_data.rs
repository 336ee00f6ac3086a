//! [`ModData`]: per-module mutable state collected while building a
//! [`crate::def_map::CrateDefMap`].

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ids::{CrateId, FileId, LocalModuleId, Name};
use crate::item_tree::MacroDefInfo;
use crate::path::ModPath;
use crate::per_ns::PerNs;
use crate::visibility::Visibility;

/// One of the three namespaces, used only to track which slots a glob import
/// populated (see [`ModData::push_resolution`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Ns {
    Types,
    Values,
    Macros,
}

/// Per-module state. Owned by a [`crate::def_map::CrateDefMap`]'s arena;
/// `parent` and `children` are indices into that same arena, never owning
/// references, so the parent/child cycle never needs `Rc`.
#[derive(Debug)]
pub struct ModData {
    pub parent: Option<LocalModuleId>,
    pub krate: CrateId,
    pub path: ModPath,
    pub file_id: Option<FileId>,
    /// Path to this module *within* its owning file, e.g. `["inner"]` for a
    /// module nested one level via `mod inner { .. }`. Empty iff this
    /// `ModData` *is* a file (a crate-root module or an out-of-line `mod
    /// foo;`).
    pub file_relative_path: Vec<Name>,
    /// Set for the pseudo-module standing in for an enum's variant scope —
    /// a further path segment descends into it exactly like a module, but
    /// it never owns a file and its `child_modules` is always empty.
    pub is_enum: bool,
    pub is_deeply_enabled_by_cfg: bool,
    pub is_shadowed_by_other_file: bool,

    pub visible_items: FxHashMap<Name, PerNs>,
    pub child_modules: FxHashMap<Name, LocalModuleId>,
    pub legacy_macros: FxHashMap<Name, MacroDefInfo>,
    pub unnamed_trait_imports: FxHashMap<ModPath, Visibility>,

    /// `(name, namespace)` pairs whose current `visible_items` slot came
    /// from a glob, not a named import or a local definition. A later named
    /// import for the same slot always wins; a later glob never overwrites
    /// a named one.
    from_glob: FxHashSet<(Name, Ns)>,
}

impl ModData {
    pub fn new(krate: CrateId, path: ModPath, parent: Option<LocalModuleId>) -> ModData {
        ModData {
            parent,
            krate,
            path,
            file_id: None,
            file_relative_path: Vec::new(),
            is_enum: false,
            is_deeply_enabled_by_cfg: true,
            is_shadowed_by_other_file: false,
            visible_items: FxHashMap::default(),
            child_modules: FxHashMap::default(),
            legacy_macros: FxHashMap::default(),
            unnamed_trait_imports: FxHashMap::default(),
            from_glob: FxHashSet::default(),
        }
    }

    /// Look up `name` in this module's own scope — not the extern prelude,
    /// not the language prelude, not legacy macro scope.
    pub fn get(&self, name: &Name) -> PerNs {
        self.visible_items.get(name).cloned().unwrap_or_default()
    }

    pub fn get_legacy_macro(&self, name: &Name) -> Option<&MacroDefInfo> {
        self.legacy_macros.get(name)
    }

    pub fn push_unnamed_trait(&mut self, trait_path: ModPath, visibility: Visibility) {
        let slot = self.unnamed_trait_imports.entry(trait_path).or_insert_with(|| visibility.clone());
        if visibility.is_strictly_more_permissive_than(slot) {
            *slot = visibility;
        }
    }

    /// Add a binding to this module's scope, applying shadowing: a named
    /// import or a local definition (`from_glob == false`) always overwrites
    /// a glob-sourced binding for the same name and namespace; two bindings
    /// of the same provenance merge by taking the more permissive visibility;
    /// a glob never overwrites an existing named one.
    pub fn push_resolution(&mut self, name: Name, incoming: PerNs, from_glob: bool) {
        self.push_slot(&name, incoming.types, Ns::Types, from_glob);
        self.push_slot(&name, incoming.values, Ns::Values, from_glob);
        self.push_slot(&name, incoming.macros, Ns::Macros, from_glob);
    }

    fn push_slot(&mut self, name: &Name, incoming: Option<crate::visibility::VisItem>, ns: Ns, from_glob: bool) {
        let incoming = match incoming {
            Some(it) => it,
            None => return,
        };
        let was_from_glob = self.from_glob.contains(&(name.clone(), ns));
        let entry = self.visible_items.entry(name.clone()).or_default();
        let slot = match ns {
            Ns::Types => &mut entry.types,
            Ns::Values => &mut entry.values,
            Ns::Macros => &mut entry.macros,
        };
        match slot {
            None => {
                *slot = Some(incoming);
                if from_glob {
                    self.from_glob.insert((name.clone(), ns));
                }
            }
            Some(current) => {
                if was_from_glob && !from_glob {
                    *current = incoming;
                    self.from_glob.remove(&(name.clone(), ns));
                } else if was_from_glob == from_glob && incoming.visibility.is_strictly_more_permissive_than(&current.visibility) {
                    *current = incoming;
                }
                // `!was_from_glob && from_glob`: an existing named binding beats an incoming glob — ignore it.
            }
        }
    }
}
