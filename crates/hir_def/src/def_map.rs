//! [`CrateDefMap`]: the name-resolution result for one crate, and the path
//! resolver that both the collector and external callers use to query it.

use arena::Arena;
use rustc_hash::FxHashMap;

use crate::host::DependencyDefMaps;
use crate::ids::{CrateId, Edition, LocalModuleId, ModuleId, Name};
use crate::item_tree::MacroDefInfo;
use crate::mod_data::ModData;
use crate::path::{ModPath, PathKind, UsePath};
use crate::per_ns::PerNs;
use crate::visibility::{Visibility, VisItem};

/// Crate-scoped name resolution's output: every module's visible names, the
/// crate's extern prelude and language prelude, and any file the collector
/// expected but couldn't find.
pub struct CrateDefMap {
    pub krate: CrateId,
    pub edition: Edition,
    pub root: LocalModuleId,
    pub modules: Arena<ModData>,
    pub extern_prelude: FxHashMap<Name, ModuleId>,
    pub prelude: Option<ModuleId>,
    /// Relative paths probed for a `mod name;` or `include!` target that
    /// turned out not to exist.
    pub missed_files: Vec<String>,
    /// Every `macro_rules!` definition in this crate, keyed by its own
    /// canonical path (never the path it was re-exported or imported under —
    /// a [`VisItem`] in the macros namespace always carries that canonical
    /// path, re-export or not).
    pub macro_defs: FxHashMap<ModPath, MacroDefInfo>,
}

impl CrateDefMap {
    pub fn new(krate: CrateId, edition: Edition) -> CrateDefMap {
        let mut modules = Arena::new();
        let root = modules.alloc(ModData::new(krate, ModPath::crate_root(krate), None));
        CrateDefMap {
            krate,
            edition,
            root,
            modules,
            extern_prelude: FxHashMap::default(),
            prelude: None,
            missed_files: Vec::new(),
            macro_defs: FxHashMap::default(),
        }
    }

    /// Look up a macro's rules by its canonical definition path, wherever
    /// that path's crate is (this map, or a dependency's).
    pub fn get_macro_def<'a>(&'a self, deps: &DependencyDefMaps<'a>, path: &ModPath) -> Option<&'a MacroDefInfo> {
        if path.krate() == self.krate {
            self.macro_defs.get(path)
        } else {
            deps.get(&path.krate()).and_then(|dep| dep.macro_defs.get(path))
        }
    }

    pub fn root_module_id(&self) -> ModuleId {
        ModuleId { krate: self.krate, local_id: self.root }
    }

    pub fn module(&self, id: LocalModuleId) -> &ModData {
        &self.modules[id]
    }

    pub fn module_mut(&mut self, id: LocalModuleId) -> &mut ModData {
        &mut self.modules[id]
    }

    pub fn alloc_module(&mut self, parent: LocalModuleId, path: ModPath) -> LocalModuleId {
        let id = self.modules.alloc(ModData::new(self.krate, path, Some(parent)));
        id
    }

    /// Fetch a [`ModData`] that might live in a dependency's def map.
    pub fn get_module<'a>(&'a self, deps: &DependencyDefMaps<'a>, module: ModuleId) -> &'a ModData {
        if module.krate == self.krate {
            self.module(module.local_id)
        } else {
            deps[&module.krate].module(module.local_id)
        }
    }

    fn walk_supers(&self, start: LocalModuleId, hops: u32) -> Option<LocalModuleId> {
        let mut curr = start;
        for _ in 0..hops {
            curr = self.module(curr).parent?;
        }
        Some(curr)
    }

    fn extern_prelude_entry(&self, name: &Name) -> PerNs {
        match self.extern_prelude.get(name) {
            Some(&module) => {
                PerNs::types(VisItem::new(ModPath::crate_root(module.krate), Visibility::Public, Some(module)))
            }
            None => PerNs::none(),
        }
    }

    fn resolve_in_prelude<'a>(&'a self, deps: &DependencyDefMaps<'a>, name: &Name) -> PerNs {
        match self.prelude {
            Some(module) => self.get_module(deps, module).get(name),
            None => PerNs::none(),
        }
    }

    /// First segment of a [`PathKind::Plain`] path: 2018+ checks the
    /// originating module first (uniform paths), 2015 checks the crate root
    /// first; either way, the extern prelude and then the language prelude
    /// are the fallbacks. The `bool` reports whether the
    /// hit came from outside this crate (extern prelude or another crate's
    /// prelude module), which can never gain further namespaces later.
    fn resolve_plain_first_segment<'a>(
        &'a self,
        deps: &DependencyDefMaps<'a>,
        original_module: LocalModuleId,
        name: &Name,
    ) -> (PerNs, bool) {
        let from_scope = match self.edition {
            Edition::Edition2018 => self.module(original_module).get(name),
            Edition::Edition2015 => self.module(self.root).get(name),
        };
        if !from_scope.is_none() {
            return (from_scope, false);
        }
        let from_extern = self.extern_prelude_entry(name);
        if !from_extern.is_none() {
            return (from_extern, true);
        }
        let from_prelude = self.resolve_in_prelude(deps, name);
        let crossed = !from_prelude.is_none();
        (from_prelude, crossed)
    }

    /// First segment of a [`PathKind::Abs`] (leading `::`) path.
    fn resolve_abs_first_segment(&self, name: &Name) -> (PerNs, bool) {
        match self.edition {
            Edition::Edition2018 => {
                let per_ns = self.extern_prelude_entry(name);
                let crossed = !per_ns.is_none();
                (per_ns, crossed)
            }
            Edition::Edition2015 => {
                let from_root = self.module(self.root).get(name);
                if !from_root.is_none() {
                    (from_root, false)
                } else {
                    let per_ns = self.extern_prelude_entry(name);
                    let crossed = !per_ns.is_none();
                    (per_ns, crossed)
                }
            }
        }
    }

    /// Resolve `path` as far as possible right now, reporting whether
    /// stopping is final (`reached_fixedpoint`) or might change once more
    /// imports resolve. The collector's import-resolution loop relies on
    /// that distinction to know when to stop retrying.
    ///
    /// `with_invisible_items`: whether a binding recorded as
    /// [`Visibility::Invisible`] (an import pointing at something the
    /// importer can't actually see) still counts as present. Import
    /// resolution needs `true` — a private `use` still has to produce an
    /// edge so further imports can chain off it. Macro-call resolution needs
    /// `false` — a macro reached only through a binding nobody can see must
    /// not expand.
    pub fn resolve_path_fp<'a>(
        &'a self,
        deps: &DependencyDefMaps<'a>,
        original_module: LocalModuleId,
        path: &UsePath,
        with_invisible_items: bool,
    ) -> ResolvePathResult {
        if path.segments.is_empty() {
            return ResolvePathResult::done(PerNs::none(), false);
        }

        let first = &path.segments[0];
        let mut crossed = false;
        let mut curr = match path.kind {
            PathKind::Plain => {
                let (per_ns, c) = self.resolve_plain_first_segment(deps, original_module, first);
                crossed = c;
                per_ns
            }
            PathKind::Abs => {
                let (per_ns, c) = self.resolve_abs_first_segment(first);
                crossed = c;
                per_ns
            }
            PathKind::Crate => self.module(self.root).get(first),
            PathKind::SelfModule => self.module(original_module).get(first),
            PathKind::Super(hops) => match self.walk_supers(original_module, hops) {
                Some(target) => self.module(target).get(first),
                None => return ResolvePathResult::dead_end(0),
            },
            PathKind::DollarCrate(krate) => {
                if krate == self.krate {
                    self.module(self.root).get(first)
                } else {
                    crossed = true;
                    match deps.get(&krate) {
                        Some(dep) => dep.module(dep.root).get(first),
                        None => return ResolvePathResult::dead_end(0),
                    }
                }
            }
        };
        curr = filter_invisible(curr, with_invisible_items);

        if curr.is_none() {
            return ResolvePathResult::pending(0);
        }

        for (idx, seg) in path.segments.iter().enumerate().skip(1) {
            let container = match curr.take_types() {
                Some(vis_item) if vis_item.is_mod_or_enum() => {
                    vis_item.module.expect("is_mod_or_enum implies module is set")
                }
                Some(_) => return ResolvePathResult::dead_end(idx),
                None => return ResolvePathResult::pending(idx),
            };
            if container.krate != self.krate {
                crossed = true;
            }
            curr = filter_invisible(self.get_module(deps, container).get(seg), with_invisible_items);
            if curr.is_none() {
                return ResolvePathResult::pending(idx);
            }
        }

        ResolvePathResult::done(curr, crossed)
    }

    /// Resolve `path` fully, discarding the fixed-point bookkeeping — for
    /// callers (tests, a host's hover/completion query) who just want the
    /// final answer. Invisible bindings are kept (`with_invisible_items =
    /// true`): a completion-style caller wants to see a privately-imported
    /// name even though ordinary resolution wouldn't use it.
    pub fn resolve_path<'a>(
        &'a self,
        deps: &DependencyDefMaps<'a>,
        original_module: LocalModuleId,
        path: &UsePath,
    ) -> PerNs {
        self.resolve_path_fp(deps, original_module, path, true).resolved
    }
}

/// Drop any namespace slot bound at [`Visibility::Invisible`] when
/// `with_invisible_items` is `false`; otherwise a no-op.
fn filter_invisible(per_ns: PerNs, with_invisible_items: bool) -> PerNs {
    if with_invisible_items {
        per_ns
    } else {
        per_ns.filter_visibility(|v| !matches!(v, Visibility::Invisible))
    }
}

/// The outcome of one attempt at [`CrateDefMap::resolve_path_fp`].
pub struct ResolvePathResult {
    pub resolved: PerNs,
    /// Index of the first segment that didn't resolve, or `None` if the
    /// whole path did.
    pub unresolved_segment: Option<usize>,
    /// `true` if this answer can't change on a later pass (either the path
    /// fully resolved, or it hit a structural dead end); `false` if a later
    /// import might still complete it.
    pub reached_fixedpoint: bool,
    /// `true` if resolution crossed into another crate's def map, whose
    /// contents are already final — an import that lands here is fully
    /// `Resolved` even if it only populated one or two namespaces, since no
    /// later pass can add to a sealed dependency's scope.
    pub crossed_into_other_crate: bool,
}

impl ResolvePathResult {
    fn done(resolved: PerNs, crossed_into_other_crate: bool) -> ResolvePathResult {
        ResolvePathResult { resolved, unresolved_segment: None, reached_fixedpoint: true, crossed_into_other_crate }
    }

    fn pending(at: usize) -> ResolvePathResult {
        ResolvePathResult {
            resolved: PerNs::none(),
            unresolved_segment: Some(at),
            reached_fixedpoint: false,
            crossed_into_other_crate: false,
        }
    }

    fn dead_end(at: usize) -> ResolvePathResult {
        ResolvePathResult {
            resolved: PerNs::none(),
            unresolved_segment: Some(at),
            reached_fixedpoint: true,
            crossed_into_other_crate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Name;
    use crate::per_ns::PerNs;

    fn deps() -> DependencyDefMaps<'static> {
        FxHashMap::default()
    }

    #[test]
    fn resolves_crate_path_to_own_root_item() {
        let mut map = CrateDefMap::new(CrateId(0), Edition::Edition2018);
        let root = map.root;
        let item = VisItem::new(ModPath::new(CrateId(0), vec![Name::new("thing")]), Visibility::Public, None);
        map.module_mut(root).visible_items.insert(Name::new("thing"), PerNs::types(item));

        let path = UsePath::kind(PathKind::Crate, vec![Name::new("thing")]);
        let result = map.resolve_path(&deps(), root, &path);
        assert!(result.types.is_some());
    }

    #[test]
    fn with_invisible_items_false_hides_an_invisible_binding() {
        let mut map = CrateDefMap::new(CrateId(0), Edition::Edition2018);
        let root = map.root;
        let item = VisItem::new(ModPath::new(CrateId(0), vec![Name::new("secret")]), Visibility::Invisible, None);
        map.module_mut(root).visible_items.insert(Name::new("secret"), PerNs::types(item));

        let path = UsePath::kind(PathKind::Crate, vec![Name::new("secret")]);
        let hidden = map.resolve_path_fp(&deps(), root, &path, false);
        assert!(hidden.resolved.types.is_none(), "an Invisible binding must not resolve when with_invisible_items is false");

        let visible = map.resolve_path_fp(&deps(), root, &path, true);
        assert!(visible.resolved.types.is_some(), "with_invisible_items=true must still see the Invisible binding");
    }

    #[test]
    fn unresolved_plain_path_is_pending_not_dead() {
        let map = CrateDefMap::new(CrateId(0), Edition::Edition2018);
        let root = map.root;
        let path = UsePath::plain(vec![Name::new("nope")]);
        let result = map.resolve_path_fp(&deps(), root, &path, true);
        assert!(!result.reached_fixedpoint);
        assert_eq!(result.unresolved_segment, Some(0));
    }

    #[test]
    fn descending_through_non_module_is_a_dead_end() {
        let mut map = CrateDefMap::new(CrateId(0), Edition::Edition2018);
        let root = map.root;
        let item = VisItem::new(ModPath::new(CrateId(0), vec![Name::new("thing")]), Visibility::Public, None);
        map.module_mut(root).visible_items.insert(Name::new("thing"), PerNs::types(item));

        let path = UsePath::kind(PathKind::Crate, vec![Name::new("thing"), Name::new("inner")]);
        let result = map.resolve_path_fp(&deps(), root, &path, true);
        assert!(result.reached_fixedpoint);
        assert_eq!(result.unresolved_segment, Some(1));
    }

    #[test]
    fn super_walks_up_one_level() {
        let mut map = CrateDefMap::new(CrateId(0), Edition::Edition2018);
        let root = map.root;
        let child = map.alloc_module(root, ModPath::new(CrateId(0), vec![Name::new("child")]));
        let item = VisItem::new(ModPath::new(CrateId(0), vec![Name::new("thing")]), Visibility::Public, None);
        map.module_mut(root).visible_items.insert(Name::new("thing"), PerNs::types(item));

        let path = UsePath::kind(PathKind::Super(1), vec![Name::new("thing")]);
        let result = map.resolve_path(&deps(), child, &path);
        assert!(result.types.is_some());
    }
}
