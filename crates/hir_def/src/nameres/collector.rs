//! The fixed-point algorithm: [`DefCollector`] drives import resolution and
//! macro expansion to quiescence; [`ModCollector`] walks one item tree,
//! feeding definitions straight into a module's scope and queueing imports
//! and macro calls for the fixed-point loop to chew on.

use log::debug;
use rustc_hash::FxHashMap;

use crate::cancel::CancelToken;
use crate::def_map::CrateDefMap;
use crate::host::{CrateInput, DependencyDefMaps, DependencyInfo, FileLoader, MacroExpander, RootAttrs};
use crate::ids::{Edition, FileId, LocalModuleId, ModuleId, Name};
use crate::item_tree::{
    DefItem, DefKind, ImportItem, IncludeItem, Item, ItemKind, MacroCallItem, MacroDefInfo, ModuleItem,
    ModuleItemKind, RawVisibility,
};
use crate::mod_resolution::ModDir;
use crate::path::ModPath;
use crate::per_ns::PerNs;
use crate::visibility::{Visibility, VisItem};

/// Does `root_attrs` prune `dep` from the extern prelude? `no_std` drops the
/// standard library only; `no_core` drops both it and `core`, matching
/// `#![no_std]`/`#![no_core]`'s effect on the implicit dependency set.
fn is_pruned(dep: &DependencyInfo, root_attrs: RootAttrs) -> bool {
    match (root_attrs, dep.extern_name.as_str()) {
        (RootAttrs::NoCore, "std") | (RootAttrs::NoCore, "core") => true,
        (RootAttrs::NoStd, "std") => true,
        _ => false,
    }
}

struct ImportDirective {
    module_id: LocalModuleId,
    import: ImportItem,
    /// Namespace count ([`PerNs::populated_count`]) this import resolved to
    /// as of the last attempt — lets `resolve_imports` tell a newly-grown
    /// `Indeterminate` import from one that's stably stuck, without an
    /// infinite "changed" signal keeping the fixed-point loop spinning.
    last_namespace_count: u8,
}

/// Macro calls nested this many expansions deep are dropped rather than
/// expanded, a backstop against runaway recursive macros.
const MAX_MACRO_EXPANSION_DEPTH: u32 = 64;

/// Hard cap on rounds of glob-import propagation. Each round floods every
/// glob-import edge that has changed since the last round simultaneously, so
/// a chain of N nested glob imports needs on the order of N rounds to fully
/// settle. A graph that's still producing changes past this many rounds
/// isn't a large crate, it's a cycle that can never reach a fixed point —
/// continuing would spin forever.
const MAX_GLOB_PROPAGATION_DEPTH: u32 = 100;

struct MacroDirective {
    module_id: LocalModuleId,
    mod_dir: ModDir,
    call: MacroCallItem,
    depth: u32,
}

enum ImportResolution {
    Resolved,
    /// Installed into scope with one or two of its three namespaces so far;
    /// stays on the pending list in case the rest show up on a later pass.
    /// `changed` reports whether the populated-namespace count grew since
    /// the last attempt, so the fixed-point loop knows whether this counts
    /// as progress.
    Indeterminate { changed: bool },
    Pending,
    DeadEnd,
}

pub struct DefCollector<'a> {
    def_map: CrateDefMap,
    deps: DependencyDefMaps<'a>,
    files: &'a dyn FileLoader,
    macros: &'a dyn MacroExpander,
    cancel: &'a dyn CancelToken,
    root_file: FileId,
    glob_imports: FxHashMap<LocalModuleId, Vec<(LocalModuleId, Visibility)>>,
    unresolved_imports: Vec<ImportDirective>,
    unexpanded_macros: Vec<MacroDirective>,
    /// Rounds of glob-import propagation that have actually changed
    /// something so far, across the whole fixed-point loop. Checked against
    /// [`MAX_GLOB_PROPAGATION_DEPTH`] in [`Self::propagate_globs`].
    glob_propagation_rounds: u32,
}

impl<'a> DefCollector<'a> {
    pub fn new(
        crate_input: &dyn CrateInput,
        deps: DependencyDefMaps<'a>,
        files: &'a dyn FileLoader,
        macros: &'a dyn MacroExpander,
        cancel: &'a dyn CancelToken,
    ) -> DefCollector<'a> {
        let root_attrs = crate_input.root_attrs();
        let mut def_map = CrateDefMap::new(crate_input.crate_id(), crate_input.edition());
        for dep in crate_input.dependencies() {
            if is_pruned(dep, root_attrs) {
                continue;
            }
            if let Some(&dep_map) = deps.get(&dep.crate_id) {
                def_map.extern_prelude.insert(dep.extern_name.clone(), dep_map.root_module_id());
                if dep.provides_prelude {
                    def_map.prelude = Some(dep_map.root_module_id());
                }
            }
        }
        if root_attrs == RootAttrs::NoCore {
            def_map.prelude = None;
        }

        // Implicit `extern crate`: an ordinary root gets `std`, a `no_std`
        // root gets `core`, `no_core` gets neither. The binding occupies a
        // slot in the crate root's own scope only pre-2018, when `extern
        // crate` was how a dependency's name entered scope at all; on newer
        // editions the extern-prelude entry above already suffices.
        let implicit = match root_attrs {
            RootAttrs::Default => Some(Name::new("std")),
            RootAttrs::NoStd => Some(Name::new("core")),
            RootAttrs::NoCore => None,
        };
        if let Some(name) = implicit {
            if let Some(&target) = def_map.extern_prelude.get(&name) {
                if crate_input.edition() == Edition::Edition2015 {
                    let item = VisItem::new(ModPath::crate_root(target.krate), Visibility::Public, Some(target));
                    let root = def_map.root;
                    def_map.module_mut(root).push_resolution(name, PerNs::types(item), false);
                }
            }
        }

        DefCollector {
            def_map,
            deps,
            files,
            macros,
            cancel,
            root_file: crate_input.root_file(),
            glob_imports: FxHashMap::default(),
            unresolved_imports: Vec::new(),
            unexpanded_macros: Vec::new(),
            glob_propagation_rounds: 0,
        }
    }

    pub fn collect(mut self) -> CrateDefMap {
        let root = self.def_map.root;
        let root_file = self.root_file;
        self.def_map.module_mut(root).file_id = Some(root_file);
        let item_tree = self.files.item_tree(root_file);
        {
            let mut mod_collector = ModCollector {
                def_collector: &mut self,
                module_id: root,
                file_id: root_file,
                mod_dir: ModDir::root(),
                macro_depth: 0,
            };
            mod_collector.collect(&item_tree.top_level);
        }

        loop {
            self.cancel.check_cancelled();
            let imports_changed = self.resolve_imports();
            let macros_changed = self.resolve_macros();
            if !imports_changed && !macros_changed {
                break;
            }
        }

        debug!(
            "name resolution converged: {} import(s) and {} macro call(s) never resolved",
            self.unresolved_imports.len(),
            self.unexpanded_macros.len()
        );

        self.def_map
    }

    fn resolve_visibility(&self, module_id: LocalModuleId, raw: RawVisibility) -> Visibility {
        let module = self.def_map.module(module_id);
        match raw {
            RawVisibility::Public => Visibility::Public,
            RawVisibility::PubCrate => Visibility::Restricted { in_mod: ModPath::crate_root(self.def_map.krate) },
            RawVisibility::PubSuper => {
                let in_mod =
                    module.parent.map(|p| self.def_map.module(p).path.clone()).unwrap_or_else(|| module.path.clone());
                Visibility::Restricted { in_mod }
            }
            RawVisibility::Private => Visibility::Restricted { in_mod: module.path.clone() },
        }
    }

    fn resolve_imports(&mut self) -> bool {
        let mut any_change = false;
        let directives = std::mem::take(&mut self.unresolved_imports);
        let mut still_pending = Vec::new();
        for mut directive in directives {
            match self.try_resolve_import(&mut directive) {
                ImportResolution::Resolved => any_change = true,
                ImportResolution::Indeterminate { changed } => {
                    any_change |= changed;
                    still_pending.push(directive);
                }
                ImportResolution::Pending => still_pending.push(directive),
                ImportResolution::DeadEnd => {}
            }
        }
        self.unresolved_imports = still_pending;
        any_change |= self.propagate_globs();
        any_change
    }

    fn try_resolve_import(&mut self, directive: &mut ImportDirective) -> ImportResolution {
        if directive.import.is_extern_crate {
            return self.try_resolve_extern_crate(directive);
        }

        // `with_invisible_items = true`: a private `use` still has to produce
        // an edge so a later import chaining off it can resolve.
        let result = self.def_map.resolve_path_fp(&self.deps, directive.module_id, &directive.import.path, true);
        if result.resolved.is_none() {
            return if result.reached_fixedpoint { ImportResolution::DeadEnd } else { ImportResolution::Pending };
        }

        let visibility = self.resolve_visibility(directive.module_id, directive.import.visibility);

        if directive.import.is_glob {
            return self.record_glob(directive, result.resolved, visibility);
        }

        // A namespace slot we can't actually see from here (the target's own
        // visibility doesn't reach this module) still gets installed, but as
        // Invisible: present for completion, not usable for resolution.
        let from_path = self.def_map.module(directive.module_id).path.clone();
        let item = result.resolved.clone().map_items(|vis_item| {
            let effective =
                if vis_item.visibility.is_visible_from(&from_path) { visibility.clone() } else { Visibility::Invisible };
            vis_item.with_visibility(effective)
        });

        let alias_is_underscore = directive.import.alias.as_ref().map_or(false, |a| a.is_underscore());
        if alias_is_underscore {
            if let Some(vis_item) = item.take_types() {
                self.def_map.module_mut(directive.module_id).push_unnamed_trait(vis_item.path.clone(), visibility);
            }
        } else {
            let bound_name = match &directive.import.alias {
                Some(alias) => alias.clone(),
                None => match directive.import.path.segments.last() {
                    Some(name) => name.clone(),
                    None => return ImportResolution::DeadEnd,
                },
            };
            self.def_map.module_mut(directive.module_id).push_resolution(bound_name, item, false);
        }

        if result.crossed_into_other_crate || result.resolved.populated_count() == 3 {
            return ImportResolution::Resolved;
        }
        let populated = result.resolved.populated_count();
        let changed = populated != directive.last_namespace_count;
        directive.last_namespace_count = populated;
        ImportResolution::Indeterminate { changed }
    }

    fn record_glob(&mut self, directive: &ImportDirective, resolved: PerNs, visibility: Visibility) -> ImportResolution {
        let target = match resolved.take_types() {
            Some(vis_item) if vis_item.is_mod_or_enum() => vis_item.module.expect("checked above"),
            _ => return ImportResolution::DeadEnd,
        };

        if directive.import.is_prelude_import && target.krate == self.def_map.krate {
            self.def_map.prelude = Some(target);
        }

        if target.krate == self.def_map.krate {
            self.glob_imports.entry(target.local_id).or_default().push((directive.module_id, visibility.clone()));
        } else {
            // Cross-crate: snapshot and filter right now, since a sealed
            // dependency's map can't grow a reverse edge to replay later.
            let importer_path = self.def_map.module(directive.module_id).path.clone();
            let items: Vec<(Name, PerNs)> = self
                .def_map
                .get_module(&self.deps, target)
                .visible_items
                .iter()
                .map(|(n, p)| (n.clone(), p.clone()))
                .collect();
            let module = self.def_map.module_mut(directive.module_id);
            for (name, item) in items {
                let visible = item.filter_visibility(|v| v.is_visible_from(&importer_path));
                if visible.is_none() {
                    continue;
                }
                module.push_resolution(name, visible.with_visibility(visibility.clone()), true);
            }
        }
        ImportResolution::Resolved
    }

    fn propagate_globs(&mut self) -> bool {
        let mut changed = false;
        let edges: Vec<(LocalModuleId, Vec<(LocalModuleId, Visibility)>)> =
            self.glob_imports.iter().map(|(k, v)| (*k, v.clone())).collect();
        for (source, importers) in edges {
            let items: Vec<(Name, PerNs)> =
                self.def_map.module(source).visible_items.iter().map(|(n, p)| (n.clone(), p.clone())).collect();
            for (importer, visibility) in importers {
                let importer_path = self.def_map.module(importer).path.clone();
                for (name, item) in &items {
                    let visible = item.clone().filter_visibility(|v| v.is_visible_from(&importer_path));
                    if visible.is_none() {
                        continue;
                    }
                    let before = self.def_map.module(importer).visible_items.get(name).cloned();
                    self.def_map.module_mut(importer).push_resolution(
                        name.clone(),
                        visible.with_visibility(visibility.clone()),
                        true,
                    );
                    let after = self.def_map.module(importer).visible_items.get(name).cloned();
                    if before != after {
                        changed = true;
                    }
                }
            }
        }
        if changed {
            self.glob_propagation_rounds += 1;
            if self.glob_propagation_rounds > MAX_GLOB_PROPAGATION_DEPTH {
                panic!(
                    "glob-import propagation exceeded {} rounds without reaching a fixed point; \
                     this crate's glob-import graph has a cycle that can never stabilize",
                    MAX_GLOB_PROPAGATION_DEPTH
                );
            }
        }
        changed
    }

    fn try_resolve_extern_crate(&mut self, directive: &ImportDirective) -> ImportResolution {
        let name = match directive.import.path.segments.last() {
            Some(name) => name.clone(),
            None => return ImportResolution::DeadEnd,
        };
        let target = match self.def_map.extern_prelude.get(&name) {
            Some(&m) => m,
            None => return ImportResolution::DeadEnd,
        };

        let bound_name = directive.import.alias.clone().unwrap_or_else(|| name.clone());
        if !bound_name.is_underscore() {
            let visibility = self.resolve_visibility(directive.module_id, directive.import.visibility);
            let item = VisItem::new(ModPath::crate_root(target.krate), visibility, Some(target));
            self.def_map.module_mut(directive.module_id).push_resolution(bound_name.clone(), PerNs::types(item), false);
            // An explicit `extern crate X as Y;` rebinds the extern prelude
            // itself, not just the declaring module's scope — Y becomes
            // usable as a plain-path first segment from any module.
            self.def_map.extern_prelude.insert(bound_name, target);
        }

        if directive.import.is_macro_use {
            let exported: Vec<MacroDefInfo> = self
                .def_map
                .get_module(&self.deps, target)
                .legacy_macros
                .values()
                .filter(|m| m.is_export)
                .cloned()
                .collect();
            let root = self.def_map.root;
            for def in exported {
                self.def_map.macro_defs.insert(ModPath::crate_root(target.krate).push(def.name.clone()), def.clone());
                self.def_map.module_mut(root).legacy_macros.insert(def.name.clone(), def);
            }
        }

        ImportResolution::Resolved
    }

    fn resolve_macros(&mut self) -> bool {
        let mut changed = false;
        let directives = std::mem::take(&mut self.unexpanded_macros);
        let mut still_pending = Vec::new();
        for directive in directives {
            self.cancel.check_cancelled();
            if directive.depth >= MAX_MACRO_EXPANSION_DEPTH {
                // Too deep to be a legitimate expansion chain; drop it
                // silently rather than let it keep occupying a retry slot.
                continue;
            }
            match self.resolve_macro_def(&directive) {
                Some(def) => {
                    if let Some(expanded) = self.macros.expand(&def, &directive.call.body) {
                        changed = true;
                        let mut sub = ModCollector {
                            def_collector: &mut *self,
                            module_id: directive.module_id,
                            file_id: expanded.file_id,
                            mod_dir: directive.mod_dir.clone(),
                            macro_depth: directive.depth + 1,
                        };
                        sub.collect(&expanded.item_tree.top_level);
                    }
                }
                None => still_pending.push(directive),
            }
        }
        self.unexpanded_macros = still_pending;
        changed
    }

    fn resolve_macro_def(&self, directive: &MacroDirective) -> Option<MacroDefInfo> {
        if let Some(name) = directive.call.path.as_ident() {
            let mut curr = Some(directive.module_id);
            while let Some(m) = curr {
                if let Some(def) = self.def_map.module(m).get_legacy_macro(name) {
                    return Some(def.clone());
                }
                curr = self.def_map.module(m).parent;
            }
        }
        // `with_invisible_items = false`: a macro reachable only through a
        // binding the caller can't actually see must not expand.
        let result = self.def_map.resolve_path_fp(&self.deps, directive.module_id, &directive.call.path, false);
        let vis_item = result.resolved.take_macros()?;
        self.def_map.get_macro_def(&self.deps, &vis_item.path).cloned()
    }
}

struct ModCollector<'a, 'b> {
    def_collector: &'a mut DefCollector<'b>,
    module_id: LocalModuleId,
    file_id: FileId,
    mod_dir: ModDir,
    /// How many macro expansions deep the items this collector is walking
    /// came from; descending into a `mod` doesn't change it, only expanding
    /// a macro call does.
    macro_depth: u32,
}

impl<'a, 'b> ModCollector<'a, 'b> {
    fn collect(&mut self, items: &[Item]) {
        for item in items {
            if let ItemKind::Module(module_item) = &item.kind {
                self.collect_module(module_item);
                continue;
            }
            if !item.cfg_enabled() {
                continue;
            }
            match &item.kind {
                ItemKind::Module(_) => unreachable!("handled above"),
                ItemKind::Import(import) => {
                    self.def_collector.unresolved_imports.push(ImportDirective {
                        module_id: self.module_id,
                        import: import.clone(),
                        last_namespace_count: 0,
                    });
                }
                ItemKind::Def(def) => self.collect_def(def),
                ItemKind::MacroCall(call) => self.collect_macro_call(call),
                ItemKind::MacroRulesDef(def) => self.collect_macro_def(def),
                ItemKind::Include(include) => self.collect_include(include),
            }
        }
    }

    fn current_path(&self) -> ModPath {
        self.def_collector.def_map.module(self.module_id).path.clone()
    }

    fn krate(&self) -> crate::ids::CrateId {
        self.def_collector.def_map.krate
    }

    fn parent_enabled(&self) -> bool {
        self.def_collector.def_map.module(self.module_id).is_deeply_enabled_by_cfg
    }

    fn collect_module(&mut self, module_item: &ModuleItem) {
        let path = self.current_path().push(module_item.name.clone());
        let child_id = self.def_collector.def_map.alloc_module(self.module_id, path.clone());
        self.def_collector.def_map.module_mut(child_id).is_deeply_enabled_by_cfg =
            module_item.cfg_enabled && self.parent_enabled();

        // A child module inherits a snapshot of the parent's legacy macro
        // scope as it stands at the point the child is declared — a
        // `macro_rules!` appearing later in the parent's item list is not
        // visible here, matching textual scoping.
        let parent_legacy = self.def_collector.def_map.module(self.module_id).legacy_macros.clone();
        self.def_collector.def_map.module_mut(child_id).legacy_macros = parent_legacy;

        match &module_item.kind {
            ModuleItemKind::Inline(items) => {
                let mut file_relative = self.def_collector.def_map.module(self.module_id).file_relative_path.clone();
                file_relative.push(module_item.name.clone());
                {
                    let child = self.def_collector.def_map.module_mut(child_id);
                    child.file_id = Some(self.file_id);
                    child.file_relative_path = file_relative;
                }
                let mut sub = ModCollector {
                    def_collector: &mut *self.def_collector,
                    module_id: child_id,
                    file_id: self.file_id,
                    mod_dir: self.mod_dir.descend_into_definition(&module_item.name),
                    macro_depth: self.macro_depth,
                };
                sub.collect(items);
            }
            ModuleItemKind::Outline => {
                let resolved = self.mod_dir.resolve_declaration(
                    self.def_collector.files,
                    self.file_id,
                    &module_item.name,
                    module_item.path_attr.as_deref(),
                );
                match resolved {
                    Ok((file_id, new_dir)) => {
                        self.def_collector.def_map.module_mut(child_id).file_id = Some(file_id);
                        let item_tree = self.def_collector.files.item_tree(file_id);
                        let mut sub = ModCollector {
                            def_collector: &mut *self.def_collector,
                            module_id: child_id,
                            file_id,
                            mod_dir: new_dir,
                            macro_depth: self.macro_depth,
                        };
                        sub.collect(&item_tree.top_level);
                    }
                    Err(candidate) => {
                        self.def_collector.def_map.missed_files.push(candidate);
                    }
                }
            }
        }

        if module_item.is_macro_use {
            // Re-import the child's legacy scope, as it stands once it's
            // done collecting, back into the declaring module's — unconditional,
            // ignoring whatever visibility those macros carry.
            let child_legacy = self.def_collector.def_map.module(child_id).legacy_macros.clone();
            self.def_collector.def_map.module_mut(self.module_id).legacy_macros.extend(child_legacy);
        }

        if module_item.cfg_enabled {
            let visibility = self.def_collector.resolve_visibility(self.module_id, module_item.visibility);
            let target = ModuleId { krate: self.krate(), local_id: child_id };
            let vis_item = VisItem::new(path, visibility, Some(target));
            let module = self.def_collector.def_map.module_mut(self.module_id);
            module.push_resolution(module_item.name.clone(), PerNs::types(vis_item), false);
            module.child_modules.insert(module_item.name.clone(), child_id);
        }
    }

    fn collect_def(&mut self, def: &DefItem) {
        let path = self.current_path().push(def.name.clone());
        let visibility = self.def_collector.resolve_visibility(self.module_id, def.visibility);

        let per_ns = match &def.kind {
            DefKind::Enum { variants } => {
                let enum_mod_id = self.def_collector.def_map.alloc_module(self.module_id, path.clone());
                {
                    let enabled = self.parent_enabled();
                    let enum_mod = self.def_collector.def_map.module_mut(enum_mod_id);
                    enum_mod.is_enum = true;
                    enum_mod.is_deeply_enabled_by_cfg = enabled;
                    for variant in variants {
                        let variant_path = path.push(variant.clone());
                        let variant_item = VisItem::new(variant_path, Visibility::Public, None);
                        enum_mod.push_resolution(variant.clone(), PerNs::values(variant_item), false);
                    }
                }
                let target = ModuleId { krate: self.krate(), local_id: enum_mod_id };
                PerNs::types(VisItem::new(path.clone(), visibility, Some(target)))
            }
            kind if kind.occupies_values() => PerNs::values(VisItem::new(path.clone(), visibility, None)),
            _ => PerNs::types(VisItem::new(path.clone(), visibility, None)),
        };

        self.def_collector.def_map.module_mut(self.module_id).push_resolution(def.name.clone(), per_ns, false);
    }

    fn collect_macro_call(&mut self, call: &MacroCallItem) {
        self.def_collector.unexpanded_macros.push(MacroDirective {
            module_id: self.module_id,
            mod_dir: self.mod_dir.clone(),
            call: call.clone(),
            depth: self.macro_depth,
        });
    }

    fn collect_macro_def(&mut self, def: &MacroDefInfo) {
        self.def_collector.def_map.module_mut(self.module_id).legacy_macros.insert(def.name.clone(), def.clone());
        let own_path = self.current_path().push(def.name.clone());
        self.def_collector.def_map.macro_defs.insert(own_path, def.clone());

        if def.is_export {
            let root = self.def_collector.def_map.root;
            let export_path = ModPath::crate_root(self.krate()).push(def.name.clone());
            self.def_collector.def_map.macro_defs.insert(export_path.clone(), def.clone());
            let vis_item = VisItem::new(export_path, Visibility::Public, None);
            self.def_collector.def_map.module_mut(root).push_resolution(def.name.clone(), PerNs::macros(vis_item), false);
        }
    }

    fn collect_include(&mut self, include: &IncludeItem) {
        if !include.cfg_enabled {
            return;
        }
        match self.def_collector.files.resolve_path(self.file_id, &include.relative_path) {
            Ok(file_id) => {
                let item_tree = self.def_collector.files.item_tree(file_id);
                let mut sub = ModCollector {
                    def_collector: &mut *self.def_collector,
                    module_id: self.module_id,
                    file_id,
                    mod_dir: ModDir::root(),
                    macro_depth: self.macro_depth,
                };
                sub.collect(&item_tree.top_level);
            }
            Err(absolute) => {
                self.def_collector.def_map.missed_files.push(absolute);
            }
        }
    }
}
