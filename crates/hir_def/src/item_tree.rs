//! The item-tree input model.
//!
//! Parsing source text into a tree of items is the host's job (it owns the
//! grammar, the concrete syntax tree, error recovery). What the collector
//! needs out of that is this much simpler shape: a nested list of items per
//! file, stable enough to walk twice (once to gather definitions, again when
//! a glob or macro expansion adds more).

use crate::ids::Name;
use crate::path::UsePath;

/// An opaque payload the collector forwards to the host's macro-expansion
/// capability unexamined — a stand-in for a real token tree, which belongs
/// to the host's parser, not here.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TokenStream(pub String);

impl TokenStream {
    pub fn new(text: impl Into<String>) -> TokenStream {
        TokenStream(text.into())
    }
}

/// A `macro_rules!` definition, recorded in whichever legacy macro scope
/// (module or textual) it's visible from. Resolution never looks inside
/// `rules`; only a [`crate::host::MacroExpander`] does.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MacroDefInfo {
    pub name: Name,
    pub rules: TokenStream,
    /// `#[macro_export]`: also bound at the defining crate's root, visible
    /// to crates that depend on it.
    pub is_export: bool,
}

/// A macro invocation in item position (`foo!(..);`), as opposed to one
/// nested inside an expression or pattern (out of scope: this engine only
/// ever expands macros that can themselves produce items).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MacroCallItem {
    pub path: UsePath,
    pub body: TokenStream,
}

/// How visible an item is, as written at its definition site. `PubIn(path)`
/// (`pub(in some::path)`) is not modeled — resolving an arbitrary visibility
/// path requires the same fixed-point machinery as an import, for a feature
/// real-world crates use rarely; see DESIGN.md.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawVisibility {
    Public,
    PubCrate,
    PubSuper,
    Private,
}

/// One `use` item (or one `extern crate`, which parses like a single-segment
/// `use` with its own flags below).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ImportItem {
    pub path: UsePath,
    pub alias: Option<Name>,
    pub is_glob: bool,
    pub visibility: RawVisibility,
    pub is_extern_crate: bool,
    /// `#[macro_use] extern crate foo;`: import all of `foo`'s
    /// `#[macro_export]` macros into this crate's legacy macro scope.
    pub is_macro_use: bool,
    /// `#[prelude_import] use some::path::*;`
    pub is_prelude_import: bool,
    pub cfg_enabled: bool,
}

impl ImportItem {
    pub fn plain(path: UsePath, visibility: RawVisibility) -> ImportItem {
        ImportItem {
            path,
            alias: None,
            is_glob: false,
            visibility,
            is_extern_crate: false,
            is_macro_use: false,
            is_prelude_import: false,
            cfg_enabled: true,
        }
    }

    pub fn glob(path: UsePath, visibility: RawVisibility) -> ImportItem {
        ImportItem { is_glob: true, ..ImportItem::plain(path, visibility) }
    }
}

/// The kind of non-module, non-import, non-macro item — just enough to know
/// which namespace(s) it occupies and whether a further path segment can
/// descend into it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DefKind {
    Function,
    Struct,
    Union,
    Enum { variants: Vec<Name> },
    Trait,
    TypeAlias,
    Const,
    Static,
}

impl DefKind {
    pub fn is_enum(&self) -> bool {
        matches!(self, DefKind::Enum { .. })
    }

    /// Types namespace only (struct/enum/union/trait/type alias), values
    /// namespace only (const/static), or both (a unit/tuple struct also
    /// introduces a value constructor — out of scope here, kept to the
    /// straightforward case the reference `DefKind` enumerates).
    pub fn occupies_values(&self) -> bool {
        matches!(self, DefKind::Function | DefKind::Const | DefKind::Static)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DefItem {
    pub name: Name,
    pub kind: DefKind,
    pub visibility: RawVisibility,
    pub cfg_enabled: bool,
}

/// `include!("path.rs")`: splice another file's items in at this point, as
/// if they'd been written here directly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IncludeItem {
    pub relative_path: String,
    pub cfg_enabled: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ModuleItemKind {
    /// `mod foo { .. }` — items live right here, no new file involved.
    Inline(Vec<Item>),
    /// `mod foo;` — items live in a file the host's file-system capability
    /// has to locate.
    Outline,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleItem {
    pub name: Name,
    pub kind: ModuleItemKind,
    pub visibility: RawVisibility,
    /// `#[path = "..."]`, overriding the default `name.rs` / `name/mod.rs`
    /// search for an out-of-line module.
    pub path_attr: Option<String>,
    pub cfg_enabled: bool,
    /// `#[macro_use] mod foo;` / `#[macro_use] mod foo { .. }` — once `foo`
    /// finishes collecting, its legacy macro scope is re-imported back into
    /// the declaring module's, unconditionally (ignoring the macros' own
    /// visibility, same as `#[macro_use] extern crate`).
    pub is_macro_use: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Module(ModuleItem),
    Import(ImportItem),
    Def(DefItem),
    MacroCall(MacroCallItem),
    MacroRulesDef(MacroDefInfo),
    Include(IncludeItem),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Item {
    pub kind: ItemKind,
}

impl Item {
    pub fn cfg_enabled(&self) -> bool {
        match &self.kind {
            ItemKind::Module(it) => it.cfg_enabled,
            ItemKind::Import(it) => it.cfg_enabled,
            ItemKind::Def(it) => it.cfg_enabled,
            ItemKind::MacroCall(_) => true,
            ItemKind::MacroRulesDef(_) => true,
            ItemKind::Include(it) => it.cfg_enabled,
        }
    }
}

/// The flat contents of one file (or one macro expansion's worth of
/// synthesized items), as the host's parser produced it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ItemTree {
    pub top_level: Vec<Item>,
}

impl ItemTree {
    pub fn new(top_level: Vec<Item>) -> ItemTree {
        ItemTree { top_level }
    }
}
