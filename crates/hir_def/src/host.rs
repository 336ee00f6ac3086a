//! The capabilities a host must supply to build a [`crate::def_map::CrateDefMap`].
//!
//! This crate owns name resolution and nothing upstream of it: no parser, no
//! macro expander, no virtual file system, no persistent query cache. Those
//! all live on the host side of these traits.

use rustc_hash::FxHashMap;

use crate::ids::{CrateId, Edition, FileId, Name};
use crate::item_tree::{ItemTree, MacroDefInfo, TokenStream};

/// Whether (and how) the crate root opts out of the standard prelude.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RootAttrs {
    Default,
    NoStd,
    NoCore,
}

/// One entry of a crate's dependency list: the name it's bound under in the
/// extern prelude, and which crate that is.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DependencyInfo {
    pub extern_name: Name,
    pub crate_id: CrateId,
    /// Whether this dependency's root module should seed the language
    /// prelude (the way `std`/`core` do for an ordinary crate). When more
    /// than one dependency sets this, the last one in dependency order wins.
    pub provides_prelude: bool,
}

/// Everything about the crate being built that isn't itself name-resolution
/// state: its root file, its dependency edges, its edition.
pub trait CrateInput {
    fn crate_id(&self) -> CrateId;
    fn root_file(&self) -> FileId;
    fn edition(&self) -> Edition;
    fn root_attrs(&self) -> RootAttrs;
    fn dependencies(&self) -> &[DependencyInfo];
}

/// Look up an already-parsed file, and resolve `mod`/`include!` targets
/// against the directory a file lives in. Parsing source text is the host's
/// job; this is the seam where this crate receives the result.
pub trait FileLoader {
    fn item_tree(&self, file: FileId) -> ItemTree;

    /// Resolve `relative_path` as `include!`/`#[path]` would, anchored at
    /// the directory containing `anchor_file`. On failure, returns the
    /// absolute path that was probed, so the caller can record *that* (not
    /// the bare relative string) among the def map's missed files.
    fn resolve_path(&self, anchor_file: FileId, relative_path: &str) -> Result<FileId, String>;
}

/// The result of expanding one macro call: the items it expanded to, and the
/// file identity those items should be attributed to (so a [`crate::mod_data::ModData`]
/// built from them still has a sensible `file_id`).
pub struct ExpandedMacro {
    pub item_tree: ItemTree,
    pub file_id: FileId,
}

/// Token-tree substitution and hygiene are the host's concern (they need a
/// real `tt::Subtree`, which this crate deliberately doesn't model). This
/// trait is the seam: hand over a macro definition and a call's arguments,
/// get back the items the host's expander produced.
pub trait MacroExpander {
    fn expand(&self, def: &MacroDefInfo, call_body: &TokenStream) -> Option<ExpandedMacro>;
}

/// Everything the collector needs to know about already-resolved
/// dependencies, keyed by crate id. Supplied once per build; this crate never
/// builds one crate's map while also trying to build another's.
pub type DependencyDefMaps<'a> = FxHashMap<CrateId, &'a crate::def_map::CrateDefMap>;
