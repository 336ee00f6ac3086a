//! Crate-scoped name resolution for a Rust-like module language.
//!
//! Given a crate's item tree and its dependencies' already-built
//! [`CrateDefMap`]s, [`nameres::compute_crate_def_map`] resolves every
//! module's visible names: `use` imports (plain and glob, with re-exports),
//! `macro_rules!` definitions and invocations, and `include!`. It does not
//! parse source text, expand macro token trees, or walk a file system —
//! those are the host capabilities in [`host`].

pub mod cancel;
pub mod def_map;
pub mod host;
pub mod ids;
pub mod item_tree;
pub mod mod_data;
pub mod mod_resolution;
pub mod nameres;
pub mod path;
pub mod per_ns;
pub mod visibility;

pub use cancel::Cancelled;
pub use def_map::CrateDefMap;
pub use nameres::compute_crate_def_map;
