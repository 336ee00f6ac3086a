//! Crate-scoped name resolution: the public entry point.

mod collector;

use crate::cancel::{run_cancellable, CancelToken, Cancelled};
use crate::def_map::CrateDefMap;
use crate::host::{CrateInput, DependencyDefMaps, FileLoader, MacroExpander};
use collector::DefCollector;

/// Build a [`CrateDefMap`] for `crate_input`, given its dependencies'
/// already-resolved def maps and the host capabilities needed along the way.
///
/// Runs the fixed-point loop described in [`collector`] to completion, or
/// unwinds with [`Cancelled`] if `cancel` reports cancellation first.
pub fn compute_crate_def_map(
    crate_input: &dyn CrateInput,
    deps: DependencyDefMaps,
    files: &dyn FileLoader,
    macros: &dyn MacroExpander,
    cancel: &dyn CancelToken,
) -> Result<CrateDefMap, Cancelled> {
    run_cancellable(move || DefCollector::new(crate_input, deps, files, macros, cancel).collect())
}
