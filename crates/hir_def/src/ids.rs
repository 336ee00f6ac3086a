//! Small identifier types shared across the crate.
//!
//! None of these carry enough information to do anything other than identify
//! something — they are deliberately dumb. Anything that needs richer data
//! (an item's kind, a file's contents) goes through the host capabilities in
//! [`crate::host`] instead.

use std::fmt;

use arena::Idx;
use smol_str::SmolStr;

use crate::mod_data::ModData;

/// Opaque, stable identifier for a crate. Equality defines crate identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrateId(pub u32);

impl fmt::Debug for CrateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CrateId({})", self.0)
    }
}

/// Opaque identifier for a source file, as handed out by the host's
/// file-system capability. Carries no meaning of its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

/// A name in one of the three namespaces. Cheap to clone and hash: interned
/// as a `SmolStr` the way `hir_expand::name::Name` is in the reference.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(SmolStr);

impl Name {
    pub fn new(text: &str) -> Name {
        Name(SmolStr::new(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The name bound by `use path::Segment as _;` or an elided `extern
    /// crate` binding in a 2018+ crate: occupies no slot in any scope.
    pub fn is_underscore(&self) -> bool {
        self.0.as_str() == "_"
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Name {
        Name::new(text)
    }
}

/// Index of a [`ModData`](crate::mod_data::ModData) within its owning
/// crate's arena. Meaningless without the `CrateId` it came from.
pub type LocalModuleId = Idx<ModData>;

/// A module, qualified by the crate that owns it. The only way to name a
/// module that might live in a dependency.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId {
    pub krate: CrateId,
    pub local_id: LocalModuleId,
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({:?}, {:?})", self.krate, self.local_id)
    }
}

/// Rust edition, as far as name resolution cares: it changes how an
/// unqualified or absolute path's first segment is looked up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edition {
    Edition2015,
    Edition2018,
}
