//! Locating the file behind an out-of-line `mod foo;` declaration.
//!
//! Tracks only the directory an out-of-line module's children would live
//! in, relative to the file that declared it — everything else about the
//! file system is the host's [`crate::host::FileLoader`].

use crate::host::FileLoader;
use crate::ids::{FileId, Name};

#[derive(Clone, Debug)]
pub struct ModDir {
    /// Directory segments since the nearest file boundary, deepest last.
    /// Empty at a crate root or any other out-of-line module (their files
    /// sit directly in their own directory).
    segments: Vec<String>,
}

impl ModDir {
    pub fn root() -> ModDir {
        ModDir { segments: Vec::new() }
    }

    /// The directory children of an *inline* `mod name { .. }` would resolve
    /// against: one level deeper than `self`.
    pub fn descend_into_definition(&self, name: &Name) -> ModDir {
        let mut segments = self.segments.clone();
        segments.push(name.as_str().to_string());
        ModDir { segments }
    }

    /// Try to locate the file for `mod name;` (or `#[path = ..] mod name;`),
    /// declared inside `anchor_file`. On success, also returns the `ModDir`
    /// that file's own out-of-line children should resolve against (always
    /// root, since the new file starts a fresh directory boundary).
    ///
    /// On failure, returns the first candidate path tried, so the caller can
    /// record it among the def map's missed files.
    pub fn resolve_declaration(
        &self,
        files: &dyn FileLoader,
        anchor_file: FileId,
        name: &Name,
        path_attr: Option<&str>,
    ) -> Result<(FileId, ModDir), String> {
        if let Some(explicit) = path_attr {
            let candidate = self.join(explicit);
            return match files.resolve_path(anchor_file, &candidate) {
                Ok(file) => Ok((file, ModDir::root())),
                Err(absolute) => Err(absolute),
            };
        }

        let as_file = self.join(&format!("{}.rs", name.as_str()));
        if let Ok(file) = files.resolve_path(anchor_file, &as_file) {
            return Ok((file, ModDir::root()));
        }

        let as_dir_mod = self.join(&format!("{}/mod.rs", name.as_str()));
        match files.resolve_path(anchor_file, &as_dir_mod) {
            Ok(file) => Ok((file, ModDir::root())),
            Err(absolute) => Err(absolute),
        }
    }

    fn join(&self, leaf: &str) -> String {
        if self.segments.is_empty() {
            leaf.to_string()
        } else {
            format!("{}/{}", self.segments.join("/"), leaf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_tree::ItemTree;
    use std::cell::RefCell;

    struct FakeFiles {
        existing: RefCell<Vec<(FileId, String)>>,
        next_id: RefCell<u32>,
    }

    impl FakeFiles {
        fn new(paths: &[&str]) -> FakeFiles {
            let files = FakeFiles { existing: RefCell::new(Vec::new()), next_id: RefCell::new(1) };
            for p in paths {
                let mut id = files.next_id.borrow_mut();
                files.existing.borrow_mut().push((FileId(*id), p.to_string()));
                *id += 1;
            }
            files
        }
    }

    impl FileLoader for FakeFiles {
        fn item_tree(&self, _file: FileId) -> ItemTree {
            ItemTree::default()
        }

        fn resolve_path(&self, _anchor_file: FileId, relative_path: &str) -> Result<FileId, String> {
            self.existing
                .borrow()
                .iter()
                .find(|(_, p)| p == relative_path)
                .map(|(id, _)| *id)
                .ok_or_else(|| relative_path.to_string())
        }
    }

    #[test]
    fn prefers_name_dot_rs() {
        let files = FakeFiles::new(&["foo.rs"]);
        let (file, dir) = ModDir::root().resolve_declaration(&files, FileId(0), &Name::new("foo"), None).unwrap();
        assert_eq!(file, FileId(1));
        assert!(dir.segments.is_empty());
    }

    #[test]
    fn falls_back_to_mod_rs() {
        let files = FakeFiles::new(&["foo/mod.rs"]);
        let (file, _) = ModDir::root().resolve_declaration(&files, FileId(0), &Name::new("foo"), None).unwrap();
        assert_eq!(file, FileId(1));
    }

    #[test]
    fn missing_module_reports_candidate() {
        let files = FakeFiles::new(&[]);
        let err = ModDir::root().resolve_declaration(&files, FileId(0), &Name::new("nope"), None).unwrap_err();
        assert_eq!(err, "nope.rs");
    }

    #[test]
    fn nested_directory_is_joined() {
        let files = FakeFiles::new(&["a/b.rs"]);
        let dir = ModDir::root().descend_into_definition(&Name::new("a"));
        let (file, _) = dir.resolve_declaration(&files, FileId(0), &Name::new("b"), None).unwrap();
        assert_eq!(file, FileId(1));
    }
}
