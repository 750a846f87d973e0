use crate::types::OrthoResult;
use std::path::Path;

/// Directory listing capability
pub trait DirectoryLister {
    /// File names (not paths) in `path`, sorted
    fn list_directory(&self, path: &Path) -> OrthoResult<Vec<String>>;
}

/// Lists the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_directory(&self, path: &Path) -> OrthoResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        log::debug!("Listed {} entries in {}", names.len(), path.display());
        Ok(names)
    }
}
