use std::{fs, io, path::Path, path::PathBuf};

use budgetwise_config::resolve_base_dir;

/// Resolves the on-disk locations used by the application.
pub struct PathResolver;

impl PathResolver {
    /// `BUDGETWISE_HOME`, or `~/.budgetwise` when unset.
    pub fn base_dir() -> PathBuf {
        resolve_base_dir()
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
