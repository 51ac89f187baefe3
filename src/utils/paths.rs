use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};

/// Canonicalizes `candidate` and checks that it is `root` or lies beneath it.
pub fn resolve_under_root(root: &Path, candidate: &Path) -> Result<PathBuf> {
    let root = root.canonicalize()?;
    let real = candidate.canonicalize()?;
    if !real.starts_with(&root) {
        return Err(VaultError::PathOutsideRoot { root, path: real });
    }
    Ok(real)
}
